// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use quick_xml::de;
use serde::Deserialize;
use sassign_core::time::{format_http_date, format_iso8601, now, parse_rfc3339, DateTime};
use sassign_core::{Context, Error, ProvideCredential, Result, SigningCredential};

use crate::config::Config;
use crate::constants::{SAS_VERSION, X_MS_DATE, X_MS_VERSION};
use crate::credential::BearerToken;
use crate::delegated_key::{DelegatedKey, IssueDelegatedKey};

/// UserDelegationKeyIssuer requests delegated keys from the blob service
/// with the `Get User Delegation Key` operation.
#[derive(Debug, Clone)]
pub struct UserDelegationKeyIssuer {
    endpoint: String,
    provider: Arc<dyn ProvideCredential<Credential = BearerToken>>,
}

impl UserDelegationKeyIssuer {
    /// Create an issuer for the blob `endpoint`, authorized by `provider`.
    pub fn new(
        endpoint: &str,
        provider: impl ProvideCredential<Credential = BearerToken>,
    ) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            provider: Arc::new(provider),
        }
    }

    /// Create an issuer for the endpoint of `config`.
    pub fn from_config(
        config: &Config,
        provider: impl ProvideCredential<Credential = BearerToken>,
    ) -> Result<Self> {
        Ok(Self::new(&config.endpoint()?, provider))
    }

    async fn load_token(&self, ctx: &Context) -> Result<BearerToken> {
        let token = self.provider.provide_credential(ctx).await.map_err(|e| {
            Error::key_acquisition_failed("failed to load bearer token").with_source(e)
        })?;

        match token {
            Some(token) if token.is_valid() => Ok(token),
            Some(_) => Err(Error::key_acquisition_failed("bearer token is expired or empty")),
            None => Err(Error::key_acquisition_failed("no bearer token available")),
        }
    }
}

#[async_trait]
impl IssueDelegatedKey for UserDelegationKeyIssuer {
    async fn issue_delegated_key(
        &self,
        ctx: &Context,
        start: DateTime,
        expiry: DateTime,
    ) -> Result<DelegatedKey> {
        let token = self.load_token(ctx).await?;

        let url = format!("{}/?restype=service&comp=userdelegationkey", self.endpoint);
        let body = format!(
            r#"<?xml version="1.0" encoding="utf-8"?><KeyInfo><Start>{}</Start><Expiry>{}</Expiry></KeyInfo>"#,
            format_iso8601(start),
            format_iso8601(expiry)
        );

        let req = http::Request::builder()
            .method(http::Method::POST)
            .uri(&url)
            .header(X_MS_VERSION, SAS_VERSION)
            .header(X_MS_DATE, format_http_date(now()))
            .header(http::header::CONTENT_TYPE, "application/xml")
            .header(http::header::CONTENT_LENGTH, body.len())
            .header(
                http::header::AUTHORIZATION,
                format!("Bearer {}", token.token),
            )
            .body(Bytes::from(body))
            .map_err(|e| {
                Error::key_acquisition_failed("failed to build user delegation key request")
                    .with_source(e)
                    .with_context(format!("endpoint: {}", self.endpoint))
            })?;

        debug!("requesting user delegation key from {}", self.endpoint);
        let resp = ctx.http_send_as_string(req).await.map_err(|e| {
            Error::key_acquisition_failed("failed to send user delegation key request")
                .with_source(e)
                .with_context(format!("endpoint: {}", self.endpoint))
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::key_acquisition_failed(format!(
                "user delegation key request failed with status {status}: {}",
                resp.body()
            ))
            .with_context(format!("endpoint: {}", self.endpoint)));
        }

        let content = resp.into_body();
        let resp: UserDelegationKeyResponse = de::from_str(&content).map_err(|e| {
            Error::key_acquisition_failed("failed to parse user delegation key response")
                .with_source(e)
                .with_context(format!("response_length: {}", content.len()))
        })?;

        resp.into_delegated_key()
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct UserDelegationKeyResponse {
    signed_oid: String,
    signed_tid: String,
    signed_start: String,
    signed_expiry: String,
    signed_service: String,
    signed_version: String,
    value: String,
}

impl UserDelegationKeyResponse {
    fn into_delegated_key(self) -> Result<DelegatedKey> {
        let parse_time = |name: &str, value: &str| {
            parse_rfc3339(value).map_err(|e| {
                Error::key_acquisition_failed(format!("invalid {name} in user delegation key"))
                    .with_source(e)
            })
        };

        Ok(DelegatedKey {
            signed_start: parse_time("SignedStart", &self.signed_start)?,
            signed_expiry: parse_time("SignedExpiry", &self.signed_expiry)?,
            object_id: self.signed_oid,
            tenant_id: self.signed_tid,
            service: self.signed_service,
            version: self.signed_version,
            value: self.value,
        })
    }
}
