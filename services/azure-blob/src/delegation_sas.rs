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

use log::debug;
use sassign_core::time::{now, DateTime};
use sassign_core::{Context, Result};
use uuid::Uuid;

use crate::config::Config;
use crate::constants::{KEY_RENEWAL_PERIOD_DAYS, SAS_VERSION, START_TIME_BACKOFF_MINUTES};
use crate::delegated_key::IssueDelegatedKey;
use crate::key_cache::DelegatedKeyCache;
use crate::operation::Operation;
use crate::permission::SignedPermissions;
use crate::resource::{validate_container, ResourceScope};
use crate::string_to_sign::{
    delegation_string_to_sign, DelegationFields, SignedFields, UserPrincipal,
};
use crate::token::{assemble_delegation_token, SasToken};

/// Optional fields of an operation scoped token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationSasOptions {
    /// `scid`: correlates storage audit logs with the caller's own logs.
    pub correlation_id: Option<Uuid>,
    /// `saoid` or `suoid`.
    pub principal: Option<UserPrincipal>,
}

/// DelegationSasGenerator builds user delegation SAS tokens.
///
/// The delegated key is fetched on first use and renewed once per day. Clones
/// share the same key cache.
#[derive(Debug, Clone)]
pub struct DelegationSasGenerator {
    ctx: Context,
    account_name: String,
    cache: Arc<DelegatedKeyCache>,

    time: Option<DateTime>,
}

impl DelegationSasGenerator {
    /// Create a generator for `account_name` whose keys come from `issuer`.
    pub fn new(ctx: Context, account_name: &str, issuer: impl IssueDelegatedKey) -> Self {
        Self {
            ctx,
            account_name: account_name.to_string(),
            cache: Arc::new(DelegatedKeyCache::new(issuer)),
            time: None,
        }
    }

    /// Create a generator for the account of `config`.
    pub fn from_config(
        ctx: Context,
        config: &Config,
        issuer: impl IssueDelegatedKey,
    ) -> Result<Self> {
        Ok(Self::new(ctx, config.account_name()?, issuer))
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    fn now(&self) -> DateTime {
        self.time.unwrap_or_else(now)
    }

    /// Fetch a new delegated key now instead of waiting for the first token.
    pub async fn refresh_key(&self) -> Result<()> {
        self.cache.refresh(&self.ctx, || self.now()).await?;
        Ok(())
    }

    /// Generate a token for the blob at `path` inside `container`.
    ///
    /// `expiry` is clamped to the expiry of the delegated key.
    pub async fn generate_sas_for_path(
        &self,
        container: &str,
        path: &str,
        expiry: DateTime,
        permissions: &str,
    ) -> Result<SasToken> {
        validate_container(container)?;
        let permissions = permissions.parse()?;
        let scope = ResourceScope::blob(path)?;
        self.generate(
            container,
            scope,
            expiry,
            permissions,
            OperationSasOptions::default(),
        )
        .await
    }

    /// Generate a token for `directory` and everything below it.
    pub async fn generate_sas_for_directory(
        &self,
        container: &str,
        directory: &str,
        expiry: DateTime,
        permissions: &str,
    ) -> Result<SasToken> {
        validate_container(container)?;
        let permissions = permissions.parse()?;
        let scope = ResourceScope::directory(directory)?;
        self.generate(
            container,
            scope,
            expiry,
            permissions,
            OperationSasOptions::default(),
        )
        .await
    }

    /// Generate a token for the whole `container`.
    pub async fn generate_sas_for_container(
        &self,
        container: &str,
        expiry: DateTime,
        permissions: &str,
    ) -> Result<SasToken> {
        validate_container(container)?;
        let permissions = permissions.parse()?;
        self.generate(
            container,
            ResourceScope::container(),
            expiry,
            permissions,
            OperationSasOptions::default(),
        )
        .await
    }

    /// Generate the smallest token that allows `operation` on `path`.
    ///
    /// The token expires one renewal period from now.
    pub async fn generate_sas_for_operation(
        &self,
        container: &str,
        path: &str,
        operation: &str,
    ) -> Result<SasToken> {
        self.generate_sas_for_operation_with(
            container,
            path,
            operation,
            OperationSasOptions::default(),
        )
        .await
    }

    /// Same as [`Self::generate_sas_for_operation`], carrying a correlation
    /// id and the user the token is handed to.
    pub async fn generate_sas_for_operation_with(
        &self,
        container: &str,
        path: &str,
        operation: &str,
        options: OperationSasOptions,
    ) -> Result<SasToken> {
        validate_container(container)?;
        let operation: Operation = operation.parse()?;
        let scope = operation.scope(path)?;
        let expiry = self.now() + chrono::TimeDelta::days(KEY_RENEWAL_PERIOD_DAYS);

        self.generate(container, scope, expiry, operation.permissions(), options)
            .await
    }

    async fn generate(
        &self,
        container: &str,
        scope: ResourceScope,
        expiry: DateTime,
        permissions: SignedPermissions,
        options: OperationSasOptions,
    ) -> Result<SasToken> {
        // Key fields and signature must come from this one snapshot.
        let signing_key = self.cache.ensure_fresh(&self.ctx, || self.now()).await?;
        let key = signing_key.key();
        let now = self.now();

        let fields = SignedFields {
            permissions,
            start: now - chrono::TimeDelta::minutes(START_TIME_BACKOFF_MINUTES),
            expiry: expiry.min(key.signed_expiry),
            canonical_resource: scope.canonical_resource(&self.account_name, container),
            version: SAS_VERSION.to_string(),
            resource: scope.kind(),
            directory_depth: scope.depth(),
        };
        let delegation = DelegationFields {
            key,
            principal: options.principal,
            correlation_id: options.correlation_id,
        };

        let string_to_sign = delegation_string_to_sign(&fields, &delegation)?;
        let signature = signing_key.signer().sign(&string_to_sign);

        debug!(
            "generated user delegation sas for {} with permissions {}",
            fields.canonical_resource, fields.permissions
        );
        Ok(assemble_delegation_token(&fields, &delegation, &signature))
    }
}
