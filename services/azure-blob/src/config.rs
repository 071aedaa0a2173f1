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

use sassign_core::utils::Redact;
use sassign_core::{Context, Error, Result};

use crate::constants::{AZBLOB_ACCOUNT_KEY, AZBLOB_ACCOUNT_NAME, AZBLOB_ENDPOINT};

/// Config carries the settings of a storage account.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// `account_name` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AZBLOB_ACCOUNT_NAME`
    pub account_name: Option<String>,
    /// `account_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AZBLOB_ACCOUNT_KEY`
    pub account_key: Option<String>,
    /// `endpoint` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AZBLOB_ENDPOINT`
    ///
    /// Falls back to `https://{account_name}.blob.core.windows.net`.
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("account_name", &self.account_name)
            .field("account_key", &Redact::from(&self.account_key))
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Config {
    /// Load config from env, values already set are kept.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if self.account_name.is_none() {
            self.account_name = ctx.env_var(AZBLOB_ACCOUNT_NAME);
        }
        if self.account_key.is_none() {
            self.account_key = ctx.env_var(AZBLOB_ACCOUNT_KEY);
        }
        if self.endpoint.is_none() {
            self.endpoint = ctx.env_var(AZBLOB_ENDPOINT);
        }

        self
    }

    /// Set the account name.
    pub fn with_account_name(mut self, account_name: &str) -> Self {
        self.account_name = Some(account_name.to_string());
        self
    }

    /// Set the account key.
    pub fn with_account_key(mut self, account_key: &str) -> Self {
        self.account_key = Some(account_key.to_string());
        self
    }

    /// Set the blob endpoint.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self
    }

    /// Return the account name or fail if it's not set.
    pub fn account_name(&self) -> Result<&str> {
        required(&self.account_name, "account_name")
    }

    /// Return the account key or fail if it's not set.
    pub fn account_key(&self) -> Result<&str> {
        required(&self.account_key, "account_key")
    }

    /// Return the blob endpoint without trailing slash.
    pub fn endpoint(&self) -> Result<String> {
        match self.endpoint.as_deref().filter(|v| !v.is_empty()) {
            Some(v) => Ok(v.trim_end_matches('/').to_string()),
            None => Ok(format!(
                "https://{}.blob.core.windows.net",
                self.account_name()?
            )),
        }
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::config_invalid(format!("{name} is required but not set")))
}
