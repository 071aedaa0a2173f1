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

use log::debug;
use sassign_core::time::{now, DateTime};
use sassign_core::Result;

use crate::config::Config;
use crate::constants::{SAS_VERSION, START_TIME_BACKOFF_MINUTES};
use crate::permission::SignedPermissions;
use crate::resource::{validate_container, ResourceScope};
use crate::signer::Signer;
use crate::string_to_sign::{service_string_to_sign, SignedFields};
use crate::token::{assemble_service_token, SasToken};

/// ServiceSasGenerator builds service SAS tokens signed with the account key.
///
/// Generation is synchronous and needs no network access, a generator can be
/// shared freely between threads.
#[derive(Debug, Clone)]
pub struct ServiceSasGenerator {
    account_name: String,
    signer: Signer,

    time: Option<DateTime>,
}

impl ServiceSasGenerator {
    /// Create a generator for `account_name` with the base64 encoded `account_key`.
    pub fn new(account_name: &str, account_key: &str) -> Result<Self> {
        Ok(Self {
            account_name: account_name.to_string(),
            signer: Signer::from_base64(account_key)?,
            time: None,
        })
    }

    /// Create a generator from the account name and key of `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.account_name()?, config.account_key()?)
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

    /// Generate a token for the blob at `path` inside `container`.
    pub fn generate_sas_for_path(
        &self,
        container: &str,
        path: &str,
        expiry: DateTime,
        permissions: &str,
    ) -> Result<SasToken> {
        validate_container(container)?;
        let permissions = permissions.parse()?;
        let scope = ResourceScope::blob(path)?;
        self.generate(container, scope, expiry, permissions)
    }

    /// Generate a token for `directory` and everything below it.
    pub fn generate_sas_for_directory(
        &self,
        container: &str,
        directory: &str,
        expiry: DateTime,
        permissions: &str,
    ) -> Result<SasToken> {
        validate_container(container)?;
        let permissions = permissions.parse()?;
        let scope = ResourceScope::directory(directory)?;
        self.generate(container, scope, expiry, permissions)
    }

    /// Generate a token for the whole `container`.
    pub fn generate_sas_for_container(
        &self,
        container: &str,
        expiry: DateTime,
        permissions: &str,
    ) -> Result<SasToken> {
        validate_container(container)?;
        let permissions = permissions.parse()?;
        self.generate(container, ResourceScope::container(), expiry, permissions)
    }

    fn generate(
        &self,
        container: &str,
        scope: ResourceScope,
        expiry: DateTime,
        permissions: SignedPermissions,
    ) -> Result<SasToken> {
        let now = self.time.unwrap_or_else(now);

        let fields = SignedFields {
            permissions,
            start: now - chrono::TimeDelta::minutes(START_TIME_BACKOFF_MINUTES),
            expiry,
            canonical_resource: scope.canonical_resource(&self.account_name, container),
            version: SAS_VERSION.to_string(),
            resource: scope.kind(),
            directory_depth: scope.depth(),
        };

        let string_to_sign = service_string_to_sign(&fields)?;
        let signature = self.signer.sign(&string_to_sign);

        debug!(
            "generated service sas for {} with permissions {}",
            fields.canonical_resource, fields.permissions
        );
        Ok(assemble_service_token(&fields, &signature))
    }
}
