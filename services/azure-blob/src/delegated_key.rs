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

use std::fmt::{Debug, Formatter};

use async_trait::async_trait;
use sassign_core::time::DateTime;
use sassign_core::utils::Redact;
use sassign_core::{Context, Result};

/// A user delegation key returned by the storage service.
///
/// A key is never modified once fetched, a refresh replaces it wholesale.
#[derive(Clone, PartialEq, Eq)]
pub struct DelegatedKey {
    /// `skoid`: object id of the principal the key was issued to.
    pub object_id: String,
    /// `sktid`: tenant of that principal.
    pub tenant_id: String,
    /// `skt`
    pub signed_start: DateTime,
    /// `ske`
    pub signed_expiry: DateTime,
    /// `sks`, always `b`.
    pub service: String,
    /// `skv`
    pub version: String,
    /// Base64 encoded key bytes.
    pub value: String,
}

impl Debug for DelegatedKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelegatedKey")
            .field("object_id", &self.object_id)
            .field("tenant_id", &self.tenant_id)
            .field("signed_start", &self.signed_start)
            .field("signed_expiry", &self.signed_expiry)
            .field("service", &self.service)
            .field("version", &self.version)
            .field("value", &Redact::from(&self.value))
            .finish()
    }
}

/// IssueDelegatedKey is the external collaborator that hands out delegated keys.
///
/// Failures must be reported as [`sassign_core::ErrorKind::KeyAcquisitionFailed`],
/// they surface unchanged to the caller whose token generation triggered the
/// request. Implementations decide their own timeouts, nothing is retried.
#[async_trait]
pub trait IssueDelegatedKey: Debug + Send + Sync + 'static {
    /// Request a key valid from `start` to `expiry`.
    async fn issue_delegated_key(
        &self,
        ctx: &Context,
        start: DateTime,
        expiry: DateTime,
    ) -> Result<DelegatedKey>;
}
