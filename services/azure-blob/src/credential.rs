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

use sassign_core::time::{now, DateTime};
use sassign_core::utils::Redact;
use sassign_core::SigningCredential;

/// BearerToken authorizes the user delegation key request.
#[derive(Clone)]
pub struct BearerToken {
    /// OAuth access token for `https://storage.azure.com/`.
    pub token: String,
    /// Expiration time for this credential.
    pub expires_in: Option<DateTime>,
}

impl Debug for BearerToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerToken")
            .field("token", &Redact::from(&self.token))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

impl SigningCredential for BearerToken {
    fn is_valid(&self) -> bool {
        if self.token.is_empty() {
            return false;
        }
        // Take 20s as buffer to avoid edge cases.
        match self.expires_in {
            Some(expires) => expires > now() + chrono::TimeDelta::seconds(20),
            None => true,
        }
    }
}

impl BearerToken {
    /// Create a new bearer token.
    pub fn new(token: &str, expires_in: Option<DateTime>) -> Self {
        Self {
            token: token.to_string(),
            expires_in,
        }
    }
}
