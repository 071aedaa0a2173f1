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

use async_trait::async_trait;
use sassign_core::time::DateTime;
use sassign_core::{Context, ProvideCredential, Result};

use crate::credential::BearerToken;

/// StaticTokenProvider hands out a bearer token obtained elsewhere.
#[derive(Clone, Debug)]
pub struct StaticTokenProvider {
    credential: BearerToken,
}

impl StaticTokenProvider {
    /// Create a provider for a token without known expiry.
    pub fn new(token: &str) -> Self {
        Self {
            credential: BearerToken::new(token, None),
        }
    }

    /// Set the expiry of the token.
    pub fn with_expires_in(mut self, expires_in: DateTime) -> Self {
        self.credential.expires_in = Some(expires_in);
        self
    }
}

#[async_trait]
impl ProvideCredential for StaticTokenProvider {
    type Credential = BearerToken;

    async fn provide_credential(&self, _ctx: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(self.credential.clone()))
    }
}
