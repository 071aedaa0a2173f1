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

//! HMAC-SHA256 signer shared by both token flows.

use std::fmt::{Debug, Formatter};

use sassign_core::hash::{base64_decode, base64_hmac_sha256};
use sassign_core::{Error, Result};

/// Signer holds the symmetric key used to sign a string-to-sign.
///
/// The key is validated when the signer is built, so a malformed key never
/// surfaces on the first `sign` call. A signer is immutable: key rotation
/// builds a new one.
#[derive(Clone)]
pub struct Signer {
    key: Vec<u8>,
}

impl Debug for Signer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("key", &format_args!("<{} bytes>", self.key.len()))
            .finish()
    }
}

impl Signer {
    /// Create a signer from raw key bytes.
    pub fn new(key: Vec<u8>) -> Result<Self> {
        if key.is_empty() {
            return Err(Error::signing_config_invalid("signing key must not be empty"));
        }
        Ok(Self { key })
    }

    /// Create a signer from a base64 encoded key, as account keys and
    /// delegated key values are delivered.
    pub fn from_base64(key: &str) -> Result<Self> {
        let key = base64_decode(key)
            .map_err(|e| e.with_context("signing key is not valid base64"))?;
        Self::new(key)
    }

    /// Compute the base64 HMAC-SHA256 of `string_to_sign`.
    pub fn sign(&self, string_to_sign: &str) -> String {
        base64_hmac_sha256(&self.key, string_to_sign.as_bytes())
    }
}
