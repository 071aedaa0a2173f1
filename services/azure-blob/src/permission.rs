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

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use sassign_core::{Error, Result};

use crate::constants::PERMISSION_ORDER;

/// Check whether `sp` is a valid signed permission string.
///
/// Every character must appear in [`PERMISSION_ORDER`] strictly after the
/// previous one, so `"rwd"` is accepted while `"wr"` and `"rr"` are not.
/// The empty string is rejected.
pub fn is_valid_signed_permission(sp: &str) -> bool {
    if sp.is_empty() {
        return false;
    }

    let mut remaining = PERMISSION_ORDER.chars();
    sp.chars().all(|ch| remaining.any(|v| v == ch))
}

/// A validated `sp` value.
///
/// The only way to build one is [`SignedPermissions::from_str`], which
/// guarantees nothing is signed with a malformed permission string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignedPermissions(String);

impl SignedPermissions {
    /// Build from a permission string known to be valid at compile time.
    pub(crate) fn from_static(sp: &'static str) -> Self {
        debug_assert!(is_valid_signed_permission(sp), "invalid permission: {sp}");
        Self(sp.to_string())
    }

    /// Return the permission string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SignedPermissions {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if !is_valid_signed_permission(s) {
            return Err(Error::invalid_argument(format!(
                "signed permission {s:?} must be a non-empty subsequence of {PERMISSION_ORDER:?}"
            )));
        }

        Ok(Self(s.to_string()))
    }
}

impl Display for SignedPermissions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
