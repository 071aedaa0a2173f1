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

//! Construct the string to sign for service and user delegation SAS.

use std::fmt::Write;

use log::debug;
use sassign_core::time::{format_iso8601, DateTime};
use sassign_core::Result;
use uuid::Uuid;

use crate::delegated_key::DelegatedKey;
use crate::permission::SignedPermissions;
use crate::resource::ScopeKind;

/// Fields signed by both flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedFields {
    /// `sp`
    pub permissions: SignedPermissions,
    /// `st`
    pub start: DateTime,
    /// `se`
    pub expiry: DateTime,
    /// `/blob/{account}/{container}[/{path}]`
    pub canonical_resource: String,
    /// `sv`
    pub version: String,
    /// `sr`
    pub resource: ScopeKind,
    /// `sdd`, only for directory scope. Not part of the string to sign.
    pub directory_depth: Option<u32>,
}

/// The user a delegation token is handed to.
///
/// Modelled as one value so a token can never carry both `saoid` and `suoid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserPrincipal {
    /// `saoid`: the user is already authorized, no POSIX ACL check is performed.
    Authorized(Uuid),
    /// `suoid`: the service performs a POSIX ACL check for this user.
    Unauthorized(Uuid),
}

impl UserPrincipal {
    /// `saoid` value, if any.
    pub fn authorized(&self) -> Option<Uuid> {
        match self {
            UserPrincipal::Authorized(v) => Some(*v),
            UserPrincipal::Unauthorized(_) => None,
        }
    }

    /// `suoid` value, if any.
    pub fn unauthorized(&self) -> Option<Uuid> {
        match self {
            UserPrincipal::Authorized(_) => None,
            UserPrincipal::Unauthorized(v) => Some(*v),
        }
    }
}

/// Fields only signed by the user delegation flow.
#[derive(Debug, Clone, Copy)]
pub struct DelegationFields<'a> {
    /// The key that will sign the token. `skoid`, `sktid`, `skt`, `ske`,
    /// `sks` and `skv` are read from it.
    pub key: &'a DelegatedKey,
    /// `saoid` or `suoid`
    pub principal: Option<UserPrincipal>,
    /// `scid`
    pub correlation_id: Option<Uuid>,
}

/// Construct string to sign for a service SAS.
///
/// ## Format
///
/// ```text
/// signedPermissions + "\n" +
/// signedStart + "\n" +
/// signedExpiry + "\n" +
/// canonicalizedResource + "\n" +
/// signedIdentifier + "\n" +
/// signedIP + "\n" +
/// signedProtocol + "\n" +
/// signedVersion + "\n" +
/// signedResource + "\n" +
/// signedSnapshotTime + "\n" +
/// rscc + "\n" +
/// rscd + "\n" +
/// rsce + "\n" +
/// rscl + "\n" +
/// rsct
/// ```
///
/// ## Reference
///
/// - [Create a service SAS](https://learn.microsoft.com/en-us/rest/api/storageservices/create-service-sas)
pub fn service_string_to_sign(fields: &SignedFields) -> Result<String> {
    let mut s = String::with_capacity(256);

    write_head(&mut s, fields)?;
    // signedIdentifier
    writeln!(&mut s)?;
    // signedIP
    writeln!(&mut s)?;
    // signedProtocol
    writeln!(&mut s)?;
    write_tail(&mut s, fields)?;

    debug!("string to sign: [{}]", s.replace('\n', "."));

    Ok(s)
}

/// Construct string to sign for a user delegation SAS.
///
/// ## Format
///
/// ```text
/// signedPermissions + "\n" +
/// signedStart + "\n" +
/// signedExpiry + "\n" +
/// canonicalizedResource + "\n" +
/// signedKeyObjectId + "\n" +
/// signedKeyTenantId + "\n" +
/// signedKeyStart + "\n" +
/// signedKeyExpiry + "\n" +
/// signedKeyService + "\n" +
/// signedKeyVersion + "\n" +
/// signedAuthorizedUserObjectId + "\n" +
/// signedUnauthorizedUserObjectId + "\n" +
/// signedCorrelationId + "\n" +
/// signedIP + "\n" +
/// signedProtocol + "\n" +
/// signedVersion + "\n" +
/// signedResource + "\n" +
/// signedSnapshotTime + "\n" +
/// rscc + "\n" +
/// rscd + "\n" +
/// rsce + "\n" +
/// rscl + "\n" +
/// rsct
/// ```
///
/// ## Reference
///
/// - [Create a user delegation SAS](https://learn.microsoft.com/en-us/rest/api/storageservices/create-user-delegation-sas)
pub fn delegation_string_to_sign(
    fields: &SignedFields,
    delegation: &DelegationFields<'_>,
) -> Result<String> {
    let mut s = String::with_capacity(512);
    let key = delegation.key;

    write_head(&mut s, fields)?;
    writeln!(&mut s, "{}", key.object_id)?;
    writeln!(&mut s, "{}", key.tenant_id)?;
    writeln!(&mut s, "{}", format_iso8601(key.signed_start))?;
    writeln!(&mut s, "{}", format_iso8601(key.signed_expiry))?;
    writeln!(&mut s, "{}", key.service)?;
    writeln!(&mut s, "{}", key.version)?;
    write_optional(&mut s, delegation.principal.and_then(|v| v.authorized()))?;
    write_optional(&mut s, delegation.principal.and_then(|v| v.unauthorized()))?;
    write_optional(&mut s, delegation.correlation_id)?;
    // signedIP
    writeln!(&mut s)?;
    // signedProtocol
    writeln!(&mut s)?;
    write_tail(&mut s, fields)?;

    debug!("string to sign: [{}]", s.replace('\n', "."));

    Ok(s)
}

fn write_head(s: &mut String, fields: &SignedFields) -> Result<()> {
    writeln!(s, "{}", fields.permissions)?;
    writeln!(s, "{}", format_iso8601(fields.start))?;
    writeln!(s, "{}", format_iso8601(fields.expiry))?;
    writeln!(s, "{}", fields.canonical_resource)?;
    Ok(())
}

fn write_optional(s: &mut String, value: Option<Uuid>) -> Result<()> {
    match value {
        Some(v) => writeln!(s, "{v}")?,
        None => writeln!(s)?,
    }
    Ok(())
}

fn write_tail(s: &mut String, fields: &SignedFields) -> Result<()> {
    writeln!(s, "{}", fields.version)?;
    writeln!(s, "{}", fields.resource.signed_resource())?;
    // signedSnapshotTime
    writeln!(s)?;
    // rscc, rscd, rsce, rscl. rsct is empty and closes the payload.
    for _ in 0..4 {
        writeln!(s)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn test_fields(resource: ScopeKind, canonical_resource: &str) -> SignedFields {
        SignedFields {
            permissions: "rw".parse().unwrap(),
            start: chrono::Utc.with_ymd_and_hms(2022, 3, 1, 8, 7, 34).unwrap(),
            expiry: chrono::Utc.with_ymd_and_hms(2022, 3, 2, 8, 12, 34).unwrap(),
            canonical_resource: canonical_resource.to_string(),
            version: "2020-02-10".to_string(),
            resource,
            directory_depth: None,
        }
    }

    fn test_key() -> DelegatedKey {
        DelegatedKey {
            object_id: "11111111-1111-1111-1111-111111111111".to_string(),
            tenant_id: "22222222-2222-2222-2222-222222222222".to_string(),
            signed_start: chrono::Utc.with_ymd_and_hms(2022, 3, 1, 8, 7, 34).unwrap(),
            signed_expiry: chrono::Utc.with_ymd_and_hms(2022, 3, 3, 8, 12, 34).unwrap(),
            service: "b".to_string(),
            version: "2020-02-10".to_string(),
            value: "ZmVkY2JhOTg3NjU0MzIxMGZlZGNiYTk4NzY1NDMyMTA=".to_string(),
        }
    }

    #[test]
    fn test_service_string_to_sign() {
        let fields = test_fields(ScopeKind::Blob, "/blob/myaccount/mycontainer/dir1/file.txt");
        let actual = service_string_to_sign(&fields).unwrap();

        assert_eq!(
            actual,
            "rw\n2022-03-01T08:07:34Z\n2022-03-02T08:12:34Z\n/blob/myaccount/mycontainer/dir1/file.txt\n\n\n\n2020-02-10\nb\n\n\n\n\n\n"
        );
        assert_eq!(actual.matches('\n').count(), 14);
    }

    #[test]
    fn test_delegation_string_to_sign() {
        let key = test_key();
        let fields = test_fields(ScopeKind::Directory, "/blob/myaccount/mycontainer/dir1");
        let delegation = DelegationFields {
            key: &key,
            principal: Some(UserPrincipal::Unauthorized(
                "33333333-3333-3333-3333-333333333333".parse().unwrap(),
            )),
            correlation_id: Some("44444444-4444-4444-4444-444444444444".parse().unwrap()),
        };
        let actual = delegation_string_to_sign(&fields, &delegation).unwrap();

        let expected = [
            "rw",
            "2022-03-01T08:07:34Z",
            "2022-03-02T08:12:34Z",
            "/blob/myaccount/mycontainer/dir1",
            "11111111-1111-1111-1111-111111111111",
            "22222222-2222-2222-2222-222222222222",
            "2022-03-01T08:07:34Z",
            "2022-03-03T08:12:34Z",
            "b",
            "2020-02-10",
            "",
            "33333333-3333-3333-3333-333333333333",
            "44444444-4444-4444-4444-444444444444",
            "",
            "",
            "2020-02-10",
            "d",
            "",
            "",
            "",
            "",
            "",
            "",
        ]
        .join("\n");
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_delegation_string_to_sign_keeps_empty_fields() {
        let key = test_key();
        let fields = test_fields(ScopeKind::Blob, "/blob/myaccount/mycontainer/file");
        let delegation = DelegationFields {
            key: &key,
            principal: None,
            correlation_id: None,
        };
        let actual = delegation_string_to_sign(&fields, &delegation).unwrap();

        assert_eq!(actual.matches('\n').count(), 22);
        assert!(actual.contains("\n2020-02-10\n\n\n\n\n\n2020-02-10\nb\n"));
    }

    #[test]
    fn test_user_principal() {
        let id: Uuid = "33333333-3333-3333-3333-333333333333".parse().unwrap();

        assert_eq!(UserPrincipal::Authorized(id).authorized(), Some(id));
        assert_eq!(UserPrincipal::Authorized(id).unauthorized(), None);
        assert_eq!(UserPrincipal::Unauthorized(id).authorized(), None);
        assert_eq!(UserPrincipal::Unauthorized(id).unauthorized(), Some(id));
    }
}
