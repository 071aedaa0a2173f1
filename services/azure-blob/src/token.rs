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

use log::debug;
use percent_encoding::{percent_decode_str, utf8_percent_encode};
use sassign_core::time::format_iso8601;
use sassign_core::{Error, Result};

use crate::constants::AZURE_QUERY_ENCODE_SET;
use crate::resource::parse_directory_depth;
use crate::string_to_sign::{DelegationFields, SignedFields};

/// Percent encode a query value: space becomes `%20` and `/` is kept.
pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, &AZURE_QUERY_ENCODE_SET).to_string()
}

/// Reverse [`percent_encode`].
pub fn percent_decode(value: &str) -> Result<String> {
    percent_decode_str(value)
        .decode_utf8()
        .map(|v| v.into_owned())
        .map_err(|e| Error::invalid_argument("query value is not valid utf-8").with_source(e))
}

/// A shared access signature in query string form, without the leading `?`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SasToken(String);

impl std::fmt::Debug for SasToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // The signature is a bearer capability.
        let shown = match self.0.rfind("&sig=") {
            Some(idx) => format!("{}&sig=***", &self.0[..idx]),
            None => self.0.clone(),
        };
        f.debug_tuple("SasToken").field(&shown).finish()
    }
}

impl SasToken {
    /// Return the query string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the token and return the query string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Decoded `(name, value)` pairs in token order.
    pub fn query_pairs(&self) -> Result<Vec<(String, String)>> {
        self.0
            .split('&')
            .filter(|v| !v.is_empty())
            .map(|pair| {
                let (k, v) = pair.split_once('=').ok_or_else(|| {
                    Error::invalid_argument(format!("malformed query pair: {pair:?}"))
                })?;
                Ok((percent_decode(k)?, percent_decode(v)?))
            })
            .collect()
    }

    /// Decoded value of the field `name`.
    pub fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self
            .query_pairs()?
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v))
    }

    /// `sdd` of a directory scoped token.
    pub fn directory_depth(&self) -> Result<Option<u32>> {
        self.get("sdd")?
            .map(|v| parse_directory_depth(&v))
            .transpose()
    }
}

impl Display for SasToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SasToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// TokenAssembler renders fields into a query string in the order they are pushed.
///
/// Values are percent encoded, absent optional values are skipped and
/// `sig` is always appended last by [`TokenAssembler::finish`].
#[derive(Debug, Default)]
pub struct TokenAssembler {
    query: String,
}

impl TokenAssembler {
    /// Create an empty assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `key=value`.
    pub fn push(mut self, key: &str, value: impl AsRef<str>) -> Self {
        if !self.query.is_empty() {
            self.query.push('&');
        }
        self.query.push_str(key);
        self.query.push('=');
        self.query.push_str(&percent_encode(value.as_ref()));
        self
    }

    /// Append `key=value` only if `value` is present.
    pub fn push_optional<T: ToString>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.push(key, v.to_string()),
            None => self,
        }
    }

    /// Append the signature and build the token.
    pub fn finish(self, signature: &str) -> SasToken {
        let token = SasToken(self.push("sig", signature).query);
        debug!("assembled sas token: {token:?}");
        token
    }
}

/// Assemble a service SAS:
/// `sp, st, se, sv, sr, [sdd], sig`.
pub fn assemble_service_token(fields: &SignedFields, signature: &str) -> SasToken {
    push_signed_fields(TokenAssembler::new(), fields).finish(signature)
}

/// Assemble a user delegation SAS:
/// `skoid, sktid, skt, ske, sks, skv, [saoid], [suoid], [scid], sp, st, se, sv, sr, [sdd], sig`.
pub fn assemble_delegation_token(
    fields: &SignedFields,
    delegation: &DelegationFields<'_>,
    signature: &str,
) -> SasToken {
    let key = delegation.key;
    let assembler = TokenAssembler::new()
        .push("skoid", &key.object_id)
        .push("sktid", &key.tenant_id)
        .push("skt", format_iso8601(key.signed_start))
        .push("ske", format_iso8601(key.signed_expiry))
        .push("sks", &key.service)
        .push("skv", &key.version)
        .push_optional("saoid", delegation.principal.and_then(|v| v.authorized()))
        .push_optional("suoid", delegation.principal.and_then(|v| v.unauthorized()))
        .push_optional("scid", delegation.correlation_id);

    push_signed_fields(assembler, fields).finish(signature)
}

fn push_signed_fields(assembler: TokenAssembler, fields: &SignedFields) -> TokenAssembler {
    assembler
        .push("sp", fields.permissions.as_str())
        .push("st", format_iso8601(fields.start))
        .push("se", format_iso8601(fields.expiry))
        .push("sv", &fields.version)
        .push("sr", fields.resource.signed_resource())
        .push_optional("sdd", fields.directory_depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegated_key::DelegatedKey;
    use crate::resource::ScopeKind;
    use crate::string_to_sign::UserPrincipal;
    use chrono::TimeZone;
    use sassign_core::ErrorKind;

    fn test_fields(resource: ScopeKind, directory_depth: Option<u32>) -> SignedFields {
        SignedFields {
            permissions: "rl".parse().unwrap(),
            start: chrono::Utc.with_ymd_and_hms(2022, 3, 1, 8, 7, 34).unwrap(),
            expiry: chrono::Utc.with_ymd_and_hms(2022, 3, 2, 8, 12, 34).unwrap(),
            canonical_resource: "/blob/myaccount/mycontainer/dir1/dir2".to_string(),
            version: "2020-02-10".to_string(),
            resource,
            directory_depth,
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
    fn test_percent_encode() {
        let cases = vec![
            ("a b/c", "a%20b/c"),
            ("2022-03-01T08:07:34Z", "2022-03-01T08%3A07%3A34Z"),
            ("ab+cd/ef==", "ab%2Bcd/ef%3D%3D"),
            ("rwdl", "rwdl"),
        ];

        for (input, expected) in cases {
            let encoded = percent_encode(input);
            assert_eq!(encoded, expected, "Failed on input: {input:?}");
            assert_eq!(percent_decode(&encoded).unwrap(), input);
        }
    }

    #[test]
    fn test_assemble_service_token() {
        let token = assemble_service_token(&test_fields(ScopeKind::Directory, Some(2)), "ab+c/d=");
        assert_eq!(
            token.as_str(),
            "sp=rl&st=2022-03-01T08%3A07%3A34Z&se=2022-03-02T08%3A12%3A34Z&sv=2020-02-10&sr=d&sdd=2&sig=ab%2Bc/d%3D"
        );

        let token = assemble_service_token(&test_fields(ScopeKind::Blob, None), "sig");
        assert!(!token.as_str().contains("sdd="));
        assert!(token.as_str().ends_with("&sr=b&sig=sig"));
    }

    #[test]
    fn test_assemble_delegation_token() {
        let key = test_key();
        let fields = test_fields(ScopeKind::Blob, None);

        let delegation = DelegationFields {
            key: &key,
            principal: None,
            correlation_id: None,
        };
        let token = assemble_delegation_token(&fields, &delegation, "sig");
        assert_eq!(
            token.as_str(),
            "skoid=11111111-1111-1111-1111-111111111111&sktid=22222222-2222-2222-2222-222222222222&skt=2022-03-01T08%3A07%3A34Z&ske=2022-03-03T08%3A12%3A34Z&sks=b&skv=2020-02-10&sp=rl&st=2022-03-01T08%3A07%3A34Z&se=2022-03-02T08%3A12%3A34Z&sv=2020-02-10&sr=b&sig=sig"
        );

        let delegation = DelegationFields {
            key: &key,
            principal: Some(UserPrincipal::Authorized(
                "33333333-3333-3333-3333-333333333333".parse().unwrap(),
            )),
            correlation_id: Some("44444444-4444-4444-4444-444444444444".parse().unwrap()),
        };
        let token = assemble_delegation_token(&fields, &delegation, "sig");
        let names: Vec<String> = token
            .query_pairs()
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(
            names,
            vec![
                "skoid", "sktid", "skt", "ske", "sks", "skv", "saoid", "scid", "sp", "st", "se",
                "sv", "sr", "sig"
            ]
        );
        assert_eq!(
            token.get("saoid").unwrap().as_deref(),
            Some("33333333-3333-3333-3333-333333333333")
        );
        assert_eq!(token.get("suoid").unwrap(), None);
    }

    #[test]
    fn test_sas_token_decode() {
        let token = assemble_service_token(&test_fields(ScopeKind::Directory, Some(2)), "ab+c/d=");

        assert_eq!(token.get("sig").unwrap().as_deref(), Some("ab+c/d="));
        assert_eq!(
            token.get("st").unwrap().as_deref(),
            Some("2022-03-01T08:07:34Z")
        );
        assert_eq!(token.directory_depth().unwrap(), Some(2));

        let token = SasToken("sp=r&sdd=-1&sig=x".to_string());
        assert_eq!(
            token.directory_depth().unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );

        let token = SasToken("sp=r&broken&sig=x".to_string());
        assert!(token.query_pairs().is_err());
    }

    #[test]
    fn test_debug_hides_signature() {
        let token = assemble_service_token(&test_fields(ScopeKind::Blob, None), "secret");
        let debug = format!("{token:?}");
        assert!(debug.ends_with("&sig=***\")"));
        assert!(!debug.contains("secret"));
    }
}
