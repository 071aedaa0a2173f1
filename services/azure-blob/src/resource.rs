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

use sassign_core::{Error, Result};

/// The granularity a token grants access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// A whole container, `sr=c`.
    Container,
    /// A directory and everything below it, `sr=d`.
    Directory,
    /// A single blob or file, `sr=b`.
    Blob,
}

impl ScopeKind {
    /// The `sr` code of this scope.
    pub fn signed_resource(&self) -> &'static str {
        match self {
            ScopeKind::Container => "c",
            ScopeKind::Directory => "d",
            ScopeKind::Blob => "b",
        }
    }
}

impl Display for ScopeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.signed_resource())
    }
}

/// A validated resource scope.
///
/// `depth` is `Some` if and only if the kind is [`ScopeKind::Directory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceScope {
    kind: ScopeKind,
    path: String,
    depth: Option<u32>,
}

impl ResourceScope {
    /// Scope covering the whole container.
    pub fn container() -> Self {
        Self {
            kind: ScopeKind::Container,
            path: String::new(),
            depth: None,
        }
    }

    /// Scope covering `directory` and everything below it.
    ///
    /// The root directory is the empty string.
    pub fn directory(directory: &str) -> Result<Self> {
        validate_path(directory)?;
        Ok(Self {
            kind: ScopeKind::Directory,
            path: directory.to_string(),
            depth: Some(directory_depth(directory)),
        })
    }

    /// Scope covering the single blob at `path`.
    ///
    /// The empty path addresses the root folder of the container.
    pub fn blob(path: &str) -> Result<Self> {
        validate_path(path)?;
        Ok(Self {
            kind: ScopeKind::Blob,
            path: path.to_string(),
            depth: None,
        })
    }

    /// Kind of this scope.
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// Path relative to the container, empty for container scope.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// `sdd` value, only present for directory scope.
    pub fn depth(&self) -> Option<u32> {
        self.depth
    }

    /// Canonicalized resource of this scope inside `container` of `account`.
    pub fn canonical_resource(&self, account: &str, container: &str) -> String {
        canonical_resource(account, container, &self.path, self.kind)
    }
}

/// Number of path segments of `path`: 0 for the root, otherwise one more
/// than the number of `/`.
pub fn directory_depth(path: &str) -> u32 {
    if path.is_empty() {
        return 0;
    }

    1 + path.matches('/').count() as u32
}

/// Parse a caller supplied `sdd` value.
pub fn parse_directory_depth(value: &str) -> Result<u32> {
    value.parse::<u32>().map_err(|e| {
        Error::invalid_argument(format!(
            "directory depth must be a non-negative integer, got {value:?}"
        ))
        .with_source(e)
    })
}

/// Build the canonicalized resource.
///
/// - Container: `/blob/{account}/{container}`
/// - Directory, Blob: `/blob/{account}/{container}/{path}`
///
/// The root path is the empty string and renders as `/blob/{account}/{container}/`.
///
/// `path` must already be validated: it never starts with `/`.
pub fn canonical_resource(account: &str, container: &str, path: &str, kind: ScopeKind) -> String {
    debug_assert!(!path.starts_with('/'), "path must be validated by caller");

    match kind {
        ScopeKind::Container => format!("/blob/{account}/{container}"),
        ScopeKind::Directory | ScopeKind::Blob => format!("/blob/{account}/{container}/{path}"),
    }
}

/// Reject empty container names.
pub fn validate_container(container: &str) -> Result<()> {
    if container.is_empty() {
        return Err(Error::invalid_argument("container must not be empty"));
    }
    Ok(())
}

/// Reject paths that start with `/`, the root path is the empty string.
pub fn validate_path(path: &str) -> Result<()> {
    if path.starts_with('/') {
        return Err(Error::invalid_argument("path must not start with '/'")
            .with_context(format!("path: {path}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sassign_core::ErrorKind;

    #[test]
    fn test_directory_depth() {
        let cases = vec![
            ("", 0),
            ("d1", 1),
            ("d1/d2", 2),
            ("d1/d2/file.txt", 3),
            ("d1/", 2),
        ];

        for (input, expected) in cases {
            assert_eq!(directory_depth(input), expected, "Failed on input: {input:?}");
        }
    }

    #[test]
    fn test_parse_directory_depth() {
        assert_eq!(parse_directory_depth("0").unwrap(), 0);
        assert_eq!(parse_directory_depth("3").unwrap(), 3);

        for input in ["", "-1", "two", "1.5"] {
            let err = parse_directory_depth(input).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "input: {input:?}");
        }
    }

    #[test]
    fn test_canonical_resource() {
        let cases = vec![
            ("", ScopeKind::Container, "/blob/acc/con"),
            ("dir1/file", ScopeKind::Container, "/blob/acc/con"),
            ("dir1/file", ScopeKind::Blob, "/blob/acc/con/dir1/file"),
            ("dir1/dir2", ScopeKind::Directory, "/blob/acc/con/dir1/dir2"),
            ("", ScopeKind::Directory, "/blob/acc/con/"),
            ("", ScopeKind::Blob, "/blob/acc/con/"),
        ];

        for (path, kind, expected) in cases {
            assert_eq!(
                canonical_resource("acc", "con", path, kind),
                expected,
                "Failed on input: {path:?} {kind:?}"
            );
        }
    }

    #[test]
    fn test_resource_scope() {
        let scope = ResourceScope::directory("d1/d2").unwrap();
        assert_eq!(scope.kind(), ScopeKind::Directory);
        assert_eq!(scope.depth(), Some(2));
        assert_eq!(scope.canonical_resource("acc", "con"), "/blob/acc/con/d1/d2");

        let scope = ResourceScope::blob("d1/file.txt").unwrap();
        assert_eq!(scope.depth(), None);
        assert_eq!(scope.kind().signed_resource(), "b");

        let scope = ResourceScope::container();
        assert_eq!(scope.depth(), None);
        assert_eq!(scope.path(), "");

        let err = ResourceScope::blob("/d1/file.txt").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = ResourceScope::directory("/").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let scope = ResourceScope::directory("").unwrap();
        assert_eq!(scope.depth(), Some(0));
        assert_eq!(scope.canonical_resource("acc", "con"), "/blob/acc/con/");

        let scope = ResourceScope::blob("").unwrap();
        assert_eq!(scope.kind(), ScopeKind::Blob);
        assert_eq!(scope.canonical_resource("acc", "con"), "/blob/acc/con/");
    }

    #[test]
    fn test_validate_container() {
        assert!(validate_container("mycontainer").is_ok());
        assert_eq!(
            validate_container("").unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }
}
