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

use crate::permission::SignedPermissions;
use crate::resource::{ResourceScope, ScopeKind};

/// Filesystem operations that have a minimal token shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `append`
    Append,
    /// `check-access`
    CheckAccess,
    /// `create-directory`
    CreateDirectory,
    /// `create-file`
    CreateFile,
    /// `delete`
    Delete,
    /// `delete-recursive`, scoped to the directory.
    DeleteRecursive,
    /// `flush`
    Flush,
    /// `get-acl`
    GetAcl,
    /// `get-status`
    GetStatus,
    /// `get-properties`
    GetProperties,
    /// `list`
    List,
    /// `list-recursive`, scoped to the directory.
    ListRecursive,
    /// `read`
    Read,
    /// `rename-source`
    RenameSource,
    /// `rename-destination`
    RenameDestination,
    /// `set-acl`
    SetAcl,
    /// `set-owner`
    SetOwner,
    /// `set-permission`
    SetPermission,
    /// `set-properties`
    SetProperties,
}

/// (operation, name, permission, scope kind), indexed by variant.
const OPERATIONS: [(Operation, &str, &str, ScopeKind); 19] = [
    (Operation::Append, "append", "w", ScopeKind::Blob),
    (Operation::CheckAccess, "check-access", "e", ScopeKind::Blob),
    (Operation::CreateDirectory, "create-directory", "w", ScopeKind::Blob),
    (Operation::CreateFile, "create-file", "w", ScopeKind::Blob),
    (Operation::Delete, "delete", "d", ScopeKind::Blob),
    (Operation::DeleteRecursive, "delete-recursive", "d", ScopeKind::Directory),
    (Operation::Flush, "flush", "w", ScopeKind::Blob),
    (Operation::GetAcl, "get-acl", "e", ScopeKind::Blob),
    (Operation::GetStatus, "get-status", "e", ScopeKind::Blob),
    (Operation::GetProperties, "get-properties", "r", ScopeKind::Blob),
    (Operation::List, "list", "l", ScopeKind::Blob),
    (Operation::ListRecursive, "list-recursive", "l", ScopeKind::Directory),
    (Operation::Read, "read", "r", ScopeKind::Blob),
    (Operation::RenameSource, "rename-source", "m", ScopeKind::Blob),
    (Operation::RenameDestination, "rename-destination", "m", ScopeKind::Blob),
    (Operation::SetAcl, "set-acl", "p", ScopeKind::Blob),
    (Operation::SetOwner, "set-owner", "o", ScopeKind::Blob),
    (Operation::SetPermission, "set-permission", "p", ScopeKind::Blob),
    (Operation::SetProperties, "set-properties", "w", ScopeKind::Blob),
];

impl Operation {
    /// All operations in table order.
    pub fn all() -> impl Iterator<Item = Operation> {
        OPERATIONS.iter().map(|(op, ..)| *op)
    }

    fn entry(&self) -> &'static (Operation, &'static str, &'static str, ScopeKind) {
        &OPERATIONS[*self as usize]
    }

    /// Name of the operation, such as `delete-recursive`.
    pub fn name(&self) -> &'static str {
        self.entry().1
    }

    /// Minimal permission the operation needs.
    pub fn permissions(&self) -> SignedPermissions {
        SignedPermissions::from_static(self.entry().2)
    }

    /// Scope kind the token is issued for.
    pub fn scope_kind(&self) -> ScopeKind {
        self.entry().3
    }

    /// Resolve the scope of this operation on `path`.
    ///
    /// Directory scoped operations carry the depth of `path`.
    pub fn scope(&self, path: &str) -> Result<ResourceScope> {
        match self.scope_kind() {
            ScopeKind::Directory => ResourceScope::directory(path),
            ScopeKind::Blob => ResourceScope::blob(path),
            ScopeKind::Container => Ok(ResourceScope::container()),
        }
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        OPERATIONS
            .iter()
            .find(|(_, name, ..)| *name == s)
            .map(|(op, ..)| *op)
            .ok_or_else(|| Error::invalid_argument(format!("unknown operation: {s:?}")))
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
