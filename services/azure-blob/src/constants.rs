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

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

// Headers used in azure services.
pub const X_MS_DATE: &str = "x-ms-date";
pub const X_MS_VERSION: &str = "x-ms-version";

/// Authentication version embedded as `sv` and used for the user delegation key request.
pub const SAS_VERSION: &str = "2020-02-10";

/// `sks`: user delegation keys are always issued by the blob service.
pub const SIGNED_KEY_SERVICE: &str = "b";

/// Canonical order of the signed permission characters.
///
/// read, add, create, write, delete, delete version, list, tags, find,
/// move, execute, ownership, permissions.
pub const PERMISSION_ORDER: &str = "racwdxltfmeop";

/// `st` is back-dated by this many minutes to absorb clock skew.
pub const START_TIME_BACKOFF_MINUTES: i64 = 5;

/// Delegated keys are renewed once per day.
pub const KEY_RENEWAL_PERIOD_DAYS: i64 = 1;

/// Delegated keys are requested for twice the renewal period.
pub const KEY_EXPIRY_PERIOD_DAYS: i64 = KEY_RENEWAL_PERIOD_DAYS * 2;

// Env values used by config.
pub const AZBLOB_ACCOUNT_NAME: &str = "AZBLOB_ACCOUNT_NAME";
pub const AZBLOB_ACCOUNT_KEY: &str = "AZBLOB_ACCOUNT_KEY";
pub const AZBLOB_ENDPOINT: &str = "AZBLOB_ENDPOINT";

/// Space becomes `%20` and `/` stays literal.
pub static AZURE_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'/')
    .remove(b'~');
