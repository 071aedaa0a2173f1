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

//! Azure Blob Storage shared access signature generator
//!
//! This crate builds SAS tokens for hierarchical namespace storage accounts:
//! - Service SAS signed with the account key
//! - User delegation SAS signed with a delegated key fetched from the service
//!
//! # Example
//!
//! ```rust,no_run
//! use sassign_azure_blob::{
//!     Config, DelegationSasGenerator, ServiceSasGenerator, StaticTokenProvider,
//!     UserDelegationKeyIssuer,
//! };
//! use sassign_core::{Context, OsEnv, Result};
//! use sassign_http_send_reqwest::ReqwestHttpSend;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!     let config = Config::default().from_env(&ctx);
//!
//!     // Sign with the account key.
//!     let generator = ServiceSasGenerator::from_config(&config)?;
//!     let expiry = sassign_core::time::now() + chrono::TimeDelta::hours(1);
//!     let token = generator.generate_sas_for_path("mycontainer", "dir/file.txt", expiry, "r")?;
//!     println!("https://myaccount.blob.core.windows.net/mycontainer/dir/file.txt?{token}");
//!
//!     // Sign with a user delegation key.
//!     let issuer = UserDelegationKeyIssuer::from_config(
//!         &config,
//!         StaticTokenProvider::new("<oauth access token>"),
//!     )?;
//!     let generator = DelegationSasGenerator::from_config(ctx, &config, issuer)?;
//!     let token = generator
//!         .generate_sas_for_operation("mycontainer", "dir", "delete-recursive")
//!         .await?;
//!     println!("{token}");
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

mod constants;

mod config;
pub use config::Config;

mod permission;
pub use permission::is_valid_signed_permission;
pub use permission::SignedPermissions;

mod resource;
pub use resource::canonical_resource;
pub use resource::directory_depth;
pub use resource::parse_directory_depth;
pub use resource::{ResourceScope, ScopeKind};

mod signer;
pub use signer::Signer;

mod string_to_sign;
pub use string_to_sign::{
    delegation_string_to_sign, service_string_to_sign, DelegationFields, SignedFields,
    UserPrincipal,
};

mod token;
pub use token::{percent_decode, percent_encode, SasToken, TokenAssembler};

mod credential;
pub use credential::BearerToken;

mod provide_credential;
pub use provide_credential::*;

mod delegated_key;
pub use delegated_key::{DelegatedKey, IssueDelegatedKey};

mod user_delegation_key;
pub use user_delegation_key::UserDelegationKeyIssuer;

mod key_cache;
pub use key_cache::{DelegatedKeyCache, SigningKey};

mod operation;
pub use operation::Operation;

mod service_sas;
pub use service_sas::ServiceSasGenerator;

mod delegation_sas;
pub use delegation_sas::{DelegationSasGenerator, OperationSasOptions};
