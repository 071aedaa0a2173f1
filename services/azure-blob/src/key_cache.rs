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

use std::sync::{Arc, RwLock};

use log::{info, warn};
use sassign_core::time::{format_iso8601, DateTime};
use sassign_core::{Context, Error, Result};

use crate::constants::{
    KEY_EXPIRY_PERIOD_DAYS, KEY_RENEWAL_PERIOD_DAYS, SIGNED_KEY_SERVICE,
    START_TIME_BACKOFF_MINUTES,
};
use crate::delegated_key::{DelegatedKey, IssueDelegatedKey};
use crate::signer::Signer;

/// SigningKey is one published delegated key together with the signer built from it.
///
/// Token fields and signature must come from the same `SigningKey`.
#[derive(Debug)]
pub struct SigningKey {
    key: DelegatedKey,
    signer: Signer,
    renew_at: DateTime,
}

impl SigningKey {
    /// The delegated key.
    pub fn key(&self) -> &DelegatedKey {
        &self.key
    }

    /// Signer keyed with the decoded key value.
    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Time after which the key is replaced.
    pub fn renew_at(&self) -> DateTime {
        self.renew_at
    }

    fn is_fresh(&self, now: DateTime) -> bool {
        now < self.renew_at && now < self.key.signed_expiry
    }
}

/// DelegatedKeyCache holds the current delegated key and refreshes it.
///
/// Readers take a cheap snapshot. At most one refresh runs at a time, callers
/// arriving during a refresh wait for it and reuse its result. A failed
/// refresh publishes nothing.
#[derive(Debug)]
pub struct DelegatedKeyCache {
    issuer: Arc<dyn IssueDelegatedKey>,
    state: RwLock<Option<Arc<SigningKey>>>,
    refresh: tokio::sync::Mutex<()>,
}

impl DelegatedKeyCache {
    /// Create an empty cache, the first key is fetched on demand.
    pub fn new(issuer: impl IssueDelegatedKey) -> Self {
        Self::from_arc(Arc::new(issuer))
    }

    /// Create an empty cache over a shared issuer.
    pub fn from_arc(issuer: Arc<dyn IssueDelegatedKey>) -> Self {
        Self {
            issuer,
            state: RwLock::new(None),
            refresh: tokio::sync::Mutex::new(()),
        }
    }

    /// The currently published key, if any.
    pub fn snapshot(&self) -> Option<Arc<SigningKey>> {
        self.state.read().expect("lock poisoned").clone()
    }

    /// Return a key that is fresh according to `clock`, fetching a new one if needed.
    ///
    /// The clock is read again after waiting for an in-flight refresh.
    pub async fn ensure_fresh(
        &self,
        ctx: &Context,
        clock: impl Fn() -> DateTime,
    ) -> Result<Arc<SigningKey>> {
        if let Some(key) = self.fresh_snapshot(clock()) {
            return Ok(key);
        }

        let _guard = self.refresh.lock().await;
        let now = clock();
        // Another caller may have refreshed while we were waiting.
        if let Some(key) = self.fresh_snapshot(now) {
            return Ok(key);
        }

        self.refresh_locked(ctx, now).await
    }

    /// Fetch and publish a new key regardless of the current one.
    pub async fn refresh(
        &self,
        ctx: &Context,
        clock: impl Fn() -> DateTime,
    ) -> Result<Arc<SigningKey>> {
        let _guard = self.refresh.lock().await;
        self.refresh_locked(ctx, clock()).await
    }

    fn fresh_snapshot(&self, now: DateTime) -> Option<Arc<SigningKey>> {
        self.snapshot().filter(|key| key.is_fresh(now))
    }

    async fn refresh_locked(&self, ctx: &Context, now: DateTime) -> Result<Arc<SigningKey>> {
        let start = now - chrono::TimeDelta::minutes(START_TIME_BACKOFF_MINUTES);
        let expiry = now + chrono::TimeDelta::days(KEY_EXPIRY_PERIOD_DAYS);

        let key = self
            .issuer
            .issue_delegated_key(ctx, start, expiry)
            .await
            .inspect_err(|e| warn!("failed to refresh user delegation key: {e}"))?;

        if key.signed_expiry <= now {
            warn!(
                "issuer returned an expired user delegation key: ske={}",
                format_iso8601(key.signed_expiry)
            );
            return Err(Error::key_acquisition_failed(
                "issued user delegation key is already expired",
            )
            .with_context(format!("ske: {}", format_iso8601(key.signed_expiry))));
        }

        if key.service != SIGNED_KEY_SERVICE {
            return Err(Error::key_acquisition_failed(format!(
                "issued user delegation key is for service {:?}, expected {SIGNED_KEY_SERVICE:?}",
                key.service
            )));
        }

        let signer = Signer::from_base64(&key.value)
            .map_err(|e| e.with_context("invalid user delegation key value"))?;

        info!(
            "refreshed user delegation key for {}, valid until {}",
            key.object_id,
            format_iso8601(key.signed_expiry)
        );

        let signing_key = Arc::new(SigningKey {
            key,
            signer,
            renew_at: now + chrono::TimeDelta::days(KEY_RENEWAL_PERIOD_DAYS),
        });
        *self.state.write().expect("lock poisoned") = Some(signing_key.clone());

        Ok(signing_key)
    }
}
