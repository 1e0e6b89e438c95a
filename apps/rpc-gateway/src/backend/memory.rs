// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process wallet backend.
//!
//! Used by the standalone host and by tests. Production builds wire the
//! extension's controllers behind the same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use super::{BackendError, Identity, SubjectMetadata, WalletBackend, Web3ShimUsageState};

/// Avalanche Fuji, the default network of this deployment.
const DEFAULT_CHAIN_ID: u64 = 43113;

#[derive(Debug)]
struct WalletState {
    unlocked: bool,
    chain_id: u64,
    accounts: Vec<String>,
    identities: HashMap<String, Identity>,
    permitted: HashMap<String, Vec<String>>,
    subjects: HashMap<String, SubjectMetadata>,
    shim_usage: HashMap<String, Web3ShimUsageState>,
}

impl Default for WalletState {
    fn default() -> Self {
        Self {
            unlocked: true,
            chain_id: DEFAULT_CHAIN_ID,
            accounts: Vec::new(),
            identities: HashMap::new(),
            permitted: HashMap::new(),
            subjects: HashMap::new(),
            shim_usage: HashMap::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryWallet {
    state: RwLock<WalletState>,
}

impl InMemoryWallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a keyring account with its identity.
    pub async fn insert_account(
        &self,
        address: impl Into<String>,
        name: impl Into<String>,
        last_selected: Option<i64>,
    ) {
        let address = address.into();
        let mut state = self.state.write().await;
        if !state.accounts.contains(&address) {
            state.accounts.push(address.clone());
        }
        state.identities.insert(
            address.clone(),
            Identity {
                address,
                name: name.into(),
                last_selected,
            },
        );
    }

    /// Add a keyring account with no identity entry.
    pub async fn insert_bare_account(&self, address: impl Into<String>) {
        let address = address.into();
        let mut state = self.state.write().await;
        if !state.accounts.contains(&address) {
            state.accounts.push(address);
        }
    }

    /// Mark an account as selected by the user at `timestamp`.
    pub async fn select_account(&self, address: &str, timestamp: i64) {
        let mut state = self.state.write().await;
        if let Some(identity) = state.identities.get_mut(address) {
            identity.last_selected = Some(timestamp);
        }
    }

    /// Let `origin` see `accounts` in its provider state.
    pub async fn permit_accounts(&self, origin: impl Into<String>, accounts: Vec<String>) {
        self.state.write().await.permitted.insert(origin.into(), accounts);
    }

    pub async fn set_unlocked(&self, unlocked: bool) {
        self.state.write().await.unlocked = unlocked;
    }

    pub async fn subject_metadata(&self, origin: &str) -> Option<SubjectMetadata> {
        self.state.read().await.subjects.get(origin).cloned()
    }
}

#[async_trait]
impl WalletBackend for InMemoryWallet {
    async fn accounts(&self) -> Result<Vec<String>, BackendError> {
        let state = self.state.read().await;
        if !state.unlocked {
            return Ok(Vec::new());
        }
        Ok(state.accounts.clone())
    }

    async fn identities(&self) -> Result<HashMap<String, Identity>, BackendError> {
        Ok(self.state.read().await.identities.clone())
    }

    async fn provider_state(&self, origin: &str) -> Result<Value, BackendError> {
        let state = self.state.read().await;
        let accounts = if state.unlocked {
            state.permitted.get(origin).cloned().unwrap_or_default()
        } else {
            Vec::new()
        };
        Ok(json!({
            "isUnlocked": state.unlocked,
            "chainId": format!("0x{:x}", state.chain_id),
            "networkVersion": state.chain_id.to_string(),
            "accounts": accounts,
        }))
    }

    async fn add_subject_metadata(&self, metadata: SubjectMetadata) -> Result<(), BackendError> {
        self.state
            .write()
            .await
            .subjects
            .insert(metadata.origin.clone(), metadata);
        Ok(())
    }

    async fn web3_shim_usage_state(
        &self,
        origin: &str,
    ) -> Result<Option<Web3ShimUsageState>, BackendError> {
        Ok(self.state.read().await.shim_usage.get(origin).copied())
    }

    async fn set_web3_shim_usage_recorded(&self, origin: &str) -> Result<(), BackendError> {
        self.state
            .write()
            .await
            .shim_usage
            .insert(origin.to_string(), Web3ShimUsageState::Recorded);
        Ok(())
    }

    async fn ui_snapshot(&self) -> Result<Value, BackendError> {
        let state = self.state.read().await;
        Ok(json!({
            "isUnlocked": state.unlocked,
            "chainId": format!("0x{:x}", state.chain_id),
            "identities": state.identities,
            "accountCount": state.accounts.len(),
            "snapshotAt": chrono::Utc::now().to_rfc3339(),
        }))
    }
}
