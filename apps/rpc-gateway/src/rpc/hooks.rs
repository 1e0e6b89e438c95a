// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Backend hooks and least-authority selection.
//!
//! The [`HookTable`] is the full set of backend capabilities the host can
//! offer. A handler is handed a [`GrantedHooks`] built from the table and its
//! own declared [`HookName`]s; every accessor on it checks the grant before
//! touching the backend, so an undeclared hook is unreachable.
//!
//! Handlers must treat granted hooks as read-only.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::errors::RpcError;
use crate::backend::{Identity, SubjectMetadata, WalletBackend, Web3ShimUsageState};

/// Named backend capability a handler may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HookName {
    GetAccounts,
    GetIdentities,
    GetProviderState,
    AddSubjectMetadata,
    GetWeb3ShimUsageState,
    SetWeb3ShimUsageRecorded,
}

impl HookName {
    pub const ALL: [HookName; 6] = [
        HookName::GetAccounts,
        HookName::GetIdentities,
        HookName::GetProviderState,
        HookName::AddSubjectMetadata,
        HookName::GetWeb3ShimUsageState,
        HookName::SetWeb3ShimUsageRecorded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HookName::GetAccounts => "getAccounts",
            HookName::GetIdentities => "getIdentities",
            HookName::GetProviderState => "getProviderState",
            HookName::AddSubjectMetadata => "addSubjectMetadata",
            HookName::GetWeb3ShimUsageState => "getWeb3ShimUsageState",
            HookName::SetWeb3ShimUsageRecorded => "setWeb3ShimUsageRecorded",
        }
    }
}

impl fmt::Display for HookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every hook the backend makes available.
#[derive(Clone)]
pub struct HookTable {
    backend: Arc<dyn WalletBackend>,
    available: BTreeSet<HookName>,
}

impl HookTable {
    /// Table exposing every [`HookName`] backed by `backend`.
    pub fn new(backend: Arc<dyn WalletBackend>) -> Self {
        Self {
            backend,
            available: HookName::ALL.into_iter().collect(),
        }
    }

    /// Drop a hook the backend cannot provide.
    pub fn without(mut self, hook: HookName) -> Self {
        self.available.remove(&hook);
        self
    }

    pub fn available(&self) -> impl Iterator<Item = HookName> + '_ {
        self.available.iter().copied()
    }

    /// The subset of this table whose keys appear in `declared`.
    pub fn select(&self, declared: &BTreeSet<HookName>) -> GrantedHooks {
        GrantedHooks {
            backend: Arc::clone(&self.backend),
            granted: self.available.intersection(declared).copied().collect(),
        }
    }
}

/// Least-authority view of the backend handed to one handler invocation.
#[derive(Clone)]
pub struct GrantedHooks {
    backend: Arc<dyn WalletBackend>,
    granted: BTreeSet<HookName>,
}

impl fmt::Debug for GrantedHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrantedHooks")
            .field("granted", &self.granted)
            .finish_non_exhaustive()
    }
}

impl GrantedHooks {
    pub fn names(&self) -> impl Iterator<Item = HookName> + '_ {
        self.granted.iter().copied()
    }

    pub fn contains(&self, hook: HookName) -> bool {
        self.granted.contains(&hook)
    }

    fn require(&self, hook: HookName) -> Result<&dyn WalletBackend, RpcError> {
        if self.granted.contains(&hook) {
            Ok(self.backend.as_ref())
        } else {
            Err(RpcError::HookNotGranted { hook })
        }
    }

    pub async fn get_accounts(&self) -> Result<Vec<String>, RpcError> {
        Ok(self.require(HookName::GetAccounts)?.accounts().await?)
    }

    pub async fn get_identities(&self) -> Result<HashMap<String, Identity>, RpcError> {
        Ok(self.require(HookName::GetIdentities)?.identities().await?)
    }

    pub async fn get_provider_state(&self, origin: &str) -> Result<Value, RpcError> {
        Ok(self
            .require(HookName::GetProviderState)?
            .provider_state(origin)
            .await?)
    }

    pub async fn add_subject_metadata(&self, metadata: SubjectMetadata) -> Result<(), RpcError> {
        Ok(self
            .require(HookName::AddSubjectMetadata)?
            .add_subject_metadata(metadata)
            .await?)
    }

    pub async fn get_web3_shim_usage_state(
        &self,
        origin: &str,
    ) -> Result<Option<Web3ShimUsageState>, RpcError> {
        Ok(self
            .require(HookName::GetWeb3ShimUsageState)?
            .web3_shim_usage_state(origin)
            .await?)
    }

    pub async fn set_web3_shim_usage_recorded(&self, origin: &str) -> Result<(), RpcError> {
        Ok(self
            .require(HookName::SetWeb3ShimUsageRecorded)?
            .set_web3_shim_usage_recorded(origin)
            .await?)
    }
}
