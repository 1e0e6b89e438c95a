// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Backend
//!
//! The controllers that actually own accounts, identities and site metadata
//! live outside this crate. This module defines the seam they plug into.
//! Capability handlers never see a `WalletBackend` directly: they receive a
//! [`GrantedHooks`](crate::rpc::hooks::GrantedHooks) view restricted to the
//! hooks they declared.

pub mod memory;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

pub use memory::InMemoryWallet;

/// Identity metadata for one keyring account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub address: String,
    pub name: String,
    /// Unix millis of the last time the user selected this account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_selected: Option<i64>,
}

/// Metadata a site reports about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectMetadata {
    pub origin: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Whether a site's use of the legacy `window.web3` shim has been noted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Web3ShimUsageState {
    Recorded,
    Dismissed,
}

/// Failure reported by a backend controller.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Wallet is locked")]
    Locked,

    #[error("{0}")]
    Controller(String),
}

/// Operations exposed by the wallet's controller layer.
#[async_trait]
pub trait WalletBackend: Send + Sync {
    /// Accounts of the currently unlocked keyring.
    async fn accounts(&self) -> Result<Vec<String>, BackendError>;

    /// Identity metadata keyed by address.
    async fn identities(&self) -> Result<HashMap<String, Identity>, BackendError>;

    /// Provider bootstrap state for a site.
    async fn provider_state(&self, origin: &str) -> Result<Value, BackendError>;

    async fn add_subject_metadata(&self, metadata: SubjectMetadata) -> Result<(), BackendError>;

    async fn web3_shim_usage_state(
        &self,
        origin: &str,
    ) -> Result<Option<Web3ShimUsageState>, BackendError>;

    async fn set_web3_shim_usage_recorded(&self, origin: &str) -> Result<(), BackendError>;

    /// Snapshot the UI reads on startup from session storage.
    async fn ui_snapshot(&self) -> Result<Value, BackendError>;
}
