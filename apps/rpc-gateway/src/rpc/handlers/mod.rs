// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Locally defined capability handlers and registry assembly.

pub mod domain_metadata;
pub mod eth_accounts;
pub mod provider_state;
pub mod web3_shim;

use super::errors::RpcError;
use super::registry::{CapabilityRegistry, HandlerDescriptor};
use super::types::JsonRpcRequest;

/// Handlers owned by this crate, in registration order.
pub fn local_handlers() -> Vec<HandlerDescriptor> {
    vec![
        eth_accounts::descriptor(),
        provider_state::descriptor(),
        domain_metadata::descriptor(),
        web3_shim::descriptor(),
    ]
}

/// Local handlers first, then groups contributed by other subsystems.
///
/// A contributed handler cannot take over a name a local handler already
/// registered.
pub fn build_registry<G>(contributed: G) -> CapabilityRegistry
where
    G: IntoIterator<Item = Vec<HandlerDescriptor>>,
{
    CapabilityRegistry::from_groups(std::iter::once(local_handlers()).chain(contributed))
}

/// Origin stamped on the request by the transport.
pub(crate) fn request_origin(request: &JsonRpcRequest) -> Result<&str, RpcError> {
    request.origin.as_deref().ok_or_else(|| RpcError::Internal {
        message: format!("Request for \"{}\" has no origin", request.method),
    })
}
