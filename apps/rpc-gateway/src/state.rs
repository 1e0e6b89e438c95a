// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::backend::{InMemoryWallet, WalletBackend};
use crate::config::GatewayConfig;
use crate::connection::{
    ClassifierPolicy, ConnectionRouter, MemorySessionStorage, RequestAccountBindings,
    RuntimeSurface, SessionStorage,
};
use crate::injection::InjectionGate;
use crate::rpc::handlers::build_registry;
use crate::rpc::{HookTable, MethodGateway, MethodNotFound, RpcPipeline};

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ConnectionRouter>,
    pub pipeline: Arc<RpcPipeline>,
    pub gate: Arc<InjectionGate>,
    pub bindings: Arc<RequestAccountBindings>,
    pub session: Arc<dyn SessionStorage>,
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Assemble the host from configuration and its collaborators.
    ///
    /// The registry is built here, once, from the local handler group.
    pub fn new(
        config: &GatewayConfig,
        backend: Arc<dyn WalletBackend>,
        session: Arc<dyn SessionStorage>,
    ) -> Self {
        let bindings = Arc::new(RequestAccountBindings::new(config.binding_capacity));

        // Ports arrive over `/v1/connect`, which any page can open.
        let policy = ClassifierPolicy::new(config.platform, config.extension_id.clone())
            .with_blocked_port_names(config.blocked_port_names.iter().cloned())
            .requiring_origin_proof();

        let router = ConnectionRouter::new(
            policy,
            RuntimeSurface::new(config.runtime_apis.iter().cloned()),
            Arc::clone(&bindings),
            Arc::clone(&session),
            Arc::clone(&backend),
        );

        let registry = build_registry(Vec::new());
        tracing::info!(methods = registry.len(), "Capability registry built");
        let gateway = MethodGateway::new(registry, HookTable::new(backend));

        Self {
            router: Arc::new(router),
            pipeline: Arc::new(RpcPipeline::new(gateway, Arc::new(MethodNotFound))),
            gate: Arc::new(InjectionGate::new(config.denylist.clone())),
            bindings,
            session,
            shutdown: CancellationToken::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(
            &GatewayConfig::default(),
            Arc::new(InMemoryWallet::new()),
            Arc::new(MemorySessionStorage::new()),
        )
    }
}
