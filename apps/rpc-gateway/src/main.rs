// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process, sync::Arc};

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use wallet_rpc_gateway::{
    api::router,
    backend::InMemoryWallet,
    config::GatewayConfig,
    connection::{FileSessionStorage, MemorySessionStorage, SessionStorage},
    state::AppState,
    telemetry,
};

#[tokio::main]
async fn main() {
    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            process::exit(1);
        }
    };

    telemetry::init(config.log_format);

    let session: Arc<dyn SessionStorage> = match &config.session_dir {
        Some(dir) => match FileSessionStorage::open(dir) {
            Ok(storage) => Arc::new(storage),
            Err(e) => {
                tracing::error!(error = %e, dir = %dir.display(), "Failed to open session storage");
                process::exit(1);
            }
        },
        None => Arc::new(MemorySessionStorage::new()),
    };

    let state = AppState::new(&config, Arc::new(InMemoryWallet::new()), session);
    let shutdown = state.shutdown.clone();
    let app = router(state);

    let listener = match TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, addr = %config.bind_addr, "Failed to bind");
            process::exit(1);
        }
    };

    tracing::info!(
        addr = %config.bind_addr,
        platform = %config.platform,
        denylist_entries = config.denylist.len(),
        "Extension RPC gateway listening (docs at /docs)"
    );

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
    {
        tracing::error!(error = %e, "Server failed");
        process::exit(1);
    }

    tracing::info!("Extension RPC gateway stopped");
}

async fn shutdown_signal(token: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested, closing ports");
    token.cancel();
}
