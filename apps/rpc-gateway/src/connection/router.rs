// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wires a classified connection into the host.
//!
//! - `Internal`: write the UI snapshot to session storage, then greet with
//!   `CONNECTION_READY` when the background runs as a service worker.
//! - `External`: watch for `eth_requestAccounts` and bind origin → tab.
//! - `Blocked` / `Rejected`: nothing is wired.
//!
//! Only `data.method` of external frames is inspected here. Everything else
//! is left to the RPC pipeline.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use super::bindings::RequestAccountBindings;
use super::classifier::{classify, ClassifierPolicy};
use super::session::SessionStorage;
use super::{Classification, Connection, PortInfo, PortMessage};
use crate::backend::WalletBackend;

/// Handshake name sent to internal ports of a service-worker background.
pub const CONNECTION_READY: &str = "CONNECTION_READY";

/// Session storage key holding the UI bootstrap snapshot.
pub const UI_BOOTSTRAP_KEY: &str = "uiBootstrapState";

/// Method whose sender tab is remembered per origin.
pub const REQUEST_ACCOUNTS_METHOD: &str = "eth_requestAccounts";

/// Global only present when the background runs as a service worker.
const SERVICE_WORKER_API: &str = "ServiceWorkerGlobalScope";

/// API surface the extension runtime reports for the background context.
#[derive(Debug, Clone, Default)]
pub struct RuntimeSurface {
    apis: BTreeSet<String>,
}

impl RuntimeSurface {
    pub fn new<I, S>(apis: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            apis: apis.into_iter().map(Into::into).collect(),
        }
    }

    pub fn exposes(&self, api: &str) -> bool {
        self.apis.contains(api)
    }

    pub fn is_service_worker(&self) -> bool {
        self.exposes(SERVICE_WORKER_API)
    }
}

/// Outcome of wiring a port.
#[derive(Debug, Clone)]
pub struct Wiring {
    pub connection: Connection,
    /// Frame to send before any other traffic, if any.
    pub greeting: Option<PortMessage>,
}

pub struct ConnectionRouter {
    policy: ClassifierPolicy,
    runtime: RuntimeSurface,
    bindings: Arc<RequestAccountBindings>,
    session: Arc<dyn SessionStorage>,
    backend: Arc<dyn WalletBackend>,
}

impl ConnectionRouter {
    pub fn new(
        policy: ClassifierPolicy,
        runtime: RuntimeSurface,
        bindings: Arc<RequestAccountBindings>,
        session: Arc<dyn SessionStorage>,
        backend: Arc<dyn WalletBackend>,
    ) -> Self {
        Self {
            policy,
            runtime,
            bindings,
            session,
            backend,
        }
    }

    pub fn bindings(&self) -> &RequestAccountBindings {
        &self.bindings
    }

    /// Classify `port` and perform the side effects of its class.
    ///
    /// Side-effect failures are logged; they never change the classification.
    pub async fn connect(&self, port: &PortInfo) -> Wiring {
        let classification = classify(port, &self.policy);

        let origin = match &classification {
            Classification::Internal => port
                .sender
                .as_ref()
                .and_then(|s| s.origin.clone())
                .or_else(|| self.policy.extension_origin()),
            Classification::External { origin, .. } => Some(origin.clone()),
            Classification::Blocked | Classification::Rejected => None,
        };

        let connection = Connection::new(port, self.policy.platform(), classification, origin);

        let greeting = match connection.classification() {
            Classification::Internal => {
                info!(
                    connection_id = %connection.id(),
                    port = %connection.process_name(),
                    "Internal connection established"
                );
                self.write_ui_snapshot().await;
                self.runtime
                    .is_service_worker()
                    .then(|| PortMessage::new(CONNECTION_READY, Value::Null))
            }
            Classification::External { tab_id, origin } => {
                info!(
                    connection_id = %connection.id(),
                    port = %connection.process_name(),
                    tab_id,
                    %origin,
                    "External connection established"
                );
                None
            }
            Classification::Blocked => {
                warn!(port = %connection.process_name(), "Ignoring connection on reserved port name");
                None
            }
            Classification::Rejected => {
                warn!(
                    port = %connection.process_name(),
                    sender_origin = connection.sender_origin().unwrap_or("-"),
                    "Rejecting connection with no trusted sender"
                );
                None
            }
        };

        Wiring {
            connection,
            greeting,
        }
    }

    /// Listener for frames arriving on `connection`.
    ///
    /// Returns `true` when the frame updated a request-account binding.
    pub fn observe(&self, connection: &Connection, frame: &PortMessage) -> bool {
        let Classification::External { tab_id, origin } = connection.classification() else {
            return false;
        };
        if frame.method() != Some(REQUEST_ACCOUNTS_METHOD) {
            return false;
        }
        self.bindings.record(origin, *tab_id);
        tracing::debug!(%origin, tab_id, "Bound origin to requesting tab");
        true
    }

    async fn write_ui_snapshot(&self) {
        let snapshot = match self.backend.ui_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Failed to build UI snapshot");
                return;
            }
        };
        if let Err(e) = self.session.set(UI_BOOTSTRAP_KEY, snapshot).await {
            warn!(error = %e, "Failed to persist UI snapshot to session storage");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::backend::InMemoryWallet;
    use crate::connection::session::MemorySessionStorage;
    use crate::connection::{Platform, Sender, Tab};

    const EXT_ID: &str = "abcdefghijklmnop";

    struct Harness {
        router: ConnectionRouter,
        session: Arc<MemorySessionStorage>,
        bindings: Arc<RequestAccountBindings>,
    }

    fn harness(platform: Platform, runtime: RuntimeSurface) -> Harness {
        let session = Arc::new(MemorySessionStorage::new());
        let bindings = Arc::new(RequestAccountBindings::default());
        let router = ConnectionRouter::new(
            ClassifierPolicy::new(platform, EXT_ID),
            runtime,
            bindings.clone(),
            session.clone(),
            Arc::new(InMemoryWallet::new()),
        );
        Harness {
            router,
            session,
            bindings,
        }
    }

    fn internal_port() -> PortInfo {
        PortInfo {
            name: "popup".into(),
            sender: Some(Sender {
                origin: Some(format!("chrome-extension://{EXT_ID}")),
                ..Default::default()
            }),
        }
    }

    fn page_port(tab_id: i64, url: &str) -> PortInfo {
        PortInfo {
            name: "contentscript".into(),
            sender: Some(Sender {
                origin: None,
                tab: Some(Tab { id: tab_id }),
                url: Some(url.into()),
            }),
        }
    }

    fn request_accounts() -> PortMessage {
        PortMessage::new(
            "metamask-provider",
            json!({ "id": 1, "method": REQUEST_ACCOUNTS_METHOD }),
        )
    }

    #[tokio::test]
    async fn internal_connection_writes_snapshot() {
        let h = harness(Platform::Chrome, RuntimeSurface::default());
        let wiring = h.router.connect(&internal_port()).await;

        assert_eq!(wiring.connection.classification(), &Classification::Internal);
        assert_eq!(
            wiring.connection.origin(),
            Some(format!("chrome-extension://{EXT_ID}").as_str())
        );
        let snapshot = h.session.get(UI_BOOTSTRAP_KEY).await.unwrap().unwrap();
        assert_eq!(snapshot["isUnlocked"], true);
    }

    #[tokio::test]
    async fn service_worker_background_greets_internal_ports() {
        let h = harness(
            Platform::Chrome,
            RuntimeSurface::new(["ServiceWorkerGlobalScope"]),
        );
        let wiring = h.router.connect(&internal_port()).await;
        assert_eq!(
            wiring.greeting,
            Some(PortMessage::new(CONNECTION_READY, Value::Null))
        );
    }

    #[tokio::test]
    async fn persistent_background_sends_no_greeting() {
        let h = harness(Platform::Chrome, RuntimeSurface::new(["chrome.runtime"]));
        assert!(h.router.connect(&internal_port()).await.greeting.is_none());
    }

    #[tokio::test]
    async fn external_connections_are_never_greeted() {
        let h = harness(
            Platform::Chrome,
            RuntimeSurface::new(["ServiceWorkerGlobalScope"]),
        );
        let wiring = h.router.connect(&page_port(9, "https://dapp.example/")).await;
        assert!(wiring.greeting.is_none());
        assert_eq!(wiring.connection.origin(), Some("https://dapp.example"));
        assert_eq!(h.session.get(UI_BOOTSTRAP_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn request_accounts_binds_origin_to_tab() {
        let h = harness(Platform::Chrome, RuntimeSurface::default());
        let first = h.router.connect(&page_port(3, "https://dapp.example/a")).await;
        let second = h.router.connect(&page_port(8, "https://dapp.example/b")).await;

        let chain_id = PortMessage::new("metamask-provider", json!({ "method": "eth_chainId" }));
        assert!(!h.router.observe(&first.connection, &chain_id));
        assert!(h.bindings.is_empty());

        assert!(h.router.observe(&first.connection, &request_accounts()));
        assert_eq!(h.bindings.tab_for("https://dapp.example"), Some(3));

        assert!(h.router.observe(&second.connection, &request_accounts()));
        assert_eq!(h.bindings.tab_for("https://dapp.example"), Some(8));
    }

    #[tokio::test]
    async fn internal_frames_never_bind() {
        let h = harness(Platform::Chrome, RuntimeSurface::default());
        let wiring = h.router.connect(&internal_port()).await;
        assert!(!h.router.observe(&wiring.connection, &request_accounts()));
        assert!(h.bindings.is_empty());
    }

    #[tokio::test]
    async fn blocked_and_rejected_ports_are_not_wired() {
        let h = harness(Platform::Firefox, RuntimeSurface::default());
        let blocked = h
            .router
            .connect(&PortInfo {
                name: "trezor-connect".into(),
                sender: None,
            })
            .await;
        assert_eq!(blocked.connection.classification(), &Classification::Blocked);
        assert!(!blocked.connection.is_open());

        let rejected = h
            .router
            .connect(&PortInfo {
                name: "contentscript".into(),
                sender: None,
            })
            .await;
        assert_eq!(rejected.connection.classification(), &Classification::Rejected);
        assert!(rejected.greeting.is_none());
        assert_eq!(h.session.get(UI_BOOTSTRAP_KEY).await.unwrap(), None);
    }
}
