// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Connection Classification
//!
//! Every port opened against the background host is classified exactly once,
//! before any of its traffic is read:
//!
//! ```text
//!          ┌─► Blocked   (reserved port name; never wired)
//!   New ───┼─► Internal  (wallet UI surface; gets session snapshot + handshake)
//!          ├─► External  (web page tab; request-account binding listener)
//!          └─► Rejected  (no tab/url and not trusted; closed)
//! ```
//!
//! The classification is stored on [`Connection`] and has no setter.

pub mod bindings;
pub mod classifier;
pub mod router;
pub mod session;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

pub use bindings::RequestAccountBindings;
pub use classifier::{classify, ClassifierPolicy, TrustStrategy};
pub use router::{ConnectionRouter, RuntimeSurface, Wiring};
pub use session::{FileSessionStorage, MemorySessionStorage, SessionStorage, SessionStorageError};

/// Browser the extension runs in. Selects the trust strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Chrome,
    Firefox,
    Edge,
    Opera,
    Brave,
}

impl Platform {
    /// Parse platform from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Platform> {
        match s.trim().to_lowercase().as_str() {
            "chrome" => Some(Platform::Chrome),
            "firefox" => Some(Platform::Firefox),
            "edge" => Some(Platform::Edge),
            "opera" => Some(Platform::Opera),
            "brave" => Some(Platform::Brave),
            _ => None,
        }
    }

    /// URL scheme of extension pages on this platform.
    pub fn extension_scheme(&self) -> &'static str {
        match self {
            Platform::Firefox => "moz-extension",
            Platform::Chrome | Platform::Edge | Platform::Opera | Platform::Brave => {
                "chrome-extension"
            }
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::Chrome
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Chrome => write!(f, "chrome"),
            Platform::Firefox => write!(f, "firefox"),
            Platform::Edge => write!(f, "edge"),
            Platform::Opera => write!(f, "opera"),
            Platform::Brave => write!(f, "brave"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: i64,
}

/// Sender metadata the runtime attaches to a port.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sender {
    pub origin: Option<String>,
    pub tab: Option<Tab>,
    pub url: Option<String>,
}

/// A newly reported port, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Label chosen by the connecting end.
    pub name: String,
    pub sender: Option<Sender>,
}

/// Trust class of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Blocked,
    Internal,
    External { tab_id: i64, origin: String },
    Rejected,
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Blocked => "blocked",
            Classification::Internal => "internal",
            Classification::External { .. } => "external",
            Classification::Rejected => "rejected",
        }
    }

    /// Whether the connection is wired into the rest of the system.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            Classification::Internal | Classification::External { .. }
        )
    }
}

/// A classified connection.
#[derive(Debug, Clone)]
pub struct Connection {
    id: Uuid,
    process_name: String,
    sender_origin: Option<String>,
    sender_tab_id: Option<i64>,
    platform: Platform,
    classification: Classification,
    origin: Option<String>,
    connected_at: DateTime<Utc>,
}

impl Connection {
    pub(crate) fn new(
        port: &PortInfo,
        platform: Platform,
        classification: Classification,
        origin: Option<String>,
    ) -> Self {
        let sender = port.sender.as_ref();
        Self {
            id: Uuid::new_v4(),
            process_name: port.name.clone(),
            sender_origin: sender.and_then(|s| s.origin.clone()),
            sender_tab_id: sender.and_then(|s| s.tab.as_ref()).map(|t| t.id),
            platform,
            classification,
            origin,
            connected_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    pub fn sender_origin(&self) -> Option<&str> {
        self.sender_origin.as_deref()
    }

    pub fn sender_tab_id(&self) -> Option<i64> {
        self.sender_tab_id
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    /// Origin stamped on every request read from this connection.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    pub fn is_open(&self) -> bool {
        self.classification.is_open()
    }
}

/// Frame on a multiplexed port: `{ "name": <substream>, "data": <payload> }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl PortMessage {
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            name: Some(name.into()),
            data,
        }
    }

    /// `data.method`, if the payload looks like a request.
    pub fn method(&self) -> Option<&str> {
        self.data.get("method").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn platform_from_str_parses_correctly() {
        assert_eq!(Platform::from_str("firefox"), Some(Platform::Firefox));
        assert_eq!(Platform::from_str(" Brave "), Some(Platform::Brave));
        assert_eq!(Platform::from_str("safari"), None);
    }

    #[test]
    fn only_firefox_uses_moz_scheme() {
        assert_eq!(Platform::Firefox.extension_scheme(), "moz-extension");
        assert_eq!(Platform::Edge.extension_scheme(), "chrome-extension");
    }

    #[test]
    fn port_message_reads_method() {
        let frame: PortMessage = serde_json::from_value(json!({
            "name": "metamask-provider",
            "data": { "id": 1, "method": "eth_requestAccounts" }
        }))
        .unwrap();
        assert_eq!(frame.method(), Some("eth_requestAccounts"));

        let handshake = PortMessage::new("CONNECTION_READY", Value::Null);
        assert_eq!(
            serde_json::to_value(&handshake).unwrap(),
            json!({ "name": "CONNECTION_READY" })
        );
    }

    #[test]
    fn only_internal_and_external_are_open() {
        assert!(Classification::Internal.is_open());
        assert!(Classification::External {
            tab_id: 1,
            origin: "https://a.example".into()
        }
        .is_open());
        assert!(!Classification::Blocked.is_open());
        assert!(!Classification::Rejected.is_open());
    }
}
