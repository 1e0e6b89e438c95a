// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Classification rules, evaluated in order:
//!
//! 1. reserved port name → `Blocked`
//! 2. platform trust rule → `Internal`
//! 3. sender has a tab id and a parseable URL whose origin agrees with the
//!    sender origin → `External`
//! 4. otherwise → `Rejected`
//!
//! Firefox trusts by port name; Chromium-family browsers trust by sender
//! origin. The rule is selected through [`TrustStrategy`].
//!
//! With [`ClassifierPolicy::requiring_origin_proof`], port name and sender
//! URL are treated as caller-chosen: name trust also needs the extension
//! origin, and a page needs a sender origin matching its URL.

use std::collections::BTreeSet;

use url::Url;

use super::{Classification, Platform, PortInfo};

/// Port names used by the wallet's own UI surfaces.
pub const INTERNAL_PROCESS_NAMES: &[&str] = &["popup", "notification", "fullscreen"];

/// Port names reserved for other purposes by default.
pub const DEFAULT_BLOCKED_PORT_NAMES: &[&str] = &["trezor-connect"];

/// How a platform decides that a port belongs to the wallet UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustStrategy {
    ProcessName,
    SenderOrigin,
}

impl TrustStrategy {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Firefox => TrustStrategy::ProcessName,
            Platform::Chrome | Platform::Edge | Platform::Opera | Platform::Brave => {
                TrustStrategy::SenderOrigin
            }
        }
    }

    pub fn is_internal(&self, port: &PortInfo, policy: &ClassifierPolicy) -> bool {
        match self {
            TrustStrategy::ProcessName => {
                trusted_by_name(port) && (!policy.origin_proof || trusted_by_origin(port, policy))
            }
            TrustStrategy::SenderOrigin => trusted_by_origin(port, policy),
        }
    }
}

fn trusted_by_name(port: &PortInfo) -> bool {
    INTERNAL_PROCESS_NAMES.contains(&port.name.as_str())
}

fn trusted_by_origin(port: &PortInfo, policy: &ClassifierPolicy) -> bool {
    let Some(expected) = policy.extension_origin() else {
        return false;
    };
    port.sender
        .as_ref()
        .and_then(|s| s.origin.as_deref())
        .is_some_and(|origin| origin == expected)
}

/// Static inputs to classification.
#[derive(Debug, Clone)]
pub struct ClassifierPolicy {
    platform: Platform,
    extension_id: String,
    blocked_port_names: BTreeSet<String>,
    origin_proof: bool,
}

impl ClassifierPolicy {
    pub fn new(platform: Platform, extension_id: impl Into<String>) -> Self {
        Self {
            platform,
            extension_id: extension_id.into(),
            blocked_port_names: DEFAULT_BLOCKED_PORT_NAMES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            origin_proof: false,
        }
    }

    /// Only trust what the browser vouches for: the sender origin.
    ///
    /// Required whenever ports arrive over a transport a web page can open
    /// itself.
    pub fn requiring_origin_proof(mut self) -> Self {
        self.origin_proof = true;
        self
    }

    pub fn origin_proof(&self) -> bool {
        self.origin_proof
    }

    /// Replace the reserved port names.
    pub fn with_blocked_port_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked_port_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn strategy(&self) -> TrustStrategy {
        TrustStrategy::for_platform(self.platform)
    }

    /// `<scheme>://<extension id>`, or `None` when no id is configured.
    pub fn extension_origin(&self) -> Option<String> {
        if self.extension_id.is_empty() {
            return None;
        }
        Some(format!(
            "{}://{}",
            self.platform.extension_scheme(),
            self.extension_id
        ))
    }

    pub fn is_blocked_name(&self, name: &str) -> bool {
        self.blocked_port_names.contains(name)
    }
}

/// Classify a port. Never panics for any port shape.
pub fn classify(port: &PortInfo, policy: &ClassifierPolicy) -> Classification {
    if policy.is_blocked_name(&port.name) {
        return Classification::Blocked;
    }

    if policy.strategy().is_internal(port, policy) {
        return Classification::Internal;
    }

    let Some(sender) = port.sender.as_ref() else {
        return Classification::Rejected;
    };
    let (Some(tab), Some(url)) = (sender.tab.as_ref(), sender.url.as_deref()) else {
        return Classification::Rejected;
    };

    let Some(origin) = tuple_origin(url) else {
        return Classification::Rejected;
    };

    match sender.origin.as_deref() {
        Some(claimed) if tuple_origin(claimed).as_deref() != Some(origin.as_str()) => {
            Classification::Rejected
        }
        None if policy.origin_proof => Classification::Rejected,
        _ => Classification::External {
            tab_id: tab.id,
            origin,
        },
    }
}

/// Serialized origin of `raw`, or `None` when it has no tuple origin.
fn tuple_origin(raw: &str) -> Option<String> {
    let origin = Url::parse(raw).ok()?.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}
