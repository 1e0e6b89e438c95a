// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Provider Injection Gate
//!
//! Decides, once per page load, whether the page-level wallet provider may be
//! attached to a hosted document. The check is a pure predicate over the
//! document shape and its URL:
//!
//! 1. doctype is absent or exactly `html`
//! 2. root element is absent or `html` (case-insensitive)
//! 3. the URL path does not end with a blocked file suffix (`.xml`, `.pdf`)
//! 4. the host is not on the denylist (see [`denylist`] for matching rules)
//!
//! A page that fails the gate simply never sees a provider. Nothing is
//! reported back to the page.

pub mod denylist;
pub mod gate;

pub use denylist::{Denylist, DenylistEntry, DenylistError};
pub use gate::{DocumentContext, InjectionDecision, InjectionGate};
