// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Wallet - Extension RPC Gateway
//!
//! Trust boundary between web pages and the browser-extension wallet. Every
//! inbound port is classified, the in-page provider is only injected into
//! eligible documents, and each JSON-RPC method only reaches the backend
//! hooks it declares.
//!
//! ## Modules
//!
//! - `injection` - Injection gate and host/path denylist
//! - `connection` - Port classification, routing, request-account bindings
//! - `rpc` - Capability registry, method gateway and local handlers
//! - `backend` - Wallet backend seam reached through hooks
//! - `transport` - WebSocket ports carrying multiplexed frames
//! - `api` - HTTP API handlers (Axum)

pub mod api;
pub mod backend;
pub mod config;
pub mod connection;
pub mod error;
pub mod injection;
pub mod rpc;
pub mod state;
pub mod telemetry;
pub mod transport;
