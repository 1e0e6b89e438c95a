// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Capability-Scoped Method Dispatch
//!
//! Every JSON-RPC request from every classified connection passes through
//! [`RpcPipeline`]:
//!
//! ```text
//! request ─► MethodGateway ─┬─ globally unsupported ─► MethodNotSupported error
//!                           ├─ registered ──────────► handler(request, response, granted hooks)
//!                           └─ unregistered ────────► Downstream stage
//! ```
//!
//! The [`CapabilityRegistry`] is built once from ordered handler groups and
//! never mutated afterwards. A handler only ever receives the backend hooks
//! it declared.

pub mod errors;
pub mod gateway;
pub mod handlers;
pub mod hooks;
pub mod pipeline;
pub mod registry;
pub mod types;

pub use errors::RpcError;
pub use gateway::{GatewayOutcome, MethodGateway, UNSUPPORTED_METHODS};
pub use hooks::{GrantedHooks, HookName, HookTable};
pub use pipeline::{Downstream, MethodNotFound, RpcPipeline};
pub use registry::{CapabilityRegistry, Flow, HandlerDescriptor, HandlerLookup, MethodImplementation};
pub use types::{JsonRpcErrorObject, JsonRpcRequest, JsonRpcResponse};
