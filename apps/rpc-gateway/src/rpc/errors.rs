// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! RPC error codes and error type.

use serde_json::json;

use super::hooks::HookName;
use super::types::JsonRpcErrorObject;
use crate::backend::BackendError;

// ── Error code constants ────────────────────────────────────────────

/// Request object is not valid JSON-RPC.
pub const INVALID_REQUEST: i64 = -32600;
/// No stage handled the method.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Invalid or missing parameters.
pub const INVALID_PARAMS: i64 = -32602;
/// Unexpected internal error.
pub const INTERNAL_ERROR: i64 = -32603;
/// Method is blocked for every caller (EIP-1474).
pub const METHOD_NOT_SUPPORTED: i64 = -32004;

/// Error produced while dispatching or handling a request.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("The method \"{method}\" is not supported.")]
    MethodNotSupported { method: String },

    #[error("The method \"{method}\" does not exist / is not available.")]
    MethodNotFound { method: String },

    #[error("{message}")]
    InvalidParams { message: String },

    /// A capability implementation failed unexpectedly.
    #[error("Handler for \"{method}\" failed: {message}")]
    HandlerExecution { method: String, message: String },

    /// The account store returned an address with no identity entry.
    #[error("Missing identity for address: \"{address}\".")]
    MissingIdentity { address: String },

    #[error("Hook \"{hook}\" was not granted to this handler")]
    HookNotGranted { hook: HookName },

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("{message}")]
    Internal { message: String },
}

impl RpcError {
    pub fn code(&self) -> i64 {
        match self {
            Self::InvalidRequest { .. } => INVALID_REQUEST,
            Self::MethodNotSupported { .. } => METHOD_NOT_SUPPORTED,
            Self::MethodNotFound { .. } => METHOD_NOT_FOUND,
            Self::InvalidParams { .. } => INVALID_PARAMS,
            Self::HandlerExecution { .. }
            | Self::MissingIdentity { .. }
            | Self::HookNotGranted { .. }
            | Self::Backend(_)
            | Self::Internal { .. } => INTERNAL_ERROR,
        }
    }

    /// Wire-format `error` member.
    pub fn to_error_object(&self) -> JsonRpcErrorObject {
        let data = match self {
            Self::MethodNotSupported { method } | Self::MethodNotFound { method } => {
                Some(json!({ "method": method }))
            }
            _ => None,
        };
        JsonRpcErrorObject {
            code: self.code(),
            message: self.to_string(),
            data,
        }
    }
}
