// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gateway followed by a downstream stage.

use std::sync::Arc;

use async_trait::async_trait;

use super::errors::{RpcError, INTERNAL_ERROR};
use super::gateway::{GatewayOutcome, MethodGateway};
use super::registry::{CapabilityRegistry, HandlerLookup};
use super::types::{JsonRpcErrorObject, JsonRpcRequest, JsonRpcResponse};

/// The stage that receives requests the gateway does not own.
#[async_trait]
pub trait Downstream: Send + Sync {
    async fn handle(&self, request: &JsonRpcRequest, response: &mut JsonRpcResponse);
}

/// Terminal stage answering every request with `-32601`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MethodNotFound;

#[async_trait]
impl Downstream for MethodNotFound {
    async fn handle(&self, request: &JsonRpcRequest, response: &mut JsonRpcResponse) {
        response.set_error(
            RpcError::MethodNotFound {
                method: request.method.clone(),
            }
            .to_error_object(),
        );
    }
}

pub struct RpcPipeline<L = CapabilityRegistry> {
    gateway: MethodGateway<L>,
    downstream: Arc<dyn Downstream>,
}

impl<L: HandlerLookup> RpcPipeline<L> {
    pub fn new(gateway: MethodGateway<L>, downstream: Arc<dyn Downstream>) -> Self {
        Self {
            gateway,
            downstream,
        }
    }

    pub fn gateway(&self) -> &MethodGateway<L> {
        &self.gateway
    }

    /// Run `request` to completion. Always returns a response carrying a
    /// result or an error.
    pub async fn handle(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let mut response = JsonRpcResponse::for_request(request);

        if self.gateway.process(request, &mut response).await == GatewayOutcome::Next {
            self.downstream.handle(request, &mut response).await;
        }

        if !response.is_complete() {
            tracing::warn!(method = %request.method, "Pipeline finished without a result or error");
            response.set_error(JsonRpcErrorObject {
                code: INTERNAL_ERROR,
                message: format!(
                    "Response has no error or result for request: {}",
                    request.method
                ),
                data: None,
            });
        }

        response
    }
}
