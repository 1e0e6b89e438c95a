// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `metamask_getProviderState`: bootstrap state for the page provider.

use async_trait::async_trait;

use super::request_origin;
use crate::rpc::errors::RpcError;
use crate::rpc::hooks::{GrantedHooks, HookName};
use crate::rpc::registry::{Flow, HandlerDescriptor, MethodImplementation};
use crate::rpc::types::{JsonRpcRequest, JsonRpcResponse};

pub const METHOD: &str = "metamask_getProviderState";

pub fn descriptor() -> HandlerDescriptor {
    HandlerDescriptor::new([METHOD], GetProviderState).with_hooks([HookName::GetProviderState])
}

pub struct GetProviderState;

#[async_trait]
impl MethodImplementation for GetProviderState {
    #[tracing::instrument(skip_all, fields(method = METHOD))]
    async fn handle(
        &self,
        request: &JsonRpcRequest,
        response: &mut JsonRpcResponse,
        hooks: Option<&GrantedHooks>,
    ) -> Result<Flow, RpcError> {
        let hooks = hooks.ok_or(RpcError::HookNotGranted {
            hook: HookName::GetProviderState,
        })?;
        let origin = request_origin(request)?;

        response.set_result(hooks.get_provider_state(origin).await?);
        Ok(Flow::End)
    }
}
