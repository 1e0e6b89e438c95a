// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `metamask_logWeb3ShimUsage`: note, once per site, that it touched the
//! legacy `window.web3` shim.

use async_trait::async_trait;
use serde_json::json;

use super::request_origin;
use crate::rpc::errors::RpcError;
use crate::rpc::hooks::{GrantedHooks, HookName};
use crate::rpc::registry::{Flow, HandlerDescriptor, MethodImplementation};
use crate::rpc::types::{JsonRpcRequest, JsonRpcResponse};

pub const METHOD: &str = "metamask_logWeb3ShimUsage";

pub fn descriptor() -> HandlerDescriptor {
    HandlerDescriptor::new([METHOD], LogWeb3ShimUsage).with_hooks([
        HookName::GetWeb3ShimUsageState,
        HookName::SetWeb3ShimUsageRecorded,
    ])
}

pub struct LogWeb3ShimUsage;

#[async_trait]
impl MethodImplementation for LogWeb3ShimUsage {
    async fn handle(
        &self,
        request: &JsonRpcRequest,
        response: &mut JsonRpcResponse,
        hooks: Option<&GrantedHooks>,
    ) -> Result<Flow, RpcError> {
        let hooks = hooks.ok_or(RpcError::HookNotGranted {
            hook: HookName::GetWeb3ShimUsageState,
        })?;
        let origin = request_origin(request)?;

        if hooks.get_web3_shim_usage_state(origin).await?.is_none() {
            hooks.set_web3_shim_usage_recorded(origin).await?;
        }

        response.set_result(json!(true));
        Ok(Flow::End)
    }
}
