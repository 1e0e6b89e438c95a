// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `metamask_sendDomainMetadata`: a site reports its name and icon.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::request_origin;
use crate::backend::SubjectMetadata;
use crate::rpc::errors::RpcError;
use crate::rpc::hooks::{GrantedHooks, HookName};
use crate::rpc::registry::{Flow, HandlerDescriptor, MethodImplementation};
use crate::rpc::types::{JsonRpcRequest, JsonRpcResponse};

pub const METHOD: &str = "metamask_sendDomainMetadata";

pub fn descriptor() -> HandlerDescriptor {
    HandlerDescriptor::new([METHOD], SendDomainMetadata).with_hooks([HookName::AddSubjectMetadata])
}

#[derive(Debug, Default, Deserialize)]
struct DomainMetadataParams {
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    icon: Option<String>,
}

pub struct SendDomainMetadata;

#[async_trait]
impl MethodImplementation for SendDomainMetadata {
    #[tracing::instrument(skip_all, fields(method = METHOD))]
    async fn handle(
        &self,
        request: &JsonRpcRequest,
        response: &mut JsonRpcResponse,
        hooks: Option<&GrantedHooks>,
    ) -> Result<Flow, RpcError> {
        let hooks = hooks.ok_or(RpcError::HookNotGranted {
            hook: HookName::AddSubjectMetadata,
        })?;
        let origin = request_origin(request)?;

        let params: DomainMetadataParams = request
            .params
            .clone()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| RpcError::InvalidParams {
                message: e.to_string(),
            })?
            .unwrap_or_default();

        let Some(Value::String(name)) = params.name else {
            return Err(RpcError::InvalidParams {
                message: "Must specify a string name.".to_string(),
            });
        };

        hooks
            .add_subject_metadata(SubjectMetadata {
                origin: origin.to_string(),
                name,
                icon_url: params.icon,
            })
            .await?;

        response.set_result(json!(true));
        Ok(Flow::End)
    }
}
