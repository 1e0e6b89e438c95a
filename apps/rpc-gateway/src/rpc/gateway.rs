// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The single chokepoint every request passes before reaching a capability.

use std::collections::BTreeSet;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::{debug, warn};

use super::errors::RpcError;
use super::hooks::HookTable;
use super::registry::{CapabilityRegistry, Flow, HandlerLookup};
use super::types::{JsonRpcRequest, JsonRpcResponse};

/// Methods rejected for every caller before the registry is consulted.
pub const UNSUPPORTED_METHODS: &[&str] = &["eth_signTransaction"];

/// What the pipeline should do after the gateway ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOutcome {
    /// Not owned here (or the handler deferred); run the next stage.
    Next,
    /// The response is final.
    Ended,
}

pub struct MethodGateway<L = CapabilityRegistry> {
    lookup: L,
    hooks: HookTable,
    unsupported: BTreeSet<String>,
}

impl<L: HandlerLookup> MethodGateway<L> {
    pub fn new(lookup: L, hooks: HookTable) -> Self {
        Self {
            lookup,
            hooks,
            unsupported: UNSUPPORTED_METHODS.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Gate and dispatch one request.
    ///
    /// Handler errors and panics are written to `response`; they never
    /// propagate to the caller.
    pub async fn process(
        &self,
        request: &JsonRpcRequest,
        response: &mut JsonRpcResponse,
    ) -> GatewayOutcome {
        let method = request.method.as_str();

        if self.unsupported.contains(method) {
            debug!(method, "Rejecting globally unsupported method");
            response.set_error(
                RpcError::MethodNotSupported {
                    method: method.to_string(),
                }
                .to_error_object(),
            );
            return GatewayOutcome::Ended;
        }

        let Some(descriptor) = self.lookup.lookup(method) else {
            return GatewayOutcome::Next;
        };

        let granted = descriptor.hook_names().map(|names| self.hooks.select(names));

        debug!(
            method,
            origin = request.origin.as_deref().unwrap_or("-"),
            hooks = ?granted.as_ref().map(|g| g.names().collect::<Vec<_>>()),
            "Dispatching to capability handler"
        );

        let outcome = AssertUnwindSafe(descriptor.implementation().handle(
            request,
            response,
            granted.as_ref(),
        ))
        .catch_unwind()
        .await;

        match outcome {
            Ok(Ok(Flow::Next)) => GatewayOutcome::Next,
            Ok(Ok(Flow::End)) => GatewayOutcome::Ended,
            Ok(Err(err)) => {
                warn!(method, error = %err, "Capability handler returned an error");
                response.set_error(err.to_error_object());
                GatewayOutcome::Ended
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!(method, %message, "Capability handler panicked");
                response.set_error(
                    RpcError::HandlerExecution {
                        method: method.to_string(),
                        message,
                    }
                    .to_error_object(),
                );
                GatewayOutcome::Ended
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::backend::InMemoryWallet;
    use crate::rpc::errors::{INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_SUPPORTED};
    use crate::rpc::hooks::{GrantedHooks, HookName};
    use crate::rpc::registry::{HandlerDescriptor, MethodImplementation};

    /// Registry wrapper counting lookups.
    struct CountingLookup {
        inner: CapabilityRegistry,
        lookups: AtomicUsize,
    }

    impl HandlerLookup for CountingLookup {
        fn lookup(&self, method: &str) -> Option<Arc<HandlerDescriptor>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.lookup(method)
        }
    }

    /// Reports which hooks it was handed.
    struct ReportHooks;

    #[async_trait]
    impl MethodImplementation for ReportHooks {
        async fn handle(
            &self,
            _request: &JsonRpcRequest,
            response: &mut JsonRpcResponse,
            hooks: Option<&GrantedHooks>,
        ) -> Result<Flow, RpcError> {
            let names = hooks.map(|h| h.names().map(|n| n.as_str()).collect::<Vec<_>>());
            response.set_result(json!(names));
            Ok(Flow::End)
        }
    }

    struct Fails;

    #[async_trait]
    impl MethodImplementation for Fails {
        async fn handle(
            &self,
            _request: &JsonRpcRequest,
            _response: &mut JsonRpcResponse,
            _hooks: Option<&GrantedHooks>,
        ) -> Result<Flow, RpcError> {
            Err(RpcError::InvalidParams {
                message: "bad params".into(),
            })
        }
    }

    struct Panics;

    #[async_trait]
    impl MethodImplementation for Panics {
        async fn handle(
            &self,
            _request: &JsonRpcRequest,
            _response: &mut JsonRpcResponse,
            _hooks: Option<&GrantedHooks>,
        ) -> Result<Flow, RpcError> {
            panic!("handler blew up");
        }
    }

    struct Defers;

    #[async_trait]
    impl MethodImplementation for Defers {
        async fn handle(
            &self,
            _request: &JsonRpcRequest,
            _response: &mut JsonRpcResponse,
            _hooks: Option<&GrantedHooks>,
        ) -> Result<Flow, RpcError> {
            Ok(Flow::Next)
        }
    }

    fn gateway() -> MethodGateway<CountingLookup> {
        let registry = CapabilityRegistry::from_groups([vec![
            HandlerDescriptor::new(["scoped"], ReportHooks)
                .with_hooks([HookName::GetAccounts, HookName::GetIdentities]),
            HandlerDescriptor::new(["unscoped"], ReportHooks),
            HandlerDescriptor::new(["fails"], Fails),
            HandlerDescriptor::new(["panics"], Panics),
            HandlerDescriptor::new(["defers"], Defers),
            HandlerDescriptor::new(["eth_signTransaction"], ReportHooks),
        ]]);
        MethodGateway::new(
            CountingLookup {
                inner: registry,
                lookups: AtomicUsize::new(0),
            },
            HookTable::new(Arc::new(InMemoryWallet::new())),
        )
    }

    async fn run(gateway: &MethodGateway<CountingLookup>, method: &str) -> (GatewayOutcome, JsonRpcResponse) {
        let request = JsonRpcRequest::new(1, method);
        let mut response = JsonRpcResponse::for_request(&request);
        let outcome = gateway.process(&request, &mut response).await;
        (outcome, response)
    }

    #[tokio::test]
    async fn unsupported_method_never_reaches_lookup() {
        let gateway = gateway();
        let (outcome, response) = run(&gateway, "eth_signTransaction").await;

        assert_eq!(outcome, GatewayOutcome::Ended);
        assert_eq!(response.error.unwrap().code, METHOD_NOT_SUPPORTED);
        assert_eq!(gateway.lookup().lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unregistered_method_passes_through_untouched() {
        let gateway = gateway();
        let (outcome, response) = run(&gateway, "eth_chainId").await;

        assert_eq!(outcome, GatewayOutcome::Next);
        assert!(!response.is_complete());
        assert_eq!(gateway.lookup().lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn handler_sees_only_declared_hooks() {
        let (_, response) = run(&gateway(), "scoped").await;
        assert_eq!(response.result, Some(json!(["getAccounts", "getIdentities"])));
    }

    #[tokio::test]
    async fn handler_without_declared_hooks_gets_none() {
        let (_, response) = run(&gateway(), "unscoped").await;
        assert_eq!(response.result, Some(json!(null)));
    }

    #[tokio::test]
    async fn handler_error_ends_request_with_its_code() {
        let (outcome, response) = run(&gateway(), "fails").await;
        assert_eq!(outcome, GatewayOutcome::Ended);
        let error = response.error.unwrap();
        assert_eq!(error.code, INVALID_PARAMS);
        assert_eq!(error.message, "bad params");
    }

    #[tokio::test]
    async fn handler_panic_is_contained() {
        let (outcome, response) = run(&gateway(), "panics").await;
        assert_eq!(outcome, GatewayOutcome::Ended);
        let error = response.error.unwrap();
        assert_eq!(error.code, INTERNAL_ERROR);
        assert!(error.message.contains("handler blew up"));
    }

    #[tokio::test]
    async fn handler_may_defer_to_next_stage() {
        let (outcome, response) = run(&gateway(), "defers").await;
        assert_eq!(outcome, GatewayOutcome::Next);
        assert!(!response.is_complete());
    }
}
