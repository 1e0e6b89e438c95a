// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Capability registry: method name → handler descriptor.
//!
//! Built once at startup by folding ordered handler groups. When two
//! descriptors claim the same method name, the first one registered keeps it
//! and the later one is silently ignored for that name.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;

use super::errors::RpcError;
use super::hooks::{GrantedHooks, HookName};
use super::types::{JsonRpcRequest, JsonRpcResponse};

/// How a handler wants the pipeline to continue after it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Pass the request on to the next pipeline stage.
    Next,
    /// The response is final.
    End,
}

/// Implementation of one capability.
///
/// `hooks` is `None` when the descriptor declared no hook names. Returning
/// `Err` ends the request with that error.
#[async_trait]
pub trait MethodImplementation: Send + Sync {
    async fn handle(
        &self,
        request: &JsonRpcRequest,
        response: &mut JsonRpcResponse,
        hooks: Option<&GrantedHooks>,
    ) -> Result<Flow, RpcError>;
}

/// A registered capability.
#[derive(Clone)]
pub struct HandlerDescriptor {
    method_names: Vec<String>,
    implementation: Arc<dyn MethodImplementation>,
    hook_names: Option<BTreeSet<HookName>>,
}

impl std::fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("method_names", &self.method_names)
            .field("hook_names", &self.hook_names)
            .finish_non_exhaustive()
    }
}

impl HandlerDescriptor {
    /// Descriptor with no hook access.
    pub fn new<I, S>(method_names: I, implementation: impl MethodImplementation + 'static) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method_names: method_names.into_iter().map(Into::into).collect(),
            implementation: Arc::new(implementation),
            hook_names: None,
        }
    }

    /// Declare the hooks this handler may use.
    pub fn with_hooks(mut self, hooks: impl IntoIterator<Item = HookName>) -> Self {
        self.hook_names = Some(hooks.into_iter().collect());
        self
    }

    pub fn method_names(&self) -> &[String] {
        &self.method_names
    }

    pub fn hook_names(&self) -> Option<&BTreeSet<HookName>> {
        self.hook_names.as_ref()
    }

    pub fn implementation(&self) -> &dyn MethodImplementation {
        self.implementation.as_ref()
    }
}

/// Read-only lookup used by the gateway.
pub trait HandlerLookup: Send + Sync {
    fn lookup(&self, method: &str) -> Option<Arc<HandlerDescriptor>>;
}

/// Immutable method table. There is no mutation API after construction.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    methods: HashMap<String, Arc<HandlerDescriptor>>,
}

impl CapabilityRegistry {
    /// Fold `groups` in order, keeping the first descriptor for each name.
    pub fn from_groups<G>(groups: G) -> Self
    where
        G: IntoIterator<Item = Vec<HandlerDescriptor>>,
    {
        let mut methods: HashMap<String, Arc<HandlerDescriptor>> = HashMap::new();

        for descriptor in groups.into_iter().flatten() {
            if descriptor.method_names.is_empty() {
                tracing::warn!("Skipping handler descriptor with no method names");
                continue;
            }
            let descriptor = Arc::new(descriptor);
            for name in descriptor.method_names() {
                if methods.contains_key(name) {
                    tracing::debug!(method = %name, "Method already registered, keeping first handler");
                    continue;
                }
                methods.insert(name.clone(), Arc::clone(&descriptor));
            }
        }

        Self { methods }
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn contains(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    /// Registered method names, sorted.
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl HandlerLookup for CapabilityRegistry {
    fn lookup(&self, method: &str) -> Option<Arc<HandlerDescriptor>> {
        self.methods.get(method).cloned()
    }
}
