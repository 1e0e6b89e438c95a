// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `eth_accounts`: accounts ordered by most recent user selection.
//!
//! Whether the caller may see accounts at all is decided upstream by
//! permissions. This handler only fixes the order.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::json;

use crate::backend::Identity;
use crate::rpc::errors::RpcError;
use crate::rpc::hooks::{GrantedHooks, HookName};
use crate::rpc::registry::{Flow, HandlerDescriptor, MethodImplementation};
use crate::rpc::types::{JsonRpcRequest, JsonRpcResponse};

pub const METHOD: &str = "eth_accounts";

pub fn descriptor() -> HandlerDescriptor {
    HandlerDescriptor::new([METHOD], EthAccounts)
        .with_hooks([HookName::GetAccounts, HookName::GetIdentities])
}

pub struct EthAccounts;

#[async_trait]
impl MethodImplementation for EthAccounts {
    #[tracing::instrument(skip_all, fields(method = METHOD))]
    async fn handle(
        &self,
        _request: &JsonRpcRequest,
        response: &mut JsonRpcResponse,
        hooks: Option<&GrantedHooks>,
    ) -> Result<Flow, RpcError> {
        let hooks = hooks.ok_or(RpcError::HookNotGranted {
            hook: HookName::GetAccounts,
        })?;

        let accounts = hooks.get_accounts().await?;
        let identities = hooks.get_identities().await?;
        let ordered = order_by_last_selected(accounts, &identities)?;

        response.set_result(json!(ordered));
        Ok(Flow::End)
    }
}

/// Sort `accounts` by descending `lastSelected`.
///
/// | left | right | order |
/// |------|-------|-------|
/// | equal (incl. both unset) | | unchanged |
/// | unset | set | right first |
/// | set | unset | left first |
/// | set | set | larger first |
///
/// Fails on the first address without an identity.
pub fn order_by_last_selected(
    accounts: Vec<String>,
    identities: &HashMap<String, Identity>,
) -> Result<Vec<String>, RpcError> {
    let mut keyed = accounts
        .into_iter()
        .map(|address| match identities.get(&address) {
            Some(identity) => Ok((identity.last_selected, address)),
            None => Err(RpcError::MissingIdentity { address }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    // sort_by is stable, so equal keys keep their input order.
    keyed.sort_by(|(left, _), (right, _)| compare_last_selected(*left, *right));

    Ok(keyed.into_iter().map(|(_, address)| address).collect())
}

fn compare_last_selected(left: Option<i64>, right: Option<i64>) -> Ordering {
    match (left, right) {
        (l, r) if l == r => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(l), Some(r)) => r.cmp(&l),
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::backend::InMemoryWallet;
    use crate::rpc::hooks::HookTable;

    fn identities(entries: &[(&str, Option<i64>)]) -> HashMap<String, Identity> {
        entries
            .iter()
            .map(|(address, last_selected)| {
                (
                    address.to_string(),
                    Identity {
                        address: address.to_string(),
                        name: address.to_uppercase(),
                        last_selected: *last_selected,
                    },
                )
            })
            .collect()
    }

    fn addrs(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn selected_account_precedes_never_selected() {
        let ids = identities(&[("A", Some(5)), ("B", None)]);
        let ordered = order_by_last_selected(addrs(&["B", "A"]), &ids).unwrap();
        assert_eq!(ordered, addrs(&["A", "B"]));
    }

    #[test]
    fn larger_timestamp_first() {
        let ids = identities(&[("A", Some(1)), ("B", Some(9)), ("C", Some(4))]);
        let ordered = order_by_last_selected(addrs(&["A", "B", "C"]), &ids).unwrap();
        assert_eq!(ordered, addrs(&["B", "C", "A"]));
    }

    #[test]
    fn ties_keep_input_order() {
        let ids = identities(&[("A", None), ("B", None), ("C", Some(3)), ("D", Some(3))]);
        let ordered = order_by_last_selected(addrs(&["B", "D", "A", "C"]), &ids).unwrap();
        assert_eq!(ordered, addrs(&["D", "C", "B", "A"]));
    }

    #[test]
    fn missing_identity_fails_fast() {
        let ids = identities(&[("A", Some(1))]);
        let err = order_by_last_selected(addrs(&["A", "ghost"]), &ids).unwrap_err();
        assert!(matches!(err, RpcError::MissingIdentity { ref address } if address == "ghost"));
    }

    #[tokio::test]
    async fn handler_returns_ordered_accounts() {
        let wallet = Arc::new(InMemoryWallet::new());
        wallet.insert_account("B", "Account B", None).await;
        wallet.insert_account("A", "Account A", Some(5)).await;

        let descriptor = descriptor();
        let granted = HookTable::new(wallet).select(descriptor.hook_names().unwrap());
        let request = JsonRpcRequest::new(1, METHOD);
        let mut response = JsonRpcResponse::for_request(&request);

        let flow = EthAccounts
            .handle(&request, &mut response, Some(&granted))
            .await
            .unwrap();

        assert_eq!(flow, Flow::End);
        assert_eq!(response.result, Some(json!(["A", "B"])));
    }

    #[tokio::test]
    async fn handler_surfaces_missing_identity() {
        let wallet = Arc::new(InMemoryWallet::new());
        wallet.insert_account("A", "Account A", Some(5)).await;
        wallet.insert_bare_account("orphan").await;

        let granted = HookTable::new(wallet).select(descriptor().hook_names().unwrap());
        let request = JsonRpcRequest::new(1, METHOD);
        let mut response = JsonRpcResponse::for_request(&request);

        let err = EthAccounts
            .handle(&request, &mut response, Some(&granted))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("orphan"));
    }
}
