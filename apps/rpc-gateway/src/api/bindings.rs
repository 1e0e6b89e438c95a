// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{require_web_origin, ApiError},
    state::AppState,
};

#[derive(Deserialize, IntoParams)]
pub struct BindingQuery {
    /// Page origin, e.g. `https://dapp.example`.
    pub origin: String,
}

/// Tab that most recently sent `eth_requestAccounts` for an origin.
#[derive(Debug, Serialize, ToSchema)]
pub struct RequestAccountBinding {
    pub origin: String,
    pub tab_id: i64,
}

#[utoipa::path(
    get,
    path = "/v1/request-accounts",
    params(BindingQuery),
    tag = "Connections",
    responses(
        (status = 200, body = RequestAccountBinding),
        (status = 400, description = "Not a serialized web origin"),
        (status = 404, description = "No tab bound to this origin")
    )
)]
pub async fn get_request_account_binding(
    State(state): State<AppState>,
    Query(params): Query<BindingQuery>,
) -> Result<Json<RequestAccountBinding>, ApiError> {
    require_web_origin(&params.origin)?;

    let tab_id = state
        .bindings
        .tab_for(&params.origin)
        .ok_or_else(|| ApiError::not_found("No tab bound to this origin"))?;

    Ok(Json(RequestAccountBinding {
        origin: params.origin,
        tab_id,
    }))
}
