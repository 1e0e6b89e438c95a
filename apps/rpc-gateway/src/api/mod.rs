// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    injection::{DocumentContext, InjectionDecision},
    state::AppState,
    transport,
};

pub mod bindings;
pub mod health;
pub mod injection;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/connect", get(transport::connect))
        .route("/injection/check", post(injection::check_injection))
        .route(
            "/request-accounts",
            get(bindings::get_request_account_binding),
        );

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/v1", v1_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        injection::check_injection,
        bindings::get_request_account_binding
    ),
    components(
        schemas(
            DocumentContext,
            InjectionDecision,
            bindings::RequestAccountBinding,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Injection", description = "Provider injection gate"),
        (name = "Connections", description = "Port bookkeeping")
    )
)]
struct ApiDoc;
