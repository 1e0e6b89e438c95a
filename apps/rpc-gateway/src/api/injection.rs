// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{
    injection::{DocumentContext, InjectionDecision},
    state::AppState,
};

/// Ask whether the provider may be injected into a document.
#[utoipa::path(
    post,
    path = "/v1/injection/check",
    request_body = DocumentContext,
    tag = "Injection",
    responses((status = 200, body = InjectionDecision))
)]
pub async fn check_injection(
    State(state): State<AppState>,
    Json(document): Json<DocumentContext>,
) -> Json<InjectionDecision> {
    let decision = state.gate.decide(&document);
    tracing::debug!(url = %document.url, inject = decision.inject, "Injection check");
    Json(decision)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn check(document: DocumentContext) -> bool {
        let Json(decision) = check_injection(State(AppState::default()), Json(document)).await;
        decision.inject
    }

    #[tokio::test]
    async fn ordinary_page_is_injected() {
        assert!(check(DocumentContext::html("https://app.uniswap.org/")).await);
    }

    #[tokio::test]
    async fn denylisted_host_and_pdf_are_not_injected() {
        assert!(!check(DocumentContext::html("https://www.dropbox.com/home")).await);
        assert!(!check(DocumentContext::html("https://example.com/paper.pdf")).await);
    }

    #[tokio::test]
    async fn non_html_document_is_not_injected() {
        let document = DocumentContext {
            doctype_name: None,
            document_element: Some("svg".into()),
            url: "https://example.com/".into(),
        };
        assert!(!check(document).await);
    }
}
