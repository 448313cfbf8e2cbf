// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport for the exporter.

pub mod http;

use std::sync::Arc;

use axum::routing::any;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::ExporterState;

/// Build the axum `Router`.
///
/// Every path and method is answered by the export handler.
pub fn build_router(state: Arc<ExporterState>) -> Router {
    Router::new()
        .route("/", any(http::export_secrets))
        .fallback(http::export_secrets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
