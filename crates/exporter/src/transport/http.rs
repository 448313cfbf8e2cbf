// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The export handler.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use tracing::Instrument;

use crate::error::ExportError;
use crate::namespaces::list_namespaces;
use crate::secrets::{collect_all, NamespaceSecrets};
use crate::state::ExporterState;

/// Any path, any method: list labelled namespaces, collect their token
/// secrets and answer with the result set as indented JSON.
pub async fn export_secrets(State(s): State<Arc<ExporterState>>) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("export", %request_id);

    let rendered = run_export(&s)
        .instrument(span)
        .await
        .and_then(|results| serde_json::to_string_pretty(&results).map_err(ExportError::Encode));

    match rendered {
        Ok(body) => ([(CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            match &e {
                ExportError::ShuttingDown => {}
                ExportError::Encode(_) => tracing::error!(%request_id, err = %e, "export failed"),
                _ => tracing::warn!(%request_id, err = %e, "export failed"),
            }
            e.into_response()
        }
    }
}

/// Lister then collector, bounded by the request deadline and shutdown.
///
/// Dropping the collector future on either exit aborts its outstanding
/// per-namespace tasks.
async fn run_export(state: &ExporterState) -> Result<Vec<NamespaceSecrets>, ExportError> {
    let limit = state.config.request_timeout();
    let export = async {
        let namespaces = list_namespaces(state.cluster.as_ref(), &state.config.label_selector)
            .await
            .map_err(ExportError::Namespaces)?;
        let results =
            collect_all(Arc::clone(&state.cluster), namespaces, Arc::clone(&state.permits)).await;
        let failed = results.iter().filter(|r| r.error.is_some()).count();
        tracing::info!(namespaces = results.len(), failed, "export complete");
        Ok(results)
    };

    tokio::select! {
        _ = state.shutdown.cancelled() => Err(ExportError::ShuttingDown),
        outcome = tokio::time::timeout(limit, export) => {
            outcome.unwrap_or(Err(ExportError::Timeout(limit)))
        }
    }
}
