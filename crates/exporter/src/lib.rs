// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! secrets-exporter: serves the service-account token secrets of labelled
//! namespaces as JSON.

pub mod cluster;
pub mod config;
pub mod error;
pub mod namespaces;
pub mod secrets;
pub mod state;
pub mod test_support;
pub mod transport;

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::cluster::KubeCluster;
use crate::config::ExporterConfig;
use crate::state::ExporterState;
use crate::transport::build_router;

/// Initialize tracing/logging from config.
///
/// Uses `try_init` so it's safe to call multiple times (e.g. from tests).
pub fn init_tracing(config: &ExporterConfig) {
    use tracing_subscriber::fmt;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match config.log_format.as_str() {
        "json" => fmt::fmt().with_env_filter(filter).json().try_init(),
        _ => fmt::fmt().with_env_filter(filter).try_init(),
    };
    drop(result);
}

/// Connect to the cluster and serve until ctrl-c.
pub async fn run(config: ExporterConfig) -> anyhow::Result<()> {
    // kube's rustls stack needs a process-wide provider.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cluster = KubeCluster::connect(&config).await?;
    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown requested");
            }
            shutdown.cancel();
        });
    }

    let addr = config.bind_addr();
    let state = Arc::new(ExporterState::new(config, Arc::new(cluster), shutdown.clone()));
    serve(state, &addr).await
}

/// Bind `addr` and serve the exporter until `state.shutdown` fires.
pub async fn serve(state: Arc<ExporterState>, addr: &str) -> anyhow::Result<()> {
    let shutdown = state.shutdown.clone();
    let listener = TcpListener::bind(addr).await.with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(
        label_selector = %state.config.label_selector,
        "starting secrets exporter on {addr}"
    );

    let router = build_router(state);
    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;
    Ok(())
}
