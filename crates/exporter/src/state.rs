// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::cluster::Cluster;
use crate::config::ExporterConfig;

/// Shared exporter state.
///
/// Read-only after startup apart from `permits`; each request builds its
/// results from scratch.
pub struct ExporterState {
    pub config: ExporterConfig,
    pub cluster: Arc<dyn Cluster>,
    /// Caps outbound secret listings across all in-flight requests.
    pub permits: Arc<Semaphore>,
    pub shutdown: CancellationToken,
}

impl ExporterState {
    pub fn new(
        config: ExporterConfig,
        cluster: Arc<dyn Cluster>,
        shutdown: CancellationToken,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
        Self { config, cluster, permits, shutdown }
    }
}
