// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Cluster`] backed by the Kubernetes API via `kube`.

use std::path::Path;

use anyhow::Context;
use k8s_openapi::api::core::v1::{Namespace, Secret};
use kube::api::{Api, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config, ResourceExt};

use super::Cluster;
use crate::config::ExporterConfig;

/// Kubernetes API client for the exporter's two queries.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the configured kubeconfig.
    ///
    /// An explicit `--kubeconfig` must load. Without one, `$HOME/.kube/config`
    /// is used if it exists; otherwise the config is inferred (in-cluster
    /// service account or `KUBECONFIG`).
    pub async fn connect(config: &ExporterConfig) -> anyhow::Result<Self> {
        let kube_config = match config.kubeconfig_path() {
            Some(path) if config.kubeconfig.is_some() || path.exists() => {
                load_kubeconfig(&path).await?
            }
            _ => {
                tracing::info!("no kubeconfig file found, inferring cluster config");
                Config::infer().await.context("failed to infer cluster config")?
            }
        };
        tracing::info!(cluster_url = %kube_config.cluster_url, "kubernetes client configured");
        let client = Client::try_from(kube_config).context("failed to build kubernetes client")?;
        Ok(Self::new(client))
    }
}

/// Read a kubeconfig file and resolve its current context.
pub async fn load_kubeconfig(path: &Path) -> anyhow::Result<Config> {
    let kubeconfig = Kubeconfig::read_from(path)
        .with_context(|| format!("failed to read kubeconfig {}", path.display()))?;
    let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .with_context(|| format!("invalid kubeconfig {}", path.display()))?;
    Ok(config)
}

#[async_trait::async_trait]
impl Cluster for KubeCluster {
    async fn list_namespaces(&self, label_selector: &str) -> anyhow::Result<Vec<String>> {
        let start = std::time::Instant::now();
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let list = namespaces
            .list(&ListParams::default().labels(label_selector))
            .await
            .with_context(|| format!("list namespaces ({label_selector})"))?;
        tracing::debug!(elapsed = ?start.elapsed(), count = list.items.len(), "listed namespaces");
        Ok(list.items.iter().map(|ns| ns.name_any()).collect())
    }

    async fn list_secrets(&self, namespace: &str) -> anyhow::Result<Vec<Secret>> {
        let start = std::time::Instant::now();
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let list = secrets
            .list(&ListParams::default())
            .await
            .with_context(|| format!("list secrets in {namespace}"))?;
        tracing::debug!(namespace, elapsed = ?start.elapsed(), count = list.items.len(), "listed secrets");
        Ok(list.items)
    }
}

#[cfg(test)]
#[path = "kubernetes_tests.rs"]
mod tests;
