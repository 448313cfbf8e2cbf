// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only access to the Kubernetes control plane.

pub mod kubernetes;

use k8s_openapi::api::core::v1::Secret;

pub use self::kubernetes::KubeCluster;

/// The two cluster queries the exporter needs.
///
/// Errors are returned as-is; callers decide whether a failure is fatal for
/// the request or only for one namespace.
#[async_trait::async_trait]
pub trait Cluster: Send + Sync {
    /// Names of namespaces whose labels satisfy `label_selector`.
    async fn list_namespaces(&self, label_selector: &str) -> anyhow::Result<Vec<String>>;

    /// All secrets in `namespace`, unfiltered.
    async fn list_secrets(&self, namespace: &str) -> anyhow::Result<Vec<Secret>>;
}
