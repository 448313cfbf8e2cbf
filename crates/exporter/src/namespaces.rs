// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::cluster::Cluster;

/// Names of the namespaces matching `label_selector`, sorted and deduplicated.
///
/// Cluster errors propagate; there is no retry.
pub async fn list_namespaces(
    cluster: &dyn Cluster,
    label_selector: &str,
) -> anyhow::Result<Vec<String>> {
    let mut names = cluster.list_namespaces(label_selector).await?;
    names.sort();
    names.dedup();
    tracing::debug!(label_selector, count = names.len(), "listed namespaces");
    Ok(names)
}
