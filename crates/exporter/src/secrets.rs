// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-namespace collection of service-account token secrets.
//!
//! Each namespace is listed by its own task which builds its own result;
//! results only meet at the join in [`collect_all`].

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::cluster::Cluster;

/// Secret type marking a service-account token.
pub const SERVICE_ACCOUNT_TOKEN_TYPE: &str = "kubernetes.io/service-account-token";

/// Annotation naming the service account a token belongs to.
pub const SERVICE_ACCOUNT_NAME_ANNOTATION: &str = "kubernetes.io/service-account.name";

/// Data key holding the token itself.
pub const TOKEN_KEY: &str = "token";

/// One service-account token secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret {
    pub name: String,
    #[serde(rename = "serviceaccount")]
    pub service_account: String,
    pub token: String,
}

/// All token secrets of one namespace.
///
/// `error` is set when the namespace could not be listed; `secrets` is then
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceSecrets {
    pub namespace: String,
    #[serde(rename = "Secrets")]
    pub secrets: Vec<TokenSecret>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NamespaceSecrets {
    pub fn failed(namespace: String, error: impl Into<String>) -> Self {
        Self { namespace, secrets: Vec::new(), error: Some(error.into()) }
    }
}

/// Convert `secret` if it is a service-account token.
///
/// A missing annotation or `token` entry yields an empty string.
pub fn token_secret(secret: &Secret) -> Option<TokenSecret> {
    if secret.type_.as_deref() != Some(SERVICE_ACCOUNT_TOKEN_TYPE) {
        return None;
    }
    let service_account =
        secret.annotations().get(SERVICE_ACCOUNT_NAME_ANNOTATION).cloned().unwrap_or_default();
    let token = secret
        .data
        .as_ref()
        .and_then(|data| data.get(TOKEN_KEY))
        .map(|bytes| String::from_utf8_lossy(&bytes.0).into_owned())
        .unwrap_or_default();
    Some(TokenSecret { name: secret.name_any(), service_account, token })
}

/// Keep only service-account tokens, preserving listing order.
pub fn extract_token_secrets(secrets: &[Secret]) -> Vec<TokenSecret> {
    secrets.iter().filter_map(token_secret).collect()
}

/// List and filter the secrets of one namespace.
///
/// Never fails: a listing error is recorded on the returned entry.
pub async fn collect_namespace(cluster: &dyn Cluster, namespace: String) -> NamespaceSecrets {
    match cluster.list_secrets(&namespace).await {
        Ok(secrets) => {
            let secrets = extract_token_secrets(&secrets);
            tracing::debug!(namespace = %namespace, count = secrets.len(), "collected token secrets");
            NamespaceSecrets { namespace, secrets, error: None }
        }
        Err(e) => {
            tracing::warn!(namespace = %namespace, err = %format!("{e:#}"), "secret listing failed");
            NamespaceSecrets::failed(namespace, format!("{e:#}"))
        }
    }
}

/// Collect every namespace concurrently, each task holding one of `permits`
/// while it talks to the cluster.
///
/// Returns exactly one entry per distinct namespace, sorted by name. A task
/// that panics still produces an entry carrying the failure.
pub async fn collect_all(
    cluster: Arc<dyn Cluster>,
    namespaces: Vec<String>,
    permits: Arc<Semaphore>,
) -> Vec<NamespaceSecrets> {
    let namespaces: BTreeSet<String> = namespaces.into_iter().collect();
    let mut tasks = JoinSet::new();
    let mut pending = HashMap::with_capacity(namespaces.len());

    for namespace in namespaces {
        let cluster = Arc::clone(&cluster);
        let permits = Arc::clone(&permits);
        let task_namespace = namespace.clone();
        let handle = tasks.spawn(
            async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(p) => p,
                    Err(_) => {
                        return NamespaceSecrets::failed(task_namespace, "concurrency limiter closed")
                    }
                };
                collect_namespace(cluster.as_ref(), task_namespace).await
            }
            .in_current_span(),
        );
        pending.insert(handle.id(), namespace);
    }

    let mut results = Vec::with_capacity(pending.len());
    while let Some(joined) = tasks.join_next_with_id().await {
        match joined {
            Ok((id, entry)) => {
                pending.remove(&id);
                results.push(entry);
            }
            Err(e) => {
                let Some(namespace) = pending.remove(&e.id()) else { continue };
                tracing::error!(namespace = %namespace, err = %e, "secret collection task failed");
                results.push(NamespaceSecrets::failed(namespace, format!("collection task failed: {e}")));
            }
        }
    }

    results.sort_by(|a, b| a.namespace.cmp(&b.namespace));
    results
}

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod tests;
