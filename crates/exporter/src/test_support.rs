// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: an in-memory cluster and secret builders.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use tokio_util::sync::CancellationToken;

use crate::cluster::Cluster;
use crate::config::ExporterConfig;
use crate::secrets::{SERVICE_ACCOUNT_NAME_ANNOTATION, SERVICE_ACCOUNT_TOKEN_TYPE, TOKEN_KEY};
use crate::state::ExporterState;

/// Build a `kubernetes.io/service-account-token` secret.
pub fn token_secret(name: &str, service_account: &str, token: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_owned()),
            annotations: Some(BTreeMap::from([(
                SERVICE_ACCOUNT_NAME_ANNOTATION.to_owned(),
                service_account.to_owned(),
            )])),
            ..Default::default()
        },
        type_: Some(SERVICE_ACCOUNT_TOKEN_TYPE.to_owned()),
        data: Some(BTreeMap::from([(
            TOKEN_KEY.to_owned(),
            ByteString(token.as_bytes().to_vec()),
        )])),
        ..Default::default()
    }
}

/// Build a secret of an arbitrary type carrying a `token` entry.
pub fn typed_secret(name: &str, type_: &str, token: &str) -> Secret {
    Secret {
        metadata: ObjectMeta { name: Some(name.to_owned()), ..Default::default() },
        type_: Some(type_.to_owned()),
        data: Some(BTreeMap::from([(
            TOKEN_KEY.to_owned(),
            ByteString(token.as_bytes().to_vec()),
        )])),
        ..Default::default()
    }
}

/// In-memory [`Cluster`] with scriptable failures and latency.
///
/// The label selector is ignored: every configured namespace matches.
#[derive(Default)]
pub struct FakeCluster {
    namespaces: Vec<String>,
    secrets: HashMap<String, Vec<Secret>>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    fail_listing: bool,
    hang_listing: bool,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    secret_calls: AtomicUsize,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace holding `secrets`.
    pub fn namespace(mut self, name: &str, secrets: Vec<Secret>) -> Self {
        self.namespaces.push(name.to_owned());
        self.secrets.insert(name.to_owned(), secrets);
        self
    }

    /// Make secret listing in `name` fail.
    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_owned());
        self
    }

    /// Delay secret listing in `name`.
    pub fn delay(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_owned(), delay);
        self
    }

    /// Make namespace listing fail.
    pub fn fail_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Make namespace listing never return.
    pub fn hang_listing(mut self) -> Self {
        self.hang_listing = true;
        self
    }

    /// Highest number of concurrent secret listings observed.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Total secret listings served.
    pub fn secret_calls(&self) -> usize {
        self.secret_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Cluster for FakeCluster {
    async fn list_namespaces(&self, _label_selector: &str) -> anyhow::Result<Vec<String>> {
        if self.hang_listing {
            std::future::pending::<()>().await;
        }
        if self.fail_listing {
            anyhow::bail!("namespaces is forbidden");
        }
        Ok(self.namespaces.clone())
    }

    async fn list_secrets(&self, namespace: &str) -> anyhow::Result<Vec<Secret>> {
        self.secret_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(namespace) {
            tokio::time::sleep(*delay).await;
        }
        let result = if self.failing.contains(namespace) {
            Err(anyhow::anyhow!("secrets is forbidden in {namespace}"))
        } else {
            Ok(self.secrets.get(namespace).cloned().unwrap_or_default())
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Config with test-friendly defaults.
pub fn test_config() -> ExporterConfig {
    ExporterConfig {
        kubeconfig: None,
        host: "127.0.0.1".into(),
        port: 0,
        label_selector: crate::config::DEFAULT_LABEL_SELECTOR.into(),
        max_concurrency: 4,
        request_timeout_ms: 5000,
        log_format: "text".into(),
        log_level: "debug".into(),
    }
}

/// Exporter state wired to `cluster`.
pub fn test_state(cluster: Arc<FakeCluster>, config: ExporterConfig) -> Arc<ExporterState> {
    Arc::new(ExporterState::new(config, cluster, CancellationToken::new()))
}
