// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Label selector applied to namespaces when none is configured.
pub const DEFAULT_LABEL_SELECTOR: &str = "scope=client";

/// Serves service-account token secrets of labelled namespaces as JSON.
#[derive(Debug, Clone, Parser)]
#[command(name = "secrets-exporter", version, about)]
pub struct ExporterConfig {
    /// Absolute path to the kubeconfig file. Defaults to `$HOME/.kube/config`.
    #[arg(long, env = "SECRETS_EXPORTER_KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Host to bind on.
    #[arg(long, default_value = "0.0.0.0", env = "SECRETS_EXPORTER_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8080, env = "SECRETS_EXPORTER_PORT")]
    pub port: u16,

    /// Label selector used to pick the namespaces to export.
    #[arg(long, default_value = DEFAULT_LABEL_SELECTOR, env = "SECRETS_EXPORTER_LABEL_SELECTOR")]
    pub label_selector: String,

    /// Max concurrent secret listings, shared by all in-flight requests.
    #[arg(long, default_value_t = 16, env = "SECRETS_EXPORTER_MAX_CONCURRENCY")]
    pub max_concurrency: usize,

    /// Deadline for a whole export request in milliseconds.
    #[arg(long, default_value_t = 30000, env = "SECRETS_EXPORTER_REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: u64,

    /// Log format (json or text).
    #[arg(long, default_value = "text", env = "SECRETS_EXPORTER_LOG_FORMAT")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "SECRETS_EXPORTER_LOG_LEVEL")]
    pub log_level: String,
}

impl ExporterConfig {
    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_concurrency == 0 {
            anyhow::bail!("--max-concurrency must be at least 1");
        }
        if self.request_timeout_ms == 0 {
            anyhow::bail!("--request-timeout-ms must be at least 1");
        }
        if self.label_selector.trim().is_empty() {
            anyhow::bail!("--label-selector must not be empty");
        }
        match self.log_format.as_str() {
            "json" | "text" => {}
            other => anyhow::bail!("invalid --log-format: {other} (expected json or text)"),
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Kubeconfig path to load: the explicit flag, else `$HOME/.kube/config`.
    ///
    /// `None` means no home directory is known and no path was given.
    pub fn kubeconfig_path(&self) -> Option<PathBuf> {
        if let Some(ref path) = self.kubeconfig {
            return Some(path.clone());
        }
        let home = std::env::var_os("HOME").filter(|h| !h.is_empty())?;
        Some(PathBuf::from(home).join(".kube").join("config"))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
