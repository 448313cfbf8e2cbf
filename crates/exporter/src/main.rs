// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use tracing::error;

use secrets_exporter::config::ExporterConfig;

#[tokio::main]
async fn main() {
    let config = ExporterConfig::parse();

    if let Err(e) = config.validate() {
        eprintln!("error: {e}");
        std::process::exit(2);
    }

    secrets_exporter::init_tracing(&config);

    if let Err(e) = secrets_exporter::run(config).await {
        error!("fatal: {e:#}");
        std::process::exit(1);
    }
}
