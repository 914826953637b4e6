// Path: crates/gateway/src/bin/mpicd.rs
#![forbid(unsafe_code)]

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use mpic_caa_checker::resolver::HickoryCaaResolver;
use mpic_caa_checker::MpicCaaChecker;
use mpic_coordinator::MpicCoordinator;
use mpic_gateway::config::GatewayConfig;
use mpic_gateway::remote::HttpPerspectiveClient;
use mpic_gateway::AppState;
use mpic_telemetry::http::OpsInfo;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(name = "mpicd", about = "MPIC coordinator / perspective gateway")]
struct MpicdOpts {
    #[clap(long, help = "Path to the mpicd.toml configuration file.")]
    config: PathBuf,
    #[clap(
        long,
        env = "MPIC_HASH_SECRET",
        hide_env_values = true,
        help = "Overrides the cohort-shuffling secret from the configuration file."
    )]
    hash_secret: Option<String>,
    #[clap(long, env = "LISTEN_ADDRESS", help = "Overrides the configured listen address.")]
    listen_address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    mpic_telemetry::init::init_tracing()?;
    mpic_telemetry::prometheus::install();

    let opts = MpicdOpts::parse();
    let mut config = GatewayConfig::load(&opts.config)?;
    if let Some(listen_address) = opts.listen_address {
        config.listen_address = listen_address;
    }
    if let Some(hash_secret) = opts.hash_secret {
        match config.coordinator.as_mut() {
            Some(role) => role.coordinator.hash_secret = hash_secret,
            None => tracing::warn!(
                target: "mpicd",
                "MPIC_HASH_SECRET set but no [coordinator] role is configured"
            ),
        }
    }

    let coordinator = match &config.coordinator {
        Some(role) => {
            let client = HttpPerspectiveClient::new(
                role.perspective_endpoints.clone(),
                Duration::from_secs(role.remote_call_timeout_secs),
            )
            .context("building the remote perspective client")?;
            let coordinator = MpicCoordinator::new(Arc::new(client), role.coordinator.clone())
                .context("invalid [coordinator] configuration")?;
            tracing::info!(
                target: "mpicd",
                perspectives = coordinator.registry().len(),
                "coordinator role enabled"
            );
            Some(Arc::new(coordinator))
        }
        None => None,
    };

    let caa_checker = match &config.perspective {
        Some(role) => {
            let resolver = HickoryCaaResolver::from_system_conf()
                .context("building the system DNS resolver")?;
            let checker = MpicCaaChecker::new(&role.checker, Arc::new(resolver))
                .context("invalid [perspective] configuration")?;
            tracing::info!(
                target: "mpicd",
                perspective = %role.checker.perspective,
                "perspective role enabled"
            );
            Some(Arc::new(checker))
        }
        None => None,
    };

    if coordinator.is_none() && caa_checker.is_none() {
        return Err(anyhow!(
            "mpicd needs at least one of [coordinator] or [perspective] configured"
        ));
    }

    if let Some(telemetry_address) = &config.telemetry_listen_address {
        let addr: SocketAddr = telemetry_address
            .parse()
            .context("parsing telemetry_listen_address")?;
        let mut roles = Vec::new();
        if coordinator.is_some() {
            roles.push("coordinator");
        }
        if caa_checker.is_some() {
            roles.push("perspective");
        }
        tokio::spawn(mpic_telemetry::http::run_server(addr, OpsInfo { roles }));
    }

    let app = mpic_gateway::router(AppState {
        coordinator,
        caa_checker,
    });
    let listener = tokio::net::TcpListener::bind(&config.listen_address)
        .await
        .with_context(|| format!("binding {}", config.listen_address))?;
    tracing::info!(target: "mpicd", addr = %listener.local_addr()?, "gateway listening");
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
