use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use control_api::rest::{AppState, create_router};
use control_api::{AddressConfig, GateConfig, OperationGate, ToolCommand};

#[derive(Parser)]
#[command(name = "control-api")]
#[command(about = "Control API - restart, rebuild and inspect the compose-managed service")]
struct Args {
    /// Address to bind the HTTP server to
    #[arg(default_value = "0.0.0.0")]
    bind: String,

    /// Port to listen on
    #[arg(default_value_t = 8084)]
    port: u16,

    /// Compose file passed to every orchestration command. Relative paths are
    /// resolved against the working directory at startup.
    #[arg(long, default_value = "docker-compose.yml")]
    compose_file: PathBuf,

    /// Program providing the `compose` subcommand
    #[arg(long, default_value = "docker")]
    compose_program: String,

    /// Timeout for orchestration commands, in seconds
    #[arg(long, default_value_t = 300)]
    command_timeout: u64,

    /// Variable the discovered host address is injected as
    #[arg(long, default_value = "TAILSCALE_IP")]
    address_var: String,

    /// Timeout for address discovery, in seconds
    #[arg(long, default_value_t = 5)]
    discovery_timeout: u64,
}

impl Args {
    fn gate_config(&self) -> std::io::Result<GateConfig> {
        let compose_file = std::path::absolute(&self.compose_file)?;
        Ok(GateConfig {
            compose: ToolCommand::docker_compose(self.compose_program.clone(), &compose_file),
            command_timeout: Duration::from_secs(self.command_timeout),
            address: AddressConfig {
                env_var: self.address_var.clone(),
                timeout: Duration::from_secs(self.discovery_timeout),
                ..AddressConfig::default()
            },
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("control_api=info".parse()?))
        .init();

    let args = Args::parse();
    let config = args.gate_config()?;

    info!(
        compose = %config.compose.display_with(&[]),
        timeout_secs = args.command_timeout,
        "Starting control-api"
    );

    let app_state = Arc::new(AppState {
        gate: Arc::new(OperationGate::new(config)),
    });
    let router = create_router(app_state);

    let listener = tokio::net::TcpListener::bind((args.bind.as_str(), args.port)).await?;
    info!("Listening on {}:{}", args.bind, args.port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = signal::ctrl_c();
    let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            warn!(error = %e, "Failed to install SIGTERM handler");
            let _ = ctrl_c.await;
            info!("Received SIGINT");
            return;
        }
    };

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = sigterm.recv() => info!("Received SIGTERM"),
    }
}
