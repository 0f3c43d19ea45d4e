//! Best-effort resolution of the address injected into the compose environment.

use std::process::Stdio;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::config::{AddressConfig, FALLBACK_ADDRESS};

/// Resolves the host address handed to the orchestration tool.
///
/// Resolution never fails: an inherited override wins, then the discovery
/// tool, then the loopback fallback.
pub struct AddressResolver {
    config: AddressConfig,
}

impl AddressResolver {
    pub fn new(config: AddressConfig) -> Self {
        Self { config }
    }

    /// Name of the variable the address is injected as.
    pub fn env_var(&self) -> &str {
        &self.config.env_var
    }

    pub async fn resolve(&self) -> String {
        if let Some(addr) = std::env::var_os(&self.config.env_var) {
            return addr.to_string_lossy().into_owned();
        }

        self.discover()
            .await
            .unwrap_or_else(|| FALLBACK_ADDRESS.to_string())
    }

    async fn discover(&self) -> Option<String> {
        let discovery = &self.config.discovery;
        let output = Command::new(&discovery.program)
            .args(&discovery.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        match timeout(self.config.timeout, output).await {
            Ok(Ok(output)) if output.status.success() => {
                let addr = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if addr.is_empty() {
                    debug!(program = %discovery.program, "Address discovery printed nothing");
                    None
                } else {
                    Some(addr)
                }
            }
            Ok(Ok(output)) => {
                debug!(program = %discovery.program, status = %output.status, "Address discovery failed");
                None
            }
            Ok(Err(e)) => {
                debug!(program = %discovery.program, error = %e, "Address discovery unavailable");
                None
            }
            Err(_) => {
                debug!(program = %discovery.program, "Address discovery timed out");
                None
            }
        }
    }
}
