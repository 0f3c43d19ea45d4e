//! Gate configuration: which tools to run and how long to wait for them.

use std::path::Path;
use std::time::Duration;

/// Default wall-clock limit for an orchestration command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// Default wall-clock limit for address discovery.
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Environment variable the compose file reads the bind address from.
pub const DEFAULT_ADDRESS_VAR: &str = "TAILSCALE_IP";

/// Address injected when discovery fails.
pub const FALLBACK_ADDRESS: &str = "127.0.0.1";

/// An external program together with the arguments that precede every
/// per-call argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `docker compose -f <file>`
    pub fn docker_compose(program: impl Into<String>, compose_file: &Path) -> Self {
        Self::new(
            program,
            ["compose".to_string(), "-f".to_string(), compose_file.display().to_string()],
        )
    }

    /// Render the full command line for logs and error messages.
    pub fn display_with(&self, extra: &[&str]) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .chain(extra.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How the overlay address is resolved.
#[derive(Debug, Clone)]
pub struct AddressConfig {
    /// Variable injected into the child environment. Also checked in the
    /// inherited environment as an override.
    pub env_var: String,
    /// Tool that prints the host's private address on stdout.
    pub discovery: ToolCommand,
    pub timeout: Duration,
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self {
            env_var: DEFAULT_ADDRESS_VAR.to_string(),
            discovery: ToolCommand::new("tailscale", ["ip", "-4"]),
            timeout: DEFAULT_DISCOVERY_TIMEOUT,
        }
    }
}

/// Everything the operation gate needs to invoke the orchestration tool.
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub compose: ToolCommand,
    pub command_timeout: Duration,
    pub address: AddressConfig,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            compose: ToolCommand::docker_compose("docker", Path::new("docker-compose.yml")),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            address: AddressConfig::default(),
        }
    }
}
