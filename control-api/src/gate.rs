//! Single-flight guard around the orchestration tool.
//!
//! At most one lifecycle operation runs at a time. A caller that finds the
//! slot taken gets an immediate conflict instead of waiting; nothing is
//! queued. The slot is held by a [`SlotGuard`] so it is released on every
//! exit path of the operation, including task cancellation.

use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::sync::{Mutex, PoisonError};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::address::AddressResolver;
use crate::config::GateConfig;
use crate::error::{GateError, Result};

/// Outcome of one gate invocation, rendered verbatim as the response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    pub ok: bool,
    pub output: String,
}

impl OperationResult {
    pub fn success(output: String) -> Self {
        Self { ok: true, output }
    }

    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            ok: false,
            output: output.into(),
        }
    }
}

impl From<Result<String>> for OperationResult {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(output) => Self::success(output),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

/// Claim on the operation slot. Dropping it returns the slot to idle.
pub struct SlotGuard<'a> {
    slot: &'a Mutex<Option<String>>,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Serializes lifecycle operations against the orchestration tool.
pub struct OperationGate {
    slot: Mutex<Option<String>>,
    config: GateConfig,
    resolver: AddressResolver,
}

impl OperationGate {
    pub fn new(config: GateConfig) -> Self {
        let resolver = AddressResolver::new(config.address.clone());
        Self {
            slot: Mutex::new(None),
            config,
            resolver,
        }
    }

    /// Name of the in-flight operation, if any.
    pub fn current(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Claim the slot for `name` without waiting.
    pub fn try_acquire(&self, name: &str) -> Result<SlotGuard<'_>> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(running) = slot.as_ref() {
            return Err(GateError::AlreadyRunning(running.clone()));
        }
        *slot = Some(name.to_string());
        Ok(SlotGuard { slot: &self.slot })
    }

    /// Run the orchestration tool with `args` as operation `name`.
    ///
    /// `ok` is true whenever the tool ran to completion, whatever its exit
    /// code; it is false on conflict, spawn failure and timeout.
    pub async fn execute(&self, args: &[&str], name: &str) -> OperationResult {
        let result = self.run(args, name).await;
        match &result {
            Ok(_) => {}
            Err(GateError::AlreadyRunning(running)) => {
                info!(op = name, running = %running, "Rejected operation, slot busy");
            }
            Err(e) => warn!(op = name, error = %e, "Operation failed"),
        }
        result.into()
    }

    async fn run(&self, args: &[&str], name: &str) -> Result<String> {
        let _guard = self.try_acquire(name)?;

        let address = self.resolver.resolve().await;
        let compose = &self.config.compose;
        let command = compose.display_with(args);
        info!(op = name, command = %command, address = %address, "Starting operation");

        let output = Command::new(&compose.program)
            .args(&compose.args)
            .args(args)
            .env(self.resolver.env_var(), &address)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match timeout(self.config.command_timeout, output).await {
            Ok(result) => result.map_err(|source| GateError::Spawn {
                command: command.clone(),
                source,
            })?,
            Err(_) => {
                return Err(GateError::Timeout {
                    command,
                    timeout: self.config.command_timeout,
                });
            }
        };

        if output.status.success() {
            info!(op = name, "Operation finished");
        } else {
            warn!(op = name, status = %output.status, "Operation exited unsuccessfully");
        }

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }
}
