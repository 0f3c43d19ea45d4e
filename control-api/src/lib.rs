//! control-api: single-flight HTTP control surface for a compose-managed service.
//!
//! Exposes restart, rebuild and status routes that shell out to
//! `docker compose`, with at most one operation in flight at a time.

pub mod address;
pub mod config;
pub mod error;
pub mod gate;
pub mod rest;

pub use address::AddressResolver;
pub use config::{AddressConfig, GateConfig, ToolCommand};
pub use error::GateError;
pub use gate::{OperationGate, OperationResult, SlotGuard};
