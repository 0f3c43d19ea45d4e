//! HTTP façade over the operation gate.

mod handlers;
mod routes;

pub use handlers::{AppState, MANAGED_SERVICE};
pub use routes::create_router;
