//! HTTP surface over the check-in engine.
//!
//! Routes are nested under `/api/`. Handlers parse input, then hand the
//! synchronous engine call to the blocking pool via `AppContext::run`.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use server::{start_server, ApiServer};
pub use types::AppContext;
