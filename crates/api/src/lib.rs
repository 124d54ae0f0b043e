//! HTTP API layer for photogram.
//!
//! - **Endpoints**: REST API for accounts, the follow graph, and
//!   notifications
//! - **Extractors**: Authentication
//! - **Middleware**: Bearer-token resolution, application state
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{auth_middleware, AppState};
