//! API endpoints.

mod follow;
mod notifications;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/follow", follow::router())
        .nest("/notifications", notifications::router())
}
