use crate::{AppState, handlers};
use axum::{Router, routing::post};

/// Super-Admin Router Module
///
/// Moderation endpoints. Handlers ask the authorization policy for `super_admin` and
/// answer 403 to any other role.
pub fn super_admin_routes() -> Router<AppState> {
    Router::new()
        // POST /api/super-admin/learner/initial-approval
        // Moves an application to pending_payment, then emails the learner.
        .route(
            "/api/super-admin/learner/initial-approval",
            post(handlers::initial_approval),
        )
}
