use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session: read-only course and AI-content lookups, blob
/// metadata, and the email provider checks.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for the load balancer.
        .route("/health", get(|| async { "ok" }))
        // GET /api/ai-tools/fetch?courseId=..&toolName=..&toolId=..
        // Stored output of one AI tool run for a course (or null).
        .route("/api/ai-tools/fetch", get(handlers::fetch_ai_content))
        // GET /api/blob/metadata?url=..
        // HEAD lookup of one blob; 404 when the URL does not resolve to an object.
        .route("/api/blob/metadata", get(handlers::get_blob_metadata))
        // GET /api/courses/hero-section
        // Three upcoming and three latest approved courses for the landing page.
        .route("/api/courses/hero-section", get(handlers::get_hero_section))
        // POST /api/test-email
        // Sends the welcome and approval templates to one address.
        .route("/api/test-email", post(handlers::send_test_email))
        // GET /api/verify-email
        // Email provider health check.
        .route("/api/verify-email", get(handlers::verify_email_service))
}
