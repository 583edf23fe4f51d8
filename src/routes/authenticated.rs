use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes that need a valid session but no particular role. The `AuthUser` extractor
/// middleware is applied on top of this router in `create_router`.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/blob/list?prefix=..&limit=..&cursor=..
        // One page of blobs under a prefix; limit and cursor pass through to the store.
        .route("/api/blob/list", get(handlers::list_blobs))
}
