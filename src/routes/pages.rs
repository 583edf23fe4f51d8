use crate::{AppState, pages};
use axum::{Router, middleware, routing::get};

/// Pages Router Module
///
/// Server-rendered pages. Every role section is wrapped in its layout, which redirects
/// visitors without the matching role to `/` before the page runs.
pub fn page_routes(state: AppState) -> Router<AppState> {
    let learner = Router::new()
        .route("/learner/dashboard", get(pages::learner_dashboard))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            pages::learner_layout,
        ));

    let instructor = Router::new()
        .route("/instructor/dashboard", get(pages::instructor_dashboard))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            pages::instructor_layout,
        ));

    let super_admin = Router::new()
        .route("/super-admin/dashboard", get(pages::super_admin_dashboard))
        .route_layer(middleware::from_fn_with_state(
            state,
            pages::super_admin_layout,
        ));

    Router::new()
        // GET /
        // Landing page; also where denied visitors end up.
        .route("/", get(pages::landing_page))
        .merge(learner)
        .merge(instructor)
        .merge(super_admin)
}
