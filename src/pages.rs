use axum::{
    Extension,
    extract::{Request, State},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    auth::{AuthUser, MaybeAuthUser},
    authorization::Authorization,
    handlers::load_hero_section,
    models::{
        ApplicationStatus, CourseQuery, CourseStatus, InstructorDashboard, LearnerDashboard, Role,
        SuperAdminDashboard,
    },
    views,
};

/// How many pending courses the super-admin dashboard shows.
const PENDING_COURSES_LIMIT: i64 = 50;

// --- Layouts (role gates) ---

/// enforce_role
///
/// Shared body of the role layouts. Denied visitors are redirected to the site root; the
/// reason only reaches the logs. Allowed visitors continue with their `AuthUser` placed
/// in the request extensions for the page.
async fn enforce_role(
    state: &AppState,
    identity: Option<AuthUser>,
    required: Role,
    mut request: Request,
    next: Next,
) -> Response {
    match state.policy.authorize(identity.as_ref(), required) {
        Authorization::Allowed => {
            if let Some(user) = identity {
                request.extensions_mut().insert(user);
            }
            next.run(request).await
        }
        Authorization::Denied(reason) => {
            tracing::debug!(
                path = %request.uri().path(),
                required = %required,
                %reason,
                "Redirecting visitor away from gated page"
            );
            Redirect::to("/").into_response()
        }
    }
}

pub async fn learner_layout(
    State(state): State<AppState>,
    MaybeAuthUser(identity): MaybeAuthUser,
    request: Request,
    next: Next,
) -> Response {
    enforce_role(&state, identity, Role::Learner, request, next).await
}

pub async fn instructor_layout(
    State(state): State<AppState>,
    MaybeAuthUser(identity): MaybeAuthUser,
    request: Request,
    next: Next,
) -> Response {
    enforce_role(&state, identity, Role::Instructor, request, next).await
}

pub async fn super_admin_layout(
    State(state): State<AppState>,
    MaybeAuthUser(identity): MaybeAuthUser,
    request: Request,
    next: Next,
) -> Response {
    enforce_role(&state, identity, Role::SuperAdmin, request, next).await
}

// --- Pages ---

/// landing_page
///
/// `/`: the public home page and the target of every layout redirect.
pub async fn landing_page(State(state): State<AppState>) -> Html<String> {
    match load_hero_section(&state).await {
        Ok(hero) => Html(views::landing_page(&hero)),
        Err(e) => {
            tracing::error!("Landing page data failed: {}", e);
            Html(views::inline_error("Home"))
        }
    }
}

/// learner_dashboard
///
/// The learner's own applications with their course and status.
pub async fn learner_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Html<String> {
    match state.repo.get_learner_applications(user.id).await {
        Ok(applications) => Html(views::learner_dashboard(&LearnerDashboard {
            viewer_email: user.email,
            applications,
        })),
        Err(e) => {
            tracing::error!(user_id = %user.id, "Learner dashboard data failed: {}", e);
            Html(views::inline_error("Learner dashboard"))
        }
    }
}

/// instructor_dashboard
pub async fn instructor_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Html<String> {
    match state.repo.get_instructor_courses(user.id).await {
        Ok(courses) => Html(views::instructor_dashboard(&InstructorDashboard {
            viewer_email: user.email,
            courses,
        })),
        Err(e) => {
            tracing::error!(user_id = %user.id, "Instructor dashboard data failed: {}", e);
            Html(views::inline_error("Instructor dashboard"))
        }
    }
}

/// super_admin_dashboard
///
/// Review queue: applications still `pending` and courses awaiting approval.
pub async fn super_admin_dashboard(State(state): State<AppState>) -> Html<String> {
    let pending_applications = state
        .repo
        .get_applications_by_status(ApplicationStatus::Pending)
        .await;
    let pending_courses = state
        .repo
        .list_courses(CourseQuery {
            status: CourseStatus::Pending,
            upcoming_only: false,
            limit: PENDING_COURSES_LIMIT,
        })
        .await;

    match (pending_applications, pending_courses) {
        (Ok(pending_applications), Ok(pending_courses)) => {
            Html(views::super_admin_dashboard(&SuperAdminDashboard {
                pending_applications,
                pending_courses,
            }))
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("Super-admin dashboard data failed: {}", e);
            Html(views::inline_error("Super-admin dashboard"))
        }
    }
}
