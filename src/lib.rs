use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod approval;
pub mod auth;
pub mod authorization;
pub mod config;
pub mod email;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod pages;
pub mod repository;
pub mod storage;
pub mod views;

// Routing segregated by access tier.
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, pages as page_routes, public, super_admin};

// --- Public Re-exports ---

pub use authorization::{AuthorizationPolicy, PolicyState, RolePolicy};
pub use config::AppConfig;
pub use email::{EmailState, HttpEmailClient, MockEmailService};
pub use repository::{PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// OpenAPI document for the JSON API, served at `/api-docs/openapi.json` and browsable
/// at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::fetch_ai_content, handlers::list_blobs, handlers::get_blob_metadata,
        handlers::get_hero_section, handlers::initial_approval, handlers::send_test_email,
        handlers::verify_email_service
    ),
    components(
        schemas(
            models::Course, models::AiGeneratedContent, models::AiContentResponse,
            models::BlobObject, models::BlobListing, models::BlobMetadata,
            models::HeroSectionResponse, models::InitialApprovalRequest, models::ActionResponse,
            models::ApprovalFailureResponse,
            models::TestEmailRequest, models::TestEmailResponse, models::TestEmailResult,
            models::EmailHealthResponse, models::Role,
        )
    ),
    tags(
        (name = "course-portal", description = "Course marketplace API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, immutable container of every service handle and the configuration,
/// shared by all requests. Handles are constructed explicitly at startup (or by tests)
/// and injected here; there are no global clients.
#[derive(Clone)]
pub struct AppState {
    /// Database access (service-role Postgres connection).
    pub repo: RepositoryState,
    /// Object storage for course assets.
    pub storage: StorageState,
    /// Transactional email provider.
    pub email: EmailState,
    /// Role authorization capability used by layouts and role-restricted handlers.
    pub policy: PolicyState,
    pub config: AppConfig,
}

impl AppState {
    /// Assembles the state with the default `RolePolicy`.
    pub fn new(
        repo: RepositoryState,
        storage: StorageState,
        email: EmailState,
        config: AppConfig,
    ) -> Self {
        Self {
            repo,
            storage,
            email,
            policy: Arc::new(RolePolicy),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for EmailState {
    fn from_ref(app_state: &AppState) -> EmailState {
        app_state.email.clone()
    }
}

impl FromRef<AppState> for PolicyState {
    fn from_ref(app_state: &AppState) -> PolicyState {
        app_state.policy.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Guards the authenticated and super-admin API tiers. Extracting `AuthUser` rejects the
/// request with 401 before the handler runs when there is no valid session; otherwise the
/// resolved user is handed to the handler through the request extensions.
async fn auth_middleware(auth_user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(auth_user);
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies the access layers per tier and the global
/// observability layers, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .merge(super_admin::super_admin_routes())
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        )
        .merge(page_routes::page_routes(state.clone()))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: every log line of one request carries its method, URI
/// and `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
