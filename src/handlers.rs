use crate::{
    AppState,
    approval::{self, ApprovalOutcome},
    auth::AuthUser,
    authorization::{Authorization, DenialReason},
    email::{EmailMessage, EmailTemplate},
    error::{ActionError, AppError},
    extract::{ActionJson, ApiJson, ApiQuery},
    models::{
        ActionResponse, AiContentResponse, ApprovalFailureResponse, BlobListing, BlobMetadata,
        CourseQuery, CourseStatus, EmailHealthResponse, HeroSectionResponse,
        InitialApprovalRequest, Role, TestEmailRequest, TestEmailResponse, TestEmailResult,
    },
};
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use uuid::Uuid;

/// Number of courses in each list of the landing page hero section.
pub const HERO_SECTION_LIMIT: i64 = 3;

// --- Query Structs ---

/// AiToolQuery
///
/// Query parameters of `GET /api/ai-tools/fetch`. All three are required; they are
/// optional here so a missing one becomes a JSON 400 instead of Axum's plain rejection.
#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AiToolQuery {
    pub course_id: Option<String>,
    pub tool_name: Option<String>,
    pub tool_id: Option<String>,
}

/// BlobListQuery
///
/// Query parameters of `GET /api/blob/list`, passed to the store unvalidated.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BlobListQuery {
    pub prefix: Option<String>,
    pub limit: Option<i32>,
    pub cursor: Option<String>,
}

/// BlobMetadataQuery
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BlobMetadataQuery {
    /// Public URL of the blob.
    pub url: Option<String>,
}

/// Treats absent and blank parameters alike.
fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// --- Handlers ---

/// fetch_ai_content
///
/// [Public Route] Returns the stored output of one AI tool run for a course, or `null`
/// when the tool has not produced anything yet.
#[utoipa::path(
    get,
    path = "/api/ai-tools/fetch",
    params(AiToolQuery),
    responses(
        (status = 200, description = "Content (or null)", body = AiContentResponse),
        (status = 400, description = "Missing or malformed parameters"),
        (status = 500, description = "Database failure")
    )
)]
pub async fn fetch_ai_content(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AiToolQuery>,
) -> Result<Json<AiContentResponse>, AppError> {
    let (Some(course_id), Some(tool_name), Some(tool_id)) = (
        required(&query.course_id),
        required(&query.tool_name),
        required(&query.tool_id),
    ) else {
        return Err(AppError::BadRequest(
            "Missing required parameters: courseId, toolName and toolId".to_string(),
        ));
    };

    let data = state
        .repo
        .get_ai_content(course_id, tool_name, tool_id)
        .await?;

    Ok(Json(AiContentResponse {
        success: true,
        data,
    }))
}

/// list_blobs
///
/// [Authenticated Route] Lists blobs under a prefix. `limit` and `cursor` are handed to
/// the store untouched.
#[utoipa::path(
    get,
    path = "/api/blob/list",
    params(BlobListQuery),
    responses(
        (status = 200, description = "One page of blobs", body = BlobListing),
        (status = 400, description = "Malformed query string"),
        (status = 401, description = "No session"),
        (status = 404, description = "Bucket not found"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn list_blobs(
    Extension(AuthUser { id, .. }): Extension<AuthUser>,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BlobListQuery>,
) -> Result<Json<BlobListing>, AppError> {
    tracing::debug!(user_id = %id, prefix = ?query.prefix, "Listing blobs");

    let listing = state
        .storage
        .list_blobs(
            query.prefix.as_deref(),
            query.limit,
            query.cursor.as_deref(),
        )
        .await
        .map_err(|e| {
            tracing::error!("Blob listing failed: {}", e);
            AppError::from(e)
        })?;

    Ok(Json(listing))
}

/// get_blob_metadata
///
/// [Public Route] HEAD lookup of a single blob by its public URL. Every lookup failure
/// answers 404 with the store's message.
#[utoipa::path(
    get,
    path = "/api/blob/metadata",
    params(BlobMetadataQuery),
    responses(
        (status = 200, description = "Blob metadata", body = BlobMetadata),
        (status = 400, description = "Missing url"),
        (status = 404, description = "Blob not found")
    )
)]
pub async fn get_blob_metadata(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BlobMetadataQuery>,
) -> Result<Json<BlobMetadata>, AppError> {
    let Some(url) = required(&query.url) else {
        return Err(AppError::BadRequest("URL parameter is required".to_string()));
    };

    let metadata = state
        .storage
        .head_blob(url)
        .await
        .map_err(|e| AppError::NotFound(e.to_string()))?;

    Ok(Json(metadata))
}

/// get_hero_section
///
/// [Public Route] Courses for the landing page hero: the next approved courses to start
/// and the newest approved courses, three of each.
#[utoipa::path(
    get,
    path = "/api/courses/hero-section",
    responses(
        (status = 200, description = "Hero courses", body = HeroSectionResponse),
        (status = 500, description = "Database failure")
    )
)]
pub async fn get_hero_section(
    State(state): State<AppState>,
) -> Result<Json<HeroSectionResponse>, AppError> {
    Ok(Json(load_hero_section(&state).await?))
}

/// Shared by the API route and the landing page.
pub async fn load_hero_section(state: &AppState) -> Result<HeroSectionResponse, AppError> {
    let upcoming_courses = state
        .repo
        .list_courses(CourseQuery {
            status: CourseStatus::Approved,
            upcoming_only: true,
            limit: HERO_SECTION_LIMIT,
        })
        .await?;

    let courses = state
        .repo
        .list_courses(CourseQuery {
            status: CourseStatus::Approved,
            upcoming_only: false,
            limit: HERO_SECTION_LIMIT,
        })
        .await?;

    Ok(HeroSectionResponse {
        upcoming_courses,
        courses,
    })
}

/// initial_approval
///
/// [Super-Admin Route] Moves a learner application to `pending_payment` and emails the
/// learner the approval notice.
///
/// If the email fails after the update, the answer is a 500 that still states the update
/// happened (`statusUpdated: true`); the failure is recorded for manual follow-up.
#[utoipa::path(
    post,
    path = "/api/super-admin/learner/initial-approval",
    request_body = InitialApprovalRequest,
    responses(
        (status = 200, description = "Approved and notified", body = ActionResponse),
        (status = 400, description = "Missing or malformed applicationId"),
        (status = 403, description = "Not a super-admin"),
        (status = 404, description = "Application not found"),
        (status = 500, description = "Update failed, or the notification failed after the update", body = ApprovalFailureResponse)
    )
)]
pub async fn initial_approval(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
    ActionJson(payload): ActionJson<InitialApprovalRequest>,
) -> Result<Response, ActionError> {
    if let Authorization::Denied(reason) = state.policy.authorize(Some(&user), Role::SuperAdmin) {
        tracing::debug!(user_id = %user.id, %reason, "Initial approval denied");
        return Err(match reason {
            DenialReason::Unauthenticated => AppError::Unauthorized,
            _ => AppError::Forbidden("Super-admin role required".to_string()),
        }
        .into());
    }

    let Some(raw_id) = required(&payload.application_id) else {
        return Err(AppError::BadRequest("Application ID is required".to_string()).into());
    };
    let application_id = Uuid::parse_str(raw_id)
        .map_err(|_| AppError::BadRequest(format!("Invalid application ID: {}", raw_id)))?;

    let outcome = approval::approve_learner_application(
        state.repo.as_ref(),
        state.email.as_ref(),
        &state.config.site_url,
        application_id,
    )
    .await?;

    match outcome {
        ApprovalOutcome::Completed(_) => {
            Ok((StatusCode::OK, Json(ActionResponse { success: true })).into_response())
        }
        ApprovalOutcome::NotFound => {
            Err(AppError::NotFound("Application not found".to_string()).into())
        }
        ApprovalOutcome::NotificationFailed {
            error, recorded, ..
        } => Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApprovalFailureResponse {
                success: false,
                error: error.to_string(),
                status_updated: true,
                notification_sent: false,
                failure_recorded: recorded,
            }),
        )
            .into_response()),
    }
}

/// send_test_email
///
/// [Public Route] Sends the welcome and the approval template to one address so the
/// provider setup can be checked end to end. Both sends are attempted even if the first
/// one fails.
#[utoipa::path(
    post,
    path = "/api/test-email",
    request_body = TestEmailRequest,
    responses(
        (status = 200, description = "Both emails accepted", body = TestEmailResponse),
        (status = 400, description = "Missing email or name, or malformed body"),
        (status = 500, description = "At least one send failed", body = TestEmailResponse)
    )
)]
pub async fn send_test_email(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<TestEmailRequest>,
) -> Result<(StatusCode, Json<TestEmailResponse>), AppError> {
    let (Some(email), Some(name)) = (required(&payload.email), required(&payload.name)) else {
        return Err(AppError::BadRequest("Email and name are required".to_string()));
    };

    let messages = [
        EmailMessage::new(EmailTemplate::Welcome, email).var("name", name),
        EmailMessage::new(EmailTemplate::ApplicationApproved, email)
            .var("name", name)
            .var("courseTitle", "Sample Course")
            .var("price", 0.0)
            .var(
                "paymentUrl",
                format!("{}/learner/dashboard", state.config.site_url.trim_end_matches('/')),
            ),
    ];

    let mut results = Vec::with_capacity(messages.len());
    for message in messages {
        let template = message.template.name().to_string();
        let result = match state.email.send(message).await {
            Ok(receipt) => TestEmailResult {
                template,
                success: true,
                message_id: Some(receipt.id),
                error: None,
            },
            Err(e) => {
                tracing::error!(template = %template, "Test email failed: {}", e);
                TestEmailResult {
                    template,
                    success: false,
                    message_id: None,
                    error: Some(e.to_string()),
                }
            }
        };
        results.push(result);
    }

    let sent = results.iter().filter(|r| r.success).count();
    let success = sent == results.len();
    let status = if success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    Ok((
        status,
        Json(TestEmailResponse {
            success,
            message: format!("{} of {} test emails sent to {}", sent, results.len(), email),
            results,
        }),
    ))
}

/// verify_email_service
///
/// [Public Route] Health check of the email provider, stamped with the check time.
#[utoipa::path(
    get,
    path = "/api/verify-email",
    responses(
        (status = 200, description = "Provider reachable", body = EmailHealthResponse),
        (status = 500, description = "Provider unreachable", body = EmailHealthResponse)
    )
)]
pub async fn verify_email_service(
    State(state): State<AppState>,
) -> (StatusCode, Json<EmailHealthResponse>) {
    let timestamp = chrono::Utc::now().to_rfc3339();

    match state.email.verify().await {
        Ok(()) => (
            StatusCode::OK,
            Json(EmailHealthResponse {
                success: true,
                message: Some("Email service is reachable".to_string()),
                error: None,
                timestamp,
            }),
        ),
        Err(e) => {
            tracing::error!("Email service verification failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(EmailHealthResponse {
                    success: false,
                    message: None,
                    error: Some(e.to_string()),
                    timestamp,
                }),
            )
        }
    }
}
