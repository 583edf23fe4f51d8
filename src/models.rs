use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Roles & Status Vocabularies ---

/// Role
///
/// The role attribute stored in the identity provider's user metadata (mirrored in
/// `users.role`). Drives which dashboard a visitor may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    Learner,
    Instructor,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Learner => "learner",
            Role::Instructor => "instructor",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Parses the raw metadata value. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "learner" => Some(Role::Learner),
            "instructor" => Some(Role::Instructor),
            "super_admin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle values of `courses.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
}

impl CourseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Draft => "draft",
            CourseStatus::Pending => "pending",
            CourseStatus::Approved => "approved",
            CourseStatus::Rejected => "rejected",
        }
    }
}

/// Lifecycle values of `learners_applications.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationStatus {
    Pending,
    PendingPayment,
    Approved,
    Rejected,
    Enrolled,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::PendingPayment => "pending_payment",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Enrolled => "enrolled",
        }
    }
}

// --- Database Rows ---

/// User
///
/// A row of the `users` table, resolved during authentication.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    // Raw role value; parsed into `Role` by the auth layer.
    pub role: Option<String>,
}

/// Course
///
/// A row of the `courses` table. `price` is read as `float8`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub instructor_id: Option<Uuid>,
    pub price: f64,
    pub status: String,
    pub thumbnail_url: Option<String>,
    #[ts(type = "string | null")]
    pub start_date: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// AiGeneratedContent
///
/// A row of `ai_generated_content`: output of one AI tool run for a course.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct AiGeneratedContent {
    pub id: Uuid,
    pub course_id: Uuid,
    pub tool_name: String,
    pub tool_id: String,
    #[schema(value_type = Object)]
    pub content: serde_json::Value,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// ApplicationSummary
///
/// A learner application joined with its course, as listed on the dashboards.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ApplicationSummary {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub status: String,
    pub course_id: Uuid,
    pub course_title: String,
    pub price: f64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// ApprovedApplication
///
/// Projection returned by the approval update: everything the approval email needs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default, PartialEq)]
pub struct ApprovedApplication {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub course_title: String,
    pub price: f64,
}

/// NotificationFailure
///
/// Row written to `email_notification_failures` when a notification could not be sent
/// after its database update was committed.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NotificationFailure {
    pub application_id: Uuid,
    pub template: String,
    pub recipient: String,
    pub error: String,
}

/// CourseQuery
///
/// Filter for course listings. `upcoming_only` keeps courses whose start date is in the
/// future and orders them by start date; otherwise newest first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CourseQuery {
    pub status: CourseStatus,
    pub upcoming_only: bool,
    pub limit: i64,
}

// --- Object Storage ---

/// BlobObject
///
/// One entry of a blob listing.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BlobObject {
    pub url: String,
    pub pathname: String,
    pub size: i64,
    #[ts(type = "string | null")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// BlobListing
///
/// Page of a prefix listing. `cursor` is the opaque continuation token for the next page.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BlobListing {
    pub blobs: Vec<BlobObject>,
    pub has_more: bool,
    pub cursor: Option<String>,
}

/// BlobMetadata
///
/// Result of a HEAD request on a single blob.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BlobMetadata {
    pub url: String,
    pub pathname: String,
    pub size: i64,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub cache_control: Option<String>,
    #[ts(type = "string | null")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

// --- Request Payloads ---

/// InitialApprovalRequest
///
/// Body of `POST /api/super-admin/learner/initial-approval`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InitialApprovalRequest {
    #[schema(example = "8a6e0804-2bd0-4672-b79d-d97027f9071a")]
    pub application_id: Option<String>,
}

/// TestEmailRequest
///
/// Body of `POST /api/test-email`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TestEmailRequest {
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    #[schema(example = "Ada")]
    pub name: Option<String>,
}

// --- Responses ---

/// AiContentResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AiContentResponse {
    pub success: bool,
    pub data: Option<AiGeneratedContent>,
}

/// HeroSectionResponse
///
/// Courses highlighted on the landing page.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct HeroSectionResponse {
    pub upcoming_courses: Vec<Course>,
    pub courses: Vec<Course>,
}

/// ActionResponse
///
/// Success envelope of write endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ActionResponse {
    pub success: bool,
}

/// ApprovalFailureResponse
///
/// 500 body of the initial approval when the status update went through but the
/// approval email did not. `failureRecorded` says whether the failure row was written.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ApprovalFailureResponse {
    pub success: bool,
    pub error: String,
    pub status_updated: bool,
    pub notification_sent: bool,
    pub failure_recorded: bool,
}

/// TestEmailResult
///
/// Outcome of one send performed by the test-email endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TestEmailResult {
    pub template: String,
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

/// TestEmailResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TestEmailResponse {
    pub success: bool,
    pub message: String,
    pub results: Vec<TestEmailResult>,
}

/// EmailHealthResponse
///
/// Email provider health check. Exactly one of `message` / `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct EmailHealthResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

// --- Dashboard View Data ---

/// Data behind the learner dashboard.
#[derive(Debug, Clone, Default)]
pub struct LearnerDashboard {
    pub viewer_email: String,
    pub applications: Vec<ApplicationSummary>,
}

/// Data behind the instructor dashboard.
#[derive(Debug, Clone, Default)]
pub struct InstructorDashboard {
    pub viewer_email: String,
    pub courses: Vec<Course>,
}

/// Data behind the super-admin dashboard.
#[derive(Debug, Clone, Default)]
pub struct SuperAdminDashboard {
    pub pending_applications: Vec<ApplicationSummary>,
    pub pending_courses: Vec<Course>,
}
