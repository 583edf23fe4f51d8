use crate::{
    error::RepoError,
    models::{
        AiGeneratedContent, ApplicationStatus, ApplicationSummary, ApprovedApplication, Course,
        CourseQuery, NotificationFailure, User,
    },
};
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// The contract for every database access the portal performs. Handlers and pages only
/// see this trait, so tests substitute in-memory implementations.
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` shareable across Axum's
/// asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Identity ---
    // Resolves the `users` row behind an authenticated subject. Errors are logged and
    // reported as "no such user" so authentication fails closed.
    async fn get_user(&self, id: Uuid) -> Option<User>;

    // --- AI Tools ---
    // Single-row lookup; `Ok(None)` when nothing was generated yet.
    async fn get_ai_content(
        &self,
        course_id: &str,
        tool_name: &str,
        tool_id: &str,
    ) -> Result<Option<AiGeneratedContent>, RepoError>;

    // --- Courses ---
    async fn list_courses(&self, query: CourseQuery) -> Result<Vec<Course>, RepoError>;
    async fn get_instructor_courses(&self, instructor_id: Uuid) -> Result<Vec<Course>, RepoError>;

    // --- Learner Applications ---
    async fn get_learner_applications(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ApplicationSummary>, RepoError>;
    async fn get_applications_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<ApplicationSummary>, RepoError>;
    // Sets the status of one application and returns the projection needed to notify the
    // learner. `Ok(None)` when no application has this id.
    async fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<ApprovedApplication>, RepoError>;

    // --- Notifications ---
    async fn record_notification_failure(
        &self,
        failure: &NotificationFailure,
    ) -> Result<(), RepoError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// `Repository` backed by the hosted Postgres database. Connects with the service-role
/// credentials, so row-level security is not applied; every query filters explicitly.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COURSE_COLUMNS: &str = r#"
    id, title, description, instructor_id, price::float8 AS price, status,
    thumbnail_url, start_date, created_at
"#;

const APPLICATION_SUMMARY_SELECT: &str = r#"
    SELECT a.id, a.full_name, a.email, a.status, a.course_id,
           c.title AS course_title, c.price::float8 AS price, a.created_at
    FROM learners_applications a
    JOIN courses c ON c.id = a.course_id
"#;

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> Option<User> {
        sqlx::query_as::<_, User>("SELECT id, email, full_name, role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_user error: {:?}", e);
                None
            })
    }

    /// get_ai_content
    ///
    /// `course_id` is compared as text so a malformed id surfaces as "no row" rather
    /// than a cast failure.
    async fn get_ai_content(
        &self,
        course_id: &str,
        tool_name: &str,
        tool_id: &str,
    ) -> Result<Option<AiGeneratedContent>, RepoError> {
        let row = sqlx::query_as::<_, AiGeneratedContent>(
            r#"
            SELECT id, course_id, tool_name, tool_id, content, created_at
            FROM ai_generated_content
            WHERE course_id::text = $1 AND tool_name = $2 AND tool_id = $3
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(course_id)
        .bind(tool_name)
        .bind(tool_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("get_ai_content error: {:?}", e);
            RepoError::from(e)
        })?;

        Ok(row)
    }

    /// list_courses
    ///
    /// Built with QueryBuilder so the optional upcoming filter stays parameterized.
    async fn list_courses(&self, query: CourseQuery) -> Result<Vec<Course>, RepoError> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new("SELECT ");
        builder.push(COURSE_COLUMNS);
        builder.push(" FROM courses WHERE status = ");
        builder.push_bind(query.status.as_str());

        if query.upcoming_only {
            builder.push(" AND start_date > now() ORDER BY start_date ASC");
        } else {
            builder.push(" ORDER BY created_at DESC");
        }

        builder.push(" LIMIT ");
        builder.push_bind(query.limit);

        builder
            .build_query_as::<Course>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("list_courses error: {:?}", e);
                RepoError::from(e)
            })
    }

    async fn get_instructor_courses(&self, instructor_id: Uuid) -> Result<Vec<Course>, RepoError> {
        let sql = format!(
            "SELECT {} FROM courses WHERE instructor_id = $1 ORDER BY created_at DESC",
            COURSE_COLUMNS
        );
        sqlx::query_as::<_, Course>(&sql)
            .bind(instructor_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("get_instructor_courses error: {:?}", e);
                RepoError::from(e)
            })
    }

    async fn get_learner_applications(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ApplicationSummary>, RepoError> {
        let sql = format!(
            "{} WHERE a.user_id = $1 ORDER BY a.created_at DESC",
            APPLICATION_SUMMARY_SELECT
        );
        sqlx::query_as::<_, ApplicationSummary>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("get_learner_applications error: {:?}", e);
                RepoError::from(e)
            })
    }

    async fn get_applications_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<ApplicationSummary>, RepoError> {
        let sql = format!(
            "{} WHERE a.status = $1 ORDER BY a.created_at ASC",
            APPLICATION_SUMMARY_SELECT
        );
        sqlx::query_as::<_, ApplicationSummary>(&sql)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("get_applications_by_status error: {:?}", e);
                RepoError::from(e)
            })
    }

    /// update_application_status
    ///
    /// One statement: the update joins `courses` so the returned row already carries the
    /// course title and price.
    async fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<ApprovedApplication>, RepoError> {
        sqlx::query_as::<_, ApprovedApplication>(
            r#"
            UPDATE learners_applications a
            SET status = $2, updated_at = now()
            FROM courses c
            WHERE a.id = $1 AND c.id = a.course_id
            RETURNING a.id, a.full_name, a.email, c.title AS course_title,
                      c.price::float8 AS price
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("update_application_status error: {:?}", e);
            RepoError::from(e)
        })
    }

    async fn record_notification_failure(
        &self,
        failure: &NotificationFailure,
    ) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO email_notification_failures (application_id, template, recipient, error)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(failure.application_id)
        .bind(&failure.template)
        .bind(&failure.recipient)
        .bind(&failure.error)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("record_notification_failure error: {:?}", e);
            RepoError::from(e)
        })?;

        Ok(())
    }
}
