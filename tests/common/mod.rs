#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, body::Body, http::Response};
use chrono::Utc;
use course_portal::{
    AppState, create_router,
    config::AppConfig,
    email::{EmailState, MockEmailService},
    error::RepoError,
    models::{
        AiGeneratedContent, ApplicationStatus, ApplicationSummary, ApprovedApplication, Course,
        CourseQuery, NotificationFailure, User,
    },
    repository::{Repository, RepositoryState},
    storage::{MockStorageService, StorageState},
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use uuid::Uuid;

// --- STUB REPOSITORY ---

/// In-memory repository. Data methods fail with `fail_with` when it is set; `get_user`
/// never fails so the session still resolves.
#[derive(Default)]
pub struct StubRepository {
    pub users: Vec<User>,
    pub courses: Vec<Course>,
    pub ai_content: Option<AiGeneratedContent>,
    pub applications: Vec<ApplicationSummary>,
    pub fail_with: Option<String>,
    // Makes `record_notification_failure` fail on its own.
    pub fail_record: bool,

    // Recorded calls
    pub ai_content_calls: AtomicUsize,
    pub status_updates: Mutex<Vec<(Uuid, ApplicationStatus)>>,
    pub failures: Mutex<Vec<NotificationFailure>>,
}

impl StubRepository {
    fn check(&self) -> Result<(), RepoError> {
        match &self.fail_with {
            Some(message) => Err(RepoError::Database(message.clone())),
            None => Ok(()),
        }
    }

    pub fn ai_calls(&self) -> usize {
        self.ai_content_calls.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> Vec<(Uuid, ApplicationStatus)> {
        self.status_updates.lock().unwrap().clone()
    }

    pub fn recorded_failures(&self) -> Vec<NotificationFailure> {
        self.failures.lock().unwrap().clone()
    }
}

#[async_trait]
impl Repository for StubRepository {
    async fn get_user(&self, id: Uuid) -> Option<User> {
        self.users.iter().find(|u| u.id == id).cloned()
    }

    async fn get_ai_content(
        &self,
        _course_id: &str,
        _tool_name: &str,
        _tool_id: &str,
    ) -> Result<Option<AiGeneratedContent>, RepoError> {
        self.ai_content_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.ai_content.clone())
    }

    async fn list_courses(&self, query: CourseQuery) -> Result<Vec<Course>, RepoError> {
        self.check()?;
        let now = Utc::now();
        let mut courses: Vec<Course> = self
            .courses
            .iter()
            .filter(|c| c.status == query.status.as_str())
            .filter(|c| !query.upcoming_only || c.start_date.is_some_and(|d| d > now))
            .cloned()
            .collect();

        if query.upcoming_only {
            courses.sort_by_key(|c| c.start_date);
        } else {
            courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        courses.truncate(query.limit as usize);
        Ok(courses)
    }

    async fn get_instructor_courses(&self, instructor_id: Uuid) -> Result<Vec<Course>, RepoError> {
        self.check()?;
        Ok(self
            .courses
            .iter()
            .filter(|c| c.instructor_id == Some(instructor_id))
            .cloned()
            .collect())
    }

    async fn get_learner_applications(
        &self,
        _user_id: Uuid,
    ) -> Result<Vec<ApplicationSummary>, RepoError> {
        self.check()?;
        Ok(self.applications.clone())
    }

    async fn get_applications_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<ApplicationSummary>, RepoError> {
        self.check()?;
        Ok(self
            .applications
            .iter()
            .filter(|a| a.status == status.as_str())
            .cloned()
            .collect())
    }

    async fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<ApprovedApplication>, RepoError> {
        self.check()?;
        let Some(application) = self.applications.iter().find(|a| a.id == id) else {
            return Ok(None);
        };
        self.status_updates.lock().unwrap().push((id, status));
        Ok(Some(ApprovedApplication {
            id: application.id,
            full_name: application.full_name.clone(),
            email: application.email.clone(),
            course_title: application.course_title.clone(),
            price: application.price,
        }))
    }

    async fn record_notification_failure(
        &self,
        failure: &NotificationFailure,
    ) -> Result<(), RepoError> {
        if self.fail_record {
            return Err(RepoError::Database(
                "permission denied for table email_notification_failures".to_string(),
            ));
        }
        self.failures.lock().unwrap().push(failure.clone());
        Ok(())
    }
}

// --- FIXTURES ---

pub const LEARNER_ID: Uuid = Uuid::from_u128(0x1001);
pub const INSTRUCTOR_ID: Uuid = Uuid::from_u128(0x1002);
pub const SUPER_ADMIN_ID: Uuid = Uuid::from_u128(0x1003);
pub const ROLELESS_ID: Uuid = Uuid::from_u128(0x1004);

pub fn user(id: Uuid, email: &str, role: Option<&str>) -> User {
    User {
        id,
        email: email.to_string(),
        full_name: None,
        role: role.map(str::to_string),
    }
}

/// One user per role, plus one without a role.
pub fn all_users() -> Vec<User> {
    vec![
        user(LEARNER_ID, "learner@example.com", Some("learner")),
        user(INSTRUCTOR_ID, "instructor@example.com", Some("instructor")),
        user(SUPER_ADMIN_ID, "admin@example.com", Some("super_admin")),
        user(ROLELESS_ID, "nobody@example.com", None),
    ]
}

pub fn application(full_name: &str, email: &str, course_title: &str, price: f64) -> ApplicationSummary {
    ApplicationSummary {
        id: Uuid::new_v4(),
        full_name: full_name.to_string(),
        email: email.to_string(),
        status: "pending".to_string(),
        course_id: Uuid::new_v4(),
        course_title: course_title.to_string(),
        price,
        created_at: Utc::now(),
    }
}

// --- APP CONSTRUCTION ---

/// Builds the state in `Env::Local` (default config) so the `x-user-id` header resolves
/// sessions.
pub fn test_state(
    repo: Arc<StubRepository>,
    storage: MockStorageService,
    email: Arc<MockEmailService>,
) -> AppState {
    AppState::new(
        repo as RepositoryState,
        Arc::new(storage) as StorageState,
        email as EmailState,
        AppConfig::default(),
    )
}

pub fn app(
    repo: Arc<StubRepository>,
    storage: MockStorageService,
    email: Arc<MockEmailService>,
) -> Router {
    create_router(test_state(repo, storage, email))
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
