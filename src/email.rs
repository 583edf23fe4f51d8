use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

use crate::error::EmailError;

/// EmailTemplate
///
/// Named templates registered with the email provider. The provider renders subject and
/// body; the portal only supplies the variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTemplate {
    Welcome,
    ApplicationApproved,
}

impl EmailTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            EmailTemplate::Welcome => "welcome",
            EmailTemplate::ApplicationApproved => "learner-application-approved",
        }
    }
}

/// EmailMessage
///
/// One templated email: recipient plus the variables the template expects.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub template: EmailTemplate,
    pub to: String,
    pub variables: Map<String, Value>,
}

impl EmailMessage {
    pub fn new(template: EmailTemplate, to: impl Into<String>) -> Self {
        Self {
            template,
            to: to.into(),
            variables: Map::new(),
        }
    }

    pub fn var(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.variables.insert(key.to_string(), value.into());
        self
    }
}

/// EmailReceipt
///
/// Provider acknowledgement of an accepted message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmailReceipt {
    pub id: String,
}

/// EmailService
///
/// Contract for the transactional email provider.
#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<EmailReceipt, EmailError>;

    /// Checks that the provider is reachable and accepts our credentials.
    async fn verify(&self) -> Result<(), EmailError>;
}

/// EmailState
///
/// The concrete type used to share the email service across the application state.
pub type EmailState = Arc<dyn EmailService>;

#[derive(Serialize)]
struct SendEmailPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    template: &'a str,
    variables: &'a Map<String, Value>,
}

/// HttpEmailClient
///
/// Talks to the provider's JSON API:
/// - `POST {base}/emails` with `{from, to, template, variables}`, answered by `{id}`.
/// - `GET {base}/account` as the health check.
#[derive(Clone)]
pub struct HttpEmailClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    from: String,
}

impl HttpEmailClient {
    pub fn new(base_url: &str, api_key: &str, from: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            from: from.to_string(),
        }
    }

    async fn rejection(response: reqwest::Response) -> EmailError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|e| format!("unreadable response body: {}", e));
        EmailError::Rejected { status, message }
    }
}

#[async_trait]
impl EmailService for HttpEmailClient {
    async fn send(&self, message: EmailMessage) -> Result<EmailReceipt, EmailError> {
        let payload = SendEmailPayload {
            from: &self.from,
            to: [message.to.as_str()],
            template: message.template.name(),
            variables: &message.variables,
        };

        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let receipt = response
            .json::<EmailReceipt>()
            .await
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        tracing::info!(
            template = message.template.name(),
            email_id = %receipt.id,
            "Email accepted by provider"
        );

        Ok(receipt)
    }

    async fn verify(&self) -> Result<(), EmailError> {
        let response = self
            .client
            .get(format!("{}/account", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(())
    }
}

/// MockEmailService
///
/// Records every message instead of sending it. `should_fail` makes every call fail with
/// `MOCK_EMAIL_FAILURE`.
#[derive(Default)]
pub struct MockEmailService {
    pub should_fail: bool,
    sent: Mutex<Vec<EmailMessage>>,
}

pub const MOCK_EMAIL_FAILURE: &str = "Mock Email Error: Simulation requested";

impl MockEmailService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            sent: Mutex::new(vec![]),
        }
    }

    /// Every message handed to `send`, failed attempts included.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send(&self, message: EmailMessage) -> Result<EmailReceipt, EmailError> {
        let id = {
            let mut sent = self
                .sent
                .lock()
                .map_err(|e| EmailError::Transport(e.to_string()))?;
            sent.push(message);
            format!("mock-{}", sent.len())
        };

        if self.should_fail {
            return Err(EmailError::Transport(MOCK_EMAIL_FAILURE.to_string()));
        }
        Ok(EmailReceipt { id })
    }

    async fn verify(&self) -> Result<(), EmailError> {
        if self.should_fail {
            return Err(EmailError::Transport(MOCK_EMAIL_FAILURE.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_records_attempts_even_when_failing() {
        let mock = MockEmailService::new_failing();
        let message = EmailMessage::new(EmailTemplate::Welcome, "ada@example.com").var("name", "Ada");

        let result = mock.send(message.clone()).await;

        assert!(result.is_err());
        assert_eq!(mock.sent(), vec![message]);
    }

    #[test]
    fn template_names_match_provider_registry() {
        assert_eq!(EmailTemplate::Welcome.name(), "welcome");
        assert_eq!(
            EmailTemplate::ApplicationApproved.name(),
            "learner-application-approved"
        );
    }
}
