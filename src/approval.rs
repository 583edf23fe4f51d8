use uuid::Uuid;

use crate::{
    email::{EmailMessage, EmailService, EmailTemplate},
    error::{EmailError, RepoError},
    models::{ApplicationStatus, ApprovedApplication, NotificationFailure},
    repository::Repository,
};

/// ApprovalOutcome
///
/// Result of the initial-approval saga once the status update has been attempted.
#[derive(Debug, Clone, PartialEq)]
pub enum ApprovalOutcome {
    /// Status updated and the learner notified.
    Completed(ApprovedApplication),
    /// Status updated, but the notification failed. The failure has been recorded (when
    /// `recorded` is true) for manual follow-up; the update is not rolled back.
    NotificationFailed {
        application: ApprovedApplication,
        error: EmailError,
        recorded: bool,
    },
    /// No application with this id.
    NotFound,
}

/// approve_learner_application
///
/// Initial approval of a learner application, as a two-step saga:
/// 1. `learners_applications.status` becomes `pending_payment`.
/// 2. Exactly one `learner-application-approved` email goes to the applicant, built from
///    the updated row.
///
/// A failure in step 1 aborts with the repository error. A failure in step 2 is written
/// to `email_notification_failures` and reported as `NotificationFailed`.
pub async fn approve_learner_application(
    repo: &dyn Repository,
    email: &dyn EmailService,
    site_url: &str,
    application_id: Uuid,
) -> Result<ApprovalOutcome, RepoError> {
    let Some(application) = repo
        .update_application_status(application_id, ApplicationStatus::PendingPayment)
        .await?
    else {
        return Ok(ApprovalOutcome::NotFound);
    };

    tracing::info!(
        application_id = %application.id,
        "Learner application moved to pending_payment"
    );

    let message = approval_email(&application, site_url);
    let template = message.template;
    let recipient = message.to.clone();

    match email.send(message).await {
        Ok(receipt) => {
            tracing::info!(
                application_id = %application.id,
                email_id = %receipt.id,
                "Approval email sent"
            );
            Ok(ApprovalOutcome::Completed(application))
        }
        Err(error) => {
            tracing::warn!(
                application_id = %application.id,
                error = %error,
                "Approval email failed after status update; recording for follow-up"
            );

            let failure = NotificationFailure {
                application_id: application.id,
                template: template.name().to_string(),
                recipient,
                error: error.to_string(),
            };
            let recorded = match repo.record_notification_failure(&failure).await {
                Ok(()) => true,
                Err(record_error) => {
                    tracing::error!(
                        application_id = %application.id,
                        error = %record_error,
                        "Could not record notification failure"
                    );
                    false
                }
            };

            Ok(ApprovalOutcome::NotificationFailed {
                application,
                error,
                recorded,
            })
        }
    }
}

/// Builds the approval email for an updated application row.
pub fn approval_email(application: &ApprovedApplication, site_url: &str) -> EmailMessage {
    EmailMessage::new(EmailTemplate::ApplicationApproved, application.email.clone())
        .var("name", application.full_name.clone())
        .var("courseTitle", application.course_title.clone())
        .var("price", application.price)
        .var(
            "paymentUrl",
            format!(
                "{}/learner/payment/{}",
                site_url.trim_end_matches('/'),
                application.id
            ),
        )
}
