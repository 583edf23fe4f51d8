use std::sync::Arc;
use thiserror::Error;

use crate::{auth::AuthUser, models::Role};

/// Authorization
///
/// Outcome of a role check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Allowed,
    Denied(DenialReason),
}

/// DenialReason
///
/// Why an identity was refused. Logged, never shown to the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DenialReason {
    #[error("no authenticated session")]
    Unauthenticated,
    #[error("identity has no role")]
    MissingRole,
    #[error("role '{actual}' does not grant '{required}'")]
    RoleMismatch { actual: Role, required: Role },
}

/// AuthorizationPolicy
///
/// Capability deciding whether an identity may reach a resource guarded by `required`.
/// Held in the application state so tests can swap the policy.
pub trait AuthorizationPolicy: Send + Sync {
    fn authorize(&self, identity: Option<&AuthUser>, required: Role) -> Authorization;
}

/// RolePolicy
///
/// Grants access when the identity's role equals the required role. No hierarchy: a
/// super-admin does not inherit the learner dashboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy;

impl AuthorizationPolicy for RolePolicy {
    fn authorize(&self, identity: Option<&AuthUser>, required: Role) -> Authorization {
        let Some(user) = identity else {
            return Authorization::Denied(DenialReason::Unauthenticated);
        };
        match user.role {
            None => Authorization::Denied(DenialReason::MissingRole),
            Some(actual) if actual == required => Authorization::Allowed,
            Some(actual) => Authorization::Denied(DenialReason::RoleMismatch { actual, required }),
        }
    }
}

/// PolicyState
///
/// The concrete type used to share the authorization policy across the application state.
pub type PolicyState = Arc<dyn AuthorizationPolicy>;
