use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    models::Role,
    repository::RepositoryState,
};

/// Audience the identity provider stamps on session tokens.
pub const SESSION_AUDIENCE: &str = "authenticated";

/// UserMetadata
///
/// The free-form metadata object the identity provider keeps per user. Only the role is
/// read here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub role: Option<String>,
}

/// Claims
///
/// Payload of the identity provider's session JWT.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the `users.id` of the session owner.
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
    pub aud: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// AuthUser
///
/// The resolved identity of an authenticated request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    /// `None` when the metadata carries no role, or one this portal does not know.
    pub role: Option<Role>,
}

/// AuthUser Extractor Implementation
///
/// 1. Dependency Resolution: Repository and AppConfig from the application state.
/// 2. Local Bypass: in `Env::Local`, an `x-user-id` header naming an existing user.
/// 3. Token Validation: Bearer token, HS256, expiry and audience checked.
/// 4. DB Lookup: the subject must still exist in `users`.
///
/// The role comes from the token's `user_metadata.role`, falling back to `users.role`.
///
/// Rejection: `StatusCode::UNAUTHORIZED` (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            let bypass_id = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|id_str| Uuid::parse_str(id_str).ok());

            if let Some(user_id) = bypass_id {
                if let Some(user) = repo.get_user(user_id).await {
                    return Ok(AuthUser {
                        id: user.id,
                        email: user.email,
                        role: user.role.as_deref().and_then(Role::parse),
                    });
                }
            }
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.set_audience(&[SESSION_AUDIENCE]);

        let claims = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!("Rejected session token: {:?}", e.kind());
                StatusCode::UNAUTHORIZED
            })?
            .claims;

        let user = repo
            .get_user(claims.sub)
            .await
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let role = claims
            .user_metadata
            .role
            .or(user.role)
            .as_deref()
            .and_then(Role::parse);

        Ok(AuthUser {
            id: user.id,
            email: claims.email.unwrap_or(user.email),
            role,
        })
    }
}

/// MaybeAuthUser
///
/// Never rejects: resolves to `None` where `AuthUser` would answer 401. Used by page
/// layouts, which redirect instead of failing.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(
            AuthUser::from_request_parts(parts, state).await.ok(),
        ))
    }
}
