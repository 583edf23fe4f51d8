//! JSON and query extractors whose rejections answer with the API's error envelopes
//! instead of Axum's plain-text bodies.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::{ActionError, AppError};

/// ApiQuery
///
/// `Query` for read endpoints; a malformed query string becomes a 400 `{"error"}`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// ApiJson
///
/// `Json` for endpoints answering with `{"error"}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// ActionJson
///
/// `Json` for write endpoints answering with `{"success": false, "error"}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ActionError))]
pub struct ActionJson<T>(pub T);
