//! Request extractors that reject into [`ApiError`].
//!
//! These wrap axum's `Json`, `Path`, and `Query` so that a malformed body,
//! a non-numeric `{id}`, or an unreadable query string gets the same JSON
//! error body as every other failure instead of axum's plain-text
//! rejection.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query string parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
