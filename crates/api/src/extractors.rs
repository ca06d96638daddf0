//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use eventz_common::AppError;
use eventz_db::entities::organizer;

/// Authenticated organizer extractor.
#[derive(Debug, Clone)]
pub struct AuthOrganizer(pub organizer::Model);

impl<S> FromRequestParts<S> for AuthOrganizer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by auth middleware
        parts
            .extensions
            .get::<organizer::Model>()
            .cloned()
            .map(AuthOrganizer)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
