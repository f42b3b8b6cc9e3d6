/// Acting-user extraction middleware
///
/// Authentication itself happens upstream; by the time a request
/// reaches this server the session layer has resolved the user and
/// forwards their id in the `X-Acting-User` header. This middleware
/// turns that header into an [`ActingUser`] extension so every
/// mutation handler receives an explicit actor.
///
/// There is deliberately no fallback identity: a request without a
/// resolvable actor is rejected rather than attributed to a default
/// user.
use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the authenticated user's id
pub const ACTING_USER_HEADER: &str = "x-acting-user";

/// Identity attributed to the current request's writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser {
    /// User id recorded as `modified_by` on any write
    pub id: Uuid,
}

/// Rejects requests without a valid acting-user header
///
/// Inserts [`ActingUser`] into request extensions on success.
pub async fn require_actor(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(ACTING_USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing acting user identity".to_string()))?;

    let id = header.parse::<Uuid>().map_err(|_| {
        ApiError::BadRequest("Acting user header must be a UUID".to_string())
    })?;

    req.extensions_mut().insert(ActingUser { id });

    Ok(next.run(req).await)
}
