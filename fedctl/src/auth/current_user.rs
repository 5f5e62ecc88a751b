//! Extractor for the authenticated user.
//!
//! Credentials are accepted from two places, in priority order:
//!
//! 1. `Authorization: Bearer <jwt>` header
//! 2. The session cookie set by the login endpoint
//!
//! Both carry the same JWT, so either path yields the same [`CurrentUser`].

use crate::{
    api::models::usuarios::CurrentUser,
    auth::session,
    errors::{Error, Result},
    AppState,
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, instrument, trace};

/// Extract a JWT from the Authorization header if present.
fn bearer_token(parts: &Parts) -> Option<Result<&str>> {
    let auth_header = parts.headers.get(axum::http::header::AUTHORIZATION)?;

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid authorization header: {e}"),
            }))
        }
    };

    auth_str.strip_prefix("Bearer ").map(Ok)
}

/// Extract a JWT from the session cookie if present.
fn cookie_token<'a>(parts: &'a Parts, cookie_name: &str) -> Option<&'a str> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=') {
            if name == cookie_name {
                return Some(value);
            }
        }
    }
    None
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        // Bearer token first (most specific), then session cookie.
        if let Some(token) = bearer_token(parts) {
            let token = token?;
            match session::verify_session_token(token, &state.config) {
                Ok(user) => {
                    debug!("Found bearer-token authenticated user: {}", user.id);
                    return Ok(user);
                }
                Err(e) => {
                    trace!("Bearer token authentication failed: {:?}", e);
                    return Err(Error::Unauthenticated { message: None });
                }
            }
        }

        let cookie_name = &state.config.auth.session.cookie_name;
        if let Some(token) = cookie_token(parts, cookie_name) {
            match session::verify_session_token(token, &state.config) {
                Ok(user) => {
                    debug!("Found session-cookie authenticated user: {}", user.id);
                    return Ok(user);
                }
                Err(e) => {
                    // Expired cookies are routine; don't propagate the detail
                    trace!("Session cookie authentication failed: {:?}", e);
                }
            }
        }

        trace!("No authentication credentials found in request");
        Err(Error::Unauthenticated { message: None })
    }
}
