//! HTTP handlers for authentication.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    api::models::usuarios::{CurrentUser, LoginRequest, LoginResponse},
    auth::{password, session},
    db::handlers::Usuarios,
    errors::{Error, Result},
    AppState,
};

fn session_cookie(state: &AppState, token: &str, max_age: Option<u64>) -> Result<HeaderValue> {
    let name = &state.config.auth.session.cookie_name;
    let mut cookie = format!("{name}={token}; Path=/; HttpOnly; SameSite=Lax");
    if let Some(max_age) = max_age {
        cookie.push_str(&format!("; Max-Age={max_age}"));
    }
    if state.config.auth.session.cookie_secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| Error::Internal {
        operation: format!("build session cookie: {e}"),
    })
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    summary = "Log in",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session established", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(login): Json<LoginRequest>) -> Result<Response> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut usuarios = Usuarios::new(&mut conn);

    let usuario = usuarios.get_by_email(&login.email).await?.ok_or(Error::Unauthenticated {
        message: Some("Invalid email or password".to_string()),
    })?;

    // Accounts provisioned without a password cannot log in natively
    let password_hash = usuario.password_hash.as_deref().ok_or(Error::Unauthenticated {
        message: Some("Invalid email or password".to_string()),
    })?;

    if !password::verify_string(&login.password, password_hash)? {
        return Err(Error::Unauthenticated {
            message: Some("Invalid email or password".to_string()),
        });
    }

    usuarios.touch_last_login(usuario.id).await?;

    let current_user = CurrentUser::from(usuario);
    let token = session::create_session_token(&current_user, &state.config)?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, session_cookie(&state, &token, None)?);

    let body = Json(LoginResponse {
        token,
        usuario: current_user,
    });

    Ok((headers, body).into_response())
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    summary = "Log out",
    responses(
        (status = 200, description = "Session cleared"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> Result<Response> {
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, session_cookie(&state, "", Some(0))?);

    Ok((headers, Json(serde_json::json!({ "message": "logged out" }))).into_response())
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    summary = "Current user",
    responses(
        (status = 200, description = "The authenticated user", body = CurrentUser),
        (status = 401, description = "Not authenticated"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn me(user: CurrentUser) -> Json<CurrentUser> {
    Json(user)
}
