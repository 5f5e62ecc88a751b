//! HTTP handlers for usuarios (staff accounts). Admin only.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::api::models::usuarios::{ListUsuariosQuery, UsuarioCreate, UsuarioResponse, UsuarioUpdate};
use crate::auth::{
    password,
    permissions::{operation, resource, RequiresPermission},
};
use crate::db::handlers::{usuarios::UsuarioFilter, Repository, Usuarios};
use crate::db::models::usuarios::{UsuarioCreateDBRequest, UsuarioUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::UsuarioId;
use crate::AppState;

fn validate_password(state: &AppState, password: &str) -> Result<()> {
    let rules = &state.config.auth.password;
    if password.len() < rules.min_length || password.len() > rules.max_length {
        return Err(Error::BadRequest {
            message: format!(
                "password must be between {} and {} characters",
                rules.min_length, rules.max_length
            ),
        });
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/usuarios",
    tag = "usuarios",
    summary = "List usuarios",
    params(ListUsuariosQuery),
    responses(
        (status = 200, description = "List of usuarios", body = Vec<UsuarioResponse>),
        (status = 403, description = "Requires administrator role"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_usuarios(
    State(state): State<AppState>,
    Query(query): Query<ListUsuariosQuery>,
    _: RequiresPermission<resource::Usuarios, operation::ReadAll>,
) -> Result<Json<Vec<UsuarioResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Usuarios::new(&mut conn);

    let (skip, limit) = query.pagination.params();
    let filter = UsuarioFilter {
        email: query.email,
        skip,
        limit,
    };

    let usuarios = repo.list(&filter).await?;
    Ok(Json(usuarios.into_iter().map(UsuarioResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/usuarios/{id}",
    tag = "usuarios",
    summary = "Get usuario",
    params(("id" = i32, Path, description = "Usuario ID")),
    responses(
        (status = 200, description = "Usuario details", body = UsuarioResponse),
        (status = 404, description = "Usuario not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_usuario(
    State(state): State<AppState>,
    Path(id): Path<UsuarioId>,
    _: RequiresPermission<resource::Usuarios, operation::ReadAll>,
) -> Result<Json<UsuarioResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Usuarios::new(&mut conn);

    match repo.get_by_id(id).await? {
        Some(usuario) => Ok(Json(UsuarioResponse::from(usuario))),
        None => Err(Error::NotFound {
            resource: "Usuario".to_string(),
            id: id.to_string(),
        }),
    }
}

#[utoipa::path(
    post,
    path = "/usuarios",
    tag = "usuarios",
    summary = "Create usuario",
    request_body = UsuarioCreate,
    responses(
        (status = 201, description = "Usuario created", body = UsuarioResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already registered"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_usuario(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::Usuarios, operation::CreateAll>,
    Json(create): Json<UsuarioCreate>,
) -> Result<(StatusCode, Json<UsuarioResponse>)> {
    if create.email.trim().is_empty() || !create.email.contains('@') {
        return Err(Error::BadRequest {
            message: "a valid email is required".to_string(),
        });
    }
    validate_password(&state, &create.password)?;

    let password_hash = password::hash_string(&create.password)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Usuarios::new(&mut conn);

    let request = UsuarioCreateDBRequest {
        nombre: create.nombre,
        apellido: create.apellido,
        email: create.email,
        password_hash: Some(password_hash),
        rol: create.rol,
    };

    let usuario = repo.create(&request).await?;
    Ok((StatusCode::CREATED, Json(UsuarioResponse::from(usuario))))
}

#[utoipa::path(
    put,
    path = "/usuarios/{id}",
    tag = "usuarios",
    summary = "Update usuario",
    request_body = UsuarioUpdate,
    params(("id" = i32, Path, description = "Usuario ID")),
    responses(
        (status = 200, description = "Usuario updated", body = UsuarioResponse),
        (status = 404, description = "Usuario not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_usuario(
    State(state): State<AppState>,
    Path(id): Path<UsuarioId>,
    _user: RequiresPermission<resource::Usuarios, operation::UpdateAll>,
    Json(update): Json<UsuarioUpdate>,
) -> Result<Json<UsuarioResponse>> {
    let password_hash = match &update.password {
        Some(new_password) => {
            validate_password(&state, new_password)?;
            Some(password::hash_string(new_password)?)
        }
        None => None,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Usuarios::new(&mut conn);

    let request = UsuarioUpdateDBRequest {
        nombre: update.nombre,
        apellido: update.apellido,
        password_hash,
        rol: update.rol,
    };

    let usuario = repo.update(id, &request).await?;
    Ok(Json(UsuarioResponse::from(usuario)))
}

#[utoipa::path(
    delete,
    path = "/usuarios/{id}",
    tag = "usuarios",
    summary = "Delete usuario",
    params(("id" = i32, Path, description = "Usuario ID")),
    responses(
        (status = 204, description = "Usuario deleted"),
        (status = 400, description = "Cannot delete own account"),
        (status = 404, description = "Usuario not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_usuario(
    State(state): State<AppState>,
    Path(id): Path<UsuarioId>,
    current_user: RequiresPermission<resource::Usuarios, operation::DeleteAll>,
) -> Result<StatusCode> {
    if current_user.id == id {
        return Err(Error::BadRequest {
            message: "cannot delete your own account".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Usuarios::new(&mut conn);

    if repo.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Usuario".to_string(),
            id: id.to_string(),
        })
    }
}
