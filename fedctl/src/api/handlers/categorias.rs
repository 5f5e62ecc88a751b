//! HTTP handlers for categorias.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::api::models::categorias::{CategoriaCreate, CategoriaResponse, CategoriaUpdate, ListCategoriasQuery};
use crate::auth::permissions::{operation, resource, RequiresPermission};
use crate::db::handlers::{categorias::CategoriaFilter, Categorias, Repository};
use crate::db::models::categorias::{CategoriaCreateDBRequest, CategoriaUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::CategoriaId;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/categorias",
    tag = "categorias",
    summary = "List categorias",
    params(ListCategoriasQuery),
    responses(
        (status = 200, description = "List of categorias", body = Vec<CategoriaResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_categorias(
    State(state): State<AppState>,
    Query(query): Query<ListCategoriasQuery>,
    _: RequiresPermission<resource::Categorias, operation::ReadAll>,
) -> Result<Json<Vec<CategoriaResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Categorias::new(&mut conn);

    let (skip, limit) = query.pagination.params();
    let filter = CategoriaFilter {
        tipo: query.tipo,
        skip,
        limit,
    };

    let categorias = repo.list(&filter).await?;
    Ok(Json(categorias.into_iter().map(CategoriaResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/categorias/{id}",
    tag = "categorias",
    summary = "Get categoria",
    params(("id" = i32, Path, description = "Categoria ID")),
    responses(
        (status = 200, description = "Categoria details", body = CategoriaResponse),
        (status = 404, description = "Categoria not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_categoria(
    State(state): State<AppState>,
    Path(id): Path<CategoriaId>,
    _: RequiresPermission<resource::Categorias, operation::ReadAll>,
) -> Result<Json<CategoriaResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Categorias::new(&mut conn);

    match repo.get_by_id(id).await? {
        Some(categoria) => Ok(Json(CategoriaResponse::from(categoria))),
        None => Err(Error::NotFound {
            resource: "Categoria".to_string(),
            id: id.to_string(),
        }),
    }
}

#[utoipa::path(
    post,
    path = "/categorias",
    tag = "categorias",
    summary = "Create categoria",
    request_body = CategoriaCreate,
    responses(
        (status = 201, description = "Categoria created", body = CategoriaResponse),
        (status = 409, description = "Nombre/tipo pair already exists"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_categoria(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::Categorias, operation::CreateAll>,
    Json(create): Json<CategoriaCreate>,
) -> Result<(StatusCode, Json<CategoriaResponse>)> {
    if create.nombre.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "nombre is required".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Categorias::new(&mut conn);

    let request = CategoriaCreateDBRequest {
        nombre: create.nombre,
        tipo: create.tipo,
    };

    let categoria = repo.create(&request).await?;
    Ok((StatusCode::CREATED, Json(CategoriaResponse::from(categoria))))
}

#[utoipa::path(
    put,
    path = "/categorias/{id}",
    tag = "categorias",
    summary = "Update categoria",
    request_body = CategoriaUpdate,
    params(("id" = i32, Path, description = "Categoria ID")),
    responses(
        (status = 200, description = "Categoria updated", body = CategoriaResponse),
        (status = 404, description = "Categoria not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_categoria(
    State(state): State<AppState>,
    Path(id): Path<CategoriaId>,
    _user: RequiresPermission<resource::Categorias, operation::UpdateAll>,
    Json(update): Json<CategoriaUpdate>,
) -> Result<Json<CategoriaResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Categorias::new(&mut conn);

    let request = CategoriaUpdateDBRequest {
        nombre: update.nombre,
        tipo: update.tipo,
    };

    let categoria = repo.update(id, &request).await?;
    Ok(Json(CategoriaResponse::from(categoria)))
}

#[utoipa::path(
    delete,
    path = "/categorias/{id}",
    tag = "categorias",
    summary = "Delete categoria",
    params(("id" = i32, Path, description = "Categoria ID")),
    responses(
        (status = 204, description = "Categoria deleted"),
        (status = 400, description = "Equipos still reference this categoria"),
        (status = 404, description = "Categoria not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_categoria(
    State(state): State<AppState>,
    Path(id): Path<CategoriaId>,
    _user: RequiresPermission<resource::Categorias, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Categorias::new(&mut conn);

    if repo.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Categoria".to_string(),
            id: id.to_string(),
        })
    }
}
