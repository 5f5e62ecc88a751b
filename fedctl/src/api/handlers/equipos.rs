//! HTTP handlers for equipos.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::api::models::equipos::{EquipoCreate, EquipoResponse, EquipoUpdate, ListEquiposQuery};
use crate::auth::permissions::{operation, resource, RequiresPermission};
use crate::db::handlers::{equipos::EquipoFilter, Categorias, Clubs, Equipos, Repository};
use crate::db::models::equipos::{EquipoCreateDBRequest, EquipoUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{CategoriaId, ClubId, EquipoId};
use crate::AppState;

async fn check_references(
    conn: &mut sqlx::PgConnection,
    club_id: Option<ClubId>,
    categoria_id: Option<CategoriaId>,
) -> Result<()> {
    if let Some(club_id) = club_id {
        let mut clubs = Clubs::new(&mut *conn);
        if clubs.get_by_id(club_id).await?.is_none() {
            return Err(Error::BadRequest {
                message: format!("Club {club_id} does not exist"),
            });
        }
    }
    if let Some(categoria_id) = categoria_id {
        let mut categorias = Categorias::new(&mut *conn);
        if categorias.get_by_id(categoria_id).await?.is_none() {
            return Err(Error::BadRequest {
                message: format!("Categoria {categoria_id} does not exist"),
            });
        }
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/equipos",
    tag = "equipos",
    summary = "List equipos",
    params(ListEquiposQuery),
    responses(
        (status = 200, description = "List of equipos", body = Vec<EquipoResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_equipos(
    State(state): State<AppState>,
    Query(query): Query<ListEquiposQuery>,
    _: RequiresPermission<resource::Equipos, operation::ReadAll>,
) -> Result<Json<Vec<EquipoResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Equipos::new(&mut conn);

    let (skip, limit) = query.pagination.params();
    let filter = EquipoFilter {
        club_id: query.club_id,
        nombre: query.nombre,
        skip,
        limit,
    };

    let equipos = repo.list(&filter).await?;
    Ok(Json(equipos.into_iter().map(EquipoResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/equipos/{id}",
    tag = "equipos",
    summary = "Get equipo",
    params(("id" = i32, Path, description = "Equipo ID")),
    responses(
        (status = 200, description = "Equipo details", body = EquipoResponse),
        (status = 404, description = "Equipo not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_equipo(
    State(state): State<AppState>,
    Path(id): Path<EquipoId>,
    _: RequiresPermission<resource::Equipos, operation::ReadAll>,
) -> Result<Json<EquipoResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Equipos::new(&mut conn);

    match repo.get_by_id(id).await? {
        Some(equipo) => Ok(Json(EquipoResponse::from(equipo))),
        None => Err(Error::NotFound {
            resource: "Equipo".to_string(),
            id: id.to_string(),
        }),
    }
}

#[utoipa::path(
    post,
    path = "/equipos",
    tag = "equipos",
    summary = "Create equipo",
    request_body = EquipoCreate,
    responses(
        (status = 201, description = "Equipo created", body = EquipoResponse),
        (status = 400, description = "Referenced club or categoria does not exist"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_equipo(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::Equipos, operation::CreateAll>,
    Json(create): Json<EquipoCreate>,
) -> Result<(StatusCode, Json<EquipoResponse>)> {
    if create.nombre.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "nombre is required".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    check_references(&mut conn, Some(create.club_id), create.categoria_id).await?;

    let mut repo = Equipos::new(&mut conn);
    let request = EquipoCreateDBRequest {
        nombre: create.nombre,
        club_id: create.club_id,
        categoria_id: create.categoria_id,
    };

    let equipo = repo.create(&request).await?;
    Ok((StatusCode::CREATED, Json(EquipoResponse::from(equipo))))
}

#[utoipa::path(
    put,
    path = "/equipos/{id}",
    tag = "equipos",
    summary = "Update equipo",
    request_body = EquipoUpdate,
    params(("id" = i32, Path, description = "Equipo ID")),
    responses(
        (status = 200, description = "Equipo updated", body = EquipoResponse),
        (status = 400, description = "Referenced club or categoria does not exist"),
        (status = 404, description = "Equipo not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_equipo(
    State(state): State<AppState>,
    Path(id): Path<EquipoId>,
    _user: RequiresPermission<resource::Equipos, operation::UpdateAll>,
    Json(update): Json<EquipoUpdate>,
) -> Result<Json<EquipoResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    check_references(&mut conn, update.club_id, update.categoria_id).await?;

    let mut repo = Equipos::new(&mut conn);
    let request = EquipoUpdateDBRequest {
        nombre: update.nombre,
        club_id: update.club_id,
        categoria_id: update.categoria_id,
    };

    let equipo = repo.update(id, &request).await?;
    Ok(Json(EquipoResponse::from(equipo)))
}

#[utoipa::path(
    delete,
    path = "/equipos/{id}",
    tag = "equipos",
    summary = "Delete equipo",
    params(("id" = i32, Path, description = "Equipo ID")),
    responses(
        (status = 204, description = "Equipo deleted"),
        (status = 404, description = "Equipo not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_equipo(
    State(state): State<AppState>,
    Path(id): Path<EquipoId>,
    _user: RequiresPermission<resource::Equipos, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Equipos::new(&mut conn);

    if repo.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Equipo".to_string(),
            id: id.to_string(),
        })
    }
}
