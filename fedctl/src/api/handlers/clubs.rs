//! HTTP handlers for clubs.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::api::models::clubs::{ClubCreate, ClubFilterQuery, ClubResponse, ClubUpdate, EstadoAfiliacion, ListClubsQuery};
use crate::auth::permissions::{operation, resource, RequiresPermission};
use crate::db::handlers::{clubs::ClubFilter, Clubs, Repository};
use crate::db::models::clubs::{ClubCreateDBRequest, ClubUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::ClubId;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/clubs",
    tag = "clubs",
    summary = "List clubs",
    params(ListClubsQuery),
    responses(
        (status = 200, description = "List of clubs", body = Vec<ClubResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_clubs(
    State(state): State<AppState>,
    Query(query): Query<ListClubsQuery>,
    _: RequiresPermission<resource::Clubs, operation::ReadAll>,
) -> Result<Json<Vec<ClubResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Clubs::new(&mut conn);

    let (skip, limit) = query.pagination.params();
    let clubs = repo.list(&ClubFilter::page(skip, limit)).await?;

    Ok(Json(clubs.into_iter().map(ClubResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/clubs/filtro/buscar",
    tag = "clubs",
    summary = "Filter clubs",
    params(ClubFilterQuery),
    responses(
        (status = 200, description = "Matching clubs", body = Vec<ClubResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn filter_clubs(
    State(state): State<AppState>,
    Query(query): Query<ClubFilterQuery>,
    _: RequiresPermission<resource::Clubs, operation::ReadAll>,
) -> Result<Json<Vec<ClubResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Clubs::new(&mut conn);

    let (skip, limit) = query.pagination.params();
    let filter = ClubFilter {
        nombre: query.nombre,
        email: query.email,
        estado_afiliacion: query.estado_afiliacion,
        skip,
        limit,
    };

    let clubs = repo.list(&filter).await?;
    Ok(Json(clubs.into_iter().map(ClubResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/clubs/{id}",
    tag = "clubs",
    summary = "Get club",
    params(("id" = i32, Path, description = "Club ID")),
    responses(
        (status = 200, description = "Club details", body = ClubResponse),
        (status = 404, description = "Club not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_club(
    State(state): State<AppState>,
    Path(id): Path<ClubId>,
    _: RequiresPermission<resource::Clubs, operation::ReadAll>,
) -> Result<Json<ClubResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Clubs::new(&mut conn);

    match repo.get_by_id(id).await? {
        Some(club) => Ok(Json(ClubResponse::from(club))),
        None => Err(Error::NotFound {
            resource: "Club".to_string(),
            id: id.to_string(),
        }),
    }
}

#[utoipa::path(
    post,
    path = "/clubs",
    tag = "clubs",
    summary = "Create club",
    request_body = ClubCreate,
    responses(
        (status = 201, description = "Club created", body = ClubResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Name, email or CUIT already registered"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_club(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::Clubs, operation::CreateAll>,
    Json(create): Json<ClubCreate>,
) -> Result<(StatusCode, Json<ClubResponse>)> {
    if create.nombre.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "nombre is required".to_string(),
        });
    }
    if create.cuit.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "cuit is required".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Clubs::new(&mut conn);

    let request = ClubCreateDBRequest {
        nombre: create.nombre,
        direccion: create.direccion,
        telefono: create.telefono,
        email: create.email,
        cuit: create.cuit,
        fecha_afiliacion: create.fecha_afiliacion,
        estado_afiliacion: create.estado_afiliacion.unwrap_or(EstadoAfiliacion::Activo),
    };

    let club = repo.create(&request).await?;
    Ok((StatusCode::CREATED, Json(ClubResponse::from(club))))
}

#[utoipa::path(
    put,
    path = "/clubs/{id}",
    tag = "clubs",
    summary = "Update club",
    request_body = ClubUpdate,
    params(("id" = i32, Path, description = "Club ID")),
    responses(
        (status = 200, description = "Club updated", body = ClubResponse),
        (status = 404, description = "Club not found"),
        (status = 409, description = "Name, email or CUIT already registered"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_club(
    State(state): State<AppState>,
    Path(id): Path<ClubId>,
    _user: RequiresPermission<resource::Clubs, operation::UpdateAll>,
    Json(update): Json<ClubUpdate>,
) -> Result<Json<ClubResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Clubs::new(&mut conn);

    let request = ClubUpdateDBRequest {
        nombre: update.nombre,
        direccion: update.direccion,
        telefono: update.telefono,
        email: update.email,
        cuit: update.cuit,
        fecha_afiliacion: update.fecha_afiliacion,
        estado_afiliacion: update.estado_afiliacion,
    };

    let club = repo.update(id, &request).await?;
    Ok(Json(ClubResponse::from(club)))
}

#[utoipa::path(
    delete,
    path = "/clubs/{id}",
    tag = "clubs",
    summary = "Delete club",
    description = "Rejected with 400 while personas, equipos or cobros still reference the club.",
    params(("id" = i32, Path, description = "Club ID")),
    responses(
        (status = 204, description = "Club deleted"),
        (status = 400, description = "Other records still reference this club"),
        (status = 404, description = "Club not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_club(
    State(state): State<AppState>,
    Path(id): Path<ClubId>,
    _user: RequiresPermission<resource::Clubs, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Clubs::new(&mut conn);

    if repo.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Club".to_string(),
            id: id.to_string(),
        })
    }
}
