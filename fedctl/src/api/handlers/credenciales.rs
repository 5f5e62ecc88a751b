//! HTTP handlers for credenciales (read-only surface).
//!
//! Credential lifecycle is driven through persona operations (registration,
//! edit, renewal, expiry sweep); these endpoints only expose the results.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::api::models::credenciales::{CredencialResponse, ListCredencialesQuery};
use crate::auth::permissions::{operation, resource, RequiresPermission};
use crate::db::handlers::{credenciales::CredencialFilter, Credenciales, Repository};
use crate::errors::{Error, Result};
use crate::types::CredencialId;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/credenciales",
    tag = "credenciales",
    summary = "List credenciales",
    params(ListCredencialesQuery),
    responses(
        (status = 200, description = "List of credenciales", body = Vec<CredencialResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_credenciales(
    State(state): State<AppState>,
    Query(query): Query<ListCredencialesQuery>,
    _: RequiresPermission<resource::Credenciales, operation::ReadAll>,
) -> Result<Json<Vec<CredencialResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Credenciales::new(&mut conn);

    let (skip, limit) = query.pagination.params();
    let filter = CredencialFilter {
        persona_id: query.persona_id,
        estado: query.estado,
        skip,
        limit,
    };

    let credenciales = repo.list(&filter).await?;
    Ok(Json(credenciales.into_iter().map(CredencialResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/credenciales/{id}",
    tag = "credenciales",
    summary = "Get credencial",
    params(("id" = i32, Path, description = "Credencial ID")),
    responses(
        (status = 200, description = "Credencial details", body = CredencialResponse),
        (status = 404, description = "Credencial not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_credencial(
    State(state): State<AppState>,
    Path(id): Path<CredencialId>,
    _: RequiresPermission<resource::Credenciales, operation::ReadAll>,
) -> Result<Json<CredencialResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Credenciales::new(&mut conn);

    match repo.get_by_id(id).await? {
        Some(credencial) => Ok(Json(CredencialResponse::from(credencial))),
        None => Err(Error::NotFound {
            resource: "Credencial".to_string(),
            id: id.to_string(),
        }),
    }
}
