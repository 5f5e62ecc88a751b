//! HTTP handlers for pagos (payments).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::api::models::pagos::{ListPagosQuery, PagoCreate, PagoResponse};
use crate::auth::permissions::{operation, resource, RequiresPermission};
use crate::db::handlers::{pagos::PagoFilter, Cobros, Pagos, Repository};
use crate::db::models::pagos::PagoCreateDBRequest;
use crate::errors::{Error, Result};
use crate::types::PagoId;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/pagos",
    tag = "pagos",
    summary = "List pagos",
    params(ListPagosQuery),
    responses(
        (status = 200, description = "List of pagos", body = Vec<PagoResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_pagos(
    State(state): State<AppState>,
    Query(query): Query<ListPagosQuery>,
    _: RequiresPermission<resource::Pagos, operation::ReadAll>,
) -> Result<Json<Vec<PagoResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Pagos::new(&mut conn);

    let (skip, limit) = query.pagination.params();
    let filter = PagoFilter {
        cobro_id: query.cobro_id,
        estado: query.estado,
        skip,
        limit,
    };

    let pagos = repo.list(&filter).await?;
    Ok(Json(pagos.into_iter().map(PagoResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/pagos/{id}",
    tag = "pagos",
    summary = "Get pago",
    params(("id" = i32, Path, description = "Pago ID")),
    responses(
        (status = 200, description = "Pago details", body = PagoResponse),
        (status = 404, description = "Pago not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_pago(
    State(state): State<AppState>,
    Path(id): Path<PagoId>,
    _: RequiresPermission<resource::Pagos, operation::ReadAll>,
) -> Result<Json<PagoResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Pagos::new(&mut conn);

    match repo.get_by_id(id).await? {
        Some(pago) => Ok(Json(PagoResponse::from(pago))),
        None => Err(Error::NotFound {
            resource: "Pago".to_string(),
            id: id.to_string(),
        }),
    }
}

#[utoipa::path(
    post,
    path = "/pagos",
    tag = "pagos",
    summary = "Register pago",
    description = "Registers a payment against a cobro. A payment in estado Pagado settles the \
                   cobro in the same transaction.",
    request_body = PagoCreate,
    responses(
        (status = 201, description = "Pago registered", body = PagoResponse),
        (status = 400, description = "Cobro is voided or does not exist"),
        (status = 409, description = "payment_id already registered"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_pago(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::Pagos, operation::CreateAll>,
    Json(create): Json<PagoCreate>,
) -> Result<(StatusCode, Json<PagoResponse>)> {
    if create.payment_id.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "payment_id is required".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let monto = match create.monto {
        Some(monto) => monto,
        None => {
            let mut cobros = Cobros::new(&mut conn);
            let cobro = cobros.get_by_id(create.cobro_id).await?.ok_or_else(|| Error::NotFound {
                resource: "Cobro".to_string(),
                id: create.cobro_id.to_string(),
            })?;
            cobro.monto
        }
    };

    let request = PagoCreateDBRequest {
        cobro_id: create.cobro_id,
        payment_id: create.payment_id,
        monto,
        estado: create.estado,
        metodo_pago: create.metodo_pago,
        preference_id: None,
        datos_extra: None,
        comprobante: create.comprobante,
    };

    let mut repo = Pagos::new(&mut conn);
    let pago = repo.create(&request).await?;
    Ok((StatusCode::CREATED, Json(PagoResponse::from(pago))))
}
