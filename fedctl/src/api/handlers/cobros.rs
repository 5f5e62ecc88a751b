//! HTTP handlers for cobros (charges) and their checkout preferences.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;

use crate::api::models::cobros::{
    CobroCreate, CobroResponse, CobroUpdate, EstadoCobro, ListCobrosQuery, PreferenciaResponse,
};
use crate::auth::permissions::{operation, resource, RequiresPermission};
use crate::db::handlers::{cobros::CobroFilter, Cobros, Clubs, Equipos, Repository};
use crate::db::models::cobros::{CobroCreateDBRequest, CobroUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::payment_providers::PreferenceRequest;
use crate::types::CobroId;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/cobros",
    tag = "cobros",
    summary = "List cobros",
    params(ListCobrosQuery),
    responses(
        (status = 200, description = "List of cobros", body = Vec<CobroResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_cobros(
    State(state): State<AppState>,
    Query(query): Query<ListCobrosQuery>,
    _: RequiresPermission<resource::Cobros, operation::ReadAll>,
) -> Result<Json<Vec<CobroResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Cobros::new(&mut conn);

    let (skip, limit) = query.pagination.params();
    let filter = CobroFilter {
        club_id: query.club_id,
        estado: query.estado,
        skip,
        limit,
    };

    let cobros = repo.list(&filter).await?;
    Ok(Json(cobros.into_iter().map(CobroResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/cobros/{id}",
    tag = "cobros",
    summary = "Get cobro",
    params(("id" = i32, Path, description = "Cobro ID")),
    responses(
        (status = 200, description = "Cobro details", body = CobroResponse),
        (status = 404, description = "Cobro not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_cobro(
    State(state): State<AppState>,
    Path(id): Path<CobroId>,
    _: RequiresPermission<resource::Cobros, operation::ReadAll>,
) -> Result<Json<CobroResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Cobros::new(&mut conn);

    match repo.get_by_id(id).await? {
        Some(cobro) => Ok(Json(CobroResponse::from(cobro))),
        None => Err(Error::NotFound {
            resource: "Cobro".to_string(),
            id: id.to_string(),
        }),
    }
}

#[utoipa::path(
    post,
    path = "/cobros",
    tag = "cobros",
    summary = "Create cobro",
    request_body = CobroCreate,
    responses(
        (status = 201, description = "Cobro created", body = CobroResponse),
        (status = 400, description = "Invalid request"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_cobro(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::Cobros, operation::CreateAll>,
    Json(create): Json<CobroCreate>,
) -> Result<(StatusCode, Json<CobroResponse>)> {
    if create.concepto.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "concepto is required".to_string(),
        });
    }
    if create.monto <= rust_decimal::Decimal::ZERO {
        return Err(Error::BadRequest {
            message: "monto must be greater than zero".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    {
        let mut clubs = Clubs::new(&mut conn);
        if clubs.get_by_id(create.club_id).await?.is_none() {
            return Err(Error::BadRequest {
                message: format!("Club {} does not exist", create.club_id),
            });
        }
    }

    if let Some(equipo_id) = create.equipo_id {
        let mut equipos = Equipos::new(&mut conn);
        let equipo = equipos.get_by_id(equipo_id).await?.ok_or_else(|| Error::BadRequest {
            message: format!("Equipo {equipo_id} does not exist"),
        })?;
        if equipo.club_id != create.club_id {
            return Err(Error::BadRequest {
                message: format!("Equipo {equipo_id} does not belong to club {}", create.club_id),
            });
        }
    }

    let request = CobroCreateDBRequest {
        concepto: create.concepto,
        monto: create.monto,
        fecha: create.fecha.unwrap_or_else(|| Utc::now().date_naive()),
        fecha_vencimiento: create.fecha_vencimiento,
        club_id: create.club_id,
        equipo_id: create.equipo_id,
        observaciones: create.observaciones,
    };

    let mut repo = Cobros::new(&mut conn);
    let cobro = repo.create(&request).await?;
    Ok((StatusCode::CREATED, Json(CobroResponse::from(cobro))))
}

#[utoipa::path(
    put,
    path = "/cobros/{id}",
    tag = "cobros",
    summary = "Update cobro",
    request_body = CobroUpdate,
    params(("id" = i32, Path, description = "Cobro ID")),
    responses(
        (status = 200, description = "Cobro updated", body = CobroResponse),
        (status = 404, description = "Cobro not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_cobro(
    State(state): State<AppState>,
    Path(id): Path<CobroId>,
    _user: RequiresPermission<resource::Cobros, operation::UpdateAll>,
    Json(update): Json<CobroUpdate>,
) -> Result<Json<CobroResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Cobros::new(&mut conn);

    let request = CobroUpdateDBRequest {
        concepto: update.concepto,
        monto: update.monto,
        fecha: update.fecha,
        fecha_vencimiento: update.fecha_vencimiento,
        equipo_id: update.equipo_id,
        observaciones: update.observaciones,
    };

    let cobro = repo.update(id, &request).await?;
    Ok(Json(CobroResponse::from(cobro)))
}

#[utoipa::path(
    post,
    path = "/cobros/{id}/anular",
    tag = "cobros",
    summary = "Void cobro",
    params(("id" = i32, Path, description = "Cobro ID")),
    responses(
        (status = 200, description = "Cobro voided", body = CobroResponse),
        (status = 400, description = "Cobro is already paid"),
        (status = 404, description = "Cobro not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn anular_cobro(
    State(state): State<AppState>,
    Path(id): Path<CobroId>,
    _user: RequiresPermission<resource::Cobros, operation::UpdateAll>,
) -> Result<Json<CobroResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Cobros::new(&mut conn);

    let cobro = repo.anular(id).await?;
    Ok(Json(CobroResponse::from(cobro)))
}

#[utoipa::path(
    delete,
    path = "/cobros/{id}",
    tag = "cobros",
    summary = "Delete cobro",
    params(("id" = i32, Path, description = "Cobro ID")),
    responses(
        (status = 204, description = "Cobro deleted"),
        (status = 404, description = "Cobro not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_cobro(
    State(state): State<AppState>,
    Path(id): Path<CobroId>,
    _user: RequiresPermission<resource::Cobros, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Cobros::new(&mut conn);

    if repo.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Cobro".to_string(),
            id: id.to_string(),
        })
    }
}

#[utoipa::path(
    post,
    path = "/cobros/{id}/preferencia",
    tag = "cobros",
    summary = "Create checkout preference",
    description = "Creates a payment-provider checkout preference for the cobro. The external \
                   reference ties webhook deliveries back to this cobro.",
    params(("id" = i32, Path, description = "Cobro ID")),
    responses(
        (status = 201, description = "Preference created", body = PreferenciaResponse),
        (status = 400, description = "Cobro is not payable"),
        (status = 404, description = "Cobro not found"),
        (status = 501, description = "No payment provider configured"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn crear_preferencia(
    State(state): State<AppState>,
    Path(id): Path<CobroId>,
    _user: RequiresPermission<resource::Cobros, operation::UpdateAll>,
) -> Result<Response> {
    let Some(payments) = state.payments.as_deref() else {
        tracing::warn!("Checkout preference requested but no payment provider is configured");
        return Ok((
            StatusCode::NOT_IMPLEMENTED,
            Json(json!({
                "error": "No payment provider configured",
                "message": "Payments are not configured on this server"
            })),
        )
            .into_response());
    };

    let cobro = {
        let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
        let mut repo = Cobros::new(&mut conn);
        repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
            resource: "Cobro".to_string(),
            id: id.to_string(),
        })?
    };

    match cobro.estado {
        EstadoCobro::Pagado => {
            return Err(Error::BadRequest {
                message: "cobro is already paid".to_string(),
            })
        }
        EstadoCobro::Anulado => {
            return Err(Error::BadRequest {
                message: "cobro is voided".to_string(),
            })
        }
        EstadoCobro::Pendiente | EstadoCobro::Vencido => {}
    }

    let external_reference = format!("cobro_{}_{}", cobro.id, Utc::now().timestamp());
    let preference = payments
        .create_preference(&PreferenceRequest {
            titulo: cobro.concepto.clone(),
            monto: cobro.monto,
            external_reference: external_reference.clone(),
        })
        .await
        .map_err(|e| {
            tracing::error!("Failed to create checkout preference for cobro {id}: {e}");
            Error::Internal {
                operation: "create checkout preference".to_string(),
            }
        })?;

    Ok((
        StatusCode::CREATED,
        Json(PreferenciaResponse {
            cobro_id: cobro.id,
            preference_id: preference.preference_id,
            init_point: preference.init_point,
            external_reference,
        }),
    )
        .into_response())
}
