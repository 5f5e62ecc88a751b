//! HTTP handlers for personas (federation members).

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use crate::api::models::personas::{
    ConteoPorClave, FotoResponse, ListPersonasQuery, PersonaCreate, PersonaFilterQuery, PersonaResponse, PersonaUpdate,
    ResumenResponse, SweepResponse,
};
use crate::auth::permissions::{operation, resource, RequiresPermission};
use crate::db::handlers::{personas::PersonaFilter, Clubs, Credenciales, Personas, Repository};
use crate::db::models::personas::{PersonaCreateDBRequest, PersonaUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::licenses;
use crate::types::{ClubId, PersonaId};
use crate::AppState;

/// Verify a referenced club exists before taking the FK violation path, so
/// the client gets a message naming the club.
async fn check_club_exists(conn: &mut sqlx::PgConnection, club_id: ClubId) -> Result<()> {
    let mut clubs = Clubs::new(conn);
    if clubs.get_by_id(club_id).await?.is_none() {
        return Err(Error::BadRequest {
            message: format!("Club {club_id} does not exist"),
        });
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/personas",
    tag = "personas",
    summary = "List personas",
    params(ListPersonasQuery),
    responses(
        (status = 200, description = "List of personas", body = Vec<PersonaResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_personas(
    State(state): State<AppState>,
    Query(query): Query<ListPersonasQuery>,
    _: RequiresPermission<resource::Personas, operation::ReadAll>,
) -> Result<Json<Vec<PersonaResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let (skip, limit) = query.pagination.params();
    let personas = {
        let mut repo = Personas::new(&mut conn);
        repo.list(&PersonaFilter::page(skip, limit)).await?
    };

    let include_credenciales = query
        .include
        .as_deref()
        .unwrap_or("")
        .split(',')
        .any(|part| part.trim() == "credenciales");

    let mut responses: Vec<PersonaResponse> = Vec::with_capacity(personas.len());
    if include_credenciales {
        let ids: Vec<PersonaId> = personas.iter().map(|p| p.id).collect();
        let mut credenciales_repo = Credenciales::new(&mut conn);
        let mut by_persona = credenciales_repo.list_for_personas(&ids).await?;

        for persona in personas {
            let credenciales = by_persona
                .remove(&persona.id)
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect();
            responses.push(PersonaResponse::from(persona).with_credenciales(credenciales));
        }
    } else {
        responses = personas.into_iter().map(PersonaResponse::from).collect();
    }

    Ok(Json(responses))
}

#[utoipa::path(
    get,
    path = "/personas/filtro/buscar",
    tag = "personas",
    summary = "Filter personas",
    params(PersonaFilterQuery),
    responses(
        (status = 200, description = "Matching personas", body = Vec<PersonaResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn filter_personas(
    State(state): State<AppState>,
    Query(query): Query<PersonaFilterQuery>,
    _: RequiresPermission<resource::Personas, operation::ReadAll>,
) -> Result<Json<Vec<PersonaResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Personas::new(&mut conn);

    let (skip, limit) = query.pagination.params();
    let filter = PersonaFilter {
        nombre_apellido: query.nombre_apellido,
        dni: query.dni,
        tipo: query.tipo,
        categoria: query.categoria,
        club_id: query.club_id,
        estado_licencia: query.estado_licencia,
        fecha_nacimiento_desde: query.fecha_nacimiento_desde,
        fecha_nacimiento_hasta: query.fecha_nacimiento_hasta,
        fecha_licencia_desde: query.fecha_licencia_desde,
        fecha_licencia_hasta: query.fecha_licencia_hasta,
        fecha_licencia_baja_desde: query.fecha_licencia_baja_desde,
        fecha_licencia_baja_hasta: query.fecha_licencia_baja_hasta,
        skip,
        limit,
    };

    let personas = repo.list(&filter).await?;
    Ok(Json(personas.into_iter().map(PersonaResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/personas/resumen",
    tag = "personas",
    summary = "Membership summary counts",
    responses(
        (status = 200, description = "Aggregated counts", body = ResumenResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn resumen(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Personas, operation::ReadAll>,
) -> Result<Json<ResumenResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Personas::new(&mut conn);

    let (total, activas, vencidas) = repo.conteo_estados().await?;
    let por_tipo = repo
        .conteo_por_tipo()
        .await?
        .into_iter()
        .map(|(clave, cantidad)| ConteoPorClave { clave, cantidad })
        .collect();
    let por_club = repo
        .conteo_por_club()
        .await?
        .into_iter()
        .map(|(clave, cantidad)| ConteoPorClave { clave, cantidad })
        .collect();

    Ok(Json(ResumenResponse {
        total,
        activas,
        vencidas,
        por_tipo,
        por_club,
    }))
}

#[utoipa::path(
    get,
    path = "/personas/{id}",
    tag = "personas",
    summary = "Get persona",
    params(("id" = i32, Path, description = "Persona ID")),
    responses(
        (status = 200, description = "Persona details", body = PersonaResponse),
        (status = 404, description = "Persona not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_persona(
    State(state): State<AppState>,
    Path(id): Path<PersonaId>,
    _: RequiresPermission<resource::Personas, operation::ReadAll>,
) -> Result<Json<PersonaResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let persona = {
        let mut repo = Personas::new(&mut conn);
        repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
            resource: "Persona".to_string(),
            id: id.to_string(),
        })?
    };

    let mut credenciales_repo = Credenciales::new(&mut conn);
    let credenciales = credenciales_repo
        .list_for_persona(id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(PersonaResponse::from(persona).with_credenciales(credenciales)))
}

#[utoipa::path(
    post,
    path = "/personas",
    tag = "personas",
    summary = "Register persona",
    request_body = PersonaCreate,
    responses(
        (status = 201, description = "Persona created with its credencial", body = PersonaResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "DNI or license number already registered"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_persona(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::Personas, operation::CreateAll>,
    Json(create): Json<PersonaCreate>,
) -> Result<(StatusCode, Json<PersonaResponse>)> {
    if create.nombre_apellido.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "nombre_apellido is required".to_string(),
        });
    }
    if create.dni.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "dni is required".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if let Some(club_id) = create.club_id {
        check_club_exists(&mut conn, club_id).await?;
    }

    // Registration starts the license window; the expiry date and status are
    // always derived server-side.
    let today = Utc::now().date_naive();
    let fecha_licencia = create.fecha_licencia.unwrap_or(today);
    let fecha_licencia_baja = licenses::license_expiry(fecha_licencia);
    let estado_licencia = licenses::estado_for_expiry(fecha_licencia_baja, today);

    let request = PersonaCreateDBRequest {
        nombre_apellido: create.nombre_apellido,
        dni: create.dni,
        fecha_nacimiento: create.fecha_nacimiento,
        club_id: create.club_id,
        licencia_numero: create.licencia_numero,
        fecha_licencia: Some(fecha_licencia),
        fecha_licencia_baja: Some(fecha_licencia_baja),
        estado_licencia: Some(estado_licencia),
        tipo: create.tipo,
        categoria: create.categoria,
        categoria_nivel: create.categoria_nivel,
    };

    let persona = {
        let mut repo = Personas::new(&mut conn);
        repo.create(&request).await?
    };

    let mut credenciales_repo = Credenciales::new(&mut conn);
    let credenciales = credenciales_repo
        .list_for_persona(persona.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok((
        StatusCode::CREATED,
        Json(PersonaResponse::from(persona).with_credenciales(credenciales)),
    ))
}

#[utoipa::path(
    put,
    path = "/personas/{id}",
    tag = "personas",
    summary = "Update persona",
    request_body = PersonaUpdate,
    params(("id" = i32, Path, description = "Persona ID")),
    responses(
        (status = 200, description = "Persona updated, credencial synchronized", body = PersonaResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Persona not found"),
        (status = 409, description = "DNI or license number already registered"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_persona(
    State(state): State<AppState>,
    Path(id): Path<PersonaId>,
    _user: RequiresPermission<resource::Personas, operation::UpdateAll>,
    Json(update): Json<PersonaUpdate>,
) -> Result<Json<PersonaResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if let Some(club_id) = update.club_id {
        check_club_exists(&mut conn, club_id).await?;
    }

    // A new start date re-derives the window; the repository synchronizes the
    // credencial in the same transaction.
    let (fecha_licencia_baja, estado_licencia) = match update.fecha_licencia {
        Some(fecha_licencia) => {
            let today = Utc::now().date_naive();
            let baja = licenses::license_expiry(fecha_licencia);
            (Some(baja), Some(licenses::estado_for_expiry(baja, today)))
        }
        None => (None, None),
    };

    let request = PersonaUpdateDBRequest {
        nombre_apellido: update.nombre_apellido,
        dni: update.dni,
        fecha_nacimiento: update.fecha_nacimiento,
        club_id: update.club_id,
        licencia_numero: update.licencia_numero,
        fecha_licencia: update.fecha_licencia,
        fecha_licencia_baja,
        estado_licencia,
        tipo: update.tipo,
        categoria: update.categoria,
        categoria_nivel: update.categoria_nivel,
    };

    let persona = {
        let mut repo = Personas::new(&mut conn);
        repo.update(id, &request).await?
    };

    let mut credenciales_repo = Credenciales::new(&mut conn);
    let credenciales = credenciales_repo
        .list_for_persona(id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(PersonaResponse::from(persona).with_credenciales(credenciales)))
}

#[utoipa::path(
    put,
    path = "/personas/{id}/renovar",
    tag = "personas",
    summary = "Renew license",
    description = "Restarts the license window from today and synchronizes the credencial atomically.",
    params(("id" = i32, Path, description = "Persona ID")),
    responses(
        (status = 200, description = "License renewed", body = PersonaResponse),
        (status = 404, description = "Persona not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn renovar_licencia(
    State(state): State<AppState>,
    Path(id): Path<PersonaId>,
    _user: RequiresPermission<resource::Personas, operation::UpdateAll>,
) -> Result<Json<PersonaResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let persona = {
        let mut repo = Personas::new(&mut conn);
        repo.renovar(id, Utc::now().date_naive()).await.map_err(|e| match e {
            crate::db::errors::DbError::NotFound => Error::NotFound {
                resource: "Persona".to_string(),
                id: id.to_string(),
            },
            other => Error::Database(other),
        })?
    };

    let mut credenciales_repo = Credenciales::new(&mut conn);
    let credenciales = credenciales_repo
        .list_for_persona(id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(PersonaResponse::from(persona).with_credenciales(credenciales)))
}

#[utoipa::path(
    post,
    path = "/personas/actualizar-estado-licencias",
    tag = "personas",
    summary = "Run license expiry sweep",
    description = "Set-based recomputation of license status from expiry dates; idempotent.",
    responses(
        (status = 200, description = "Sweep result", body = SweepResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn actualizar_estado_licencias(
    State(state): State<AppState>,
    _user: RequiresPermission<resource::Personas, operation::UpdateAll>,
) -> Result<Json<SweepResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Personas::new(&mut conn);

    let outcome = repo.sweep(Utc::now().date_naive()).await?;

    Ok(Json(SweepResponse {
        personas_actualizadas: outcome.personas,
        credenciales_actualizadas: outcome.credenciales,
    }))
}

#[utoipa::path(
    delete,
    path = "/personas/{id}",
    tag = "personas",
    summary = "Delete persona",
    params(("id" = i32, Path, description = "Persona ID")),
    responses(
        (status = 204, description = "Persona deleted"),
        (status = 404, description = "Persona not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_persona(
    State(state): State<AppState>,
    Path(id): Path<PersonaId>,
    _user: RequiresPermission<resource::Personas, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Personas::new(&mut conn);

    let persona = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Persona".to_string(),
        id: id.to_string(),
    })?;

    // Best-effort removal of the hosted photo; a dangling remote image must
    // not block the delete.
    if let (Some(delete_url), Some(images)) = (&persona.foto_delete_url, state.images.as_deref()) {
        if let Err(e) = images.delete(delete_url).await {
            tracing::warn!("Failed to delete hosted photo for persona {id}: {e}");
        }
    }

    if repo.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Persona".to_string(),
            id: id.to_string(),
        })
    }
}

#[utoipa::path(
    get,
    path = "/personas/{id}/foto",
    tag = "personas",
    summary = "Get profile photo",
    params(("id" = i32, Path, description = "Persona ID")),
    responses(
        (status = 200, description = "Hosted photo reference", body = FotoResponse),
        (status = 404, description = "Persona or photo not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_foto(
    State(state): State<AppState>,
    Path(id): Path<PersonaId>,
    _: RequiresPermission<resource::Personas, operation::ReadAll>,
) -> Result<Json<FotoResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Personas::new(&mut conn);

    let persona = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Persona".to_string(),
        id: id.to_string(),
    })?;

    let foto_url = persona.foto_url.ok_or_else(|| Error::NotFound {
        resource: "Foto de persona".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(FotoResponse {
        persona_id: persona.id,
        nombre_apellido: persona.nombre_apellido,
        foto_url,
    }))
}

#[utoipa::path(
    put,
    path = "/personas/{id}/foto",
    tag = "personas",
    summary = "Upload profile photo",
    description = "Multipart upload; the image is pushed to the external host and only its URLs are stored.",
    params(("id" = i32, Path, description = "Persona ID")),
    responses(
        (status = 200, description = "Photo stored", body = FotoResponse),
        (status = 400, description = "No image in request"),
        (status = 404, description = "Persona not found"),
        (status = 501, description = "Image hosting not configured"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn upload_foto(
    State(state): State<AppState>,
    Path(id): Path<PersonaId>,
    _user: RequiresPermission<resource::Personas, operation::UpdateAll>,
    mut multipart: Multipart,
) -> Result<Response> {
    let Some(images) = state.images.as_deref() else {
        tracing::warn!("Photo upload requested but no image host is configured");
        return Ok((
            StatusCode::NOT_IMPLEMENTED,
            Json(serde_json::json!({
                "error": "No image host configured",
                "message": "Image hosting is not configured on this server"
            })),
        )
            .into_response());
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Personas::new(&mut conn);

    let persona = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Persona".to_string(),
        id: id.to_string(),
    })?;

    // First file field wins; the field name is not significant.
    let mut image_bytes: Option<Vec<u8>> = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("invalid multipart body: {e}"),
    })? {
        if field.file_name().is_some() || image_bytes.is_none() {
            let bytes = field.bytes().await.map_err(|e| Error::BadRequest {
                message: format!("failed to read uploaded image: {e}"),
            })?;
            if !bytes.is_empty() {
                image_bytes = Some(bytes.to_vec());
                break;
            }
        }
    }

    let image_bytes = image_bytes.ok_or_else(|| Error::BadRequest {
        message: "no image found in request".to_string(),
    })?;

    // Replace the previous hosted photo; failure to delete the old one is
    // logged, not fatal.
    if let Some(old_delete_url) = &persona.foto_delete_url {
        if let Err(e) = images.delete(old_delete_url).await {
            tracing::warn!("Failed to delete previous photo for persona {id}: {e}");
        }
    }

    let name = format!("persona-{id}");
    let hosted = images.upload(&image_bytes, &name).await.map_err(|e| {
        tracing::error!("Image upload failed for persona {id}: {e}");
        Error::Internal {
            operation: "upload photo".to_string(),
        }
    })?;

    let persona = repo
        .set_foto(id, Some(&hosted.url), hosted.delete_url.as_deref())
        .await?;

    Ok(Json(FotoResponse {
        persona_id: persona.id,
        nombre_apellido: persona.nombre_apellido,
        foto_url: hosted.url,
    })
    .into_response())
}

#[utoipa::path(
    delete,
    path = "/personas/{id}/foto",
    tag = "personas",
    summary = "Delete profile photo",
    params(("id" = i32, Path, description = "Persona ID")),
    responses(
        (status = 204, description = "Photo removed"),
        (status = 404, description = "Persona not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_foto(
    State(state): State<AppState>,
    Path(id): Path<PersonaId>,
    _user: RequiresPermission<resource::Personas, operation::UpdateAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Personas::new(&mut conn);

    let persona = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Persona".to_string(),
        id: id.to_string(),
    })?;

    if let (Some(delete_url), Some(images)) = (&persona.foto_delete_url, state.images.as_deref()) {
        if let Err(e) = images.delete(delete_url).await {
            tracing::warn!("Failed to delete hosted photo for persona {id}: {e}");
        }
    }

    repo.set_foto(id, None, None).await?;
    Ok(StatusCode::NO_CONTENT)
}
