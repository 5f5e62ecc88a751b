//! HTTP handlers for galerias and their imagenes.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::models::galerias::{GaleriaCreate, GaleriaResponse, GaleriaUpdate, ImagenResponse, ListGaleriasQuery};
use crate::auth::permissions::{operation, resource, RequiresPermission};
use crate::db::handlers::{galerias::GaleriaFilter, Galerias, Repository};
use crate::db::models::galerias::{GaleriaCreateDBRequest, GaleriaUpdateDBRequest, ImagenCreateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{GaleriaId, ImagenId};
use crate::AppState;

#[utoipa::path(
    get,
    path = "/galerias",
    tag = "galerias",
    summary = "List galerias",
    params(ListGaleriasQuery),
    responses(
        (status = 200, description = "List of galerias", body = Vec<GaleriaResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_galerias(
    State(state): State<AppState>,
    Query(query): Query<ListGaleriasQuery>,
    _: RequiresPermission<resource::Galerias, operation::ReadAll>,
) -> Result<Json<Vec<GaleriaResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Galerias::new(&mut conn);

    let (skip, limit) = query.pagination.params();
    let filter = GaleriaFilter {
        publicada: query.publicada,
        skip,
        limit,
    };

    let galerias = repo.list(&filter).await?;
    Ok(Json(galerias.into_iter().map(GaleriaResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/galerias/{id}",
    tag = "galerias",
    summary = "Get galeria with its imagenes",
    params(("id" = i32, Path, description = "Galeria ID")),
    responses(
        (status = 200, description = "Galeria details", body = GaleriaResponse),
        (status = 404, description = "Galeria not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_galeria(
    State(state): State<AppState>,
    Path(id): Path<GaleriaId>,
    _: RequiresPermission<resource::Galerias, operation::ReadAll>,
) -> Result<Json<GaleriaResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Galerias::new(&mut conn);

    let galeria = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Galeria".to_string(),
        id: id.to_string(),
    })?;

    let imagenes = repo
        .list_imagenes(id)
        .await?
        .into_iter()
        .map(ImagenResponse::from)
        .collect();

    Ok(Json(GaleriaResponse::from(galeria).with_imagenes(imagenes)))
}

#[utoipa::path(
    post,
    path = "/galerias",
    tag = "galerias",
    summary = "Create galeria",
    request_body = GaleriaCreate,
    responses(
        (status = 201, description = "Galeria created", body = GaleriaResponse),
        (status = 400, description = "Invalid request"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_galeria(
    State(state): State<AppState>,
    current_user: RequiresPermission<resource::Galerias, operation::CreateAll>,
    Json(create): Json<GaleriaCreate>,
) -> Result<(StatusCode, Json<GaleriaResponse>)> {
    if create.nombre.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "nombre is required".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Galerias::new(&mut conn);

    let request = GaleriaCreateDBRequest {
        nombre: create.nombre,
        descripcion: create.descripcion,
        publicada: create.publicada.unwrap_or(true),
        autor_id: Some(current_user.id),
    };

    let galeria = repo.create(&request).await?;
    Ok((StatusCode::CREATED, Json(GaleriaResponse::from(galeria))))
}

#[utoipa::path(
    put,
    path = "/galerias/{id}",
    tag = "galerias",
    summary = "Update galeria",
    request_body = GaleriaUpdate,
    params(("id" = i32, Path, description = "Galeria ID")),
    responses(
        (status = 200, description = "Galeria updated", body = GaleriaResponse),
        (status = 404, description = "Galeria not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_galeria(
    State(state): State<AppState>,
    Path(id): Path<GaleriaId>,
    _user: RequiresPermission<resource::Galerias, operation::UpdateAll>,
    Json(update): Json<GaleriaUpdate>,
) -> Result<Json<GaleriaResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Galerias::new(&mut conn);

    let request = GaleriaUpdateDBRequest {
        nombre: update.nombre,
        descripcion: update.descripcion,
        portada_url: update.portada_url,
        publicada: update.publicada,
    };

    let galeria = repo.update(id, &request).await?;
    Ok(Json(GaleriaResponse::from(galeria)))
}

#[utoipa::path(
    delete,
    path = "/galerias/{id}",
    tag = "galerias",
    summary = "Delete galeria",
    description = "Deletes the gallery and its images; hosted copies are removed best-effort.",
    params(("id" = i32, Path, description = "Galeria ID")),
    responses(
        (status = 204, description = "Galeria deleted"),
        (status = 404, description = "Galeria not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_galeria(
    State(state): State<AppState>,
    Path(id): Path<GaleriaId>,
    _user: RequiresPermission<resource::Galerias, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Galerias::new(&mut conn);

    // Hosted copies first; failures are logged, the local delete proceeds.
    if let Some(images) = state.images.as_deref() {
        for imagen in repo.list_imagenes(id).await? {
            if let Some(delete_url) = &imagen.delete_url {
                if let Err(e) = images.delete(delete_url).await {
                    tracing::warn!("Failed to delete hosted image {}: {e}", imagen.id);
                }
            }
        }
    }

    if repo.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Galeria".to_string(),
            id: id.to_string(),
        })
    }
}

#[utoipa::path(
    post,
    path = "/galerias/{id}/imagenes",
    tag = "galerias",
    summary = "Upload image to galeria",
    description = "Multipart upload; the image goes to the external host and its URLs are attached \
                   to the gallery. A `titulo` text field may accompany the file.",
    params(("id" = i32, Path, description = "Galeria ID")),
    responses(
        (status = 201, description = "Image attached", body = ImagenResponse),
        (status = 400, description = "No image in request"),
        (status = 404, description = "Galeria not found"),
        (status = 501, description = "Image hosting not configured"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn upload_imagen(
    State(state): State<AppState>,
    Path(id): Path<GaleriaId>,
    _user: RequiresPermission<resource::Galerias, operation::UpdateAll>,
    mut multipart: Multipart,
) -> Result<Response> {
    let Some(images) = state.images.as_deref() else {
        tracing::warn!("Image upload requested but no image host is configured");
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
    let mut repo = Galerias::new(&mut conn);

    repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Galeria".to_string(),
        id: id.to_string(),
    })?;

    let mut image_bytes: Option<Vec<u8>> = None;
    let mut titulo: Option<String> = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("invalid multipart body: {e}"),
    })? {
        if field.name() == Some("titulo") {
            titulo = field.text().await.ok().filter(|t| !t.trim().is_empty());
        } else if image_bytes.is_none() {
            let bytes = field.bytes().await.map_err(|e| Error::BadRequest {
                message: format!("failed to read uploaded image: {e}"),
            })?;
            if !bytes.is_empty() {
                image_bytes = Some(bytes.to_vec());
            }
        }
    }

    let image_bytes = image_bytes.ok_or_else(|| Error::BadRequest {
        message: "no image found in request".to_string(),
    })?;

    let name = titulo.clone().unwrap_or_else(|| format!("galeria-{id}"));
    let hosted = images.upload(&image_bytes, &name).await.map_err(|e| {
        tracing::error!("Image upload failed for galeria {id}: {e}");
        Error::Internal {
            operation: "upload image".to_string(),
        }
    })?;

    let next_orden = repo.list_imagenes(id).await?.len() as i32;
    let imagen = repo
        .add_imagen(&ImagenCreateDBRequest {
            galeria_id: id,
            titulo,
            url: hosted.url,
            thumb_url: hosted.thumb_url,
            delete_url: hosted.delete_url,
            orden: next_orden,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ImagenResponse::from(imagen))).into_response())
}

#[utoipa::path(
    delete,
    path = "/galerias/{id}/imagenes/{imagen_id}",
    tag = "galerias",
    summary = "Delete image from galeria",
    params(
        ("id" = i32, Path, description = "Galeria ID"),
        ("imagen_id" = i32, Path, description = "Imagen ID")
    ),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 404, description = "Galeria or imagen not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_imagen(
    State(state): State<AppState>,
    Path((id, imagen_id)): Path<(GaleriaId, ImagenId)>,
    _user: RequiresPermission<resource::Galerias, operation::UpdateAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Galerias::new(&mut conn);

    let imagen = repo.get_imagen(id, imagen_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Imagen".to_string(),
        id: imagen_id.to_string(),
    })?;

    if let (Some(delete_url), Some(images)) = (&imagen.delete_url, state.images.as_deref()) {
        if let Err(e) = images.delete(delete_url).await {
            tracing::warn!("Failed to delete hosted image {imagen_id}: {e}");
        }
    }

    if repo.delete_imagen(id, imagen_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Imagen".to_string(),
            id: imagen_id.to_string(),
        })
    }
}
