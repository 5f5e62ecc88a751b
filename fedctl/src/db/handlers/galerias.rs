//! Database repository for galerias and their imagenes.

use crate::types::{GaleriaId, ImagenId};
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::galerias::{
        GaleriaCreateDBRequest, GaleriaDBResponse, GaleriaUpdateDBRequest, ImagenCreateDBRequest, ImagenDBResponse,
    },
};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing galerias
#[derive(Debug, Clone, Default)]
pub struct GaleriaFilter {
    /// When set, only galleries with a matching publication state are returned
    pub publicada: Option<bool>,
    pub skip: i64,
    pub limit: i64,
}

pub struct Galerias<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Galerias<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Images for one gallery, in display order.
    pub async fn list_imagenes(&mut self, galeria_id: GaleriaId) -> Result<Vec<ImagenDBResponse>> {
        let imagenes = sqlx::query_as::<_, ImagenDBResponse>(
            "SELECT * FROM imagenes WHERE galeria_id = $1 ORDER BY orden ASC, id ASC",
        )
        .bind(galeria_id)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(imagenes)
    }

    /// Attach a hosted image to a gallery. The first image becomes the cover
    /// if the gallery has none.
    #[instrument(skip(self, request), fields(galeria_id = request.galeria_id), err)]
    pub async fn add_imagen(&mut self, request: &ImagenCreateDBRequest) -> Result<ImagenDBResponse> {
        let imagen = sqlx::query_as::<_, ImagenDBResponse>(
            r#"
            INSERT INTO imagenes (galeria_id, titulo, url, thumb_url, delete_url, orden)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(request.galeria_id)
        .bind(&request.titulo)
        .bind(&request.url)
        .bind(&request.thumb_url)
        .bind(&request.delete_url)
        .bind(request.orden)
        .fetch_one(&mut *self.db)
        .await?;

        sqlx::query("UPDATE galerias SET portada_url = COALESCE(portada_url, $2), updated_at = NOW() WHERE id = $1")
            .bind(request.galeria_id)
            .bind(&imagen.url)
            .execute(&mut *self.db)
            .await?;

        Ok(imagen)
    }

    pub async fn get_imagen(&mut self, galeria_id: GaleriaId, imagen_id: ImagenId) -> Result<Option<ImagenDBResponse>> {
        let imagen = sqlx::query_as::<_, ImagenDBResponse>(
            "SELECT * FROM imagenes WHERE id = $1 AND galeria_id = $2",
        )
        .bind(imagen_id)
        .bind(galeria_id)
        .fetch_optional(&mut *self.db)
        .await?;
        Ok(imagen)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_imagen(&mut self, galeria_id: GaleriaId, imagen_id: ImagenId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM imagenes WHERE id = $1 AND galeria_id = $2")
            .bind(imagen_id)
            .bind(galeria_id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Galerias<'c> {
    type CreateRequest = GaleriaCreateDBRequest;
    type UpdateRequest = GaleriaUpdateDBRequest;
    type Response = GaleriaDBResponse;
    type Id = GaleriaId;
    type Filter = GaleriaFilter;

    #[instrument(skip(self, request), fields(nombre = %request.nombre), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let galeria = sqlx::query_as::<_, GaleriaDBResponse>(
            r#"
            INSERT INTO galerias (nombre, descripcion, publicada, autor_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&request.nombre)
        .bind(&request.descripcion)
        .bind(request.publicada)
        .bind(request.autor_id)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(galeria)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let galeria = sqlx::query_as::<_, GaleriaDBResponse>("SELECT * FROM galerias WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(galeria)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let galerias = sqlx::query_as::<_, GaleriaDBResponse>("SELECT * FROM galerias WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(galerias.into_iter().map(|g| (g.id, g)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM galerias WHERE TRUE");

        if let Some(publicada) = filter.publicada {
            query.push(" AND publicada = ").push_bind(publicada);
        }

        query.push(" ORDER BY created_at DESC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let galerias = query.build_query_as::<GaleriaDBResponse>().fetch_all(&mut *self.db).await?;
        Ok(galerias)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM galerias WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        sqlx::query_as::<_, GaleriaDBResponse>(
            r#"
            UPDATE galerias SET
                nombre = COALESCE($2, nombre),
                descripcion = COALESCE($3, descripcion),
                portada_url = COALESCE($4, portada_url),
                publicada = COALESCE($5, publicada),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.nombre)
        .bind(&request.descripcion)
        .bind(&request.portada_url)
        .bind(request.publicada)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)
    }
}
