//! Database repository for clubs.

use crate::types::ClubId;
use crate::{
    api::models::clubs::EstadoAfiliacion,
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::clubs::{ClubCreateDBRequest, ClubDBResponse, ClubUpdateDBRequest},
    },
};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing clubs
#[derive(Debug, Clone, Default)]
pub struct ClubFilter {
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub estado_afiliacion: Option<EstadoAfiliacion>,
    pub skip: i64,
    pub limit: i64,
}

impl ClubFilter {
    pub fn page(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            ..Default::default()
        }
    }
}

pub struct Clubs<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Clubs<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Clubs<'c> {
    type CreateRequest = ClubCreateDBRequest;
    type UpdateRequest = ClubUpdateDBRequest;
    type Response = ClubDBResponse;
    type Id = ClubId;
    type Filter = ClubFilter;

    #[instrument(skip(self, request), fields(nombre = %request.nombre), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let club = sqlx::query_as::<_, ClubDBResponse>(
            r#"
            INSERT INTO clubs (nombre, direccion, telefono, email, cuit, fecha_afiliacion, estado_afiliacion)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&request.nombre)
        .bind(&request.direccion)
        .bind(&request.telefono)
        .bind(&request.email)
        .bind(&request.cuit)
        .bind(request.fecha_afiliacion)
        .bind(request.estado_afiliacion)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(club)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let club = sqlx::query_as::<_, ClubDBResponse>("SELECT * FROM clubs WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(club)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let clubs = sqlx::query_as::<_, ClubDBResponse>("SELECT * FROM clubs WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(clubs.into_iter().map(|c| (c.id, c)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM clubs WHERE TRUE");

        if let Some(nombre) = &filter.nombre {
            query.push(" AND nombre ILIKE ").push_bind(format!("%{nombre}%"));
        }
        if let Some(email) = &filter.email {
            query.push(" AND email ILIKE ").push_bind(format!("%{email}%"));
        }
        if let Some(estado) = filter.estado_afiliacion {
            query.push(" AND estado_afiliacion = ").push_bind(estado);
        }

        query.push(" ORDER BY nombre ASC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let clubs = query.build_query_as::<ClubDBResponse>().fetch_all(&mut *self.db).await?;
        Ok(clubs)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        // Personas/equipos/cobros reference clubs with ON DELETE RESTRICT;
        // a violation surfaces as DbError::ForeignKeyViolation (HTTP 400).
        let result = sqlx::query("DELETE FROM clubs WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        sqlx::query_as::<_, ClubDBResponse>(
            r#"
            UPDATE clubs SET
                nombre = COALESCE($2, nombre),
                direccion = COALESCE($3, direccion),
                telefono = COALESCE($4, telefono),
                email = COALESCE($5, email),
                cuit = COALESCE($6, cuit),
                fecha_afiliacion = COALESCE($7, fecha_afiliacion),
                estado_afiliacion = COALESCE($8, estado_afiliacion),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.nombre)
        .bind(&request.direccion)
        .bind(&request.telefono)
        .bind(&request.email)
        .bind(&request.cuit)
        .bind(request.fecha_afiliacion)
        .bind(request.estado_afiliacion)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)
    }
}
