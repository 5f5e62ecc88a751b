//! Database repository for equipos.

use crate::types::{ClubId, EquipoId};
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::equipos::{EquipoCreateDBRequest, EquipoDBResponse, EquipoUpdateDBRequest},
};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing equipos
#[derive(Debug, Clone, Default)]
pub struct EquipoFilter {
    pub club_id: Option<ClubId>,
    pub nombre: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

pub struct Equipos<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Equipos<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Equipos<'c> {
    type CreateRequest = EquipoCreateDBRequest;
    type UpdateRequest = EquipoUpdateDBRequest;
    type Response = EquipoDBResponse;
    type Id = EquipoId;
    type Filter = EquipoFilter;

    #[instrument(skip(self, request), fields(nombre = %request.nombre), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let equipo = sqlx::query_as::<_, EquipoDBResponse>(
            "INSERT INTO equipos (nombre, club_id, categoria_id) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&request.nombre)
        .bind(request.club_id)
        .bind(request.categoria_id)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(equipo)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let equipo = sqlx::query_as::<_, EquipoDBResponse>("SELECT * FROM equipos WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(equipo)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let equipos = sqlx::query_as::<_, EquipoDBResponse>("SELECT * FROM equipos WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(equipos.into_iter().map(|e| (e.id, e)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM equipos WHERE TRUE");

        if let Some(club_id) = filter.club_id {
            query.push(" AND club_id = ").push_bind(club_id);
        }
        if let Some(nombre) = &filter.nombre {
            query.push(" AND nombre ILIKE ").push_bind(format!("%{nombre}%"));
        }

        query.push(" ORDER BY nombre ASC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let equipos = query.build_query_as::<EquipoDBResponse>().fetch_all(&mut *self.db).await?;
        Ok(equipos)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM equipos WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        sqlx::query_as::<_, EquipoDBResponse>(
            r#"
            UPDATE equipos SET
                nombre = COALESCE($2, nombre),
                club_id = COALESCE($3, club_id),
                categoria_id = COALESCE($4, categoria_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.nombre)
        .bind(request.club_id)
        .bind(request.categoria_id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)
    }
}
