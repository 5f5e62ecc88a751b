//! Database repository for categorias.

use crate::types::CategoriaId;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::categorias::{CategoriaCreateDBRequest, CategoriaDBResponse, CategoriaUpdateDBRequest},
};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing categorias
#[derive(Debug, Clone, Default)]
pub struct CategoriaFilter {
    pub tipo: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

pub struct Categorias<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Categorias<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Categorias<'c> {
    type CreateRequest = CategoriaCreateDBRequest;
    type UpdateRequest = CategoriaUpdateDBRequest;
    type Response = CategoriaDBResponse;
    type Id = CategoriaId;
    type Filter = CategoriaFilter;

    #[instrument(skip(self, request), fields(nombre = %request.nombre), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let categoria = sqlx::query_as::<_, CategoriaDBResponse>(
            "INSERT INTO categorias (nombre, tipo) VALUES ($1, $2) RETURNING *",
        )
        .bind(&request.nombre)
        .bind(&request.tipo)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(categoria)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let categoria = sqlx::query_as::<_, CategoriaDBResponse>("SELECT * FROM categorias WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(categoria)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let categorias = sqlx::query_as::<_, CategoriaDBResponse>("SELECT * FROM categorias WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(categorias.into_iter().map(|c| (c.id, c)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM categorias WHERE TRUE");

        if let Some(tipo) = &filter.tipo {
            query.push(" AND tipo ILIKE ").push_bind(format!("%{tipo}%"));
        }

        query.push(" ORDER BY tipo, nombre LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let categorias = query.build_query_as::<CategoriaDBResponse>().fetch_all(&mut *self.db).await?;
        Ok(categorias)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categorias WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        sqlx::query_as::<_, CategoriaDBResponse>(
            r#"
            UPDATE categorias SET
                nombre = COALESCE($2, nombre),
                tipo = COALESCE($3, tipo),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.nombre)
        .bind(&request.tipo)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)
    }
}
