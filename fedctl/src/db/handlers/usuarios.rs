//! Database repository for usuarios.

use crate::types::UsuarioId;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::usuarios::{UsuarioCreateDBRequest, UsuarioDBResponse, UsuarioUpdateDBRequest},
};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing usuarios
#[derive(Debug, Clone, Default)]
pub struct UsuarioFilter {
    pub email: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

pub struct Usuarios<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Usuarios<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Look up a usuario by email (exact match), used by login and the
    /// initial-admin bootstrap.
    #[instrument(skip(self, email), err)]
    pub async fn get_by_email(&mut self, email: &str) -> Result<Option<UsuarioDBResponse>> {
        let usuario = sqlx::query_as::<_, UsuarioDBResponse>("SELECT * FROM usuarios WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(usuario)
    }

    /// Stamp a successful login.
    pub async fn touch_last_login(&mut self, id: UsuarioId) -> Result<()> {
        sqlx::query("UPDATE usuarios SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Usuarios<'c> {
    type CreateRequest = UsuarioCreateDBRequest;
    type UpdateRequest = UsuarioUpdateDBRequest;
    type Response = UsuarioDBResponse;
    type Id = UsuarioId;
    type Filter = UsuarioFilter;

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let usuario = sqlx::query_as::<_, UsuarioDBResponse>(
            r#"
            INSERT INTO usuarios (nombre, apellido, email, password_hash, rol)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&request.nombre)
        .bind(&request.apellido)
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(request.rol)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(usuario)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let usuario = sqlx::query_as::<_, UsuarioDBResponse>("SELECT * FROM usuarios WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(usuario)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let usuarios = sqlx::query_as::<_, UsuarioDBResponse>("SELECT * FROM usuarios WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(usuarios.into_iter().map(|u| (u.id, u)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM usuarios WHERE TRUE");

        if let Some(email) = &filter.email {
            query.push(" AND email ILIKE ").push_bind(format!("%{email}%"));
        }

        query.push(" ORDER BY apellido, nombre LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let usuarios = query.build_query_as::<UsuarioDBResponse>().fetch_all(&mut *self.db).await?;
        Ok(usuarios)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM usuarios WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        sqlx::query_as::<_, UsuarioDBResponse>(
            r#"
            UPDATE usuarios SET
                nombre = COALESCE($2, nombre),
                apellido = COALESCE($3, apellido),
                password_hash = COALESCE($4, password_hash),
                rol = COALESCE($5, rol),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.nombre)
        .bind(&request.apellido)
        .bind(&request.password_hash)
        .bind(request.rol)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)
    }
}
