//! Database repository for credenciales.
//!
//! Credential lifecycle is driven through persona operations; this
//! repository mostly serves reads, plus the window update used when a
//! license changes.

use crate::types::{CredencialId, PersonaId};
use crate::{
    api::models::personas::EstadoLicencia,
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::credenciales::{CredencialCreateDBRequest, CredencialDBResponse, CredencialUpdateDBRequest},
    },
};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing credenciales
#[derive(Debug, Clone, Default)]
pub struct CredencialFilter {
    pub persona_id: Option<PersonaId>,
    pub estado: Option<EstadoLicencia>,
    pub skip: i64,
    pub limit: i64,
}

pub struct Credenciales<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Credenciales<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// All credentials for one persona, newest first.
    pub async fn list_for_persona(&mut self, persona_id: PersonaId) -> Result<Vec<CredencialDBResponse>> {
        let credenciales = sqlx::query_as::<_, CredencialDBResponse>(
            "SELECT * FROM credenciales WHERE persona_id = $1 ORDER BY id DESC",
        )
        .bind(persona_id)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(credenciales)
    }

    /// Credentials for several personas at once, keyed by persona.
    pub async fn list_for_personas(&mut self, persona_ids: &[PersonaId]) -> Result<HashMap<PersonaId, Vec<CredencialDBResponse>>> {
        if persona_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let credenciales = sqlx::query_as::<_, CredencialDBResponse>(
            "SELECT * FROM credenciales WHERE persona_id = ANY($1) ORDER BY id DESC",
        )
        .bind(persona_ids)
        .fetch_all(&mut *self.db)
        .await?;

        let mut map: HashMap<PersonaId, Vec<CredencialDBResponse>> = HashMap::new();
        for credencial in credenciales {
            map.entry(credencial.persona_id).or_default().push(credencial);
        }
        Ok(map)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Credenciales<'c> {
    type CreateRequest = CredencialCreateDBRequest;
    type UpdateRequest = CredencialUpdateDBRequest;
    type Response = CredencialDBResponse;
    type Id = CredencialId;
    type Filter = CredencialFilter;

    #[instrument(skip(self, request), fields(persona_id = request.persona_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let credencial = sqlx::query_as::<_, CredencialDBResponse>(
            r#"
            INSERT INTO credenciales (persona_id, identificador, fecha_alta, fecha_vencimiento, estado)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(request.persona_id)
        .bind(&request.identificador)
        .bind(request.fecha_alta)
        .bind(request.fecha_vencimiento)
        .bind(request.estado)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(credencial)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let credencial = sqlx::query_as::<_, CredencialDBResponse>("SELECT * FROM credenciales WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(credencial)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let credenciales = sqlx::query_as::<_, CredencialDBResponse>("SELECT * FROM credenciales WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(credenciales.into_iter().map(|c| (c.id, c)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM credenciales WHERE TRUE");

        if let Some(persona_id) = filter.persona_id {
            query.push(" AND persona_id = ").push_bind(persona_id);
        }
        if let Some(estado) = filter.estado {
            query.push(" AND estado = ").push_bind(estado);
        }

        query.push(" ORDER BY id DESC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let credenciales = query.build_query_as::<CredencialDBResponse>().fetch_all(&mut *self.db).await?;
        Ok(credenciales)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM credenciales WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        sqlx::query_as::<_, CredencialDBResponse>(
            "UPDATE credenciales SET fecha_alta = $2, fecha_vencimiento = $3, estado = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(request.fecha_alta)
        .bind(request.fecha_vencimiento)
        .bind(request.estado)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)
    }
}
