//! Database repository for cobros.

use crate::types::{ClubId, CobroId};
use crate::{
    api::models::cobros::EstadoCobro,
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::cobros::{CobroCreateDBRequest, CobroDBResponse, CobroUpdateDBRequest},
    },
};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing cobros
#[derive(Debug, Clone, Default)]
pub struct CobroFilter {
    pub club_id: Option<ClubId>,
    pub estado: Option<EstadoCobro>,
    pub skip: i64,
    pub limit: i64,
}

pub struct Cobros<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Cobros<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Void a charge. Paid charges cannot be voided.
    #[instrument(skip(self), err)]
    pub async fn anular(&mut self, id: CobroId) -> Result<CobroDBResponse> {
        let cobro = sqlx::query_as::<_, CobroDBResponse>("SELECT * FROM cobros WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        if cobro.estado == EstadoCobro::Pagado {
            return Err(DbError::CheckViolation {
                constraint: None,
                table: Some("cobros".to_string()),
                message: "a paid cobro cannot be voided".to_string(),
            });
        }

        sqlx::query_as::<_, CobroDBResponse>(
            "UPDATE cobros SET estado = 'Anulado', updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Cobros<'c> {
    type CreateRequest = CobroCreateDBRequest;
    type UpdateRequest = CobroUpdateDBRequest;
    type Response = CobroDBResponse;
    type Id = CobroId;
    type Filter = CobroFilter;

    #[instrument(skip(self, request), fields(club_id = request.club_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let cobro = sqlx::query_as::<_, CobroDBResponse>(
            r#"
            INSERT INTO cobros (concepto, monto, fecha, fecha_vencimiento, club_id, equipo_id, observaciones)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&request.concepto)
        .bind(request.monto)
        .bind(request.fecha)
        .bind(request.fecha_vencimiento)
        .bind(request.club_id)
        .bind(request.equipo_id)
        .bind(&request.observaciones)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(cobro)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let cobro = sqlx::query_as::<_, CobroDBResponse>("SELECT * FROM cobros WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(cobro)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let cobros = sqlx::query_as::<_, CobroDBResponse>("SELECT * FROM cobros WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(cobros.into_iter().map(|c| (c.id, c)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM cobros WHERE TRUE");

        if let Some(club_id) = filter.club_id {
            query.push(" AND club_id = ").push_bind(club_id);
        }
        if let Some(estado) = filter.estado {
            query.push(" AND estado = ").push_bind(estado);
        }

        query.push(" ORDER BY fecha DESC, id DESC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let cobros = query.build_query_as::<CobroDBResponse>().fetch_all(&mut *self.db).await?;
        Ok(cobros)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cobros WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        sqlx::query_as::<_, CobroDBResponse>(
            r#"
            UPDATE cobros SET
                concepto = COALESCE($2, concepto),
                monto = COALESCE($3, monto),
                fecha = COALESCE($4, fecha),
                fecha_vencimiento = COALESCE($5, fecha_vencimiento),
                equipo_id = COALESCE($6, equipo_id),
                observaciones = COALESCE($7, observaciones),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.concepto)
        .bind(request.monto)
        .bind(request.fecha)
        .bind(request.fecha_vencimiento)
        .bind(request.equipo_id)
        .bind(&request.observaciones)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)
    }
}
