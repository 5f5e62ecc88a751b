//! Database repository for pagos.
//!
//! Creating or reconciling a pago maintains the invariant that a cobro is
//! Pagado iff one of its pagos reached terminal success: the pago write and
//! the cobro transition always share one transaction.

use crate::types::{CobroId, PagoId};
use crate::{
    api::models::{cobros::EstadoCobro, pagos::EstadoPago},
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::pagos::{PagoCreateDBRequest, PagoDBResponse, PagoUpdateDBRequest},
    },
};
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing pagos
#[derive(Debug, Clone, Default)]
pub struct PagoFilter {
    pub cobro_id: Option<CobroId>,
    pub estado: Option<EstadoPago>,
    pub skip: i64,
    pub limit: i64,
}

pub struct Pagos<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Pagos<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Stamp the linked cobro as paid with the given receipt.
    async fn settle_cobro(tx: &mut PgConnection, cobro_id: CobroId, comprobante: &str, payment_id: &str) -> Result<()> {
        sqlx::query(
            "UPDATE cobros SET estado = 'Pagado', comprobante = $2,
                    observaciones = COALESCE(observaciones, 'Pagado mediante MercadoPago. Payment ' || $3),
                    updated_at = NOW()
             WHERE id = $1 AND estado <> 'Pagado'",
        )
        .bind(cobro_id)
        .bind(comprobante)
        .bind(payment_id)
        .execute(tx)
        .await?;
        Ok(())
    }

    /// Validate the cobro can accept payments (exists and is not voided).
    async fn check_cobro_open(tx: &mut PgConnection, cobro_id: CobroId) -> Result<()> {
        let estado: Option<EstadoCobro> = sqlx::query_scalar("SELECT estado FROM cobros WHERE id = $1")
            .bind(cobro_id)
            .fetch_optional(&mut *tx)
            .await?;

        match estado {
            None => Err(DbError::NotFound),
            Some(EstadoCobro::Anulado) => Err(DbError::CheckViolation {
                constraint: None,
                table: Some("cobros".to_string()),
                message: "cannot register a pago against a voided cobro".to_string(),
            }),
            Some(_) => Ok(()),
        }
    }

    /// Insert-or-update a pago from an authoritative provider snapshot,
    /// settling the cobro when the payment reached terminal success.
    ///
    /// Keyed by the provider `payment_id`, so replaying the same snapshot is
    /// a no-op beyond refreshing `datos_extra`.
    #[instrument(skip(self, request), fields(payment_id = %request.payment_id), err)]
    pub async fn reconcile(&mut self, request: &PagoCreateDBRequest) -> Result<PagoDBResponse> {
        let mut tx = self.db.begin().await?;

        Self::check_cobro_open(&mut tx, request.cobro_id).await?;

        let pago = sqlx::query_as::<_, PagoDBResponse>(
            r#"
            INSERT INTO pagos (cobro_id, payment_id, monto, estado, metodo_pago, preference_id, datos_extra)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (payment_id) DO UPDATE
                SET estado = EXCLUDED.estado,
                    datos_extra = EXCLUDED.datos_extra,
                    updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(request.cobro_id)
        .bind(&request.payment_id)
        .bind(request.monto)
        .bind(request.estado)
        .bind(&request.metodo_pago)
        .bind(&request.preference_id)
        .bind(&request.datos_extra)
        .fetch_one(&mut *tx)
        .await?;

        if pago.estado == EstadoPago::Pagado {
            let comprobante = request
                .comprobante
                .clone()
                .unwrap_or_else(|| format!("MP-{}", pago.payment_id));
            Self::settle_cobro(&mut tx, pago.cobro_id, &comprobante, &pago.payment_id).await?;
        }

        tx.commit().await?;
        Ok(pago)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Pagos<'c> {
    type CreateRequest = PagoCreateDBRequest;
    type UpdateRequest = PagoUpdateDBRequest;
    type Response = PagoDBResponse;
    type Id = PagoId;
    type Filter = PagoFilter;

    /// Register a pago. A duplicate `payment_id` is a conflict (409), unlike
    /// [`Pagos::reconcile`] which upserts.
    #[instrument(skip(self, request), fields(payment_id = %request.payment_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let mut tx = self.db.begin().await?;

        Self::check_cobro_open(&mut tx, request.cobro_id).await?;

        let pago = sqlx::query_as::<_, PagoDBResponse>(
            r#"
            INSERT INTO pagos (cobro_id, payment_id, monto, estado, metodo_pago, preference_id, datos_extra)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(request.cobro_id)
        .bind(&request.payment_id)
        .bind(request.monto)
        .bind(request.estado)
        .bind(&request.metodo_pago)
        .bind(&request.preference_id)
        .bind(&request.datos_extra)
        .fetch_one(&mut *tx)
        .await?;

        if pago.estado == EstadoPago::Pagado {
            let comprobante = request
                .comprobante
                .clone()
                .unwrap_or_else(|| format!("MP-{}", pago.payment_id));
            Self::settle_cobro(&mut tx, pago.cobro_id, &comprobante, &pago.payment_id).await?;
        }

        tx.commit().await?;
        Ok(pago)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let pago = sqlx::query_as::<_, PagoDBResponse>("SELECT * FROM pagos WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(pago)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let pagos = sqlx::query_as::<_, PagoDBResponse>("SELECT * FROM pagos WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(pagos.into_iter().map(|p| (p.id, p)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM pagos WHERE TRUE");

        if let Some(cobro_id) = filter.cobro_id {
            query.push(" AND cobro_id = ").push_bind(cobro_id);
        }
        if let Some(estado) = filter.estado {
            query.push(" AND estado = ").push_bind(estado);
        }

        query.push(" ORDER BY id DESC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let pagos = query.build_query_as::<PagoDBResponse>().fetch_all(&mut *self.db).await?;
        Ok(pagos)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pagos WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let mut tx = self.db.begin().await?;

        let pago = sqlx::query_as::<_, PagoDBResponse>(
            r#"
            UPDATE pagos SET
                estado = COALESCE($2, estado),
                datos_extra = COALESCE($3, datos_extra),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.estado)
        .bind(&request.datos_extra)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        if pago.estado == EstadoPago::Pagado {
            let comprobante = format!("MP-{}", pago.payment_id);
            Self::settle_cobro(&mut tx, pago.cobro_id, &comprobante, &pago.payment_id).await?;
        }

        tx.commit().await?;
        Ok(pago)
    }
}
