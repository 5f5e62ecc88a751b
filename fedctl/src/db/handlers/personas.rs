//! Database repository for personas.
//!
//! This repository owns the license/credential synchronization rules: any
//! operation that changes a persona's license window also creates or updates
//! the matching credencial inside the same transaction, so readers never
//! observe a persona and credencial that disagree.

use crate::licenses;
use crate::types::PersonaId;
use crate::{
    api::models::personas::EstadoLicencia,
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::personas::{PersonaCreateDBRequest, PersonaDBResponse, PersonaUpdateDBRequest},
    },
};
use chrono::NaiveDate;
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing personas
#[derive(Debug, Clone, Default)]
pub struct PersonaFilter {
    pub nombre_apellido: Option<String>,
    pub dni: Option<String>,
    pub tipo: Option<String>,
    pub categoria: Option<String>,
    pub club_id: Option<i32>,
    pub estado_licencia: Option<EstadoLicencia>,
    pub fecha_nacimiento_desde: Option<NaiveDate>,
    pub fecha_nacimiento_hasta: Option<NaiveDate>,
    pub fecha_licencia_desde: Option<NaiveDate>,
    pub fecha_licencia_hasta: Option<NaiveDate>,
    pub fecha_licencia_baja_desde: Option<NaiveDate>,
    pub fecha_licencia_baja_hasta: Option<NaiveDate>,
    pub skip: i64,
    pub limit: i64,
}

impl PersonaFilter {
    pub fn page(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            ..Default::default()
        }
    }
}

/// Counts returned by the expiry sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    pub personas: u64,
    pub credenciales: u64,
}

pub struct Personas<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Personas<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Create or refresh the persona's current credencial so it mirrors the
    /// license window. "Current" is the most recently created row.
    async fn sync_credencial(
        tx: &mut PgConnection,
        persona_id: PersonaId,
        fecha_alta: NaiveDate,
        fecha_vencimiento: NaiveDate,
        estado: EstadoLicencia,
    ) -> Result<()> {
        let current: Option<i32> = sqlx::query_scalar(
            "SELECT id FROM credenciales WHERE persona_id = $1 ORDER BY id DESC LIMIT 1",
        )
        .bind(persona_id)
        .fetch_optional(&mut *tx)
        .await?;

        match current {
            Some(credencial_id) => {
                sqlx::query(
                    "UPDATE credenciales SET fecha_alta = $2, fecha_vencimiento = $3, estado = $4, updated_at = NOW()
                     WHERE id = $1",
                )
                .bind(credencial_id)
                .bind(fecha_alta)
                .bind(fecha_vencimiento)
                .bind(estado)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                let identificador = licenses::credencial_identificador(persona_id, fecha_alta);
                sqlx::query(
                    "INSERT INTO credenciales (persona_id, identificador, fecha_alta, fecha_vencimiento, estado)
                     VALUES ($1, $2, $3, $4, $5)",
                )
                .bind(persona_id)
                .bind(identificador)
                .bind(fecha_alta)
                .bind(fecha_vencimiento)
                .bind(estado)
                .execute(&mut *tx)
                .await?;
            }
        }

        Ok(())
    }

    /// Renew the persona's license: window restarts today, credencial follows
    /// in the same transaction.
    #[instrument(skip(self), err)]
    pub async fn renovar(&mut self, id: PersonaId, today: NaiveDate) -> Result<PersonaDBResponse> {
        let fecha_licencia = today;
        let fecha_licencia_baja = licenses::license_expiry(today);

        let mut tx = self.db.begin().await?;

        let persona = sqlx::query_as::<_, PersonaDBResponse>(
            "UPDATE personas SET fecha_licencia = $2, fecha_licencia_baja = $3, estado_licencia = 'ACTIVO', updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(fecha_licencia)
        .bind(fecha_licencia_baja)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        Self::sync_credencial(&mut tx, id, fecha_licencia, fecha_licencia_baja, EstadoLicencia::Activo).await?;

        tx.commit().await?;
        Ok(persona)
    }

    /// Set-based license expiry sweep.
    ///
    /// Flips ACTIVO -> VENCIDO for licenses past their expiry date and
    /// VENCIDO -> ACTIVO for licenses whose window was pushed forward, then
    /// cascades the same transitions to the affected credenciales. All four
    /// statements run in one transaction; running the sweep twice in a row
    /// changes nothing the second time.
    #[instrument(skip(self), err)]
    pub async fn sweep(&mut self, today: NaiveDate) -> Result<SweepOutcome> {
        let mut tx = self.db.begin().await?;

        let expired: Vec<i32> = sqlx::query_scalar(
            "UPDATE personas SET estado_licencia = 'VENCIDO', updated_at = NOW()
             WHERE fecha_licencia IS NOT NULL AND fecha_licencia_baja < $1 AND estado_licencia = 'ACTIVO'
             RETURNING id",
        )
        .bind(today)
        .fetch_all(&mut *tx)
        .await?;

        let restored: Vec<i32> = sqlx::query_scalar(
            "UPDATE personas SET estado_licencia = 'ACTIVO', updated_at = NOW()
             WHERE fecha_licencia IS NOT NULL AND fecha_licencia_baja >= $1 AND estado_licencia = 'VENCIDO'
             RETURNING id",
        )
        .bind(today)
        .fetch_all(&mut *tx)
        .await?;

        let mut credenciales = 0u64;
        if !expired.is_empty() {
            let result = sqlx::query(
                "UPDATE credenciales SET estado = 'VENCIDO', updated_at = NOW()
                 WHERE persona_id = ANY($1) AND estado <> 'VENCIDO'",
            )
            .bind(&expired)
            .execute(&mut *tx)
            .await?;
            credenciales += result.rows_affected();
        }
        if !restored.is_empty() {
            let result = sqlx::query(
                "UPDATE credenciales SET estado = 'ACTIVO', updated_at = NOW()
                 WHERE persona_id = ANY($1) AND estado <> 'ACTIVO'",
            )
            .bind(&restored)
            .execute(&mut *tx)
            .await?;
            credenciales += result.rows_affected();
        }

        tx.commit().await?;

        Ok(SweepOutcome {
            personas: (expired.len() + restored.len()) as u64,
            credenciales,
        })
    }

    /// Store the hosted photo references for a persona.
    #[instrument(skip(self, foto_url, foto_delete_url), err)]
    pub async fn set_foto(
        &mut self,
        id: PersonaId,
        foto_url: Option<&str>,
        foto_delete_url: Option<&str>,
    ) -> Result<PersonaDBResponse> {
        sqlx::query_as::<_, PersonaDBResponse>(
            "UPDATE personas SET foto_url = $2, foto_delete_url = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(foto_url)
        .bind(foto_delete_url)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)
    }

    /// Aggregate counts for the summary endpoint: (total, activas, vencidas).
    pub async fn conteo_estados(&mut self) -> Result<(i64, i64, i64)> {
        let row: (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*),
                    COUNT(*) FILTER (WHERE estado_licencia = 'ACTIVO'),
                    COUNT(*) FILTER (WHERE estado_licencia = 'VENCIDO')
             FROM personas",
        )
        .fetch_one(&mut *self.db)
        .await?;
        Ok(row)
    }

    /// Member counts grouped by tipo.
    pub async fn conteo_por_tipo(&mut self) -> Result<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT COALESCE(tipo, 'sin tipo'), COUNT(*)
             FROM personas GROUP BY 1 ORDER BY 2 DESC",
        )
        .fetch_all(&mut *self.db)
        .await?;
        Ok(rows)
    }

    /// Member counts grouped by club name.
    pub async fn conteo_por_club(&mut self) -> Result<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT c.nombre, COUNT(*)
             FROM personas p JOIN clubs c ON p.club_id = c.id
             GROUP BY 1 ORDER BY 2 DESC",
        )
        .fetch_all(&mut *self.db)
        .await?;
        Ok(rows)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Personas<'c> {
    type CreateRequest = PersonaCreateDBRequest;
    type UpdateRequest = PersonaUpdateDBRequest;
    type Response = PersonaDBResponse;
    type Id = PersonaId;
    type Filter = PersonaFilter;

    #[instrument(skip(self, request), fields(dni = %request.dni), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let mut tx = self.db.begin().await?;

        let persona = sqlx::query_as::<_, PersonaDBResponse>(
            r#"
            INSERT INTO personas (nombre_apellido, dni, fecha_nacimiento, club_id, licencia_numero,
                                  fecha_licencia, fecha_licencia_baja, estado_licencia, tipo, categoria, categoria_nivel)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&request.nombre_apellido)
        .bind(&request.dni)
        .bind(request.fecha_nacimiento)
        .bind(request.club_id)
        .bind(&request.licencia_numero)
        .bind(request.fecha_licencia)
        .bind(request.fecha_licencia_baja)
        .bind(request.estado_licencia)
        .bind(&request.tipo)
        .bind(&request.categoria)
        .bind(request.categoria_nivel)
        .fetch_one(&mut *tx)
        .await?;

        // Registration with a license also issues the credencial, atomically.
        if let (Some(alta), Some(vencimiento), Some(estado)) =
            (request.fecha_licencia, request.fecha_licencia_baja, request.estado_licencia)
        {
            Self::sync_credencial(&mut tx, persona.id, alta, vencimiento, estado).await?;
        }

        tx.commit().await?;
        Ok(persona)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let persona = sqlx::query_as::<_, PersonaDBResponse>("SELECT * FROM personas WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(persona)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let personas = sqlx::query_as::<_, PersonaDBResponse>("SELECT * FROM personas WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(personas.into_iter().map(|p| (p.id, p)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM personas WHERE TRUE");

        if let Some(nombre) = &filter.nombre_apellido {
            query.push(" AND nombre_apellido ILIKE ").push_bind(format!("%{nombre}%"));
        }
        if let Some(dni) = &filter.dni {
            query.push(" AND dni ILIKE ").push_bind(format!("%{dni}%"));
        }
        if let Some(tipo) = &filter.tipo {
            query.push(" AND tipo ILIKE ").push_bind(format!("%{tipo}%"));
        }
        if let Some(categoria) = &filter.categoria {
            query.push(" AND categoria ILIKE ").push_bind(format!("%{categoria}%"));
        }
        if let Some(club_id) = filter.club_id {
            query.push(" AND club_id = ").push_bind(club_id);
        }
        if let Some(estado) = filter.estado_licencia {
            query.push(" AND estado_licencia = ").push_bind(estado);
        }
        if let Some(desde) = filter.fecha_nacimiento_desde {
            query.push(" AND fecha_nacimiento >= ").push_bind(desde);
        }
        if let Some(hasta) = filter.fecha_nacimiento_hasta {
            query.push(" AND fecha_nacimiento <= ").push_bind(hasta);
        }
        if let Some(desde) = filter.fecha_licencia_desde {
            query.push(" AND fecha_licencia >= ").push_bind(desde);
        }
        if let Some(hasta) = filter.fecha_licencia_hasta {
            query.push(" AND fecha_licencia <= ").push_bind(hasta);
        }
        if let Some(desde) = filter.fecha_licencia_baja_desde {
            query.push(" AND fecha_licencia_baja >= ").push_bind(desde);
        }
        if let Some(hasta) = filter.fecha_licencia_baja_hasta {
            query.push(" AND fecha_licencia_baja <= ").push_bind(hasta);
        }

        query.push(" ORDER BY nombre_apellido ASC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let personas = query.build_query_as::<PersonaDBResponse>().fetch_all(&mut *self.db).await?;
        Ok(personas)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM personas WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // License fields and the credencial move together, so everything
        // happens inside one transaction.
        let mut tx = self.db.begin().await?;

        let persona = sqlx::query_as::<_, PersonaDBResponse>(
            r#"
            UPDATE personas SET
                nombre_apellido = COALESCE($2, nombre_apellido),
                dni = COALESCE($3, dni),
                fecha_nacimiento = COALESCE($4, fecha_nacimiento),
                club_id = COALESCE($5, club_id),
                licencia_numero = COALESCE($6, licencia_numero),
                fecha_licencia = COALESCE($7, fecha_licencia),
                fecha_licencia_baja = COALESCE($8, fecha_licencia_baja),
                estado_licencia = COALESCE($9, estado_licencia),
                tipo = COALESCE($10, tipo),
                categoria = COALESCE($11, categoria),
                categoria_nivel = COALESCE($12, categoria_nivel),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.nombre_apellido)
        .bind(&request.dni)
        .bind(request.fecha_nacimiento)
        .bind(request.club_id)
        .bind(&request.licencia_numero)
        .bind(request.fecha_licencia)
        .bind(request.fecha_licencia_baja)
        .bind(request.estado_licencia)
        .bind(&request.tipo)
        .bind(&request.categoria)
        .bind(request.categoria_nivel)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        if let (Some(alta), Some(vencimiento), Some(estado)) =
            (request.fecha_licencia, request.fecha_licencia_baja, request.estado_licencia)
        {
            Self::sync_credencial(&mut tx, id, alta, vencimiento, estado).await?;
        }

        tx.commit().await?;
        Ok(persona)
    }
}
