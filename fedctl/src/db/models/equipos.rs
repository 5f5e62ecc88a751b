//! Database request/response models for equipos.

use crate::types::{CategoriaId, ClubId, EquipoId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct EquipoCreateDBRequest {
    pub nombre: String,
    pub club_id: ClubId,
    pub categoria_id: Option<CategoriaId>,
}

#[derive(Debug, Clone, Default)]
pub struct EquipoUpdateDBRequest {
    pub nombre: Option<String>,
    pub club_id: Option<ClubId>,
    pub categoria_id: Option<CategoriaId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EquipoDBResponse {
    pub id: EquipoId,
    pub nombre: String,
    pub club_id: ClubId,
    pub categoria_id: Option<CategoriaId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
