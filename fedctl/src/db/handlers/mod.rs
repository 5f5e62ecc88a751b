//! Repository implementations for database access.
//!
//! Each repository wraps a SQLx connection or transaction, provides
//! strongly-typed CRUD operations, and returns domain models from
//! [`crate::db::models`]. Repositories follow a consistent pattern and
//! implement the [`Repository`] trait.
//!
//! # Common Pattern
//!
//! ```ignore
//! use fedctl::db::handlers::{Personas, Repository};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut conn = pool.acquire().await?;
//!     let mut repo = Personas::new(&mut conn);
//!     let persona = repo.get_by_id(42).await?;
//!     Ok(())
//! }
//! ```

pub mod categorias;
pub mod clubs;
pub mod cobros;
pub mod credenciales;
pub mod equipos;
pub mod galerias;
pub mod notifications;
pub mod pagos;
pub mod personas;
pub mod repository;
pub mod usuarios;

pub use categorias::Categorias;
pub use clubs::Clubs;
pub use cobros::Cobros;
pub use credenciales::Credenciales;
pub use equipos::Equipos;
pub use galerias::Galerias;
pub use notifications::Notifications;
pub use pagos::Pagos;
pub use personas::Personas;
pub use repository::Repository;
pub use usuarios::Usuarios;
