//! Database layer: error taxonomy, entity models, and repositories.
//!
//! Access goes through repositories (one per table) that wrap a
//! `&mut PgConnection`, so callers decide whether an operation runs on a
//! pooled connection or inside a larger transaction.

pub mod errors;
pub mod handlers;
pub mod models;
