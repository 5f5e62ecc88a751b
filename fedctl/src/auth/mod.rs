//! Authentication and authorization.
//!
//! # Authentication
//!
//! Native email/password login issues a JWT that travels either in a
//! secure, HTTP-only session cookie (browser clients) or in an
//! `Authorization: Bearer` header (programmatic access). The webhook
//! endpoint is the only unauthenticated surface besides login itself.
//!
//! # Authorization
//!
//! Role-based: each account carries a [`crate::api::models::usuarios::Rol`],
//! and handlers declare the (resource, operation) pair they need via the
//! [`permissions::RequiresPermission`] extractor.
//!
//! # Modules
//!
//! - [`current_user`]: extractor for the authenticated user
//! - [`password`]: password hashing and verification using Argon2
//! - [`permissions`]: permission checking and access control logic
//! - [`session`]: JWT session token creation and verification

pub mod current_user;
pub mod password;
pub mod permissions;
pub mod session;
