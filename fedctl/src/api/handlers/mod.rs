//! HTTP handlers, one module per entity plus auth and webhooks.

pub mod auth;
pub mod categorias;
pub mod clubs;
pub mod cobros;
pub mod credenciales;
pub mod equipos;
pub mod galerias;
pub mod pagos;
pub mod personas;
pub mod usuarios;
pub mod webhooks;
