//! API request/response models (HTTP DTOs), one module per entity.

pub mod categorias;
pub mod clubs;
pub mod cobros;
pub mod credenciales;
pub mod equipos;
pub mod galerias;
pub mod pagination;
pub mod pagos;
pub mod personas;
pub mod usuarios;
pub mod webhooks;
