//! Database request/response models, one module per entity.

pub mod categorias;
pub mod clubs;
pub mod cobros;
pub mod credenciales;
pub mod equipos;
pub mod galerias;
pub mod notifications;
pub mod pagos;
pub mod personas;
pub mod usuarios;
