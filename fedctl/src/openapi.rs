//! OpenAPI documentation assembly.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::{handlers, models};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "BearerAuth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
            components.add_security_scheme(
                "CookieAuth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("fedctl_session"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::me,
        handlers::clubs::list_clubs,
        handlers::clubs::filter_clubs,
        handlers::clubs::get_club,
        handlers::clubs::create_club,
        handlers::clubs::update_club,
        handlers::clubs::delete_club,
        handlers::personas::list_personas,
        handlers::personas::filter_personas,
        handlers::personas::resumen,
        handlers::personas::get_persona,
        handlers::personas::create_persona,
        handlers::personas::update_persona,
        handlers::personas::renovar_licencia,
        handlers::personas::actualizar_estado_licencias,
        handlers::personas::delete_persona,
        handlers::personas::get_foto,
        handlers::personas::upload_foto,
        handlers::personas::delete_foto,
        handlers::categorias::list_categorias,
        handlers::categorias::get_categoria,
        handlers::categorias::create_categoria,
        handlers::categorias::update_categoria,
        handlers::categorias::delete_categoria,
        handlers::equipos::list_equipos,
        handlers::equipos::get_equipo,
        handlers::equipos::create_equipo,
        handlers::equipos::update_equipo,
        handlers::equipos::delete_equipo,
        handlers::cobros::list_cobros,
        handlers::cobros::get_cobro,
        handlers::cobros::create_cobro,
        handlers::cobros::update_cobro,
        handlers::cobros::anular_cobro,
        handlers::cobros::delete_cobro,
        handlers::cobros::crear_preferencia,
        handlers::pagos::list_pagos,
        handlers::pagos::get_pago,
        handlers::pagos::create_pago,
        handlers::credenciales::list_credenciales,
        handlers::credenciales::get_credencial,
        handlers::galerias::list_galerias,
        handlers::galerias::get_galeria,
        handlers::galerias::create_galeria,
        handlers::galerias::update_galeria,
        handlers::galerias::delete_galeria,
        handlers::galerias::upload_imagen,
        handlers::galerias::delete_imagen,
        handlers::usuarios::list_usuarios,
        handlers::usuarios::get_usuario,
        handlers::usuarios::create_usuario,
        handlers::usuarios::update_usuario,
        handlers::usuarios::delete_usuario,
        handlers::webhooks::mercadopago_post,
        handlers::webhooks::mercadopago_get,
    ),
    components(schemas(
        models::usuarios::Rol,
        models::usuarios::CurrentUser,
        models::usuarios::LoginRequest,
        models::usuarios::LoginResponse,
        models::usuarios::UsuarioCreate,
        models::usuarios::UsuarioUpdate,
        models::usuarios::UsuarioResponse,
        models::clubs::EstadoAfiliacion,
        models::clubs::ClubCreate,
        models::clubs::ClubUpdate,
        models::clubs::ClubResponse,
        models::personas::EstadoLicencia,
        models::personas::PersonaCreate,
        models::personas::PersonaUpdate,
        models::personas::PersonaResponse,
        models::personas::SweepResponse,
        models::personas::ResumenResponse,
        models::personas::ConteoPorClave,
        models::personas::FotoResponse,
        models::categorias::CategoriaCreate,
        models::categorias::CategoriaUpdate,
        models::categorias::CategoriaResponse,
        models::equipos::EquipoCreate,
        models::equipos::EquipoUpdate,
        models::equipos::EquipoResponse,
        models::cobros::EstadoCobro,
        models::cobros::CobroCreate,
        models::cobros::CobroUpdate,
        models::cobros::CobroResponse,
        models::cobros::PreferenciaResponse,
        models::pagos::EstadoPago,
        models::pagos::PagoCreate,
        models::pagos::PagoResponse,
        models::credenciales::CredencialResponse,
        models::galerias::GaleriaCreate,
        models::galerias::GaleriaUpdate,
        models::galerias::GaleriaResponse,
        models::galerias::ImagenResponse,
        models::webhooks::WebhookAck,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication"),
        (name = "clubs", description = "Club management"),
        (name = "personas", description = "Member management, licenses and credentials"),
        (name = "categorias", description = "Category management"),
        (name = "equipos", description = "Team management"),
        (name = "cobros", description = "Charges and checkout preferences"),
        (name = "pagos", description = "Payments"),
        (name = "credenciales", description = "Credentials (read-only)"),
        (name = "galerias", description = "Image galleries"),
        (name = "usuarios", description = "Staff accounts"),
        (name = "webhooks", description = "Payment provider webhooks"),
    ),
    info(
        title = "fedctl",
        description = "Management backend for a regional volleyball federation"
    )
)]
pub struct ApiDoc;
