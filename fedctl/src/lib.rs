//! # fedctl: Federation Management Backend
//!
//! `fedctl` is the REST backend for a regional volleyball federation: clubs,
//! members ("personas") with annual licenses and credentials, teams,
//! categories, charges ("cobros") and payments ("pagos"), image galleries,
//! and staff accounts with role-based authorization.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses PostgreSQL for all persistence.
//!
//! Control flow is request-scoped throughout: HTTP request -> router ->
//! (auth extractor) -> handler -> repository -> PostgreSQL -> JSON response.
//! There are no background workers; the license expiry sweep is an explicit
//! administrative endpoint.
//!
//! Three flows carry the interesting invariants:
//!
//! - **License renewal** restarts a persona's one-year license window and
//!   creates or updates the matching credencial in the same transaction
//!   ([`db::handlers::Personas::renovar`]).
//! - **The expiry sweep** recomputes license status set-based with indexed
//!   `UPDATE ... WHERE` statements and cascades to credenciales, all in one
//!   transaction; it is idempotent ([`db::handlers::Personas::sweep`]).
//! - **Webhook reconciliation** verifies the delivery signature, records the
//!   notification idempotently keyed by `(resource_id, topic)`, fetches the
//!   authoritative payment from the provider, and applies the Pago/Cobro
//!   transition atomically ([`webhooks::reconciliation`]).
//!
//! External collaborators (payment gateway, image host) sit behind traits
//! ([`payment_providers::PaymentProvider`], [`image_host::ImageHost`]) with
//! real clients and in-memory dummies.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use fedctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = fedctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     fedctl::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod image_host;
pub mod licenses;
mod openapi;
pub mod payment_providers;
pub mod telemetry;
pub mod types;
pub mod webhooks;

use crate::{
    api::models::usuarios::Rol,
    auth::password,
    db::handlers::{Repository, Usuarios},
    db::models::usuarios::{UsuarioCreateDBRequest, UsuarioUpdateDBRequest},
    image_host::ImageHost,
    openapi::ApiDoc,
    payment_providers::PaymentProvider,
};
use axum::{
    http::{self, HeaderValue},
    routing::{delete, get, post, put},
    Json, Router,
};
use bon::Builder;
pub use config::Config;
use config::CorsOrigin;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, instrument, Level};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{ClubId, CobroId, PagoId, PersonaId, UsuarioId};

/// Application state shared across all request handlers.
///
/// Contains the database pool, the loaded configuration, and the external
/// service adapters (both optional: an unconfigured provider degrades the
/// corresponding endpoints, not the whole server).
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub payments: Option<Arc<dyn PaymentProvider>>,
    pub images: Option<Arc<dyn ImageHost>>,
}

/// Get the fedctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// Idempotent: creates the admin account on first startup, or refreshes its
/// password on subsequent startups when one is configured.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(email: &str, admin_password: Option<&str>, db: &PgPool) -> anyhow::Result<UsuarioId> {
    let password_hash = admin_password
        .map(password::hash_string)
        .transpose()
        .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?;

    let mut conn = db.acquire().await?;
    let mut usuarios = Usuarios::new(&mut conn);

    if let Some(existing) = usuarios
        .get_by_email(email)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to check existing admin user: {e}"))?
    {
        if password_hash.is_some() {
            usuarios
                .update(
                    existing.id,
                    &UsuarioUpdateDBRequest {
                        password_hash,
                        ..Default::default()
                    },
                )
                .await
                .map_err(|e| anyhow::anyhow!("Failed to update admin password: {e}"))?;
        }
        return Ok(existing.id);
    }

    let created = usuarios
        .create(&UsuarioCreateDBRequest {
            nombre: "Admin".to_string(),
            apellido: "Federacion".to_string(),
            email: email.to_string(),
            password_hash,
            rol: Rol::Administrador,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create admin user: {e}"))?;

    info!("Created initial admin user {}", created.id);
    Ok(created.id)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.auth.security.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().trim_end_matches('/').parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
            http::Method::DELETE,
        ])
        .allow_headers([http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
        .allow_credentials(config.auth.security.cors.allow_credentials);

    if let Some(max_age) = config.auth.security.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    // Authentication routes
    let auth_routes = Router::new()
        .route("/auth/login", post(api::handlers::auth::login))
        .route("/auth/logout", post(api::handlers::auth::logout))
        .route("/auth/me", get(api::handlers::auth::me));

    // Entity routes. Static segments (resumen, filtro, ...) must coexist
    // with {id} captures; axum's router prefers the static match.
    let api_routes = Router::new()
        // Clubs
        .route("/clubs", get(api::handlers::clubs::list_clubs))
        .route("/clubs", post(api::handlers::clubs::create_club))
        .route("/clubs/filtro/buscar", get(api::handlers::clubs::filter_clubs))
        .route("/clubs/{id}", get(api::handlers::clubs::get_club))
        .route("/clubs/{id}", put(api::handlers::clubs::update_club))
        .route("/clubs/{id}", delete(api::handlers::clubs::delete_club))
        // Personas: licenses, credentials, photos
        .route("/personas", get(api::handlers::personas::list_personas))
        .route("/personas", post(api::handlers::personas::create_persona))
        .route("/personas/resumen", get(api::handlers::personas::resumen))
        .route("/personas/filtro/buscar", get(api::handlers::personas::filter_personas))
        .route(
            "/personas/actualizar-estado-licencias",
            post(api::handlers::personas::actualizar_estado_licencias),
        )
        .route("/personas/{id}", get(api::handlers::personas::get_persona))
        .route("/personas/{id}", put(api::handlers::personas::update_persona))
        .route("/personas/{id}", delete(api::handlers::personas::delete_persona))
        .route("/personas/{id}/renovar", put(api::handlers::personas::renovar_licencia))
        .route("/personas/{id}/foto", get(api::handlers::personas::get_foto))
        .route("/personas/{id}/foto", put(api::handlers::personas::upload_foto))
        .route("/personas/{id}/foto", delete(api::handlers::personas::delete_foto))
        // Categorias
        .route("/categorias", get(api::handlers::categorias::list_categorias))
        .route("/categorias", post(api::handlers::categorias::create_categoria))
        .route("/categorias/{id}", get(api::handlers::categorias::get_categoria))
        .route("/categorias/{id}", put(api::handlers::categorias::update_categoria))
        .route("/categorias/{id}", delete(api::handlers::categorias::delete_categoria))
        // Equipos
        .route("/equipos", get(api::handlers::equipos::list_equipos))
        .route("/equipos", post(api::handlers::equipos::create_equipo))
        .route("/equipos/{id}", get(api::handlers::equipos::get_equipo))
        .route("/equipos/{id}", put(api::handlers::equipos::update_equipo))
        .route("/equipos/{id}", delete(api::handlers::equipos::delete_equipo))
        // Cobros + checkout preferences
        .route("/cobros", get(api::handlers::cobros::list_cobros))
        .route("/cobros", post(api::handlers::cobros::create_cobro))
        .route("/cobros/{id}", get(api::handlers::cobros::get_cobro))
        .route("/cobros/{id}", put(api::handlers::cobros::update_cobro))
        .route("/cobros/{id}", delete(api::handlers::cobros::delete_cobro))
        .route("/cobros/{id}/anular", post(api::handlers::cobros::anular_cobro))
        .route("/cobros/{id}/preferencia", post(api::handlers::cobros::crear_preferencia))
        // Pagos
        .route("/pagos", get(api::handlers::pagos::list_pagos))
        .route("/pagos", post(api::handlers::pagos::create_pago))
        .route("/pagos/{id}", get(api::handlers::pagos::get_pago))
        // Credenciales (read-only)
        .route("/credenciales", get(api::handlers::credenciales::list_credenciales))
        .route("/credenciales/{id}", get(api::handlers::credenciales::get_credencial))
        // Galerias
        .route("/galerias", get(api::handlers::galerias::list_galerias))
        .route("/galerias", post(api::handlers::galerias::create_galeria))
        .route("/galerias/{id}", get(api::handlers::galerias::get_galeria))
        .route("/galerias/{id}", put(api::handlers::galerias::update_galeria))
        .route("/galerias/{id}", delete(api::handlers::galerias::delete_galeria))
        .route("/galerias/{id}/imagenes", post(api::handlers::galerias::upload_imagen))
        .route(
            "/galerias/{id}/imagenes/{imagen_id}",
            delete(api::handlers::galerias::delete_imagen),
        )
        // Usuarios (admin only)
        .route("/usuarios", get(api::handlers::usuarios::list_usuarios))
        .route("/usuarios", post(api::handlers::usuarios::create_usuario))
        .route("/usuarios/{id}", get(api::handlers::usuarios::get_usuario))
        .route("/usuarios/{id}", put(api::handlers::usuarios::update_usuario))
        .route("/usuarios/{id}", delete(api::handlers::usuarios::delete_usuario))
        // Webhooks (external services; unauthenticated by design, always 200
        // once the signature checks out)
        .route("/webhooks/mercadopago", post(api::handlers::webhooks::mercadopago_post))
        .route("/webhooks/mercadopago", get(api::handlers::webhooks::mercadopago_get));

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api", auth_routes.merge(api_routes))
        .with_state(state.clone())
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // CORS, then tracing on the outside
    let cors_layer = create_cors_layer(&state.config)?;
    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects to the database, runs
///    migrations, bootstraps the admin account, and wires the adapters.
/// 2. **Serve**: [`Application::serve`] binds the TCP port and handles
///    requests until the shutdown future resolves.
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await?;

        migrator().run(&pool).await?;

        create_initial_admin_user(&config.admin_email, config.admin_password.as_deref(), &pool).await?;

        let payments = config
            .payment
            .clone()
            .map(|payment_config| payment_providers::create_provider(payment_config, config.http_timeout));
        let images = config
            .image_host
            .clone()
            .map(|image_config| image_host::create_host(image_config, config.http_timeout));

        let state = AppState::builder()
            .db(pool.clone())
            .config(config.clone())
            .maybe_payments(payments)
            .maybe_images(images)
            .build();

        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("fedctl listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
