pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

#[cfg(test)]
mod test_support;

use std::error::Error;
use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use application::order_service::OrderService;
pub use config::Config;
pub use db::{create_pool, DbPool};

use infrastructure::{DieselOrderRepository, HttpAccountDirectory, HttpProductCatalog};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::orders::post_order,
        handlers::orders::get_order,
        handlers::orders::get_account_orders,
    ),
    tags((name = "orders", description = "Order composition and read-back"))
)]
pub struct ApiDoc;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

/// Wires the order service to Postgres and the two upstream HTTP services.
pub fn build_order_service(pool: DbPool, config: &Config) -> OrderService {
    let http = reqwest::Client::new();
    OrderService::new(
        Arc::new(DieselOrderRepository::new(pool)),
        Arc::new(HttpAccountDirectory::new(
            http.clone(),
            config.account_service_url.clone(),
        )),
        Arc::new(HttpProductCatalog::new(
            http,
            config.catalog_service_url.clone(),
        )),
        config.upstream_timeout,
    )
}

/// Registers the order routes. Expects `web::Data<OrderService>` in app data.
///
/// A path segment that does not parse, such as a malformed order id, is a
/// bad request rather than a missing route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PathConfig::default().error_handler(|err, _req| {
        errors::AppError::BadRequest(err.to_string()).into()
    }))
    .route("/orders", web::post().to(handlers::orders::post_order))
        .route("/orders/{id}", web::get().to(handlers::orders::get_order))
        .route(
            "/accounts/{account_id}/orders",
            web::get().to(handlers::orders::get_account_orders),
        );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    service: OrderService,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let service = web::Data::new(service);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(Logger::default())
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
