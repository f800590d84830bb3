pub mod config;
pub mod db;
pub mod dto;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod service;
pub mod validation;

use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use sqlx::{postgres::Postgres, Pool};

use config::Config;
use db::init_db_pool;
use service::mail::Mailer;

pub type PGPool = Pool<Postgres>;

/// Token lifetimes in seconds.
pub const ACCESS_TOKEN_EXP: i64 = 60 * 60;
pub const REFRESH_TOKEN_EXP: i64 = 5 * 24 * 60 * 60;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    service::log::init_logger();
    let config = Config::from_env();
    let pool: PGPool = init_db_pool(&config.database_url).await;
    let mailer = Mailer::from_config(&config.mail).unwrap_or_else(|e| {
        panic!("Failed to configure mail transport: {}", e);
    });
    let bind_addr = (config.host.clone(), config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(mailer.clone()))
            .wrap(service::auth::AuthMiddleware)
            .wrap(service::log::LoggerMiddleware)
            .service(web::scope("/auth").configure(handlers::auth::config))
            .service(web::scope("/events").configure(handlers::event::config))
            .service(web::scope("/users").configure(handlers::user::config))
    })
    .bind(bind_addr)?
    .run()
    .await
}
