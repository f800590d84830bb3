pub mod event;
pub mod notifications;
pub mod user;

use crate::PGPool;
use log::info;
use sqlx::postgres::PgPoolOptions;

pub async fn init_db_pool(db_url: &str) -> PGPool {
    let pool: PGPool = PgPoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .unwrap_or_else(|e| {
            panic!("Failed to connect to postgres: {:?}", e);
        });
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .unwrap_or_else(|e| {
            panic!("Failed to run migrations: {:?}", e);
        });
    info!("connected to postgres");
    pool
}
