//! Analysis Engine API
//!
//! Thin HTTP surface over `analysis_engine_core`/`analysis_engine_infra`.
//! Authn, routing conventions, pagination, and CORS live outside the core —
//! this crate is the representative boundary only.
//!
//! ## Architecture
//!
//! - `handlers/`: Axum HTTP handlers
//! - `routes/`: Route definitions
//! - `state/`: Shared application state

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::{create_router, routes};

use shared_config::Config;
use shared_db::init_pool;

/// Create the complete application with database initialization. Used for
/// integration tests.
pub async fn create_app(config: Config) -> axum::Router {
    let pool = init_pool(&config.database_url, config.max_connections)
        .await
        .expect("Failed to initialize database pool");
    create_router(pool, &config)
}
