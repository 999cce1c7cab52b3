//! Analysis Engine Infrastructure
//!
//! Postgres-backed implementations of the repository traits `core` defines,
//! plus the concrete `AnalysisEngineService` that wraps the pure `Engine`
//! with the concurrency and timeout semantics.
//!
//! ## Architecture
//!
//! - `repositories/`: PostgreSQL repository implementations
//! - `services/`: the concrete engine service

pub mod error;
pub mod repositories;
pub mod services;

pub use error::to_app_error;
pub use repositories::location::PgLocationRepository;
pub use repositories::rule::PgRuleRepository;
pub use repositories::warehouse_config::PgWarehouseConfigRepository;
pub use services::engine::{AnalysisEngineServiceImpl, ResourceLimits};
