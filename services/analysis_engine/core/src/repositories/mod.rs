//! Repository trait definitions.
//!
//! These are read-only on purpose: the engine never writes back to the
//! location catalog, warehouse config, or rule store during an evaluation,
//! so there is no `create`/`update` surface to define here.

pub mod location;
pub mod rule;
pub mod warehouse_config;

pub use location::LocationRepository;
pub use rule::RuleRepository;
pub use warehouse_config::WarehouseConfigRepository;
