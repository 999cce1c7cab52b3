use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL (location/rule store).
    pub database_url: String,

    /// Server host address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Postgres pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Maximum concurrent evaluations.
    #[serde(default = "default_engine_concurrency")]
    pub engine_concurrency: usize,

    /// Per-evaluation budget in milliseconds.
    #[serde(default = "default_evaluation_timeout_ms")]
    pub evaluation_timeout_ms: u64,

    /// Per-rule budget in milliseconds.
    #[serde(default = "default_rule_timeout_ms")]
    pub rule_timeout_ms: u64,

    /// Snapshots with more rows than this are rejected before evaluation starts.
    #[serde(default = "default_max_snapshot_rows")]
    pub max_snapshot_rows: usize,

    /// Context resolver minimum coverage ratio.
    #[serde(default = "default_resolver_min_ratio")]
    pub resolver_min_ratio: f64,

    /// Context resolver minimum absolute match count.
    #[serde(default = "default_resolver_min_matches")]
    pub resolver_min_matches: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    10
}

fn default_engine_concurrency() -> usize {
    8
}

fn default_evaluation_timeout_ms() -> u64 {
    30_000
}

fn default_rule_timeout_ms() -> u64 {
    5_000
}

fn default_max_snapshot_rows() -> usize {
    250_000
}

fn default_resolver_min_ratio() -> f64 {
    0.30
}

fn default_resolver_min_matches() -> usize {
    5
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();

        let builder = config::Config::builder()
            .set_default("database_url", "")?
            .set_default("host", default_host())?
            .set_default("port", default_port() as i64)?
            .set_default("max_connections", default_max_connections() as i64)?
            .set_default("engine_concurrency", default_engine_concurrency() as i64)?
            .set_default("evaluation_timeout_ms", default_evaluation_timeout_ms() as i64)?
            .set_default("rule_timeout_ms", default_rule_timeout_ms() as i64)?
            .set_default("max_snapshot_rows", default_max_snapshot_rows() as i64)?
            .set_default("resolver_min_ratio", default_resolver_min_ratio())?
            .set_default("resolver_min_matches", default_resolver_min_matches() as i64)?
            .add_source(config::Environment::default());

        builder.build()?.try_deserialize::<Config>()
    }
}
