//! PostgreSQL implementation of `RuleRepository`.
//!
//! Rules with a `NULL` `warehouse_id` apply to every tenant; rules with a
//! concrete `warehouse_id` only apply to that tenant. Schema validation
//! runs here rather than in `core`, so a malformed rule never
//! reaches `active_rules_in_order` — it is logged and excluded instead of
//! failing the whole query — a `RuleMalformed` row is not fatal.

use async_trait::async_trait;
use sqlx::PgPool;

use analysis_engine_core::domains::rule::{Category, Priority, Rule, RuleType};
use analysis_engine_core::error::{EngineError, Result};
use analysis_engine_core::repositories::rule::RuleRepository;
use analysis_engine_core::rules::schema;

pub struct PgRuleRepository {
    pool: PgPool,
}

impl PgRuleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RuleRow {
    id: String,
    name: String,
    rule_type: String,
    category: String,
    priority: String,
    is_active: bool,
    conditions: serde_json::Value,
    precedence_level: i32,
}

fn parse_rule_type(raw: &str) -> Result<RuleType> {
    match raw {
        "STAGNANT_PALLETS" => Ok(RuleType::StagnantPallets),
        "UNCOORDINATED_LOTS" => Ok(RuleType::UncoordinatedLots),
        "OVERCAPACITY" => Ok(RuleType::Overcapacity),
        "INVALID_LOCATION" => Ok(RuleType::InvalidLocation),
        "DATA_INTEGRITY" => Ok(RuleType::DataIntegrity),
        "LOCATION_SPECIFIC_STAGNANT" => Ok(RuleType::LocationSpecificStagnant),
        "TEMPERATURE_ZONE_MISMATCH" => Ok(RuleType::TemperatureZoneMismatch),
        "LOCATION_MAPPING_ERROR" => Ok(RuleType::LocationMappingError),
        other => Err(EngineError::RuleMalformed(format!("unknown rule_type {other:?}"))),
    }
}

fn parse_category(raw: &str) -> Result<Category> {
    match raw {
        "FLOW_TIME" => Ok(Category::FlowTime),
        "SPACE" => Ok(Category::Space),
        "PRODUCT" => Ok(Category::Product),
        other => Err(EngineError::RuleMalformed(format!("unknown category {other:?}"))),
    }
}

fn parse_priority(raw: &str) -> Result<Priority> {
    match raw {
        "VERY_HIGH" => Ok(Priority::VeryHigh),
        "HIGH" => Ok(Priority::High),
        "MEDIUM" => Ok(Priority::Medium),
        "LOW" => Ok(Priority::Low),
        other => Err(EngineError::RuleMalformed(format!("unknown priority {other:?}"))),
    }
}

impl TryFrom<RuleRow> for Rule {
    type Error = EngineError;

    fn try_from(row: RuleRow) -> Result<Rule> {
        let rule_type = parse_rule_type(&row.rule_type)?;
        let category = parse_category(&row.category)?;
        let priority = parse_priority(&row.priority)?;
        schema::validate(rule_type, &row.conditions).map_err(EngineError::RuleMalformed)?;
        Ok(Rule {
            id: row.id,
            name: row.name,
            rule_type,
            category,
            priority,
            is_active: row.is_active,
            conditions: row.conditions,
            precedence_level: row.precedence_level,
        })
    }
}

#[async_trait]
impl RuleRepository for PgRuleRepository {
    async fn active_rules(&self, tenant_id: &str) -> Result<Vec<Rule>> {
        let rows = sqlx::query_as::<_, RuleRow>(
            r#"
            SELECT id, name, rule_type, category, priority, is_active, conditions, precedence_level
            FROM rules
            WHERE is_active = true AND (warehouse_id IS NULL OR warehouse_id = $1)
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| EngineError::RuleStoreUnavailable(e.to_string()))?;

        let mut rules = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id.clone();
            match Rule::try_from(row) {
                Ok(rule) => rules.push(rule),
                Err(EngineError::RuleMalformed(reason)) => {
                    tracing::warn!(rule_id = %id, reason = %reason, "excluding malformed rule from active set");
                },
                Err(other) => return Err(other),
            }
        }
        Ok(rules)
    }
}
