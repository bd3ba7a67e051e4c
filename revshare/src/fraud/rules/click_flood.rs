// revshare/src/fraud/rules/click_flood.rs
//
// Partner click volume far beyond plausible organic traffic. The stats
// window is supplied by the stats-sync caller; without it the rule fails
// closed.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::fraud::context::RuleContext;
use crate::fraud::registry::parse_config;
use crate::types::{FraudRuleType, RuleOutcome};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub max_clicks_per_day: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self { max_clicks_per_day: 2000 }
    }
}

pub fn default_config() -> Value {
    serde_json::to_value(Config::default()).unwrap_or(Value::Null)
}

pub fn evaluate(ctx: &RuleContext<'_>, config: Option<&Value>) -> Result<RuleOutcome> {
    let cfg: Config = parse_config(FraudRuleType::ClickFlood, config);

    let stats = match ctx.stats {
        Some(s) => s,
        None => return Ok(RuleOutcome::clear()),
    };
    if stats.clicks_last_24h > cfg.max_clicks_per_day {
        return Ok(RuleOutcome::triggered_with(json!({
            "clicks_last_24h": stats.clicks_last_24h,
            "conversions_last_24h": stats.conversions_last_24h,
            "max_clicks_per_day": cfg.max_clicks_per_day,
        })));
    }
    Ok(RuleOutcome::clear())
}
