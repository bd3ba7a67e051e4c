// revshare/src/fraud/rules/quick_conversion.rs
//
// Conversion landed implausibly soon after the referral click — a human
// does not read a landing page, sign up and pay in a handful of seconds.
// A click recorded after the conversion is a data integrity error and is
// surfaced as Err; the detector's per-rule isolation contains it.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::fraud::context::RuleContext;
use crate::fraud::registry::parse_config;
use crate::types::{FraudRuleType, RuleOutcome};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub min_seconds: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self { min_seconds: 30 }
    }
}

pub fn default_config() -> Value {
    serde_json::to_value(Config::default()).unwrap_or(Value::Null)
}

pub fn evaluate(ctx: &RuleContext<'_>, config: Option<&Value>) -> Result<RuleOutcome> {
    let cfg: Config = parse_config(FraudRuleType::QuickConversion, config);

    let clicked = ctx.click.as_ref().and_then(|c| c.occurred_at);
    let converted = ctx.conversion.as_ref().and_then(|c| c.occurred_at);
    let (clicked, converted) = match (clicked, converted) {
        (Some(c), Some(v)) => (c, v),
        _ => return Ok(RuleOutcome::clear()),
    };

    if clicked > converted {
        bail!(
            "click at {clicked} recorded after conversion at {converted} \
             for partner {}",
            ctx.partner_id
        );
    }

    let elapsed = (converted - clicked).num_seconds();
    if elapsed < cfg.min_seconds {
        return Ok(RuleOutcome::triggered_with(json!({
            "seconds_between": elapsed,
            "min_seconds": cfg.min_seconds,
        })));
    }
    Ok(RuleOutcome::clear())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fraud::context::{ClickInfo, ConversionInfo};
    use chrono::{Duration, Utc};

    fn ctx_with_gap(seconds: i64) -> RuleContext<'static> {
        let clicked = Utc::now() - Duration::hours(1);
        let mut ctx = RuleContext::new("prog_a", "par_1");
        ctx.click = Some(ClickInfo { occurred_at: Some(clicked), ..Default::default() });
        ctx.conversion = Some(ConversionInfo {
            occurred_at: Some(clicked + Duration::seconds(seconds)),
            ..Default::default()
        });
        ctx
    }

    #[test]
    fn fast_conversion_triggers() {
        let out = evaluate(&ctx_with_gap(5), None).unwrap();
        assert!(out.triggered);
        assert_eq!(out.metadata.unwrap()["seconds_between"], 5);
    }

    #[test]
    fn slow_conversion_does_not() {
        assert!(!evaluate(&ctx_with_gap(300), None).unwrap().triggered);
    }

    #[test]
    fn threshold_comes_from_config() {
        let cfg = json!({ "min_seconds": 600 });
        assert!(evaluate(&ctx_with_gap(300), Some(&cfg)).unwrap().triggered);
    }

    #[test]
    fn click_after_conversion_is_an_error() {
        assert!(evaluate(&ctx_with_gap(-10), None).is_err());
    }

    #[test]
    fn missing_click_fails_closed() {
        let mut ctx = ctx_with_gap(5);
        ctx.click = None;
        assert!(!evaluate(&ctx, None).unwrap().triggered);
    }
}
