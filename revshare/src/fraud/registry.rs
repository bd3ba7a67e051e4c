// revshare/src/fraud/registry.rs
//
// Rule definitions, registry and executor. The registry is an exhaustive
// match over FraudRuleType, so a new rule type without an evaluator is a
// compile error rather than a runtime "unknown rule" fault. Rule types
// whose truth is computed relationally by the partner detector are still
// registered, with a stub evaluator that never triggers.

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::fraud::context::RuleContext;
use crate::fraud::rules;
use crate::types::{FraudRuleOverride, FraudRuleType, RuleOutcome, RuleScope};

pub type EvalFn = fn(&RuleContext<'_>, Option<&Value>) -> Result<RuleOutcome>;

/// One registered rule: its type, built-in default config (None for
/// non-configurable rules) and evaluator.
pub struct RuleDefinition {
    pub rule_type: FraudRuleType,
    pub default_config: Option<Value>,
    pub evaluate: EvalFn,
}

/// Look up the definition for a rule type. Total by construction.
pub fn definition(rule_type: FraudRuleType) -> RuleDefinition {
    use FraudRuleType::*;
    let (default_config, evaluate): (Option<Value>, EvalFn) = match rule_type {
        SelfReferral => (None, rules::self_referral::evaluate),
        DisposableEmail => (
            Some(rules::disposable_email::default_config()),
            rules::disposable_email::evaluate,
        ),
        QuickConversion => (
            Some(rules::quick_conversion::default_config()),
            rules::quick_conversion::evaluate,
        ),
        PartnerProfile => (
            Some(rules::partner_profile::default_config()),
            rules::partner_profile::evaluate,
        ),
        ClickFlood => (
            Some(rules::click_flood::default_config()),
            rules::click_flood::evaluate,
        ),
        // Relational truths, computed by the partner detector.
        PartnerCrossProgramBan => (None, relational_stub),
        PartnerDuplicatePayoutMethod => (None, relational_stub),
    };
    RuleDefinition { rule_type, default_config, evaluate }
}

fn relational_stub(_ctx: &RuleContext<'_>, _config: Option<&Value>) -> Result<RuleOutcome> {
    Ok(RuleOutcome::clear())
}

/// Execute one rule against a context, with the per-program config when
/// one is stored, otherwise the rule's built-in default.
pub fn execute(
    rule_type: FraudRuleType,
    ctx: &RuleContext<'_>,
    config: Option<&Value>,
) -> Result<RuleOutcome> {
    let def = definition(rule_type);
    let effective = config.or(def.default_config.as_ref());
    (def.evaluate)(ctx, effective)
}

/// Deserialize a rule's config, degrading to the built-in default when
/// the persisted JSON is absent or fails validation. Malformed config is
/// a per-rule configuration error: logged, never fatal for the batch.
pub fn parse_config<T>(rule_type: FraudRuleType, config: Option<&Value>) -> T
where
    T: DeserializeOwned + Default,
{
    match config {
        None => T::default(),
        Some(value) => match serde_json::from_value(value.clone()) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(rule = %rule_type, error = %err, "malformed rule config, using default");
                T::default()
            }
        },
    }
}

// ── Default/override merging ──────────────────────────────────────────────────

/// A rule as it applies to one program after merging overrides.
#[derive(Debug, Clone)]
pub struct EffectiveRule {
    pub rule_type: FraudRuleType,
    pub config: Option<Value>,
}

/// Merge the global catalog for `scope` with a program's override rows.
/// Pure function of its inputs: an override replaces enabled/config,
/// absence of one means enabled with the built-in default config.
pub fn effective_rules(scope: RuleScope, overrides: &[FraudRuleOverride]) -> Vec<EffectiveRule> {
    crate::fraud::catalog::rules_for_scope(scope)
        .into_iter()
        .filter_map(|info| {
            let rule_override = overrides.iter().find(|o| o.rule_type == info.rule_type);
            match rule_override {
                Some(o) if !o.enabled => None,
                Some(o) => Some(EffectiveRule {
                    rule_type: info.rule_type,
                    config: o.config.clone(),
                }),
                None => Some(EffectiveRule { rule_type: info.rule_type, config: None }),
            }
        })
        .collect()
}

// ──────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registry_is_total() {
        for rule_type in FraudRuleType::ALL {
            let def = definition(rule_type);
            assert_eq!(def.rule_type, rule_type);
        }
    }

    #[test]
    fn relational_rules_never_trigger_via_registry() {
        let ctx = RuleContext::new("prog_a", "par_1");
        let out = execute(FraudRuleType::PartnerCrossProgramBan, &ctx, None).unwrap();
        assert!(!out.triggered);
    }

    #[test]
    fn override_disables_rule() {
        let overrides = vec![FraudRuleOverride {
            program_id: "prog_a".into(),
            rule_type: FraudRuleType::DisposableEmail,
            enabled: false,
            config: None,
        }];
        let rules = effective_rules(RuleScope::ConversionEvent, &overrides);
        assert!(rules.iter().all(|r| r.rule_type != FraudRuleType::DisposableEmail));
        assert!(rules.iter().any(|r| r.rule_type == FraudRuleType::SelfReferral));
    }

    #[test]
    fn override_config_is_carried() {
        let overrides = vec![FraudRuleOverride {
            program_id: "prog_a".into(),
            rule_type: FraudRuleType::QuickConversion,
            enabled: true,
            config: Some(json!({ "min_seconds": 120 })),
        }];
        let rules = effective_rules(RuleScope::ConversionEvent, &overrides);
        let quick = rules
            .iter()
            .find(|r| r.rule_type == FraudRuleType::QuickConversion)
            .unwrap();
        assert_eq!(quick.config, Some(json!({ "min_seconds": 120 })));
    }

    #[test]
    fn malformed_config_degrades_to_default() {
        let cfg: crate::fraud::rules::quick_conversion::Config =
            parse_config(FraudRuleType::QuickConversion, Some(&json!({ "min_seconds": "fast" })));
        assert_eq!(cfg.min_seconds, crate::fraud::rules::quick_conversion::Config::default().min_seconds);
    }
}
