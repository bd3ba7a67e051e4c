// revshare/src/fraud/conversion.rs
//
// Conversion-event-scoped detector: merge the global catalog with the
// program's override rows, run every enabled rule against the context,
// and bulk-insert one fraud event per triggered rule. A rule that errors
// is logged and treated as not triggered — it never aborts its siblings
// or the persistence of already-collected results.

use tracing::{info, warn};

use crate::error::Result;
use crate::fraud::context::RuleContext;
use crate::fraud::grouping::group_key;
use crate::fraud::registry::{effective_rules, execute};
use crate::store::FraudStore;
use crate::types::{FraudEvent, FraudRuleType, NewFraudEvent, RuleScope};

/// Run all enabled conversion-event rules for the context and persist
/// the triggered ones. Returns the inserted rows (empty = clean event).
pub fn detect_conversion_fraud(
    fraud: &dyn FraudStore,
    ctx: &RuleContext<'_>,
) -> Result<Vec<FraudEvent>> {
    let overrides = fraud.overrides_for_program(&ctx.program_id)?;
    let rules = effective_rules(RuleScope::ConversionEvent, &overrides);

    let mut triggered: Vec<(FraudRuleType, Option<serde_json::Value>)> = Vec::new();
    for rule in &rules {
        match execute(rule.rule_type, ctx, rule.config.as_ref()) {
            Ok(outcome) if outcome.triggered => {
                triggered.push((rule.rule_type, outcome.metadata));
            }
            Ok(_) => {}
            Err(err) => {
                // fault isolation: one broken rule must not stop the rest
                warn!(rule = %rule.rule_type, error = %err, "fraud rule evaluation failed");
            }
        }
    }

    if triggered.is_empty() {
        return Ok(Vec::new());
    }

    let events: Vec<NewFraudEvent> = triggered
        .into_iter()
        .map(|(rule_type, metadata)| NewFraudEvent {
            program_id: ctx.program_id.clone(),
            partner_id: ctx.partner_id.clone(),
            rule_type,
            metadata,
            group_key: group_key(&ctx.program_id, &ctx.partner_id, rule_type, None),
        })
        .collect();

    let inserted = fraud.insert_events(events)?;
    info!(
        program = %ctx.program_id, partner = %ctx.partner_id,
        count = inserted.len(), "conversion fraud events recorded"
    );
    Ok(inserted)
}
