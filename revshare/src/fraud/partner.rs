// revshare/src/fraud/partner.rs
//
// Partner/application-scoped detector.
//
// Two entry points: check_application runs the cheap relational checks
// when a partner applies to a program; audit_partner evaluates the full
// partner-scope rule set (e.g. from a nightly audit). Rule types flagged
// cross_program describe the partner identity, not one program, so their
// triggers fan out as one metadata-rich event per program the partner is
// currently enrolled in.

use serde_json::json;
use tracing::{info, warn};

use crate::error::Result;
use crate::fraud::catalog::rule_info;
use crate::fraud::context::RuleContext;
use crate::fraud::grouping::group_key;
use crate::fraud::registry::{effective_rules, execute};
use crate::store::{FraudStore, PartnerDirectory};
use crate::types::{
    EnrollmentStatus, FraudEvent, FraudRuleType, NewFraudEvent, RuleOutcome, RuleScope,
};

fn event_for(program_id: &str, partner_id: &str, rule_type: FraudRuleType,
             metadata: Option<serde_json::Value>) -> NewFraudEvent {
    NewFraudEvent {
        program_id: program_id.to_string(),
        partner_id: partner_id.to_string(),
        rule_type,
        metadata,
        group_key: group_key(program_id, partner_id, rule_type, None),
    }
}

// ── On application ────────────────────────────────────────────────────────────

/// Checks run when `partner_id` applies to `program_id`: a banned
/// enrollment in any other program, and a payout-method fingerprint
/// already used by a partner enrolled in this program. Duplicate payout
/// findings are recorded once per co-enrolled duplicate, applicant
/// included.
pub fn check_application(
    fraud: &dyn FraudStore,
    directory: &dyn PartnerDirectory,
    program_id: &str,
    partner_id: &str,
) -> Result<Vec<FraudEvent>> {
    let mut events = Vec::new();

    let banned_elsewhere: Vec<String> = directory
        .enrollments(partner_id)?
        .into_iter()
        .filter(|e| e.status == EnrollmentStatus::Banned && e.program_id != program_id)
        .map(|e| e.program_id)
        .collect();
    if !banned_elsewhere.is_empty() {
        events.push(event_for(
            program_id,
            partner_id,
            FraudRuleType::PartnerCrossProgramBan,
            Some(json!({ "banned_programs": banned_elsewhere })),
        ));
    }

    if let Some(fingerprint) = directory.payout_fingerprint(partner_id)? {
        let shared = directory.partners_with_fingerprint(program_id, &fingerprint)?;
        let duplicates: Vec<&String> = shared.iter().filter(|p| *p != partner_id).collect();
        if !duplicates.is_empty() {
            let mut flagged: Vec<String> = duplicates.iter().map(|p| (*p).clone()).collect();
            flagged.push(partner_id.to_string());
            flagged.sort();
            flagged.dedup();
            for flagged_partner in &flagged {
                events.push(event_for(
                    program_id,
                    flagged_partner,
                    FraudRuleType::PartnerDuplicatePayoutMethod,
                    Some(json!({
                        "fingerprint": fingerprint,
                        "matched_partners": flagged,
                    })),
                ));
            }
        }
    }

    if events.is_empty() {
        return Ok(Vec::new());
    }
    let inserted = fraud.insert_events(events)?;
    info!(
        program = program_id, partner = partner_id,
        count = inserted.len(), "application fraud events recorded"
    );
    Ok(inserted)
}

// ── Batch audit ───────────────────────────────────────────────────────────────

/// Evaluate the partner-scope rule set for the context's partner,
/// optionally restricted to `rule_types`. Cross-program triggers fan out
/// to every program the partner is currently (non-banned) enrolled in;
/// everything else scopes to the context's program.
pub fn audit_partner(
    fraud: &dyn FraudStore,
    directory: &dyn PartnerDirectory,
    ctx: &RuleContext<'_>,
    rule_types: Option<&[FraudRuleType]>,
) -> Result<Vec<FraudEvent>> {
    let overrides = fraud.overrides_for_program(&ctx.program_id)?;
    let rules: Vec<_> = effective_rules(RuleScope::Partner, &overrides)
        .into_iter()
        .filter(|r| rule_types.map_or(true, |wanted| wanted.contains(&r.rule_type)))
        .collect();

    let enrolled_programs: Vec<String> = directory
        .enrollments(&ctx.partner_id)?
        .into_iter()
        .filter(|e| e.status != EnrollmentStatus::Banned)
        .map(|e| e.program_id)
        .collect();

    let mut events = Vec::new();
    for rule in &rules {
        let info = rule_info(rule.rule_type);
        let outcome = if info.cross_program {
            relational_outcome(directory, ctx, rule.rule_type)
        } else {
            execute(rule.rule_type, ctx, rule.config.as_ref())
        };
        let outcome = match outcome {
            Ok(o) => o,
            Err(err) => {
                warn!(rule = %rule.rule_type, error = %err, "fraud rule evaluation failed");
                continue;
            }
        };
        if !outcome.triggered {
            continue;
        }
        if info.cross_program {
            for program_id in &enrolled_programs {
                events.push(event_for(
                    program_id,
                    &ctx.partner_id,
                    rule.rule_type,
                    outcome.metadata.clone(),
                ));
            }
        } else {
            events.push(event_for(
                &ctx.program_id,
                &ctx.partner_id,
                rule.rule_type,
                outcome.metadata,
            ));
        }
    }

    if events.is_empty() {
        return Ok(Vec::new());
    }
    let inserted = fraud.insert_events(events)?;
    info!(
        partner = %ctx.partner_id, count = inserted.len(),
        "partner audit fraud events recorded"
    );
    Ok(inserted)
}

/// Truth of the cross-program rule types, computed against the partner
/// directory rather than the context.
fn relational_outcome(
    directory: &dyn PartnerDirectory,
    ctx: &RuleContext<'_>,
    rule_type: FraudRuleType,
) -> anyhow::Result<RuleOutcome> {
    match rule_type {
        FraudRuleType::PartnerCrossProgramBan => {
            let banned: Vec<String> = directory
                .enrollments(&ctx.partner_id)?
                .into_iter()
                .filter(|e| e.status == EnrollmentStatus::Banned)
                .map(|e| e.program_id)
                .collect();
            if banned.is_empty() {
                Ok(RuleOutcome::clear())
            } else {
                Ok(RuleOutcome::triggered_with(json!({ "banned_programs": banned })))
            }
        }
        FraudRuleType::PartnerDuplicatePayoutMethod => {
            let fingerprint = match directory.payout_fingerprint(&ctx.partner_id)? {
                Some(f) => f,
                None => return Ok(RuleOutcome::clear()),
            };
            let mut matched: Vec<String> = Vec::new();
            for enrollment in directory.enrollments(&ctx.partner_id)? {
                for partner in
                    directory.partners_with_fingerprint(&enrollment.program_id, &fingerprint)?
                {
                    if partner != ctx.partner_id && !matched.contains(&partner) {
                        matched.push(partner);
                    }
                }
            }
            if matched.is_empty() {
                Ok(RuleOutcome::clear())
            } else {
                matched.sort();
                Ok(RuleOutcome::triggered_with(json!({
                    "fingerprint": fingerprint,
                    "matched_partners": matched,
                })))
            }
        }
        // Non-relational types never reach this path.
        _ => Ok(RuleOutcome::clear()),
    }
}
