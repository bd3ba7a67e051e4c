// revshare/src/fraud/grouping.rs
//
// Grouping-key derivation and bulk resolution.
//
// Key = first 24 chars of URL-safe base64 over SHA-256 of the
// lower-cased, pipe-joined tuple (program, partner, rule type[, batch]).
// Detector-created events omit the batch component, so repeated triggers
// of the same rule for the same (program, partner) collapse into one
// pending group. Resolving a group stamps a fresh random batch key onto
// its rows, so later triggers open a new group instead of silently
// merging into the closed one.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::error::Result;
use crate::store::{EventFilter, FraudStore};
use crate::types::{FraudEvent, FraudRuleType, Resolution};

const KEY_LEN: usize = 24;

/// Deterministic cluster key for (program, partner, rule type, batch).
pub fn group_key(
    program_id: &str,
    partner_id: &str,
    rule_type: FraudRuleType,
    batch_id: Option<&str>,
) -> String {
    let mut tuple = format!("{program_id}|{partner_id}|{}", rule_type.key());
    if let Some(batch) = batch_id {
        tuple.push('|');
        tuple.push_str(batch);
    }
    let digest = Sha256::digest(tuple.to_lowercase().as_bytes());
    let mut key = URL_SAFE_NO_PAD.encode(digest);
    key.truncate(KEY_LEN);
    key
}

fn random_batch_id() -> String {
    hex::encode(rand::thread_rng().gen::<[u8; 8]>())
}

/// Outcome of one bulk resolution pass. Failed groups are independently
/// retryable; none is ever left half-updated (the store's per-group
/// update is atomic).
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolutionSummary {
    pub groups_resolved: u64,
    pub events_resolved: u64,
    pub groups_failed: u64,
}

/// Resolve every pending event matching `filter`, group by group.
pub fn resolve_pending(
    fraud: &dyn FraudStore,
    filter: &EventFilter,
    resolved_by: &str,
    reason: Option<&str>,
    now: DateTime<Utc>,
) -> Result<ResolutionSummary> {
    let pending = fraud.pending_events(filter)?;

    let mut groups: HashMap<String, &FraudEvent> = HashMap::new();
    for event in &pending {
        groups.entry(event.group_key.clone()).or_insert(event);
    }

    let mut summary = ResolutionSummary::default();
    for (old_key, sample) in groups {
        let new_key = group_key(
            &sample.program_id,
            &sample.partner_id,
            sample.rule_type,
            Some(&random_batch_id()),
        );
        let resolution = Resolution {
            resolved_by: resolved_by.to_string(),
            resolved_at: now,
            reason: reason.map(String::from),
            new_group_key: new_key,
        };
        match fraud.resolve_group(&old_key, &resolution) {
            Ok(count) => {
                summary.groups_resolved += 1;
                summary.events_resolved += count;
            }
            Err(err) => {
                warn!(group = %old_key, error = %err, "failed to resolve fraud event group");
                summary.groups_failed += 1;
            }
        }
    }
    info!(
        groups = summary.groups_resolved,
        events = summary.events_resolved,
        failed = summary.groups_failed,
        by = resolved_by,
        "fraud event resolution pass complete"
    );
    Ok(summary)
}

// ──────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_deterministic_and_case_insensitive() {
        let a = group_key("prog_a", "par_1", FraudRuleType::SelfReferral, None);
        let b = group_key("PROG_A", "Par_1", FraudRuleType::SelfReferral, None);
        assert_eq!(a, b);
        assert_eq!(a.len(), 24);
    }

    #[test]
    fn key_components_all_matter() {
        let base = group_key("prog_a", "par_1", FraudRuleType::SelfReferral, None);
        assert_ne!(base, group_key("prog_b", "par_1", FraudRuleType::SelfReferral, None));
        assert_ne!(base, group_key("prog_a", "par_2", FraudRuleType::SelfReferral, None));
        assert_ne!(base, group_key("prog_a", "par_1", FraudRuleType::ClickFlood, None));
        assert_ne!(base, group_key("prog_a", "par_1", FraudRuleType::SelfReferral, Some("b1")));
    }

    #[test]
    fn key_is_url_safe() {
        for n in 0..50 {
            let key = group_key(&format!("prog_{n}"), "par", FraudRuleType::QuickConversion, None);
            assert!(key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
    }
}
