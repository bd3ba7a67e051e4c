// revshare/src/store/mem.rs
//
// In-memory reference implementation of every store trait.
// parking_lot::RwLock over plain collections — single-process, lock
// consistent, so the resolve_group bulk update is trivially atomic.
// Used by the test suite; also handy as a fixture for downstream crates.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{bail, Result};
use chrono::Utc;
use parking_lot::RwLock;

use crate::store::{
    CommissionQuery, CommissionStore, DisposableDomainSet, EventFilter, FraudStore,
    PartnerDirectory, RewardStore,
};
use crate::types::{
    Commission, CommissionStatus, Enrollment, EventType, FraudEvent, FraudEventStatus,
    FraudRuleOverride, NewCommission, NewFraudEvent, Resolution, Reward,
};

#[derive(Default)]
pub struct MemStore {
    rewards: RwLock<Vec<Reward>>,
    commissions: RwLock<Vec<Commission>>,
    overrides: RwLock<Vec<FraudRuleOverride>>,
    events: RwLock<Vec<FraudEvent>>,
    enrollments: RwLock<Vec<Enrollment>>,
    fingerprints: RwLock<Vec<(String, String)>>, // (partner_id, fingerprint)
    disposable_domains: RwLock<HashSet<String>>,
    next_id: AtomicU64,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_id(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // ── Seeding helpers (not part of the traits) ─────────────────────────────

    pub fn add_reward(&self, reward: Reward) {
        self.rewards.write().push(reward);
    }

    /// Insert a fully-formed commission row, e.g. backdated history.
    pub fn seed_commission(&self, commission: Commission) {
        self.commissions.write().push(commission);
    }

    pub fn add_override(&self, rule_override: FraudRuleOverride) {
        self.overrides.write().push(rule_override);
    }

    pub fn add_enrollment(&self, enrollment: Enrollment) {
        self.enrollments.write().push(enrollment);
    }

    pub fn set_payout_fingerprint(&self, partner_id: &str, fingerprint: &str) {
        let mut fps = self.fingerprints.write();
        fps.retain(|(p, _)| p != partner_id);
        fps.push((partner_id.to_string(), fingerprint.to_string()));
    }

    pub fn add_disposable_domain(&self, domain: &str) {
        self.disposable_domains.write().insert(domain.to_ascii_lowercase());
    }

    pub fn all_events(&self) -> Vec<FraudEvent> {
        self.events.read().clone()
    }

    pub fn all_commissions(&self) -> Vec<Commission> {
        self.commissions.read().clone()
    }
}

impl RewardStore for MemStore {
    fn candidate_rewards(&self, program_id: &str, event_type: EventType)
        -> Result<Vec<Reward>>
    {
        Ok(self
            .rewards
            .read()
            .iter()
            .filter(|r| r.program_id == program_id && r.event_type == event_type)
            .cloned()
            .collect())
    }
}

impl CommissionStore for MemStore {
    fn sum_earnings(&self, query: &CommissionQuery) -> Result<i64> {
        Ok(self
            .commissions
            .read()
            .iter()
            .filter(|c| {
                c.program_id == query.program_id
                    && c.partner_id == query.partner_id
                    && c.event_type == query.event_type
                    && query.statuses.contains(&c.status)
                    && query.created_after.map_or(true, |t| c.created_at >= t)
            })
            .map(|c| c.earnings)
            .sum())
    }

    fn earliest_commission(
        &self,
        program_id: &str,
        partner_id: &str,
        customer_id: &str,
        event_type: EventType,
    ) -> Result<Option<Commission>> {
        Ok(self
            .commissions
            .read()
            .iter()
            .filter(|c| {
                c.program_id == program_id
                    && c.partner_id == partner_id
                    && c.customer_id.as_deref() == Some(customer_id)
                    && c.event_type == event_type
            })
            .min_by_key(|c| c.created_at)
            .cloned())
    }

    fn insert(&self, new: NewCommission) -> Result<Commission> {
        let mut rows = self.commissions.write();
        if let Some(invoice) = &new.invoice_id {
            let clash = rows
                .iter()
                .any(|c| c.program_id == new.program_id && c.invoice_id.as_deref() == Some(invoice));
            if clash {
                bail!("duplicate invoice id {invoice} in program {}", new.program_id);
            }
        }
        let row = Commission {
            id: self.fresh_id("com"),
            program_id: new.program_id,
            partner_id: new.partner_id,
            customer_id: new.customer_id,
            link_id: new.link_id,
            event_id: new.event_id,
            invoice_id: new.invoice_id,
            event_type: new.event_type,
            quantity: new.quantity,
            sale_amount: new.sale_amount,
            earnings: new.earnings,
            currency: new.currency,
            status: CommissionStatus::Pending,
            created_at: Utc::now(),
        };
        rows.push(row.clone());
        Ok(row)
    }
}

fn matches(filter: &EventFilter, event: &FraudEvent) -> bool {
    filter.program_id.as_deref().map_or(true, |p| event.program_id == p)
        && filter.partner_id.as_deref().map_or(true, |p| event.partner_id == p)
        && filter.rule_type.map_or(true, |t| event.rule_type == t)
        && filter.group_key.as_deref().map_or(true, |k| event.group_key == k)
}

impl FraudStore for MemStore {
    fn overrides_for_program(&self, program_id: &str) -> Result<Vec<FraudRuleOverride>> {
        Ok(self
            .overrides
            .read()
            .iter()
            .filter(|o| o.program_id == program_id)
            .cloned()
            .collect())
    }

    fn insert_events(&self, events: Vec<NewFraudEvent>) -> Result<Vec<FraudEvent>> {
        let now = Utc::now();
        let mut rows = self.events.write();
        let inserted: Vec<FraudEvent> = events
            .into_iter()
            .map(|e| FraudEvent {
                id: self.fresh_id("fev"),
                program_id: e.program_id,
                partner_id: e.partner_id,
                rule_type: e.rule_type,
                metadata: e.metadata,
                group_key: e.group_key,
                status: FraudEventStatus::Pending,
                resolved_by: None,
                resolved_at: None,
                resolution_reason: None,
                created_at: now,
            })
            .collect();
        rows.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    fn pending_events(&self, filter: &EventFilter) -> Result<Vec<FraudEvent>> {
        Ok(self
            .events
            .read()
            .iter()
            .filter(|e| e.status == FraudEventStatus::Pending && matches(filter, e))
            .cloned()
            .collect())
    }

    fn resolve_group(&self, group_key: &str, resolution: &Resolution) -> Result<u64> {
        let mut rows = self.events.write();
        let mut updated = 0u64;
        for event in rows.iter_mut() {
            if event.status == FraudEventStatus::Pending && event.group_key == group_key {
                event.status = FraudEventStatus::Resolved;
                event.resolved_by = Some(resolution.resolved_by.clone());
                event.resolved_at = Some(resolution.resolved_at);
                event.resolution_reason = resolution.reason.clone();
                event.group_key = resolution.new_group_key.clone();
                updated += 1;
            }
        }
        Ok(updated)
    }
}

impl PartnerDirectory for MemStore {
    fn enrollments(&self, partner_id: &str) -> Result<Vec<Enrollment>> {
        Ok(self
            .enrollments
            .read()
            .iter()
            .filter(|e| e.partner_id == partner_id)
            .cloned()
            .collect())
    }

    fn payout_fingerprint(&self, partner_id: &str) -> Result<Option<String>> {
        Ok(self
            .fingerprints
            .read()
            .iter()
            .find(|(p, _)| p == partner_id)
            .map(|(_, f)| f.clone()))
    }

    fn partners_with_fingerprint(&self, program_id: &str, fingerprint: &str)
        -> Result<Vec<String>>
    {
        let fps = self.fingerprints.read();
        let enrollments = self.enrollments.read();
        let enrolled: HashSet<&str> = enrollments
            .iter()
            .filter(|e| e.program_id == program_id)
            .map(|e| e.partner_id.as_str())
            .collect();
        Ok(fps
            .iter()
            .filter(|(p, f)| f == fingerprint && enrolled.contains(p.as_str()))
            .map(|(p, _)| p.clone())
            .collect())
    }
}

impl DisposableDomainSet for MemStore {
    fn contains(&self, domain: &str) -> bool {
        self.disposable_domains
            .read()
            .contains(&domain.to_ascii_lowercase())
    }
}
