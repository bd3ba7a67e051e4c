// revshare/src/store/mod.rs
//
// Narrow interfaces over the external collaborators: the relational
// store (rewards, commissions, fraud rows), the partner directory, and
// the disposable-email-domain set. The engine is generic over these;
// production wires them to SQL, tests use the in-memory implementation.
//
// Trait methods return anyhow::Result — collaborator backends are
// heterogeneous and their failures are opaque to this crate. The public
// engine API wraps them into Error::Store at the boundary.

pub mod mem;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::types::{
    Commission, CommissionStatus, Enrollment, EventType, FraudEvent, FraudRuleOverride,
    FraudRuleType, NewCommission, NewFraudEvent, Resolution, Reward,
};

// ── Queries ───────────────────────────────────────────────────────────────────

/// Earnings aggregation filter. `created_after: None` = lifetime.
#[derive(Debug, Clone)]
pub struct CommissionQuery {
    pub program_id: String,
    pub partner_id: String,
    pub event_type: EventType,
    pub statuses: Vec<CommissionStatus>,
    pub created_after: Option<DateTime<Utc>>,
}

/// Fraud-event filter; all fields are conjunctive, None = no constraint.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub program_id: Option<String>,
    pub partner_id: Option<String>,
    pub rule_type: Option<FraudRuleType>,
    pub group_key: Option<String>,
}

// ── Stores ────────────────────────────────────────────────────────────────────

pub trait RewardStore: Send + Sync {
    /// All rewards for (program, event type): program-wide rows plus rows
    /// carrying explicit partner associations. The resolver filters by
    /// partner; the store does not.
    fn candidate_rewards(&self, program_id: &str, event_type: EventType)
        -> Result<Vec<Reward>>;
}

pub trait CommissionStore: Send + Sync {
    /// Sum of `earnings` over rows matching the query, in cents.
    fn sum_earnings(&self, query: &CommissionQuery) -> Result<i64>;

    /// The partner's earliest commission for one customer and event type,
    /// any status. Anchors `max_duration` windows.
    fn earliest_commission(
        &self,
        program_id: &str,
        partner_id: &str,
        customer_id: &str,
        event_type: EventType,
    ) -> Result<Option<Commission>>;

    /// Insert one commission row. Uniqueness of (program, invoice id) is
    /// this store's constraint; violations surface as errors.
    fn insert(&self, commission: NewCommission) -> Result<Commission>;
}

pub trait FraudStore: Send + Sync {
    fn overrides_for_program(&self, program_id: &str) -> Result<Vec<FraudRuleOverride>>;

    fn insert_events(&self, events: Vec<NewFraudEvent>) -> Result<Vec<FraudEvent>>;

    fn pending_events(&self, filter: &EventFilter) -> Result<Vec<FraudEvent>>;

    /// Atomically mark every pending event sharing `group_key` resolved,
    /// stamping the resolution fields and the replacement key. Returns the
    /// number of rows updated. Must not leave a group half-updated.
    fn resolve_group(&self, group_key: &str, resolution: &Resolution) -> Result<u64>;
}

pub trait PartnerDirectory: Send + Sync {
    /// Every enrollment the partner holds, across all programs.
    fn enrollments(&self, partner_id: &str) -> Result<Vec<Enrollment>>;

    /// Stable hash of the partner's payout instrument (PayPal email,
    /// bank account, ...). None when no payout method is on file.
    fn payout_fingerprint(&self, partner_id: &str) -> Result<Option<String>>;

    /// Partners enrolled in `program_id` whose payout fingerprint equals
    /// `fingerprint`, including the queried partner when enrolled.
    fn partners_with_fingerprint(&self, program_id: &str, fingerprint: &str)
        -> Result<Vec<String>>;
}

/// Membership test over the disposable-email-domain corpus.
pub trait DisposableDomainSet: Send + Sync {
    fn contains(&self, domain: &str) -> bool;
}
