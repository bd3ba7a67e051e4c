// revshare/src/types.rs
//
// Shared domain types flowing through the reward and fraud engines.
// Row shapes mirror the external relational store; the store itself
// (queries, constraints, transactions) lives behind the traits in store/.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Event kinds ───────────────────────────────────────────────────────────────

/// What a partner is being paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Click,
    Lead,
    Sale,
    Custom,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Click => write!(f, "click"),
            Self::Lead => write!(f, "lead"),
            Self::Sale => write!(f, "sale"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

// ── Rewards ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardStructure {
    /// Fixed amount in cents, multiplied by event quantity.
    Flat,
    /// Hundredths of a percent of the gross sale amount (1000 = 10.00%).
    Percentage,
}

/// Logical combinator for a modifier condition group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Combinator {
    And,
    Or,
}

/// Which side of the reward context a condition reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionEntity {
    Customer,
    Sale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    EqualsTo,
    NotEquals,
    In,
    NotIn,
    StartsWith,
    EndsWith,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

/// One predicate over a context field. Type mismatches evaluate to false,
/// never to an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub entity: ConditionEntity,
    pub attribute: String,
    pub operator: ConditionOperator,
    pub value: serde_json::Value,
}

/// Ordered override: the first group whose conditions pass replaces the
/// reward's base amount with `amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierGroup {
    pub combinator: Combinator,
    pub conditions: Vec<Condition>,
    /// Replacement amount, same unit as the reward's base amount.
    pub amount: i64,
}

/// A program's payout policy for one event type.
///
/// `partner_ids` empty = program-wide; non-empty = only for those partners.
/// A base `amount` of 0 means "no reward" and short-circuits resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reward {
    pub id: String,
    pub program_id: String,
    pub event_type: EventType,
    pub structure: RewardStructure,
    /// Cents for flat rewards, hundredths of a percent for percentage.
    pub amount: i64,
    /// Months a customer keeps generating commissions. None = unlimited,
    /// Some(0) = first occurrence only.
    pub max_duration_months: Option<u32>,
    /// Lifetime earnings cap in cents for (program, partner, event type).
    pub max_amount: Option<i64>,
    /// Rolling-window payout cap in cents, paired with `payout_reset_months`.
    pub max_total_payout: Option<i64>,
    pub payout_reset_months: Option<u32>,
    pub is_default: bool,
    pub partner_ids: Vec<String>,
    pub modifiers: Vec<ModifierGroup>,
}

impl Reward {
    pub fn is_program_wide(&self) -> bool {
        self.partner_ids.is_empty()
    }
}

// ── Commissions ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionStatus {
    Pending,
    Processed,
    Paid,
    Canceled,
    Fraud,
    Refunded,
}

impl CommissionStatus {
    /// Statuses that count toward earnings sums and caps.
    pub const NON_VOIDED: [CommissionStatus; 3] =
        [Self::Pending, Self::Processed, Self::Paid];
}

/// One monetary reward instance tied to one event occurrence.
/// Immutable once created except for status transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commission {
    pub id: String,
    pub program_id: String,
    pub partner_id: String,
    pub customer_id: Option<String>,
    pub link_id: Option<String>,
    pub event_id: Option<String>,
    /// Dedup key within a program (store-enforced uniqueness).
    pub invoice_id: Option<String>,
    pub event_type: EventType,
    pub quantity: i64,
    /// Gross sale amount in cents; 0 for non-sale events.
    pub sale_amount: i64,
    /// Computed partner earnings in cents; never negative.
    pub earnings: i64,
    pub currency: String,
    pub status: CommissionStatus,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for a commission row; the store assigns id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCommission {
    pub program_id: String,
    pub partner_id: String,
    pub customer_id: Option<String>,
    pub link_id: Option<String>,
    pub event_id: Option<String>,
    pub invoice_id: Option<String>,
    pub event_type: EventType,
    pub quantity: i64,
    pub sale_amount: i64,
    pub earnings: i64,
    pub currency: String,
}

// ── Fraud rules ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudRuleType {
    SelfReferral,
    DisposableEmail,
    QuickConversion,
    PartnerProfile,
    ClickFlood,
    PartnerCrossProgramBan,
    PartnerDuplicatePayoutMethod,
}

impl FraudRuleType {
    pub const ALL: [FraudRuleType; 7] = [
        Self::SelfReferral,
        Self::DisposableEmail,
        Self::QuickConversion,
        Self::PartnerProfile,
        Self::ClickFlood,
        Self::PartnerCrossProgramBan,
        Self::PartnerDuplicatePayoutMethod,
    ];

    /// Stable storage key; also the grouping-key component.
    pub fn key(&self) -> &'static str {
        match self {
            Self::SelfReferral => "self_referral",
            Self::DisposableEmail => "disposable_email",
            Self::QuickConversion => "quick_conversion",
            Self::PartnerProfile => "partner_profile",
            Self::ClickFlood => "click_flood",
            Self::PartnerCrossProgramBan => "partner_cross_program_ban",
            Self::PartnerDuplicatePayoutMethod => "partner_duplicate_payout_method",
        }
    }
}

impl std::fmt::Display for FraudRuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Whether a rule evaluates one conversion event or the partner itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleScope {
    ConversionEvent,
    Partner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low risk",
            Self::Medium => "Medium risk",
            Self::High => "High risk",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Static catalog entry for one rule type. See `fraud::catalog`.
#[derive(Debug, Clone)]
pub struct FraudRuleInfo {
    pub rule_type: FraudRuleType,
    pub name: &'static str,
    pub description: &'static str,
    pub scope: RuleScope,
    pub severity: Option<Severity>,
    /// True only when the rule's truth is a property of the partner
    /// identity across all programs, not one program.
    pub cross_program: bool,
    pub configurable: bool,
}

/// Per-program override row: flips a rule off or replaces its config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudRuleOverride {
    pub program_id: String,
    pub rule_type: FraudRuleType,
    pub enabled: bool,
    pub config: Option<serde_json::Value>,
}

// ── Fraud events ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudEventStatus {
    Pending,
    Resolved,
}

/// A persisted record that a rule triggered for a (program, partner) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudEvent {
    pub id: String,
    pub program_id: String,
    pub partner_id: String,
    pub rule_type: FraudRuleType,
    pub metadata: Option<serde_json::Value>,
    /// Deterministic cluster key; see `fraud::grouping`.
    pub group_key: String,
    pub status: FraudEventStatus,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFraudEvent {
    pub program_id: String,
    pub partner_id: String,
    pub rule_type: FraudRuleType,
    pub metadata: Option<serde_json::Value>,
    pub group_key: String,
}

/// Bulk-update payload applied to every event sharing one group key.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub resolved_by: String,
    pub resolved_at: DateTime<Utc>,
    pub reason: Option<String>,
    /// Fresh key (with a random batch component) stamped on the closed
    /// group so future triggers open a new one.
    pub new_group_key: String,
}

// ── Partner directory ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Active,
    Pending,
    Banned,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub program_id: String,
    pub partner_id: String,
    pub status: EnrollmentStatus,
}

// ── Rule outcome ──────────────────────────────────────────────────────────────

/// Result of one rule evaluation.
#[derive(Debug, Clone, Default)]
pub struct RuleOutcome {
    pub triggered: bool,
    pub metadata: Option<serde_json::Value>,
}

impl RuleOutcome {
    pub fn clear() -> Self {
        Self { triggered: false, metadata: None }
    }

    pub fn triggered_with(metadata: serde_json::Value) -> Self {
        Self { triggered: true, metadata: Some(metadata) }
    }
}
