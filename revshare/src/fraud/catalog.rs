// revshare/src/fraud/catalog.rs
//
// Static rule catalog and severity aggregation. The catalog is total
// over FraudRuleType — adding a variant without a catalog entry is a
// compile error, not a runtime lookup failure.

use crate::types::{FraudRuleInfo, FraudRuleType, RuleScope, Severity};

/// Catalog entry for one rule type.
pub fn rule_info(rule_type: FraudRuleType) -> FraudRuleInfo {
    use FraudRuleType::*;
    match rule_type {
        SelfReferral => FraudRuleInfo {
            rule_type,
            name: "Self-referral",
            description: "Customer identity overlaps with the referring partner",
            scope: RuleScope::ConversionEvent,
            severity: Some(Severity::High),
            cross_program: false,
            configurable: false,
        },
        DisposableEmail => FraudRuleInfo {
            rule_type,
            name: "Disposable customer email",
            description: "Customer signed up with a throwaway email domain",
            scope: RuleScope::ConversionEvent,
            severity: Some(Severity::Medium),
            cross_program: false,
            configurable: true,
        },
        QuickConversion => FraudRuleInfo {
            rule_type,
            name: "Suspiciously fast conversion",
            description: "Conversion landed implausibly soon after the referral click",
            scope: RuleScope::ConversionEvent,
            severity: Some(Severity::Medium),
            cross_program: false,
            configurable: true,
        },
        PartnerProfile => FraudRuleInfo {
            rule_type,
            name: "Risky partner profile",
            description: "Partner profile shows throwaway email or mismatched website",
            scope: RuleScope::Partner,
            severity: Some(Severity::Medium),
            cross_program: false,
            configurable: true,
        },
        ClickFlood => FraudRuleInfo {
            rule_type,
            name: "Click flood",
            description: "Partner click volume far exceeds plausible organic traffic",
            scope: RuleScope::Partner,
            severity: Some(Severity::Low),
            cross_program: false,
            configurable: true,
        },
        PartnerCrossProgramBan => FraudRuleInfo {
            rule_type,
            name: "Banned in another program",
            description: "Partner holds a banned enrollment elsewhere on the platform",
            scope: RuleScope::Partner,
            severity: Some(Severity::High),
            cross_program: true,
            configurable: false,
        },
        PartnerDuplicatePayoutMethod => FraudRuleInfo {
            rule_type,
            name: "Duplicate payout method",
            description: "Payout instrument fingerprint is shared with another partner",
            scope: RuleScope::Partner,
            severity: Some(Severity::High),
            cross_program: true,
            configurable: false,
        },
    }
}

/// All catalog entries for one scope, in declaration order.
pub fn rules_for_scope(scope: RuleScope) -> Vec<FraudRuleInfo> {
    FraudRuleType::ALL
        .iter()
        .map(|t| rule_info(*t))
        .filter(|i| i.scope == scope)
        .collect()
}

/// Highest severity among the triggered rule types. None = no risk.
pub fn aggregate_severity(triggered: &[FraudRuleType]) -> Option<Severity> {
    triggered.iter().filter_map(|t| rule_info(*t).severity).max()
}

// ──────────────────────────────────────────────────────────────────────────────
