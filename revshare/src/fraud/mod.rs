// revshare/src/fraud/mod.rs
//
// Fraud-signal detection: static rule catalog, per-rule evaluators,
// detectors for both scopes, and event grouping/resolution.

pub mod catalog;
pub mod context;
pub mod conversion;
pub mod grouping;
pub mod partner;
pub mod registry;
pub mod rules;

pub use catalog::{aggregate_severity, rule_info};
pub use context::RuleContext;
pub use conversion::detect_conversion_fraud;
pub use grouping::{group_key, resolve_pending, ResolutionSummary};
pub use partner::{audit_partner, check_application};
pub use registry::{effective_rules, execute, EffectiveRule};
