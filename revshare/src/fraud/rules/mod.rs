// revshare/src/fraud/rules/mod.rs
//
// One module per evaluable rule. Each exposes
//   evaluate(&RuleContext, Option<&Value>) -> anyhow::Result<RuleOutcome>
// and, for configurable rules, a serde Config with built-in defaults.
// Rules read only their own context fields and fail closed on absence.

pub mod click_flood;
pub mod disposable_email;
pub mod partner_profile;
pub mod quick_conversion;
pub mod self_referral;
