// revshare/src/fraud/rules/disposable_email.rs
//
// Customer signed up with a throwaway email domain. Membership comes
// from the external disposable-domain corpus plus an optional
// per-program extra_domains list.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::fraud::context::{email_domain, RuleContext};
use crate::fraud::registry::parse_config;
use crate::types::{FraudRuleType, RuleOutcome};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extra_domains: Vec<String>,
}

pub fn default_config() -> Value {
    serde_json::to_value(Config::default()).unwrap_or(Value::Null)
}

pub fn evaluate(ctx: &RuleContext<'_>, config: Option<&Value>) -> Result<RuleOutcome> {
    let cfg: Config = parse_config(FraudRuleType::DisposableEmail, config);

    let domain = match ctx.customer.as_ref().and_then(|c| c.email.as_deref()) {
        Some(email) => match email_domain(email) {
            Some(d) => d,
            None => return Ok(RuleOutcome::clear()),
        },
        None => return Ok(RuleOutcome::clear()),
    };

    let in_corpus = ctx
        .disposable_domains
        .map_or(false, |set| set.contains(&domain));
    let in_extra = cfg
        .extra_domains
        .iter()
        .any(|d| d.eq_ignore_ascii_case(&domain));

    if in_corpus || in_extra {
        return Ok(RuleOutcome::triggered_with(json!({
            "domain": domain,
            "source": if in_corpus { "corpus" } else { "program_config" },
        })));
    }
    Ok(RuleOutcome::clear())
}
