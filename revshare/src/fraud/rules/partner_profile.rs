// revshare/src/fraud/rules/partner_profile.rs
//
// Profile heuristics over the partner's own signup data: throwaway email
// domain, or an email domain that does not match the declared website.
// Each check is independently togglable per program.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::fraud::context::{email_domain, website_domain, RuleContext};
use crate::fraud::registry::parse_config;
use crate::types::{FraudRuleType, RuleOutcome};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub flag_disposable_email: bool,
    pub flag_domain_mismatch: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { flag_disposable_email: true, flag_domain_mismatch: true }
    }
}

pub fn default_config() -> Value {
    serde_json::to_value(Config::default()).unwrap_or(Value::Null)
}

pub fn evaluate(ctx: &RuleContext<'_>, config: Option<&Value>) -> Result<RuleOutcome> {
    let cfg: Config = parse_config(FraudRuleType::PartnerProfile, config);

    let partner = match &ctx.partner {
        Some(p) => p,
        None => return Ok(RuleOutcome::clear()),
    };
    let mail_domain = partner.email.as_deref().and_then(email_domain);

    let mut reasons = Vec::new();

    if cfg.flag_disposable_email {
        if let (Some(domain), Some(set)) = (&mail_domain, ctx.disposable_domains) {
            if set.contains(domain) {
                reasons.push(json!({ "check": "disposable_email", "domain": domain }));
            }
        }
    }

    if cfg.flag_domain_mismatch {
        let site_domain = partner.website.as_deref().and_then(website_domain);
        if let (Some(mail), Some(site)) = (&mail_domain, &site_domain) {
            // free-mail partners legitimately differ; only compare custom domains
            if mail != site && !is_freemail(mail) {
                reasons.push(json!({
                    "check": "domain_mismatch",
                    "email_domain": mail,
                    "website_domain": site,
                }));
            }
        }
    }

    if reasons.is_empty() {
        return Ok(RuleOutcome::clear());
    }
    Ok(RuleOutcome::triggered_with(json!({ "reasons": reasons })))
}

fn is_freemail(domain: &str) -> bool {
    const FREEMAIL: &[&str] = &[
        "gmail.com", "googlemail.com", "outlook.com", "hotmail.com", "live.com",
        "yahoo.com", "icloud.com", "proton.me", "protonmail.com", "gmx.de", "web.de",
    ];
    FREEMAIL.contains(&domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fraud::context::PartnerInfo;
    use crate::store::mem::MemStore;

    fn ctx<'a>(email: &str, website: Option<&str>, store: &'a MemStore) -> RuleContext<'a> {
        let mut c = RuleContext::new("prog_a", "par_1");
        c.partner = Some(PartnerInfo {
            email: Some(email.into()),
            website: website.map(String::from),
            last_ip: None,
        });
        c.disposable_domains = Some(store);
        c
    }

    #[test]
    fn disposable_partner_email_triggers() {
        let store = MemStore::new();
        store.add_disposable_domain("trashmail.io");
        let out = evaluate(&ctx("p@trashmail.io", None, &store), None).unwrap();
        assert!(out.triggered);
    }

    #[test]
    fn custom_domain_mismatch_triggers_but_freemail_does_not() {
        let store = MemStore::new();
        let out = evaluate(&ctx("p@acme.com", Some("https://other.net"), &store), None).unwrap();
        assert!(out.triggered);
        let out = evaluate(&ctx("p@gmail.com", Some("https://other.net"), &store), None).unwrap();
        assert!(!out.triggered);
    }

    #[test]
    fn checks_can_be_disabled_per_program() {
        let store = MemStore::new();
        let cfg = json!({ "flag_domain_mismatch": false });
        let out = evaluate(&ctx("p@acme.com", Some("https://other.net"), &store), Some(&cfg)).unwrap();
        assert!(!out.triggered);
    }
}
