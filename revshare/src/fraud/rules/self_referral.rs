// revshare/src/fraud/rules/self_referral.rs
//
// Partner referring themselves: customer email equals the partner's own
// email, or the referral click came from the partner's last-seen IP.

use anyhow::Result;
use serde_json::{json, Value};

use crate::fraud::context::RuleContext;
use crate::types::RuleOutcome;

pub fn evaluate(ctx: &RuleContext<'_>, _config: Option<&Value>) -> Result<RuleOutcome> {
    let partner = match &ctx.partner {
        Some(p) => p,
        None => return Ok(RuleOutcome::clear()),
    };

    if let (Some(customer), Some(partner_email)) = (&ctx.customer, &partner.email) {
        if let Some(customer_email) = &customer.email {
            if customer_email.eq_ignore_ascii_case(partner_email) {
                return Ok(RuleOutcome::triggered_with(json!({
                    "matched": "email",
                    "email": customer_email.to_ascii_lowercase(),
                })));
            }
        }
    }

    if let (Some(click), Some(partner_ip)) = (&ctx.click, &partner.last_ip) {
        if click.ip.as_deref() == Some(partner_ip.as_str()) {
            return Ok(RuleOutcome::triggered_with(json!({
                "matched": "ip",
                "ip": partner_ip,
            })));
        }
    }

    Ok(RuleOutcome::clear())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fraud::context::{ClickInfo, CustomerInfo, PartnerInfo};

    fn ctx_with(partner_email: &str, customer_email: &str) -> RuleContext<'static> {
        let mut ctx = RuleContext::new("prog_a", "par_1");
        ctx.partner = Some(PartnerInfo {
            email: Some(partner_email.into()),
            website: None,
            last_ip: Some("10.1.1.1".into()),
        });
        ctx.customer = Some(CustomerInfo {
            email: Some(customer_email.into()),
            ..Default::default()
        });
        ctx
    }

    #[test]
    fn matching_email_triggers_case_insensitively() {
        let out = evaluate(&ctx_with("Jo@Example.com", "jo@example.COM"), None).unwrap();
        assert!(out.triggered);
        assert_eq!(out.metadata.unwrap()["matched"], "email");
    }

    #[test]
    fn matching_click_ip_triggers() {
        let mut ctx = ctx_with("jo@example.com", "other@example.com");
        ctx.click = Some(ClickInfo { ip: Some("10.1.1.1".into()), ..Default::default() });
        let out = evaluate(&ctx, None).unwrap();
        assert!(out.triggered);
        assert_eq!(out.metadata.unwrap()["matched"], "ip");
    }

    #[test]
    fn fails_closed_without_partner_profile() {
        let out = evaluate(&RuleContext::new("prog_a", "par_1"), None).unwrap();
        assert!(!out.triggered);
    }
}
