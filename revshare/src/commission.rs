// revshare/src/commission.rs
//
// Commission calculator — turns a resolved reward plus sale data into a
// persisted commission row. All money is integer cents. Rejections from
// the duration or amount caps are normal Ok(None) outcomes, logged and
// never thrown.
//
// Callers that combine the cap reads with the insert must run the whole
// call inside the store's transaction; two concurrent sales could
// otherwise both pass a max_amount check before either commits.

use chrono::{DateTime, Datelike, Timelike, Utc};
use tracing::{debug, info};

use crate::condition::{resolve_override, RewardContext};
use crate::error::Result;
use crate::store::{CommissionQuery, CommissionStore};
use crate::types::{
    Commission, CommissionStatus, EventType, NewCommission, Reward, RewardStructure,
};

/// Event occurrence being rewarded. Non-sale events carry amount 0.
#[derive(Debug, Clone)]
pub struct SaleData {
    pub quantity: i64,
    /// Gross sale amount in cents.
    pub amount: i64,
    pub currency: String,
    pub customer_id: Option<String>,
    pub link_id: Option<String>,
    pub event_id: Option<String>,
    /// Dedup key within the program; uniqueness is the store's constraint.
    pub invoice_id: Option<String>,
}

/// Compute earnings for `reward` and persist a commission, or return
/// Ok(None) when a cap rejects the occurrence.
pub fn create_commission(
    commissions: &dyn CommissionStore,
    reward: &Reward,
    partner_id: &str,
    sale: &SaleData,
    ctx: &RewardContext,
    now: DateTime<Utc>,
) -> Result<Option<Commission>> {
    let effective = resolve_override(&reward.modifiers, ctx).unwrap_or(reward.amount);

    let mut earnings = match reward.structure {
        RewardStructure::Flat => sale.quantity.saturating_mul(effective),
        RewardStructure::Percentage => sale.amount.saturating_mul(effective) / 10_000,
    };
    earnings = earnings.max(0);

    if duration_cap_hit(commissions, reward, partner_id, sale, now)? {
        return Ok(None);
    }

    if let Some(cap) = reward.max_amount {
        let earned = commissions.sum_earnings(&CommissionQuery {
            program_id: reward.program_id.clone(),
            partner_id: partner_id.to_string(),
            event_type: reward.event_type,
            statuses: CommissionStatus::NON_VOIDED.to_vec(),
            created_after: None,
        })?;
        if earned >= cap {
            info!(
                reward = %reward.id, partner = partner_id, earned, cap,
                "max_amount cap exhausted, no commission"
            );
            return Ok(None);
        }
        earnings = earnings.min(cap - earned).max(0);
    }

    let row = commissions.insert(NewCommission {
        program_id: reward.program_id.clone(),
        partner_id: partner_id.to_string(),
        customer_id: sale.customer_id.clone(),
        link_id: sale.link_id.clone(),
        event_id: sale.event_id.clone(),
        invoice_id: sale.invoice_id.clone(),
        event_type: reward.event_type,
        quantity: sale.quantity,
        sale_amount: sale.amount,
        earnings,
        currency: sale.currency.clone(),
    })?;
    info!(
        commission = %row.id, partner = partner_id, earnings,
        event_type = %reward.event_type, "commission created"
    );
    Ok(Some(row))
}

/// max_duration: 0 = first sale only; N > 0 = reject once the customer's
/// earliest sale commission is N or more whole months old.
fn duration_cap_hit(
    commissions: &dyn CommissionStore,
    reward: &Reward,
    partner_id: &str,
    sale: &SaleData,
    now: DateTime<Utc>,
) -> Result<bool> {
    let max_months = match reward.max_duration_months {
        Some(m) => m,
        None => return Ok(false),
    };
    let customer_id = match &sale.customer_id {
        Some(c) => c,
        None => return Ok(false), // nothing to anchor the window on
    };
    let earliest = commissions.earliest_commission(
        &reward.program_id,
        partner_id,
        customer_id,
        EventType::Sale,
    )?;
    let earliest = match earliest {
        Some(c) => c,
        None => return Ok(false),
    };

    if max_months == 0 {
        debug!(
            reward = %reward.id, customer = customer_id,
            "first-sale-only reward exhausted"
        );
        return Ok(true);
    }
    let elapsed = whole_months(earliest.created_at, now);
    if elapsed >= i64::from(max_months) {
        debug!(
            reward = %reward.id, customer = customer_id, elapsed,
            max = max_months, "max_duration elapsed"
        );
        return Ok(true);
    }
    Ok(false)
}

/// Whole calendar months elapsed from `from` to `to`. 5 months 29 days
/// counts as 5; exactly 6 months counts as 6.
pub fn whole_months(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    if to <= from {
        return 0;
    }
    let mut months = i64::from(to.year() - from.year()) * 12
        + (i64::from(to.month()) - i64::from(from.month()));
    let from_mark = (from.day(), from.num_seconds_from_midnight());
    let to_mark = (to.day(), to.num_seconds_from_midnight());
    if to_mark < from_mark {
        months -= 1;
    }
    months.max(0)
}

// ──────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{CustomerFields, SaleFields};
    use crate::store::mem::MemStore;
    use crate::types::{Combinator, Condition, ConditionEntity, ConditionOperator, ModifierGroup};
    use chrono::TimeZone;
    use serde_json::json;

    fn reward(structure: RewardStructure, amount: i64) -> Reward {
        Reward {
            id: "rew_1".into(),
            program_id: "prog_a".into(),
            event_type: EventType::Sale,
            structure,
            amount,
            max_duration_months: None,
            max_amount: None,
            max_total_payout: None,
            payout_reset_months: None,
            is_default: true,
            partner_ids: vec![],
            modifiers: vec![],
        }
    }

    fn sale(quantity: i64, amount: i64) -> SaleData {
        SaleData {
            quantity,
            amount,
            currency: "USD".into(),
            customer_id: Some("cus_1".into()),
            link_id: None,
            event_id: None,
            invoice_id: None,
        }
    }

    fn ctx_for(product: &str) -> RewardContext {
        RewardContext {
            customer: Some(CustomerFields::default()),
            sale: Some(SaleFields {
                product_id: Some(product.into()),
                amount: Some(20_000),
                quantity: Some(1),
                currency: Some("USD".into()),
                coupon: None,
            }),
        }
    }

    fn seed_sale_commission(store: &MemStore, created_at: DateTime<Utc>, earnings: i64) {
        store.seed_commission(Commission {
            id: format!("com_seed_{}", created_at.timestamp()),
            program_id: "prog_a".into(),
            partner_id: "par_1".into(),
            customer_id: Some("cus_1".into()),
            link_id: None,
            event_id: None,
            invoice_id: None,
            event_type: EventType::Sale,
            quantity: 1,
            sale_amount: earnings * 10,
            earnings,
            currency: "USD".into(),
            status: CommissionStatus::Paid,
            created_at,
        });
    }

    #[test]
    fn flat_earnings_scale_with_quantity() {
        let store = MemStore::new();
        let r = reward(RewardStructure::Flat, 500);
        let row = create_commission(&store, &r, "par_1", &sale(3, 0), &RewardContext::default(), Utc::now())
            .unwrap()
            .unwrap();
        assert_eq!(row.earnings, 1500);
    }

    #[test]
    fn percentage_earnings_use_hundredths_of_percent() {
        let store = MemStore::new();
        let r = reward(RewardStructure::Percentage, 1000); // 10.00%
        let row = create_commission(&store, &r, "par_1", &sale(1, 20_000), &RewardContext::default(), Utc::now())
            .unwrap()
            .unwrap();
        assert_eq!(row.earnings, 2000);
    }

    #[test]
    fn modifier_override_replaces_base_amount() {
        let store = MemStore::new();
        let mut r = reward(RewardStructure::Percentage, 1000);
        r.modifiers = vec![ModifierGroup {
            combinator: Combinator::And,
            conditions: vec![Condition {
                entity: ConditionEntity::Sale,
                attribute: "product_id".into(),
                operator: ConditionOperator::EqualsTo,
                value: json!("prod_x"),
            }],
            amount: 2500, // 25.00%
        }];

        let row = create_commission(&store, &r, "par_1", &sale(1, 20_000), &ctx_for("prod_x"), Utc::now())
            .unwrap()
            .unwrap();
        assert_eq!(row.earnings, 5000);

        let row = create_commission(&store, &r, "par_1", &sale(1, 20_000), &ctx_for("prod_y"), Utc::now())
            .unwrap()
            .unwrap();
        assert_eq!(row.earnings, 2000);
    }

    #[test]
    fn first_sale_only_rejects_repeat_customers() {
        let store = MemStore::new();
        let mut r = reward(RewardStructure::Flat, 500);
        r.max_duration_months = Some(0);

        let first = create_commission(&store, &r, "par_1", &sale(1, 0), &RewardContext::default(), Utc::now())
            .unwrap();
        assert!(first.is_some());

        let second = create_commission(&store, &r, "par_1", &sale(1, 0), &RewardContext::default(), Utc::now())
            .unwrap();
        assert!(second.is_none());
    }

    #[test]
    fn duration_cap_boundary_is_inclusive() {
        let store = MemStore::new();
        let mut r = reward(RewardStructure::Flat, 500);
        r.max_duration_months = Some(6);

        // earliest sale commission on Jan 15, noon
        let earliest = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        seed_sale_commission(&store, earliest, 500);

        // exactly 6 months later → rejected
        let at_six = Utc.with_ymd_and_hms(2026, 7, 15, 12, 0, 0).unwrap();
        let got = create_commission(&store, &r, "par_1", &sale(1, 0), &RewardContext::default(), at_six)
            .unwrap();
        assert!(got.is_none());

        // 5 months 29-ish days later → allowed
        let just_under = Utc.with_ymd_and_hms(2026, 7, 14, 12, 0, 0).unwrap();
        let got = create_commission(&store, &r, "par_1", &sale(1, 0), &RewardContext::default(), just_under)
            .unwrap();
        assert!(got.is_some());
    }

    #[test]
    fn max_amount_clamps_then_blocks() {
        let store = MemStore::new();
        let mut r = reward(RewardStructure::Flat, 2000);
        r.max_amount = Some(10_000);
        seed_sale_commission(&store, Utc::now() - chrono::Duration::days(40), 9_000);

        // would earn 2000, clamped to the 1000 left under the cap
        let row = create_commission(&store, &r, "par_1", &sale(1, 0), &RewardContext::default(), Utc::now())
            .unwrap()
            .unwrap();
        assert_eq!(row.earnings, 1000);

        // cap now fully consumed
        let got = create_commission(&store, &r, "par_1", &sale(1, 0), &RewardContext::default(), Utc::now())
            .unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn duplicate_invoice_id_surfaces_store_error() {
        let store = MemStore::new();
        let r = reward(RewardStructure::Flat, 500);
        let mut s = sale(1, 0);
        s.invoice_id = Some("inv_1".into());

        assert!(create_commission(&store, &r, "par_1", &s, &RewardContext::default(), Utc::now())
            .unwrap()
            .is_some());
        assert!(create_commission(&store, &r, "par_1", &s, &RewardContext::default(), Utc::now())
            .is_err());
    }

    #[test]
    fn whole_months_handles_partial_months() {
        let from = Utc.with_ymd_and_hms(2026, 1, 31, 9, 0, 0).unwrap();
        assert_eq!(whole_months(from, Utc.with_ymd_and_hms(2026, 2, 28, 9, 0, 0).unwrap()), 0);
        assert_eq!(whole_months(from, Utc.with_ymd_and_hms(2026, 3, 31, 9, 0, 0).unwrap()), 2);
        assert_eq!(whole_months(from, from), 0);
        // clock earlier in the day on the anniversary → not a full month yet
        let from = Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap();
        assert_eq!(whole_months(from, Utc.with_ymd_and_hms(2026, 2, 15, 8, 0, 0).unwrap()), 0);
        assert_eq!(whole_months(from, Utc.with_ymd_and_hms(2026, 2, 15, 9, 0, 0).unwrap()), 1);
    }
}
