// revshare/src/reward.rs
//
// Reward resolver — picks the single applicable reward for an
// (event type, partner, program) triple. Partner-specific rewards win
// over program-wide ones; a zero base amount and an exhausted rolling
// payout cap are both normal "no reward" outcomes (Ok(None)).

use chrono::{DateTime, Months, Utc};
use tracing::debug;

use crate::error::Result;
use crate::store::{CommissionQuery, CommissionStore, RewardStore};
use crate::types::{CommissionStatus, EventType, Reward};

/// Resolve the reward to pay `partner_id` for one `event_type` occurrence
/// in `program_id` at time `now`.
pub fn resolve_reward(
    rewards: &dyn RewardStore,
    commissions: &dyn CommissionStore,
    program_id: &str,
    partner_id: &str,
    event_type: EventType,
    now: DateTime<Utc>,
) -> Result<Option<Reward>> {
    let candidates = rewards.candidate_rewards(program_id, event_type)?;

    let reward = match pick_candidate(&candidates, partner_id) {
        Some(r) => r.clone(),
        None => return Ok(None),
    };

    // Amount 0 means "no reward", configured deliberately.
    if reward.amount == 0 {
        debug!(reward = %reward.id, "reward has zero amount, skipping");
        return Ok(None);
    }

    if payout_cap_reached(commissions, &reward, partner_id, now)? {
        debug!(reward = %reward.id, partner = partner_id, "rolling payout cap reached");
        return Ok(None);
    }

    Ok(Some(reward))
}

/// Precedence: partner-specific beats program-wide regardless of storage
/// order; among program-wide candidates the default-flagged one wins.
fn pick_candidate<'a>(candidates: &'a [Reward], partner_id: &str) -> Option<&'a Reward> {
    let partner_specific = candidates
        .iter()
        .find(|r| r.partner_ids.iter().any(|p| p == partner_id));
    if partner_specific.is_some() {
        return partner_specific;
    }
    let program_wide: Vec<&Reward> = candidates.iter().filter(|r| r.is_program_wide()).collect();
    program_wide
        .iter()
        .find(|r| r.is_default)
        .or_else(|| program_wide.first())
        .copied()
}

/// True when the reward's `max_total_payout` is already met by non-voided
/// earnings of this event type inside the rolling window.
fn payout_cap_reached(
    commissions: &dyn CommissionStore,
    reward: &Reward,
    partner_id: &str,
    now: DateTime<Utc>,
) -> Result<bool> {
    let (cap, interval) = match (reward.max_total_payout, reward.payout_reset_months) {
        (Some(cap), Some(interval)) => (cap, interval),
        _ => return Ok(false),
    };
    let window_start = now
        .checked_sub_months(Months::new(interval))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let earned = commissions.sum_earnings(&CommissionQuery {
        program_id: reward.program_id.clone(),
        partner_id: partner_id.to_string(),
        event_type: reward.event_type,
        statuses: CommissionStatus::NON_VOIDED.to_vec(),
        created_after: Some(window_start),
    })?;
    Ok(earned >= cap)
}

// ──────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem::MemStore;
    use crate::types::{Commission, RewardStructure};
    use chrono::Duration;

    fn reward(id: &str, partner_ids: Vec<&str>, amount: i64) -> Reward {
        Reward {
            id: id.into(),
            program_id: "prog_a".into(),
            event_type: EventType::Sale,
            structure: RewardStructure::Flat,
            amount,
            max_duration_months: None,
            max_amount: None,
            max_total_payout: None,
            payout_reset_months: None,
            is_default: false,
            partner_ids: partner_ids.into_iter().map(String::from).collect(),
            modifiers: vec![],
        }
    }

    fn commission_row(earnings: i64, age_days: i64) -> Commission {
        Commission {
            id: format!("com_hist_{earnings}_{age_days}"),
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
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    #[test]
    fn partner_specific_wins_over_program_wide() {
        let store = MemStore::new();
        // program-wide listed first on purpose
        store.add_reward(reward("rew_wide", vec![], 500));
        store.add_reward(reward("rew_mine", vec!["par_1"], 700));

        let got = resolve_reward(&store, &store, "prog_a", "par_1", EventType::Sale, Utc::now())
            .unwrap()
            .unwrap();
        assert_eq!(got.id, "rew_mine");

        // other partners still get the program-wide reward
        let got = resolve_reward(&store, &store, "prog_a", "par_2", EventType::Sale, Utc::now())
            .unwrap()
            .unwrap();
        assert_eq!(got.id, "rew_wide");
    }

    #[test]
    fn default_flag_breaks_program_wide_ties() {
        let store = MemStore::new();
        store.add_reward(reward("rew_promo", vec![], 900));
        let mut def = reward("rew_default", vec![], 500);
        def.is_default = true;
        store.add_reward(def);

        let got = resolve_reward(&store, &store, "prog_a", "par_1", EventType::Sale, Utc::now())
            .unwrap()
            .unwrap();
        assert_eq!(got.id, "rew_default");
    }

    #[test]
    fn zero_amount_is_no_reward() {
        let store = MemStore::new();
        store.add_reward(reward("rew_off", vec![], 0));
        let got =
            resolve_reward(&store, &store, "prog_a", "par_1", EventType::Sale, Utc::now()).unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn no_candidates_is_no_reward() {
        let store = MemStore::new();
        let got =
            resolve_reward(&store, &store, "prog_a", "par_1", EventType::Sale, Utc::now()).unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn rolling_payout_cap_blocks_resolution() {
        let store = MemStore::new();
        let mut r = reward("rew_capped", vec![], 500);
        r.max_total_payout = Some(10_000);
        r.payout_reset_months = Some(3);
        store.add_reward(r);

        // 10_000 earned inside the 3-month window → cap reached
        store.seed_commission(commission_row(6_000, 10));
        store.seed_commission(commission_row(4_000, 30));

        let got =
            resolve_reward(&store, &store, "prog_a", "par_1", EventType::Sale, Utc::now()).unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn earnings_outside_window_do_not_count() {
        let store = MemStore::new();
        let mut r = reward("rew_capped", vec![], 500);
        r.max_total_payout = Some(10_000);
        r.payout_reset_months = Some(3);
        store.add_reward(r);

        // old earnings fell out of the rolling window
        store.seed_commission(commission_row(10_000, 120));
        store.seed_commission(commission_row(2_000, 10));

        let got =
            resolve_reward(&store, &store, "prog_a", "par_1", EventType::Sale, Utc::now()).unwrap();
        assert!(got.is_some());
    }
}
