// revshare/src/condition.rs
//
// Condition evaluator + reward modifier engine.
// A condition compares one resolved context field against a JSON value.
// Type mismatches evaluate to false, never to an error; a missing field
// fails the condition (and so the group) closed.

use serde_json::Value;

use crate::types::{Combinator, Condition, ConditionEntity, ConditionOperator, ModifierGroup};

// ── Reward context ────────────────────────────────────────────────────────────

/// Sale/customer attributes visible to modifier conditions. Both halves
/// are optional — click and lead events carry no sale.
#[derive(Debug, Clone, Default)]
pub struct RewardContext {
    pub customer: Option<CustomerFields>,
    pub sale: Option<SaleFields>,
}

#[derive(Debug, Clone, Default)]
pub struct CustomerFields {
    pub id: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SaleFields {
    pub product_id: Option<String>,
    /// Gross amount in cents.
    pub amount: Option<i64>,
    pub quantity: Option<i64>,
    pub currency: Option<String>,
    pub coupon: Option<String>,
}

impl RewardContext {
    /// Resolve `entity.attribute` to a JSON value. Unknown attributes and
    /// absent fields both yield None.
    pub fn field(&self, entity: ConditionEntity, attribute: &str) -> Option<Value> {
        match entity {
            ConditionEntity::Customer => {
                let c = self.customer.as_ref()?;
                match attribute {
                    "id" => c.id.clone().map(Value::from),
                    "email" => c.email.clone().map(Value::from),
                    "country" => c.country.clone().map(Value::from),
                    _ => None,
                }
            }
            ConditionEntity::Sale => {
                let s = self.sale.as_ref()?;
                match attribute {
                    "product_id" => s.product_id.clone().map(Value::from),
                    "amount" => s.amount.map(Value::from),
                    "quantity" => s.quantity.map(Value::from),
                    "currency" => s.currency.clone().map(Value::from),
                    "coupon" => s.coupon.clone().map(Value::from),
                    _ => None,
                }
            }
        }
    }
}

// ── Evaluator ─────────────────────────────────────────────────────────────────

/// Evaluate one condition against a resolved field value.
pub fn eval_condition(condition: &Condition, field: &Value) -> bool {
    use ConditionOperator::*;
    match condition.operator {
        EqualsTo => values_equal(field, &condition.value),
        NotEquals => !values_equal(field, &condition.value),
        In => value_in(field, &condition.value),
        NotIn => !value_in(field, &condition.value),
        StartsWith => match (field.as_str(), condition.value.as_str()) {
            (Some(f), Some(v)) => f.starts_with(v),
            _ => false,
        },
        EndsWith => match (field.as_str(), condition.value.as_str()) {
            (Some(f), Some(v)) => f.ends_with(v),
            _ => false,
        },
        GreaterThan => numeric_cmp(field, &condition.value).map_or(false, |o| o.is_gt()),
        LessThan => numeric_cmp(field, &condition.value).map_or(false, |o| o.is_lt()),
        GreaterThanOrEqual => numeric_cmp(field, &condition.value).map_or(false, |o| o.is_ge()),
        LessThanOrEqual => numeric_cmp(field, &condition.value).map_or(false, |o| o.is_le()),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        // 200 == 200.0 regardless of JSON number representation
        (Value::Number(_), Value::Number(_)) => {
            numeric_cmp(a, b).map_or(false, |o| o.is_eq())
        }
        _ => a == b,
    }
}

fn value_in(field: &Value, haystack: &Value) -> bool {
    match haystack.as_array() {
        Some(items) => items.iter().any(|v| values_equal(field, v)),
        None => false,
    }
}

fn numeric_cmp(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    let (a, b) = (a.as_f64()?, b.as_f64()?);
    a.partial_cmp(&b)
}

// ── Modifier engine ───────────────────────────────────────────────────────────

/// Walk the reward's modifier groups in order and return the override
/// amount of the first group that fully matches. None = use the base
/// reward amount.
pub fn resolve_override(groups: &[ModifierGroup], ctx: &RewardContext) -> Option<i64> {
    groups.iter().find(|g| group_matches(g, ctx)).map(|g| g.amount)
}

fn group_matches(group: &ModifierGroup, ctx: &RewardContext) -> bool {
    if group.conditions.is_empty() {
        return false;
    }
    let mut check = |c: &Condition| match ctx.field(c.entity, &c.attribute) {
        Some(field) => eval_condition(c, &field),
        None => false, // missing field fails closed
    };
    match group.combinator {
        Combinator::And => group.conditions.iter().all(&mut check),
        Combinator::Or => group.conditions.iter().any(&mut check),
    }
}

// ──────────────────────────────────────────────────────────────────────────────
