// revshare/src/fraud/context.rs
//
// Evaluation contexts. Every correlated entity is an explicit Option —
// customer, click and conversion data may be partially absent, and each
// rule must fail closed (not triggered) on the fields it needs.

use chrono::{DateTime, Utc};

use crate::store::DisposableDomainSet;

/// Context bundle passed to every rule evaluation. Which optional halves
/// are populated depends on the detector scope: conversion-event
/// detection fills customer/click/conversion, partner detection fills
/// partner/stats.
pub struct RuleContext<'a> {
    pub program_id: String,
    pub partner_id: String,
    pub customer: Option<CustomerInfo>,
    pub partner: Option<PartnerInfo>,
    pub click: Option<ClickInfo>,
    pub conversion: Option<ConversionInfo>,
    pub stats: Option<PartnerStats>,
    /// External disposable-email-domain corpus; rules needing it fail
    /// closed when it is not wired in.
    pub disposable_domains: Option<&'a dyn DisposableDomainSet>,
}

impl<'a> RuleContext<'a> {
    pub fn new(program_id: &str, partner_id: &str) -> Self {
        Self {
            program_id: program_id.to_string(),
            partner_id: partner_id.to_string(),
            customer: None,
            partner: None,
            click: None,
            conversion: None,
            stats: None,
            disposable_domains: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CustomerInfo {
    pub id: Option<String>,
    pub email: Option<String>,
    pub ip: Option<String>,
    pub country: Option<String>,
}

/// The partner's own profile, for partner-scoped heuristics.
#[derive(Debug, Clone, Default)]
pub struct PartnerInfo {
    pub email: Option<String>,
    pub website: Option<String>,
    pub last_ip: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ClickInfo {
    pub ip: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConversionInfo {
    pub commission_id: Option<String>,
    pub event_id: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
    /// Gross amount in cents, when the conversion is a sale.
    pub amount: Option<i64>,
}

/// Trailing aggregates supplied by the stats-sync caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartnerStats {
    pub clicks_last_24h: u64,
    pub conversions_last_24h: u64,
}

/// Domain part of an email address, lower-cased. None for anything that
/// does not look like `local@domain`.
pub fn email_domain(email: &str) -> Option<String> {
    let domain = email.rsplit_once('@')?.1.trim();
    if domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(domain.to_ascii_lowercase())
}

/// Host part of a website URL, lower-cased, scheme and path stripped.
pub fn website_domain(website: &str) -> Option<String> {
    let rest = website
        .strip_prefix("https://")
        .or_else(|| website.strip_prefix("http://"))
        .unwrap_or(website);
    let host = rest.split(['/', '?', '#']).next()?.trim();
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        return None;
    }
    Some(host.to_ascii_lowercase())
}

// ──────────────────────────────────────────────────────────────────────────────
