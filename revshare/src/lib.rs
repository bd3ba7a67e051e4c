// revshare/src/lib.rs

//! Affiliate reward resolution, commission math and fraud-signal
//! detection.
//!
//! The crate answers two questions for a merchant's referral program:
//! how much a partner earns for a tracked event, and whether the
//! activity around a partner or conversion looks fraudulent.
//!
//! - [`reward::resolve_reward`] picks the applicable reward for an
//!   (event type, partner, program) triple, honoring partner-specific
//!   precedence and rolling payout caps.
//! - [`commission::create_commission`] turns the resolved reward plus
//!   sale data into a persisted commission, applying modifier overrides
//!   and the duration/amount caps. Integer cents throughout.
//! - [`fraud`] hosts the rule catalog, per-rule evaluators, the
//!   conversion-event and partner-scoped detectors, and the grouping /
//!   resolution workflow for the events they emit.
//!
//! Persistence, identity lookups and the disposable-domain corpus are
//! consumed through the traits in [`store`]; [`store::mem::MemStore`]
//! is an in-memory implementation for tests and fixtures. Normal
//! negative outcomes — no applicable reward, cap exhausted, nothing
//! triggered — are `Ok(None)` / empty collections, never errors.

pub mod commission;
pub mod condition;
pub mod error;
pub mod fraud;
pub mod reward;
pub mod store;
pub mod types;

pub use commission::{create_commission, SaleData};
pub use condition::{resolve_override, RewardContext};
pub use error::{Error, Result};
pub use reward::resolve_reward;
