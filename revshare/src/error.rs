// revshare/src/error.rs
//
// Crate-level error type. Normal negative outcomes (no reward, cap
// exhausted, nothing triggered) are Ok(None)/empty collections, never
// errors — only store failures and caller misuse surface here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Persistence / lookup failure from an external collaborator.
    /// Not retried internally; re-invocation is safe wherever the store
    /// holds a uniqueness constraint (invoice id, group key).
    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
