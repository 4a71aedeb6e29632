//! User-configurable mempool parameters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Mempool configuration section.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// The maximum number of transactions kept in the pool.
    ///
    /// When an insertion pushes the pool above this limit, the lowest-weight
    /// transaction is evicted until the pool fits again.
    pub capacity: u32,

    /// Size hint for the invalidated-transaction cache.
    ///
    /// The cache may drop its oldest entries once it holds this many ids.
    pub invalidated_cache_size: u32,

    /// Per-entry retention window of the invalidated-transaction cache.
    ///
    /// Ids recorded longer ago than this may no longer answer as
    /// invalidated.
    pub invalidated_cache_expiration: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1_000,
            invalidated_cache_size: 10_000,
            invalidated_cache_expiration: Duration::from_secs(60 * 60),
        }
    }
}
