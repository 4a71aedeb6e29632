//! The Ebbtide mempool: a bounded set of unconfirmed transactions ordered by
//! economic weight.
//!
//! Transactions are ordered by weight rather than raw fee. A transaction's
//! initial weight is its fee density; when a transaction spends a box created
//! by another transaction still in the pool, the parent's weight is raised by
//! the child's weight. Parents therefore always sort ahead of their children,
//! and the lowest-weight entry -- the one evicted on overflow -- is never a
//! parent that a higher-paying child still depends on.
//!
//! The pool also remembers recently invalidated transaction ids in an
//! approximate, expiring cache, so callers can avoid re-admitting
//! transactions the node has already thrown out.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod pool;
mod weighted;

pub use config::Config;
pub use error::MempoolError;
pub use pool::{InvalidationCache, OrderedTxPool, MAX_PARENT_SCAN_DEPTH, MAX_PARENT_SCAN_TIME};
pub use weighted::WeightedTxId;
