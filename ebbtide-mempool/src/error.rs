//! Errors for transactions offered to the mempool.

use thiserror::Error;

/// Reasons the pool will not accept a transaction right now.
///
/// The pool's mutators never fail; these are returned by
/// [`OrderedTxPool::check_accept`](crate::OrderedTxPool::check_accept) so
/// callers can skip the work of weighing a transaction that cannot enter the
/// pool.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum MempoolError {
    /// The same transaction id is already tracked by the pool.
    #[error("transaction already exists in mempool")]
    InMempool,

    /// The pool has no room for new entries.
    #[error("mempool is full")]
    Full,
}
