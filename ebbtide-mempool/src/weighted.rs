//! Transaction weighting.
//!
//! A transaction's initial weight is its fee per cost unit. The pool later
//! raises the weight of transactions whose outputs are spent by other pool
//! transactions, so a [`WeightedTxId`]'s weight field can drift away from its
//! fee while its identity stays the same.

use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};

use chrono::Utc;

use ebbtide_chain::{transaction, transaction::Transaction, transparent::Script};

/// Multiplier applied to fees before dividing by the fee factor.
///
/// Preserves precision for fees smaller than the transaction size.
const FEE_PRECISION: i64 = 1024;

/// Weighted transaction identifier, the ordering key of the pool.
///
/// Equality and hashing use the transaction id alone, so an entry keeps its
/// identity while its weight changes. Ordering is `(-weight, id)`: the
/// highest weight sorts first, ties broken by ascending id bytes. All
/// arithmetic on weights saturates.
#[derive(Copy, Clone, Debug)]
pub struct WeightedTxId {
    /// The transaction id.
    pub id: transaction::Hash,

    /// Sorting priority: the fee per factor plus the weights of pool
    /// transactions spending this transaction's outputs.
    pub weight: i64,

    /// Fee per cost unit, fixed at admission time.
    pub fee_per_factor: i64,

    /// Wall-clock creation time, in unix milliseconds.
    pub created_at: i64,
}

impl WeightedTxId {
    /// Weigh `tx`, summing the outputs guarded by `fee_proposition` and
    /// dividing by `fee_factor` (the transaction's size or execution cost).
    ///
    /// # Panics
    ///
    /// If `fee_factor` is zero. Callers derive the factor from a
    /// transaction's size or cost, which serialization guarantees to be
    /// positive.
    pub fn new(tx: &Transaction, fee_proposition: &Script, fee_factor: u64) -> Self {
        assert!(fee_factor > 0, "fee factor must be positive");

        let fee = i64::try_from(tx.value_paid_to(fee_proposition)).unwrap_or(i64::MAX);
        let factor = i64::try_from(fee_factor).unwrap_or(i64::MAX);
        let fee_per_factor = fee.saturating_mul(FEE_PRECISION) / factor;

        Self {
            id: tx.id,
            weight: fee_per_factor,
            fee_per_factor,
            created_at: Utc::now().timestamp_millis(),
        }
    }

    /// The same entry with `delta` added to its weight.
    ///
    /// The pool uses this when re-keying a parent whose descendants changed.
    pub(crate) fn promoted(&self, delta: i64) -> Self {
        Self {
            weight: self.weight.saturating_add(delta),
            ..*self
        }
    }
}

impl PartialEq for WeightedTxId {
    fn eq(&self, other: &Self) -> bool {
        // the id uniquely identifies the transaction, whatever its weight
        self.id == other.id
    }
}

impl Eq for WeightedTxId {}

impl Hash for WeightedTxId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for WeightedTxId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WeightedTxId {
    fn cmp(&self, other: &Self) -> Ordering {
        // higher weight first; id keeps the order total and deterministic
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| self.id.0.cmp(&other.id.0))
    }
}
