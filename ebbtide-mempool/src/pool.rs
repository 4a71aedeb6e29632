//! The ordered transaction pool.
//!
//! [`OrderedTxPool`] keeps unconfirmed transactions in five coordinated
//! indices:
//!
//! - an ordered map from [`WeightedTxId`] to [`UnconfirmedTx`], iterated
//!   highest-weight first; its last entry is the eviction victim,
//! - a registry from transaction id to the entry's current weighted key,
//! - a map from every box created by a pool transaction to that
//!   transaction's weighted key,
//! - a map from every box spent by a pool transaction to that transaction's
//!   weighted key, and
//! - an approximate expiring cache of recently invalidated ids.
//!
//! When a transaction spends boxes created inside the pool, admission and
//! removal propagate its weight through the ancestor chain, so parents are
//! never ordered (or evicted) behind their children. Propagation is bounded
//! by [`MAX_PARENT_SCAN_DEPTH`] and [`MAX_PARENT_SCAN_TIME`].

mod invalidated;


use std::{
    collections::{BTreeMap, HashMap},
    time::{Duration, Instant},
};

use tracing::{debug, warn};

use ebbtide_chain::{
    parameters::MonetarySettings,
    transaction::{self, Transaction, UnconfirmedTx},
    transparent::{BoxId, Script},
};

use crate::{config::Config, error::MempoolError, weighted::WeightedTxId};

pub use invalidated::InvalidationCache;

/// Maximum recursion depth of one family weight propagation pass.
///
/// Bounds the work done for adversarially deep transaction chains; beyond
/// this depth ancestors keep their current weights and a warning is logged.
pub const MAX_PARENT_SCAN_DEPTH: usize = 500;

/// Maximum wall-clock budget of one family weight propagation pass.
pub const MAX_PARENT_SCAN_TIME: Duration = Duration::from_millis(500);

/// A bounded set of unconfirmed transactions ordered by effective weight.
///
/// All mutators take `&mut self` and never fail; callers that need
/// snapshot semantics clone the pool and swap it behind an `Arc`. The
/// invalidation cache travels with the pool, accumulating ids across entry
/// insertions and removals.
#[derive(Clone, Debug)]
pub struct OrderedTxPool {
    /// Pool entries ordered by `(-weight, id)`.
    ordered_transactions: BTreeMap<WeightedTxId, UnconfirmedTx>,

    /// The authoritative id lookup: maps each pooled transaction id to the
    /// weighted key it currently lives under.
    transactions_registry: HashMap<transaction::Hash, WeightedTxId>,

    /// Maps every box created by a pool transaction to its creator's key.
    outputs: HashMap<BoxId, WeightedTxId>,

    /// Maps every box spent by a pool transaction to its spender's key.
    inputs: HashMap<BoxId, WeightedTxId>,

    /// Recently invalidated transaction ids.
    invalidated: InvalidationCache,

    /// Hard cap on pool entries.
    capacity: usize,

    /// The proposition identifying fee-recipient outputs.
    fee_proposition: Script,
}

impl OrderedTxPool {
    /// Create an empty pool from the mempool configuration and the chain's
    /// monetary parameters.
    pub fn new(config: &Config, monetary: &MonetarySettings) -> Self {
        Self {
            ordered_transactions: BTreeMap::new(),
            transactions_registry: HashMap::new(),
            outputs: HashMap::new(),
            inputs: HashMap::new(),
            invalidated: InvalidationCache::new(
                config.invalidated_cache_size as usize,
                config.invalidated_cache_expiration,
            ),
            capacity: config.capacity as usize,
            fee_proposition: monetary.fee_proposition.clone(),
        }
    }

    /// The number of transactions in the pool.
    pub fn len(&self) -> usize {
        self.ordered_transactions.len()
    }

    /// Returns `true` if the pool holds no transactions.
    pub fn is_empty(&self) -> bool {
        self.ordered_transactions.is_empty()
    }

    /// Returns `true` if a transaction with `id` is in the pool.
    pub fn contains(&self, id: &transaction::Hash) -> bool {
        self.transactions_registry.contains_key(id)
    }

    /// Returns `true` if `id` was recently invalidated.
    ///
    /// May answer `true` for ids that were never invalidated (the cache is
    /// approximate), and forgets ids once their retention window has
    /// passed.
    pub fn is_invalidated(&self, id: &transaction::Hash) -> bool {
        self.invalidated.might_contain(id)
    }

    /// Look up a pool entry by transaction id.
    pub fn get(&self, id: &transaction::Hash) -> Option<&UnconfirmedTx> {
        let wtx = self.transactions_registry.get(id)?;
        let entry = self.ordered_transactions.get(wtx);

        if entry.is_none() {
            warn!(
                tx_id = %id,
                "registry entry without a matching ordered entry, treating as absent",
            );
        }

        entry
    }

    /// The current effective weight of the pooled transaction `id`.
    pub fn weight(&self, id: &transaction::Hash) -> Option<i64> {
        self.transactions_registry.get(id).map(|wtx| wtx.weight)
    }

    /// Iterate over pool entries, highest weight first.
    pub fn transactions(&self) -> impl Iterator<Item = &UnconfirmedTx> + '_ {
        self.ordered_transactions.values()
    }

    /// The pooled transaction ids, highest weight first.
    pub fn tx_ids(&self) -> Vec<transaction::Hash> {
        self.ordered_transactions.keys().map(|wtx| wtx.id).collect()
    }

    /// The pool entry spending the box `box_id`, if any.
    pub fn spending_tx(&self, box_id: &BoxId) -> Option<&UnconfirmedTx> {
        let wtx = self.inputs.get(box_id)?;
        self.ordered_transactions.get(wtx)
    }

    /// The pool entry that created the box `box_id`, if any.
    pub fn producing_tx(&self, box_id: &BoxId) -> Option<&UnconfirmedTx> {
        let wtx = self.outputs.get(box_id)?;
        self.ordered_transactions.get(wtx)
    }

    /// Returns `true` if any input of `tx` spends a box that a different
    /// pool transaction already spends.
    ///
    /// The pool itself admits conflicting spends (validation happens
    /// upstream); this is the query callers use to reject them.
    pub fn has_spend_conflict(&self, tx: &Transaction) -> bool {
        tx.inputs.iter().any(|input| {
            self.inputs
                .get(&input.box_id)
                .map_or(false, |wtx| wtx.id != tx.id)
        })
    }

    /// Check whether `tx` could enter the pool right now.
    ///
    /// Recently invalidated ids are deliberately not consulted here; callers
    /// decide separately whether to filter on [`Self::is_invalidated`].
    pub fn check_accept(&self, tx: &UnconfirmedTx) -> Result<(), MempoolError> {
        if self.contains(&tx.id) {
            return Err(MempoolError::InMempool);
        }

        if self.len() > self.capacity {
            return Err(MempoolError::Full);
        }

        Ok(())
    }

    /// Returns `true` if [`Self::check_accept`] would succeed for `tx`.
    pub fn can_accept(&self, tx: &UnconfirmedTx) -> bool {
        self.check_accept(tx).is_ok()
    }

    /// Admit `tx` with the given fee factor (its size or execution cost).
    ///
    /// If the id is already pooled, only the stored submitter metadata is
    /// replaced: the weight and the box indices are untouched, because a
    /// transaction with the same id has the same structure. Otherwise the
    /// transaction enters every index, its weight is propagated to its
    /// in-pool ancestors, and the lowest-weight entries are evicted until
    /// the pool is back within capacity.
    ///
    /// # Panics
    ///
    /// If `fee_factor` is zero.
    pub fn put(&mut self, tx: UnconfirmedTx, fee_factor: u64) {
        assert!(fee_factor > 0, "fee factor must be positive");

        if let Some(&wtx) = self.transactions_registry.get(&tx.id) {
            match self.ordered_transactions.get_mut(&wtx) {
                Some(entry) => *entry = tx,
                None => warn!(
                    tx_id = %tx.id,
                    "registry entry without a matching ordered entry, dropping refresh",
                ),
            }
            return;
        }

        let wtx = WeightedTxId::new(&tx.transaction, &self.fee_proposition, fee_factor);
        let transaction = tx.transaction.clone();

        self.transactions_registry.insert(tx.id, wtx);
        for box_id in tx.transaction.output_box_ids() {
            self.outputs.insert(box_id, wtx);
        }
        for box_id in tx.transaction.spent_box_ids() {
            self.inputs.insert(box_id, wtx);
        }
        self.ordered_transactions.insert(wtx, tx);

        self.update_family(&transaction, wtx.weight, Instant::now(), 0);
        self.enforce_capacity();
        self.update_metrics();
    }

    /// Remove `tx` from the pool, reversing its weight contribution to any
    /// in-pool ancestors. Unknown ids are ignored.
    pub fn remove(&mut self, tx: &UnconfirmedTx) {
        let Some(wtx) = self.transactions_registry.remove(&tx.id) else {
            return;
        };

        self.ordered_transactions.remove(&wtx);
        for box_id in tx.transaction.output_box_ids() {
            self.outputs.remove(&box_id);
        }
        for box_id in tx.transaction.spent_box_ids() {
            self.inputs.remove(&box_id);
        }

        self.update_family(&tx.transaction, wtx.weight.saturating_neg(), Instant::now(), 0);
        self.update_metrics();
    }

    /// Remove every transaction in `txs`, in order.
    pub fn remove_all<'a>(&mut self, txs: impl IntoIterator<Item = &'a UnconfirmedTx>) {
        for tx in txs {
            self.remove(tx);
        }
    }

    /// Throw `tx` out of the pool and remember its id so callers can avoid
    /// re-admitting it.
    ///
    /// The id is recorded whether or not the transaction was pooled.
    pub fn invalidate(&mut self, tx: &UnconfirmedTx) {
        if self.contains(&tx.id) {
            self.remove(tx);
        } else if self
            .ordered_transactions
            .keys()
            .any(|wtx| wtx.id == tx.id)
        {
            // An ordered entry the registry does not know about. This state
            // is unreachable through the public interface; purge the entry
            // without weight propagation rather than leave it pinned.
            warn!(tx_id = %tx.id, "purging pool entry missing from the registry");

            self.ordered_transactions.retain(|wtx, _| wtx.id != tx.id);
            self.outputs.retain(|_, wtx| wtx.id != tx.id);
            self.inputs.retain(|_, wtx| wtx.id != tx.id);
        }

        self.invalidated.put(&tx.id);
        metrics::counter!("mempool.invalidated.transactions.total").increment(1);
        self.update_metrics();
    }

    /// Drop every transaction from the pool.
    ///
    /// The invalidation cache is kept: it records decisions about ids, not
    /// entries, and must survive the entries themselves.
    pub fn clear(&mut self) {
        self.ordered_transactions.clear();
        self.transactions_registry.clear();
        self.outputs.clear();
        self.inputs.clear();
        self.update_metrics();
    }

    /// Add `delta` to the weight of every in-pool ancestor of `tx`,
    /// re-keying each ancestor in all indices.
    ///
    /// Each recursion level applies the same `delta` once per distinct
    /// parent; a parent reached through several inputs of the same child is
    /// counted once. Stops early, leaving remaining ancestors at their
    /// current weights, when the depth or time budget is exhausted.
    fn update_family(&mut self, tx: &Transaction, delta: i64, start_time: Instant, depth: usize) {
        if depth > MAX_PARENT_SCAN_DEPTH || start_time.elapsed() > MAX_PARENT_SCAN_TIME {
            warn!(
                tx_id = %tx.id,
                depth,
                "family scan budget exhausted, ancestor weights left partially updated",
            );
            return;
        }

        let mut parents: HashMap<transaction::Hash, WeightedTxId> = HashMap::new();
        for input in &tx.inputs {
            if let Some(&wtx) = self.outputs.get(&input.box_id) {
                parents.insert(wtx.id, wtx);
            }
        }

        for (_, parent_wtx) in parents {
            // A stale edge: the index points at a transaction that is no
            // longer ordered. Skip it.
            let Some(parent) = self.ordered_transactions.get(&parent_wtx).cloned() else {
                continue;
            };

            let promoted = parent_wtx.promoted(delta);

            self.ordered_transactions.remove(&parent_wtx);
            self.ordered_transactions.insert(promoted, parent.clone());
            self.transactions_registry.insert(promoted.id, promoted);
            for box_id in parent.transaction.output_box_ids() {
                self.outputs.insert(box_id, promoted);
            }
            for box_id in parent.transaction.spent_box_ids() {
                self.inputs.insert(box_id, promoted);
            }

            self.update_family(&parent.transaction, delta, start_time, depth + 1);
        }
    }

    /// Evict lowest-weight transactions until the pool fits its capacity.
    ///
    /// Eviction is a full removal: the victim's weight contribution is
    /// reversed out of its ancestors.
    fn enforce_capacity(&mut self) {
        while self.ordered_transactions.len() > self.capacity {
            let Some(victim) = self
                .ordered_transactions
                .iter()
                .next_back()
                .map(|(_, entry)| entry.clone())
            else {
                break;
            };

            debug!(tx_id = %victim.id, "evicting lowest-weight transaction");
            self.remove(&victim);
            metrics::counter!("mempool.evicted.transactions.total").increment(1);
        }
    }

    fn update_metrics(&self) {
        metrics::gauge!("mempool.size").set(self.ordered_transactions.len() as f64);
    }
}
