//! Randomised property tests for the ordered pool.

use std::env;

use proptest::{collection::vec, prelude::*, sample::Index};

use ebbtide_chain::{transaction::UnconfirmedTx, transparent::BoxId};

use super::*;

/// Index rebuilds under proptest shrinking make these tests slow, so the
/// default case count stays modest.
const DEFAULT_POOL_PROPTEST_CASES: u32 = 64;

/// The pool capacity used by the mixed-operation properties.
const SMALL_CAPACITY: u32 = 8;

/// A capacity no scripted sequence can reach, for properties that must not
/// trigger eviction.
const UNREACHABLE_CAPACITY: u32 = 1_000;

/// One scripted action against the pool.
///
/// Picks are resolved against the harness state at apply time, so any
/// generated sequence is valid for any pool.
#[derive(Debug, Clone)]
enum PoolOp {
    /// Admit a fresh transaction spending up to two available boxes.
    Put {
        fee: u64,
        outputs: u8,
        spend_picks: Vec<Index>,
    },
    /// Remove a previously admitted transaction (possibly already gone).
    Remove { pick: Index },
    /// Invalidate a previously admitted transaction (possibly already gone).
    Invalidate { pick: Index },
    /// Offer a previously admitted transaction again with fresh metadata.
    Refresh { pick: Index, metadata: Vec<u8> },
}

fn pool_op() -> impl Strategy<Value = PoolOp> {
    prop_oneof![
        4 => (1u64..100, 1u8..3, vec(any::<Index>(), 0..3)).prop_map(|(fee, outputs, spend_picks)| {
            PoolOp::Put { fee, outputs, spend_picks }
        }),
        1 => any::<Index>().prop_map(|pick| PoolOp::Remove { pick }),
        1 => any::<Index>().prop_map(|pick| PoolOp::Invalidate { pick }),
        1 => (any::<Index>(), vec(any::<u8>(), 0..8)).prop_map(|(pick, metadata)| {
            PoolOp::Refresh { pick, metadata }
        }),
    ]
}

fn put_only_op() -> impl Strategy<Value = PoolOp> {
    (1u64..100, 1u8..3, vec(any::<Index>(), 0..3)).prop_map(|(fee, outputs, spend_picks)| {
        PoolOp::Put {
            fee,
            outputs,
            spend_picks,
        }
    })
}

/// Applies scripted operations to a pool while tracking which boxes are
/// still available to spend, so generated transactions never conflict.
struct Harness {
    pool: OrderedTxPool,
    created: Vec<UnconfirmedTx>,
    unspent: Vec<BoxId>,
    next_seed: u16,
}

impl Harness {
    fn new(capacity: u32) -> Self {
        Self {
            pool: pool_with_capacity(capacity),
            created: Vec::new(),
            unspent: Vec::new(),
            next_seed: 0,
        }
    }

    fn apply(&mut self, op: &PoolOp) {
        match op {
            PoolOp::Put {
                fee,
                outputs,
                spend_picks,
            } => {
                let mut spends = Vec::new();
                for pick in spend_picks {
                    if self.unspent.is_empty() {
                        break;
                    }
                    let chosen = pick.index(self.unspent.len());
                    spends.push(self.unspent.swap_remove(chosen));
                }

                let seed = self.next_seed;
                self.next_seed += 1;

                let tx = unconfirmed_tx(seed, *fee, &spends, *outputs);
                for index in 0..*outputs {
                    self.unspent.push(box_id(seed, index));
                }

                admit(&mut self.pool, &tx);
                self.created.push(tx);
            }
            PoolOp::Remove { pick } => {
                if let Some(tx) = self.pick_created(pick) {
                    self.pool.remove(&tx);
                }
            }
            PoolOp::Invalidate { pick } => {
                if let Some(tx) = self.pick_created(pick) {
                    self.pool.invalidate(&tx);
                }
            }
            PoolOp::Refresh { pick, metadata } => {
                if let Some(tx) = self.pick_created(pick) {
                    self.pool
                        .put(tx.with_metadata(metadata.clone()), TEST_FEE_FACTOR);
                }
            }
        }
    }

    fn pick_created(&self, pick: &Index) -> Option<UnconfirmedTx> {
        if self.created.is_empty() {
            return None;
        }
        Some(self.created[pick.index(self.created.len())].clone())
    }

    /// The observable pool state: ids with their weights, highest first.
    fn snapshot(&self) -> Vec<(ebbtide_chain::transaction::Hash, i64)> {
        self.pool
            .tx_ids()
            .into_iter()
            .map(|id| (id, self.pool.weight(&id).unwrap()))
            .collect()
    }
}

proptest! {
    #![proptest_config(
        proptest::test_runner::Config::with_cases(env::var("PROPTEST_CASES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_POOL_PROPTEST_CASES))
    )]

    /// Any sequence of operations leaves the five indices coherent and the
    /// pool within capacity.
    #[test]
    fn any_operation_sequence_keeps_indices_coherent(
        ops in vec(pool_op(), 1..40),
    ) {
        ebbtide_test::init();

        let mut harness = Harness::new(SMALL_CAPACITY);
        for op in &ops {
            harness.apply(op);

            prop_assert!(harness.pool.len() <= SMALL_CAPACITY as usize);
        }

        assert_pool_consistent(&harness.pool);
    }

    /// Admitting fresh transactions only, parents always weigh at least as
    /// much as the children spending their boxes, even across evictions.
    #[test]
    fn admissions_keep_parent_weights_monotone(
        ops in vec(put_only_op(), 1..40),
    ) {
        ebbtide_test::init();

        let mut harness = Harness::new(SMALL_CAPACITY);
        for op in &ops {
            harness.apply(op);
        }

        assert_pool_consistent(&harness.pool);
        assert_family_weights_monotone(&harness.pool);
    }

    /// Admitting and then removing a fresh transaction restores the exact
    /// previous entries and weights.
    #[test]
    fn put_then_remove_is_an_identity(
        ops in vec(pool_op(), 1..30),
        fee in 1u64..100,
        spend_picks in vec(any::<Index>(), 0..3),
    ) {
        ebbtide_test::init();

        let mut harness = Harness::new(UNREACHABLE_CAPACITY);
        for op in &ops {
            harness.apply(op);
        }

        let before = harness.snapshot();

        harness.apply(&PoolOp::Put { fee, outputs: 1, spend_picks });
        let newcomer = harness.created.last().expect("just created").clone();
        harness.pool.remove(&newcomer);

        prop_assert_eq!(before, harness.snapshot());
        assert_pool_consistent(&harness.pool);
    }

    /// Offering a pooled transaction again never changes its weight, only
    /// its metadata.
    #[test]
    fn refresh_keeps_the_admitted_weight(
        ops in vec(put_only_op(), 1..20),
        pick in any::<Index>(),
        metadata in vec(any::<u8>(), 1..8),
    ) {
        ebbtide_test::init();

        let mut harness = Harness::new(UNREACHABLE_CAPACITY);
        for op in &ops {
            harness.apply(op);
        }

        let target = harness.created[pick.index(harness.created.len())].clone();
        prop_assume!(harness.pool.contains(&target.id));

        let weight_before = harness.pool.weight(&target.id);
        let len_before = harness.pool.len();

        // A different fee factor must not be consulted for a known id.
        harness.pool.put(
            target.clone().with_metadata(metadata.clone()),
            TEST_FEE_FACTOR * 2,
        );

        prop_assert_eq!(harness.pool.weight(&target.id), weight_before);
        prop_assert_eq!(harness.pool.len(), len_before);
        prop_assert_eq!(
            harness.pool.get(&target.id).and_then(|entry| entry.metadata.clone()),
            Some(metadata)
        );
    }

    /// Invalidation removes the entry and remembers the id.
    #[test]
    fn invalidated_transactions_are_remembered(
        ops in vec(pool_op(), 1..30),
        pick in any::<Index>(),
    ) {
        ebbtide_test::init();

        let mut harness = Harness::new(SMALL_CAPACITY);
        for op in &ops {
            harness.apply(op);
        }
        prop_assume!(!harness.created.is_empty());

        let target = harness.created[pick.index(harness.created.len())].clone();
        harness.pool.invalidate(&target);

        prop_assert!(!harness.pool.contains(&target.id));
        prop_assert!(harness.pool.is_invalidated(&target.id));
        assert_pool_consistent(&harness.pool);
    }
}
