//! Unconfirmed Ebbtide transactions.
//!
//! [`UnconfirmedTx`] pairs a [`Transaction`] with its pre-calculated id and
//! any opaque data the submitter attached. The mempool stores these wrappers
//! rather than bare transactions.

use std::sync::Arc;

use super::{Hash, Transaction};

/// An unconfirmed transaction, its pre-calculated identifying id, and opaque
/// submitter metadata.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnconfirmedTx {
    /// A unique identifier for this unconfirmed transaction.
    pub id: Hash,

    /// The unconfirmed transaction itself.
    pub transaction: Arc<Transaction>,

    /// Opaque data attached by the submitter.
    ///
    /// Carried through the pool unchanged; takes no part in identity,
    /// ordering, or weighting. Offering the same transaction again replaces
    /// this field.
    pub metadata: Option<Vec<u8>>,
}

impl UnconfirmedTx {
    /// Returns this wrapper with `metadata` attached.
    pub fn with_metadata(mut self, metadata: Vec<u8>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

// Each of these conversions avoids cloning the transaction where possible.

impl From<Transaction> for UnconfirmedTx {
    fn from(transaction: Transaction) -> Self {
        Self {
            id: transaction.id,
            transaction: Arc::new(transaction),
            metadata: None,
        }
    }
}

impl From<&Transaction> for UnconfirmedTx {
    fn from(transaction: &Transaction) -> Self {
        Self {
            id: transaction.id,
            transaction: Arc::new(transaction.clone()),
            metadata: None,
        }
    }
}

impl From<Arc<Transaction>> for UnconfirmedTx {
    fn from(transaction: Arc<Transaction>) -> Self {
        Self {
            id: transaction.id,
            transaction,
            metadata: None,
        }
    }
}

impl From<&Arc<Transaction>> for UnconfirmedTx {
    fn from(transaction: &Arc<Transaction>) -> Self {
        Self {
            id: transaction.id,
            transaction: transaction.clone(),
            metadata: None,
        }
    }
}
