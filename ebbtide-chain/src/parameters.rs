//! Chain parameters consumed by Ebbtide components.

use crate::transparent::Script;

/// Monetary parameters of the chain.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MonetarySettings {
    /// The proposition guarding fee-recipient outputs.
    ///
    /// A transaction's fee is the total value of its outputs locked by this
    /// script; block producers collect those boxes when the transaction is
    /// included.
    pub fee_proposition: Script,
}

impl MonetarySettings {
    /// Create monetary settings with the given fee proposition.
    pub fn new(fee_proposition: Script) -> Self {
        Self { fee_proposition }
    }
}
