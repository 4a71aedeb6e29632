//! Transparent box (UTXO) functionality.

mod script;

pub use script::Script;

use std::fmt;

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// BoxId
///
/// The unique identifier of a box created by a transaction output.
#[derive(Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Hash)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct BoxId(pub [u8; 32]);

impl From<[u8; 32]> for BoxId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<BoxId> for [u8; 32] {
    fn from(id: BoxId) -> Self {
        id.0
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("BoxId").field(&hex::encode(self.0)).finish()
    }
}

/// A transparent input to a transaction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Input {
    /// The box being spent by this input.
    pub box_id: BoxId,

    /// The script that authorizes spending `box_id`.
    pub unlock_script: Script,
}

impl Input {
    /// Create an input spending `box_id`.
    pub fn new(box_id: BoxId, unlock_script: Script) -> Self {
        Self {
            box_id,
            unlock_script,
        }
    }
}

/// A transparent output box created by a transaction.
///
/// The most fundamental building block of a transaction is an output box --
/// the funds you own are in fact a subset of the unspent boxes of the global
/// UTXO set. Boxes are indivisible, discrete units of value which can only
/// be consumed in their entirety.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Output {
    /// The unique identifier assigned to this box when its transaction was
    /// built.
    pub id: BoxId,

    /// The value stored in this box.
    pub value: u64,

    /// The lock script defines the conditions under which this box can be
    /// spent.
    pub lock_script: Script,
}

impl Output {
    /// Returns `true` if this box is guarded by `proposition`.
    pub fn pays_to(&self, proposition: &Script) -> bool {
        &self.lock_script == proposition
    }
}
