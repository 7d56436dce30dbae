//! Private inputs and witness types.
//!
//! Neither type implements `Serialize`, and both redact their `Debug`
//! output, so coordinates cannot leak through logs or persisted requests.
//! They cross into the proving boundary by value and are dropped there.

use std::fmt;

use protocol::{Commitment, Nullifier};

/// Secret opening of a treasure commitment.
pub struct PrivateInputs {
    pub x: u32,
    pub y: u32,
    pub nullifier: Nullifier,
}

impl fmt::Debug for PrivateInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateInputs(..)")
    }
}

/// Executed witness for the commitment relation.
///
/// Produced only by [`Prover::execute`](crate::Prover::execute), which
/// guarantees the embedded commitment opens to the private values.
pub struct Witness {
    pub(crate) x: u32,
    pub(crate) y: u32,
    pub(crate) nullifier: Nullifier,
    pub(crate) commitment: Commitment,
}

impl Witness {
    /// Public side of the relation; everything else stays private.
    pub fn commitment(&self) -> &Commitment {
        &self.commitment
    }
}

impl fmt::Debug for Witness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Witness({})", self.commitment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_never_shows_coordinates() {
        let inputs = PrivateInputs {
            x: 1234,
            y: 777,
            nullifier: Nullifier::from_u64(9),
        };
        let shown = format!("{inputs:?}");
        assert_eq!(shown, "PrivateInputs(..)");
        assert!(!shown.contains("1234"));
        assert!(!shown.contains("777"));
    }
}
