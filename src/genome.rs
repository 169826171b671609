use serde::{Deserialize, Serialize};

/// An organism's program, as a sequence of instruction ids.
///
/// Only the length and per-instruction counts matter to merit and
/// phenotype bookkeeping; decoding is the virtual CPU's business.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Genome(Vec<u16>);

impl Genome {
    pub fn new(instructions: Vec<u16>) -> Self {
        Self(instructions)
    }

    /// Uniform random genome of `len` instructions drawn from
    /// `0..num_instructions`.
    pub fn random(rng: &mut fastrand::Rng, len: usize, num_instructions: usize) -> Self {
        let upper = num_instructions.clamp(1, u16::MAX as usize) as u16;
        Self((0..len).map(|_| rng.u16(0..upper)).collect())
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn instructions(&self) -> &[u16] {
        &self.0
    }

    pub fn count_instruction(&self, id: u16) -> usize {
        self.0.iter().filter(|&&i| i == id).count()
    }
}

impl From<Vec<u16>> for Genome {
    fn from(v: Vec<u16>) -> Self {
        Self(v)
    }
}
