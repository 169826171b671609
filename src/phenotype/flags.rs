use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter};

/// Categories of altruistic donation an organism can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCountMacro, Display)]
pub enum DonorKind {
    General,
    Rand,
    Null,
    Kin,
    Edit,
    Gbg,
    TrueGb,
    ThreshGb,
    QuantaThreshGb,
}

/// Categories of donation an organism can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCountMacro, Display)]
pub enum ReceiverKind {
    General,
    Rand,
    Kin,
    Edit,
    Gbg,
    TrueGb,
    ThreshGb,
    QuantaThreshGb,
}

pub trait FlagKind: Copy + IntoEnumIterator {
    fn index(self) -> usize;
}

impl FlagKind for DonorKind {
    #[inline(always)]
    fn index(self) -> usize {
        self as usize
    }
}

impl FlagKind for ReceiverKind {
    #[inline(always)]
    fn index(self) -> usize {
        self as usize
    }
}

/// A status flag for this generation and its value at the previous reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagPair {
    pub cur: bool,
    pub last: bool,
}

impl FlagPair {
    #[inline(always)]
    fn roll(&mut self) {
        self.last = self.cur;
        self.cur = false;
    }
}

/// One [`FlagPair`] per category, indexed by the category enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagTable<K: FlagKind, const N: usize> {
    pairs: [FlagPair; N],
    _kind: PhantomData<K>,
}

pub type DonorFlags = FlagTable<DonorKind, { DonorKind::COUNT }>;
pub type ReceiverFlags = FlagTable<ReceiverKind, { ReceiverKind::COUNT }>;

impl<K: FlagKind, const N: usize> Default for FlagTable<K, N> {
    fn default() -> Self {
        Self {
            pairs: [FlagPair::default(); N],
            _kind: PhantomData,
        }
    }
}

impl<K: FlagKind, const N: usize> FlagTable<K, N> {
    pub fn get(&self, kind: K) -> FlagPair {
        self.pairs[kind.index()]
    }

    pub fn set(&mut self, kind: K) {
        self.pairs[kind.index()].cur = true;
    }

    pub fn is_set(&self, kind: K) -> bool {
        self.pairs[kind.index()].cur
    }

    pub fn was_set(&self, kind: K) -> bool {
        self.pairs[kind.index()].last
    }

    /// Reset carry rule: every current flag becomes the last flag and the
    /// current flag clears.
    pub fn roll(&mut self) {
        self.pairs.iter_mut().for_each(FlagPair::roll);
    }

    /// Birth rule: a new organism starts clear and inherits the parent's
    /// last flags.
    pub fn inherit(parent: &Self) -> Self {
        let mut out = Self::default();
        for (mine, theirs) in out.pairs.iter_mut().zip(parent.pairs.iter()) {
            mine.last = theirs.last;
        }
        out
    }

    pub fn pairs(&self) -> &[FlagPair] {
        &self.pairs
    }

    pub fn from_pairs(pairs: &[FlagPair]) -> Option<Self> {
        let pairs: [FlagPair; N] = pairs.try_into().ok()?;
        Some(Self {
            pairs,
            _kind: PhantomData,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, FlagPair)> + '_ {
        K::iter().map(move |k| (k, self.pairs[k.index()]))
    }
}
