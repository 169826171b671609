use super::transform::MeritWeight;
use super::weighted_index::WeightedIndex;
use super::Schedule;
use crate::error::{EvoError, EvoResult};
use crate::policy::WeightTransform;
use fastrand::Rng;
use tracing::debug;

/// Merit-proportional scheduling inside each deme, round-robin across demes.
///
/// Every deme owns one [`WeightedIndex`] over its local slots. Each call to
/// [`next_slot`](Schedule::next_slot) moves to the next deme before drawing,
/// so over any `num_demes` consecutive calls every deme is the source
/// exactly once, whatever its organisms' merits.
pub struct DemeScheduler<W: MeritWeight = WeightTransform> {
    num_demes: usize,
    deme_size: usize,
    charts: Vec<WeightedIndex>,
    curr_deme: usize,
    rng: Rng,
    weight: W,
}

impl DemeScheduler<WeightTransform> {
    pub fn with_identity(num_slots: usize, num_demes: usize, seed: u64) -> EvoResult<Self> {
        Self::new(num_slots, num_demes, seed, WeightTransform::Identity)
    }
}

impl<W: MeritWeight> DemeScheduler<W> {
    pub fn new(num_slots: usize, num_demes: usize, seed: u64, weight: W) -> EvoResult<Self> {
        if num_demes == 0 {
            return Err(EvoError::Config("number of demes must be positive".into()));
        }
        if num_slots == 0 || num_slots % num_demes != 0 {
            return Err(EvoError::Config(format!(
                "{} slots cannot be split into {} equal demes",
                num_slots, num_demes
            )));
        }

        let deme_size = num_slots / num_demes;
        debug!(
            "Deme scheduler: {} demes x {} slots, seed {}",
            num_demes, deme_size, seed
        );

        Ok(Self {
            num_demes,
            deme_size,
            charts: (0..num_demes).map(|_| WeightedIndex::new(deme_size)).collect(),
            // First call lands on deme 0.
            curr_deme: num_demes - 1,
            rng: Rng::with_seed(seed),
            weight,
        })
    }

    #[inline(always)]
    pub fn num_demes(&self) -> usize {
        self.num_demes
    }

    #[inline(always)]
    pub fn deme_size(&self) -> usize {
        self.deme_size
    }

    /// Deme that will be drawn from on the next call.
    pub fn upcoming_deme(&self) -> usize {
        (self.curr_deme + 1) % self.num_demes
    }

    /// Current weight stored for `slot`.
    pub fn slot_weight(&self, slot: usize) -> EvoResult<f64> {
        let deme = slot / self.deme_size;
        match self.charts.get(deme) {
            Some(chart) => chart.weight(slot % self.deme_size),
            None => Err(EvoError::Range {
                index: slot,
                size: self.num_slots(),
            }),
        }
    }

    pub fn deme_total(&self, deme: usize) -> Option<f64> {
        self.charts.get(deme).map(WeightedIndex::total)
    }
}

impl<W: MeritWeight> Schedule for DemeScheduler<W> {
    fn adjust(&mut self, slot: usize, merit: f64, deme: usize) -> EvoResult<()> {
        if deme >= self.num_demes || slot / self.deme_size != deme {
            return Err(EvoError::InvalidSlot { slot, deme });
        }
        let weight = self.weight.weight(merit);
        self.charts[deme].adjust(slot % self.deme_size, weight)
    }

    fn next_slot(&mut self) -> usize {
        self.curr_deme = (self.curr_deme + 1) % self.num_demes;
        let local = self.charts[self.curr_deme].draw(&mut self.rng);
        self.curr_deme * self.deme_size + local
    }

    fn num_slots(&self) -> usize {
        self.num_demes * self.deme_size
    }

    fn deme_of(&self, slot: usize) -> usize {
        slot / self.deme_size
    }
}
