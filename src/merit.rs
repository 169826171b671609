//! Merit and fitness calculations.
//!
//! Everything here is a pure function of the run settings and the size or
//! execution statistics handed in; the phenotype decides when to call them.

use crate::consts::ENERGY_TO_MERIT_SCALE;
use crate::policy::{BaseMeritMethod, FitnessMethod};
use crate::settings::RunSettings;

/// Genome statistics consumed by the base-merit policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizeStats {
    pub genome_length: usize,
    pub copied_size: usize,
    pub executed_size: usize,
    pub bonus_instruction_count: usize,
}

impl SizeStats {
    #[inline(always)]
    pub fn least_size(&self) -> usize {
        self.genome_length
            .min(self.copied_size)
            .min(self.executed_size)
    }
}

pub struct MeritModel<'a> {
    settings: &'a RunSettings,
}

impl<'a> MeritModel<'a> {
    pub fn new(settings: &'a RunSettings) -> Self {
        Self { settings }
    }

    /// Base merit under the configured policy.
    ///
    /// # Panics
    /// If any of the three sizes is zero. A zero size means the CPU layer
    /// handed over a corrupt organism.
    pub fn base_merit(&self, stats: &SizeStats) -> u32 {
        assert!(stats.genome_length > 0, "base merit with empty genome");
        assert!(stats.copied_size > 0, "base merit with zero copied size");
        assert!(stats.executed_size > 0, "base merit with zero executed size");

        let s = self.settings;
        let out = match s.base_merit_method {
            BaseMeritMethod::Constant => return s.base_const_merit,
            BaseMeritMethod::CopiedSize => stats.copied_size,
            BaseMeritMethod::ExecutedSize => stats.executed_size,
            BaseMeritMethod::FullSize => stats.genome_length,
            BaseMeritMethod::LeastSize => stats.least_size(),
            BaseMeritMethod::SqrtLeastSize => (stats.least_size() as f64).sqrt() as usize,
            BaseMeritMethod::NumBonusInst => self.bonus_instruction_merit(stats),
        };

        out.min(u32::MAX as usize) as u32
    }

    fn bonus_instruction_merit(&self, stats: &SizeStats) -> usize {
        let s = self.settings;
        let count = stats.bonus_instruction_count;

        if s.fitness_valley
            && count >= s.fitness_valley_start as usize
            && count <= s.fitness_valley_stop as usize
        {
            return 1;
        }

        // The +1 keeps a bonus-free organism schedulable.
        match s.merit_bonus_effect.signum() {
            1 => 1 + count,
            -1 => (stats.genome_length + 1).saturating_sub(count),
            _ => 1,
        }
    }

    /// Fitness under the configured policy.
    ///
    /// # Panics
    /// Under the normal policy when `gestation_time` is zero.
    pub fn fitness(&self, base_merit: f64, bonus: f64, gestation_time: u64, _cpu_cycles: u64) -> f64 {
        let s = self.settings;
        match s.fitness_method {
            FitnessMethod::Normal => {
                assert!(
                    gestation_time > 0,
                    "fitness requested with zero gestation time"
                );
                base_merit * bonus / gestation_time as f64
            }
            FitnessMethod::DiminishingReturns => {
                let net_bonus = bonus - s.default_bonus;
                let decay = (gestation_time as f64 * (1.0 - s.fitness_coeff).ln()).exp();
                net_bonus / (net_bonus + 1.0) * decay
            }
        }
    }

    /// Merit an organism may claim from its stored energy.
    pub fn energy_to_merit(&self, energy: f64) -> f64 {
        let s = self.settings;
        if s.fix_metabolic_rate > 0.0 {
            return ENERGY_TO_MERIT_SCALE * s.fix_metabolic_rate;
        }
        if s.num_cycles_exc_before_0_energy == 0 {
            return 0.0;
        }
        ENERGY_TO_MERIT_SCALE * energy / s.num_cycles_exc_before_0_energy as f64
    }
}
