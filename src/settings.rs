use crate::config::{Config, EnvironmentShape};
use crate::error::{EvoError, EvoResult};
use crate::policy::{
    parse_policy, ApplyEnergyMethod, BaseMeritMethod, DivideMethod, FitnessMethod,
    GenerationIncMethod, SlicingMethod, WeightTransform,
};
use tracing::{debug, info};
use typed_builder::TypedBuilder;

/// Resolved, immutable run configuration.
///
/// Built once from a [`Config`] and shared by every phenotype and by the
/// scheduler factory through an `Arc`. Nothing in the run mutates it.
#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct RunSettings {
    // Scheduler
    #[builder(default = 3600)]
    pub world_size: usize,
    #[builder(default = 1)]
    pub num_demes: usize,
    #[builder(default = SlicingMethod::DemeProbabilistic)]
    pub slicing_method: SlicingMethod,
    #[builder(default)]
    pub weight_transform: WeightTransform,
    #[builder(default = 0)]
    pub seed: u64,
    #[builder(default = 1)]
    pub burst_size: usize,

    // Merit
    #[builder(default = BaseMeritMethod::LeastSize)]
    pub base_merit_method: BaseMeritMethod,
    #[builder(default = 100)]
    pub base_const_merit: u32,
    #[builder(default = 0)]
    pub merit_bonus_inst: u16,
    #[builder(default = 0)]
    pub merit_bonus_effect: i32,
    #[builder(default = false)]
    pub fitness_valley: bool,
    #[builder(default = 0)]
    pub fitness_valley_start: u32,
    #[builder(default = 0)]
    pub fitness_valley_stop: u32,
    #[builder(default = 1.0)]
    pub default_bonus: f64,
    #[builder(default = false)]
    pub merit_default_bonus: bool,
    #[builder(default = FitnessMethod::Normal)]
    pub fitness_method: FitnessMethod,
    #[builder(default = 1.0)]
    pub fitness_coeff: f64,

    // Energy
    #[builder(default = false)]
    pub energy_enabled: bool,
    #[builder(default = 0.0)]
    pub energy_given_on_inject: f64,
    #[builder(default = 0.0)]
    pub energy_given_at_birth: f64,
    #[builder(default = 0.5)]
    pub frac_parent_energy_given_at_birth: f64,
    #[builder(default = 0.0)]
    pub frac_energy_decay_at_birth: f64,
    /// Already resolved: `f64::INFINITY` when unbounded.
    #[builder(default = f64::INFINITY)]
    pub energy_cap: f64,
    #[builder(default = ApplyEnergyMethod::OnDivide)]
    pub apply_energy_method: ApplyEnergyMethod,
    #[builder(default = 0)]
    pub num_cycles_exc_before_0_energy: u32,
    #[builder(default = -1.0)]
    pub fix_metabolic_rate: f64,

    // Lifecycle
    #[builder(default = DivideMethod::Split)]
    pub divide_method: DivideMethod,
    #[builder(default = GenerationIncMethod::Both)]
    pub generation_inc_method: GenerationIncMethod,
    #[builder(default = 0.0)]
    pub task_refractory_period: f64,

    #[builder(default)]
    pub shape: EnvironmentShape,
}

impl Default for RunSettings {
    fn default() -> Self {
        RunSettings::builder().build()
    }
}

impl RunSettings {
    pub fn from_config(cfg: &Config) -> EvoResult<Self> {
        let s = &cfg.scheduler;
        let m = &cfg.merit;
        let e = &cfg.energy;
        let l = &cfg.lifecycle;

        let settings = Self {
            world_size: s.world_size,
            num_demes: s.num_demes,
            slicing_method: parse_policy(&s.slicing_method, "slicing method")?,
            weight_transform: parse_policy(&s.weight_transform, "weight transform")?,
            seed: s.seed,
            burst_size: s.burst_size,

            base_merit_method: parse_policy(&m.base_merit_method, "base merit method")?,
            base_const_merit: m.base_const_merit,
            merit_bonus_inst: m.merit_bonus_inst,
            merit_bonus_effect: m.merit_bonus_effect,
            fitness_valley: m.fitness_valley,
            fitness_valley_start: m.fitness_valley_start,
            fitness_valley_stop: m.fitness_valley_stop,
            default_bonus: m.default_bonus,
            merit_default_bonus: m.merit_default_bonus,
            fitness_method: parse_policy(&m.fitness_method, "fitness method")?,
            fitness_coeff: m.fitness_coeff,

            energy_enabled: e.energy_enabled,
            energy_given_on_inject: e.energy_given_on_inject,
            energy_given_at_birth: e.energy_given_at_birth,
            frac_parent_energy_given_at_birth: e.frac_parent_energy_given_at_birth,
            frac_energy_decay_at_birth: e.frac_energy_decay_at_birth,
            energy_cap: e.effective_cap(),
            apply_energy_method: parse_policy(&e.apply_energy_method, "energy application method")?,
            num_cycles_exc_before_0_energy: e.num_cycles_exc_before_0_energy,
            fix_metabolic_rate: e.fix_metabolic_rate,

            divide_method: parse_policy(&l.divide_method, "divide method")?,
            generation_inc_method: parse_policy(&l.generation_inc_method, "generation increment method")?,
            task_refractory_period: l.task_refractory_period,

            shape: cfg.environment,
        };

        settings.validate()?;

        info!(
            "⚙️  Resolved settings: {} slots / {} demes, slicing={}, merit={}, fitness={}",
            settings.world_size,
            settings.num_demes,
            settings.slicing_method,
            settings.base_merit_method,
            settings.fitness_method
        );
        debug!(
            "Lifecycle: divide={}, generation={}, energy={} ({})",
            settings.divide_method,
            settings.generation_inc_method,
            settings.energy_enabled,
            settings.apply_energy_method
        );

        Ok(settings)
    }

    /// Checks the cross-field constraints the partitioning and energy
    /// model depend on.
    pub fn validate(&self) -> EvoResult<()> {
        if self.world_size == 0 {
            return Err(EvoError::Config("world size must be positive".into()));
        }
        if self.num_demes == 0 {
            return Err(EvoError::Config("number of demes must be positive".into()));
        }
        if self.world_size % self.num_demes != 0 {
            return Err(EvoError::Config(format!(
                "world size {} is not divisible by {} demes",
                self.world_size, self.num_demes
            )));
        }
        if self.burst_size == 0 {
            return Err(EvoError::Config("burst size must be positive".into()));
        }
        if self.default_bonus < 0.0 || !self.default_bonus.is_finite() {
            return Err(EvoError::Config(format!(
                "default bonus {} must be finite and non-negative",
                self.default_bonus
            )));
        }
        if self.energy_enabled
            && self.num_cycles_exc_before_0_energy == 0
            && self.fix_metabolic_rate <= 0.0
        {
            return Err(EvoError::Config(
                "energy accounting needs a positive cycles-before-exhaustion value or a fixed metabolic rate"
                    .into(),
            ));
        }
        Ok(())
    }

    #[inline(always)]
    pub fn deme_size(&self) -> usize {
        self.world_size / self.num_demes
    }
}
