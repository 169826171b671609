use crate::error::{EvoError, EvoResult};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub scheduler: SchedulerParams,
    #[command(flatten)]
    pub merit: MeritParams,
    #[command(flatten)]
    pub energy: EnergyParams,
    #[command(flatten)]
    pub lifecycle: LifecycleParams,
    #[command(flatten)]
    pub environment: EnvironmentShape,
    #[command(flatten)]
    pub driver: DriverParams,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerParams {
    /// Number of execution slots (N).
    #[arg(long, default_value_t = 3600)]
    pub world_size: usize,
    #[arg(long, default_value_t = 1)]
    pub num_demes: usize,
    #[arg(long, default_value = "deme-probabilistic")]
    pub slicing_method: String,
    #[arg(long, default_value = "identity")]
    pub weight_transform: String,
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Instructions executed per scheduled slot.
    #[arg(long, default_value_t = 1)]
    pub burst_size: usize,
}

impl Default for SchedulerParams {
    fn default() -> Self {
        Self {
            world_size: 3600,
            num_demes: 1,
            slicing_method: "deme-probabilistic".to_string(),
            weight_transform: "identity".to_string(),
            seed: 0,
            burst_size: 1,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeritParams {
    #[arg(long, default_value = "least-size")]
    pub base_merit_method: String,
    #[arg(long, default_value_t = 100)]
    pub base_const_merit: u32,
    /// Instruction id counted by the `bonus-inst` merit method.
    #[arg(long, default_value_t = 0)]
    pub merit_bonus_inst: u16,
    /// Sign selects reward (> 0), penalty (< 0) or no effect (0).
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub merit_bonus_effect: i32,
    #[arg(long, default_value_t = false)]
    pub fitness_valley: bool,
    #[arg(long, default_value_t = 0)]
    pub fitness_valley_start: u32,
    #[arg(long, default_value_t = 0)]
    pub fitness_valley_stop: u32,
    #[arg(long, default_value_t = 1.0)]
    pub default_bonus: f64,
    /// Reset merit with the default bonus instead of the earned one.
    #[arg(long, default_value_t = false)]
    pub merit_default_bonus: bool,
    #[arg(long, default_value = "normal")]
    pub fitness_method: String,
    #[arg(long, default_value_t = 1.0)]
    pub fitness_coeff: f64,
}

impl Default for MeritParams {
    fn default() -> Self {
        Self {
            base_merit_method: "least-size".to_string(),
            base_const_merit: 100,
            merit_bonus_inst: 0,
            merit_bonus_effect: 0,
            fitness_valley: false,
            fitness_valley_start: 0,
            fitness_valley_stop: 0,
            default_bonus: 1.0,
            merit_default_bonus: false,
            fitness_method: "normal".to_string(),
            fitness_coeff: 1.0,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyParams {
    #[arg(long, default_value_t = false)]
    pub energy_enabled: bool,
    #[arg(long, default_value_t = 0.0)]
    pub energy_given_on_inject: f64,
    #[arg(long, default_value_t = 0.0)]
    pub energy_given_at_birth: f64,
    #[arg(long, default_value_t = 0.5)]
    pub frac_parent_energy_given_at_birth: f64,
    #[arg(long, default_value_t = 0.0)]
    pub frac_energy_decay_at_birth: f64,
    /// Negative means the store is unbounded.
    #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
    pub energy_cap: f64,
    #[arg(long, default_value = "on-divide")]
    pub apply_energy_method: String,
    #[arg(long, default_value_t = 0)]
    pub num_cycles_exc_before_0_energy: u32,
    /// Positive values pin the metabolic rate and ignore stored energy.
    #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
    pub fix_metabolic_rate: f64,
}

impl Default for EnergyParams {
    fn default() -> Self {
        Self {
            energy_enabled: false,
            energy_given_on_inject: 0.0,
            energy_given_at_birth: 0.0,
            frac_parent_energy_given_at_birth: 0.5,
            frac_energy_decay_at_birth: 0.0,
            energy_cap: -1.0,
            apply_energy_method: "on-divide".to_string(),
            num_cycles_exc_before_0_energy: 0,
            fix_metabolic_rate: -1.0,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleParams {
    #[arg(long, default_value = "split")]
    pub divide_method: String,
    #[arg(long, default_value = "both")]
    pub generation_inc_method: String,
    /// Half-life (in updates) of the task refractory discount; 0 disables it.
    #[arg(long, default_value_t = 0.0)]
    pub task_refractory_period: f64,
}

impl Default for LifecycleParams {
    fn default() -> Self {
        Self {
            divide_method: "split".to_string(),
            generation_inc_method: "both".to_string(),
            task_refractory_period: 0.0,
        }
    }
}

/// Knobs of the reference population driver. The library core never
/// reads these.
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverParams {
    #[arg(long, default_value_t = 100)]
    pub updates: usize,
    /// Genome length of the injected ancestors.
    #[arg(long, default_value_t = 100)]
    pub ancestor_length: usize,
    /// Chance that one executed instruction completes a random task.
    #[arg(long, default_value_t = 0.005)]
    pub task_chance: f64,
}

impl Default for DriverParams {
    fn default() -> Self {
        Self {
            updates: 100,
            ancestor_length: 100,
            task_chance: 0.005,
        }
    }
}

/// Sizes of the per-organism counter arrays.
#[derive(Args, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EnvironmentShape {
    #[arg(long, default_value_t = 9)]
    pub num_tasks: usize,
    #[arg(long, default_value_t = 9)]
    pub num_reactions: usize,
    #[arg(long, default_value_t = 0)]
    pub num_resources: usize,
    #[arg(long, default_value_t = 26)]
    pub num_instructions: usize,
}

impl Default for EnvironmentShape {
    fn default() -> Self {
        Self {
            num_tasks: 9,
            num_reactions: 9,
            num_resources: 0,
            num_instructions: 26,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> EvoResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            EvoError::Config(format!("failed to read config '{}': {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Copies every value the user typed on the command line over `self`,
    /// leaving file-provided values alone where the CLI only had defaults.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($group:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$group.$field = cli.$group.$field.clone();
                }
            };
        }

        update_if_present!(scheduler.world_size);
        update_if_present!(scheduler.num_demes);
        update_if_present!(scheduler.slicing_method);
        update_if_present!(scheduler.weight_transform);
        update_if_present!(scheduler.seed);
        update_if_present!(scheduler.burst_size);

        update_if_present!(merit.base_merit_method);
        update_if_present!(merit.base_const_merit);
        update_if_present!(merit.merit_bonus_inst);
        update_if_present!(merit.merit_bonus_effect);
        update_if_present!(merit.fitness_valley);
        update_if_present!(merit.fitness_valley_start);
        update_if_present!(merit.fitness_valley_stop);
        update_if_present!(merit.default_bonus);
        update_if_present!(merit.merit_default_bonus);
        update_if_present!(merit.fitness_method);
        update_if_present!(merit.fitness_coeff);

        update_if_present!(energy.energy_enabled);
        update_if_present!(energy.energy_given_on_inject);
        update_if_present!(energy.energy_given_at_birth);
        update_if_present!(energy.frac_parent_energy_given_at_birth);
        update_if_present!(energy.frac_energy_decay_at_birth);
        update_if_present!(energy.energy_cap);
        update_if_present!(energy.apply_energy_method);
        update_if_present!(energy.num_cycles_exc_before_0_energy);
        update_if_present!(energy.fix_metabolic_rate);

        update_if_present!(lifecycle.divide_method);
        update_if_present!(lifecycle.generation_inc_method);
        update_if_present!(lifecycle.task_refractory_period);

        update_if_present!(environment.num_tasks);
        update_if_present!(environment.num_reactions);
        update_if_present!(environment.num_resources);
        update_if_present!(environment.num_instructions);

        update_if_present!(driver.updates);
        update_if_present!(driver.ancestor_length);
        update_if_present!(driver.task_chance);
    }
}

impl EnergyParams {
    /// Upper bound of the energy store; unbounded when the cap is negative.
    #[inline(always)]
    pub fn effective_cap(&self) -> f64 {
        if self.energy_cap < 0.0 {
            f64::INFINITY
        } else {
            self.energy_cap
        }
    }
}
