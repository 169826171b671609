//! Per-organism phenotype: everything about an organism that is not its
//! genome.
//!
//! Fields fall into four groups with different lifetimes:
//!
//! 1. divide-locked values (merit, gestation time, fitness, sizes), fixed
//!    at the last reproduction and read by the scheduler;
//! 2. the current [`GenerationStats`], filled in while the CPU runs;
//! 3. the last [`GenerationStats`], frozen at the previous reset;
//! 4. status flags and child-birth parameters, each with its own carry
//!    rule.
//!
//! A phenotype starts `Uninitialized`, becomes `Active` through exactly one
//! of the `setup_*` calls, goes through any number of resets and ends
//! `Terminated`. Calling a reset or a recorder outside `Active` is a caller
//! bug and panics.

pub mod energy;
pub mod flags;
pub mod outcome;
pub mod record;
pub mod stats;
pub mod task_state;

pub use self::flags::{DonorFlags, DonorKind, FlagPair, ReceiverFlags, ReceiverKind};
pub use self::outcome::{ExecutionOutcome, StepDelta};
pub use self::record::PhenotypeRecord;
pub use self::stats::GenerationStats;
pub use self::task_state::{TaskKey, TaskState, TaskStates};

use crate::consts::{DEFAULT_DIV_TYPE, MATE_SELECT_UNSET, RESOURCE_NOT_DETECTED};
use crate::genome::Genome;
use crate::merit::{MeritModel, SizeStats};
use crate::policy::{DivideMethod, GenerationIncMethod};
use crate::rng;
use crate::settings::RunSettings;
use fastrand::Rng;
use std::cmp::Ordering;
use std::fmt::Write as _;
use std::mem;
use std::sync::Arc;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LifeState {
    Uninitialized,
    Active,
    Terminated,
}

#[derive(Debug, Clone)]
pub struct Phenotype {
    settings: Arc<RunSettings>,
    state: LifeState,

    // 1. Divide-locked
    merit: f64,
    execution_ratio: f64,
    energy_store: f64,
    energy_to_be_applied: f64,
    genome_length: usize,
    bonus_instruction_count: usize,
    copied_size: usize,
    executed_size: usize,
    gestation_time: u64,
    gestation_start: u64,
    fitness: f64,
    div_type: f64,

    // 2. In progress
    cur: GenerationStats,
    eff_task_count: Vec<u32>,
    cur_task_time: Vec<f64>,
    sensed_resources: Vec<f64>,
    /// Instructions the latest outcome asked the CPU to run.
    insts_triggered: Vec<u16>,
    task_states: TaskStates,
    trial_fitnesses: Vec<f64>,
    trial_bonuses: Vec<f64>,
    trial_times_used: Vec<u64>,
    trial_time_used: u64,
    trial_cpu_cycles_used: u64,

    // 3. Last generation
    last: GenerationStats,
    last_merit_base: f64,
    last_fitness: f64,

    // Life records
    num_divides: u32,
    generation: u32,
    time_used: u64,
    age: u64,
    fault_desc: String,
    neutral_metric: f64,
    life_fitness: f64,

    // 4. Status flags
    to_die: bool,
    to_delete: bool,
    is_injected: bool,
    donor: DonorFlags,
    receiver: ReceiverFlags,
    num_thresh_gb_donations: u32,
    num_thresh_gb_donations_last: u32,
    num_quanta_thresh_gb_donations: u32,
    num_quanta_thresh_gb_donations_last: u32,
    is_modifier: bool,
    is_modified: bool,
    is_fertile: bool,
    is_mutated: bool,
    is_multi_thread: bool,
    parent_true: bool,
    parent_sex: bool,
    parent_cross_num: u32,

    // Child info
    copy_true: bool,
    divide_sex: bool,
    mate_select_id: i32,
    cross_num: u32,
    child_fertile: bool,
    last_child_fertile: bool,
    child_copied_size: usize,
}

impl Phenotype {
    /// Empty phenotype sized for the run's environment. Must be set up with
    /// exactly one of the `setup_*` calls before use.
    pub fn new(settings: Arc<RunSettings>) -> Self {
        let shape = settings.shape;
        let default_bonus = settings.default_bonus;
        Self {
            state: LifeState::Uninitialized,

            merit: 0.0,
            execution_ratio: 1.0,
            energy_store: 0.0,
            energy_to_be_applied: 0.0,
            genome_length: 0,
            bonus_instruction_count: 0,
            copied_size: 0,
            executed_size: 0,
            gestation_time: 0,
            gestation_start: 0,
            fitness: 0.0,
            div_type: DEFAULT_DIV_TYPE,

            cur: GenerationStats::fresh(&shape, default_bonus),
            eff_task_count: vec![0; shape.num_tasks],
            cur_task_time: vec![0.0; shape.num_tasks],
            sensed_resources: vec![RESOURCE_NOT_DETECTED; shape.num_resources],
            insts_triggered: Vec::new(),
            task_states: TaskStates::default(),
            trial_fitnesses: Vec::new(),
            trial_bonuses: Vec::new(),
            trial_times_used: Vec::new(),
            trial_time_used: 0,
            trial_cpu_cycles_used: 0,

            last: GenerationStats::fresh(&shape, default_bonus),
            last_merit_base: 0.0,
            last_fitness: 0.0,

            num_divides: 0,
            generation: 0,
            time_used: 0,
            age: 0,
            fault_desc: String::new(),
            neutral_metric: 0.0,
            life_fitness: 0.0,

            to_die: false,
            to_delete: false,
            is_injected: false,
            donor: DonorFlags::default(),
            receiver: ReceiverFlags::default(),
            num_thresh_gb_donations: 0,
            num_thresh_gb_donations_last: 0,
            num_quanta_thresh_gb_donations: 0,
            num_quanta_thresh_gb_donations_last: 0,
            is_modifier: false,
            is_modified: false,
            is_fertile: true,
            is_mutated: false,
            is_multi_thread: false,
            parent_true: true,
            parent_sex: false,
            parent_cross_num: 0,

            copy_true: false,
            divide_sex: false,
            mate_select_id: 0,
            cross_num: 0,
            child_fertile: true,
            last_child_fertile: true,
            child_copied_size: 0,

            settings,
        }
    }

    /// Shorthand for `new` followed by `setup_inject`.
    pub fn injected(settings: Arc<RunSettings>, genome: &Genome) -> Self {
        let mut p = Self::new(settings);
        p.setup_inject(genome);
        p
    }

    /// Shorthand for `new` followed by `setup_offspring`.
    pub fn offspring(parent: &Phenotype, genome: &Genome, rng: &mut Rng) -> Self {
        let mut p = Self::new(parent.settings.clone());
        p.setup_offspring(parent, genome, rng);
        p
    }

    fn assert_uninitialized(&self) {
        assert!(
            self.state == LifeState::Uninitialized,
            "phenotype set up twice (state: {})",
            self.state
        );
    }

    fn assert_active(&self, what: &str) {
        assert!(
            self.state == LifeState::Active,
            "cannot {} on a phenotype in state {}",
            what,
            self.state
        );
    }

    fn merit_model(&self) -> MeritModel<'_> {
        MeritModel::new(&self.settings)
    }

    fn size_stats(&self) -> SizeStats {
        SizeStats {
            genome_length: self.genome_length,
            copied_size: self.copied_size,
            executed_size: self.executed_size,
            bonus_instruction_count: self.bonus_instruction_count,
        }
    }

    fn count_bonus_instructions(&self, genome: &Genome) -> usize {
        genome.count_instruction(self.settings.merit_bonus_inst)
    }

    /// Merit under the configured bonus rule for a given base.
    fn merit_from_base(&self, base: u32) -> f64 {
        let bonus = if self.settings.merit_default_bonus {
            self.settings.default_bonus
        } else {
            self.cur.bonus
        };
        base as f64 * bonus
    }

    fn inherited_last_fitness(&self) -> f64 {
        if self.gestation_time == 0 {
            return 0.0;
        }
        self.merit_model().fitness(
            self.last_merit_base,
            self.last.bonus,
            self.gestation_time,
            self.last.cpu_cycles,
        )
    }

    fn reset_current(&mut self) {
        let shape = self.settings.shape;
        self.cur = GenerationStats::fresh(&shape, self.settings.default_bonus);
        self.eff_task_count.iter_mut().for_each(|c| *c = 0);
        self.cur_task_time.iter_mut().for_each(|t| *t = 0.0);
    }

    fn clear_trials(&mut self) {
        self.trial_fitnesses.clear();
        self.trial_bonuses.clear();
        self.trial_times_used.clear();
        self.trial_time_used = 0;
        self.trial_cpu_cycles_used = 0;
    }

    // ----- Construction -------------------------------------------------

    /// Sets up an organism born from `parent`, which must already have gone
    /// through its own divide reset.
    ///
    /// # Panics
    /// If this phenotype was already set up, if the genome is empty, or if
    /// the parent reports a zero copied or executed size.
    pub fn setup_offspring(&mut self, parent: &Phenotype, genome: &Genome, rng: &mut Rng) {
        self.assert_uninitialized();
        assert!(!genome.is_empty(), "offspring with an empty genome");

        self.merit = parent.merit;
        self.execution_ratio = 1.0;
        self.energy_store = parent.energy_store.min(self.settings.energy_cap);
        self.energy_to_be_applied = 0.0;
        self.genome_length = genome.len();
        self.bonus_instruction_count = self.count_bonus_instructions(genome);
        self.copied_size = parent.child_copied_size;
        self.executed_size = parent.executed_size;
        self.gestation_time = parent.gestation_time;
        self.gestation_start = 0;
        self.fitness = parent.fitness;
        self.div_type = parent.div_type;

        assert!(self.copied_size > 0, "offspring with zero copied size");
        assert!(self.executed_size > 0, "offspring with zero executed size");
        assert!(self.div_type > 0.0, "offspring with non-positive division type");

        self.reset_current();
        self.sensed_resources.clone_from(&parent.sensed_resources);
        self.task_states.clear();
        self.clear_trials();

        self.last = parent.last.clone();
        self.last_merit_base = parent.last_merit_base;
        self.last_fitness = self.inherited_last_fitness();

        self.num_divides = 0;
        self.generation = parent.generation;
        if self.settings.generation_inc_method != GenerationIncMethod::Both {
            self.generation += 1;
        }
        self.time_used = 0;
        self.age = 0;
        self.fault_desc.clear();
        self.neutral_metric = parent.neutral_metric + rng::normal(rng);
        self.life_fitness = self.fitness;

        self.num_thresh_gb_donations = 0;
        self.num_thresh_gb_donations_last = parent.num_thresh_gb_donations_last;
        self.num_quanta_thresh_gb_donations = 0;
        self.num_quanta_thresh_gb_donations_last = parent.num_quanta_thresh_gb_donations_last;

        self.is_injected = false;
        self.donor = DonorFlags::inherit(&parent.donor);
        self.receiver = ReceiverFlags::inherit(&parent.receiver);
        self.is_modifier = false;
        self.is_modified = false;
        self.is_fertile = parent.last_child_fertile;
        self.is_mutated = false;
        self.is_multi_thread = parent.is_multi_thread;
        self.parent_true = parent.copy_true;
        self.parent_sex = parent.divide_sex;
        self.parent_cross_num = parent.cross_num;
        self.to_die = false;
        self.to_delete = false;

        self.copy_true = false;
        self.divide_sex = false;
        self.mate_select_id = MATE_SELECT_UNSET;
        self.cross_num = 0;
        self.last_child_fertile = self.is_fertile;
        self.child_fertile = true;
        self.child_copied_size = 0;

        self.state = LifeState::Active;
    }

    /// Sets up an organism placed into the population from outside. Its
    /// merit is its genome length.
    ///
    /// # Panics
    /// If this phenotype was already set up or the genome is empty.
    pub fn setup_inject(&mut self, genome: &Genome) {
        self.assert_uninitialized();
        assert!(!genome.is_empty(), "injected an empty genome");

        let len = genome.len();
        self.genome_length = len;
        self.bonus_instruction_count = self.count_bonus_instructions(genome);
        self.merit = len as f64;
        self.copied_size = len;
        self.executed_size = len;
        self.energy_store = self
            .settings
            .energy_given_on_inject
            .min(self.settings.energy_cap);
        self.energy_to_be_applied = 0.0;
        self.execution_ratio = 1.0;
        self.gestation_time = 0;
        self.gestation_start = 0;
        self.fitness = 0.0;
        self.div_type = DEFAULT_DIV_TYPE;

        self.reset_current();
        self.sensed_resources.iter_mut().for_each(|r| *r = RESOURCE_NOT_DETECTED);
        self.task_states.clear();
        self.clear_trials();

        self.last = GenerationStats::fresh(&self.settings.shape, 1.0);
        self.last_merit_base = len as f64;
        self.last_fitness = 0.0;

        self.num_divides = 0;
        self.generation = 0;
        self.time_used = 0;
        self.age = 0;
        self.fault_desc.clear();
        self.neutral_metric = 0.0;
        self.life_fitness = 0.0;

        self.num_thresh_gb_donations = 0;
        self.num_thresh_gb_donations_last = 0;
        self.num_quanta_thresh_gb_donations = 0;
        self.num_quanta_thresh_gb_donations_last = 0;

        self.is_injected = true;
        self.donor = DonorFlags::default();
        self.receiver = ReceiverFlags::default();
        self.is_modifier = false;
        self.is_modified = false;
        self.is_fertile = true;
        self.is_mutated = false;
        self.is_multi_thread = false;
        self.parent_true = true;
        self.parent_sex = false;
        self.parent_cross_num = 0;
        self.to_die = false;
        self.to_delete = false;

        self.copy_true = false;
        self.divide_sex = false;
        self.mate_select_id = 0;
        self.cross_num = 0;
        self.child_fertile = true;
        self.last_child_fertile = true;
        self.child_copied_size = 0;

        self.state = LifeState::Active;
    }

    /// Sets up an exact copy of `source` outside its replication cycle.
    ///
    /// Follows the offspring rules except that gestation restarts at 0,
    /// sizes come from the source itself (no genome change happens) and
    /// donor and receiver flags are copied as they stand.
    ///
    /// # Panics
    /// If this phenotype was already set up or the source has a zero size.
    pub fn setup_clone(&mut self, source: &Phenotype, rng: &mut Rng) {
        self.assert_uninitialized();

        self.merit = source.merit;
        self.execution_ratio = source.execution_ratio;
        self.energy_store = source.energy_store.min(self.settings.energy_cap);
        self.energy_to_be_applied = 0.0;
        self.genome_length = source.genome_length;
        self.bonus_instruction_count = source.bonus_instruction_count;
        self.copied_size = source.copied_size;
        self.executed_size = source.executed_size;
        self.gestation_time = source.gestation_time;
        self.gestation_start = 0;
        self.fitness = source.fitness;
        self.div_type = source.div_type;

        assert!(self.genome_length > 0, "clone of an empty genome");
        assert!(self.copied_size > 0, "clone with zero copied size");
        assert!(self.executed_size > 0, "clone with zero executed size");
        assert!(self.div_type > 0.0, "clone with non-positive division type");

        self.reset_current();
        self.sensed_resources.clone_from(&source.sensed_resources);
        self.task_states.clear();
        self.clear_trials();

        self.last = source.last.clone();
        self.last_merit_base = source.last_merit_base;
        self.last_fitness = self.inherited_last_fitness();

        self.num_divides = 0;
        self.generation = source.generation;
        if self.settings.generation_inc_method != GenerationIncMethod::Both {
            self.generation += 1;
        }
        self.time_used = 0;
        self.age = 0;
        self.fault_desc.clear();
        self.neutral_metric = source.neutral_metric + rng::normal(rng);
        self.life_fitness = self.fitness;

        self.num_thresh_gb_donations = source.num_thresh_gb_donations;
        self.num_thresh_gb_donations_last = source.num_thresh_gb_donations_last;
        self.num_quanta_thresh_gb_donations = source.num_quanta_thresh_gb_donations;
        self.num_quanta_thresh_gb_donations_last = source.num_quanta_thresh_gb_donations_last;

        self.is_injected = false;
        self.donor = source.donor.clone();
        self.receiver = source.receiver.clone();
        self.is_modifier = false;
        self.is_modified = false;
        self.is_fertile = source.last_child_fertile;
        self.is_mutated = false;
        self.is_multi_thread = source.is_multi_thread;
        self.parent_true = source.copy_true;
        self.parent_sex = source.divide_sex;
        self.parent_cross_num = source.cross_num;
        self.to_die = false;
        self.to_delete = false;

        self.copy_true = false;
        self.divide_sex = false;
        self.mate_select_id = MATE_SELECT_UNSET;
        self.cross_num = 0;
        self.last_child_fertile = self.is_fertile;
        self.child_fertile = true;
        self.child_copied_size = 0;

        self.state = LifeState::Active;
    }

    // ----- Resets ---------------------------------------------------------

    /// Current stats become last stats; flags and donation counters roll
    /// over; task states are released.
    fn migrate_generation(&mut self, merit_base: u32) {
        self.last_merit_base = merit_base as f64;
        let shape = self.settings.shape;
        let fresh = GenerationStats::fresh(&shape, self.settings.default_bonus);
        self.last = mem::replace(&mut self.cur, fresh);
        self.eff_task_count.iter_mut().for_each(|c| *c = 0);
        self.cur_task_time.iter_mut().for_each(|t| *t = 0.0);
        self.task_states.clear();

        self.num_divides += 1;
        self.age = 0;
        self.fault_desc.clear();
        self.life_fitness = self.fitness;

        self.num_thresh_gb_donations_last = mem::take(&mut self.num_thresh_gb_donations);
        self.num_quanta_thresh_gb_donations_last =
            mem::take(&mut self.num_quanta_thresh_gb_donations);

        self.donor.roll();
        self.receiver.roll();
    }

    /// Locks in merit, gestation and fitness for the generation just
    /// finished. Returns the base merit used.
    fn lock_in_divide_values(&mut self, genome: &Genome) -> u32 {
        self.bonus_instruction_count = self.count_bonus_instructions(genome);
        let base = self.merit_model().base_merit(&self.size_stats());
        self.merit = self.merit_from_base(base);

        self.set_energy(self.energy_store + self.cur.energy_bonus);

        self.genome_length = genome.len();
        self.gestation_time = self.time_used.saturating_sub(self.gestation_start);
        self.gestation_start = self.time_used;
        self.fitness = self.merit_model().fitness(
            base as f64,
            self.cur.bonus,
            self.gestation_time,
            self.cur.cpu_cycles,
        );
        base
    }

    fn apply_split(&mut self, rng: &mut Rng) {
        if self.settings.divide_method == DivideMethod::Split {
            self.gestation_start = 0;
            self.cur.cpu_cycles = 0;
            self.time_used = 0;
            self.neutral_metric += rng::normal(rng);
        }
    }

    /// Reproduction: recompute merit and fitness, then start a new
    /// generation.
    ///
    /// # Panics
    /// If not active, or under the normal fitness policy when no time has
    /// passed since the last reset.
    pub fn divide_reset(&mut self, genome: &Genome, rng: &mut Rng) {
        self.assert_active("divide-reset");

        let base = self.lock_in_divide_values(genome);
        self.migrate_generation(base);

        self.last_child_fertile = self.child_fertile;
        self.child_fertile = true;

        self.apply_split(rng);

        if self.settings.generation_inc_method == GenerationIncMethod::Both {
            self.generation += 1;
        }
    }

    /// Divide reset for an organism evaluated in isolation. Always bumps the
    /// generation and never applies the split rule.
    ///
    /// Everything else matches [`divide_reset`](Self::divide_reset): trial
    /// history survives and sensed resources keep their last readings.
    ///
    /// # Panics
    /// As [`divide_reset`](Self::divide_reset).
    pub fn test_divide_reset(&mut self, genome: &Genome) {
        self.assert_active("test-divide-reset");

        let base = self.lock_in_divide_values(genome);
        self.migrate_generation(base);
        self.generation += 1;
    }

    /// Closes one evaluation trial. The trial's fitness is appended to the
    /// trial history (kept across this reset) and the energy store goes back
    /// to the birth grant. No-op when the trial used no CPU cycles.
    ///
    /// # Panics
    /// If not active.
    pub fn new_trial(&mut self) {
        self.assert_active("start a new trial");
        if self.trial_cpu_cycles_used == 0 {
            return;
        }

        let model = self.merit_model();
        let base = model.base_merit(&self.size_stats());
        let trial_fitness = model.fitness(
            base as f64,
            self.cur.bonus,
            self.trial_time_used,
            self.trial_cpu_cycles_used,
        );
        self.fitness = trial_fitness;
        self.trial_fitnesses.push(trial_fitness);
        self.trial_bonuses.push(self.cur.bonus);
        self.trial_times_used.push(self.trial_time_used);

        self.merit = self.merit_from_base(base);
        self.set_energy(self.settings.energy_given_at_birth);

        self.gestation_time = self.time_used.saturating_sub(self.gestation_start);
        self.gestation_start = self.time_used;

        self.migrate_generation(base);
        self.trial_time_used = 0;
        self.trial_cpu_cycles_used = 0;
    }

    /// Commits a division after [`new_trial`](Self::new_trial) already
    /// moved the counters: refreshes merit, energy and genome length and
    /// drops the trial history.
    ///
    /// # Panics
    /// If not active.
    pub fn trial_divide_reset(&mut self, genome: &Genome, rng: &mut Rng) {
        self.assert_active("trial-divide-reset");

        self.bonus_instruction_count = self.count_bonus_instructions(genome);
        let base = self.merit_model().base_merit(&self.size_stats());
        self.merit = self.merit_from_base(base);
        self.set_energy(self.energy_store + self.cur.energy_bonus);

        self.genome_length = genome.len();
        self.gestation_start = self.time_used;
        self.trial_fitnesses.clear();
        self.trial_bonuses.clear();
        self.trial_times_used.clear();

        self.last_child_fertile = self.child_fertile;
        self.child_fertile = true;

        self.apply_split(rng);

        if self.settings.generation_inc_method == GenerationIncMethod::Both {
            self.generation += 1;
        }
    }

    /// Marks the organism dead. Any further reset or recording panics.
    pub fn terminate(&mut self) {
        self.state = LifeState::Terminated;
    }

    // ----- Per-instruction bookkeeping -------------------------------------

    pub fn record_cpu_step(&mut self, delta: StepDelta) {
        self.assert_active("record a CPU step");
        self.cur.cpu_cycles += delta.cpu_cycles;
        self.trial_cpu_cycles_used += delta.cpu_cycles;
        self.time_used += delta.time;
        self.trial_time_used += delta.time;
        self.age += delta.age;
    }

    pub fn record_instruction(&mut self, inst: usize) {
        self.assert_active("record an instruction");
        let count = self
            .cur
            .inst_count
            .get_mut(inst)
            .unwrap_or_else(|| panic!("instruction id {} outside the instruction set", inst));
        *count += 1;
    }

    pub fn record_error(&mut self) {
        self.assert_active("record an error");
        self.cur.num_errors += 1;
    }

    pub fn record_donation(&mut self) {
        self.assert_active("record a donation");
        self.cur.num_donates += 1;
    }

    pub fn mark_donor(&mut self, kind: DonorKind) {
        self.assert_active("mark a donor");
        self.donor.set(kind);
    }

    pub fn mark_receiver(&mut self, kind: ReceiverKind) {
        self.assert_active("mark a receiver");
        self.receiver.set(kind);
    }

    pub fn record_thresh_gb_donation(&mut self) {
        self.assert_active("record a threshold donation");
        self.num_thresh_gb_donations += 1;
    }

    pub fn record_quanta_thresh_gb_donation(&mut self) {
        self.assert_active("record a quanta donation");
        self.num_quanta_thresh_gb_donations += 1;
    }

    pub fn set_fault(&mut self, desc: impl Into<String>) {
        self.assert_active("record a fault");
        self.fault_desc = desc.into();
    }

    pub fn set_copied_size(&mut self, size: usize) {
        self.copied_size = size;
    }

    pub fn set_executed_size(&mut self, size: usize) {
        self.executed_size = size;
    }

    pub fn set_child_copied_size(&mut self, size: usize) {
        self.child_copied_size = size;
    }

    pub fn set_cur_bonus(&mut self, bonus: f64) {
        self.assert_active("set the current bonus");
        self.cur.bonus = bonus;
    }

    pub fn set_merit(&mut self, merit: f64) {
        self.merit = merit;
    }

    pub fn set_div_type(&mut self, div_type: f64) {
        self.div_type = div_type;
    }

    pub fn set_copy_true(&mut self, value: bool) {
        self.copy_true = value;
    }

    pub fn set_divide_sex(&mut self, value: bool) {
        self.divide_sex = value;
    }

    pub fn set_cross_num(&mut self, value: u32) {
        self.cross_num = value;
    }

    pub fn set_mate_select_id(&mut self, id: i32) {
        self.mate_select_id = id;
    }

    pub fn set_child_fertile(&mut self, value: bool) {
        self.child_fertile = value;
    }

    pub fn set_modifier(&mut self, value: bool) {
        self.is_modifier = value;
    }

    pub fn set_modified(&mut self, value: bool) {
        self.is_modified = value;
    }

    pub fn set_mutated(&mut self, value: bool) {
        self.is_mutated = value;
    }

    pub fn set_multi_thread(&mut self, value: bool) {
        self.is_multi_thread = value;
    }

    pub fn set_to_delete(&mut self) {
        self.to_delete = true;
    }

    pub fn task_states_mut(&mut self) -> &mut TaskStates {
        &mut self.task_states
    }

    // ----- Accessors --------------------------------------------------------

    pub fn settings(&self) -> &Arc<RunSettings> {
        &self.settings
    }

    pub fn state(&self) -> LifeState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == LifeState::Active
    }

    pub fn merit(&self) -> f64 {
        self.merit
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn gestation_time(&self) -> u64 {
        self.gestation_time
    }

    pub fn gestation_start(&self) -> u64 {
        self.gestation_start
    }

    pub fn genome_length(&self) -> usize {
        self.genome_length
    }

    pub fn copied_size(&self) -> usize {
        self.copied_size
    }

    pub fn executed_size(&self) -> usize {
        self.executed_size
    }

    pub fn child_copied_size(&self) -> usize {
        self.child_copied_size
    }

    pub fn bonus_instruction_count(&self) -> usize {
        self.bonus_instruction_count
    }

    pub fn div_type(&self) -> f64 {
        self.div_type
    }

    pub fn cur(&self) -> &GenerationStats {
        &self.cur
    }

    pub fn last(&self) -> &GenerationStats {
        &self.last
    }

    pub fn cur_bonus(&self) -> f64 {
        self.cur.bonus
    }

    pub fn eff_task_count(&self) -> &[u32] {
        &self.eff_task_count
    }

    pub fn cur_task_time(&self) -> &[f64] {
        &self.cur_task_time
    }

    pub fn sensed_resources(&self) -> &[f64] {
        &self.sensed_resources
    }

    pub fn triggered_instructions(&self) -> &[u16] {
        &self.insts_triggered
    }

    pub fn task_states(&self) -> &TaskStates {
        &self.task_states
    }

    pub fn trial_fitnesses(&self) -> &[f64] {
        &self.trial_fitnesses
    }

    pub fn trial_bonuses(&self) -> &[f64] {
        &self.trial_bonuses
    }

    pub fn trial_times_used(&self) -> &[u64] {
        &self.trial_times_used
    }

    pub fn last_merit_base(&self) -> f64 {
        self.last_merit_base
    }

    pub fn last_fitness(&self) -> f64 {
        self.last_fitness
    }

    pub fn num_divides(&self) -> u32 {
        self.num_divides
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn cpu_cycles_used(&self) -> u64 {
        self.cur.cpu_cycles
    }

    pub fn time_used(&self) -> u64 {
        self.time_used
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn fault_desc(&self) -> &str {
        &self.fault_desc
    }

    pub fn neutral_metric(&self) -> f64 {
        self.neutral_metric
    }

    pub fn life_fitness(&self) -> f64 {
        self.life_fitness
    }

    pub fn to_die(&self) -> bool {
        self.to_die
    }

    pub fn to_delete(&self) -> bool {
        self.to_delete
    }

    pub fn is_injected(&self) -> bool {
        self.is_injected
    }

    pub fn is_fertile(&self) -> bool {
        self.is_fertile
    }

    pub fn is_modifier(&self) -> bool {
        self.is_modifier
    }

    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    pub fn is_mutated(&self) -> bool {
        self.is_mutated
    }

    pub fn is_multi_thread(&self) -> bool {
        self.is_multi_thread
    }

    pub fn parent_true(&self) -> bool {
        self.parent_true
    }

    pub fn parent_sex(&self) -> bool {
        self.parent_sex
    }

    pub fn parent_cross_num(&self) -> u32 {
        self.parent_cross_num
    }

    pub fn donor(&self) -> &DonorFlags {
        &self.donor
    }

    pub fn receiver(&self) -> &ReceiverFlags {
        &self.receiver
    }

    pub fn num_thresh_gb_donations(&self) -> (u32, u32) {
        (self.num_thresh_gb_donations, self.num_thresh_gb_donations_last)
    }

    pub fn num_quanta_thresh_gb_donations(&self) -> (u32, u32) {
        (
            self.num_quanta_thresh_gb_donations,
            self.num_quanta_thresh_gb_donations_last,
        )
    }

    pub fn copy_true(&self) -> bool {
        self.copy_true
    }

    pub fn divide_sex(&self) -> bool {
        self.divide_sex
    }

    pub fn mate_select_id(&self) -> i32 {
        self.mate_select_id
    }

    pub fn cross_num(&self) -> u32 {
        self.cross_num
    }

    pub fn child_fertile(&self) -> bool {
        self.child_fertile
    }

    pub fn last_child_fertile(&self) -> bool {
        self.last_child_fertile
    }

    /// Base merit the organism would get if it divided now.
    pub fn current_merit_base(&self) -> u32 {
        self.merit_model().base_merit(&self.size_stats())
    }

    // ----- Comparison and reporting -----------------------------------------

    /// Orders by merit, then gestation time, then last-generation task
    /// counts.
    pub fn compare_lineage(&self, other: &Phenotype) -> Ordering {
        self.merit
            .total_cmp(&other.merit)
            .then(self.gestation_time.cmp(&other.gestation_time))
            .then_with(|| self.last.task_count.cmp(&other.last.task_count))
    }

    /// Two-line summary of the generation in progress.
    pub fn status_line(&self) -> String {
        let mut out = format!(
            "MeritBase: {} Bonus: {} Errors: {} Donates: {}\nTask Count (Quality):",
            self.current_merit_base(),
            self.cur.bonus,
            self.cur.num_errors,
            self.cur.num_donates
        );
        for (count, quality) in self.cur.task_count.iter().zip(&self.cur.task_quality) {
            let _ = write!(out, " {} ({})", count, quality);
        }
        out
    }
}
