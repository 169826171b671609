//! A small population driver wired to the scheduler and the phenotype.
//!
//! The virtual CPU here is a stand-in: it walks the genome one instruction
//! per step, completes a random task now and then, and divides once the
//! organism's age reaches its genome length. It exists to exercise the
//! scheduler/phenotype contract end to end, not to model real programs.

use crate::config::Config;
use crate::consts::DRIVER_SEED_OFFSET;
use crate::error::{EvoError, EvoResult};
use crate::genome::Genome;
use crate::merit::MeritModel;
use crate::phenotype::{ExecutionOutcome, Phenotype, PhenotypeRecord, StepDelta};
use crate::policy::ApplyEnergyMethod;
use crate::rng;
use crate::scheduler::{build_scheduler, Schedule};
use crate::settings::RunSettings;
use fastrand::Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

pub struct SimulationOptions {
    pub updates: usize,
    /// Scheduler ticks that make up one update.
    pub ticks_per_update: usize,
    pub ancestor_length: usize,
    pub task_chance: f64,
    pub max_time: Option<Duration>,
}

impl From<&Config> for SimulationOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            updates: cfg.driver.updates,
            ticks_per_update: cfg.scheduler.world_size,
            ancestor_length: cfg.driver.ancestor_length,
            task_chance: cfg.driver.task_chance,
            max_time: None, // Set manually if needed
        }
    }
}

/// Population-wide numbers gathered at the end of one update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateStats {
    pub update: usize,
    pub num_organisms: usize,
    pub births: usize,
    pub deaths: usize,
    pub idle_ticks: usize,
    pub ave_merit: f64,
    pub max_merit: f64,
    pub ave_fitness: f64,
    pub ave_gestation: f64,
    pub ave_generation: f64,
    pub total_divides: u64,
    pub tasks_last_gen: u64,
}

/// Receives per-update statistics. Returning false stops the run.
pub trait ProgressCallback: Send + Sync {
    fn on_update(&self, stats: &UpdateStats) -> bool;
}

impl<F> ProgressCallback for F
where
    F: Fn(&UpdateStats) -> bool + Send + Sync,
{
    fn on_update(&self, stats: &UpdateStats) -> bool {
        self(stats)
    }
}

/// Never stops the run.
pub struct Silent;

impl ProgressCallback for Silent {
    fn on_update(&self, _stats: &UpdateStats) -> bool {
        true
    }
}

pub struct SimulationResult {
    pub history: Vec<UpdateStats>,
    pub elapsed: Duration,
}

impl SimulationResult {
    pub fn last(&self) -> Option<&UpdateStats> {
        self.history.last()
    }
}

#[derive(Debug, Clone)]
pub struct Organism {
    pub genome: Genome,
    pub phenotype: Phenotype,
    ip: usize,
}

impl Organism {
    pub fn new(genome: Genome, phenotype: Phenotype) -> Self {
        Self {
            genome,
            phenotype,
            ip: 0,
        }
    }
}

#[derive(Default)]
struct TickCounters {
    births: usize,
    deaths: usize,
    idle: usize,
}

pub struct Simulation {
    settings: Arc<RunSettings>,
    options: SimulationOptions,
    schedule: Box<dyn Schedule>,
    slots: Vec<Option<Organism>>,
    rng: Rng,
    res_change: Vec<f64>,
    update: usize,
}

impl Simulation {
    pub fn new(settings: Arc<RunSettings>, options: SimulationOptions) -> EvoResult<Self> {
        if settings.shape.num_instructions == 0 {
            return Err(EvoError::Config(
                "the instruction set must not be empty".into(),
            ));
        }
        if options.ancestor_length == 0 {
            return Err(EvoError::Config("ancestor length must be positive".into()));
        }
        if !(0.0..=1.0).contains(&options.task_chance) {
            return Err(EvoError::Config(format!(
                "task chance {} must lie in [0, 1]",
                options.task_chance
            )));
        }

        let schedule = build_scheduler(&settings)?;
        let slots = vec![None; settings.world_size];
        let rng = rng::seeded(settings.seed + DRIVER_SEED_OFFSET);

        Ok(Self {
            settings,
            options,
            schedule,
            slots,
            rng,
            res_change: Vec::new(),
            update: 0,
        })
    }

    pub fn settings(&self) -> &Arc<RunSettings> {
        &self.settings
    }

    pub fn organism(&self, slot: usize) -> Option<&Organism> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn organisms(&self) -> impl Iterator<Item = (usize, &Organism)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, org)| org.as_ref().map(|o| (slot, o)))
    }

    pub fn num_organisms(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Places a fresh organism into `slot`, killing whatever lived there.
    pub fn inject(&mut self, slot: usize, genome: Genome) -> EvoResult<()> {
        if slot >= self.slots.len() {
            return Err(EvoError::Range {
                index: slot,
                size: self.slots.len(),
            });
        }
        if genome.is_empty() {
            return Err(EvoError::Config("cannot inject an empty genome".into()));
        }
        let num_instructions = self.settings.shape.num_instructions;
        if let Some(&bad) = genome
            .instructions()
            .iter()
            .find(|&&i| i as usize >= num_instructions)
        {
            return Err(EvoError::Config(format!(
                "instruction id {} outside the instruction set of {}",
                bad, num_instructions
            )));
        }

        if let Some(mut old) = self.slots[slot].take() {
            old.phenotype.terminate();
        }

        let phenotype = Phenotype::injected(self.settings.clone(), &genome);
        let merit = phenotype.merit();
        self.slots[slot] = Some(Organism::new(genome, phenotype));
        let deme = self.schedule.deme_of(slot);
        self.schedule.adjust(slot, merit, deme)?;

        debug!("💉 Injected organism into slot {} (merit {})", slot, merit);
        Ok(())
    }

    /// Injects one random ancestor at the first slot of every deme.
    pub fn seed_population(&mut self) -> EvoResult<()> {
        let deme_size = self.settings.deme_size();
        let len = self.options.ancestor_length;
        let num_instructions = self.settings.shape.num_instructions;

        for deme in 0..self.settings.num_demes {
            let genome = Genome::random(&mut self.rng, len, num_instructions);
            self.inject(deme * deme_size, genome)?;
        }
        info!(
            "🧬 Seeded {} ancestors of length {}",
            self.settings.num_demes, len
        );
        Ok(())
    }

    /// Runs every remaining update, seeding the world first if it is empty.
    pub fn run<CB: ProgressCallback>(&mut self, callback: CB) -> EvoResult<SimulationResult> {
        if self.num_organisms() == 0 {
            self.seed_population()?;
        }

        let start_time = Instant::now();
        let mut history = Vec::with_capacity(self.options.updates);

        while self.update < self.options.updates {
            if let Some(limit) = self.options.max_time {
                if start_time.elapsed() >= limit {
                    break;
                }
            }

            let stats = self.run_update()?;
            let keep_going = callback.on_update(&stats);
            history.push(stats);

            if !keep_going {
                break;
            }
        }

        Ok(SimulationResult {
            history,
            elapsed: start_time.elapsed(),
        })
    }

    /// Advances the world by one update and reports on it.
    pub fn run_update(&mut self) -> EvoResult<UpdateStats> {
        let mut counters = TickCounters::default();
        for _ in 0..self.options.ticks_per_update {
            self.tick(&mut counters)?;
        }

        let stats = self.collect_stats(&counters);
        debug!(
            "Update {:5} | Orgs: {:5} | Births: {:4} | Merit: {:.2} | Gen: {:.2}",
            stats.update, stats.num_organisms, stats.births, stats.ave_merit, stats.ave_generation
        );
        self.update += 1;
        Ok(stats)
    }

    fn tick(&mut self, counters: &mut TickCounters) -> EvoResult<()> {
        let slot = self.schedule.next_slot();
        let Some(mut org) = self.slots[slot].take() else {
            counters.idle += 1;
            return Ok(());
        };

        let mut child = None;
        for _ in 0..self.settings.burst_size {
            self.execute_instruction(&mut org);
            if org.phenotype.to_die() {
                break;
            }
            if org.phenotype.age() >= org.genome.len() as u64 {
                child = Some(self.divide(&mut org));
                break;
            }
        }

        let deme = self.schedule.deme_of(slot);
        if org.phenotype.to_die() {
            org.phenotype.terminate();
            self.schedule.adjust(slot, 0.0, deme)?;
            counters.deaths += 1;
            trace!("💀 Slot {} died", slot);
        } else {
            let merit = org.phenotype.merit();
            self.slots[slot] = Some(org);
            if child.is_some() {
                self.schedule.adjust(slot, merit, deme)?;
            }
        }

        if let Some(child) = child {
            self.place_offspring(slot, child)?;
            counters.births += 1;
        }
        Ok(())
    }

    fn execute_instruction(&mut self, org: &mut Organism) {
        let inst = org.genome.instructions()[org.ip];
        org.ip = (org.ip + 1) % org.genome.len();

        let ph = &mut org.phenotype;
        ph.record_cpu_step(StepDelta::UNIT);
        ph.record_instruction(inst as usize);

        let num_tasks = self.settings.shape.num_tasks;
        if num_tasks == 0 || self.rng.f64() >= self.options.task_chance {
            return;
        }

        let task = self.rng.usize(0..num_tasks);
        let mut outcome = ExecutionOutcome::new(&self.settings.shape);
        outcome.mark_task(task, 1.0, 1.0).mult_bonus(2.0);
        if self.settings.energy_enabled {
            outcome.add_energy(1.0);
        }

        ph.record_execution_outcome(&outcome, self.update as u64, &mut self.res_change);

        if self.settings.energy_enabled
            && self.settings.apply_energy_method == ApplyEnergyMethod::OnTaskCompletion
        {
            ph.refresh_energy();
        }
    }

    /// Divides `org` in place and returns the offspring.
    fn divide(&mut self, org: &mut Organism) -> Organism {
        let len = org.genome.len();
        let ph = &mut org.phenotype;
        ph.set_copied_size(len);
        ph.set_executed_size(len);
        ph.set_child_copied_size(len);
        ph.set_copy_true(true);

        ph.divide_reset(&org.genome, &mut self.rng);
        org.ip = 0;

        let child_energy = if self.settings.energy_enabled {
            Some(org.phenotype.extract_parent_energy())
        } else {
            None
        };

        let genome = org.genome.clone();
        let mut phenotype = Phenotype::offspring(&org.phenotype, &genome, &mut self.rng);
        if let Some(energy) = child_energy {
            phenotype.set_energy(energy);
            phenotype.set_merit(MeritModel::new(&self.settings).energy_to_merit(energy));
        }

        Organism::new(genome, phenotype)
    }

    /// Puts a newborn into a random slot of its parent's deme. The parent's
    /// own slot is never chosen unless the deme has a single slot.
    fn place_offspring(&mut self, parent_slot: usize, child: Organism) -> EvoResult<()> {
        let deme_size = self.settings.deme_size();
        let deme_start = (parent_slot / deme_size) * deme_size;

        let target = if deme_size == 1 {
            parent_slot
        } else {
            let offset = self.rng.usize(0..deme_size - 1);
            let slot = deme_start + offset;
            if slot >= parent_slot {
                slot + 1
            } else {
                slot
            }
        };

        if let Some(mut old) = self.slots[target].take() {
            old.phenotype.terminate();
        }

        let merit = child.phenotype.merit();
        trace!(
            "🐣 Birth: slot {} -> {} (merit {:.2}, gen {})",
            parent_slot,
            target,
            merit,
            child.phenotype.generation()
        );
        self.slots[target] = Some(child);
        let deme = self.schedule.deme_of(target);
        self.schedule.adjust(target, merit, deme)
    }

    fn collect_stats(&self, counters: &TickCounters) -> UpdateStats {
        let mut stats = UpdateStats {
            update: self.update,
            births: counters.births,
            deaths: counters.deaths,
            idle_ticks: counters.idle,
            ..Default::default()
        };

        for (_, org) in self.organisms() {
            let ph = &org.phenotype;
            stats.num_organisms += 1;
            stats.ave_merit += ph.merit();
            stats.max_merit = stats.max_merit.max(ph.merit());
            stats.ave_fitness += ph.fitness();
            stats.ave_gestation += ph.gestation_time() as f64;
            stats.ave_generation += ph.generation() as f64;
            stats.total_divides += ph.num_divides() as u64;
            stats.tasks_last_gen += ph.last().total_tasks() as u64;
        }

        if stats.num_organisms > 0 {
            let n = stats.num_organisms as f64;
            stats.ave_merit /= n;
            stats.ave_fitness /= n;
            stats.ave_gestation /= n;
            stats.ave_generation /= n;
        }
        stats
    }

    /// Flat records of every living organism, keyed by slot.
    pub fn snapshot(&self) -> Vec<(usize, PhenotypeRecord)> {
        self.organisms()
            .map(|(slot, org)| (slot, org.phenotype.snapshot()))
            .collect()
    }
}
