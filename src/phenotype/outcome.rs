use super::Phenotype;
use crate::config::EnvironmentShape;
use crate::consts::RESOURCE_NOT_DETECTED;

/// Time advanced by one executed instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepDelta {
    pub cpu_cycles: u64,
    pub time: u64,
    pub age: u64,
}

impl StepDelta {
    /// One cycle, one time unit, one year of age.
    pub const UNIT: StepDelta = StepDelta {
        cpu_cycles: 1,
        time: 1,
        age: 1,
    };
}

/// What the environment made of one output: tasks completed, reactions
/// triggered, bonuses earned and resources moved.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    task_done: Vec<bool>,
    task_quality: Vec<f64>,
    task_value: Vec<f64>,
    reaction_triggered: Vec<bool>,
    reaction_add_bonus: Vec<f64>,
    add_bonus: f64,
    mult_bonus: f64,
    add_energy: f64,
    consumed: Vec<f64>,
    produced: Vec<f64>,
    detected: Vec<f64>,
    lethal: bool,
    insts_triggered: Vec<u16>,
}

impl ExecutionOutcome {
    pub fn new(shape: &EnvironmentShape) -> Self {
        Self {
            task_done: vec![false; shape.num_tasks],
            task_quality: vec![0.0; shape.num_tasks],
            task_value: vec![0.0; shape.num_tasks],
            reaction_triggered: vec![false; shape.num_reactions],
            reaction_add_bonus: vec![0.0; shape.num_reactions],
            add_bonus: 0.0,
            mult_bonus: 1.0,
            add_energy: 0.0,
            consumed: vec![0.0; shape.num_resources],
            produced: vec![0.0; shape.num_resources],
            detected: vec![RESOURCE_NOT_DETECTED; shape.num_resources],
            lethal: false,
            insts_triggered: Vec::new(),
        }
    }

    pub fn mark_task(&mut self, task: usize, quality: f64, value: f64) -> &mut Self {
        self.task_done[task] = true;
        self.task_quality[task] = quality;
        self.task_value[task] = value;
        self
    }

    pub fn mark_reaction(&mut self, reaction: usize, add_bonus: f64) -> &mut Self {
        self.reaction_triggered[reaction] = true;
        self.reaction_add_bonus[reaction] += add_bonus;
        self
    }

    pub fn add_bonus(&mut self, amount: f64) -> &mut Self {
        self.add_bonus += amount;
        self
    }

    pub fn mult_bonus(&mut self, factor: f64) -> &mut Self {
        self.mult_bonus *= factor;
        self
    }

    pub fn add_energy(&mut self, amount: f64) -> &mut Self {
        self.add_energy += amount;
        self
    }

    pub fn consume(&mut self, resource: usize, amount: f64) -> &mut Self {
        self.consumed[resource] += amount;
        self
    }

    pub fn produce(&mut self, resource: usize, amount: f64) -> &mut Self {
        self.produced[resource] += amount;
        self
    }

    pub fn detect(&mut self, resource: usize, concentration: f64) -> &mut Self {
        self.detected[resource] = concentration;
        self
    }

    pub fn lethal(&mut self) -> &mut Self {
        self.lethal = true;
        self
    }

    pub fn trigger_instruction(&mut self, inst: u16) -> &mut Self {
        self.insts_triggered.push(inst);
        self
    }

    /// True when any task completed or any reaction fired.
    pub fn is_active(&self) -> bool {
        self.task_done.iter().any(|&d| d) || self.reaction_triggered.iter().any(|&r| r)
    }

    pub fn task_done(&self, task: usize) -> bool {
        self.task_done[task]
    }

    pub fn is_lethal(&self) -> bool {
        self.lethal
    }

    pub fn triggered_instructions(&self) -> &[u16] {
        &self.insts_triggered
    }
}

impl Phenotype {
    /// Logistic discount applied to task quality when the same task is
    /// repeated shortly after it last triggered. Equals 1 when the
    /// refractory period is disabled.
    pub fn refractory_factor(&self, task: usize, update: u64) -> f64 {
        let period = self.settings.task_refractory_period;
        if period == 0.0 {
            return 1.0;
        }
        let since = update as f64 - self.cur_task_time[task];
        1.0 - 1.0 / (1.0 + (since - period * 0.5).exp())
    }

    /// Folds one environment outcome into the current generation.
    ///
    /// `res_change` is resized to the number of resources and receives
    /// `produced - consumed` per resource. Returns false, touching nothing
    /// but `res_change`, when no task or reaction fired.
    ///
    /// # Panics
    /// If the phenotype is not active.
    pub fn record_execution_outcome(
        &mut self,
        outcome: &ExecutionOutcome,
        update: u64,
        res_change: &mut Vec<f64>,
    ) -> bool {
        self.assert_active("record an execution outcome");

        let num_resources = self.settings.shape.num_resources;
        res_change.clear();
        res_change.resize(num_resources, 0.0);

        if !outcome.is_active() {
            return false;
        }

        for task in 0..self.cur.task_count.len() {
            let factor = self.refractory_factor(task, update);
            if outcome.task_done[task] {
                self.cur.task_count[task] += 1;
                self.eff_task_count[task] += 1;
                self.cur_task_time[task] = update as f64;
            }
            if outcome.task_quality[task] > 0.0 {
                self.cur.task_quality[task] += outcome.task_quality[task] * factor;
            }
            self.cur.task_value[task] = outcome.task_value[task];
        }

        for reaction in 0..self.cur.reaction_count.len() {
            if outcome.reaction_triggered[reaction] {
                self.cur.reaction_count[reaction] += 1;
            }
            self.cur.reaction_add_reward[reaction] += outcome.reaction_add_bonus[reaction];
        }

        // Multiply first, then add.
        self.cur.bonus *= outcome.mult_bonus;
        self.cur.bonus += outcome.add_bonus;

        self.cur.energy_bonus += outcome.add_energy;

        for (r, change) in res_change.iter_mut().enumerate() {
            *change = outcome.produced[r] - outcome.consumed[r];
        }

        self.insts_triggered.clone_from(&outcome.insts_triggered);

        for (stored, &seen) in self.sensed_resources.iter_mut().zip(outcome.detected.iter()) {
            if seen != RESOURCE_NOT_DETECTED {
                *stored = seen;
            }
        }

        if outcome.lethal {
            self.to_die = true;
        }

        true
    }
}
