use crate::config::EnvironmentShape;
use serde::{Deserialize, Serialize};

/// Counters accumulated over one generation.
///
/// The phenotype keeps two of these: the one being filled in now and the
/// one frozen at the previous reset. A reset moves the first into the
/// second and starts a fresh one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationStats {
    pub bonus: f64,
    pub energy_bonus: f64,
    pub cpu_cycles: u64,
    pub num_errors: u32,
    pub num_donates: u32,
    pub task_count: Vec<u32>,
    pub task_quality: Vec<f64>,
    pub task_value: Vec<f64>,
    pub reaction_count: Vec<u32>,
    pub reaction_add_reward: Vec<f64>,
    pub inst_count: Vec<u32>,
}

impl GenerationStats {
    pub fn fresh(shape: &EnvironmentShape, bonus: f64) -> Self {
        Self {
            bonus,
            energy_bonus: 0.0,
            cpu_cycles: 0,
            num_errors: 0,
            num_donates: 0,
            task_count: vec![0; shape.num_tasks],
            task_quality: vec![0.0; shape.num_tasks],
            task_value: vec![0.0; shape.num_tasks],
            reaction_count: vec![0; shape.num_reactions],
            reaction_add_reward: vec![0.0; shape.num_reactions],
            inst_count: vec![0; shape.num_instructions],
        }
    }

    pub fn total_tasks(&self) -> u32 {
        self.task_count.iter().sum()
    }
}
