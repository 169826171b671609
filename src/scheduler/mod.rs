pub mod constant;
pub mod deme;
pub mod transform;
pub mod weighted_index;

pub use self::constant::ConstScheduler;
pub use self::deme::DemeScheduler;
pub use self::transform::MeritWeight;
pub use self::weighted_index::WeightedIndex;

use crate::error::EvoResult;
use crate::policy::SlicingMethod;
use crate::settings::RunSettings;
use tracing::info;

/// Decides which slot's CPU advances next.
///
/// `adjust` is called whenever an organism's merit changes (birth, divide,
/// death). `next_slot` may return a slot with no organism in it; callers
/// treat that as an idle tick.
pub trait Schedule: Send {
    fn adjust(&mut self, slot: usize, merit: f64, deme: usize) -> EvoResult<()>;
    fn next_slot(&mut self) -> usize;
    fn num_slots(&self) -> usize;
    /// Deme id this scheduler expects alongside `slot` in `adjust`.
    fn deme_of(&self, slot: usize) -> usize;
}

pub fn build_scheduler(settings: &RunSettings) -> EvoResult<Box<dyn Schedule>> {
    info!(
        "🗓️  Scheduler: {} over {} slots (transform: {})",
        settings.slicing_method, settings.world_size, settings.weight_transform
    );

    let schedule: Box<dyn Schedule> = match settings.slicing_method {
        SlicingMethod::Constant => Box::new(ConstScheduler::new(settings.world_size)?),
        SlicingMethod::Probabilistic => Box::new(DemeScheduler::new(
            settings.world_size,
            1,
            settings.seed,
            settings.weight_transform,
        )?),
        SlicingMethod::DemeProbabilistic => Box::new(DemeScheduler::new(
            settings.world_size,
            settings.num_demes,
            settings.seed,
            settings.weight_transform,
        )?),
    };
    Ok(schedule)
}
