use crate::policy::WeightTransform;

/// Maps an organism's merit to the weight its slot carries in a scheduler.
/// Implementations must be monotonic and keep non-negative input
/// non-negative.
pub trait MeritWeight: Send + Sync {
    fn weight(&self, merit: f64) -> f64;
}

impl MeritWeight for WeightTransform {
    #[inline(always)]
    fn weight(&self, merit: f64) -> f64 {
        match self {
            WeightTransform::Identity => merit,
            WeightTransform::Sqrt => merit.sqrt(),
            WeightTransform::Log => merit.ln_1p(),
        }
    }
}

impl<F> MeritWeight for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn weight(&self, merit: f64) -> f64 {
        self(merit)
    }
}
