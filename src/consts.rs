/// Sentinel stored in a sensed-resource slot that has never been detected.
/// A detection result equal to this value never overwrites a stored reading.
pub const RESOURCE_NOT_DETECTED: f64 = -1.0;

/// Mate selection id given to a freshly built offspring (no mate chosen yet).
pub const MATE_SELECT_UNSET: i32 = -1;

/// Scale applied when converting stored energy into merit.
pub const ENERGY_TO_MERIT_SCALE: f64 = 100.0;

/// Offset between the scheduler seed and the driver seed, so the two
/// streams never coincide for the same run seed.
pub const DRIVER_SEED_OFFSET: u64 = 9999;

/// Default division type recorded for injected organisms.
pub const DEFAULT_DIV_TYPE: f64 = 1.0;
