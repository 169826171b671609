//! Run-wide policy switches.
//!
//! Each policy is named in kebab-case, and the legacy integer code of the
//! same policy is accepted as an alias (`"4"` parses as `least-size`).

use crate::error::{EvoError, EvoResult};
use std::fmt::Display;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// How the base merit of an organism is derived from its genome statistics.
#[derive(Debug, Clone, Copy, EnumIter, EnumString, Display, PartialEq, Eq, Hash)]
pub enum BaseMeritMethod {
    #[strum(to_string = "constant", serialize = "0")]
    Constant,
    #[strum(to_string = "copied-size", serialize = "1")]
    CopiedSize,
    #[strum(to_string = "executed-size", serialize = "2")]
    ExecutedSize,
    #[strum(to_string = "full-size", serialize = "3")]
    FullSize,
    #[strum(to_string = "least-size", serialize = "4")]
    LeastSize,
    #[strum(to_string = "sqrt-least-size", serialize = "5")]
    SqrtLeastSize,
    #[strum(to_string = "bonus-inst", serialize = "6")]
    NumBonusInst,
}

#[derive(Debug, Clone, Copy, EnumIter, EnumString, Display, PartialEq, Eq, Hash)]
pub enum FitnessMethod {
    /// `base_merit * bonus / gestation_time`
    #[strum(to_string = "normal", serialize = "0")]
    Normal,
    /// Sigmoidal reward with a per-instruction cost.
    #[strum(to_string = "diminishing-returns", serialize = "1")]
    DiminishingReturns,
}

/// When rewarded energy reaches the energy store.
#[derive(Debug, Clone, Copy, EnumIter, EnumString, Display, PartialEq, Eq, Hash)]
pub enum ApplyEnergyMethod {
    #[strum(to_string = "on-divide", serialize = "0")]
    OnDivide,
    #[strum(to_string = "on-task-completion", serialize = "1")]
    OnTaskCompletion,
    #[strum(to_string = "on-sleep", serialize = "2")]
    OnSleep,
}

/// What happens to the mother at division.
#[derive(Debug, Clone, Copy, EnumIter, EnumString, Display, PartialEq, Eq, Hash)]
pub enum DivideMethod {
    #[strum(to_string = "normal", serialize = "0")]
    Normal,
    /// The mother is reset as a second offspring.
    #[strum(to_string = "split", serialize = "1")]
    Split,
}

#[derive(Debug, Clone, Copy, EnumIter, EnumString, Display, PartialEq, Eq, Hash)]
pub enum GenerationIncMethod {
    #[strum(to_string = "offspring", serialize = "0")]
    Offspring,
    #[strum(to_string = "both", serialize = "1")]
    Both,
}

/// How CPU time is handed out across the population.
#[derive(Debug, Clone, Copy, EnumIter, EnumString, Display, PartialEq, Eq, Hash)]
pub enum SlicingMethod {
    #[strum(to_string = "constant", serialize = "0")]
    Constant,
    #[strum(to_string = "probabilistic", serialize = "1")]
    Probabilistic,
    #[strum(to_string = "deme-probabilistic", serialize = "3")]
    DemeProbabilistic,
}

/// Monotonic map from merit to scheduler weight.
#[derive(Debug, Clone, Copy, EnumIter, EnumString, Display, PartialEq, Eq, Hash, Default)]
pub enum WeightTransform {
    #[default]
    #[strum(to_string = "identity")]
    Identity,
    #[strum(to_string = "sqrt")]
    Sqrt,
    #[strum(to_string = "log")]
    Log,
}

/// Parses a policy name, reporting the offending value and the accepted
/// names when it is unknown.
pub fn parse_policy<T>(value: &str, what: &str) -> EvoResult<T>
where
    T: FromStr + IntoEnumIterator + Display,
{
    T::from_str(value.trim()).map_err(|_| {
        let known: Vec<String> = T::iter().map(|p| p.to_string()).collect();
        EvoError::Config(format!(
            "unknown {} '{}' (expected one of: {})",
            what,
            value,
            known.join(", ")
        ))
    })
}
