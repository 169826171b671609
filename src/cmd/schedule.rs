use crate::reports;
use clap::Args;
use evoforge::config::Config;
use evoforge::error::{EvoError, EvoResult};
use evoforge::policy::SlicingMethod;
use evoforge::scheduler::{build_scheduler, MeritWeight};
use evoforge::settings::RunSettings;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub config: Config,

    /// Merit per slot, as a JSON array or a one-column CSV. Defaults to
    /// `1..=world_size`.
    #[arg(short = 'w', long)]
    pub merits: Option<String>,

    #[arg(short = 'd', long, default_value_t = 100_000)]
    pub draws: usize,

    /// Rows shown in the frequency table.
    #[arg(long, default_value_t = 20)]
    pub top: usize,
}

pub struct SlotFrequency {
    pub slot: usize,
    pub merit: f64,
    pub expected: f64,
    pub observed: f64,
}

fn load_merits(path: &str) -> EvoResult<Vec<f64>> {
    if Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    {
        let content = fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&content)?);
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    let mut merits = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let field = record.get(0).unwrap_or("").trim();
        let merit = field.parse::<f64>().map_err(|_| {
            EvoError::Config(format!("line {}: '{}' is not a number", line + 1, field))
        })?;
        merits.push(merit);
    }
    Ok(merits)
}

/// Long-run share of draws each slot should get under `settings`.
pub fn expected_frequencies(settings: &RunSettings, merits: &[f64]) -> Vec<f64> {
    let n = merits.len();
    let mut expected = vec![0.0; n];

    match settings.slicing_method {
        SlicingMethod::Constant => {
            let active: Vec<usize> = (0..n).filter(|&i| merits[i] > 0.0).collect();
            if active.is_empty() {
                expected[0] = 1.0;
            } else {
                let share = 1.0 / active.len() as f64;
                active.into_iter().for_each(|i| expected[i] = share);
            }
        }
        SlicingMethod::Probabilistic | SlicingMethod::DemeProbabilistic => {
            let num_demes = if settings.slicing_method == SlicingMethod::Probabilistic {
                1
            } else {
                settings.num_demes
            };
            let deme_size = n / num_demes;
            let weights: Vec<f64> = merits
                .iter()
                .map(|&m| settings.weight_transform.weight(m))
                .collect();

            for (deme, chunk) in weights.chunks(deme_size).enumerate() {
                let start = deme * deme_size;
                let total: f64 = chunk.iter().sum();
                if total > 0.0 {
                    for (i, w) in chunk.iter().enumerate() {
                        expected[start + i] = w / total / num_demes as f64;
                    }
                } else {
                    expected[start] = 1.0 / num_demes as f64;
                }
            }
        }
    }
    expected
}

pub fn run(args: ScheduleArgs, settings: Arc<RunSettings>) -> EvoResult<()> {
    let merits = match &args.merits {
        Some(path) => {
            info!("⚖️  Loading merits from: {}", path);
            load_merits(path)?
        }
        None => (1..=settings.world_size).map(|m| m as f64).collect(),
    };

    let mut settings = (*settings).clone();
    settings.world_size = merits.len();
    settings.validate()?;

    let mut schedule = build_scheduler(&settings)?;
    for (slot, &merit) in merits.iter().enumerate() {
        let deme = schedule.deme_of(slot);
        schedule.adjust(slot, merit, deme)?;
    }

    info!("🎲 Drawing {} slots", args.draws);
    let mut counts = vec![0usize; merits.len()];
    for _ in 0..args.draws {
        counts[schedule.next_slot()] += 1;
    }

    let expected = expected_frequencies(&settings, &merits);
    let draws = args.draws.max(1) as f64;
    let mut rows: Vec<SlotFrequency> = merits
        .iter()
        .enumerate()
        .map(|(slot, &merit)| SlotFrequency {
            slot,
            merit,
            expected: expected[slot],
            observed: counts[slot] as f64 / draws,
        })
        .collect();

    rows.sort_by(|a, b| b.expected.total_cmp(&a.expected).then(a.slot.cmp(&b.slot)));
    rows.truncate(args.top);

    reports::print_schedule_report(&settings, args.draws, &rows);
    Ok(())
}
