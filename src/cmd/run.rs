use crate::reports;
use clap::Args;
use evoforge::config::Config;
use evoforge::error::EvoResult;
use evoforge::phenotype::PhenotypeRecord;
use evoforge::population::{Simulation, SimulationOptions, SimulationResult, UpdateStats};
use evoforge::settings::RunSettings;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: Config,

    /// Independent runs, seeded `seed + i`.
    #[arg(short = 'r', long, default_value_t = 1)]
    pub replicates: usize,

    /// Wall-clock limit per replicate, in seconds.
    #[arg(short = 'T', long)]
    pub time: Option<u64>,

    /// Write per-update statistics of every replicate as CSV.
    #[arg(long)]
    pub stats_csv: Option<PathBuf>,

    /// Write the final flat phenotype record of every organism as CSV.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

pub struct ReplicateOutcome {
    pub replicate: usize,
    pub seed: u64,
    pub result: SimulationResult,
    pub snapshot: Vec<(usize, PhenotypeRecord)>,
}

fn run_replicate(
    replicate: usize,
    config: &Config,
    base: &RunSettings,
    max_time: Option<Duration>,
    report_interval: usize,
) -> EvoResult<ReplicateOutcome> {
    let mut settings = base.clone();
    settings.seed = base.seed + replicate as u64;
    let seed = settings.seed;

    let mut options = SimulationOptions::from(config);
    options.max_time = max_time;

    let mut sim = Simulation::new(Arc::new(settings), options)?;
    let result = sim.run(move |stats: &UpdateStats| {
        if report_interval > 0 && stats.update % report_interval == 0 {
            info!(
                "Rep {:3} | Upd {:5} | Orgs: {:5} | Merit: {:.2} | Gen: {:.2}",
                replicate, stats.update, stats.num_organisms, stats.ave_merit, stats.ave_generation
            );
        }
        true
    })?;

    Ok(ReplicateOutcome {
        replicate,
        seed,
        result,
        snapshot: sim.snapshot(),
    })
}

pub fn run(args: RunArgs, config: Config, settings: Arc<RunSettings>) -> EvoResult<()> {
    let replicates = args.replicates.max(1);
    info!(
        "🔥 Running {} replicate(s) of {} updates on {} slots",
        replicates, config.driver.updates, settings.world_size
    );

    let max_time = args.time.map(Duration::from_secs);
    let report_interval = if replicates == 1 { 10 } else { 0 };

    let mut outcomes: Vec<ReplicateOutcome> = (0..replicates)
        .into_par_iter()
        .map(|i| run_replicate(i, &config, &settings, max_time, report_interval))
        .collect::<EvoResult<_>>()?;
    outcomes.sort_by_key(|o| o.replicate);

    println!("\n=== 🏆 FINAL RESULT ===");
    reports::print_replicate_summary(&outcomes);

    if let Some(path) = &args.stats_csv {
        write_stats_csv(path, &outcomes)?;
        info!("💾 Update statistics written to {}", path.display());
    }
    if let Some(path) = &args.snapshot {
        write_snapshot_csv(path, &outcomes)?;
        info!("💾 Phenotype snapshot written to {}", path.display());
    }
    Ok(())
}

const STATS_HEADER: [&str; 13] = [
    "replicate",
    "update",
    "num_organisms",
    "births",
    "deaths",
    "idle_ticks",
    "ave_merit",
    "max_merit",
    "ave_fitness",
    "ave_gestation",
    "ave_generation",
    "total_divides",
    "tasks_last_gen",
];

fn write_stats_csv(path: &Path, outcomes: &[ReplicateOutcome]) -> EvoResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(STATS_HEADER)?;
    for o in outcomes {
        for s in &o.result.history {
            wtr.write_record([
                o.replicate.to_string(),
                s.update.to_string(),
                s.num_organisms.to_string(),
                s.births.to_string(),
                s.deaths.to_string(),
                s.idle_ticks.to_string(),
                s.ave_merit.to_string(),
                s.max_merit.to_string(),
                s.ave_fitness.to_string(),
                s.ave_gestation.to_string(),
                s.ave_generation.to_string(),
                s.total_divides.to_string(),
                s.tasks_last_gen.to_string(),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// One row per organism: replicate, slot, then the flat record.
fn write_snapshot_csv(path: &Path, outcomes: &[ReplicateOutcome]) -> EvoResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    for o in outcomes {
        for (slot, record) in &o.snapshot {
            let mut row = vec![o.replicate.to_string(), slot.to_string()];
            row.extend(record.to_flat().iter().map(f64::to_string));
            wtr.write_record(&row)?;
        }
    }
    wtr.flush()?;
    Ok(())
}
