use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use evoforge::config::Config;
use evoforge::settings::RunSettings;
use std::process;
use std::sync::Arc;
use tracing::{error, info, warn, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON run configuration. Flags given on the command line win.
    #[arg(global = true, long)]
    config: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Run(cmd::run::RunArgs),
    Schedule(cmd::schedule::ScheduleArgs),
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("🚀 Initializing EvoForge...");

    let cli_config = match &cli.command {
        Commands::Run(args) => &args.config,
        Commands::Schedule(args) => &args.config,
    };

    let config = match &cli.config {
        Some(path) => {
            info!("📂 Loading configuration: {}", path);
            let mut file_config = Config::load_from_file(path).unwrap_or_else(|e| {
                error!("❌ {}", e);
                process::exit(1);
            });
            match matches.subcommand() {
                Some((_, sub_matches)) => file_config.merge_from_cli(cli_config, sub_matches),
                None => warn!("⚠️  No subcommand matches; command-line overrides ignored."),
            }
            file_config
        }
        None => cli_config.clone(),
    };

    let settings = match RunSettings::from_config(&config) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!("❌ FATAL CONFIGURATION ERROR:");
            error!("   {}", e);
            process::exit(1);
        }
    };

    let outcome = match cli.command {
        Commands::Run(args) => cmd::run::run(args, config, settings),
        Commands::Schedule(args) => cmd::schedule::run(args, settings),
    };

    if let Err(e) = outcome {
        error!("❌ {}", e);
        process::exit(1);
    }
}
