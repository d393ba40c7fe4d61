use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::{error, info};

use onsite_ews::config::{load_config, save_config, Config, InputUnit};
use onsite_ews::local::process_file::{self, RunFiles};
use onsite_ews::local::simulate::{simulate, SimulationConfig};
use onsite_ews::utils::io::write_acceleration_file;
use onsite_ews::utils::log::init_logging;
use onsite_ews::{BuildingType, DamageState, EwsResult};

/// On-site earthquake early warning: trigger, drift estimation and damage alarm
#[derive(Parser, Debug)]
#[command(name = "onsite-ews", version, about, long_about = None)]
struct Cli {
    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyse a top/base pair of acceleration records
    Run(RunArgs),
    /// Write a synthetic top/base pair
    Simulate(SimulateArgs),
    /// Write the default configuration file
    InitConfig {
        #[arg(default_value = "onsite-ews.yaml")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Roof (top) sensor record
    top: PathBuf,
    /// Foundation (base) sensor record
    base: PathBuf,
    /// YAML configuration; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    fs: Option<u32>,
    #[arg(long, value_enum)]
    unit: Option<InputUnit>,
    #[arg(long, value_enum)]
    building: Option<BuildingType>,
    #[arg(long, value_enum)]
    damage: Option<DamageState>,
    /// Building height in metres
    #[arg(long)]
    height: Option<f64>,
    #[arg(long)]
    sta: Option<f64>,
    #[arg(long)]
    lta: Option<f64>,
    /// Post-trigger monitoring window in seconds
    #[arg(long)]
    window: Option<f64>,
    /// Results CSV (default: <top>_results.csv)
    #[arg(long)]
    results: Option<PathBuf>,
    /// Monitoring trace CSV (default: <top>_debug.csv)
    #[arg(long)]
    trace: Option<PathBuf>,
    /// Skip the monitoring trace
    #[arg(long)]
    no_trace: bool,
}

impl RunArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(fs) = self.fs {
            config.processor.fs = fs;
        }
        if let Some(unit) = self.unit {
            config.processor.input_unit = unit;
        }
        if let Some(building) = self.building {
            config.building.building_type = building;
        }
        if let Some(damage) = self.damage {
            config.building.damage_state = damage;
        }
        if let Some(height) = self.height {
            config.building.height_m = height;
        }
        if let Some(sta) = self.sta {
            config.trigger.sta_s = sta;
        }
        if let Some(lta) = self.lta {
            config.trigger.lta_s = lta;
        }
        if let Some(window) = self.window {
            config.monitoring.window_s = window;
        }
        if self.no_trace {
            config.monitoring.write_trace = false;
        }
    }
}

#[derive(Args, Debug)]
struct SimulateArgs {
    #[arg(long, default_value = "sim_top.txt")]
    top: PathBuf,
    #[arg(long, default_value = "sim_base.txt")]
    base: PathBuf,
    /// Unit the files are written in
    #[arg(long, value_enum, default_value = "g")]
    unit: InputUnit,
    #[arg(long)]
    fs: Option<u32>,
    #[arg(long)]
    duration: Option<f64>,
    #[arg(long)]
    onset: Option<f64>,
    /// Peak base acceleration in m/s²
    #[arg(long)]
    amplitude: Option<f64>,
    #[arg(long)]
    frequency: Option<f64>,
    #[arg(long)]
    seed: Option<u64>,
}

impl SimulateArgs {
    fn to_config(&self) -> SimulationConfig {
        let defaults = SimulationConfig::default();
        SimulationConfig {
            fs: self.fs.unwrap_or(defaults.fs),
            duration_s: self.duration.unwrap_or(defaults.duration_s),
            onset_s: self.onset.unwrap_or(defaults.onset_s),
            base_amplitude: self.amplitude.unwrap_or(defaults.base_amplitude),
            frequency_hz: self.frequency.unwrap_or(defaults.frequency_hz),
            seed: self.seed.unwrap_or(defaults.seed),
            ..defaults
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: Cli) -> EwsResult<()> {
    match cli.command {
        Command::Run(args) => {
            let mut config = match &args.config {
                Some(path) => load_config(path)?,
                None => Config::default(),
            };
            args.apply(&mut config);
            config.processor.verbose |= cli.verbose;
            init_logging(config.processor.verbose);
            if let Some(path) = &args.config {
                info!(path = %path.display(), "configuration loaded");
            }

            let files = RunFiles {
                top: args.top,
                base: args.base,
                results: args.results,
                trace: args.trace,
            };
            process_file::run(config, &files)?;
        }
        Command::Simulate(args) => {
            init_logging(cli.verbose);
            let sim = args.to_config();
            let record = simulate(&sim);
            write_acceleration_file(&args.top, &record.top, args.unit)?;
            write_acceleration_file(&args.base, &record.base, args.unit)?;
            info!(
                top = %args.top.display(),
                base = %args.base.display(),
                samples = record.top.len(),
                fs = sim.fs,
                "synthetic records written"
            );
        }
        Command::InitConfig { path, force } => {
            init_logging(cli.verbose);
            if path.exists() && !force {
                eprintln!(
                    "{} {} already exists (use --force to overwrite)",
                    "!".yellow(),
                    path.display()
                );
                return Ok(());
            }
            save_config(&Config::default(), &path)?;
            println!("Default configuration written to {}", path.display());
        }
    }
    Ok(())
}
