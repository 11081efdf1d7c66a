use clap::Parser;
use log::{info, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use plastic_snn::config::{NetworkConfig, SimulationConfig};
use plastic_snn::core::network::Network;
use plastic_snn::error::SNNError;
use plastic_snn::recorder::MemoryRecorder;

#[derive(Parser, Debug)]
#[command(about = "Simulate a spiking neural network with STDP plasticity")]
struct Args {
    /// The network configuration (JSON); defaults are used if omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// The simulation configuration (JSON); defaults are used if omitted
    #[arg(long)]
    simulation: Option<PathBuf>,
    /// Override the simulation duration (ms)
    #[arg(long)]
    t_max: Option<f64>,
    /// Override the time step (ms)
    #[arg(long)]
    dt: Option<f64>,
    /// Override the seed of the connectivity strategies
    #[arg(long)]
    seed: Option<u64>,
    /// The directory receiving the records and the log file
    #[arg(long, default_value = "output_logs")]
    output: PathBuf,
    /// Log every spike and weight change as it is recorded
    #[arg(long)]
    echo: bool,
    /// The log level, one of: off, error, warn, info, debug, trace
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(output: &Path, level: &str) -> Result<(), SNNError> {
    let level = LevelFilter::from_str(level)
        .map_err(|_| SNNError::InvalidParameter(format!("Unknown log level: {}", level)))?;

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S)} {h({l})} - {m}{n}")))
        .build();
    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d} {l} {t} - {m}{n}")))
        .build(output.join("simulation.log"))
        .map_err(|e| SNNError::IOError(e.to_string()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(
            Root::builder()
                .appender("stdout")
                .appender("logfile")
                .build(level),
        )
        .map_err(|e| SNNError::IOError(e.to_string()))?;

    log4rs::init_config(config).map_err(|e| SNNError::IOError(e.to_string()))?;
    Ok(())
}

fn main() -> Result<(), SNNError> {
    let args = Args::parse();

    fs::create_dir_all(&args.output).map_err(|e| SNNError::IOError(e.to_string()))?;
    init_logging(&args.output, &args.log_level)?;
    info!("{:?}", args);

    let mut config = match &args.config {
        Some(path) => NetworkConfig::load_from(path)?,
        None => NetworkConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut simulation = match &args.simulation {
        Some(path) => SimulationConfig::load_from(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(t_max) = args.t_max {
        simulation.t_max = t_max;
    }
    if let Some(dt) = args.dt {
        simulation.dt = dt;
    }

    let mut recorder = MemoryRecorder::new();
    recorder.set_echo(args.echo);

    let mut network = Network::from_config(&config, recorder)?;
    info!("Network building: done!");

    network.set_background_current(simulation.background_current);
    network.run(simulation.t_max, simulation.dt)?;
    info!("Network simulation: done!");

    let recorder = network.into_recorder();
    recorder.export_spikes_csv(args.output.join("spikes.csv"))?;
    recorder.export_weight_changes_csv(args.output.join("weight_changes.csv"))?;
    recorder.export_report(args.output.join("simulation_log.txt"))?;
    info!(
        "Records saving: done! {} spikes and {} weight changes saved to {}",
        recorder.num_spikes(),
        recorder.num_weight_changes(),
        args.output.display()
    );

    Ok(())
}
