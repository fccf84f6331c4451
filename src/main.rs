//! trafco2 command-line interface
//!
//! Runs the emission and flow models on JSON inputs and prints JSON results.
//!
//! # Usage
//!
//! ```bash
//! trafco2 composition --ratio 0.6 --platoon-size 3
//! trafco2 --config model.toml diagram --ratio 0.6
//! trafco2 emission --trace trace.json --powertrain electric
//! trafco2 analyze --dataset highway.json --ratios 0,0.25,0.5 --mode ramp
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use trafco2::trafco2_components::analyzer::{TrafficDataset, TrafficEmissionAnalyzer};
use trafco2::trafco2_components::degradation::CruiseSystemDegradation;
use trafco2::trafco2_components::emission::EmissionEngines;
use trafco2::trafco2_components::fundamental_diagram::HeterogeneousFlowModel;
use trafco2::trafco2_core::scenario::{OperationScenario, ScenarioRecord};
use trafco2::trafco2_core::trace::KinematicTrace;
use trafco2::trafco2_core::vehicle::Powertrain;
use trafco2::{ModelConfig, TrafficError, TrafficResult};

/// Highway CO2 and heterogeneous traffic-flow models
#[derive(Parser, Debug)]
#[command(name = "trafco2")]
#[command(about = "Estimate CO2 emissions and flow of mixed human/ACC/CACC highway traffic")]
struct Args {
    /// TOML file overriding model parameters and the emission rate table
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log model diagnostics to stderr (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Human/ACC/CACC shares for a smart-vehicle penetration
    Composition {
        #[arg(short, long)]
        ratio: f64,
        #[arg(short = 'n', long, default_value_t = 3)]
        platoon_size: usize,
    },
    /// Density, speed and flow sweep
    Diagram {
        #[arg(short, long)]
        ratio: f64,
        #[arg(short = 'n', long, default_value_t = 3)]
        platoon_size: usize,
    },
    /// CO2 emitted over a kinematic trace
    Emission {
        /// JSON file with `velocity`, `acceleration` and `duration` arrays
        #[arg(short, long)]
        trace: PathBuf,
        #[arg(short, long, value_enum, default_value_t = PowertrainArg::Fuel)]
        powertrain: PowertrainArg,
        /// Factor applied to the drag coefficient
        #[arg(long, default_value_t = 1.0)]
        drag_correction: f64,
    },
    /// Emissions of a traffic dataset across ratios
    Analyze {
        /// JSON traffic dataset
        #[arg(short, long)]
        dataset: PathBuf,
        /// Comma-separated ratios in [0, 1]
        #[arg(short, long, value_delimiter = ',')]
        ratios: Vec<f64>,
        #[arg(short, long, value_enum, default_value_t = AnalysisMode::Smart)]
        mode: AnalysisMode,
    },
    /// Describe an operation scenario, or validate a scenario record file
    Scenario {
        /// One of manual_driving, smart_vehicle_mixing, vehicle_platooning
        #[arg(long, conflicts_with = "record")]
        name: Option<String>,
        /// JSON scenario record to validate
        #[arg(long)]
        record: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PowertrainArg {
    Fuel,
    Electric,
}

impl From<PowertrainArg> for Powertrain {
    fn from(value: PowertrainArg) -> Self {
        match value {
            PowertrainArg::Fuel => Powertrain::Fuel,
            PowertrainArg::Electric => Powertrain::Electric,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AnalysisMode {
    /// Smart-vehicle mixing ratios
    Smart,
    /// Off-ramp vehicle ratios
    Ramp,
}

#[derive(Serialize)]
struct EmissionOutput {
    powertrain: Powertrain,
    /// unit: g
    total: f64,
    /// unit: m
    distance: f64,
    /// unit: s
    duration: f64,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> TrafficResult<ModelConfig> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading model configuration");
            ModelConfig::from_file(path)
        }
        None => Ok(ModelConfig::default()),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> TrafficResult<T> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| TrafficError::Config(format!("{}: {e}", path.display())))
}

fn to_json<T: Serialize>(value: &T) -> TrafficResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| TrafficError::Config(e.to_string()))
}

fn run(args: &Args) -> TrafficResult<String> {
    let config = load_config(args.config.as_deref())?;

    match &args.command {
        Command::Composition {
            ratio,
            platoon_size,
        } => {
            let model = CruiseSystemDegradation::from_parameters(config.degradation.clone());
            to_json(&model.vehicle_proportions(*ratio, *platoon_size)?)
        }
        Command::Diagram {
            ratio,
            platoon_size,
        } => {
            let model = HeterogeneousFlowModel::from_parameters(
                config.flow.clone(),
                CruiseSystemDegradation::from_parameters(config.degradation.clone()),
            );
            to_json(&model.generate(*ratio, *platoon_size)?)
        }
        Command::Emission {
            trace,
            powertrain,
            drag_correction,
        } => {
            let trace: KinematicTrace = read_json(trace)?;
            let powertrain = Powertrain::from(*powertrain);
            let engines = EmissionEngines::from_config(&config);
            let total = engines
                .for_powertrain(powertrain)
                .corrected_emission(&trace, *drag_correction)?;
            to_json(&EmissionOutput {
                powertrain,
                total,
                distance: trace.distance(),
                duration: trace.total_duration(),
            })
        }
        Command::Analyze {
            dataset,
            ratios,
            mode,
        } => {
            let dataset: TrafficDataset = read_json(dataset)?;
            let analyzer = TrafficEmissionAnalyzer::from_config(&config);
            info!(vehicles = dataset.vehicles.len(), ratios = ratios.len(), "Analysing dataset");
            match mode {
                AnalysisMode::Smart => to_json(&analyzer.analyze_smart_vehicle_impact(ratios, &dataset)?),
                AnalysisMode::Ramp => to_json(&analyzer.analyze_ramp_vehicle_impact(ratios, &dataset)?),
            }
        }
        Command::Scenario { name, record } => match (name, record) {
            (Some(name), _) => {
                let scenario: OperationScenario = name.parse()?;
                to_json(&scenario.parameters())
            }
            (None, Some(path)) => {
                let content = std::fs::read_to_string(path)?;
                to_json(&ScenarioRecord::from_json(&content)?)
            }
            (None, None) => to_json(
                &OperationScenario::ALL
                    .iter()
                    .map(|s| (s, s.parameters()))
                    .collect::<Vec<_>>(),
            ),
        },
    }
}
