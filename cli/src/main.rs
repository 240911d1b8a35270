//! Jet Calibration CLI
//!
//! Diagnostics over the calibration engine: which files apply to a run, and
//! what an exclusion map contains.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jet_calib_core::selector::ActiveInputs;
use jet_calib_core::veto::{detect_roles, MapContainer, VetoMap};
use jet_calib_core::{CalibrationConfig, DataMcSelector};

#[derive(Parser)]
#[command(name = "jet-calib")]
#[command(about = "Inspect run-dependent calibration inputs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the residual and exclusion-map files that apply to a run
    Resolve {
        /// Calibration configuration (JSON)
        #[arg(long)]
        config: PathBuf,

        /// Run number
        #[arg(long)]
        run: u32,

        /// Select the simulation bundle instead of the data bundle
        #[arg(long, default_value = "false")]
        simulation: bool,
    },

    /// List the objects of an exclusion-map container
    InspectMap {
        /// Map file (.vmap)
        #[arg(long)]
        map: PathBuf,
    },

    /// Query the veto flag at one point
    QueryMap {
        /// Map file (.vmap)
        #[arg(long)]
        map: PathBuf,

        #[arg(long, allow_hyphen_values = true)]
        eta: f64,

        #[arg(long, allow_hyphen_values = true)]
        phi: f64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            config,
            run,
            simulation,
        } => resolve(&config, run, simulation),
        Commands::InspectMap { map } => inspect_map(&map),
        Commands::QueryMap { map, eta, phi } => query_map(&map, eta, phi),
    }
}

fn resolve(config_path: &Path, run: u32, simulation: bool) -> Result<()> {
    let config = CalibrationConfig::from_json_file(config_path)
        .with_context(|| format!("loading configuration {}", config_path.display()))?;

    let mut inputs = ActiveInputs::from_config(&config);
    let mut selector = DataMcSelector::from_config(&config);
    let flavor = selector.select(!simulation, &mut inputs);

    println!("run:         {}", run);
    println!("mode:        {}", config.mode.as_str());
    if let Some(flavor) = flavor {
        println!("flavor:      {}", flavor.as_str());
    }
    println!("levels:      {}", inputs.levels.join(", "));
    for file in &inputs.level_files {
        println!("level file:  {}", file);
    }

    let residual = if inputs.residual_by_run {
        inputs.residual_table.resolve(run)
    } else {
        None
    };
    match residual {
        Some(m) => println!("residual:    {} (rule {})", m.payload, m.index),
        None => println!("residual:    (none)"),
    }

    match inputs.veto_map_table.resolve(run) {
        Some(m) => println!("veto map:    {} (rule {})", m.payload, m.index),
        None => println!("veto map:    (none)"),
    }

    Ok(())
}

fn inspect_map(path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let container = MapContainer::from_json_str(&text)
        .with_context(|| format!("parsing map container {}", path.display()))?;

    for object in &container.objects {
        let shape = match object.as_grid() {
            Some(grid) => format!(
                "{}x{} x{:?} y{:?}",
                grid.x.bins(),
                grid.y.bins(),
                grid.x.range(),
                grid.y.range()
            ),
            None => "not a 2-D grid".to_string(),
        };
        println!("{:<24} {:<8} {}", object.name, object.kind, shape);
    }

    match container.locate_grid() {
        Some(found) => {
            let roles = detect_roles(found.grid.x.range(), found.grid.y.range());
            println!("selected:    {} ({:?})", found.name, found.step);
            println!("eta axis:    {:?}", roles.eta);
            println!("phi axis:    {:?}", roles.phi);
        }
        None => println!("selected:    (no compatible grid)"),
    }

    Ok(())
}

fn query_map(path: &Path, eta: f64, phi: f64) -> Result<()> {
    let path_str = path
        .to_str()
        .with_context(|| format!("non UTF-8 path {}", path.display()))?;
    let map = VetoMap::load(path_str).with_context(|| format!("loading {}", path.display()))?;
    println!("{}", map.flag(eta, phi));
    Ok(())
}
