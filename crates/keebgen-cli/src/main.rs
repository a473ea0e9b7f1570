//! keebgen CLI - generate keyboard parts as OpenSCAD sources
//!
//! Every part is built from a TOML configuration (or the defaults) and
//! written either as `.scad` source or as the JSON CSG graph behind it.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use keebgen::config::SkirtConfig;
use keebgen::{
    build_column, build_key, build_keycap, cherry_mx_socket, Connector, CuboidAnchorCollection,
    EdgePair, Finger, FlaredSkirt, Geometry, KeebConfig, Solid,
};
use keebgen_math::Vec3;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Finger model used for reach previews, in mm and degrees.
const FINGER_SECOND_AND_THIRD_LEN: f64 = 45.0;
const FINGER_FIRST_LEN: f64 = 50.0;
const FINGER_LEAN_BACK: f64 = 15.0;

#[derive(Parser)]
#[command(name = "keebgen")]
#[command(about = "Parametric keyboard geometry generator", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default configuration as TOML
    DefaultConfig {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render a part to an OpenSCAD file
    Render {
        /// Part to build
        target: Target,
        /// Output .scad file
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        build: BuildArgs,
    },
    /// Dump the CSG graph of a part as JSON
    Ir {
        /// Part to build
        target: Target,
        /// Output .json file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        build: BuildArgs,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// TOML configuration file; missing values use the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Key width in units (socket, keycap and key only)
    #[arg(short, long, default_value_t = 1)]
    units: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Target {
    /// Cherry MX switch socket
    Socket,
    /// OEM keycap
    Keycap,
    /// Socket and keycap
    Key,
    /// Curved ortholinear column
    Column,
    /// Flared skirt around a tilted test block
    Skirt,
    /// Finger model for reach checks
    Finger,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::DefaultConfig { output } => {
            let text = KeebConfig::default().to_toml_string()?;
            write_or_print(output.as_deref(), &text)?;
        }
        Commands::Render {
            target,
            output,
            build,
        } => {
            let solid = build_target(target, &build)?;
            solid.write_scad(&output)?;
            println!("Wrote {:?} to {}", target, output.display());
        }
        Commands::Ir {
            target,
            output,
            build,
        } => {
            let solid = build_target(target, &build)?;
            let json = solid.to_document().to_json()?;
            write_or_print(output.as_deref(), &json)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<KeebConfig> {
    match path {
        Some(path) => KeebConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(KeebConfig::default()),
    }
}

fn build_target(target: Target, args: &BuildArgs) -> Result<Solid> {
    let config = load_config(args.config.as_deref())?;
    info!(?target, units = args.units, "building");
    let solid = match target {
        Target::Socket => cherry_mx_socket(&config.socket, args.units)?.solid(),
        Target::Keycap => build_keycap(&config.keycap, args.units)?.solid(),
        Target::Key => build_key(&config, args.units)?.solid(),
        Target::Column => build_column(&config)?.solid(),
        Target::Skirt => skirt_demo(&config.skirt)?,
        Target::Finger => Finger::new(
            FINGER_SECOND_AND_THIRD_LEN,
            FINGER_FIRST_LEN,
            FINGER_LEAN_BACK,
        )?
        .solid(),
    };
    Ok(solid)
}

/// A 10 x 10 x 3 block raised to z = 25 and tilted back, skirted on all sides.
fn skirt_demo(config: &SkirtConfig) -> Result<Solid> {
    let corners =
        CuboidAnchorCollection::create(Vec3::new(10.0, 10.0, 3.0), Vec3::new(5.0, 5.0, 1.5));
    let mut block = Connector::new(&corners.into())?;
    block.translate(0.0, 0.0, 25.0);
    block.rotate(30.0, 0.0, 0.0);

    let skirt = FlaredSkirt::new(&EdgePair::around_cuboid(&block.anchors()), config)?;
    Ok(block.solid() + skirt.solid())
}

fn write_or_print(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}
