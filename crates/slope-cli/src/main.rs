//! slope CLI - batch slope hatch generation
//!
//! Reads a job file describing a crest and a toe curve, generates the hatch
//! strokes and writes them as JSON.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use slope_hatch::{generate_hatch, CurvePair, HatchSettings, Resolver};

mod job;

use job::{Job, OutputJson};

#[derive(Parser)]
#[command(name = "slope")]
#[command(about = "Slope hatch generator", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate hatch strokes for a job file
    Generate {
        /// Job file (.json)
        job: PathBuf,
        /// Settings file (.toml); defaults are used when missing
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the toe point a crest distance resolves to
    Resolve {
        /// Job file (.json)
        job: PathBuf,
        /// Projected distance along the crest
        crest_dist: f64,
        /// Settings file (.toml) selecting the method
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Write the default settings as TOML
    Config {
        /// Destination file
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    match cli.command {
        Commands::Generate {
            job,
            config,
            output,
        } => generate(&job, config.as_deref(), output.as_deref()),
        Commands::Resolve {
            job,
            crest_dist,
            config,
        } => resolve(&job, crest_dist, config.as_deref()),
        Commands::Config { path } => {
            HatchSettings::default().save_to_file(&path)?;
            println!("Wrote default settings to {}", path.display());
            Ok(())
        }
    }
}

fn load_settings(config: Option<&Path>) -> HatchSettings {
    config
        .map(HatchSettings::load_from_file)
        .unwrap_or_default()
}

fn generate(job_path: &Path, config: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let settings = load_settings(config);
    let loaded = Job::load(job_path)?.build()?;

    let result = generate_hatch(
        loaded.crest.as_ref(),
        loaded.toe.as_ref(),
        &settings,
        &loaded.overrides,
        loaded.range,
    )?;

    let json = serde_json::to_string_pretty(&OutputJson::from(&result))?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            println!(
                "Wrote {} strokes to {}",
                result.stats.stroke_count,
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn resolve(job_path: &Path, crest_dist: f64, config: Option<&Path>) -> Result<()> {
    let settings = load_settings(config);
    let loaded = Job::load(job_path)?.build()?;

    let pair = CurvePair::new(loaded.crest.as_ref(), loaded.toe.as_ref());
    let resolved = Resolver::new(pair).resolve(
        crest_dist,
        settings.method,
        &loaded.overrides,
        pair.is_opposite_direction(),
    );

    let p = resolved.point;
    println!(
        "toe distance {:.6} at ({:.6}, {:.6}, {:.6}){}",
        resolved.toe_dist,
        p.x,
        p.y,
        p.z,
        if resolved.is_manual { " [manual]" } else { "" }
    );

    Ok(())
}
