//! Command line driver for the spectral index pipeline
//!
//! # Usage
//!
//! ```bash
//! # Spectral index between a LoTSS and an NVSS cutout
//! cargo run --release --bin spectral_index -- compute \
//!     --first lotss.fits --first-survey lotss-dr2 \
//!     --second nvss.fits --second-survey nvss
//!
//! # Find a stored result again by its id
//! cargo run --release --bin spectral_index -- locate <uuid>
//!
//! # List the known surveys
//! cargo run --release --bin spectral_index -- surveys
//! ```
//!
//! `compute` and `locate` print the result handle as JSON.
//!
//! Set `RUST_LOG=debug` for per-stage progress.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use spectral_index::pipeline;
use spectral_index::{PipelineConfig, ResultHandle, ResultStore, Survey};
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a spectral index map from two survey images
    Compute {
        /// FITS image defining the output grid
        #[arg(long)]
        first: PathBuf,

        /// Survey of the first image
        #[arg(long, value_enum)]
        first_survey: Survey,

        /// FITS image reprojected onto the first image's grid
        #[arg(long)]
        second: PathBuf,

        /// Survey of the second image
        #[arg(long, value_enum)]
        second_survey: Survey,

        /// Directory receiving the result (overrides the config file)
        #[arg(long)]
        output_root: Option<PathBuf>,

        /// JSON pipeline configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Look up a stored result by its id
    Locate {
        /// Result id printed by `compute`
        id: Uuid,

        /// Directory holding the results (overrides the config file)
        #[arg(long)]
        output_root: Option<PathBuf>,

        /// JSON pipeline configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the survey registry
    Surveys,
}

fn load_config(config: Option<PathBuf>, output_root: Option<PathBuf>) -> Result<PipelineConfig> {
    let mut pipeline_config = match config {
        Some(path) => PipelineConfig::load_from_file(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(root) = output_root {
        pipeline_config.output_root = root;
    }
    Ok(pipeline_config)
}

fn print_handle(handle: &ResultHandle) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(handle)?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compute {
            first,
            first_survey,
            second,
            second_survey,
            output_root,
            config,
        } => {
            let pipeline_config = load_config(config, output_root)?;

            let (output, handle) = pipeline::run(
                &first,
                first_survey,
                &second,
                second_survey,
                &pipeline_config,
            )
            .with_context(|| {
                format!(
                    "Spectral index of {} and {} failed",
                    first.display(),
                    second.display()
                )
            })?;

            for (slot, reason) in &output.degraded_beam_matches {
                warn!("{slot} input used without beam matching: {reason}");
            }
            info!(
                "Numerator {}, denominator {}, download as {}",
                output.result.numerator,
                output.result.denominator,
                handle.download_name()
            );

            print_handle(&handle)?;
        }
        Commands::Locate {
            id,
            output_root,
            config,
        } => {
            let pipeline_config = load_config(config, output_root)?;
            let store = ResultStore::new(&pipeline_config.output_root);
            match store.locate(id) {
                Some(handle) => print_handle(&handle)?,
                None => bail!("No result {} under {}", id, store.root().display()),
            }
        }
        Commands::Surveys => {
            println!(
                "{:<10} {:>10} {:>12} {:>10}",
                "id", "freq_MHz", "noise_Jy", "beam_as"
            );
            for d in Survey::all() {
                println!(
                    "{:<10} {:>10.1} {:>12.6} {:>10.1}",
                    d.id.id(),
                    d.frequency_mhz,
                    d.noise_floor,
                    d.beam_resolution_arcsec
                );
            }
        }
    }

    Ok(())
}
