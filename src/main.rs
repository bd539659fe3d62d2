//! Rate card builder - command line entry point

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ratecard::config::BuildOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for ratecard
#[derive(Parser, Debug)]
#[command(name = "ratecard")]
#[command(about = "Builds the storefront pricing page from tiered rate-card workbooks")]
#[command(version)]
struct Args {
    /// Directory holding T0.xlsx ... T3.xlsx
    #[arg(short, long, default_value = "data", env = "RATECARD_DATA_DIR")]
    data_dir: PathBuf,

    /// Page template containing the __BUILD_DATA__ placeholder
    #[arg(short, long, default_value = "template.html", env = "RATECARD_TEMPLATE")]
    template: PathBuf,

    /// Directory the page is written to
    #[arg(short, long, default_value = "public", env = "RATECARD_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Extract tiers one after another instead of in parallel
    #[arg(long)]
    sequential: bool,

    /// Write the dataset as data.json instead of rendering the page
    #[arg(long)]
    json_only: bool,
}

impl From<Args> for BuildOptions {
    fn from(args: Args) -> Self {
        BuildOptions {
            data_dir: args.data_dir,
            template: args.template,
            output_dir: args.output_dir,
            parallel: !args.sequential,
            json_only: args.json_only,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ratecard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = BuildOptions::from(Args::parse());
    info!("Reading tier workbooks from {}", options.data_dir.display());

    let (path, summary) = ratecard::run(&options)
        .with_context(|| format!("Failed to write {}", options.output_file().display()))?;

    info!("Build finished: {}", summary);
    info!("Output: {}", path.display());
    Ok(())
}
