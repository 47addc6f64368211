//! mathocr CLI
//!
//! Inspects and resolves the configuration of a formula recognizer.
//!
//! # Usage
//!
//! ```bash
//! mathocr check --asset-dir assets
//! mathocr resolve --asset-dir assets --output json
//! mathocr defaults
//! ```

mod cli;

use clap::{Parser, Subcommand, ValueEnum};
use mathocr::AssetLayout;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "mathocr")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Verify assets and resolve formula recognizer parameters", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum OutputFormat {
    Yaml,
    Json,
}

#[derive(clap::Args)]
struct LayoutArgs {
    /// Directory holding the model assets
    #[arg(long = "asset-dir", default_value = "assets", env = "MATHOCR_ASSET_DIR")]
    asset_dir: PathBuf,

    /// Settings document (relative paths resolve against the asset directory)
    #[arg(long, env = "MATHOCR_SETTINGS")]
    settings: Option<PathBuf>,

    /// Where to write the resolved document
    #[arg(long, env = "MATHOCR_RESOLVED")]
    resolved: Option<PathBuf>,

    /// Known-good vocabulary source used for healing
    #[arg(long = "vocabulary-url", env = "MATHOCR_VOCABULARY_URL")]
    vocabulary_url: Option<String>,

    /// Never fetch a replacement vocabulary
    #[arg(long = "no-heal", conflicts_with = "vocabulary_url")]
    no_heal: bool,

    /// Timeout for the healing fetch, in seconds
    #[arg(long = "fetch-timeout", env = "MATHOCR_FETCH_TIMEOUT")]
    fetch_timeout: Option<u64>,
}

impl LayoutArgs {
    fn into_layout(self) -> AssetLayout {
        let mut layout = AssetLayout::new(self.asset_dir);
        if let Some(settings) = self.settings {
            layout = layout.with_settings(settings);
        }
        if let Some(resolved) = self.resolved {
            layout = layout.with_resolved(resolved);
        }
        if self.no_heal {
            layout = layout.with_vocabulary_url(None);
        } else if let Some(url) = self.vocabulary_url {
            layout = layout.with_vocabulary_url(Some(url));
        }
        if let Some(secs) = self.fetch_timeout {
            layout = layout.with_fetch_timeout(Duration::from_secs(secs));
        }
        layout
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Verify (and heal) the required assets
    Check {
        #[command(flatten)]
        layout: LayoutArgs,
    },
    /// Resolve and persist the engine parameters
    Resolve {
        #[command(flatten)]
        layout: LayoutArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        output: OutputFormat,
    },
    /// Print the built-in default parameters
    Defaults {
        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        output: OutputFormat,
    },
}

fn main() {
    mathocr::utils::init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { layout } => {
            let layout = layout.into_layout();
            info!("Checking assets in {}", layout.asset_dir.display());
            cli::check(layout)
        }
        Commands::Resolve { layout, output } => {
            let layout = layout.into_layout();
            info!("Resolving parameters for {}", layout.asset_dir.display());
            cli::resolve(layout, output)
        }
        Commands::Defaults { output } => cli::print_defaults(output),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        let mut source = e.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        std::process::exit(1);
    }
}
