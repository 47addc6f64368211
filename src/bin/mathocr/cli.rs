//! Subcommand implementations.

use crate::OutputFormat;
use mathocr::core::config::defaults;
use mathocr::{AssetLayout, Pipeline};
use serde::Serialize;
use std::time::Instant;
use tracing::info;

pub type CliResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Verify the assets and print the manifest
pub fn check(layout: AssetLayout) -> CliResult {
    let start = Instant::now();
    let manifest = Pipeline::new(layout).verify_assets()?;
    info!("Assets verified in {:.2}ms", start.elapsed().as_secs_f64() * 1000.0);

    for record in manifest.records() {
        let status = match record.status {
            Some(status) => format!("{status:?}").to_lowercase(),
            None => "present".to_string(),
        };
        println!("{:<10} {:<8} {}", record.role.to_string(), status, record.path.display());
    }
    println!("vocabulary entries: {}", manifest.vocab_size);
    Ok(())
}

/// Run the pipeline up to the persisted document and print it
pub fn resolve(layout: AssetLayout, format: OutputFormat) -> CliResult {
    let start = Instant::now();
    let resolution = Pipeline::new(layout).resolve()?;
    info!(
        "Resolved in {:.2}ms, written to {}",
        start.elapsed().as_secs_f64() * 1000.0,
        resolution.handle.path().display()
    );
    print_document(resolution.handle.config(), format)
}

/// Print the versioned baseline
pub fn print_defaults(format: OutputFormat) -> CliResult {
    let set = defaults();
    info!("Defaults version {}", set.version());
    print_document(set.parameters(), format)
}

fn print_document<T: Serialize>(value: &T, format: OutputFormat) -> CliResult {
    match format {
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}
