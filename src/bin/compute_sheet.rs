//! Offline technical sheet calculator
//!
//! Usage: compute_sheet <entries.json>
//!
//! Reads a JSON array of raw ingredient entries and prints the enriched
//! sheet with its totals. No database is touched.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use ficha::config;
use ficha::yields::{compute_sheet, within_participation_tolerance, RawIngredientEntry};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(config::DEFAULT_LOG_DIRECTIVE.parse()?))
        .with_writer(std::io::stderr)
        .init();

    let path = match std::env::args().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => {
            eprintln!("Usage: compute_sheet <entries.json>");
            std::process::exit(2);
        }
    };

    let contents = std::fs::read_to_string(&path)?;
    let entries: Vec<RawIngredientEntry> = serde_json::from_str(&contents)?;

    let sheet = compute_sheet(&entries)?;
    if !within_participation_tolerance(&sheet) {
        tracing::warn!(
            participation_total = %sheet.participation_total,
            "Participation does not add up to 100"
        );
    }

    println!("{}", serde_json::to_string_pretty(&sheet)?);
    Ok(())
}
