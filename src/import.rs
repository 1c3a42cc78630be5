use crate::scanner;
use crate::stats::ImportStats;
use crate::store::BibleStore;
use crate::text::resolve_encoding;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

pub struct ImportConfig {
    pub text_path: PathBuf,
    pub db_path: PathBuf,
    pub encoding: String,
}

/// Parses the text, makes sure the table exists, and stores every verse.
///
/// Re-running against an already populated database validates the row
/// count instead of inserting again.
pub fn run_import(config: &ImportConfig) -> Result<ImportStats> {
    let encoding = resolve_encoding(&config.encoding)?;
    let mut stats = ImportStats::new();

    let start = Instant::now();
    let bible = scanner::parse_bible(&config.text_path, encoding)?;
    stats.parse_time = start.elapsed();
    stats.record_bible(&bible)?;

    let start = Instant::now();
    let store = BibleStore::new(config.db_path.clone());
    stats.table_created = store
        .ensure_schema()
        .with_context(|| format!("Failed to prepare database: {}", config.db_path.display()))?;
    let population = store
        .populate(&bible)
        .with_context(|| format!("Failed to populate database: {}", config.db_path.display()))?;
    stats.record_population(population);
    stats.store_time = start.elapsed();

    info!(
        duration_secs = stats.total_time().as_secs_f64(),
        verses = stats.verses,
        "Import complete"
    );
    Ok(stats)
}
