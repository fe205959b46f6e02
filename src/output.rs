//! Output formatting and persistence for rankings and figures.
//!
//! Supports log summaries, JSON files (optionally gzip-compressed) and CSV
//! append.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::pollutant::Pollutant;
use crate::ranking::{Band, RankingOutcome};

/// One CSV row per ranked city.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    pub generated_at: DateTime<Utc>,
    pub pollutant: Pollutant,
    pub rank: usize,
    pub city: String,
    pub mean: f64,
    pub stddev: f64,
    pub samples: usize,
    pub band: Band,
}

pub fn ranking_rows(outcome: &RankingOutcome, generated_at: DateTime<Utc>) -> Vec<RankingRow> {
    outcome
        .ranking
        .entries
        .iter()
        .map(|e| RankingRow {
            generated_at,
            pollutant: outcome.pollutant,
            rank: e.rank,
            city: e.city.clone(),
            mean: e.mean,
            stddev: e.stddev,
            samples: e.samples,
            band: e.band,
        })
        .collect()
}

/// Logs a ranking, one line per city, followed by its anomalies and warnings.
pub fn log_ranking(outcome: &RankingOutcome) {
    info!(
        pollutant = %outcome.pollutant,
        ranked = outcome.ranking.len(),
        eligible_records = outcome.eligible_records,
        discarded_records = outcome.discarded_records,
        "Top cities"
    );
    for e in &outcome.ranking.entries {
        info!(
            rank = e.rank,
            city = %e.city,
            mean = %format!("{:.2}", e.mean),
            samples = e.samples,
            band = e.band.label(),
            "Ranked city"
        );
    }
    for a in &outcome.anomalies {
        info!(city = %a.city, mean = a.mean, in_ranking = a.in_ranking, "Anomalous city");
    }
    for w in &outcome.warnings {
        info!(warning = ?w, "Ranking warning");
    }
}

/// Writes `value` as pretty JSON, gzip-compressed with a `.gz` suffix when
/// `gzip` is set. Returns the path actually written.
pub fn write_json(path: &Path, value: &impl Serialize, gzip: bool) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let body = serde_json::to_vec_pretty(value)?;
    let target = if gzip {
        let mut name = path.as_os_str().to_owned();
        name.push(".gz");
        let target = PathBuf::from(name);

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&body)?;
        fs::write(&target, encoder.finish()?)?;
        target
    } else {
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(&body)?;
        writer.flush()?;
        path.to_path_buf()
    };

    debug!(path = %target.display(), bytes = body.len(), gzip, "JSON written");
    Ok(target)
}

/// Appends rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_records<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, rows = rows.len(), "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
