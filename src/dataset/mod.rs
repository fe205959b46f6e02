//! Measurement table loading.
//!
//! A [`Dataset`] pairs the typed rows with the [`Schema`] of the header they
//! were read from, so "column absent" and "cell missing" stay distinguishable.

mod record;
mod source;
mod workbook;

pub use record::MeasurementRecord;
pub use source::{DatasetSource, LoadOptions, load_dataset};
pub use workbook::looks_like_workbook;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use serde::Serialize;
use std::io::Read;
use tracing::debug;

use crate::error::RankingError;
use crate::pollutant::Pollutant;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Column names of the loaded table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    pub columns: Vec<String>,
}

impl Schema {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Schema listing `city`, coordinates and every pollutant column.
    pub fn full() -> Self {
        let mut columns = vec![
            "city".to_string(),
            "latitude".to_string(),
            "longitude".to_string(),
        ];
        columns.extend(Pollutant::ALL.iter().map(|p| p.column().to_string()));
        Self { columns }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn has(&self, pollutant: Pollutant) -> bool {
        self.has_column(pollutant.column())
    }

    /// Pollutants whose column is present, in [`Pollutant::ALL`] order.
    pub fn pollutants(&self) -> Vec<Pollutant> {
        Pollutant::ALL.into_iter().filter(|p| self.has(*p)).collect()
    }

    pub fn require(&self, pollutant: Pollutant) -> Result<(), RankingError> {
        if self.has(pollutant) {
            Ok(())
        } else {
            Err(RankingError::MissingColumn {
                pollutant,
                column: pollutant.column(),
            })
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub schema: Schema,
    pub records: Vec<MeasurementRecord>,
    /// Every sheet of the source workbook; empty for delimited text.
    pub sheets: Vec<String>,
    /// The sheet the records were read from.
    pub sheet: Option<String>,
}

impl Dataset {
    pub fn new(schema: Schema, records: Vec<MeasurementRecord>) -> Self {
        Self {
            schema,
            records,
            ..Default::default()
        }
    }

    /// Parses delimited text. Gzip input is detected by its magic bytes.
    pub fn from_bytes(bytes: &[u8], delimiter: u8) -> Result<Self> {
        if bytes.starts_with(&GZIP_MAGIC) {
            debug!(compressed = bytes.len(), "Decompressing gzip dataset");
            Self::from_reader(GzDecoder::new(bytes), delimiter)
        } else {
            Self::from_reader(bytes, delimiter)
        }
    }

    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let schema = Schema::new(rdr.headers().context("Failed to read dataset header")?.iter());
        if !schema.has_column("city") {
            anyhow::bail!("Dataset has no 'city' column (columns: {:?})", schema.columns);
        }
        debug!(columns = ?schema.columns, "Dataset header read");

        let mut records = Vec::new();
        for (line, result) in rdr.deserialize().enumerate() {
            let record: MeasurementRecord =
                result.with_context(|| format!("Malformed dataset row {}", line + 1))?;
            records.push(record);
        }

        Ok(Self::new(schema, records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of rows missing each pollutant present in the schema.
    pub fn missing_counts(&self) -> Vec<(Pollutant, usize)> {
        self.schema
            .pollutants()
            .into_iter()
            .map(|p| {
                let missing = self
                    .records
                    .iter()
                    .filter(|r| r.concentration(p).is_none())
                    .count();
                (p, missing)
            })
            .collect()
    }
}
