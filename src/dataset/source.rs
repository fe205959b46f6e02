use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;
use tracing::info;

use super::{Dataset, looks_like_workbook};
use crate::fetch::{HttpClient, fetch_bytes};

/// Where the measurement table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    File(PathBuf),
    Url(String),
}

impl DatasetSource {
    /// `http://` and `https://` locations are fetched, anything else is a path.
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            DatasetSource::Url(source.to_string())
        } else {
            DatasetSource::File(PathBuf::from(source))
        }
    }

    fn name(&self) -> String {
        match self {
            DatasetSource::File(path) => path.to_string_lossy().into_owned(),
            DatasetSource::Url(url) => url.clone(),
        }
    }

    /// `.xlsx`/`.xlsm` sources are read as workbooks.
    pub fn is_workbook(&self) -> bool {
        let name = self.name().to_ascii_lowercase();
        name.ends_with(".xlsx") || name.ends_with(".xlsm")
    }

    /// Tab for `.tsv`/`.tsv.gz` sources, comma otherwise.
    pub fn default_delimiter(&self) -> u8 {
        let name = self.name().to_ascii_lowercase();
        let name = name.strip_suffix(".gz").unwrap_or(&name);
        if name.ends_with(".tsv") || name.ends_with(".tab") {
            b'\t'
        } else {
            b','
        }
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Field delimiter; inferred from the source name when `None`.
    pub delimiter: Option<u8>,
    /// Workbook sheet to read; the first sheet when `None`.
    pub sheet: Option<String>,
}

/// Reads the measurement table from a local file or over HTTP.
#[tracing::instrument(skip_all, fields(source = %source))]
pub async fn load_dataset<C: HttpClient>(
    client: &C,
    source: &DatasetSource,
    options: LoadOptions,
) -> Result<Dataset> {
    let bytes = match source {
        DatasetSource::Url(url) => fetch_bytes(client, url).await?,
        DatasetSource::File(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read dataset {}", path.display()))?,
    };

    let dataset = if source.is_workbook() || looks_like_workbook(&bytes) {
        Dataset::from_workbook(&bytes, options.sheet.as_deref())
    } else {
        let delimiter = options
            .delimiter
            .unwrap_or_else(|| source.default_delimiter());
        Dataset::from_bytes(&bytes, delimiter)
    }
    .with_context(|| format!("Failed to parse dataset {source}"))?;

    info!(
        sheet = dataset.sheet.as_deref(),
        records = dataset.len(),
        pollutant_columns = ?dataset.schema.pollutants(),
        "Dataset loaded"
    );
    Ok(dataset)
}
