use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, Xlsx};
use std::collections::HashMap;
use std::io::Cursor;
use tracing::debug;

use super::{Dataset, MeasurementRecord, Schema};

const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";

/// Spreadsheet packages are zip archives; delimited text never starts with
/// the local file header signature.
pub fn looks_like_workbook(bytes: &[u8]) -> bool {
    bytes.starts_with(&ZIP_MAGIC)
}

impl Dataset {
    /// Reads one sheet of an `.xlsx` workbook, the first when `sheet` is
    /// `None`.
    ///
    /// The first row of the sheet is the header. Cells map to the same
    /// columns as delimited input; empty cells and text that does not parse as
    /// a number become `None`.
    pub fn from_workbook(bytes: &[u8], sheet: Option<&str>) -> Result<Self> {
        let mut workbook: Xlsx<_> =
            Xlsx::new(Cursor::new(bytes)).context("Failed to open workbook")?;
        let sheets = workbook.sheet_names();

        let name = match sheet {
            Some(name) if sheets.iter().any(|s| s == name) => name.to_string(),
            Some(name) => bail!("Workbook has no sheet '{name}' (sheets: {sheets:?})"),
            None => sheets.first().cloned().context("Workbook has no sheets")?,
        };
        let range = workbook
            .worksheet_range(&name)
            .with_context(|| format!("Failed to read sheet '{name}'"))?;

        let mut rows = range.rows();
        let header = rows
            .next()
            .with_context(|| format!("Sheet '{name}' is empty"))?;
        let schema = Schema::new(header.iter().map(|c| cell_text(c).unwrap_or_default()));
        if !schema.has_column("city") {
            bail!(
                "Sheet '{name}' has no 'city' column (columns: {:?})",
                schema.columns
            );
        }
        debug!(sheet = %name, columns = ?schema.columns, "Workbook header read");

        let records = {
            let index: HashMap<&str, usize> = schema
                .columns
                .iter()
                .enumerate()
                .map(|(i, c)| (c.as_str(), i))
                .collect();

            rows
                .filter(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
                .map(|row| {
                    let cell = |column: &str| index.get(column).and_then(|&i| row.get(i));
                    let text = |column: &str| cell(column).and_then(cell_text);
                    let number = |column: &str| cell(column).and_then(cell_number);

                    MeasurementRecord {
                        city: text("city").unwrap_or_default(),
                        country_name: text("country_name"),
                        iso3: text("iso3"),
                        who_region: text("who_region"),
                        year: number("year")
                            .filter(|y| y.fract() == 0.0 && y.abs() <= i32::MAX as f64)
                            .map(|y| y as i32),
                        latitude: number("latitude"),
                        longitude: number("longitude"),
                        pm10_concentration: number("pm10_concentration"),
                        pm25_concentration: number("pm25_concentration"),
                        no2_concentration: number("no2_concentration"),
                    }
                })
                .collect()
        };

        Ok(Self {
            schema,
            records,
            sheets,
            sheet: Some(name),
        })
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
