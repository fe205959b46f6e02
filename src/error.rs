//! Error types for ranking requests.
//!
//! Loading and output code propagates `anyhow::Error`; a ranking request
//! fails with a [`RankingError`] so a report can record which pollutant
//! failed and why without aborting the others.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

use crate::pollutant::Pollutant;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RankingError {
    /// The requested field is not one of the supported pollutants.
    #[error("Unknown pollutant field '{0}'")]
    UnknownField(String),

    /// The pollutant is supported but the loaded dataset has no such column.
    #[error("Column '{column}' for {} is missing from the dataset schema", .pollutant.label())]
    MissingColumn {
        pollutant: Pollutant,
        column: &'static str,
    },

    /// Fewer distinct cities than requested, under the fail-on-shortfall policy.
    #[error("Only {available} cities have valid {pollutant} data, {requested} requested")]
    InsufficientData {
        pollutant: Pollutant,
        requested: usize,
        available: usize,
    },

    /// A ranking of zero entries was requested.
    #[error("Top-N limit must be positive, got {0}")]
    InvalidLimit(usize),
}

impl RankingError {
    /// Stable code for report consumers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownField(_) | Self::MissingColumn { .. } => "SCHEMA_ERROR",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::InvalidLimit(_) => "INVALID_LIMIT",
        }
    }

    pub fn is_schema_error(&self) -> bool {
        self.code() == "SCHEMA_ERROR"
    }
}

/// Serialized as `{code, message}` inside JSON reports.
impl Serialize for RankingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("RankingError", 2)?;
        state.serialize_field("code", &self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

pub type Result<T> = std::result::Result<T, RankingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(RankingError::UnknownField("x".into()).code(), "SCHEMA_ERROR");
        assert_eq!(
            RankingError::MissingColumn {
                pollutant: Pollutant::No2,
                column: "no2_concentration",
            }
            .code(),
            "SCHEMA_ERROR"
        );
        assert_eq!(RankingError::InvalidLimit(0).code(), "INVALID_LIMIT");
    }

    #[test]
    fn test_missing_column_message() {
        let err = RankingError::MissingColumn {
            pollutant: Pollutant::Pm25,
            column: "pm25_concentration",
        };
        assert_eq!(
            err.to_string(),
            "Column 'pm25_concentration' for PM2.5 is missing from the dataset schema"
        );
    }

    #[test]
    fn test_insufficient_data_is_not_schema_error() {
        let err = RankingError::InsufficientData {
            pollutant: Pollutant::Pm10,
            requested: 10,
            available: 3,
        };
        assert!(!err.is_schema_error());
        assert!(err.to_string().contains("Only 3 cities"));
    }

    #[test]
    fn test_error_serialization() {
        let json = serde_json::to_string(&RankingError::UnknownField("ozone".into())).unwrap();
        assert!(json.contains("SCHEMA_ERROR"));
        assert!(json.contains("ozone"));
    }
}
