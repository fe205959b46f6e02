//! Dashboard controller: one pollutant selector driving a map and a bar chart.
//!
//! Each selection re-runs the ranking and both figure builders from the
//! loaded dataset; nothing is cached between selections.

use anyhow::Result;
use chrono::{DateTime, Utc};
use geojson::FeatureCollection;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::RankingConfig;
use crate::dataset::Dataset;
use crate::error::RankingError;
use crate::figures::{BarChart, bar_chart, scatter_map};
use crate::output::write_json;
use crate::pollutant::Pollutant;
use crate::ranking::{Anomaly, RankingWarning, rank_top_n};

/// What the dashboard shows for the current selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub pollutant: Pollutant,
    pub map: FeatureCollection,
    pub bar: BarChart,
    pub anomalies: Vec<Anomaly>,
    pub warnings: Vec<RankingWarning>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardOption {
    pub value: Pollutant,
    pub label: &'static str,
    pub file: Option<String>,
    pub error: Option<RankingError>,
}

/// Index of an exported bundle, listing the selector options.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardIndex {
    pub generated_at: DateTime<Utc>,
    pub selected: Pollutant,
    pub options: Vec<DashboardOption>,
}

pub struct Dashboard {
    dataset: Dataset,
    config: RankingConfig,
    selected: Pollutant,
}

impl Dashboard {
    /// Starts with `initial` selected.
    pub fn new(dataset: Dataset, config: RankingConfig, initial: Pollutant) -> Self {
        Self {
            dataset,
            config,
            selected: initial,
        }
    }

    /// The selector's choices: every supported pollutant.
    pub fn options(&self) -> &'static [Pollutant] {
        &Pollutant::ALL
    }

    pub fn selected(&self) -> Pollutant {
        self.selected
    }

    /// Changes the selection and renders the new view.
    ///
    /// The selection only moves when the view renders successfully.
    pub fn select(&mut self, pollutant: Pollutant) -> Result<DashboardView, RankingError> {
        let view = self.render(pollutant)?;
        self.selected = pollutant;
        Ok(view)
    }

    /// Renders the view for the current selection.
    pub fn view(&self) -> Result<DashboardView, RankingError> {
        self.render(self.selected)
    }

    fn render(&self, pollutant: Pollutant) -> Result<DashboardView, RankingError> {
        let outcome = rank_top_n(&self.dataset, pollutant, &self.config)?;
        Ok(DashboardView {
            pollutant,
            map: scatter_map(&self.dataset.records, pollutant),
            bar: bar_chart(&outcome),
            anomalies: outcome.anomalies,
            warnings: outcome.warnings,
        })
    }

    /// Writes `view_<pollutant>.json` for every option plus `index.json`.
    ///
    /// Options that fail to render are listed in the index with their error.
    pub fn export_bundle(&self, dir: &Path, gzip: bool) -> Result<PathBuf> {
        let mut options = Vec::new();

        for &pollutant in self.options() {
            let (file, error) = match self.render(pollutant) {
                Ok(view) => {
                    let path = dir.join(format!("view_{}.json", pollutant.slug()));
                    let written = write_json(&path, &view, gzip)?;
                    let name = written
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned());
                    (name, None)
                }
                Err(e) => {
                    warn!(pollutant = %pollutant, error = %e, "Dashboard view unavailable");
                    (None, Some(e))
                }
            };
            options.push(DashboardOption {
                value: pollutant,
                label: pollutant.label(),
                file,
                error,
            });
        }

        let index = DashboardIndex {
            generated_at: Utc::now(),
            selected: self.selected,
            options,
        };
        let path = write_json(&dir.join("index.json"), &index, false)?;
        info!(dir = %dir.display(), "Dashboard bundle exported");
        Ok(path)
    }
}
