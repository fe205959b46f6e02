//! Load → clean → aggregate → rank → render.
//!
//! Loading and rendering are the only stages that touch the outside world.
//! Clean, aggregate and rank live in [`crate::ranking`] and are pure; this
//! module strings them together per pollutant and collects a report.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{Instrument, info, info_span};

use crate::config::RankingConfig;
use crate::dataset::{Dataset, DatasetSource, LoadOptions, load_dataset};
use crate::error::RankingError;
use crate::fetch::HttpClient;
use crate::figures::{bar_chart, scatter_map};
use crate::output::write_json;
use crate::pollutant::Pollutant;
use crate::ranking::{RankingOutcome, rank_top_n};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Clean,
    Aggregate,
    Rank,
    Render,
}

/// Result slot for one pollutant: exactly one of `outcome`/`error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollutantResult {
    pub pollutant: Pollutant,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RankingOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RankingError>,
}

impl PollutantResult {
    fn new(pollutant: Pollutant, result: std::result::Result<RankingOutcome, RankingError>) -> Self {
        match result {
            Ok(outcome) => Self {
                pollutant,
                outcome: Some(outcome),
                error: None,
            },
            Err(error) => Self {
                pollutant,
                outcome: None,
                error: Some(error),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingReport {
    pub schema_version: u8,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub records: usize,
    pub config: RankingConfig,
    pub results: Vec<PollutantResult>,
}

impl RankingReport {
    pub fn outcomes(&self) -> impl Iterator<Item = &RankingOutcome> {
        self.results.iter().filter_map(|r| r.outcome.as_ref())
    }

    pub fn failures(&self) -> impl Iterator<Item = (Pollutant, &RankingError)> {
        self.results
            .iter()
            .filter_map(|r| r.error.as_ref().map(|e| (r.pollutant, e)))
    }

    pub fn outcome(&self, pollutant: Pollutant) -> Option<&RankingOutcome> {
        self.outcomes().find(|o| o.pollutant == pollutant)
    }
}

/// Paths written by the render stage for one pollutant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedFigures {
    pub pollutant: Pollutant,
    pub map: PathBuf,
    pub bar: PathBuf,
}

pub struct Pipeline {
    config: RankingConfig,
    pollutants: Vec<Pollutant>,
}

impl Pipeline {
    /// A pipeline over every supported pollutant.
    pub fn new(config: RankingConfig) -> Self {
        Self {
            config,
            pollutants: Pollutant::ALL.to_vec(),
        }
    }

    /// Restricts the run to `pollutants`, keeping their order.
    pub fn with_pollutants(mut self, pollutants: Vec<Pollutant>) -> Self {
        self.pollutants = pollutants;
        self
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    pub fn pollutants(&self) -> &[Pollutant] {
        &self.pollutants
    }

    /// Load stage.
    pub async fn load<C: HttpClient>(
        &self,
        client: &C,
        source: &DatasetSource,
        options: LoadOptions,
    ) -> Result<Dataset> {
        load_dataset(client, source, options)
            .instrument(info_span!("stage", stage = ?Stage::Load))
            .await
    }

    /// Clean, aggregate and rank stages, once per pollutant.
    pub fn rank(&self, dataset: &Dataset, source: &str) -> RankingReport {
        let results = self
            .pollutants
            .iter()
            .map(|&p| {
                let _span = info_span!("stage", stage = ?Stage::Rank, pollutant = %p).entered();
                PollutantResult::new(p, rank_top_n(dataset, p, &self.config))
            })
            .collect();

        RankingReport {
            schema_version: 1,
            generated_at: Utc::now(),
            source: source.to_string(),
            records: dataset.len(),
            config: self.config,
            results,
        }
    }

    /// Render stage: writes `map_<slug>.geojson` and `bar_<slug>.json` for
    /// every pollutant that ranked successfully.
    pub fn render(
        &self,
        dataset: &Dataset,
        report: &RankingReport,
        out_dir: &Path,
        gzip: bool,
    ) -> Result<Vec<RenderedFigures>> {
        let _span = info_span!("stage", stage = ?Stage::Render).entered();
        let mut rendered = Vec::new();

        for outcome in report.outcomes() {
            let slug = outcome.pollutant.slug();
            let map = scatter_map(&dataset.records, outcome.pollutant);
            let map = write_json(&out_dir.join(format!("map_{slug}.geojson")), &map, gzip)?;
            let bar = write_json(
                &out_dir.join(format!("bar_{slug}.json")),
                &bar_chart(outcome),
                gzip,
            )?;
            rendered.push(RenderedFigures {
                pollutant: outcome.pollutant,
                map,
                bar,
            });
        }

        info!(figures = rendered.len() * 2, out_dir = %out_dir.display(), "Figures rendered");
        Ok(rendered)
    }

    /// Runs every stage; figures are written only when `out_dir` is given.
    pub async fn run<C: HttpClient>(
        &self,
        client: &C,
        source: &DatasetSource,
        options: LoadOptions,
        out_dir: Option<&Path>,
        gzip: bool,
    ) -> Result<(RankingReport, Vec<RenderedFigures>)> {
        let dataset = self.load(client, source, options).await?;
        let report = self.rank(&dataset, &source.to_string());
        let rendered = match out_dir {
            Some(dir) => self.render(&dataset, &report, dir, gzip)?,
            None => Vec::new(),
        };
        Ok((report, rendered))
    }
}
