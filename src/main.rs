//! CLI entry point for the air quality ranker.
//!
//! Provides subcommands for inspecting a measurement table, ranking the most
//! polluted cities, rendering map and bar-chart figures, and exporting the
//! dashboard bundle.

use air_quality_ranker::{
    config::{CleaningPolicy, RankingConfig, ShortfallPolicy},
    dashboard::Dashboard,
    dataset::{Dataset, DatasetSource, LoadOptions},
    fetch::BasicClient,
    output::{append_records, log_ranking, ranking_rows, write_json},
    pipeline::Pipeline,
    pollutant::Pollutant,
};
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "air_quality_ranker")]
#[command(about = "Rank cities by mean pollutant concentration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Path or URL of the measurement table (CSV/TSV, optionally gzipped).
    /// Falls back to the AQ_DATASET environment variable.
    #[arg(value_name = "FILE_OR_URL")]
    source: Option<String>,

    /// Field delimiter; inferred from the file extension when omitted
    #[arg(long)]
    delimiter: Option<char>,

    /// Workbook sheet to read (.xlsx sources); the first sheet when omitted
    #[arg(long)]
    sheet: Option<String>,
}

#[derive(Args)]
struct RankingArgs {
    /// Pollutant column or alias (pm10, pm25, no2). All pollutants when omitted
    #[arg(short, long)]
    pollutant: Option<String>,

    #[command(flatten)]
    policy: PolicyArgs,
}

#[derive(Args)]
struct PolicyArgs {
    /// Number of cities to keep per pollutant
    #[arg(short = 'n', long, default_value_t = 10)]
    top_n: usize,

    /// Which records are dropped before ranking
    #[arg(long, value_enum, default_value_t = CleaningPolicy::PerPollutant)]
    cleaning: CleaningPolicy,

    /// Fail instead of returning a shorter ranking when cities run out
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log the table's columns, row count and missing values per pollutant
    Inspect {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Rank the most polluted cities
    Rank {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        ranking: RankingArgs,

        /// JSON file to write the full report to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// CSV file to append ranked rows to
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Write scatter-map GeoJSON and bar-chart JSON figures
    Render {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        ranking: RankingArgs,

        /// Directory to write figures into
        #[arg(short = 'd', long, default_value = "figures")]
        out_dir: PathBuf,

        /// Gzip compress figure files
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Export the dashboard bundle: one view per pollutant plus an index
    Dashboard {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        policy: PolicyArgs,

        /// Initially selected pollutant
        #[arg(long, default_value = "pm10")]
        initial: String,

        /// Directory to write the bundle into
        #[arg(short = 'd', long, default_value = "dashboard")]
        out_dir: PathBuf,

        /// Gzip compress view files
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/air_quality_ranker.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("air_quality_ranker.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { source } => {
            let pipeline = Pipeline::new(RankingConfig::default());
            let (source, dataset) = load(&pipeline, &source).await?;
            if !dataset.sheets.is_empty() {
                info!(sheets = ?dataset.sheets, sheet = ?dataset.sheet, "Workbook sheets");
            }
            info!(
                source = %source,
                records = dataset.len(),
                columns = ?dataset.schema.columns,
                "Dataset schema"
            );
            for pollutant in Pollutant::ALL {
                if !dataset.schema.has(pollutant) {
                    warn!(column = pollutant.column(), "Pollutant column absent");
                }
            }
            for (pollutant, missing) in dataset.missing_counts() {
                info!(column = pollutant.column(), missing, "Missing values");
            }
        }
        Commands::Rank {
            source,
            ranking,
            output,
            csv,
        } => {
            let pipeline = build_pipeline(&ranking)?;
            let (source, dataset) = load(&pipeline, &source).await?;
            let report = pipeline.rank(&dataset, &source.to_string());

            for outcome in report.outcomes() {
                log_ranking(outcome);
                if let Some(path) = &csv {
                    append_records(path, &ranking_rows(outcome, report.generated_at))?;
                }
            }
            for (pollutant, e) in report.failures() {
                error!(pollutant = %pollutant, code = e.code(), error = %e, "Ranking failed");
            }

            if let Some(path) = output {
                let written = write_json(&path, &report, false)?;
                info!(path = %written.display(), "Report written");
            }

            if report.outcomes().next().is_none() {
                bail!("No pollutant could be ranked");
            }
        }
        Commands::Render {
            source,
            ranking,
            out_dir,
            gzip,
        } => {
            let pipeline = build_pipeline(&ranking)?;
            let (source, dataset) = load(&pipeline, &source).await?;
            let report = pipeline.rank(&dataset, &source.to_string());
            for (pollutant, e) in report.failures() {
                error!(pollutant = %pollutant, error = %e, "Skipping figures");
            }

            let rendered = pipeline.render(&dataset, &report, &out_dir, gzip)?;
            for figures in &rendered {
                info!(
                    pollutant = %figures.pollutant,
                    map = %figures.map.display(),
                    bar = %figures.bar.display(),
                    "Figures written"
                );
            }
        }
        Commands::Dashboard {
            source,
            policy,
            initial,
            out_dir,
            gzip,
        } => {
            let initial: Pollutant = initial.parse()?;
            let config = policy.config()?;

            let (_, dataset) = load(&Pipeline::new(config), &source).await?;
            let dashboard = Dashboard::new(dataset, config, initial);
            let index = dashboard.export_bundle(&out_dir, gzip)?;
            info!(index = %index.display(), "Dashboard ready");
        }
    }

    Ok(())
}

impl PolicyArgs {
    /// The validated ranking configuration these flags describe.
    fn config(&self) -> Result<RankingConfig> {
        let shortfall = if self.strict {
            ShortfallPolicy::Fail
        } else {
            ShortfallPolicy::Truncate
        };
        let config = RankingConfig::default()
            .with_top_n(self.top_n)
            .with_cleaning(self.cleaning)
            .with_shortfall(shortfall);
        config.validate()?;
        Ok(config)
    }
}

/// Builds the pipeline described by the ranking flags.
fn build_pipeline(args: &RankingArgs) -> Result<Pipeline> {
    let pipeline = Pipeline::new(args.policy.config()?);
    Ok(match &args.pollutant {
        Some(name) => pipeline.with_pollutants(vec![name.parse()?]),
        None => pipeline,
    })
}

/// Resolves the dataset source and runs the load stage.
async fn load(pipeline: &Pipeline, args: &SourceArgs) -> Result<(DatasetSource, Dataset)> {
    let raw = match &args.source {
        Some(source) => source.clone(),
        None => std::env::var("AQ_DATASET")
            .context("No dataset given and AQ_DATASET is not set")?,
    };
    let source = DatasetSource::parse(&raw);

    let delimiter = match args.delimiter {
        Some(c) if c.is_ascii() => Some(c as u8),
        Some(c) => bail!("Delimiter must be a single ASCII character, got '{c}'"),
        None => None,
    };

    let client = BasicClient::new()?;
    let dataset = pipeline
        .load(
            &client,
            &source,
            LoadOptions {
                delimiter,
                sheet: args.sheet.clone(),
            },
        )
        .await?;
    Ok((source, dataset))
}
