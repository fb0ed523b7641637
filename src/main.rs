//! CLI entry point for the Berlin COVID-19 dashboard.
//!
//! Provides subcommands for building the dashboard view for one district,
//! listing the selectable districts, and exporting the reshaped tables.

use anyhow::Result;
use berlin_covid_dashboard::{
    config::{ConfigOverrides, FeedConfig},
    fetch::BasicClient,
    loader::{DashboardData, load_dashboard},
    output::{export_tables, print_json, write_json},
    transform::geo::join_hotspots,
    view::{Selection, build_view},
};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "berlin_covid_dashboard")]
#[command(about = "Daily COVID-19 statistics for Berlin's districts", long_about = None)]
struct Cli {
    #[command(flatten)]
    sources: SourceArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Feed locations; each falls back to its environment variable, then the published URL.
#[derive(Args)]
struct SourceArgs {
    /// District table URL or file (env: DISTRICT_TABLE_URL)
    #[arg(long, global = true)]
    district_table: Option<String>,

    /// Daily series URL or file (env: DAILY_SERIES_URL)
    #[arg(long, global = true)]
    daily_series: Option<String>,

    /// Age-group table URL or file (env: AGE_TABLE_URL)
    #[arg(long, global = true)]
    age_table: Option<String>,

    /// Fetch timeout in seconds (env: FETCH_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// JSON file replacing the built-in district centroids (env: GEO_TABLE_PATH)
    #[arg(long, global = true)]
    geo_table: Option<String>,
}

impl From<SourceArgs> for ConfigOverrides {
    fn from(args: SourceArgs) -> Self {
        ConfigOverrides {
            district_table: args.district_table,
            daily_series: args.daily_series,
            age_table: args.age_table,
            timeout_secs: args.timeout_secs,
            geo_table_path: args.geo_table,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dashboard view for one district
    Show {
        /// District whose daily cases are charted
        #[arg(short, long, default_value = "Berlin")]
        district: String,

        /// Write the view as JSON to this file instead of logging it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the districts that can be selected
    Districts,
    /// Export the reshaped tables as CSV files
    Export {
        /// Directory to write the CSV files into
        #[arg(short = 'd', long, default_value = "export")]
        output_dir: PathBuf,

        /// Gzip compress the exported files
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/berlin_covid_dashboard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("berlin_covid_dashboard.log"));

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

    let config = FeedConfig::from_env()?.with_overrides(cli.sources.into())?;
    let data = load(&config).await?;

    match cli.command {
        Commands::Show { district, output } => {
            let today = Local::now().date_naive();
            let view = build_view(&data, &Selection::new(district), today)?;

            match output {
                Some(path) => {
                    write_json(&path, &view)?;
                    info!(path = %path.display(), "Dashboard view written");
                }
                None => print_json(&view)?,
            }
        }
        Commands::Districts => {
            let columns = data.series.column_names();
            for district in data.summary.districts() {
                let charted = columns.contains(&district);
                info!(district = %district, charted, "District");
            }
            info!(total = data.summary.rows.len(), "District list summary");
        }
        Commands::Export { output_dir, gzip } => {
            let hotspots = join_hotspots(&data.geo, &data.summary)?;
            let written = export_tables(&output_dir, &data, &hotspots, gzip)?;
            for path in written {
                info!(path = %path.display(), "Exported");
            }
        }
    }

    Ok(())
}

/// Loads all feeds, logging the error kind before bailing out.
async fn load(config: &FeedConfig) -> Result<DashboardData> {
    let client = BasicClient::with_timeout(config.timeout)?;
    match load_dashboard(&client, config).await {
        Ok(data) => Ok(data),
        Err(e) => {
            error!(error = %e, kind = e.kind(), "Dashboard load failed");
            Err(e.into())
        }
    }
}
