//! Run the weather pipeline against a local export or a URL and print a summary.
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use weather_series_service::fetcher::{load_csv_file, WeatherCsvFetcher};
use weather_series_service::pipeline::{gap_threshold_from_minutes, PipelineError, WeatherPipeline};
use weather_series_service::snapshot::WeatherSnapshot;

#[derive(Parser, Debug)]
#[command(name = "inspect-csv")]
#[command(about = "Normalize a weather CSV export and report what the pipeline produced")]
struct Args {
    /// Local CSV export to read
    #[arg(short, long, conflicts_with = "url")]
    file: Option<PathBuf>,

    /// URL of the CSV export
    #[arg(short, long, env = "WEATHER_CSV_URL")]
    url: Option<String>,

    /// Leading records to skip before the header row
    #[arg(long, default_value = "0", env = "CSV_SKIP_ROWS")]
    skip_rows: usize,

    /// Gap threshold in minutes
    #[arg(
        long,
        default_value = "120",
        env = "GAP_THRESHOLD_MINUTES",
        value_parser = clap::value_parser!(i64).range(1..)
    )]
    gap_threshold_minutes: i64,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let (source, csv) = match (&args.file, &args.url) {
        (Some(path), _) => (path.display().to_string(), load_csv_file(path)?),
        (None, Some(url)) => {
            let fetcher = WeatherCsvFetcher::new(url.clone(), Duration::from_secs(30))?;
            (url.clone(), fetcher.fetch_csv().await?)
        }
        (None, None) => return Err("either --file or --url is required".into()),
    };

    let gap_threshold = gap_threshold_from_minutes(args.gap_threshold_minutes)
        .ok_or("--gap-threshold-minutes is out of range")?;
    let pipeline = WeatherPipeline::new(args.skip_rows, gap_threshold);

    let output = match pipeline.run(&csv) {
        Ok(output) => output,
        Err(PipelineError::EmptyResult { dropped_rows }) => {
            println!("No data available ({dropped_rows} rows dropped)");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let snapshot = WeatherSnapshot::new(source, output);

    if args.json {
        let summary = json!({
            "source": snapshot.source(),
            "dialect": snapshot.dialect(),
            "total_rows": snapshot.total_rows(),
            "dropped_rows": snapshot.dropped_rows(),
            "records": snapshot.table().len(),
            "gap_markers": snapshot.chart().gap_marker_count(),
            "measures": snapshot.present_measures(),
            "latest_conditions": snapshot.latest_conditions(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("\n=== {} ===", snapshot.source());
    println!("Dialect:      {:?}", snapshot.dialect());
    println!("Rows read:    {}", snapshot.total_rows());
    println!("Rows dropped: {}", snapshot.dropped_rows());
    println!("Records:      {}", snapshot.table().len());
    println!("Gap markers:  {}", snapshot.chart().gap_marker_count());

    let table = snapshot.table();
    if let (Some(first), Some(last)) = (table.records().first(), table.records().last()) {
        println!("Time range:   {} to {}", first.timestamp(), last.timestamp());
    }

    println!("\nMeasures present:");
    for measure in snapshot.present_measures() {
        let label = snapshot.schema().label_for(measure).unwrap_or("?");
        println!("  {:<16} column '{}' ({})", measure.display_name(), label, measure.unit());
    }

    match snapshot.latest_conditions() {
        Some(latest) => {
            println!("\nLatest conditions ({}):", latest.timestamp);
            for metric in latest.metrics {
                println!("  {:<12} {}", metric.label, metric.display);
            }
        }
        None => println!("\nNo recent valid data to display metrics"),
    }

    println!("\nChart panels:");
    for panel in snapshot.chart_panels() {
        println!("  {} [{:?}]", panel.title, panel.kind);
    }
    println!();

    Ok(())
}
