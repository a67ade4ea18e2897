use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "resale-pipeline", version, about = "Local resale listings pipeline CLI")]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Listings CSV -> cleaned Parquet snapshot
    Clean {
        /// Listings CSV; falls back to the FILE_PATH environment variable.
        #[arg(long, env = "FILE_PATH")]
        source: PathBuf,
        #[arg(long, default_value = "resale")]
        dataset: String,
        #[arg(long, default_value = "./data")]
        out: PathBuf,
    },
    /// Listings CSV -> clean -> GBDT regression, metrics and comparison plot
    Train {
        /// Listings CSV; falls back to the FILE_PATH environment variable.
        #[arg(long, env = "FILE_PATH")]
        source: PathBuf,
        #[arg(long, default_value = "resale")]
        dataset: String,
        /// Where the plot and the metrics manifest land.
        #[arg(long, default_value = "./graphical_results")]
        out: PathBuf,
        #[arg(long, default_value_t = 1000)]
        iterations: usize,
        #[arg(long, default_value_t = 0.2)]
        test_fraction: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let start = std::time::Instant::now();
    match cli.cmd {
        Commands::Clean {
            source,
            dataset,
            out,
        } => {
            let (rows, in_stats) = ingest::read_listings(&source).await?;
            let (ds, stats) = clean::clean_dataset(rows);
            let cfg = export::ExportConfig {
                slug: dataset,
                out_dir: out,
            };
            let ex = export::write_clean_snapshot(&ds, &cfg)?;
            println!(
                "CLEAN OK rows_in={} rows_out={} filtered={} dupes={} tags={} out={}",
                in_stats.rows_in,
                stats.rows_out,
                stats.rows_filtered,
                stats.duplicates_dropped,
                stats.territory_tags,
                ex.out_path.display()
            );
        }
        Commands::Train {
            source,
            dataset,
            out,
            iterations,
            test_fraction,
            seed,
        } => {
            let (rows, _) = ingest::read_listings(&source).await?;
            let (ds, stats) = clean::clean_dataset(rows);
            let cfg = train::TrainConfig {
                iterations,
                test_fraction,
                seed,
                ..train::TrainConfig::default()
            };
            let report = train::train_and_evaluate(&ds, &cfg)?;

            let plot_path = out.join("comparison_plot.png");
            train::write_comparison_plot(
                &plot_path,
                &report.actual,
                &report.predicted,
                &report.metrics,
            )?;
            let metrics_path =
                train::write_metrics_manifest(&out.join("metrics.json"), &dataset, &report)?;

            println!("MAE: {}", report.metrics.mae);
            println!("MAPE: {}", report.metrics.mape);
            println!(
                "TRAIN OK rows={} n_train={} n_valid={} plot={} metrics={}",
                stats.rows_out,
                report.n_train,
                report.n_valid,
                plot_path.display(),
                metrics_path.display()
            );
        }
    }
    let duration_pretty = humantime::format_duration(start.elapsed());
    println!("DONE in {}", duration_pretty);
    Ok(())
}
