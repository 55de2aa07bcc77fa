//! CategoryLens entrypoint: loads the data, runs every analysis stage and
//! prints the report.

use std::time::Instant;

use anyhow::{Context, Result};
use categorylens::{
    aggregate, favorite_counts, load_customer_data, rank_favorites, report, segment,
    summarize_all, viz, AgeDistribution, Args,
};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    args.validate()?;

    let start_time = Instant::now();

    info!("Loading customer data from: {}", args.input.display());
    let records = load_customer_data(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    debug!("Load time: {:.2}s", start_time.elapsed().as_secs_f64());

    let segments = segment(&records);
    let distribution = AgeDistribution::from_segments(&segments);
    let summaries = summarize_all(&segments)?;
    let table = aggregate(&segments)?;
    let rankings = rank_favorites(&summaries, &table, args.top_n);

    report::print_report(&distribution, &summaries, &table, &rankings, args.top_n);

    if args.charts {
        let counts = favorite_counts(&summaries);
        match viz::generate_charts(&distribution, &counts, &args.output) {
            Ok(written) => {
                for path in written {
                    println!("Chart saved to: {}", path.display());
                }
            }
            Err(err) => warn!("Chart rendering failed: {:#}", err),
        }
    }

    debug!(
        "Total processing time: {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}
