//! Command-line interface definitions and argument parsing

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::similarity::DEFAULT_TOP_N;

/// Age-group category affinity analysis for e-commerce customer data
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "ecomerce_customer_data_cleaned.csv")]
    pub input: PathBuf,

    /// Number of similar categories listed per age group
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    /// Render the age distribution and top category charts
    #[arg(long)]
    pub charts: bool,

    /// Output path for the age distribution chart; the top category chart is
    /// written next to it with a `_top_categories` suffix
    #[arg(short, long, default_value = "age_groups.png")]
    pub output: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Check option values clap cannot express on its own
    pub fn validate(&self) -> crate::Result<()> {
        if self.top_n == 0 {
            anyhow::bail!("--top-n must be at least 1");
        }
        if self.charts && !has_png_extension(&self.output) {
            anyhow::bail!(
                "Chart output must be a .png file: {}",
                self.output.display()
            );
        }
        Ok(())
    }
}

fn has_png_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}
