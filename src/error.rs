//! Error types for loading and analysing customer data

use std::io;
use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

use crate::age::AgeGroup;

/// Fatal failures: unreadable input, or a tabular operation that Polars
/// rejects. Data problems inside the file degrade to placeholder values instead.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("input file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("failed to read input file: {0}")]
    Io(#[from] io::Error),
    #[error("input is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("malformed CSV input: {0}")]
    Csv(#[source] PolarsError),
    #[error("data frame operation failed: {0}")]
    Frame(#[from] PolarsError),
}

/// The similarity target has no feature row in the queried age group.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{category} not found in {age_group} category data.")]
pub struct CategoryNotFound {
    pub category: String,
    pub age_group: AgeGroup,
}
