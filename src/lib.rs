//! CategoryLens: age-group category affinity analysis for e-commerce customers
//!
//! Loads customer records from CSV, buckets them into age groups, finds each
//! group's most popular categories and ranks the other categories by how close
//! their mean order value and purchase count are to the group favorite.

pub mod age;
pub mod cli;
pub mod data;
pub mod error;
pub mod features;
pub mod report;
pub mod similarity;
pub mod summary;
pub mod viz;

pub use age::{classify, segment, AgeDistribution, AgeGroup, SegmentedCustomer};
pub use cli::Args;
pub use data::{load_customer_data, CustomerRecord};
pub use error::{AnalysisError, CategoryNotFound};
pub use features::{aggregate, CategoryFeatureRow, FeatureTable};
pub use similarity::{rank, rank_favorites, GroupRanking, SimilarCategory, DEFAULT_TOP_N};
pub use summary::{favorite_counts, summarize, summarize_all, CategoryPreference, GroupSummary};

/// Common result type used by the CLI-facing parts of the crate
pub type Result<T> = anyhow::Result<T>;
