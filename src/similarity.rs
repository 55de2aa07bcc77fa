//! Nearest categories by Euclidean distance in (order value, purchases) space

use std::collections::BTreeMap;

use ndarray::ArrayView1;
use tracing::{debug, warn};

use crate::age::AgeGroup;
use crate::error::CategoryNotFound;
use crate::features::FeatureTable;
use crate::summary::GroupSummary;

/// Size of each similarity list unless configured otherwise
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarCategory {
    pub category: String,
    pub distance: f64,
}

/// Outcome of ranking one age group's favorite category
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRanking {
    pub age_group: AgeGroup,
    pub target: String,
    pub result: Result<Vec<SimilarCategory>, CategoryNotFound>,
}

/// Rank the other categories of `age_group` by distance to `target`
///
/// # Arguments
/// * `target` - Category to compare against
/// * `age_group` - Only rows of this group are considered
/// * `table` - Aggregated category features
/// * `top_n` - Maximum number of entries returned
///
/// # Returns
/// * Closest categories first, ties ordered by name; never contains `target`
/// * `CategoryNotFound` if `target` has no row in `age_group`
pub fn rank(
    target: &str,
    age_group: AgeGroup,
    table: &FeatureTable,
    top_n: usize,
) -> Result<Vec<SimilarCategory>, CategoryNotFound> {
    let (categories, matrix) = table.matrix(age_group);

    let target_idx = categories
        .iter()
        .position(|&category| category == target)
        .ok_or_else(|| CategoryNotFound {
            category: target.to_string(),
            age_group,
        })?;
    let target_vector = matrix.row(target_idx);

    let mut similar: Vec<SimilarCategory> = matrix
        .outer_iter()
        .zip(categories)
        .enumerate()
        .filter(|(idx, _)| *idx != target_idx)
        .map(|(_, (vector, category))| SimilarCategory {
            category: category.to_string(),
            distance: euclidean_distance(&target_vector, &vector),
        })
        .collect();

    similar.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.category.cmp(&b.category))
    });
    similar.truncate(top_n);

    Ok(similar)
}

/// Rank every non-empty age group against its favorite category.
/// Groups whose favorite is the "No Data" placeholder are skipped.
pub fn rank_favorites(
    summaries: &BTreeMap<AgeGroup, Option<GroupSummary>>,
    table: &FeatureTable,
    top_n: usize,
) -> Vec<GroupRanking> {
    summaries
        .iter()
        .filter_map(|(&age_group, summary)| {
            let summary = summary.as_ref()?;
            if !summary.has_data() {
                debug!(age_group = %age_group, "skipping similarity for group without data");
                return None;
            }

            let target = summary.favorite.category.clone();
            let result = rank(&target, age_group, table, top_n);
            if let Err(err) = &result {
                warn!("{}", err);
            }

            Some(GroupRanking {
                age_group,
                target,
                result,
            })
        })
        .collect()
}

/// Calculate Euclidean distance between two feature vectors
fn euclidean_distance(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
