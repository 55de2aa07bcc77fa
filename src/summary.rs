//! Most popular favorite and second-favorite categories per age group

use std::collections::BTreeMap;

use polars::prelude::*;
use tracing::warn;

use crate::age::{AgeGroup, SegmentedCustomer};
use crate::error::AnalysisError;

/// Placeholder category when a group has no category values at all
pub const NO_DATA: &str = "No Data";

/// A winning category and how many customers in the group carry it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPreference {
    pub category: String,
    pub count: usize,
}

impl CategoryPreference {
    fn no_data() -> Self {
        Self {
            category: NO_DATA.to_string(),
            count: 0,
        }
    }

    pub fn is_no_data(&self) -> bool {
        self.count == 0 && self.category == NO_DATA
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub favorite: CategoryPreference,
    pub second_favorite: CategoryPreference,
}

impl GroupSummary {
    /// Whether the favorite category is a real value usable for ranking
    pub fn has_data(&self) -> bool {
        !self.favorite.is_no_data()
    }
}

const CATEGORY: &str = "Category";
const COUNT: &str = "Count";

/// Most frequent value, ties going to the lexically lowest category.
/// Returns `None` if there are no values.
pub fn mode<'a, I>(values: I) -> Result<Option<CategoryPreference>, AnalysisError>
where
    I: IntoIterator<Item = &'a str>,
{
    let values: Vec<&str> = values.into_iter().collect();

    let counted = df!(CATEGORY => values)?
        .lazy()
        .group_by([col(CATEGORY)])
        .agg([len().cast(DataType::UInt64).alias(COUNT)])
        .sort_by_exprs(
            [col(COUNT), col(CATEGORY)],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .limit(1)
        .collect()?;

    let categories = counted.column(CATEGORY)?.as_materialized_series().str()?;
    let counts = counted.column(COUNT)?.as_materialized_series().u64()?;

    Ok(categories
        .get(0)
        .zip(counts.get(0))
        .map(|(category, count)| CategoryPreference {
            category: category.to_string(),
            count: count as usize,
        }))
}

/// Summarize one age group, `None` if nobody falls in it
pub fn summarize(
    segments: &[SegmentedCustomer<'_>],
    age_group: AgeGroup,
) -> Result<Option<GroupSummary>, AnalysisError> {
    let members: Vec<_> = segments
        .iter()
        .filter(|s| s.age_group == age_group)
        .collect();
    if members.is_empty() {
        return Ok(None);
    }

    let favorite = mode(
        members
            .iter()
            .filter_map(|s| s.record.favorite_category.as_deref()),
    )?
    .unwrap_or_else(|| {
        warn!(age_group = %age_group, "no favorite category values in group");
        CategoryPreference::no_data()
    });
    let second_favorite = mode(
        members
            .iter()
            .filter_map(|s| s.record.second_favorite_category.as_deref()),
    )?
    .unwrap_or_else(|| {
        warn!(age_group = %age_group, "no second-favorite category values in group");
        CategoryPreference::no_data()
    });

    Ok(Some(GroupSummary {
        favorite,
        second_favorite,
    }))
}

/// Summaries for each numeric age bin, in reporting order
pub fn summarize_all(
    segments: &[SegmentedCustomer<'_>],
) -> Result<BTreeMap<AgeGroup, Option<GroupSummary>>, AnalysisError> {
    AgeGroup::BINNED
        .into_iter()
        .map(|group| Ok((group, summarize(segments, group)?)))
        .collect()
}

/// Favorite category and its count per non-empty group, as consumed by the
/// top-category chart
pub fn favorite_counts(
    summaries: &BTreeMap<AgeGroup, Option<GroupSummary>>,
) -> BTreeMap<AgeGroup, CategoryPreference> {
    summaries
        .iter()
        .filter_map(|(group, summary)| {
            summary
                .as_ref()
                .map(|summary| (*group, summary.favorite.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::age::segment;
    use crate::data::CustomerRecord;

    fn customer(age: f64, favorite: Option<&str>, second: Option<&str>) -> CustomerRecord {
        CustomerRecord {
            age: Some(age),
            favorite_category: favorite.map(str::to_string),
            second_favorite_category: second.map(str::to_string),
            average_order_value: Some(10.0),
            total_purchases: Some(1.0),
        }
    }

    #[test]
    fn test_mode_picks_most_frequent() {
        let result = mode(["Books", "Toys", "Books", "Garden"]).unwrap().unwrap();
        assert_eq!(result.category, "Books");
        assert_eq!(result.count, 2);
    }

    #[test]
    fn test_mode_tie_breaks_lexically() {
        let result = mode(["Toys", "Books", "Toys", "Books", "Garden"]).unwrap().unwrap();
        assert_eq!(result.category, "Books");
        assert_eq!(result.count, 2);
    }

    #[test]
    fn test_mode_counts_every_occurrence() {
        let values = ["Garden", "Toys", "Garden", "Books", "Toys", "Garden", "Books", "Books"];
        let result = mode(values).unwrap().unwrap();
        // Books and Garden tie at three, Toys trails at two
        assert_eq!(result.category, "Books");
        assert_eq!(result.count, 3);
    }

    #[test]
    fn test_mode_of_nothing() {
        assert_eq!(mode(Vec::<&str>::new()).unwrap(), None);
    }

    #[test]
    fn test_summarize_group() {
        let records = vec![
            customer(25.0, Some("Electronics"), Some("Books")),
            customer(30.0, Some("Electronics"), Some("Toys")),
            customer(35.0, Some("Books"), Some("Toys")),
            customer(45.0, Some("Garden"), None),
        ];
        let segments = segment(&records);

        let summary = summarize(&segments, AgeGroup::Adults).unwrap().unwrap();
        assert_eq!(summary.favorite.category, "Electronics");
        assert_eq!(summary.favorite.count, 2);
        assert_eq!(summary.second_favorite.category, "Toys");
        assert_eq!(summary.second_favorite.count, 2);
        assert!(summary.has_data());
    }

    #[test]
    fn test_summarize_empty_group() {
        let records = vec![customer(25.0, Some("Books"), Some("Toys"))];
        let segments = segment(&records);

        assert_eq!(summarize(&segments, AgeGroup::OlderAdults).unwrap(), None);
    }

    #[test]
    fn test_summarize_all_missing_categories() {
        let records = vec![customer(45.0, None, None), customer(50.0, None, Some("Toys"))];
        let segments = segment(&records);

        let summary = summarize(&segments, AgeGroup::MiddleAgeAdults).unwrap().unwrap();
        assert_eq!(summary.favorite.category, NO_DATA);
        assert_eq!(summary.favorite.count, 0);
        assert!(!summary.has_data());
        assert_eq!(summary.second_favorite.category, "Toys");
    }

    #[test]
    fn test_summarize_all_and_favorite_counts() {
        let records = vec![
            customer(25.0, Some("Books"), None),
            customer(65.0, Some("Garden"), None),
            customer(66.0, Some("Garden"), None),
            customer(10.0, Some("Toys"), None),
        ];
        let segments = segment(&records);
        let summaries = summarize_all(&segments).unwrap();

        assert_eq!(summaries.len(), 3);
        assert!(!summaries.contains_key(&AgeGroup::Other));
        assert_eq!(summaries[&AgeGroup::MiddleAgeAdults], None);

        let counts = favorite_counts(&summaries);
        assert_eq!(counts.len(), 2);
        assert_eq!(
            counts[&AgeGroup::OlderAdults],
            CategoryPreference {
                category: "Garden".to_string(),
                count: 2
            }
        );
        assert_eq!(counts[&AgeGroup::Adults].category, "Books");
    }
}
