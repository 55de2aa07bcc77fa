//! Per (age group, favorite category) feature aggregation

use ndarray::Array2;
use polars::prelude::*;
use tracing::debug;

use crate::age::{AgeGroup, SegmentedCustomer};
use crate::data::{AVERAGE_ORDER_VALUE, FAVORITE_CATEGORY, TOTAL_PURCHASES};
use crate::error::AnalysisError;

/// Number of features per category vector
pub const N_FEATURES: usize = 2;

/// Mean order value and purchase count for one category within an age group
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryFeatureRow {
    pub age_group: AgeGroup,
    pub category: String,
    pub mean_average_order_value: f64,
    pub mean_total_purchases: f64,
    /// Qualifying customers behind the means
    pub customers: usize,
}

impl CategoryFeatureRow {
    pub fn vector(&self) -> [f64; N_FEATURES] {
        [self.mean_average_order_value, self.mean_total_purchases]
    }
}

/// Aggregated rows sorted by age group, then category
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureTable {
    rows: Vec<CategoryFeatureRow>,
}

impl FeatureTable {
    pub fn rows(&self) -> &[CategoryFeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows belonging to one age group
    pub fn for_group(&self, age_group: AgeGroup) -> impl Iterator<Item = &CategoryFeatureRow> {
        self.rows.iter().filter(move |row| row.age_group == age_group)
    }

    pub fn get(&self, age_group: AgeGroup, category: &str) -> Option<&CategoryFeatureRow> {
        self.for_group(age_group).find(|row| row.category == category)
    }

    /// Feature matrix of an age group, shape `(n_categories, 2)`, with the
    /// category of each row
    pub fn matrix(&self, age_group: AgeGroup) -> (Vec<&str>, Array2<f64>) {
        let rows: Vec<_> = self.for_group(age_group).collect();
        let categories = rows.iter().map(|row| row.category.as_str()).collect();
        let matrix = Array2::from_shape_fn((rows.len(), N_FEATURES), |(i, j)| rows[i].vector()[j]);
        (categories, matrix)
    }
}

/// Age group code column added next to the customer columns
pub const AGE_GROUP: &str = "AgeGroup";
/// Number of qualifying customers per aggregated row
pub const CUSTOMERS: &str = "Customers";

/// Customer frame with the derived age group code
fn segments_frame(segments: &[SegmentedCustomer<'_>]) -> PolarsResult<DataFrame> {
    let age_groups: Vec<u32> = segments.iter().map(|s| s.age_group.code()).collect();
    let favorites: Vec<Option<&str>> = segments
        .iter()
        .map(|s| s.record.favorite_category.as_deref())
        .collect();
    let order_values: Vec<Option<f64>> = segments
        .iter()
        .map(|s| s.record.average_order_value)
        .collect();
    let purchases: Vec<Option<f64>> = segments.iter().map(|s| s.record.total_purchases).collect();

    df!(
        AGE_GROUP => age_groups,
        FAVORITE_CATEGORY => favorites,
        AVERAGE_ORDER_VALUE => order_values,
        TOTAL_PURCHASES => purchases
    )
}

/// Keep customers whose order value and purchase count are both known.
/// Everything downstream of aggregation only sees these.
fn qualifying(frame: LazyFrame) -> LazyFrame {
    frame.filter(
        col(AVERAGE_ORDER_VALUE)
            .is_not_null()
            .and(col(TOTAL_PURCHASES).is_not_null()),
    )
}

/// Group qualifying customers by (age group, favorite category) and average
/// both metrics. Customers without a favorite category form no group.
///
/// # Returns
/// * `FeatureTable` sorted by age group, then category
pub fn aggregate(segments: &[SegmentedCustomer<'_>]) -> Result<FeatureTable, AnalysisError> {
    let kept = qualifying(segments_frame(segments)?.lazy()).collect()?;
    debug!(
        kept = kept.height(),
        dropped = segments.len() - kept.height(),
        "filtered customers with missing metrics"
    );

    let grouped = kept
        .lazy()
        .filter(col(FAVORITE_CATEGORY).is_not_null())
        .group_by([col(AGE_GROUP), col(FAVORITE_CATEGORY)])
        .agg([
            col(AVERAGE_ORDER_VALUE).mean(),
            col(TOTAL_PURCHASES).mean(),
            len().cast(DataType::UInt64).alias(CUSTOMERS),
        ])
        .sort_by_exprs(
            [col(AGE_GROUP), col(FAVORITE_CATEGORY)],
            SortMultipleOptions::default(),
        )
        .collect()?;

    Ok(FeatureTable {
        rows: feature_rows(&grouped)?,
    })
}

/// Convert the aggregated DataFrame into feature rows
fn feature_rows(df: &DataFrame) -> PolarsResult<Vec<CategoryFeatureRow>> {
    let age_groups = df.column(AGE_GROUP)?.as_materialized_series().u32()?;
    let categories = df.column(FAVORITE_CATEGORY)?.as_materialized_series().str()?;
    let order_values = df
        .column(AVERAGE_ORDER_VALUE)?
        .as_materialized_series()
        .f64()?;
    let purchases = df.column(TOTAL_PURCHASES)?.as_materialized_series().f64()?;
    let customers = df.column(CUSTOMERS)?.as_materialized_series().u64()?;

    let rows = age_groups
        .into_no_null_iter()
        .zip(categories.into_no_null_iter())
        .zip(order_values.into_no_null_iter())
        .zip(purchases.into_no_null_iter())
        .zip(customers.into_no_null_iter())
        .filter_map(|((((code, category), order_value), purchases), customers)| {
            Some(CategoryFeatureRow {
                age_group: AgeGroup::from_code(code)?,
                category: category.to_string(),
                mean_average_order_value: order_value,
                mean_total_purchases: purchases,
                customers: customers as usize,
            })
        })
        .collect();

    Ok(rows)
}
