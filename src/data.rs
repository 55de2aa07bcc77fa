//! Customer CSV loading with lenient numeric coercion using Polars

use std::fs;
use std::io;
use std::path::Path;

use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use tracing::{debug, info};

use crate::error::AnalysisError;

pub const AGE: &str = "Age";
pub const FAVORITE_CATEGORY: &str = "FavoriteCategory";
pub const SECOND_FAVORITE_CATEGORY: &str = "SecondFavoriteCategory";
pub const AVERAGE_ORDER_VALUE: &str = "AverageOrderValue";
pub const TOTAL_PURCHASES: &str = "TotalPurchases";

/// Columns the input must provide. Anything else in the file is ignored.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    AGE,
    FAVORITE_CATEGORY,
    SECOND_FAVORITE_CATEGORY,
    AVERAGE_ORDER_VALUE,
    TOTAL_PURCHASES,
];

/// One customer row as loaded from the input file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomerRecord {
    /// Age in years, `None` when absent or unparseable
    pub age: Option<f64>,
    pub favorite_category: Option<String>,
    pub second_favorite_category: Option<String>,
    /// Mean value of this customer's orders
    pub average_order_value: Option<f64>,
    /// Number of purchases made by this customer
    pub total_purchases: Option<f64>,
}

/// Load customer records from a CSV file
///
/// Every column is read as text and the numeric columns are then trimmed and
/// cast non-strictly, so a malformed cell becomes a missing value instead of
/// failing the whole load. `NaN` is treated as missing too.
///
/// # Arguments
/// * `path` - Path to the CSV file
///
/// # Errors
/// * `FileNotFound` / `Io` if the file cannot be read
/// * `MissingColumns` if any of [`REQUIRED_COLUMNS`] is absent
/// * `Csv` if the file is not parseable as CSV
pub fn load_customer_data(path: impl AsRef<Path>) -> Result<Vec<CustomerRecord>, AnalysisError> {
    let path = path.as_ref();
    check_readable(path)?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(AnalysisError::Csv)?;

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| df.get_column_index(name).is_none())
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(AnalysisError::MissingColumns(missing));
    }

    let typed = df
        .lazy()
        .select([
            to_numeric(AGE),
            col(FAVORITE_CATEGORY),
            col(SECOND_FAVORITE_CATEGORY),
            to_numeric(AVERAGE_ORDER_VALUE),
            to_numeric(TOTAL_PURCHASES),
        ])
        .collect()?;

    let records = extract_records(&typed)?;
    info!(rows = records.len(), path = %path.display(), "loaded customer data");
    log_missing_counts(&records);

    Ok(records)
}

/// Surrounding whitespace is ignored; anything else unparseable becomes null
fn to_numeric(name: &str) -> Expr {
    col(name)
        .str()
        .strip_chars(lit(NULL))
        .cast(DataType::Float64)
}

fn check_readable(path: &Path) -> Result<(), AnalysisError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Err(AnalysisError::Io(io::Error::other(format!(
            "{} is a directory",
            path.display()
        )))),
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Err(AnalysisError::FileNotFound(path.to_path_buf()))
        }
        Err(err) => Err(AnalysisError::Io(err)),
    }
}

/// Convert the typed DataFrame into owned records
fn extract_records(df: &DataFrame) -> PolarsResult<Vec<CustomerRecord>> {
    let ages = df.column(AGE)?.as_materialized_series().f64()?;
    let favorites = df.column(FAVORITE_CATEGORY)?.as_materialized_series().str()?;
    let seconds = df
        .column(SECOND_FAVORITE_CATEGORY)?
        .as_materialized_series()
        .str()?;
    let order_values = df
        .column(AVERAGE_ORDER_VALUE)?
        .as_materialized_series()
        .f64()?;
    let purchases = df.column(TOTAL_PURCHASES)?.as_materialized_series().f64()?;

    let records = ages
        .into_iter()
        .zip(favorites.into_iter())
        .zip(seconds.into_iter())
        .zip(order_values.into_iter())
        .zip(purchases.into_iter())
        .map(
            |((((age, favorite), second), order_value), purchases)| CustomerRecord {
                age: numeric(age),
                favorite_category: category(favorite),
                second_favorite_category: category(second),
                average_order_value: numeric(order_value),
                total_purchases: numeric(purchases),
            },
        )
        .collect();

    Ok(records)
}

fn numeric(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

fn category(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn log_missing_counts(records: &[CustomerRecord]) {
    let count = |pred: fn(&CustomerRecord) -> bool| records.iter().filter(|r| pred(r)).count();
    debug!(
        age = count(|r| r.age.is_none()),
        favorite = count(|r| r.favorite_category.is_none()),
        second_favorite = count(|r| r.second_favorite_category.is_none()),
        order_value = count(|r| r.average_order_value.is_none()),
        purchases = count(|r| r.total_purchases.is_none()),
        "missing values per column"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_load_customer_data() {
        let file = write_csv(&[
            "CustomerID,Age,FavoriteCategory,SecondFavoriteCategory,AverageOrderValue,TotalPurchases",
            "1,25,Electronics,Books,100.5,5",
            "2,61,Garden,Toys,42,12",
        ]);

        let records = load_customer_data(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].age, Some(25.0));
        assert_eq!(records[0].favorite_category.as_deref(), Some("Electronics"));
        assert_eq!(records[0].second_favorite_category.as_deref(), Some("Books"));
        assert_eq!(records[0].average_order_value, Some(100.5));
        assert_eq!(records[1].total_purchases, Some(12.0));
    }

    #[test]
    fn test_malformed_cells_become_missing() {
        let file = write_csv(&[
            "Age,FavoriteCategory,SecondFavoriteCategory,AverageOrderValue,TotalPurchases",
            "unknown,Books,,abc,3",
            "30, ,Toys,NaN,",
        ]);

        let records = load_customer_data(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].age, None);
        assert_eq!(records[0].second_favorite_category, None);
        assert_eq!(records[0].average_order_value, None);
        assert_eq!(records[0].total_purchases, Some(3.0));
        assert_eq!(records[1].age, Some(30.0));
        assert_eq!(records[1].favorite_category, None);
        assert_eq!(records[1].average_order_value, None);
        assert_eq!(records[1].total_purchases, None);
    }

    #[test]
    fn test_padded_numeric_cells() {
        let file = write_csv(&[
            "Age,FavoriteCategory,SecondFavoriteCategory,AverageOrderValue,TotalPurchases",
            " 25 , Books,Toys, 100 ,5",
            "41,Garden,Tools,\t12.5,  7",
        ]);

        let records = load_customer_data(file.path()).unwrap();
        assert_eq!(records[0].age, Some(25.0));
        assert_eq!(records[0].favorite_category.as_deref(), Some("Books"));
        assert_eq!(records[0].average_order_value, Some(100.0));
        assert_eq!(records[0].total_purchases, Some(5.0));
        assert_eq!(records[1].average_order_value, Some(12.5));
        assert_eq!(records[1].total_purchases, Some(7.0));
    }

    #[test]
    fn test_missing_columns() {
        let file = write_csv(&["Age,FavoriteCategory", "25,Books"]);

        match load_customer_data(file.path()) {
            Err(AnalysisError::MissingColumns(columns)) => {
                assert_eq!(
                    columns,
                    vec![
                        SECOND_FAVORITE_CATEGORY.to_string(),
                        AVERAGE_ORDER_VALUE.to_string(),
                        TOTAL_PURCHASES.to_string(),
                    ]
                );
            }
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");

        let result = load_customer_data(&path);
        assert!(matches!(result, Err(AnalysisError::FileNotFound(p)) if p == path));
    }

    #[test]
    fn test_header_only_file() {
        let file = write_csv(&[
            "Age,FavoriteCategory,SecondFavoriteCategory,AverageOrderValue,TotalPurchases",
        ]);

        let records = load_customer_data(file.path()).unwrap();
        assert!(records.is_empty());
    }
}
