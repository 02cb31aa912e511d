//! DataFrame selection helpers with column validation
//!
//! Spreadsheet exports infer column types loosely (ids become integers,
//! values become strings when a cell contains a comma). These helpers select
//! an explicit column list, cast each column to the type the caller expects,
//! and fail with a readable message when a column is missing.

use anyhow::{anyhow, Context, Result};
use polars::prelude::*;
use std::collections::HashSet;

/// Select and cast columns from a DataFrame
///
/// # Arguments
/// * `df` - Source frame
/// * `columns` - `(name, dtype)` pairs; output keeps this order
/// * `context` - Context for error messages (e.g., "measurements")
///
/// # Errors
/// Returns error if any requested column is missing or the selection fails.
/// Casts are non-strict: unparseable cells become nulls.
pub fn select_typed(df: &DataFrame, columns: &[(&str, DataType)], context: &str) -> Result<DataFrame> {
    let available: HashSet<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    for (expected, _) in columns {
        if !available.contains(*expected) {
            return Err(anyhow!(
                "{}: Missing expected column '{}'. Available columns: {:?}",
                context,
                expected,
                available
            ));
        }
    }

    let exprs: Vec<Expr> = columns
        .iter()
        .map(|(name, dtype)| col(*name).cast(dtype.clone()))
        .collect();

    df.clone()
        .lazy()
        .select(&exprs)
        .collect()
        .with_context(|| format!("{}: Failed to select columns", context))
}
