//! Output object naming

/// Suffix of input objects
pub const SOURCE_SUFFIX: &str = ".csv";

/// Suffix of output objects
pub const TARGET_SUFFIX: &str = ".parquet";

/// Derive the output object name from an input object name
///
/// A trailing `.csv` (any case) is replaced by `.parquet`; names without it
/// get `.parquet` appended.
///
/// Examples:
/// - `reports/daily.csv` -> `reports/daily.parquet`
/// - `exports/DATA.CSV` -> `exports/DATA.parquet`
/// - `exports/data` -> `exports/data.parquet`
pub fn output_name(input: &str) -> String {
    let split = input.len().saturating_sub(SOURCE_SUFFIX.len());
    let stem = match (input.get(..split), input.get(split..)) {
        (Some(stem), Some(suffix))
            if suffix.eq_ignore_ascii_case(SOURCE_SUFFIX)
                && !stem.is_empty()
                && !stem.ends_with('/') =>
        {
            stem
        }
        _ => input,
    };
    format!("{stem}{TARGET_SUFFIX}")
}
