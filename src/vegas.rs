//! Preparation of GWAS summary statistics as input for VEGAS2
//!
//! [VEGAS2](https://vegas2.qimrberghofer.edu.au/) expects a file with two
//! columns and no header: the rs ID of each SNP and its p-value.
//!
//! The SNP and p-value columns are taken from the [`VegasConfig`]. If they
//! are not configured (or not present in the file), they are detected by
//! comparing every column name to a list of common names, see [`detect_columns`].

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{VegasColumns, VegasConfig};
use crate::parser::{Delimiter, Table};
use crate::utils::{best_match, ensure_dir};
use crate::{PrioError, PrioResult};

/// Common names of the SNP ID column
pub const SNP_COLUMNS: [&str; 3] = ["SNP", "rsid", "rs"];

/// Common names of the p-value column
pub const PVALUE_COLUMNS: [&str; 4] = ["P", "pvalue", "p-value", "p_value"];

/// Cell values that are treated as missing
const MISSING_VALUES: [&str; 8] = ["", "NA", "N/A", "NaN", "nan", "NULL", "null", "None"];

/// Finds the SNP and p-value columns of a header
///
/// Every column name is compared to [`SNP_COLUMNS`] and [`PVALUE_COLUMNS`]
/// with [`best_match`]. The column with the highest score wins, on ties the
/// first column.
///
/// Returns the indices of the SNP and p-value column
///
/// # Errors
///
/// [`PrioError::AutomaticColumnExtract`] if no column is similar to any of the
/// names or if both would be the same column
pub fn detect_columns(headers: &[String]) -> PrioResult<(usize, usize)> {
    let snp = best_column(headers, &SNP_COLUMNS);
    let pvalue = best_column(headers, &PVALUE_COLUMNS);

    match (snp, pvalue) {
        (Some(snp), Some(pvalue)) if snp != pvalue => {
            debug!(
                "Detected SNP column {} and p-value column {}",
                headers[snp], headers[pvalue]
            );
            Ok((snp, pvalue))
        }
        _ => {
            let found: Vec<&str> = [snp, pvalue]
                .into_iter()
                .map(|idx| idx.map_or("None", |idx| headers[idx].as_str()))
                .collect();
            Err(PrioError::AutomaticColumnExtract(found.join(", ")))
        }
    }
}

fn best_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, header) in headers.iter().enumerate() {
        let Some((_, score)) = best_match(header, candidates) else {
            continue;
        };
        if score > best.map_or(0.0, |(_, best_score)| best_score) {
            best = Some((idx, score));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Returns the indices of the configured columns, or detects them
///
/// # Errors
///
/// [`PrioError::AutomaticColumnExtract`] if the columns must be detected and
/// detection fails
pub fn select_columns(table_headers: &[String], columns: &VegasColumns) -> PrioResult<(usize, usize)> {
    let Some((snp, pvalue)) = columns.requested() else {
        return detect_columns(table_headers);
    };
    let position = |name: &str| table_headers.iter().position(|header| header == name);
    match (position(snp), position(pvalue)) {
        (Some(snp), Some(pvalue)) => Ok((snp, pvalue)),
        _ => {
            warn!(
                "Columns {} and/or {} not found, trying to detect them automatically",
                snp, pvalue
            );
            detect_columns(table_headers)
        }
    }
}

fn is_missing(value: &str) -> bool {
    MISSING_VALUES.contains(&value.trim())
}

/// Extracts the `(rs ID, p-value)` pairs of a summary statistics table
///
/// Rows with a missing value and SNPs without rs ID are dropped.
/// The pairs are sorted by SNP ID.
fn extract_pairs(table: &Table, snp: usize, pvalue: usize) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = table
        .rows()
        .map(|row| (row.get(snp).trim(), row.get(pvalue).trim()))
        .filter(|(snp, pvalue)| !is_missing(snp) && !is_missing(pvalue))
        .filter(|(snp, _)| snp.starts_with("rs"))
        .map(|(snp, pvalue)| (snp.to_string(), pvalue.to_string()))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs
}

/// Prepares the VEGAS input of a single summary statistics file
///
/// Returns the number of written SNPs
///
/// # Errors
///
/// - [`PrioError::CannotOpenFile`] if the summary statistics cannot be opened
/// - [`PrioError::AutomaticColumnExtract`] if the columns cannot be detected
/// - [`PrioError::Io`] if the output cannot be written
pub fn prepare_trait(input: &Path, columns: &VegasColumns, output: &Path) -> PrioResult<usize> {
    let table = Table::from_delimited(input, Delimiter::Tab)?;
    let (snp, pvalue) = select_columns(table.headers(), columns)?;
    let pairs = extract_pairs(&table, snp, pvalue);

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(BufWriter::new(File::create(output)?));
    for (snp, pvalue) in &pairs {
        wtr.write_record([snp, pvalue])?;
    }
    wtr.flush()?;
    info!(
        "Wrote {} of {} SNPs of {} to {}",
        pairs.len(),
        table.len(),
        input.display(),
        output.display()
    );
    Ok(pairs.len())
}

/// Prepares the VEGAS input of all traits of the configuration
///
/// The files are written to `<output>/<trait>_vegas_input.txt`.
///
/// Returns the paths of the written files
///
/// # Errors
///
/// - [`PrioError::MissingFile`] if a summary statistics file does not exist
/// - All errors of [`prepare_trait`]
pub fn prepare_vegas_input(config: &VegasConfig) -> PrioResult<Vec<PathBuf>> {
    config.validate_inputs()?;
    ensure_dir(&config.output)?;

    let mut outputs = Vec::with_capacity(config.traits.len());
    for (name, entry) in &config.traits {
        info!("Processing trait: {}", name);
        let output = config.output.join(format!("{name}_vegas_input.txt"));
        prepare_trait(&entry.file, &entry.columns, &output)?;
        outputs.push(output);
    }
    Ok(outputs)
}
