//! Writing the results of single and multiple Fisher tests
//!
//! - single tests: a plain text report per trait, `<trait>_fisher_results.txt`
//! - multiple tests: a tab separated table per result file,
//!   `<method>/fisher_result_<file stem>.tsv`

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::pipeline::{TermEnrichment, TraitEvaluation};
use crate::utils::ensure_dir;
use crate::{Method, PrioResult};

/// Writes the text report of a single test
///
/// Precision and recall are rounded to 4 decimals.
pub fn write_report<W: Write>(mut writer: W, evaluation: &TraitEvaluation) -> PrioResult<()> {
    let table = evaluation.table();
    let venn = evaluation.venn();
    let result = evaluation.result();

    writeln!(
        writer,
        "{} ({}), {}",
        evaluation.name(),
        evaluation.method(),
        evaluation.term()
    )?;
    writeln!(writer, "2x2 contingency table:")?;
    writeln!(writer, "{table}")?;
    writeln!(
        writer,
        "\nprecision: {:.4}, recall: {:.4}",
        table.precision(),
        table.recall()
    )?;
    writeln!(
        writer,
        "\nVenn diagram: significant genes: {}, HPO term genes: {}, shared: {}",
        venn.significant(),
        venn.term_genes(),
        venn.shared()
    )?;
    writeln!(writer, "\nFisher's exact test results:")?;
    writeln!(
        writer,
        "odds ratio: {}, pvalue: {}",
        result.odds_ratio(),
        result.pvalue()
    )?;
    Ok(())
}

/// Saves the report of a single test as `<dir>/<trait>_fisher_results.txt`
///
/// Returns the path of the report
///
/// # Errors
///
/// [`crate::PrioError::Io`] if the directory or file cannot be written
pub fn save_report<P: AsRef<Path>>(dir: P, evaluation: &TraitEvaluation) -> PrioResult<PathBuf> {
    ensure_dir(dir.as_ref())?;
    let path = dir
        .as_ref()
        .join(format!("{}_fisher_results.txt", evaluation.name()));
    let mut writer = BufWriter::new(File::create(&path)?);
    write_report(&mut writer, evaluation)?;
    writer.flush()?;
    info!("Saved Fisher results of {} to {}", evaluation.name(), path.display());
    Ok(path)
}

/// Prints the report of a single test to stdout
///
/// # Errors
///
/// [`crate::PrioError::Io`] if stdout is closed
pub fn print_report(evaluation: &TraitEvaluation) -> PrioResult<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_report(&mut handle, evaluation)?;
    writeln!(handle)?;
    Ok(())
}

const ENRICHMENT_COLUMNS: [&str; 10] = [
    "hpo_term",
    "description",
    "true_positives",
    "false_positives",
    "false_negatives",
    "true_negatives",
    "odds_ratio",
    "pvalue",
    "precision",
    "recall",
];

#[derive(Serialize)]
struct EnrichmentRow<'a> {
    hpo_term: String,
    description: &'a str,
    true_positives: u64,
    false_positives: u64,
    false_negatives: u64,
    true_negatives: u64,
    odds_ratio: f64,
    pvalue: f64,
    precision: f64,
    recall: f64,
}

impl<'a> From<&'a TermEnrichment> for EnrichmentRow<'a> {
    fn from(enrichment: &'a TermEnrichment) -> Self {
        let table = enrichment.table();
        Self {
            hpo_term: enrichment.term().to_string(),
            description: enrichment.description(),
            true_positives: table.true_positives(),
            false_positives: table.false_positives(),
            false_negatives: table.false_negatives(),
            true_negatives: table.true_negatives(),
            odds_ratio: enrichment.result().odds_ratio(),
            pvalue: enrichment.result().pvalue(),
            precision: table.precision(),
            recall: table.recall(),
        }
    }
}

/// Writes the results of multiple tests as tab separated table with header
pub fn write_enrichments<W: Write>(writer: W, enrichments: &[TermEnrichment]) -> PrioResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(ENRICHMENT_COLUMNS)?;
    for enrichment in enrichments {
        wtr.serialize(EnrichmentRow::from(enrichment))?;
    }
    wtr.flush()?;
    Ok(())
}

/// The output file of multiple tests: `<output>/<method>/fisher_result_<file stem>.tsv`
pub fn enrichment_path(output: &Path, method: Method, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "unknown".into(), |stem| stem.to_string_lossy());
    output
        .join(method.name())
        .join(format!("fisher_result_{stem}.tsv"))
}

/// Saves the results of multiple tests, see [`enrichment_path`]
///
/// Returns the path of the table
///
/// # Errors
///
/// - [`crate::PrioError::Io`] if the directory or file cannot be written
/// - [`crate::PrioError::Csv`] if a row cannot be serialized
pub fn save_enrichments(
    output: &Path,
    method: Method,
    input: &Path,
    enrichments: &[TermEnrichment],
) -> PrioResult<PathBuf> {
    let path = enrichment_path(output, method, input);
    if let Some(dir) = path.parent() {
        ensure_dir(dir)?;
    }
    write_enrichments(BufWriter::new(File::create(&path)?), enrichments)?;
    info!(
        "Saved {} Fisher tests of {} to {}",
        enrichments.len(),
        input.display(),
        path.display()
    );
    Ok(path)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn output_path() {
        let path = enrichment_path(
            Path::new("out"),
            Method::Pops,
            Path::new("data/height.preds"),
        );
        assert_eq!(path, PathBuf::from("out/PoPs/fisher_result_height.tsv"));
    }

    #[test]
    fn header_without_enrichments() {
        let mut buffer = Vec::new();
        write_enrichments(&mut buffer, &[]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("hpo_term\tdescription\ttrue_positives"));
    }
}
