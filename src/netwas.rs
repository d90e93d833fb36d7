//! Parsing of the raw result files that are downloaded from the NetWAS web server
//!
//! The download starts with a preamble describing the analysis, followed by
//! a table without header: gene, label and NetWAS score. The separator
//! is either a comma or a tab.
//!
//! The parsed genes can be written as a tab separated table without header,
//! either with all columns or only the genes.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::parser::{open_reader, parse_float};
use crate::utils::ensure_dir;
use crate::{PrioError, PrioResult};

/// Number of preamble lines before the gene table starts
pub const PREAMBLE_LINES: usize = 28;

/// A single gene of a raw NetWAS result
#[derive(Debug, Clone, PartialEq)]
pub struct NetWasHit {
    gene: String,
    label: String,
    score: f64,
}

impl NetWasHit {
    pub fn gene(&self) -> &str {
        &self.gene
    }

    /// The label as given in the file, `1` for genes that are part of the GWAS input
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn score(&self) -> f64 {
        self.score
    }
}

/// Checks that the raw NetWAS file exists and is a `.txt` or `.csv` file
///
/// # Errors
///
/// - [`PrioError::MissingFile`] if the file does not exist
/// - [`PrioError::InvalidInput`] if the extension is not supported
pub fn validate_input(path: &Path) -> PrioResult<()> {
    if !path.is_file() {
        return Err(PrioError::MissingFile(path.to_path_buf()));
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("txt" | "csv") => Ok(()),
        _ => Err(PrioError::InvalidInput(format!(
            "{} must be a .txt or .csv file",
            path.display()
        ))),
    }
}

/// Reads a raw NetWAS result
///
/// # Errors
///
/// - [`PrioError::CannotOpenFile`] if the file cannot be opened
/// - [`PrioError::Csv`] if the table is malformed
pub fn read_raw<P: AsRef<Path>>(path: P) -> PrioResult<Vec<NetWasHit>> {
    let reader = open_reader(path.as_ref())?;
    let hits = read_raw_from(reader)?;
    debug!("Read {} genes from {}", hits.len(), path.as_ref().display());
    Ok(hits)
}

fn read_raw_from<R: Read>(reader: R) -> PrioResult<Vec<NetWasHit>> {
    let mut content = String::new();
    for line in BufReader::new(reader).lines().skip(PREAMBLE_LINES) {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        content.push_str(&line);
        content.push('\n');
    }

    let delimiter = sniff_delimiter(&content);
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut hits = Vec::new();
    for record in rdr.records() {
        let record = record?;
        hits.push(NetWasHit {
            gene: record.get(0).unwrap_or_default().trim().to_string(),
            label: record.get(1).unwrap_or_default().trim().to_string(),
            score: parse_float(record.get(2).unwrap_or_default()),
        });
    }
    Ok(hits)
}

/// Tab if the first line contains a tab, comma otherwise
fn sniff_delimiter(content: &str) -> u8 {
    match content.lines().next() {
        Some(line) if line.contains('\t') => b'\t',
        _ => b',',
    }
}

/// Keeps the genes with a score of at least `threshold`
///
/// All genes are kept if no threshold is given.
pub fn filter_hits(hits: Vec<NetWasHit>, threshold: Option<f64>) -> Vec<NetWasHit> {
    match threshold {
        Some(threshold) => hits
            .into_iter()
            .filter(|hit| hit.score >= threshold)
            .collect(),
        None => hits,
    }
}

/// Writes the genes as tab separated table without header
///
/// With `gene_list` only the gene column is written.
pub fn write_hits<W: Write>(writer: W, hits: &[NetWasHit], gene_list: bool) -> PrioResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer);
    for hit in hits {
        if gene_list {
            wtr.write_record([hit.gene.as_str()])?;
        } else {
            let score = hit.score.to_string();
            wtr.write_record([hit.gene.as_str(), hit.label.as_str(), score.as_str()])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Parses a raw NetWAS result, filters it and writes it to `output`
///
/// The parent directory of `output` is created if needed.
///
/// Returns the number of written genes
///
/// # Errors
///
/// - All errors of [`validate_input`] and [`read_raw`]
/// - [`PrioError::Io`] if the output cannot be written
pub fn parse_netwas_results(
    input: &Path,
    output: &Path,
    threshold: Option<f64>,
    gene_list: bool,
) -> PrioResult<usize> {
    validate_input(input)?;
    let hits = filter_hits(read_raw(input)?, threshold);

    if let Some(dir) = output.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        ensure_dir(dir)?;
    }
    write_hits(BufWriter::new(File::create(output)?), &hits, gene_list)?;
    info!("Wrote {} NetWAS genes to {}", hits.len(), output.display());
    Ok(hits.len())
}

#[cfg(test)]
mod test {
    use super::*;

    fn raw(separator: &str) -> String {
        let mut content = String::new();
        for idx in 0..PREAMBLE_LINES {
            content.push_str(&format!("# preamble line {idx}\n"));
        }
        for (gene, label, score) in [("GeneA", "1", "0.9"), ("GeneB", "-1", "0.3"), ("GeneC", "1", "0.5")] {
            content.push_str(&format!("{gene}{separator}{label}{separator}{score}\n"));
        }
        content
    }

    #[test]
    fn read_comma_separated() {
        let hits = read_raw_from(raw(",").as_bytes()).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[1].gene(), "GeneB");
        assert_eq!(hits[1].label(), "-1");
        assert!((hits[1].score() - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn read_tab_separated() {
        let hits = read_raw_from(raw("\t").as_bytes()).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[2].gene(), "GeneC");
    }

    #[test]
    fn threshold_is_inclusive() {
        let hits = read_raw_from(raw(",").as_bytes()).unwrap();
        let kept = filter_hits(hits.clone(), Some(0.5));
        let genes: Vec<&str> = kept.iter().map(NetWasHit::gene).collect();
        assert_eq!(genes, vec!["GeneA", "GeneC"]);

        assert_eq!(filter_hits(hits, None).len(), 3);
    }

    #[test]
    fn write_gene_list() {
        let hits = read_raw_from(raw(",").as_bytes()).unwrap();
        let mut buffer = Vec::new();
        write_hits(&mut buffer, &hits, true).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "GeneA\nGeneB\nGeneC\n");

        let mut buffer = Vec::new();
        write_hits(&mut buffer, &hits[..1], false).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "GeneA\t1\t0.9\n");
    }

    #[test]
    fn parse_and_write() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("netwas_raw.txt");
        std::fs::write(&input, raw("\t")).unwrap();
        let output = dir.path().join("parsed").join("netwas.tsv");

        let written = parse_netwas_results(&input, &output, Some(0.5), false).unwrap();
        assert_eq!(written, 2);
        let content = std::fs::read_to_string(&output).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn reject_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("netwas_raw.tsv");
        std::fs::write(&input, raw("\t")).unwrap();
        assert!(matches!(
            validate_input(&input),
            Err(PrioError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_input(&dir.path().join("missing.txt")),
            Err(PrioError::MissingFile(_))
        ));
    }
}
