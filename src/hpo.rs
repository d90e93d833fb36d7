//! The HPO reference: which genes are annotated to which HPO terms
//!
//! The reference is usually loaded from a gene × term matrix, as distributed
//! with Downstreamer:
//!
//! ```text
//! -                 HP:0000001  HP:0000118  HP:0001250
//! ENSG00000000003   1           1           0
//! ENSG00000000005   1           0           0
//! ENSG00000000419   1           1           1
//! ```
//!
//! The [`HpoReference`] is built once and then shared read-only by all
//! trait evaluations of a run.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::parser::{open_reader, Delimiter, Table};
use crate::{GeneId, HpoGroup, HpoTermId, PrioError, PrioResult};

/// Mapping of genes to the HPO terms they are annotated with
///
/// Genes keep the order in which they were added.
///
/// # Examples
///
/// ```
/// use geneprio::{GeneId, HpoReference, HpoTermId};
///
/// let seizure = HpoTermId::from(1250u32);
/// let abnormality = HpoTermId::from(118u32);
///
/// let mut reference = HpoReference::new(vec![abnormality, seizure]);
/// reference.add_gene(GeneId::from("ENSG1"), [abnormality, seizure]);
/// reference.add_gene(GeneId::from("ENSG2"), [abnormality]);
///
/// let (rows, genes) = reference.get_data_hpo_term(seizure).unwrap();
/// assert_eq!(genes, vec![GeneId::from("ENSG1")]);
/// assert_eq!(rows.len(), 1);
/// ```
#[derive(Debug, Default, Clone)]
pub struct HpoReference {
    terms: Vec<HpoTermId>,
    genes: Vec<GeneId>,
    annotations: Vec<HpoGroup>,
    index: HashMap<GeneId, usize>,
}

impl HpoReference {
    /// Constructs an empty reference that knows about `terms`
    pub fn new(terms: Vec<HpoTermId>) -> Self {
        Self {
            terms,
            ..Default::default()
        }
    }

    /// Loads the reference from a tab separated gene × term matrix
    ///
    /// The first column holds the gene IDs, all other column headers
    /// must be HPO term IDs. Every non-zero cell annotates the gene with the
    /// term of the column. Files ending in `.gz` are decompressed.
    ///
    /// # Errors
    ///
    /// - [`PrioError::CannotOpenFile`] if the file cannot be opened
    /// - [`PrioError::InvalidInput`] if a column header is not an HPO term ID
    pub fn from_path<P: AsRef<Path>>(path: P) -> PrioResult<Self> {
        let table = Table::from_delimited(path.as_ref(), Delimiter::Tab)?;
        let reference = Self::from_table(&table)?;
        info!(
            "Loaded HPO reference with {} genes and {} terms from {}",
            reference.len(),
            reference.terms.len(),
            path.as_ref().display()
        );
        Ok(reference)
    }

    fn from_table(table: &Table) -> PrioResult<Self> {
        let Some((_, term_headers)) = table.headers().split_first() else {
            return Err(PrioError::InvalidInput(format!(
                "{} does not contain a header",
                table.source()
            )));
        };
        let terms = term_headers
            .iter()
            .map(|header| HpoTermId::try_from(header.as_str()))
            .collect::<PrioResult<Vec<HpoTermId>>>()?;

        let mut reference = Self::new(terms);
        for row in table.rows() {
            let gene = row.get(0);
            if gene.is_empty() {
                warn!("Skipping row without gene ID in {}", table.source());
                continue;
            }
            let annotated: Vec<HpoTermId> = reference
                .terms
                .iter()
                .enumerate()
                .filter(|(idx, _)| {
                    let value = row.float(idx + 1);
                    !value.is_nan() && value != 0.0
                })
                .map(|(_, term)| *term)
                .collect();
            if !reference.add_gene(GeneId::from(gene), annotated) {
                debug!("Merging duplicate gene {} of {}", gene, table.source());
            }
        }
        Ok(reference)
    }

    /// Adds a gene and its annotated terms
    ///
    /// Returns `false` if the gene was already present. In that case
    /// the new terms are added to the existing ones.
    ///
    /// # Note
    ///
    /// Terms are not checked against [`HpoReference::terms`]. Clients must
    /// make sure to only use known terms.
    pub fn add_gene<I: IntoIterator<Item = HpoTermId>>(&mut self, gene: GeneId, terms: I) -> bool {
        let group: HpoGroup = terms.into_iter().collect();
        match self.index.get(&gene) {
            Some(idx) => {
                self.annotations[*idx].extend(&group);
                false
            }
            None => {
                self.index.insert(gene.clone(), self.genes.len());
                self.genes.push(gene);
                self.annotations.push(group);
                true
            }
        }
    }

    /// Returns the number of genes
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Returns `true` if the reference does not contain any genes
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// All HPO terms of the reference
    pub fn terms(&self) -> &[HpoTermId] {
        &self.terms
    }

    /// Returns `true` if `term` is one of the reference terms
    pub fn has_term(&self, term: &HpoTermId) -> bool {
        self.terms.contains(term)
    }

    /// Iterates all genes, in reference order
    pub fn genes(&self) -> std::slice::Iter<'_, GeneId> {
        self.genes.iter()
    }

    /// Returns `true` if the gene is part of the reference
    pub fn contains(&self, gene: &GeneId) -> bool {
        self.index.contains_key(gene)
    }

    /// The terms annotated to `gene`, or `None` if the gene is unknown
    pub fn gene_terms(&self, gene: &GeneId) -> Option<&HpoGroup> {
        self.index.get(gene).map(|idx| &self.annotations[*idx])
    }

    /// Returns a new reference that only contains the genes that are
    /// also present in `genes`
    ///
    /// The order of the genes in the new reference follows `self`.
    pub fn restrict<'a, I: IntoIterator<Item = &'a GeneId>>(&self, genes: I) -> HpoReference {
        let keep: Vec<bool> = {
            let mut keep = vec![false; self.genes.len()];
            for gene in genes {
                if let Some(idx) = self.index.get(gene) {
                    keep[*idx] = true;
                }
            }
            keep
        };
        self.select(|idx| keep[idx])
    }

    /// Returns the genes annotated with `term` as restricted reference
    /// together with their IDs
    ///
    /// # Errors
    ///
    /// [`PrioError::UnknownTerm`] if the term is not part of the reference
    pub fn get_data_hpo_term(&self, term: HpoTermId) -> PrioResult<(HpoReference, Vec<GeneId>)> {
        if !self.has_term(&term) {
            return Err(PrioError::UnknownTerm(term));
        }
        let rows = self.select(|idx| self.annotations[idx].contains(&term));
        let genes = rows.genes.clone();
        debug!("{} genes are annotated with {}", genes.len(), term);
        Ok((rows, genes))
    }

    fn select<F: Fn(usize) -> bool>(&self, keep: F) -> HpoReference {
        let mut reference = HpoReference::new(self.terms.clone());
        for (idx, gene) in self.genes.iter().enumerate() {
            if keep(idx) {
                reference.add_gene(gene.clone(), self.annotations[idx].iter().copied());
            }
        }
        reference
    }
}

impl<'a> IntoIterator for &'a HpoReference {
    type Item = &'a GeneId;
    type IntoIter = std::slice::Iter<'a, GeneId>;
    fn into_iter(self) -> Self::IntoIter {
        self.genes()
    }
}

/// An HPO term that is tested in multiple-test mode, with its description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermInfo {
    term: HpoTermId,
    description: String,
}

impl TermInfo {
    pub fn new(term: HpoTermId, description: String) -> Self {
        Self { term, description }
    }

    pub fn term(&self) -> HpoTermId {
        self.term
    }

    /// The description of the term, empty if none was provided
    pub fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Deserialize)]
struct TermInfoRow {
    hpo_term: String,
    #[serde(default)]
    description: String,
}

/// Reads the comma separated list of HPO terms to test
///
/// The file needs a header with the column `hpo_term` and can contain
/// a `description` column. All other columns are ignored.
///
/// # Errors
///
/// - [`PrioError::CannotOpenFile`] if the file cannot be opened
/// - [`PrioError::Csv`] if the `hpo_term` column is missing
/// - [`PrioError::InvalidInput`] if a term is not a valid HPO term ID
pub fn read_term_info<P: AsRef<Path>>(path: P) -> PrioResult<Vec<TermInfo>> {
    let reader = open_reader(path.as_ref())?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut terms = Vec::new();
    for row in rdr.deserialize() {
        let row: TermInfoRow = row?;
        terms.push(TermInfo::new(
            HpoTermId::try_from(row.hpo_term.as_str())?,
            row.description,
        ));
    }
    info!("Read {} HPO terms from {}", terms.len(), path.as_ref().display());
    Ok(terms)
}
