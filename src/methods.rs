//! Gene prioritization methods and their result files
//!
//! Every supported method implements [`PrioritizationMethod`], which knows
//! how to read the method's native output format and how to decide which
//! genes are "significant".
//!
//! | Method | Format | Gene column | Significance |
//! | --- | --- | --- | --- |
//! | NetWAS | comma separated | `ensemble_id` | `netwas_score` > threshold |
//! | PoPs | tab separated | `ENSGID` | top N by `PoPS_Score` |
//! | DEPICT | tab separated | `Ensembl Gene ID` | `False discovery rate < 5%` |
//! | Downstreamer | `GenePrioritization` sheet | `Gene ID` | `FDR 5% significant` |
//! | MAGMA | whitespace separated | `GENE` | `P` < threshold |
//!
//! # Examples
//!
//! ```no_run
//! use geneprio::{Method, PrioritizationMethod};
//!
//! let method: Method = "PoPs".parse().unwrap();
//! let adapter = method.adapter();
//!
//! let (data, genes) = adapter.read_data("height.preds".as_ref()).unwrap();
//! let (significant, significant_genes) = adapter
//!     .filter_data(&data, adapter.default_rule())
//!     .unwrap();
//! assert!(significant.len() <= data.len());
//! ```

use std::collections::HashSet;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use crate::{GeneId, PrioError, PrioResult};

mod depict;
mod downstreamer;
mod magma;
mod netwas;
mod pops;

pub use depict::Depict;
pub use downstreamer::Downstreamer;
pub use magma::Magma;
pub use netwas::NetWas;
pub use pops::Pops;

/// The supported gene prioritization methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    NetWas,
    Pops,
    Depict,
    Downstreamer,
    Magma,
}

impl Method {
    /// All supported methods
    pub const ALL: [Method; 5] = [
        Method::NetWas,
        Method::Pops,
        Method::Depict,
        Method::Downstreamer,
        Method::Magma,
    ];

    /// Returns the adapter that reads and filters the results of the method
    pub fn adapter(self) -> &'static dyn PrioritizationMethod {
        match self {
            Method::NetWas => &NetWas,
            Method::Pops => &Pops,
            Method::Depict => &Depict,
            Method::Downstreamer => &Downstreamer,
            Method::Magma => &Magma,
        }
    }

    /// The name of the method, as used on the command line
    pub fn name(self) -> &'static str {
        match self {
            Method::NetWas => "NetWAS",
            Method::Pops => "PoPs",
            Method::Depict => "DEPICT",
            Method::Downstreamer => "Downstreamer",
            Method::Magma => "MAGMA",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Method {
    type Err = PrioError;
    fn from_str(s: &str) -> PrioResult<Self> {
        Method::ALL
            .into_iter()
            .find(|method| method.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PrioError::InvalidInput(format!("unknown prioritization method: {s}")))
    }
}

/// Decides which genes of a [`MethodResult`] are significant
///
/// Each method only accepts one kind of rule, see [`PrioritizationMethod::default_rule`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignificanceRule {
    /// Genes with a score strictly above the threshold
    ScoreAbove(f64),
    /// The N genes with the highest score
    TopRanked(usize),
    /// Genes that are flagged as significant by the method itself
    FlaggedSignificant,
    /// Genes with a p-value strictly below the threshold
    PValueBelow(f64),
}

impl Display for SignificanceRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignificanceRule::ScoreAbove(threshold) => write!(f, "score > {threshold}"),
            SignificanceRule::TopRanked(n) => write!(f, "top {n} genes"),
            SignificanceRule::FlaggedSignificant => write!(f, "flagged significant"),
            SignificanceRule::PValueBelow(threshold) => write!(f, "p < {threshold}"),
        }
    }
}

/// The method specific values of a single gene
#[derive(Debug, Clone, PartialEq)]
pub enum Evidence {
    NetWas {
        label: Option<i64>,
        score: f64,
    },
    Pops {
        score: f64,
    },
    Depict {
        nominal_p: f64,
        zscore: f64,
        fdr_significant: bool,
    },
    Downstreamer {
        zscore: f64,
        fdr_significant: bool,
    },
    Magma {
        zstat: f64,
        pvalue: f64,
    },
}

/// A single row of a prioritization result
#[derive(Debug, Clone, PartialEq)]
pub struct GeneRecord {
    id: GeneId,
    evidence: Evidence,
}

impl GeneRecord {
    /// Constructs a new `GeneRecord`
    pub fn new(id: GeneId, evidence: Evidence) -> Self {
        Self { id, evidence }
    }

    pub fn id(&self) -> &GeneId {
        &self.id
    }

    pub fn evidence(&self) -> &Evidence {
        &self.evidence
    }
}

/// The ordered result of one prioritization method
///
/// Gene IDs are not guaranteed to be unique. A `MethodResult` cannot be
/// modified once it is created, filtering always returns a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodResult {
    method: Method,
    records: Vec<GeneRecord>,
}

impl MethodResult {
    /// Constructs a new `MethodResult`
    ///
    /// # Errors
    ///
    /// [`PrioError::MethodMismatch`] if a record holds evidence of another method
    pub fn new(method: Method, records: Vec<GeneRecord>) -> PrioResult<Self> {
        if let Some(record) = records
            .iter()
            .find(|record| evidence_method(&record.evidence) != method)
        {
            return Err(PrioError::MethodMismatch {
                expected: method,
                received: evidence_method(&record.evidence),
            });
        }
        Ok(Self { method, records })
    }

    /// The method that produced the result
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn records(&self) -> &[GeneRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeneRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The gene IDs of all records, in record order
    pub fn gene_ids(&self) -> Vec<GeneId> {
        self.records.iter().map(|record| record.id.clone()).collect()
    }

    /// Returns a new result with all records that satisfy `keep`, in the same order
    pub fn filter<F: Fn(&GeneRecord) -> bool>(&self, keep: F) -> MethodResult {
        MethodResult {
            method: self.method,
            records: self
                .records
                .iter()
                .filter(|record| keep(record))
                .cloned()
                .collect(),
        }
    }

    /// Returns a new result with all records whose ID is part of `genes`
    pub fn retain_genes(&self, genes: &[GeneId]) -> MethodResult {
        let genes: HashSet<&GeneId> = genes.iter().collect();
        self.filter(|record| genes.contains(&record.id))
    }

    /// Builds a result from records that are already known to belong to `self.method`
    fn derive(&self, records: Vec<GeneRecord>) -> MethodResult {
        MethodResult {
            method: self.method,
            records,
        }
    }
}

impl<'a> IntoIterator for &'a MethodResult {
    type Item = &'a GeneRecord;
    type IntoIter = std::slice::Iter<'a, GeneRecord>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn evidence_method(evidence: &Evidence) -> Method {
    match evidence {
        Evidence::NetWas { .. } => Method::NetWas,
        Evidence::Pops { .. } => Method::Pops,
        Evidence::Depict { .. } => Method::Depict,
        Evidence::Downstreamer { .. } => Method::Downstreamer,
        Evidence::Magma { .. } => Method::Magma,
    }
}

/// Reading and filtering the results of a gene prioritization method
///
/// Implementors only have to provide the format specific parts. Intersecting
/// the results with the HPO reference is shared by all methods,
/// see [`get_overlap`](`crate::get_overlap`).
pub trait PrioritizationMethod: Sync {
    /// The method that is implemented
    fn method(&self) -> Method;

    /// The significance rule that is used when the user does not provide one
    fn default_rule(&self) -> SignificanceRule;

    /// Parses the result file of the method
    ///
    /// Returns all records and their gene IDs (in file order)
    ///
    /// # Errors
    ///
    /// - [`PrioError::CannotOpenFile`] if the file cannot be opened
    /// - [`PrioError::FileFormat`] if a required column is missing
    fn read_data(&self, path: &Path) -> PrioResult<(MethodResult, Vec<GeneId>)>;

    /// Keeps only the significant genes according to `rule`
    ///
    /// Returns the significant records and their gene IDs
    ///
    /// # Errors
    ///
    /// - [`PrioError::MethodMismatch`] if `data` was produced by another method
    /// - [`PrioError::IncompatibleRule`] if the method does not support the kind of `rule`
    fn filter_data(
        &self,
        data: &MethodResult,
        rule: SignificanceRule,
    ) -> PrioResult<(MethodResult, Vec<GeneId>)>;

    /// Returns the records whose gene ID is part of `genes`
    fn get_overlap_genes(&self, data: &MethodResult, genes: &[GeneId]) -> MethodResult {
        data.retain_genes(genes)
    }

    /// Ensures that `data` belongs to this method
    ///
    /// # Errors
    ///
    /// [`PrioError::MethodMismatch`] if `data` was produced by another method
    fn check_method(&self, data: &MethodResult) -> PrioResult<()> {
        if data.method() == self.method() {
            Ok(())
        } else {
            Err(PrioError::MethodMismatch {
                expected: self.method(),
                received: data.method(),
            })
        }
    }

    /// Returns the error for rules that the method does not support
    fn incompatible(&self, rule: SignificanceRule) -> PrioError {
        PrioError::IncompatibleRule {
            method: self.method(),
            rule,
        }
    }
}

/// Returns the result together with its gene IDs, as returned by all adapters
fn with_ids(result: MethodResult) -> (MethodResult, Vec<GeneId>) {
    let genes = result.gene_ids();
    (result, genes)
}
