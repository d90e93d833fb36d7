#![doc = r#"
Evaluate gene prioritization results against the Human Phenotype Ontology

`geneprio` reads the output of gene prioritization methods (NetWAS, PoPS,
DEPICT, MAGMA and Downstreamer), intersects the prioritized genes with an
HPO gene/phenotype reference and tests whether the significant genes are
enriched for the genes of an HPO term using Fisher's exact test.

# Examples

```
use geneprio::{create_fisher_table, fishers_exact_test, GeneId};

let universe: Vec<GeneId> = ["ENSG1", "ENSG2", "ENSG3", "ENSG4"]
    .into_iter()
    .map(GeneId::from)
    .collect();
let significant = vec![GeneId::from("ENSG1"), GeneId::from("ENSG2")];
let term_genes = vec![GeneId::from("ENSG1")];

let table = create_fisher_table(&universe, &significant, &term_genes);
assert_eq!(table.true_positives(), 1);
assert_eq!(table.false_positives(), 1);
assert_eq!(table.true_negatives(), 2);
assert_eq!(table.total(), 4);

let result = fishers_exact_test(&table.as_matrix());
assert!(result.odds_ratio().is_infinite());
assert!((result.pvalue() - 1.0).abs() < 1e-9);
```
"#]
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

pub mod config;
mod gene;
pub mod hpo;
pub mod methods;
pub mod netwas;
mod overlap;
mod parser;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod term;
pub mod utils;
pub mod vegas;

pub use gene::GeneId;
pub use hpo::HpoReference;
pub use methods::{GeneRecord, Method, MethodResult, PrioritizationMethod, SignificanceRule};
pub use overlap::{get_overlap, Overlap};
pub use stats::fisher::{
    create_fisher_table, fishers_exact_test, ContingencyTable, FisherResult, VennCounts,
};
pub use term::{HpoGroup, HpoTermId};

const DEFAULT_NUM_TERMS: usize = 30;

/// All errors that can occur while reading, filtering or testing data
#[derive(Error, Debug)]
pub enum PrioError {
    #[error("cannot open file {0}")]
    CannotOpenFile(String),
    #[error("the file that was supplied does not exist: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("column `{column}` not found in {file}")]
    FileFormat { file: String, column: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("HPO term {0} is not part of the reference")]
    UnknownTerm(HpoTermId),
    #[error("unable to parse Integer")]
    ParseIntError,
    #[error("{rule} cannot be used to filter {method} results")]
    IncompatibleRule { method: Method, rule: SignificanceRule },
    #[error("expected {expected} results, received {received} results")]
    MethodMismatch { expected: Method, received: Method },
    #[error("the program could not find the correct column name, found: {0}. Please specify the correct name inside the config file")]
    AutomaticColumnExtract(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Spreadsheet(#[from] calamine::Error),
}

impl From<ParseIntError> for PrioError {
    fn from(_: ParseIntError) -> Self {
        PrioError::ParseIntError
    }
}

/// Shortcut for `Result<T, PrioError>`
pub type PrioResult<T> = Result<T, PrioError>;
