//! YAML configuration of the Fisher tests and the VEGAS input preparation
//!
//! # Fisher tests
//!
//! ```yaml
//! hpo_data: data/hpo_matrix.txt.gz
//! hpo_info: data/hpo_info.csv        # only for multiple tests
//! output: results                    # optional
//! thresholds:                        # optional, all keys optional
//!   netwas_score: 0.5
//!   pops_top_genes: 500
//!   magma_pvalue: 1.084e-4
//! traits:
//!   height:                          # single test: file + HPO term
//!     file: data/height.preds
//!     hpo_term: HP:0000098
//!   ibd: data/ibd.preds              # multiple tests: only the file
//! ```
//!
//! # VEGAS
//!
//! ```yaml
//! output: vegas
//! traits:
//!   height:
//!     file: data/height_sumstats.txt
//!     columns:
//!       snp: SNP
//!       pval: None                   # detected from the header
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::methods::{Magma, NetWas, Pops};
use crate::{HpoTermId, Method, PrioError, PrioResult, SignificanceRule};

/// Reads and parses a YAML file
fn read_yaml<T: for<'de> Deserialize<'de>>(path: &Path) -> PrioResult<T> {
    if !path.exists() {
        return Err(PrioError::MissingFile(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    let config = serde_yaml::from_str(&content)?;
    debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

fn ensure_file(path: &Path) -> PrioResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PrioError::MissingFile(path.to_path_buf()))
    }
}

/// Configuration of single and multiple Fisher tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// The gene × HPO term matrix
    pub hpo_data: PathBuf,

    /// CSV with the HPO terms to test (multiple tests only)
    #[serde(default)]
    pub hpo_info: Option<PathBuf>,

    /// Default output directory, the command line takes precedence
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Significance thresholds of the prioritization methods
    #[serde(default)]
    pub thresholds: Thresholds,

    /// The traits to evaluate, ordered by name
    pub traits: BTreeMap<String, TraitEntry>,
}

impl Config {
    /// Loads the configuration from a YAML file
    ///
    /// # Errors
    ///
    /// - [`PrioError::MissingFile`] if the file does not exist
    /// - [`PrioError::Yaml`] if the content is not a valid configuration
    pub fn from_path<P: AsRef<Path>>(path: P) -> PrioResult<Self> {
        read_yaml(path.as_ref())
    }

    /// Checks that the HPO reference, the HPO info and all trait files exist
    ///
    /// # Errors
    ///
    /// [`PrioError::MissingFile`] for the first file that does not exist
    pub fn validate_inputs(&self) -> PrioResult<()> {
        ensure_file(&self.hpo_data)?;
        if let Some(hpo_info) = &self.hpo_info {
            ensure_file(hpo_info)?;
        }
        for entry in self.traits.values() {
            ensure_file(entry.file())?;
        }
        Ok(())
    }
}

/// The input of a single trait
///
/// Either only the path to the prioritization result, or the path
/// together with the HPO term that is tested in single-test mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraitEntry {
    File(PathBuf),
    Detailed {
        file: PathBuf,
        #[serde(default)]
        hpo_term: Option<String>,
    },
}

impl TraitEntry {
    /// The prioritization result of the trait
    pub fn file(&self) -> &Path {
        match self {
            TraitEntry::File(file) => file,
            TraitEntry::Detailed { file, .. } => file,
        }
    }

    /// The HPO term to test the trait against
    ///
    /// # Errors
    ///
    /// - [`PrioError::InvalidInput`] if no term is configured or the term is not valid
    pub fn hpo_term(&self) -> PrioResult<HpoTermId> {
        match self {
            TraitEntry::Detailed {
                hpo_term: Some(term),
                ..
            } => HpoTermId::try_from(term.as_str()),
            _ => Err(PrioError::InvalidInput(format!(
                "no HPO term configured for {}",
                self.file().display()
            ))),
        }
    }
}

/// Significance thresholds of the prioritization methods
///
/// Every threshold defaults to the method's own default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_netwas_score")]
    pub netwas_score: f64,

    #[serde(default = "default_pops_top_genes")]
    pub pops_top_genes: usize,

    #[serde(default = "default_magma_pvalue")]
    pub magma_pvalue: f64,
}

fn default_netwas_score() -> f64 {
    NetWas::DEFAULT_SCORE_THRESHOLD
}

fn default_pops_top_genes() -> usize {
    Pops::DEFAULT_TOP_GENES
}

fn default_magma_pvalue() -> f64 {
    Magma::DEFAULT_PVALUE_THRESHOLD
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            netwas_score: default_netwas_score(),
            pops_top_genes: default_pops_top_genes(),
            magma_pvalue: default_magma_pvalue(),
        }
    }
}

impl Thresholds {
    /// The significance rule that is passed to [`crate::PrioritizationMethod::filter_data`]
    pub fn rule_for(&self, method: Method) -> SignificanceRule {
        match method {
            Method::NetWas => SignificanceRule::ScoreAbove(self.netwas_score),
            Method::Pops => SignificanceRule::TopRanked(self.pops_top_genes),
            Method::Magma => SignificanceRule::PValueBelow(self.magma_pvalue),
            Method::Depict | Method::Downstreamer => SignificanceRule::FlaggedSignificant,
        }
    }
}

/// Configuration of the VEGAS input preparation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VegasConfig {
    /// Directory of the prepared VEGAS input files
    pub output: PathBuf,

    /// GWAS summary statistics per trait
    pub traits: BTreeMap<String, VegasTrait>,
}

/// The summary statistics of a single trait
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VegasTrait {
    pub file: PathBuf,
    #[serde(default)]
    pub columns: VegasColumns,
}

/// Names of the SNP and p-value columns
///
/// Missing names, or the literal `None`, are detected from the header.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct VegasColumns {
    #[serde(default)]
    pub snp: Option<String>,
    #[serde(default)]
    pub pval: Option<String>,
}

impl VegasColumns {
    /// The configured column names, or `None` if any of them must be detected
    pub fn requested(&self) -> Option<(&str, &str)> {
        fn name(value: &Option<String>) -> Option<&str> {
            value.as_deref().filter(|name| *name != "None")
        }
        Some((name(&self.snp)?, name(&self.pval)?))
    }
}

impl VegasConfig {
    /// Loads the configuration from a YAML file
    ///
    /// # Errors
    ///
    /// - [`PrioError::MissingFile`] if the file does not exist
    /// - [`PrioError::Yaml`] if the content is not a valid configuration
    pub fn from_path<P: AsRef<Path>>(path: P) -> PrioResult<Self> {
        read_yaml(path.as_ref())
    }

    /// Checks that all input files exist
    ///
    /// # Errors
    ///
    /// [`PrioError::MissingFile`] for the first file that does not exist
    pub fn validate_inputs(&self) -> PrioResult<()> {
        for (name, entry) in &self.traits {
            if !entry.file.is_file() {
                warn!("Input file of {} does not exist", name);
                return Err(PrioError::MissingFile(entry.file.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::PrioritizationMethod;

    const CONFIG: &str = "
hpo_data: tests/data/hpo_matrix.txt
thresholds:
  pops_top_genes: 2
traits:
  height:
    file: tests/data/pops.preds
    hpo_term: HP:0000098
  ibd: tests/data/netwas.csv
";

    #[test]
    fn parse_config() {
        let config: Config = serde_yaml::from_str(CONFIG).unwrap();
        assert_eq!(config.hpo_data, PathBuf::from("tests/data/hpo_matrix.txt"));
        assert!(config.hpo_info.is_none());
        assert_eq!(config.traits.len(), 2);

        let height = &config.traits["height"];
        assert_eq!(height.file(), Path::new("tests/data/pops.preds"));
        assert_eq!(height.hpo_term().unwrap(), HpoTermId::from(98u32));

        let ibd = &config.traits["ibd"];
        assert_eq!(ibd, &TraitEntry::File(PathBuf::from("tests/data/netwas.csv")));
        assert!(ibd.hpo_term().is_err());
    }

    #[test]
    fn thresholds_default_to_methods() {
        let config: Config = serde_yaml::from_str(CONFIG).unwrap();
        let thresholds = config.thresholds;
        assert_eq!(thresholds.pops_top_genes, 2);
        assert_eq!(thresholds.rule_for(Method::Pops), SignificanceRule::TopRanked(2));
        assert_eq!(thresholds.rule_for(Method::NetWas), NetWas.default_rule());
        for method in [Method::Depict, Method::Downstreamer] {
            assert_eq!(thresholds.rule_for(method), method.adapter().default_rule());
        }
    }

    #[test]
    fn default_thresholds_match_adapters() {
        let thresholds = Thresholds::default();
        for method in Method::ALL {
            assert_eq!(thresholds.rule_for(method), method.adapter().default_rule());
        }
    }

    #[test]
    fn missing_config() {
        let result = Config::from_path("does/not/exist.yaml");
        assert!(matches!(result, Err(PrioError::MissingFile(_))));
    }

    #[test]
    fn missing_trait_file() {
        let dir = tempfile::tempdir().unwrap();
        let hpo = dir.path().join("hpo.txt");
        std::fs::write(&hpo, "-\tHP:0000001\n").unwrap();

        let mut traits = BTreeMap::new();
        traits.insert(
            "height".to_string(),
            TraitEntry::File(dir.path().join("height.preds")),
        );
        let config = Config {
            hpo_data: hpo,
            hpo_info: None,
            output: None,
            thresholds: Thresholds::default(),
            traits,
        };
        assert!(matches!(
            config.validate_inputs(),
            Err(PrioError::MissingFile(_))
        ));
    }

    #[test]
    fn vegas_columns() {
        let config: VegasConfig = serde_yaml::from_str(
            "
output: vegas
traits:
  height:
    file: height.txt
    columns:
      snp: SNP
      pval: None
  ibd:
    file: ibd.txt
    columns:
      snp: rsid
      pval: P
",
        )
        .unwrap();
        assert!(config.traits["height"].columns.requested().is_none());
        assert_eq!(config.traits["ibd"].columns.requested(), Some(("rsid", "P")));
    }
}
