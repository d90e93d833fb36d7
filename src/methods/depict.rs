use std::path::Path;

use statrs::statistics::Statistics;
use tracing::{debug, warn};

use crate::methods::{with_ids, Evidence, GeneRecord, Method, MethodResult};
use crate::methods::{PrioritizationMethod, SignificanceRule};
use crate::parser::{Delimiter, Table};
use crate::{GeneId, PrioResult};

const GENE_COLUMN: &str = "Ensembl Gene ID";
const PVALUE_COLUMN: &str = "Nominal P value";
const FDR_COLUMN: &str = "False discovery rate < 5%";

/// [DEPICT](https://data.broadinstitute.org/mpg/depict/) gene prioritization
///
/// Expects the tab separated `genepriortization.txt` output. DEPICT pads
/// header names and gene IDs with whitespace, which is removed.
/// Genes that pass the 5% FDR are significant. DEPICT marks them with `Yes`,
/// any other value in that column (including `true` or `1`) is not significant.
///
/// In addition to the raw values, a z-score of the nominal p-values is
/// calculated. Invalid p-values are `NaN` and do not contribute to
/// the mean and standard deviation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Depict;

impl Depict {
    fn parse_table(mut table: Table) -> PrioResult<MethodResult> {
        table.trim_headers();
        let gene = table.column(GENE_COLUMN)?;
        let pvalue = table.column(PVALUE_COLUMN)?;
        let fdr = table.column(FDR_COLUMN)?;

        let pvalues: Vec<f64> = table.rows().map(|row| row.float(pvalue)).collect();
        let zscores = zscores(&pvalues);

        let records = table
            .rows()
            .zip(pvalues.iter().zip(zscores))
            .map(|(row, (nominal_p, zscore))| {
                GeneRecord::new(
                    GeneId::from(row.get(gene).trim_end()),
                    Evidence::Depict {
                        nominal_p: *nominal_p,
                        zscore,
                        fdr_significant: passes_fdr(row.get(fdr)),
                    },
                )
            })
            .collect();
        MethodResult::new(Method::Depict, records)
    }
}

/// `Yes` in the `False discovery rate < 5%` column, ignoring the padding
fn passes_fdr(value: &str) -> bool {
    value.trim() == "Yes"
}

/// Standardizes `values` to zero mean and unit (population) standard deviation
///
/// `NaN` values are omitted from the mean and standard deviation
/// and stay `NaN`.
fn zscores(values: &[f64]) -> Vec<f64> {
    let valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if valid.len() < values.len() {
        warn!(
            "{} p-values could not be parsed and have no z-score",
            values.len() - valid.len()
        );
    }
    let mean = valid.iter().mean();
    let std_dev = valid.iter().population_std_dev();
    values.iter().map(|v| (v - mean) / std_dev).collect()
}

impl PrioritizationMethod for Depict {
    fn method(&self) -> Method {
        Method::Depict
    }

    fn default_rule(&self) -> SignificanceRule {
        SignificanceRule::FlaggedSignificant
    }

    fn read_data(&self, path: &Path) -> PrioResult<(MethodResult, Vec<GeneId>)> {
        let table = Table::from_delimited(path, Delimiter::Tab)?;
        Ok(with_ids(Self::parse_table(table)?))
    }

    fn filter_data(
        &self,
        data: &MethodResult,
        rule: SignificanceRule,
    ) -> PrioResult<(MethodResult, Vec<GeneId>)> {
        self.check_method(data)?;
        if rule != SignificanceRule::FlaggedSignificant {
            return Err(self.incompatible(rule));
        }
        let significant = data.filter(|record| {
            matches!(
                record.evidence(),
                Evidence::Depict {
                    fdr_significant: true,
                    ..
                }
            )
        });
        debug!(
            "{} of {} DEPICT genes pass the 5% FDR",
            significant.len(),
            data.len()
        );
        Ok(with_ids(significant))
    }
}
