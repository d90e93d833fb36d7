use std::path::Path;

use tracing::debug;

use crate::methods::{with_ids, Evidence, GeneRecord, Method, MethodResult};
use crate::methods::{PrioritizationMethod, SignificanceRule};
use crate::parser::{Delimiter, Table};
use crate::{GeneId, PrioResult};

const GENE_COLUMN: &str = "GENE";
const PVALUE_COLUMN: &str = "P";
const ZSTAT_COLUMN: &str = "ZSTAT";

/// [MAGMA](https://ctg.cncr.nl/software/magma) gene analysis
///
/// Expects the whitespace aligned `genes.out` file. Genes with a
/// p-value below the threshold are significant.
#[derive(Debug, Clone, Copy, Default)]
pub struct Magma;

impl Magma {
    /// Genes need a p-value below this value to be significant
    pub const DEFAULT_PVALUE_THRESHOLD: f64 = 1.084e-4;

    fn parse_table(table: &Table) -> PrioResult<MethodResult> {
        let gene = table.column(GENE_COLUMN)?;
        let pvalue = table.column(PVALUE_COLUMN)?;
        let zstat = table.optional_column(ZSTAT_COLUMN);

        let records = table
            .rows()
            .map(|row| {
                GeneRecord::new(
                    GeneId::from(row.get(gene)),
                    Evidence::Magma {
                        zstat: zstat.map_or(f64::NAN, |idx| row.float(idx)),
                        pvalue: row.float(pvalue),
                    },
                )
            })
            .collect();
        MethodResult::new(Method::Magma, records)
    }
}

impl PrioritizationMethod for Magma {
    fn method(&self) -> Method {
        Method::Magma
    }

    fn default_rule(&self) -> SignificanceRule {
        SignificanceRule::PValueBelow(Self::DEFAULT_PVALUE_THRESHOLD)
    }

    fn read_data(&self, path: &Path) -> PrioResult<(MethodResult, Vec<GeneId>)> {
        let table = Table::from_delimited(path, Delimiter::Whitespace)?;
        Ok(with_ids(Self::parse_table(&table)?))
    }

    fn filter_data(
        &self,
        data: &MethodResult,
        rule: SignificanceRule,
    ) -> PrioResult<(MethodResult, Vec<GeneId>)> {
        self.check_method(data)?;
        let SignificanceRule::PValueBelow(threshold) = rule else {
            return Err(self.incompatible(rule));
        };
        let significant = data.filter(|record| match record.evidence() {
            Evidence::Magma { pvalue, .. } => *pvalue < threshold,
            _ => false,
        });
        debug!(
            "{} of {} MAGMA genes have p < {}",
            significant.len(),
            data.len(),
            threshold
        );
        Ok(with_ids(significant))
    }
}
