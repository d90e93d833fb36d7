use std::path::Path;

use tracing::debug;

use crate::methods::{with_ids, Evidence, GeneRecord, Method, MethodResult};
use crate::methods::{PrioritizationMethod, SignificanceRule};
use crate::parser::{Delimiter, Table};
use crate::{GeneId, PrioResult};

const GENE_COLUMN: &str = "ensemble_id";
const SCORE_COLUMN: &str = "netwas_score";
const LABEL_COLUMN: &str = "label";

/// [NetWAS](https://hb.flatironinstitute.org/netwas) network-reprioritized GWAS genes
///
/// Expects a comma separated file with the columns `ensemble_id`,
/// `netwas_score` and (optionally) `label`. Genes with a NetWAS score
/// above the threshold are significant.
///
/// # Examples
///
/// ```
/// use geneprio::methods::NetWas;
/// use geneprio::{GeneId, PrioritizationMethod, SignificanceRule};
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("netwas.csv");
/// std::fs::write(&path, "ensemble_id,label,netwas_score\nGeneA,1,0.6\nGeneB,1,0.3\n").unwrap();
///
/// let (data, genes) = NetWas.read_data(&path).unwrap();
/// assert_eq!(genes.len(), 2);
///
/// let (_, significant) = NetWas.filter_data(&data, SignificanceRule::ScoreAbove(0.5)).unwrap();
/// assert_eq!(significant, vec![GeneId::from("GeneA")]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NetWas;

impl NetWas {
    /// Genes need a NetWAS score above this value to be significant
    pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.5;

    fn parse_table(table: &Table) -> PrioResult<MethodResult> {
        let gene = table.column(GENE_COLUMN)?;
        let score = table.column(SCORE_COLUMN)?;
        let label = table.optional_column(LABEL_COLUMN);

        let records = table
            .rows()
            .map(|row| {
                GeneRecord::new(
                    GeneId::from(row.get(gene)),
                    Evidence::NetWas {
                        label: label.and_then(|idx| row.get(idx).trim().parse::<i64>().ok()),
                        score: row.float(score),
                    },
                )
            })
            .collect();
        MethodResult::new(Method::NetWas, records)
    }
}

impl PrioritizationMethod for NetWas {
    fn method(&self) -> Method {
        Method::NetWas
    }

    fn default_rule(&self) -> SignificanceRule {
        SignificanceRule::ScoreAbove(Self::DEFAULT_SCORE_THRESHOLD)
    }

    fn read_data(&self, path: &Path) -> PrioResult<(MethodResult, Vec<GeneId>)> {
        let table = Table::from_delimited(path, Delimiter::Comma)?;
        Ok(with_ids(Self::parse_table(&table)?))
    }

    fn filter_data(
        &self,
        data: &MethodResult,
        rule: SignificanceRule,
    ) -> PrioResult<(MethodResult, Vec<GeneId>)> {
        self.check_method(data)?;
        let SignificanceRule::ScoreAbove(threshold) = rule else {
            return Err(self.incompatible(rule));
        };
        let significant = data.filter(|record| match record.evidence() {
            Evidence::NetWas { score, .. } => *score > threshold,
            _ => false,
        });
        debug!(
            "{} of {} NetWAS genes have a score > {}",
            significant.len(),
            data.len(),
            threshold
        );
        Ok(with_ids(significant))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::PrioError;

    fn table() -> Table {
        Table::new(
            "netwas.csv",
            &["ensemble_id", "label", "netwas_score"],
            &[&["GeneA", "1", "0.6"], &["GeneB", "1", "0.3"], &["GeneC", "-1", "0.5"]],
        )
    }

    #[test]
    fn parse() {
        let data = NetWas::parse_table(&table()).unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(
            data.records()[2].evidence(),
            &Evidence::NetWas {
                label: Some(-1),
                score: 0.5
            }
        );
    }

    #[test]
    fn missing_score_column() {
        let table = Table::new("netwas.csv", &["ensemble_id", "label"], &[&["GeneA", "1"]]);
        assert!(matches!(
            NetWas::parse_table(&table),
            Err(PrioError::FileFormat { .. })
        ));
    }

    #[test]
    fn filter_is_strictly_above_threshold() {
        let data = NetWas::parse_table(&table()).unwrap();
        let (significant, genes) = NetWas
            .filter_data(&data, SignificanceRule::ScoreAbove(0.5))
            .unwrap();
        assert_eq!(genes, vec![GeneId::from("GeneA")]);
        assert_eq!(significant.len(), 1);
    }

    #[test]
    fn default_rule() {
        let data = NetWas::parse_table(&table()).unwrap();
        let (_, genes) = NetWas.filter_data(&data, NetWas.default_rule()).unwrap();
        assert_eq!(genes, vec![GeneId::from("GeneA")]);
    }

    #[test]
    fn reject_other_rules() {
        let data = NetWas::parse_table(&table()).unwrap();
        assert!(matches!(
            NetWas.filter_data(&data, SignificanceRule::TopRanked(1)),
            Err(PrioError::IncompatibleRule { .. })
        ));
    }
}
