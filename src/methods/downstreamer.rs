use std::path::Path;

use tracing::debug;

use crate::methods::{with_ids, Evidence, GeneRecord, Method, MethodResult};
use crate::methods::{PrioritizationMethod, SignificanceRule};
use crate::parser::{is_spreadsheet, Delimiter, Table};
use crate::{GeneId, PrioResult};

const GENE_COLUMN: &str = "Gene ID";
const FDR_COLUMN: &str = "FDR 5% significant";
const ZSCORE_COLUMN: &str = "Enrichment Z-score";

/// [Downstreamer](https://github.com/molgenis/systemsgenetics/wiki/Downstreamer) gene prioritization
///
/// Downstreamer writes an Excel workbook, the genes are listed in the
/// sheet `GenePrioritization`. A tab separated export of that sheet
/// is accepted as well. Genes flagged in the `FDR 5% significant` column
/// are significant.
#[derive(Debug, Clone, Copy, Default)]
pub struct Downstreamer;

impl Downstreamer {
    /// The workbook sheet that holds the gene prioritization
    pub const SHEET: &'static str = "GenePrioritization";

    fn parse_table(table: &Table) -> PrioResult<MethodResult> {
        let gene = table.column(GENE_COLUMN)?;
        let fdr = table.column(FDR_COLUMN)?;
        let zscore = table.optional_column(ZSCORE_COLUMN);

        let records = table
            .rows()
            .map(|row| {
                GeneRecord::new(
                    GeneId::from(row.get(gene)),
                    Evidence::Downstreamer {
                        zscore: zscore.map_or(f64::NAN, |idx| row.float(idx)),
                        fdr_significant: row.flag(fdr),
                    },
                )
            })
            .collect();
        MethodResult::new(Method::Downstreamer, records)
    }
}

impl PrioritizationMethod for Downstreamer {
    fn method(&self) -> Method {
        Method::Downstreamer
    }

    fn default_rule(&self) -> SignificanceRule {
        SignificanceRule::FlaggedSignificant
    }

    fn read_data(&self, path: &Path) -> PrioResult<(MethodResult, Vec<GeneId>)> {
        let table = if is_spreadsheet(path) {
            Table::from_sheet(path, Self::SHEET)?
        } else {
            Table::from_delimited(path, Delimiter::Tab)?
        };
        Ok(with_ids(Self::parse_table(&table)?))
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
                Evidence::Downstreamer {
                    fdr_significant: true,
                    ..
                }
            )
        });
        debug!(
            "{} of {} Downstreamer genes are significant at 5% FDR",
            significant.len(),
            data.len()
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
            "downstreamer.tsv",
            &["Gene ID", "Gene symbol", "Enrichment Z-score", "FDR 5% significant"],
            &[
                &["ENSG1", "A", "4.2", "true"],
                &["ENSG2", "B", "0.1", "false"],
                &["ENSG3", "C", "3.9", "TRUE"],
            ],
        )
    }

    #[test]
    fn flagged_genes() {
        let data = Downstreamer::parse_table(&table()).unwrap();
        let (_, genes) = Downstreamer
            .filter_data(&data, Downstreamer.default_rule())
            .unwrap();
        assert_eq!(genes, vec![GeneId::from("ENSG1"), GeneId::from("ENSG3")]);
    }

    #[test]
    fn zscore_is_optional() {
        let table = Table::new(
            "downstreamer.tsv",
            &["Gene ID", "FDR 5% significant"],
            &[&["ENSG1", "true"]],
        );
        let data = Downstreamer::parse_table(&table).unwrap();
        match data.records()[0].evidence() {
            Evidence::Downstreamer {
                zscore,
                fdr_significant,
            } => {
                assert!(zscore.is_nan());
                assert!(*fdr_significant);
            }
            _ => panic!("expected Downstreamer evidence"),
        }
    }

    #[test]
    fn missing_gene_column() {
        let table = Table::new("downstreamer.tsv", &["Gene", "FDR 5% significant"], &[]);
        assert!(matches!(
            Downstreamer::parse_table(&table),
            Err(PrioError::FileFormat { .. })
        ));
    }

    #[test]
    fn read_tsv_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("downstreamer.txt");
        std::fs::write(
            &path,
            "Gene ID\tEnrichment Z-score\tFDR 5% significant\nENSG1\t2.5\ttrue\nENSG2\t0.3\tfalse\n",
        )
        .unwrap();
        let (data, genes) = Downstreamer.read_data(&path).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(genes[1], GeneId::from("ENSG2"));
    }

    #[test]
    fn read_workbook_sheet() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("example_data")
            .join("height_downstreamer.xlsx");
        let (data, genes) = Downstreamer.read_data(&path).unwrap();
        assert_eq!(data.len(), 6);
        assert_eq!(genes[0], GeneId::from("ENSG00000000003"));

        match data.records()[0].evidence() {
            Evidence::Downstreamer {
                zscore,
                fdr_significant,
            } => {
                assert!((zscore - 4.5).abs() < f64::EPSILON);
                assert!(*fdr_significant);
            }
            _ => panic!("expected Downstreamer evidence"),
        }
        match data.records()[2].evidence() {
            Evidence::Downstreamer {
                zscore,
                fdr_significant,
            } => {
                assert!((zscore - 0.25).abs() < f64::EPSILON);
                assert!(!*fdr_significant);
            }
            _ => panic!("expected Downstreamer evidence"),
        }

        let (_, significant) = Downstreamer
            .filter_data(&data, Downstreamer.default_rule())
            .unwrap();
        assert_eq!(
            significant,
            vec![
                GeneId::from("ENSG00000000003"),
                GeneId::from("ENSG00000000005"),
                GeneId::from("ENSG00000001036")
            ]
        );
    }

    #[test]
    fn missing_workbook() {
        let result = Downstreamer.read_data(Path::new("does/not/exist.xlsx"));
        assert!(result.is_err());
    }
}
