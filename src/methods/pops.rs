use std::cmp::Ordering;
use std::path::Path;

use tracing::debug;

use crate::methods::{with_ids, Evidence, GeneRecord, Method, MethodResult};
use crate::methods::{PrioritizationMethod, SignificanceRule};
use crate::parser::{Delimiter, Table};
use crate::{GeneId, PrioResult};

const GENE_COLUMN: &str = "ENSGID";
const SCORE_COLUMN: &str = "PoPS_Score";

/// [PoPS](https://github.com/FinucaneLab/pops) polygenic priority scores
///
/// Expects the tab separated `.preds` output with the columns `ENSGID`
/// and `PoPS_Score`. The N highest scored genes are significant.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pops;

impl Pops {
    /// The number of top scored genes that are significant
    pub const DEFAULT_TOP_GENES: usize = 500;

    fn parse_table(table: &Table) -> PrioResult<MethodResult> {
        let gene = table.column(GENE_COLUMN)?;
        let score = table.column(SCORE_COLUMN)?;

        let records = table
            .rows()
            .map(|row| {
                GeneRecord::new(
                    GeneId::from(row.get(gene)),
                    Evidence::Pops {
                        score: row.float(score),
                    },
                )
            })
            .collect();
        MethodResult::new(Method::Pops, records)
    }
}

/// Orders scores descending, `NaN` always last
fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

fn score(record: &GeneRecord) -> f64 {
    match record.evidence() {
        Evidence::Pops { score } => *score,
        _ => f64::NAN,
    }
}

impl PrioritizationMethod for Pops {
    fn method(&self) -> Method {
        Method::Pops
    }

    fn default_rule(&self) -> SignificanceRule {
        SignificanceRule::TopRanked(Self::DEFAULT_TOP_GENES)
    }

    fn read_data(&self, path: &Path) -> PrioResult<(MethodResult, Vec<GeneId>)> {
        let table = Table::from_delimited(path, Delimiter::Tab)?;
        Ok(with_ids(Self::parse_table(&table)?))
    }

    /// Returns the top N genes, ordered by descending score
    ///
    /// The sort is stable, genes with the same score keep their input order.
    fn filter_data(
        &self,
        data: &MethodResult,
        rule: SignificanceRule,
    ) -> PrioResult<(MethodResult, Vec<GeneId>)> {
        self.check_method(data)?;
        let SignificanceRule::TopRanked(n) = rule else {
            return Err(self.incompatible(rule));
        };
        let mut ranked: Vec<&GeneRecord> = data.iter().collect();
        ranked.sort_by(|a, b| descending(score(a), score(b)));

        let top: Vec<GeneRecord> = ranked.into_iter().take(n).cloned().collect();
        debug!("Selected the top {} of {} PoPS genes", top.len(), data.len());
        Ok(with_ids(data.derive(top)))
    }
}
