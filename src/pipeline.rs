//! Evaluation of prioritization results against HPO terms
//!
//! A trait is evaluated either against a single HPO term
//! ([`evaluate_trait`]) or against a list of HPO terms ([`evaluate_terms`]).
//! Both share the same preparation, see [`TraitData`].

use std::path::Path;

use tracing::{debug, info, warn};

use crate::hpo::TermInfo;
use crate::stats::fisher::{create_fisher_table, ContingencyTable, FisherResult, VennCounts};
use crate::{get_overlap, GeneId, HpoReference, HpoTermId, Method, Overlap};
use crate::{PrioError, PrioResult, SignificanceRule};

#[cfg_attr(doc, aquamarine::aquamarine)]
/// The prioritized genes of one trait that are part of the HPO reference
///
/// Building the `TraitData` runs the shared preparation of every evaluation:
///
/// ```mermaid
/// flowchart LR
///     A[result file] -->|read_data| B[MethodResult + genes]
///     H[HpoReference] --> C
///     B -->|get_overlap| C[Overlap]
///     C -->|get_overlap_genes| D[overlap records]
///     D -->|filter_data| E[significant genes]
/// ```
#[derive(Debug, Clone)]
pub struct TraitData {
    method: Method,
    overlap: Overlap,
    significant: Vec<GeneId>,
}

impl TraitData {
    /// Reads the result of `method` and selects the significant genes
    /// that are part of the HPO reference
    ///
    /// # Errors
    ///
    /// All errors of [`crate::PrioritizationMethod::read_data`] and
    /// [`crate::PrioritizationMethod::filter_data`]
    pub fn load(
        hpo: &HpoReference,
        method: Method,
        rule: SignificanceRule,
        file: &Path,
    ) -> PrioResult<Self> {
        let adapter = method.adapter();
        let (data, genes) = adapter.read_data(file)?;
        let overlap = get_overlap(hpo, &genes);
        let overlap_records = adapter.get_overlap_genes(&data, overlap.genes());
        let (_, significant) = adapter.filter_data(&overlap_records, rule)?;

        info!(
            "{}: {} of {} {} genes are in the HPO reference, {} significant ({})",
            file.display(),
            overlap.count(),
            genes.len(),
            method,
            significant.len(),
            rule
        );
        Ok(Self {
            method,
            overlap,
            significant,
        })
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn overlap(&self) -> &Overlap {
        &self.overlap
    }

    /// The significant genes, in the order returned by the method
    pub fn significant(&self) -> &[GeneId] {
        &self.significant
    }
}

/// The Fisher test of one trait against one HPO term
#[derive(Debug, Clone)]
pub struct TraitEvaluation {
    name: String,
    method: Method,
    term: HpoTermId,
    table: ContingencyTable,
    result: FisherResult,
    venn: VennCounts,
}

impl TraitEvaluation {
    /// The name of the trait
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn term(&self) -> HpoTermId {
        self.term
    }

    pub fn table(&self) -> &ContingencyTable {
        &self.table
    }

    pub fn result(&self) -> &FisherResult {
        &self.result
    }

    /// Sizes of the significant genes, the genes of the term and their intersection
    pub fn venn(&self) -> &VennCounts {
        &self.venn
    }
}

/// Tests whether the significant genes of a trait are enriched in the genes
/// of the HPO `term`
///
/// The universe of the test are the genes of the prioritization result that are
/// part of the reference. The genes of the term are taken from the full reference,
/// genes outside of the universe only show up in the [`VennCounts`].
///
/// # Errors
///
/// - All errors of [`TraitData::load`]
/// - [`PrioError::UnknownTerm`] if `term` is not part of the reference
pub fn evaluate_trait(
    hpo: &HpoReference,
    method: Method,
    rule: SignificanceRule,
    name: &str,
    file: &Path,
    term: HpoTermId,
) -> PrioResult<TraitEvaluation> {
    let data = TraitData::load(hpo, method, rule, file)?;
    let (_, term_genes) = hpo.get_data_hpo_term(term)?;

    let table = create_fisher_table(data.overlap.genes(), &data.significant, &term_genes);
    let result = table.fishers_exact_test();
    debug!(
        "{} / {}: odds ratio {}, p-value {}",
        name,
        term,
        result.odds_ratio(),
        result.pvalue()
    );

    Ok(TraitEvaluation {
        name: name.to_string(),
        method,
        term,
        table,
        result,
        venn: VennCounts::new(&data.significant, &term_genes),
    })
}

/// The Fisher test of one trait against one of many HPO terms
#[derive(Debug, Clone)]
pub struct TermEnrichment {
    info: TermInfo,
    table: ContingencyTable,
    result: FisherResult,
}

impl TermEnrichment {
    pub fn term(&self) -> HpoTermId {
        self.info.term()
    }

    pub fn description(&self) -> &str {
        self.info.description()
    }

    pub fn table(&self) -> &ContingencyTable {
        &self.table
    }

    pub fn result(&self) -> &FisherResult {
        &self.result
    }
}

/// Tests the significant genes of a trait against every term of `terms`
///
/// The universe of all tests are the distinct genes of the reference that are
/// part of the prioritization result. If `terms` is empty, every term of the
/// reference is tested. Terms that are not part of the reference are
/// skipped with a warning.
///
/// The results are returned in the order of `terms`.
///
/// # Errors
///
/// All errors of [`TraitData::load`]
pub fn evaluate_terms(
    hpo: &HpoReference,
    method: Method,
    rule: SignificanceRule,
    file: &Path,
    terms: &[TermInfo],
) -> PrioResult<Vec<TermEnrichment>> {
    let data = TraitData::load(hpo, method, rule, file)?;
    let overlap_hpo = data.overlap.hpo();
    let universe: Vec<GeneId> = overlap_hpo.genes().cloned().collect();

    let all_terms: Vec<TermInfo>;
    let terms = if terms.is_empty() {
        all_terms = hpo
            .terms()
            .iter()
            .map(|term| TermInfo::new(*term, String::new()))
            .collect();
        all_terms.as_slice()
    } else {
        terms
    };

    let mut enrichments = Vec::with_capacity(terms.len());
    for info in terms {
        let term_genes = match overlap_hpo.get_data_hpo_term(info.term()) {
            Ok((_, genes)) => genes,
            Err(PrioError::UnknownTerm(term)) => {
                warn!("Skipping {}, it is not part of the HPO reference", term);
                continue;
            }
            Err(err) => return Err(err),
        };
        let table = create_fisher_table(&universe, &data.significant, &term_genes);
        enrichments.push(TermEnrichment {
            info: info.clone(),
            result: table.fishers_exact_test(),
            table,
        });
    }
    info!(
        "Tested {} HPO terms for {}",
        enrichments.len(),
        file.display()
    );
    Ok(enrichments)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;

    fn reference() -> HpoReference {
        let tall = HpoTermId::from(98u32);
        let seizure = HpoTermId::from(1250u32);
        let mut reference = HpoReference::new(vec![tall, seizure]);
        reference.add_gene(GeneId::from("GeneA"), [tall]);
        reference.add_gene(GeneId::from("GeneB"), [tall, seizure]);
        reference.add_gene(GeneId::from("GeneC"), [seizure]);
        reference.add_gene(GeneId::from("GeneD"), []);
        reference.add_gene(GeneId::from("GeneE"), [tall]);
        reference
    }

    fn netwas_file(dir: &Path) -> PathBuf {
        let path = dir.join("netwas.csv");
        std::fs::write(
            &path,
            "ensemble_id,label,netwas_score\n\
             GeneA,1,0.9\n\
             GeneB,1,0.8\n\
             GeneC,-1,0.1\n\
             GeneD,-1,0.2\n\
             GeneX,1,0.95\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn load_trait() {
        let dir = tempfile::tempdir().unwrap();
        let data = TraitData::load(
            &reference(),
            Method::NetWas,
            SignificanceRule::ScoreAbove(0.5),
            &netwas_file(dir.path()),
        )
        .unwrap();
        assert_eq!(data.overlap().count(), 4);
        // GeneX is significant, but not part of the reference
        assert_eq!(data.significant(), &[GeneId::from("GeneA"), GeneId::from("GeneB")]);
    }

    #[test]
    fn single_term() {
        let dir = tempfile::tempdir().unwrap();
        let evaluation = evaluate_trait(
            &reference(),
            Method::NetWas,
            SignificanceRule::ScoreAbove(0.5),
            "height",
            &netwas_file(dir.path()),
            HpoTermId::from(98u32),
        )
        .unwrap();

        let table = evaluation.table();
        assert_eq!(table.true_positives(), 2);
        assert_eq!(table.false_positives(), 0);
        assert_eq!(table.false_negatives(), 0);
        assert_eq!(table.true_negatives(), 2);
        assert!(evaluation.result().odds_ratio().is_infinite());

        // GeneE is annotated, but was not tested by NetWAS
        assert_eq!(evaluation.venn().term_genes(), 3);
        assert_eq!(evaluation.venn().shared(), 2);
        assert_eq!(evaluation.name(), "height");
    }

    #[test]
    fn single_unknown_term() {
        let dir = tempfile::tempdir().unwrap();
        let result = evaluate_trait(
            &reference(),
            Method::NetWas,
            SignificanceRule::ScoreAbove(0.5),
            "height",
            &netwas_file(dir.path()),
            HpoTermId::from(1u32),
        );
        assert!(matches!(result, Err(PrioError::UnknownTerm(_))));
    }

    #[test]
    fn wrong_rule() {
        let dir = tempfile::tempdir().unwrap();
        let result = TraitData::load(
            &reference(),
            Method::NetWas,
            SignificanceRule::TopRanked(2),
            &netwas_file(dir.path()),
        );
        assert!(matches!(result, Err(PrioError::IncompatibleRule { .. })));
    }

    #[test]
    fn multiple_terms() {
        let dir = tempfile::tempdir().unwrap();
        let terms = vec![
            TermInfo::new(HpoTermId::from(1250u32), "Seizure".to_string()),
            TermInfo::new(HpoTermId::from(1u32), "All".to_string()),
            TermInfo::new(HpoTermId::from(98u32), "Tall stature".to_string()),
        ];
        let enrichments = evaluate_terms(
            &reference(),
            Method::NetWas,
            SignificanceRule::ScoreAbove(0.5),
            &netwas_file(dir.path()),
            &terms,
        )
        .unwrap();

        assert_eq!(enrichments.len(), 2);
        assert_eq!(enrichments[0].term(), HpoTermId::from(1250u32));
        assert_eq!(enrichments[0].description(), "Seizure");
        assert_eq!(enrichments[0].table().true_positives(), 1);
        assert_eq!(enrichments[0].table().false_negatives(), 1);
        assert_eq!(enrichments[0].table().total(), 4);
        assert_eq!(enrichments[1].term(), HpoTermId::from(98u32));
    }

    #[test]
    fn all_reference_terms() {
        let dir = tempfile::tempdir().unwrap();
        let enrichments = evaluate_terms(
            &reference(),
            Method::NetWas,
            SignificanceRule::ScoreAbove(0.5),
            &netwas_file(dir.path()),
            &[],
        )
        .unwrap();
        assert_eq!(enrichments.len(), 2);
        assert_eq!(enrichments[0].description(), "");
    }
}
