//! Fisher's exact test on 2×2 contingency tables

use std::collections::HashSet;
use std::fmt::Display;

use tracing::warn;

use crate::stats::f64_from_u64;
use crate::stats::hypergeom::Hypergeometric;
use crate::GeneId;

/// Relative tolerance when comparing probabilities of the two-sided test
const RELATIVE_TOLERANCE: f64 = 1.0 + 1e-7;

/// The classification of all genes of the universe
///
/// A gene is *positive* if it is significant according to the
/// prioritization method and *true* if it is annotated with the HPO term.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ContingencyTable {
    true_positives: u64,
    false_negatives: u64,
    false_positives: u64,
    true_negatives: u64,
}

impl ContingencyTable {
    /// Constructs a new table from its four cells
    pub fn new(
        true_positives: u64,
        false_negatives: u64,
        false_positives: u64,
        true_negatives: u64,
    ) -> Self {
        Self {
            true_positives,
            false_negatives,
            false_positives,
            true_negatives,
        }
    }

    /// Significant genes that are annotated with the term
    pub fn true_positives(&self) -> u64 {
        self.true_positives
    }

    /// Genes annotated with the term that are not significant
    pub fn false_negatives(&self) -> u64 {
        self.false_negatives
    }

    /// Significant genes that are not annotated with the term
    pub fn false_positives(&self) -> u64 {
        self.false_positives
    }

    /// Genes that are neither significant nor annotated with the term
    pub fn true_negatives(&self) -> u64 {
        self.true_negatives
    }

    /// The number of genes in the table
    pub fn total(&self) -> u64 {
        self.true_positives + self.false_negatives + self.false_positives + self.true_negatives
    }

    /// The table as 2×2 matrix
    ///
    /// Rows are *not significant* / *significant*, columns are
    /// *not in HPO term* / *in HPO term*:
    ///
    /// ```text
    /// [[tn, fn],
    ///  [fp, tp]]
    /// ```
    pub fn as_matrix(&self) -> [[u64; 2]; 2] {
        [
            [self.true_negatives, self.false_negatives],
            [self.false_positives, self.true_positives],
        ]
    }

    /// `TP / (TP + FP)`
    ///
    /// Returns `NaN` if there are no significant genes
    pub fn precision(&self) -> f64 {
        f64_from_u64(self.true_positives)
            / f64_from_u64(self.true_positives + self.false_positives)
    }

    /// `TP / (TP + FN)`
    ///
    /// Returns `NaN` if no gene is annotated with the term
    pub fn recall(&self) -> f64 {
        f64_from_u64(self.true_positives)
            / f64_from_u64(self.true_positives + self.false_negatives)
    }

    /// Runs the two-sided [`fishers_exact_test`] on the table
    pub fn fishers_exact_test(&self) -> FisherResult {
        fishers_exact_test(&self.as_matrix())
    }
}

impl Display for ContingencyTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:<16}{:>16}{:>16}", "", "not in HPO term", "in HPO term")?;
        writeln!(
            f,
            "{:<16}{:>16}{:>16}",
            "not significant", self.true_negatives, self.false_negatives
        )?;
        write!(
            f,
            "{:<16}{:>16}{:>16}",
            "significant", self.false_positives, self.true_positives
        )
    }
}

/// Splits the `universe` into a [`ContingencyTable`]
///
/// Every gene of the universe is counted once per occurrence. Both
/// `significant` and `term_genes` are expected to be subsets of the
/// universe, genes outside of it are not counted.
///
/// # Examples
///
/// ```
/// use geneprio::{create_fisher_table, GeneId};
///
/// let universe: Vec<GeneId> = ["A", "B", "C", "D", "E"].into_iter().map(GeneId::from).collect();
/// let significant = vec![GeneId::from("A"), GeneId::from("B")];
/// let term = vec![GeneId::from("B"), GeneId::from("C")];
///
/// let table = create_fisher_table(&universe, &significant, &term);
/// assert_eq!(table.true_positives(), 1);
/// assert_eq!(table.false_positives(), 1);
/// assert_eq!(table.false_negatives(), 1);
/// assert_eq!(table.true_negatives(), 2);
/// assert_eq!(table.as_matrix(), [[2, 1], [1, 1]]);
/// ```
pub fn create_fisher_table(
    universe: &[GeneId],
    significant: &[GeneId],
    term_genes: &[GeneId],
) -> ContingencyTable {
    let significant: HashSet<&GeneId> = significant.iter().collect();
    let term_genes: HashSet<&GeneId> = term_genes.iter().collect();

    let mut table = ContingencyTable::default();
    for gene in universe {
        match (significant.contains(gene), term_genes.contains(gene)) {
            (true, true) => table.true_positives += 1,
            (true, false) => table.false_positives += 1,
            (false, true) => table.false_negatives += 1,
            (false, false) => table.true_negatives += 1,
        }
    }

    let universe: HashSet<&GeneId> = universe.iter().collect();
    let outside = significant.difference(&universe).count();
    if outside > 0 {
        warn!("{} significant genes are not part of the universe", outside);
    }
    table
}

/// The alternative hypothesis of [`fishers_exact_test_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alternative {
    /// The odds ratio differs from 1
    #[default]
    TwoSided,
    /// The odds ratio is greater than 1
    Greater,
    /// The odds ratio is less than 1
    Less,
}

/// Odds ratio and p-value of a Fisher's exact test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FisherResult {
    odds_ratio: f64,
    pvalue: f64,
}

impl FisherResult {
    /// The sample odds ratio `(a * d) / (b * c)`
    ///
    /// `+inf` if `b * c` is 0, `NaN` if the table has an empty row or column
    pub fn odds_ratio(&self) -> f64 {
        self.odds_ratio
    }

    /// The probability to observe the table (or a more extreme one) by chance
    pub fn pvalue(&self) -> f64 {
        self.pvalue
    }
}

/// Two-sided Fisher's exact test of a 2×2 table `[[a, b], [c, d]]`
///
/// The p-value is the sum of the probabilities of all tables with the same
/// margins that are at most as likely as the observed table.
///
/// Tables with an empty row or column carry no information: the odds ratio
/// is `NaN` and the p-value `1.0`.
///
/// # Examples
///
/// ```
/// use geneprio::fishers_exact_test;
///
/// let result = fishers_exact_test(&[[6, 2], [1, 4]]);
/// assert!((result.odds_ratio() - 12.0).abs() < f64::EPSILON);
/// assert!((result.pvalue() - 0.102_564_102_564).abs() < 1e-9);
/// ```
pub fn fishers_exact_test(table: &[[u64; 2]; 2]) -> FisherResult {
    fishers_exact_test_with(table, Alternative::TwoSided)
}

/// Fisher's exact test of a 2×2 table `[[a, b], [c, d]]` with a choice of
/// the alternative hypothesis
///
/// - [`Alternative::Greater`]: `P(X >= a)`
/// - [`Alternative::Less`]: `P(X <= a)`
/// - [`Alternative::TwoSided`]: see [`fishers_exact_test`]
pub fn fishers_exact_test_with(table: &[[u64; 2]; 2], alternative: Alternative) -> FisherResult {
    let [[a, b], [c, d]] = *table;
    if a + b == 0 || c + d == 0 || a + c == 0 || b + d == 0 {
        return FisherResult {
            odds_ratio: f64::NAN,
            pvalue: 1.0,
        };
    }

    let odds_ratio = if b == 0 || c == 0 {
        f64::INFINITY
    } else {
        (f64_from_u64(a) * f64_from_u64(d)) / (f64_from_u64(b) * f64_from_u64(c))
    };

    let dist = Hypergeometric::from_table(table);
    let pvalue = match alternative {
        Alternative::Greater => match a.checked_sub(1) {
            Some(x) => dist.sf(x),
            None => 1.0,
        },
        Alternative::Less => dist.cdf(a),
        Alternative::TwoSided => {
            let observed = dist.pmf(a) * RELATIVE_TOLERANCE;
            dist.support()
                .map(|(_, p)| p)
                .filter(|p| *p <= observed)
                .sum::<f64>()
                .min(1.0)
        }
    };

    FisherResult { odds_ratio, pvalue }
}

/// The sizes of the two gene sets that are compared and of their intersection
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VennCounts {
    significant: usize,
    term_genes: usize,
    shared: usize,
}

impl VennCounts {
    /// Counts the distinct genes of both sets and their intersection
    pub fn new(significant: &[GeneId], term_genes: &[GeneId]) -> Self {
        let significant: HashSet<&GeneId> = significant.iter().collect();
        let term_genes: HashSet<&GeneId> = term_genes.iter().collect();
        Self {
            significant: significant.len(),
            term_genes: term_genes.len(),
            shared: significant.intersection(&term_genes).count(),
        }
    }

    /// Distinct significant genes
    pub fn significant(&self) -> usize {
        self.significant
    }

    /// Distinct genes annotated with the HPO term
    pub fn term_genes(&self) -> usize {
        self.term_genes
    }

    /// Genes that are significant and annotated with the HPO term
    pub fn shared(&self) -> usize {
        self.shared
    }

    /// Significant genes that are not annotated with the HPO term
    pub fn only_significant(&self) -> usize {
        self.significant - self.shared
    }

    /// Genes annotated with the HPO term that are not significant
    pub fn only_term(&self) -> usize {
        self.term_genes - self.shared
    }
}
