//! Statistical tests for the enrichment of significant genes in HPO terms
//!
//! The genes of the overlap between a prioritization result and the HPO
//! reference are split into a 2×2 contingency table:
//!
//! |                 | not in HPO term | in HPO term |
//! | --------------- | --------------- | ----------- |
//! | not significant | true negative   | false negative |
//! | significant     | false positive  | true positive  |
//!
//! [`fisher::fishers_exact_test`] then calculates the odds ratio and the
//! probability of the observed (or a more extreme) distribution, based on the
//! [hypergeometric distribution](`hypergeom::Hypergeometric`).

pub mod fisher;
pub mod hypergeom;

/// Counts are converted to `f64` for ratios and probabilities
///
/// Gene counts are far below 2^52, the conversion is exact.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn f64_from_u64(n: u64) -> f64 {
    n as f64
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn convert_counts() {
        assert!((f64_from_u64(0) - 0.0).abs() < f64::EPSILON);
        assert!((f64_from_u64(20_000) - 20_000.0).abs() < f64::EPSILON);
    }
}
