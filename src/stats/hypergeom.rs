//! The hypergeometric distribution, evaluated in log space
//!
//! Factorials of the population sizes used here (tens of thousands of genes)
//! overflow `f64` by far, so all probabilities are derived from
//! [`ln_binomial`] and only exponentiated at the end.

use std::cmp;

use statrs::function::factorial::ln_binomial;

use crate::{PrioError, PrioResult};

/// Hypergeometric distribution with a population (N), a number of
/// successes in the population (K) and a number of draws (n)
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Hypergeometric {
    population: u64,
    successes: u64,
    draws: u64,
}

impl Hypergeometric {
    /// Constructs a new hypergeometric distribution
    /// with a population (N) of `population`, number
    /// of successes (K) of `successes`, and number of draws
    /// (n) of `draws`
    ///
    /// # Errors
    ///
    /// [`PrioError::InvalidInput`] if `successes > population` or `draws > population`
    pub fn new(population: u64, successes: u64, draws: u64) -> PrioResult<Hypergeometric> {
        if successes > population || draws > population {
            Err(PrioError::InvalidInput(format!(
                "invalid hypergeometric parameters N={population}, K={successes}, n={draws}"
            )))
        } else {
            Ok(Hypergeometric {
                population,
                successes,
                draws,
            })
        }
    }

    /// The distribution of the top left cell of a 2×2 table, given its margins
    ///
    /// The first row sum are the successes, the first column sum the draws.
    pub fn from_table(table: &[[u64; 2]; 2]) -> Hypergeometric {
        let [[a, b], [c, d]] = *table;
        Hypergeometric {
            population: a + b + c + d,
            successes: a + b,
            draws: a + c,
        }
    }

    /// Returns the minimum value in the support
    ///
    /// # Formula
    ///
    /// ```text
    /// max(0, n + K - N)
    /// ```
    pub fn min(&self) -> u64 {
        (self.draws + self.successes).saturating_sub(self.population)
    }

    /// Returns the maximum value in the support
    ///
    /// # Formula
    ///
    /// ```text
    /// min(K, n)
    /// ```
    pub fn max(&self) -> u64 {
        cmp::min(self.successes, self.draws)
    }

    /// The natural logarithm of the probability mass function at `x`
    ///
    /// # Formula
    ///
    /// ```text
    /// ln( (K choose x) * (N-K choose n-x) / (N choose n) )
    /// ```
    ///
    /// Returns `f64::NEG_INFINITY` outside of the support
    pub fn ln_pmf(&self, x: u64) -> f64 {
        if x < self.min() || x > self.max() {
            return f64::NEG_INFINITY;
        }
        ln_binomial(self.successes, x)
            + ln_binomial(self.population - self.successes, self.draws - x)
            - ln_binomial(self.population, self.draws)
    }

    /// The probability mass function at `x`
    pub fn pmf(&self, x: u64) -> f64 {
        self.ln_pmf(x).exp()
    }

    /// The cumulative distribution function, `P(X <= x)`
    pub fn cdf(&self, x: u64) -> f64 {
        if x < self.min() {
            0.0
        } else if x >= self.max() {
            1.0
        } else {
            (self.min()..=x).map(|k| self.pmf(k)).sum::<f64>().min(1.0)
        }
    }

    /// The survival function, `P(X > x)`
    ///
    /// Calculated as a discrete integral over the probability mass
    /// function evaluated from (x+1)..max
    pub fn sf(&self, x: u64) -> f64 {
        if x < self.min() {
            1.0
        } else if x >= self.max() {
            0.0
        } else {
            ((x + 1)..=self.max())
                .map(|k| self.pmf(k))
                .sum::<f64>()
                .min(1.0)
        }
    }

    /// Iterates all values of the support together with their probability
    pub fn support(&self) -> impl Iterator<Item = (u64, f64)> + '_ {
        (self.min()..=self.max()).map(|k| (k, self.pmf(k)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use statrs::distribution::{Discrete, Hypergeometric as Reference};

    #[test]
    fn build() {
        assert!(Hypergeometric::new(2, 2, 2).is_ok());
        assert!(Hypergeometric::new(2, 3, 2).is_err());
        assert!(Hypergeometric::new(2, 1, 3).is_err());
    }

    #[test]
    fn support_bounds() {
        let hyper = Hypergeometric::new(50, 25, 30).unwrap();
        assert_eq!(hyper.min(), 5);
        assert_eq!(hyper.max(), 25);

        let hyper = Hypergeometric::new(50, 10, 13).unwrap();
        assert_eq!(hyper.min(), 0);
        assert_eq!(hyper.max(), 10);
    }

    #[test]
    fn pmf_matches_statrs() {
        let hyper = Hypergeometric::new(50, 25, 13).unwrap();
        let reference = Reference::new(50, 25, 13).unwrap();
        for x in 0..=13 {
            assert!((hyper.pmf(x) - reference.pmf(x)).abs() < 1e-12, "x = {x}");
        }
        assert!(hyper.pmf(14) < f64::EPSILON);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let hyper = Hypergeometric::new(20_000, 300, 1_500).unwrap();
        let total: f64 = hyper.support().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn tails() {
        // Numbers calculated here https://statisticsbyjim.com/probability/hypergeometric-distribution/
        let hyper = Hypergeometric::new(50, 25, 13).unwrap();
        assert!((hyper.sf(1) - 0.999_618_983_254_245_1).abs() < 1e-12);
        assert!((hyper.sf(7) - 0.260_097_374_777_385_37).abs() < 1e-12);
        assert!(hyper.sf(13) < f64::EPSILON);

        assert!((hyper.cdf(7) + hyper.sf(7) - 1.0).abs() < 1e-12);
        assert!((hyper.cdf(13) - 1.0).abs() < f64::EPSILON);
    }
}
