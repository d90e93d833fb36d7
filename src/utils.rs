//! Utility methods for column detection and output handling
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::PrioResult;

/// Returns the candidate that is most similar to `value`, with its score
///
/// The score is the normalized Levenshtein similarity of the lowercase
/// strings, scaled to `0..=100` (`100` means identical). On ties the first
/// candidate wins.
///
/// Returns `None` if there are no candidates.
///
/// # Examples
///
/// ```
/// use geneprio::utils::best_match;
///
/// let (candidate, score) = best_match("P-VALUE", &["P", "pvalue", "p-value"]).unwrap();
/// assert_eq!(candidate, "p-value");
/// assert!((score - 100.0).abs() < f64::EPSILON);
///
/// assert!(best_match("SNP", &[]).is_none());
/// ```
pub fn best_match<'a>(value: &str, candidates: &[&'a str]) -> Option<(&'a str, f64)> {
    let value = value.to_lowercase();
    candidates
        .iter()
        .map(|candidate| (*candidate, similarity(&value, &candidate.to_lowercase())))
        .fold(None, |best, (candidate, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((candidate, score)),
        })
}

fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Creates the directory `path` and all of its parents
///
/// Existing directories are fine and left untouched.
///
/// # Errors
///
/// [`PrioError::Io`](`crate::PrioError::Io`) if the directory cannot be created
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> PrioResult<()> {
    let path = path.as_ref();
    if path.is_dir() {
        debug!("Directory {} already exists", path.display());
        return Ok(());
    }
    fs::create_dir_all(path)?;
    info!("Created directory {}", path.display());
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn exact_match() {
        let (candidate, score) = best_match("rsid", &["SNP", "rsid", "rs"]).unwrap();
        assert_eq!(candidate, "rsid");
        assert!((score - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn case_insensitive() {
        let (candidate, _) = best_match("snp", &["SNP", "rsid", "rs"]).unwrap();
        assert_eq!(candidate, "SNP");
    }

    #[test]
    fn closest_candidate() {
        let (candidate, score) = best_match("p_val", &["P", "pvalue", "p-value", "p_value"]).unwrap();
        assert_eq!(candidate, "p_value");
        assert!(score > 50.0);
        assert!(score < 100.0);
    }

    #[test]
    fn ties_keep_first_candidate() {
        let (candidate, score) = best_match("xyz", &["a", "b"]).unwrap();
        assert_eq!(candidate, "a");
        assert!(score.abs() < f64::EPSILON);
    }

    #[test]
    fn create_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("PoPs");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // existing directories are no error
        ensure_dir(&nested).unwrap();
    }
}
