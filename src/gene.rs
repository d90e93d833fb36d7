use std::borrow::Borrow;
use std::fmt::Display;

/// A gene identifier, most likely an Ensembl gene ID
///
/// The identifier is kept exactly as it appears in the input data. Identifiers
/// of the prioritization results and of the [`HpoReference`](`crate::HpoReference`)
/// must use the same namespace, otherwise no genes will overlap.
#[derive(Clone, Default, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct GeneId {
    inner: String,
}

impl GeneId {
    /// Returns the identifier as `&str`
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns `true` if the identifier is an empty string
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<&str> for GeneId {
    fn from(value: &str) -> Self {
        GeneId {
            inner: value.to_string(),
        }
    }
}

impl From<String> for GeneId {
    fn from(inner: String) -> Self {
        GeneId { inner }
    }
}

impl AsRef<str> for GeneId {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl Borrow<str> for GeneId {
    fn borrow(&self) -> &str {
        &self.inner
    }
}

impl Display for GeneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl PartialEq<str> for GeneId {
    fn eq(&self, other: &str) -> bool {
        self.inner == other
    }
}

impl PartialEq<&str> for GeneId {
    fn eq(&self, other: &&str) -> bool {
        self.inner == *other
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn compare_with_str() {
        let gene = GeneId::from("ENSG00000141510");
        assert_eq!(gene, "ENSG00000141510");
        assert_eq!(gene.to_string(), "ENSG00000141510");
        assert!(!gene.is_empty());
    }

    #[test]
    fn lookup_by_str() {
        let mut genes = HashSet::new();
        genes.insert(GeneId::from("ENSG1"));
        assert!(genes.contains("ENSG1"));
        assert!(!genes.contains("ENSG2"));
    }
}
