use std::collections::HashSet;

use tracing::debug;

use crate::{GeneId, HpoReference};

/// The intersection of a gene list with the [`HpoReference`]
///
/// Returned from [`get_overlap`]
#[derive(Debug, Clone)]
pub struct Overlap {
    hpo: HpoReference,
    genes: Vec<GeneId>,
    count: usize,
}

impl Overlap {
    /// The reference, restricted to the genes of the overlap (in reference order)
    pub fn hpo(&self) -> &HpoReference {
        &self.hpo
    }

    /// The input genes that are part of the reference (in input order, duplicates kept)
    pub fn genes(&self) -> &[GeneId] {
        &self.genes
    }

    /// The number of distinct genes that are part of both the input and the reference
    pub fn count(&self) -> usize {
        self.count
    }

    /// Splits the overlap into its parts
    pub fn into_parts(self) -> (HpoReference, Vec<GeneId>, usize) {
        (self.hpo, self.genes, self.count)
    }
}

/// Intersects `genes` with the genes of the `hpo` reference
///
/// The intersection is the universe for all subsequent tests: genes that
/// are not part of the reference cannot be annotated with any HPO term
/// and genes that were not tested by the prioritization method cannot
/// be significant.
///
/// Applying `get_overlap` again to its own output does not change it.
///
/// # Examples
///
/// ```
/// use geneprio::{get_overlap, GeneId, HpoReference, HpoTermId};
///
/// let term = HpoTermId::from(118u32);
/// let mut reference = HpoReference::new(vec![term]);
/// reference.add_gene(GeneId::from("ENSG1"), [term]);
/// reference.add_gene(GeneId::from("ENSG2"), []);
///
/// let genes = vec![GeneId::from("ENSG2"), GeneId::from("ENSG9"), GeneId::from("ENSG2")];
/// let overlap = get_overlap(&reference, &genes);
///
/// assert_eq!(overlap.count(), 1);
/// assert_eq!(overlap.genes(), &[GeneId::from("ENSG2"), GeneId::from("ENSG2")]);
/// assert_eq!(overlap.hpo().len(), 1);
/// ```
pub fn get_overlap(hpo: &HpoReference, genes: &[GeneId]) -> Overlap {
    let overlap_genes: Vec<GeneId> = genes
        .iter()
        .filter(|gene| hpo.contains(gene))
        .cloned()
        .collect();
    let count = overlap_genes.iter().collect::<HashSet<&GeneId>>().len();
    let overlap_hpo = hpo.restrict(&overlap_genes);

    debug!(
        "{} of {} genes are part of the HPO reference ({} distinct)",
        overlap_genes.len(),
        genes.len(),
        count
    );
    Overlap {
        hpo: overlap_hpo,
        genes: overlap_genes,
        count,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::HpoTermId;

    fn reference() -> HpoReference {
        let seizure = HpoTermId::from(1250u32);
        let abnormality = HpoTermId::from(118u32);
        let mut reference = HpoReference::new(vec![abnormality, seizure]);
        reference.add_gene(GeneId::from("ENSG1"), [abnormality, seizure]);
        reference.add_gene(GeneId::from("ENSG2"), [abnormality]);
        reference.add_gene(GeneId::from("ENSG3"), []);
        reference.add_gene(GeneId::from("ENSG4"), [seizure]);
        reference
    }

    fn ids(genes: &[&str]) -> Vec<GeneId> {
        genes.iter().map(|gene| GeneId::from(*gene)).collect()
    }

    #[test]
    fn overlap_keeps_input_order() {
        let genes = ids(&["ENSG4", "ENSGX", "ENSG1", "ENSG4"]);
        let overlap = get_overlap(&reference(), &genes);
        assert_eq!(overlap.genes(), ids(&["ENSG4", "ENSG1", "ENSG4"]));
        assert_eq!(overlap.count(), 2);

        let hpo_genes: Vec<&str> = overlap.hpo().genes().map(GeneId::as_str).collect();
        assert_eq!(hpo_genes, vec!["ENSG1", "ENSG4"]);
    }

    #[test]
    fn overlap_is_idempotent() {
        let genes = ids(&["ENSG3", "ENSG9", "ENSG2", "ENSG3"]);
        let first = get_overlap(&reference(), &genes);
        let second = get_overlap(first.hpo(), first.genes());

        assert_eq!(first.genes(), second.genes());
        assert_eq!(first.count(), second.count());
        let first_hpo: Vec<&GeneId> = first.hpo().genes().collect();
        let second_hpo: Vec<&GeneId> = second.hpo().genes().collect();
        assert_eq!(first_hpo, second_hpo);
    }

    #[test]
    fn empty_overlap() {
        let overlap = get_overlap(&reference(), &ids(&["ENSG8", "ENSG9"]));
        assert!(overlap.genes().is_empty());
        assert!(overlap.hpo().is_empty());
        assert_eq!(overlap.count(), 0);
    }
}
