use smallvec::SmallVec;

use crate::{HpoTermId, DEFAULT_NUM_TERMS};

/// A set of [`HpoTermId`]s annotated to a single gene
///
/// Each term can occur only once in the group. The IDs are kept sorted,
/// so lookups are binary searches.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HpoGroup {
    ids: SmallVec<[HpoTermId; DEFAULT_NUM_TERMS]>,
}

impl HpoGroup {
    /// Constructs a new, empty [`HpoGroup`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the group contains no [`HpoTermId`]s
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of [`HpoTermId`]s in the group
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Adds a new [`HpoTermId`] to the group
    ///
    /// Returns whether the `HpoTermId` was newly inserted. That is:
    ///
    /// - If the group did not previously contain this `HpoTermId`, true is returned.
    /// - If the group already contained this `HpoTermId`, false is returned.
    pub fn insert<I: Into<HpoTermId>>(&mut self, id: I) -> bool {
        let id = id.into();
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(idx) => {
                self.ids.insert(idx, id);
                true
            }
        }
    }

    /// Returns `true` if the group contains the [`HpoTermId`]
    pub fn contains(&self, id: &HpoTermId) -> bool {
        self.ids.binary_search(id).is_ok()
    }

    /// Returns an Iterator of the [`HpoTermId`]s inside the group
    pub fn iter(&self) -> std::slice::Iter<'_, HpoTermId> {
        self.ids.iter()
    }

    /// Adds all terms of `other` to `self`
    pub fn extend(&mut self, other: &HpoGroup) {
        for id in other {
            self.insert(*id);
        }
    }
}

impl FromIterator<HpoTermId> for HpoGroup {
    fn from_iter<T: IntoIterator<Item = HpoTermId>>(iter: T) -> Self {
        let mut group = HpoGroup::new();
        for id in iter {
            group.insert(id);
        }
        group
    }
}

impl<'a> IntoIterator for &'a HpoGroup {
    type Item = &'a HpoTermId;
    type IntoIter = std::slice::Iter<'a, HpoTermId>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn insert_keeps_order_and_uniqueness() {
        let mut group = HpoGroup::new();
        assert!(group.insert(3u32));
        assert!(group.insert(1u32));
        assert!(group.insert(2u32));
        assert!(!group.insert(1u32));

        let ids: Vec<u32> = group.iter().map(HpoTermId::as_u32).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(group.len(), 3);
    }

    #[test]
    fn contains() {
        let group: HpoGroup = [5u32, 8u32].into_iter().map(HpoTermId::from).collect();
        assert!(group.contains(&HpoTermId::from(5u32)));
        assert!(!group.contains(&HpoTermId::from(6u32)));
    }

    #[test]
    fn extend() {
        let mut a: HpoGroup = [1u32, 3u32].into_iter().map(HpoTermId::from).collect();
        let b: HpoGroup = [2u32, 3u32].into_iter().map(HpoTermId::from).collect();
        a.extend(&b);
        assert_eq!(a.len(), 3);
        assert!(HpoGroup::new().is_empty());
    }
}
