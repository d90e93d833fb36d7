use core::fmt::Debug;
use std::fmt::Display;
use std::str::FromStr;

use crate::{PrioError, PrioResult};

/// The unique identifier of an HPO term, e.g. `HP:0000118`
///
/// The numerical part is stored as `u32`, the `HP:` prefix is added
/// when displaying the ID.
///
/// # Examples
///
/// ```
/// use geneprio::HpoTermId;
///
/// let id = HpoTermId::try_from("HP:0000118").unwrap();
/// assert_eq!(id.as_u32(), 118u32);
/// assert_eq!(id.to_string(), "HP:0000118");
///
/// assert!(HpoTermId::try_from("HP118").is_err());
/// ```
#[derive(Copy, Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct HpoTermId {
    inner: u32,
}

impl HpoTermId {
    /// Returns the integer representation of the ID
    pub fn as_u32(&self) -> u32 {
        self.inner
    }
}

impl TryFrom<&str> for HpoTermId {
    type Error = PrioError;
    fn try_from(s: &str) -> PrioResult<Self> {
        let s = s.trim();
        let Some(number) = s.strip_prefix("HP:").or_else(|| s.strip_prefix("HP_")) else {
            return Err(PrioError::InvalidInput(format!("invalid HPO term ID: {s}")));
        };
        Ok(HpoTermId {
            inner: number.parse::<u32>()?,
        })
    }
}

impl FromStr for HpoTermId {
    type Err = PrioError;
    fn from_str(s: &str) -> PrioResult<Self> {
        HpoTermId::try_from(s)
    }
}

impl From<u32> for HpoTermId {
    fn from(inner: u32) -> Self {
        Self { inner }
    }
}

impl Debug for HpoTermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HpoTermId({self})")
    }
}

impl Display for HpoTermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HP:{:07}", self.inner)
    }
}

impl PartialEq<str> for HpoTermId {
    fn eq(&self, other: &str) -> bool {
        HpoTermId::try_from(other).map_or(false, |other| *self == other)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_ids() {
        assert_eq!(HpoTermId::try_from("HP:0000001").unwrap().as_u32(), 1);
        assert_eq!(HpoTermId::try_from("HP_0012345").unwrap().as_u32(), 12345);
        assert_eq!(HpoTermId::try_from(" HP:0000118 ").unwrap().as_u32(), 118);
        assert!(HpoTermId::try_from("0000118").is_err());
        assert!(HpoTermId::try_from("HP:abc").is_err());
    }

    #[test]
    fn display() {
        let id = HpoTermId::from(2943u32);
        assert_eq!(id.to_string(), "HP:0002943");
        assert_eq!(format!("{id:?}"), "HpoTermId(HP:0002943)");
    }

    #[test]
    fn compare_with_str() {
        let id = HpoTermId::from(118u32);
        assert!(id == *"HP:0000118");
        assert!(id != *"HP:0000119");
        assert!(id != *"foobar");
    }
}
