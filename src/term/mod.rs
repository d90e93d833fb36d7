//! HPO term identifiers and sets of them
//!
//! Terms are only referenced by their [`HpoTermId`]. The ontology graph
//! itself is not needed: the HPO reference matrix already propagates
//! annotations to all ancestor terms.

mod group;
mod hpotermid;

pub use group::HpoGroup;
pub use hpotermid::HpoTermId;
