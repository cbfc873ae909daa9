//! Field extractors.
//!
//! Each submodule owns one or more record fields: the ordered strategy
//! list, the validator handed to [`run_chain`](crate::chain::run_chain)
//! and any post-processing applied to the winning value.

pub mod brand;
pub mod classify;
pub mod image;
pub mod ingredients;
pub mod name;
pub mod nutrition;

use crate::candidate::Candidate;
use crate::error::Result;

/// Wrap an optional string as a candidate of the given kind.
pub(crate) fn text_candidate(value: Option<String>, source: &'static str) -> Result<Option<Candidate>> {
    Ok(value.map(|v| Candidate::text(v, source)))
}

pub(crate) fn meta_candidate(value: Option<String>, source: &'static str) -> Result<Option<Candidate>> {
    Ok(value.map(|v| Candidate::meta(v, source)))
}

pub(crate) fn image_candidate(value: Option<String>, source: &'static str) -> Result<Option<Candidate>> {
    Ok(value.map(|v| Candidate::image(v, source)))
}
