// Parser regression tests for Ruby declaration-reference extraction

pub mod fixtures;

mod filter_matching;

use crate::filter::DeclRefFilter;
use crate::parser::{CandidateReference, RubyParser};
use std::path::Path;

/// Extract references from `source` with the given filter.
pub fn extract(source: &str, filter: &DeclRefFilter) -> Vec<CandidateReference> {
    let mut parser = RubyParser::new().expect("Failed to create parser");
    parser
        .extract_references(source, Path::new("test.rb"), filter)
        .expect("Failed to extract references")
}

/// Extract references from `source` with no filter configured.
pub fn extract_all(source: &str) -> Vec<CandidateReference> {
    extract(source, &DeclRefFilter::pass_through())
}

pub fn strings(items: &[&str]) -> Option<Vec<String>> {
    Some(items.iter().map(|s| s.to_string()).collect())
}
