use super::fixtures::*;
use super::{extract, extract_all};
use crate::config::{ApiEntry, LookupConfig};
use crate::filter::DeclRefFilter;

fn filter(func_only: bool, apis: Vec<ApiEntry>) -> DeclRefFilter {
    DeclRefFilter::from_config(&LookupConfig {
        apis,
        func_only,
        ..Default::default()
    })
}

#[test]
fn test_full_name_filter_keeps_only_listed_call() {
    let refs = extract(SCENARIO_CALLS, &filter(false, vec![ApiEntry::function(Some("bar"), "baz")]));
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].full_name(), "bar.baz");
}

#[test]
fn test_func_only_filter_matches_through_receiver() {
    let refs = extract(SCENARIO_CALLS, &filter(true, vec![ApiEntry::function(None, "baz")]));
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].full_name(), "bar.baz");
}

#[test]
fn test_rejected_outer_call_does_not_hide_nested_call() {
    let refs = extract(NESTED_CALLS, &filter(false, vec![ApiEntry::function(Some("File"), "read")]));
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].full_name(), "File.read");
}

#[test]
fn test_xstring_filtered_by_sentinel_name() {
    let xstring_only = filter(false, vec![ApiEntry::function(None, "builtin_xstring")]);
    let refs = extract(XSTRING_NESTED_CALL, &xstring_only);
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].name, "builtin_xstring");

    let refs = extract(XSTRING_NESTED_CALL, &filter(true, vec![ApiEntry::function(None, "builtin_xstring")]));
    assert_eq!(refs.len(), 1);
}

#[test]
fn test_no_filter_drops_nothing() {
    let filtered = extract(COMMAND_CALLS, &DeclRefFilter::new(None));
    assert_eq!(filtered, extract_all(COMMAND_CALLS));
    assert_eq!(filtered.len(), 4);
}
