#![allow(clippy::unwrap_used)]
use declxmi::typeexpr::{self, extract_tokens, is_plausible_argument, match_known, parse};

use indexmap::IndexSet;
use rstest::rstest;

fn known(names: &[&str]) -> IndexSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn test_nested_template_args_do_not_split_on_inner_comma() {
    let analysis = parse("std::map<std::string, std::vector<int>>");
    assert_eq!(analysis.base, "std::map");
    assert_eq!(analysis.template_args.len(), 2);
    assert_eq!(analysis.template_args[0].base, "std::string");
    assert_eq!(analysis.template_args[1].base, "std::vector");
}

#[rstest]
#[case("Foo*", true, false, false)]
#[case("Foo&", false, true, false)]
#[case("Foo&&", false, false, true)]
#[case("const Foo*", true, false, false)]
fn test_suffix_detection(
    #[case] text: &str,
    #[case] pointer: bool,
    #[case] reference: bool,
    #[case] rvalue: bool,
) {
    let analysis = parse(text);
    assert_eq!(analysis.base, "Foo");
    assert_eq!(analysis.is_pointer, pointer);
    assert_eq!(analysis.is_reference, reference);
    assert_eq!(analysis.is_rvalue_reference, rvalue);
}

#[rstest]
#[case("int[8]")]
#[case("Foo [ 4 ]")]
fn test_trailing_array_brackets(#[case] text: &str) {
    assert!(parse(text).is_array);
}

#[test]
fn test_decltype_token_and_inner_expression() {
    let tokens = extract_tokens("decltype(Registry<Entry>)");
    let names: Vec<&str> = tokens.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names[0], "decltype(Registry<Entry>)");
    assert!(names.contains(&"Registry"));
    assert!(names.contains(&"Entry"));
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("Foo<Bar")]
#[case(">, <")]
#[case("* & ,")]
fn test_implausible_arguments_rejected(#[case] text: &str) {
    assert!(!is_plausible_argument(text));
}

#[rstest]
#[case("Foo")]
#[case("ns::Bar<int, long>")]
#[case("T[16]")]
fn test_plausible_arguments_accepted(#[case] text: &str) {
    assert!(is_plausible_argument(text));
}

#[test]
fn test_corrupted_text_never_panics() {
    for text in ["<<<<", ">>>>", ",,,", "a<b<c", "decltype(", "((((", "🚀<🚀"] {
        let _ = parse(text);
        let _ = extract_tokens(text);
    }
}

#[test]
fn test_match_order_exact_then_suffix_then_template_base() {
    let k = known(&["pkg::Widget", "Widget", "Grid"]);
    // Exact beats suffix.
    let hits = match_known(&extract_tokens("Widget"), &k);
    assert_eq!(hits, vec!["Widget"]);
    // Suffix when no exact.
    let hits = match_known(&extract_tokens("pkg::Widget"), &k);
    assert_eq!(hits, vec!["pkg::Widget"]);
    // Template base after stripping the argument list.
    let hits = match_known(&extract_tokens("Grid<int>"), &k);
    assert_eq!(hits, vec!["Grid"]);
}

#[test]
fn test_ambiguous_short_name_resolves_to_first_declared() {
    let k = known(&["first::Thing", "second::Thing"]);
    let hits = match_known(&extract_tokens("Thing"), &k);
    assert_eq!(hits, vec!["first::Thing"]);
}

#[test]
fn test_template_parts_roundtrip() {
    let (base, args) = typeexpr::template_parts("Box<Item, Allocator<Item>>").unwrap();
    assert_eq!(base, "Box");
    assert_eq!(args, vec!["Item", "Allocator<Item>"]);
    assert!(typeexpr::template_parts("Plain").is_none());
}
