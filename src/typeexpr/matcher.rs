//! Token matching against the set of known element names.

use indexmap::IndexSet;

use super::parser::{TypeToken, template_base_of};

/// Match extracted tokens against a collection of known qualified names.
///
/// Per token the strategies run in order, first hit wins:
/// 1. exact match,
/// 2. trailing `::name` suffix match (unqualified token, qualified name),
/// 3. template-base match after stripping argument lists from both sides.
///
/// `known` iterates in insertion order, which callers populate in input
/// document order — when several elements share a short name, the first
/// declared one wins. That ordering is the documented tie-break and the
/// reason this takes an [`IndexSet`] rather than an unordered set.
pub fn match_known(tokens: &[TypeToken], known: &IndexSet<String>) -> Vec<String> {
    let mut matched: Vec<String> = Vec::new();

    for token in tokens {
        if let Some(hit) = match_one(&token.name, known) {
            if !matched.iter().any(|m| m == &hit) {
                matched.push(hit);
            }
        }
    }

    matched
}

/// Match a single name with the same strategy order as [`match_known`].
/// Used where the caller already has the exact name to resolve, such as
/// declared base classes.
pub fn match_name(name: &str, known: &IndexSet<String>) -> Option<String> {
    match_one(name, known)
}

fn match_one(name: &str, known: &IndexSet<String>) -> Option<String> {
    if known.contains(name) {
        return Some(name.to_string());
    }

    let suffix = format!("::{name}");
    if let Some(hit) = known.iter().find(|k| k.ends_with(&suffix)) {
        return Some(hit.clone());
    }

    let base = template_base_of(name);
    if base != name {
        if known.contains(base) {
            return Some(base.to_string());
        }
        let base_suffix = format!("::{base}");
        if let Some(hit) = known.iter().find(|k| k.ends_with(&base_suffix)) {
            return Some(hit.clone());
        }
    }

    // Known names may themselves carry argument lists (template
    // definitions registered under their spelled form).
    known
        .iter()
        .find(|k| template_base_of(k) == base)
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeexpr::extract_tokens;

    fn known(names: &[&str]) -> IndexSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_exact_match() {
        let k = known(&["Foo", "ns::Bar"]);
        let m = match_known(&extract_tokens("Foo"), &k);
        assert_eq!(m, vec!["Foo"]);
    }

    #[test]
    fn test_suffix_match() {
        let k = known(&["ns::Bar"]);
        let m = match_known(&extract_tokens("Bar"), &k);
        assert_eq!(m, vec!["ns::Bar"]);
    }

    #[test]
    fn test_template_base_match() {
        let k = known(&["Container"]);
        let m = match_known(&extract_tokens("Container<int>"), &k);
        assert_eq!(m, vec!["Container"]);
    }

    #[test]
    fn test_nested_args_matched_through() {
        let k = known(&["Foo"]);
        let m = match_known(&extract_tokens("std::vector<Foo>"), &k);
        assert_eq!(m, vec!["Foo"]);
    }

    #[test]
    fn test_first_declared_wins_on_ambiguous_short_name() {
        let k = known(&["alpha::Widget", "beta::Widget"]);
        let m = match_known(&extract_tokens("Widget"), &k);
        assert_eq!(m, vec!["alpha::Widget"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let k = known(&["Foo"]);
        assert!(match_known(&extract_tokens("Quux"), &k).is_empty());
    }
}
