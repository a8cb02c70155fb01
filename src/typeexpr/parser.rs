//! Recursive parser for C/C++ type text.

/// One identifier extracted from a type expression.
///
/// `name` is the cleaned identifier (qualifiers and argument lists
/// stripped), `raw` the argument text it was extracted from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeToken {
    pub name: String,
    pub raw: String,
}

/// Normalized shape of one type expression.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeAnalysis {
    /// The type name with qualifiers, suffixes, and argument lists removed.
    pub base: String,
    pub is_pointer: bool,
    pub is_reference: bool,
    pub is_rvalue_reference: bool,
    pub is_array: bool,
    /// Set when the expression carries a template argument list.
    pub template_base: Option<String>,
    pub template_args: Vec<TypeAnalysis>,
}

const QUALIFIERS: &[&str] = &["const", "volatile", "mutable", "struct", "class", "enum", "typename"];

/// Remove cv-qualifiers and elaborated-type keywords, word-boundary aware.
///
/// `const Foo` loses the qualifier; `Foo_const` and `constant` keep theirs.
pub fn strip_qualifiers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word = String::new();

    let flush = |word: &mut String, out: &mut String| {
        if !word.is_empty() {
            if !QUALIFIERS.contains(&word.as_str()) {
                out.push_str(word);
            }
            word.clear();
        }
    };

    for c in text.chars() {
        if unicode_ident::is_xid_continue(c) {
            word.push(c);
        } else {
            flush(&mut word, &mut out);
            out.push(c);
        }
    }
    flush(&mut word, &mut out);

    // Collapse whitespace runs left behind by removed keywords.
    let mut collapsed = String::with_capacity(out.len());
    let mut prev_space = false;
    for c in out.trim().chars() {
        let is_space = c.is_whitespace();
        if !(is_space && prev_space) {
            collapsed.push(if is_space { ' ' } else { c });
        }
        prev_space = is_space;
    }
    collapsed
}

/// The single point of truth for corruption filtering.
///
/// An argument survives when it is non-empty after trimming, its angle /
/// round / square brackets are balanced, and it contains at least one
/// identifier character. Everything else came out of the extractor
/// mangled and is dropped by the callers.
pub fn is_plausible_argument(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }

    let (mut angle, mut round, mut square) = (0i32, 0i32, 0i32);
    let mut has_ident = false;
    for c in trimmed.chars() {
        match c {
            '<' => angle += 1,
            '>' => angle -= 1,
            '(' => round += 1,
            ')' => round -= 1,
            '[' => square += 1,
            ']' => square -= 1,
            _ => {
                if unicode_ident::is_xid_continue(c) {
                    has_ident = true;
                }
            }
        }
        if angle < 0 || round < 0 || square < 0 {
            return false;
        }
    }
    angle == 0 && round == 0 && square == 0 && has_ident
}

/// Split the inside of a template argument list on top-level commas.
///
/// A comma only separates when the angle (and round/square) depth has
/// returned to the level of the opening bracket.
pub fn split_template_args(inner: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let (mut angle, mut round, mut square) = (0i32, 0i32, 0i32);

    for c in inner.chars() {
        match c {
            '<' => angle += 1,
            '>' => angle -= 1,
            '(' => round += 1,
            ')' => round -= 1,
            '[' => square += 1,
            ']' => square -= 1,
            ',' if angle == 0 && round == 0 && square == 0 => {
                args.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    if !current.trim().is_empty() || !args.is_empty() {
        args.push(current);
    }
    args
}

/// Locate the outermost `<...>` span. Returns `(base, inner)` when the
/// list is present and balanced.
fn outer_template_split(text: &str) -> Option<(&str, &str)> {
    let open = text.find('<')?;
    let mut depth = 0i32;
    for (i, c) in text[open..].char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&text[..open], &text[open + 1..open + i]));
                }
            }
            _ => {}
        }
    }
    None
}

/// Strip a template argument list from a name: `Base<Args>` → `Base`.
/// Text without an argument list comes back trimmed and unchanged.
pub fn template_base_of(name: &str) -> &str {
    match outer_template_split(name.trim()) {
        Some((base, _)) => base.trim(),
        None => name.trim(),
    }
}

/// Decompose `Base<A, B>` into `("Base", ["A", "B"])` after qualifier
/// stripping. Implausible arguments are filtered out; text without an
/// argument list returns `None`.
pub fn template_parts(text: &str) -> Option<(String, Vec<String>)> {
    let cleaned = strip_qualifiers(text);
    let (base, inner) = outer_template_split(cleaned.trim())?;
    let args = split_template_args(inner)
        .into_iter()
        .filter(|a| is_plausible_argument(a))
        .map(|a| a.trim().to_string())
        .collect();
    Some((base.trim().to_string(), args))
}

/// Parse one type expression into its normalized shape.
///
/// Never fails: corrupted input degrades to a partial or empty analysis.
pub fn parse(text: &str) -> TypeAnalysis {
    let cleaned = strip_qualifiers(text);
    let mut core = cleaned.trim();

    let mut analysis = TypeAnalysis::default();

    // Trailing array brackets, possibly several groups: Foo[3][4].
    while core.ends_with(']') {
        match core.rfind('[') {
            Some(open) => {
                analysis.is_array = true;
                core = core[..open].trim_end();
            }
            None => break, // unbalanced, leave for the plausibility check
        }
    }

    // Trailing reference/pointer suffixes. `&&` beats `&`.
    loop {
        if let Some(stripped) = core.strip_suffix("&&") {
            analysis.is_rvalue_reference = true;
            core = stripped.trim_end();
        } else if let Some(stripped) = core.strip_suffix('&') {
            analysis.is_reference = true;
            core = stripped.trim_end();
        } else if let Some(stripped) = core.strip_suffix('*') {
            analysis.is_pointer = true;
            core = stripped.trim_end();
        } else {
            break;
        }
    }

    // decltype(expr) is opaque at this level: the whole expression is the
    // base. Token extraction recurses into the inner expression.
    if let Some(rest) = core.strip_prefix("decltype") {
        if rest.trim_start().starts_with('(') {
            analysis.base = core.to_string();
            return analysis;
        }
    }

    match outer_template_split(core) {
        Some((base, inner)) => {
            let base = base.trim();
            analysis.base = base.to_string();
            analysis.template_base = Some(base.to_string());
            for arg in split_template_args(inner) {
                if is_plausible_argument(&arg) {
                    analysis.template_args.push(parse(arg.trim()));
                } else {
                    tracing::trace!(argument = %arg, "dropping implausible template argument");
                }
            }
        }
        None => {
            analysis.base = core.to_string();
        }
    }

    analysis
}

/// Extract every identifier token from a type expression, recursively
/// walking nested template arguments and `decltype` bodies.
pub fn extract_tokens(text: &str) -> Vec<TypeToken> {
    let mut tokens = Vec::new();
    collect_tokens(text, &mut tokens);
    tokens
}

fn collect_tokens(text: &str, tokens: &mut Vec<TypeToken>) {
    let trimmed = text.trim();
    if !is_plausible_argument(trimmed) {
        return;
    }

    let analysis = parse(trimmed);

    if let Some(inner) = analysis
        .base
        .strip_prefix("decltype")
        .and_then(|rest| rest.trim_start().strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        tokens.push(TypeToken {
            name: analysis.base.clone(),
            raw: trimmed.to_string(),
        });
        collect_tokens(inner, tokens);
        return;
    }

    if !analysis.base.is_empty() {
        tokens.push(TypeToken {
            name: analysis.base.clone(),
            raw: trimmed.to_string(),
        });
    }

    // Recurse through the original argument text rather than the parsed
    // analyses so `raw` keeps the verbatim argument spelling.
    if let Some((_, inner)) = outer_template_split(&strip_qualifiers(trimmed)) {
        for arg in split_template_args(inner) {
            collect_tokens(&arg, tokens);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let a = parse("int");
        assert_eq!(a.base, "int");
        assert!(!a.is_pointer && !a.is_reference && !a.is_array);
        assert!(a.template_base.is_none());
    }

    #[test]
    fn test_parse_qualifiers_stripped() {
        assert_eq!(parse("const Foo").base, "Foo");
        assert_eq!(parse("volatile const Bar").base, "Bar");
        // Words merely containing a qualifier survive.
        assert_eq!(parse("constant_pool").base, "constant_pool");
    }

    #[test]
    fn test_parse_pointer_reference() {
        assert!(parse("Foo*").is_pointer);
        assert!(parse("Foo&").is_reference);
        assert!(parse("Foo&&").is_rvalue_reference);
        assert!(!parse("Foo&&").is_reference);
        assert_eq!(parse("const Foo *").base, "Foo");
    }

    #[test]
    fn test_parse_array() {
        let a = parse("int[16]");
        assert!(a.is_array);
        assert_eq!(a.base, "int");
        assert!(parse("Foo[3][4]").is_array);
    }

    #[test]
    fn test_parse_nested_template_commas() {
        let a = parse("std::map<std::string, std::vector<int>>");
        assert_eq!(a.base, "std::map");
        assert_eq!(a.template_base.as_deref(), Some("std::map"));
        assert_eq!(a.template_args.len(), 2);
        assert_eq!(a.template_args[0].base, "std::string");
        assert_eq!(a.template_args[1].base, "std::vector");
        assert_eq!(a.template_args[1].template_args[0].base, "int");
    }

    #[test]
    fn test_parse_decltype_opaque_base() {
        let a = parse("decltype(foo.bar())");
        assert_eq!(a.base, "decltype(foo.bar())");
        assert!(a.template_base.is_none());
    }

    #[test]
    fn test_extract_tokens_nested() {
        let names: Vec<_> = extract_tokens("std::map<std::string, std::vector<int>>")
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["std::map", "std::string", "std::vector", "int"]);
    }

    #[test]
    fn test_extract_tokens_decltype_recurses() {
        let tokens = extract_tokens("decltype(Foo<Bar>)");
        assert_eq!(tokens[0].name, "decltype(Foo<Bar>)");
        let names: Vec<_> = tokens.iter().map(|t| t.name.as_str()).collect();
        assert!(names.contains(&"Foo"));
        assert!(names.contains(&"Bar"));
    }

    #[test]
    fn test_plausible_argument_predicate() {
        assert!(is_plausible_argument("Foo"));
        assert!(is_plausible_argument("std::vector<int>"));
        assert!(is_plausible_argument("int[3]"));
        assert!(!is_plausible_argument(""));
        assert!(!is_plausible_argument("   "));
        assert!(!is_plausible_argument("<<>"));
        assert!(!is_plausible_argument("Foo<Bar"));
        assert!(!is_plausible_argument("* & ,"));
        assert!(!is_plausible_argument(")("));
    }

    #[test]
    fn test_corrupted_input_degrades() {
        // No panics, partial results only.
        let a = parse("std::map<std::string, >");
        assert_eq!(a.base, "std::map");
        assert_eq!(a.template_args.len(), 1);

        let b = parse("<<<");
        assert!(b.template_args.is_empty());

        assert!(extract_tokens(",,,").is_empty());
    }

    #[test]
    fn test_split_template_args_top_level_only() {
        let args = split_template_args("A, B<C, D>, E");
        assert_eq!(args.len(), 3);
        assert_eq!(args[1].trim(), "B<C, D>");
    }

    #[test]
    fn test_template_base_of() {
        assert_eq!(template_base_of("Container<int>"), "Container");
        assert_eq!(template_base_of("Container"), "Container");
        assert_eq!(template_base_of(" ns::Box<T> "), "ns::Box");
    }
}
