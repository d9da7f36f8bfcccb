use indexmap::IndexMap;

/// Entry name for a top-level `select` with no enclosing DDL statement.
/// Upper-case on purpose: normalization lower-cases every recognized
/// keyword, so this name can never collide with a real parse target.
pub const ANONYMOUS_SELECT: &str = "SELECT";

/// Placeholder substituted for a column projection list. Lineage only cares
/// about source objects, and literal column text would otherwise perturb the
/// later structural matching.
pub const COLUMNS_MARK: &str = "%COLUMNS%";

const SUBQUERY_MARK: &str = "%SUBQUERY:";

/// The query body of one decomposed unit: a single text fragment, or one
/// fragment per branch when the unit's top level was split on a union
/// boundary. All fragments feed the same target object.
#[derive(Debug, Clone, PartialEq)]
pub enum SubqueryBody {
    Single(String),
    Union(Vec<String>),
}

impl SubqueryBody {
    pub fn fragments(&self) -> &[String] {
        match self {
            SubqueryBody::Single(fragment) => std::slice::from_ref(fragment),
            SubqueryBody::Union(fragments) => fragments,
        }
    }
}

/// Decomposed units keyed by name, in discovery order: innermost
/// subqueries first, the main query last.
pub type SubqueryMap = IndexMap<String, SubqueryBody>;

/// Statement shapes that define an object, tried in order; the word after
/// the matched shape is the object name.
const CREATE_SHAPES: &[&[&str]] = &[
    &["create", "external", "table"],
    &["create", "table"],
    &["create", "materialized", "view"],
    &["create", "or", "replace", "view"],
    &["create", "view"],
];

fn subquery_mark(name: &str) -> String {
    format!("{SUBQUERY_MARK}{name}%")
}

fn is_name(word: &str) -> bool {
    !matches!(word, "(" | ")" | ",")
}

fn find_subquery(words: &[String]) -> Option<usize> {
    (0..words.len().saturating_sub(3)).find(|&i| {
        is_name(&words[i])
            && words[i + 1] == "as"
            && words[i + 2] == "("
            && words[i + 3] == "select"
    })
}

/// Decompose a normalized, guarded query into a [`SubqueryMap`].
///
/// Named subqueries are pulled out of the text recursively (innermost
/// first), each consumed span is replaced by a placeholder encoding the
/// consumed name, and the remaining top-level text is classified against
/// the object-defining statement shapes. A remainder with no matching shape
/// is registered under [`ANONYMOUS_SELECT`] so its references are not lost.
pub fn split_query(query: &str) -> SubqueryMap {
    let mut subqueries = SubqueryMap::new();
    let remainder = extract_subqueries(query, &mut subqueries);

    let words: Vec<String> = remainder
        .split_whitespace()
        .map(str::to_owned)
        .collect();
    if !words.is_empty() {
        let name = classify_target(&words).unwrap_or_else(|| ANONYMOUS_SELECT.to_owned());
        let body = split_union_body(&abstract_columns(&remainder));
        log::debug!("registering target `{}`", name);
        subqueries.insert(name, body);
    }

    // A name still carrying the placeholder marker is a parsing artifact
    // (e.g. the `create table x as ( select ... )` form, whose body was
    // already consumed as a subquery named `x`), not a real object.
    subqueries.retain(|name, _| !name.contains(SUBQUERY_MARK));
    subqueries
}

/// Pull every `<name> as ( select ... )` binding out of `text`, register it
/// in `subqueries` and return the text with each consumed span replaced by
/// its placeholder.
fn extract_subqueries(text: &str, subqueries: &mut SubqueryMap) -> String {
    let mut words: Vec<String> = text.split_whitespace().map(str::to_owned).collect();

    // Every round consumes a span of at least four words, so the initial
    // word count bounds the rounds.
    let max_rounds = words.len();
    for _ in 0..=max_rounds {
        let Some(i) = find_subquery(&words) else {
            break;
        };

        let mut depth = 1usize;
        let mut j = i + 3;
        while j < words.len() && depth > 0 {
            match words[j].as_str() {
                "(" => depth += 1,
                ")" => depth -= 1,
                _ => {}
            }
            j += 1;
        }
        if depth > 0 {
            log::warn!(
                "unbalanced parentheses in subquery `{}`, capturing to end of input",
                words[i]
            );
        }
        // j stopped one past the closing paren when the scan balanced.
        let body_end = if depth == 0 { j - 1 } else { j };

        let name = words[i].clone();
        let inner = extract_subqueries(&words[i + 3..body_end].join(" "), subqueries);
        log::debug!("registering subquery `{}`", name);
        subqueries.insert(name.clone(), split_union_body(&abstract_columns(&inner)));

        words.splice(i..j, std::iter::once(subquery_mark(&name)));
    }

    words.join(" ")
}

/// Replace the projection list between `select` and the first top-level
/// `from` with [`COLUMNS_MARK`]. Without a top-level `from` (a guarded
/// function clause or a constant projection) everything after `select` is
/// abstracted.
fn abstract_columns(text: &str) -> String {
    let mut words: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
    let Some(select_idx) = words.iter().position(|w| w == "select") else {
        return text.to_owned();
    };

    let mut depth = 0i32;
    let mut from_idx = None;
    for i in select_idx + 1..words.len() {
        match words[i].as_str() {
            "(" => depth += 1,
            ")" => depth -= 1,
            "from" if depth == 0 => {
                from_idx = Some(i);
                break;
            }
            _ => {}
        }
    }

    let end = from_idx.unwrap_or(words.len());
    if end > select_idx + 1 {
        words.splice(select_idx + 1..end, std::iter::once(COLUMNS_MARK.to_owned()));
    }
    words.join(" ")
}

/// Split a body on its top-level `union` / `union all` boundaries.
fn split_union_body(text: &str) -> SubqueryBody {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut fragments: Vec<String> = vec![];
    let mut current: Vec<&str> = vec![];
    let mut depth = 0i32;

    let mut idx = 0;
    while idx < words.len() {
        match words[idx] {
            "(" => {
                depth += 1;
                current.push("(");
            }
            ")" => {
                depth -= 1;
                current.push(")");
            }
            "union" if depth == 0 => {
                fragments.push(current.join(" "));
                current.clear();
                if words.get(idx + 1) == Some(&"all") {
                    idx += 1;
                }
            }
            word => current.push(word),
        }
        idx += 1;
    }
    fragments.push(current.join(" "));

    if fragments.len() == 1 {
        SubqueryBody::Single(fragments.pop().expect("one fragment"))
    } else {
        SubqueryBody::Union(fragments)
    }
}

fn classify_target(words: &[String]) -> Option<String> {
    for shape in CREATE_SHAPES {
        for i in 0..words.len().saturating_sub(shape.len()) {
            if words[i..i + shape.len()]
                .iter()
                .map(String::as_str)
                .eq(shape.iter().copied())
            {
                // The captured name must not open a parenthesis (that would
                // be a column list, not a name).
                if let Some(name) = words.get(i + shape.len()).filter(|name| *name != "(") {
                    return Some(name.clone());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_create_table() {
        let subqueries = split_query("create table table2 as select * from table1");
        assert_eq!(subqueries.len(), 1);
        assert_eq!(
            subqueries["table2"],
            SubqueryBody::Single("create table table2 as select %COLUMNS% from table1".to_owned())
        );
    }

    #[test]
    fn test_split_parenthesized_create_drops_placeholder_artifact() {
        let subqueries =
            split_query("create table t2 as ( select * from t1 )");
        assert_eq!(subqueries.len(), 1);
        assert_eq!(
            subqueries["t2"],
            SubqueryBody::Single("select %COLUMNS% from t1".to_owned())
        );
    }

    #[test]
    fn test_split_registers_innermost_subqueries_first() {
        let subqueries = split_query(
            "with outer_query as ( select a from ( with inner_query as ( select b from t ) select * from inner_query ) ) select * from outer_query",
        );
        assert_eq!(
            subqueries.keys().collect::<Vec<_>>(),
            ["inner_query", "outer_query", ANONYMOUS_SELECT]
        );
    }

    #[test]
    fn test_split_union_body_on_top_level_boundaries_only() {
        let subqueries = split_query(
            "create table t as select * from a union all select * from ( select x from b union select y from c )",
        );
        match &subqueries["t"] {
            SubqueryBody::Union(fragments) => {
                assert_eq!(fragments.len(), 2);
                assert!(fragments[1].contains("union"), "nested union must stay intact");
            }
            body => panic!("expected union body, got {:?}", body),
        }
    }

    #[test]
    fn test_split_without_from_registers_entry() {
        let subqueries =
            split_query("with lone as ( select '1' as a , '2' as b ) select * from lone");
        assert_eq!(
            subqueries["lone"],
            SubqueryBody::Single("select %COLUMNS%".to_owned())
        );
    }

    #[test]
    fn test_split_unbalanced_input_captures_to_end() {
        let subqueries = split_query("with broken as ( select * from t1");
        assert_eq!(
            subqueries["broken"],
            SubqueryBody::Single("select %COLUMNS% from t1".to_owned())
        );
    }

    #[test]
    fn test_split_empty_query_yields_empty_map() {
        assert!(split_query("").is_empty());
    }

    #[test]
    fn test_malformed_binding_without_as_falls_through() {
        // `broken ( select ... )` misses the `as` keyword: not a subquery
        // binding, the whole text classifies as an anonymous selection.
        let subqueries = split_query("with broken ( select * from t1 ) select * from broken");
        assert_eq!(subqueries.keys().collect::<Vec<_>>(), [ANONYMOUS_SELECT]);
    }
}
