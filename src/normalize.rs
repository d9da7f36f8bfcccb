use crate::scanner::{Scanner, Token};

/// Marker substituted for a `from` keyword that sits inside a function
/// argument list (`extract(month from col)`, `trim('x' from col)`). The
/// splitter and the dependency extractor only react to the bare `from` word,
/// so a masked occurrence can never be mistaken for a table source.
pub const FROM_MARK: &str = "%FROM%";

/// Split a script into its individual statements on `;` boundaries,
/// ignoring semicolons inside quoted literals and comments. Empty
/// statements are dropped.
pub fn split_statements(script: &str) -> Vec<String> {
    let chars: Vec<char> = script.chars().collect();
    let mut statements: Vec<String> = vec![];
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match c {
            '\'' | '"' => {
                quote = Some(c);
                current.push(c);
                i += 1;
            }
            '-' if chars.get(i + 1) == Some(&'-') => {
                while i < chars.len() && chars[i] != '\n' {
                    current.push(chars[i]);
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                current.push_str("/*");
                i += 2;
                while i < chars.len() {
                    if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                        current.push_str("*/");
                        i += 2;
                        break;
                    }
                    current.push(chars[i]);
                    i += 1;
                }
            }
            ';' => {
                if !current.trim().is_empty() {
                    statements.push(current.trim().to_owned());
                }
                current.clear();
                i += 1;
            }
            _ => {
                current.push(c);
                i += 1;
            }
        }
    }
    if !current.trim().is_empty() {
        statements.push(current.trim().to_owned());
    }

    statements
}

/// Canonicalize one statement: recognized keywords lower-cased, comments
/// stripped, one space between tokens, dot qualifiers glued
/// (`schema . object` -> `schema.object`), a single trailing terminator
/// dropped. Total over any input, idempotent over its own output.
pub fn normalize(statement: &str) -> String {
    let mut scanner = Scanner::new(statement);
    scanner.scan();
    let mut tokens = scanner.into_tokens();
    if let Some(Token::Semicolon) = tokens.last() {
        tokens.pop();
    }

    let mut out = String::new();
    let mut glue = false;
    for token in &tokens {
        if matches!(token, Token::Dot) {
            out.push('.');
            glue = true;
            continue;
        }
        if !out.is_empty() && !glue {
            out.push(' ');
        }
        out.push_str(&token.text());
        glue = false;
    }

    out
}

fn is_operand(word: &str) -> bool {
    !matches!(word, "(" | ")" | ",")
}

/// Mask every `from` that acts as a function argument separator rather than
/// a table source, rewriting it to [`FROM_MARK`].
///
/// One pass rewrites every occurrence of the shape
/// `( <operand> from <operand> (|)` it can see; passes repeat until a full
/// pass changes nothing, since a masked inner call can unblock an enclosing
/// match. Masked occurrences never re-match, so the pass count is bounded by
/// the number of `from` words in the input.
pub fn guard_function_from(query: &str) -> String {
    let mut words: Vec<String> = query.split_whitespace().map(str::to_owned).collect();

    let max_passes = words.len();
    for _ in 0..=max_passes {
        let mut changed = false;
        let mut i = 0;
        while i + 4 < words.len() {
            if words[i] == "("
                && is_operand(&words[i + 1])
                && words[i + 2] == "from"
                && is_operand(&words[i + 3])
                && (words[i + 4] == "(" || words[i + 4] == ")")
            {
                words[i + 2] = FROM_MARK.to_owned();
                changed = true;
            }
            i += 1;
        }
        if !changed {
            break;
        }
    }

    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_keywords_and_spaces_tokens() {
        let q = normalize("CREATE VIEW v AS\nSELECT a,b FROM  t;");
        assert_eq!(q, "create view v as select a , b from t");
    }

    #[test]
    fn test_normalize_strips_comments() {
        let q = normalize(
            "select a -- trailing note\nfrom t /* multi\nline */ where a = 1",
        );
        assert_eq!(q, "select a from t where a = 1");
    }

    #[test]
    fn test_normalize_glues_dot_qualifiers() {
        let q = normalize("select * from schema . object");
        assert_eq!(q, "select * from schema.object");
    }

    #[test]
    fn test_normalize_spaces_operators() {
        let q = normalize("select a||b, c::int from t where a<>0 and b>=2");
        assert_eq!(
            q,
            "select a || b , c :: int from t where a <> 0 and b >= 2"
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for q in [
            "create view v as select * from t",
            "select extract ( month from col ) from t",
            "select a || b , c.d from s.t where a <> 0",
            "",
        ] {
            let once = normalize(q);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_split_statements_ignores_quoted_semicolons() {
        let statements = split_statements(
            "create view a as select ';' from t;\n-- comment; with semicolon\nselect * from a;",
        );
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("create view a"));
    }

    #[test]
    fn test_guard_masks_function_from() {
        let q = guard_function_from("select extract ( month from col ) from t");
        assert_eq!(q, "select extract ( month %FROM% col ) from t");
    }

    #[test]
    fn test_guard_masks_nested_functions_to_quiescence() {
        let q = guard_function_from(
            "select extract ( month from to_timestamp ( trim ( '\"' from string ) , 'fmt' ) ) from t",
        );
        assert_eq!(
            q,
            "select extract ( month %FROM% to_timestamp ( trim ( '\"' %FROM% string ) , 'fmt' ) ) from t"
        );
    }

    #[test]
    fn test_guard_leaves_table_sources_untouched() {
        let q = "select * from t join valid_from vf on t.a = vf.a";
        assert_eq!(guard_function_from(q), q);
    }
}
