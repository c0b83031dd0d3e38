use memchr::{memchr, memchr2};

use super::{PatternError, PatternResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternToken {
    Literal(String),
    Placeholder(Placeholder),
}

impl PatternToken {
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            PatternToken::Literal(text) => Some(text),
            PatternToken::Placeholder(_) => None,
        }
    }

    pub fn as_placeholder(&self) -> Option<&Placeholder> {
        match self {
            PatternToken::Placeholder(ph) => Some(ph),
            PatternToken::Literal(_) => None,
        }
    }
}

/// A `<name>` or `<name:regex>` occurrence. `offset` and `len` locate the
/// whole `<...>` text in the source pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,
    pub constraint: Option<String>,
    pub offset: usize,
    pub len: usize,
}

impl Placeholder {
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-')
}

#[tracing::instrument(level = "trace", fields(pattern=%pattern))]
pub fn tokenize(pattern: &str) -> PatternResult<Vec<PatternToken>> {
    let bytes = pattern.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0usize;
    let mut seen: smallvec::SmallVec<[&str; 8]> = smallvec::SmallVec::new();

    while pos < bytes.len() {
        let Some(rel) = memchr2(b'<', b'>', &bytes[pos..]) else {
            tokens.push(PatternToken::Literal(pattern[pos..].to_string()));
            break;
        };
        let at = pos + rel;

        if bytes[at] == b'>' {
            return Err(PatternError::UnexpectedClosingBracket {
                pattern: pattern.to_string(),
                index: at,
            });
        }

        if at > pos {
            tokens.push(PatternToken::Literal(pattern[pos..at].to_string()));
        }

        let placeholder = read_placeholder(pattern, at)?;
        let name = &pattern[at + 1..at + 1 + placeholder.name.len()];
        if seen.contains(&name) {
            return Err(PatternError::DuplicateParamName {
                pattern: pattern.to_string(),
                name: placeholder.name,
            });
        }
        seen.push(name);

        pos = placeholder.end();
        tokens.push(PatternToken::Placeholder(placeholder));
    }

    Ok(tokens)
}

fn read_placeholder(pattern: &str, start: usize) -> PatternResult<Placeholder> {
    let bytes = pattern.as_bytes();
    let mut idx = start + 1;

    while idx < bytes.len() && is_name_byte(bytes[idx]) {
        idx += 1;
    }
    let name = &pattern[start + 1..idx];

    match bytes.get(idx).copied() {
        None => Err(PatternError::UnterminatedPlaceholder {
            pattern: pattern.to_string(),
            start,
        }),
        Some(_) if name.is_empty() => Err(PatternError::ParameterMissingName {
            pattern: pattern.to_string(),
            start,
        }),
        Some(b'>') => Ok(Placeholder {
            name: name.to_string(),
            constraint: None,
            offset: start,
            len: idx + 1 - start,
        }),
        Some(b':') => {
            let body_start = idx + 1;
            let Some(rel) = memchr(b'>', &bytes[body_start..]) else {
                return Err(PatternError::UnterminatedPlaceholder {
                    pattern: pattern.to_string(),
                    start,
                });
            };
            let body = &pattern[body_start..body_start + rel];
            Ok(Placeholder {
                name: name.to_string(),
                constraint: (!body.is_empty()).then(|| body.to_string()),
                offset: start,
                len: body_start + rel + 1 - start,
            })
        }
        Some(_) => {
            let invalid = pattern[idx..].chars().next().unwrap_or('<');
            Err(PatternError::ParameterInvalidCharacter {
                pattern: pattern.to_string(),
                name: name.to_string(),
                invalid,
            })
        }
    }
}

/// Splits a route such as `<controller>/<action>` into tokens. Routes only
/// name their placeholders; regexes live in the pattern.
pub fn tokenize_route(route: &str) -> PatternResult<Vec<PatternToken>> {
    let tokens = tokenize(route)?;
    for token in &tokens {
        if let PatternToken::Placeholder(ph) = token
            && ph.constraint.is_some()
        {
            return Err(PatternError::ConstraintInRoute {
                route: route.to_string(),
                name: ph.name.clone(),
            });
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholder(token: &PatternToken) -> &Placeholder {
        token.as_placeholder().expect("expected placeholder token")
    }

    #[test]
    fn splits_literals_and_placeholders() {
        let tokens = tokenize("/post/<page:\\d+>-<tag>/").unwrap();
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[0].as_literal(), Some("/post/"));
        let page = placeholder(&tokens[1]);
        assert_eq!(page.name, "page");
        assert_eq!(page.constraint.as_deref(), Some("\\d+"));
        assert_eq!((page.offset, page.len), (6, 10));
        assert_eq!(tokens[2].as_literal(), Some("-"));
        assert_eq!(placeholder(&tokens[3]).constraint, None);
        assert_eq!(tokens[4].as_literal(), Some("/"));
    }

    #[test]
    fn empty_constraint_means_default() {
        let tokens = tokenize("<id:>").unwrap();
        assert_eq!(placeholder(&tokens[0]).constraint, None);
    }

    #[test]
    fn accepts_dots_and_dashes_in_names() {
        let tokens = tokenize("<a.b-c_d>").unwrap();
        assert_eq!(placeholder(&tokens[0]).name, "a.b-c_d");
    }

    #[test]
    fn rejects_unterminated_placeholder() {
        match tokenize("post/<id").unwrap_err() {
            PatternError::UnterminatedPlaceholder { start, .. } => assert_eq!(start, 5),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            tokenize("post/<id:\\d+").unwrap_err(),
            PatternError::UnterminatedPlaceholder { .. }
        ));
    }

    #[test]
    fn rejects_stray_closing_bracket() {
        match tokenize("post/id>").unwrap_err() {
            PatternError::UnexpectedClosingBracket { index, .. } => assert_eq!(index, 7),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_and_invalid_names() {
        assert!(matches!(
            tokenize("<:\\d+>").unwrap_err(),
            PatternError::ParameterMissingName { .. }
        ));
        match tokenize("<a b>").unwrap_err() {
            PatternError::ParameterInvalidCharacter { name, invalid, .. } => {
                assert_eq!(name, "a");
                assert_eq!(invalid, ' ');
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_names() {
        match tokenize("<id>/<id:\\d+>").unwrap_err() {
            PatternError::DuplicateParamName { name, .. } => assert_eq!(name, "id"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn route_templates_reject_constraints() {
        assert!(tokenize_route("<controller>/<action>").is_ok());
        assert!(matches!(
            tokenize_route("<controller:\\w+>/index").unwrap_err(),
            PatternError::ConstraintInRoute { .. }
        ));
    }
}
