use super::lexer::{PatternToken, Placeholder};

/// How a placeholder absorbs a neighbouring slash into its regex group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashBinding {
    /// `(?P<p>re)`
    Required,
    /// `(?P<p>re)?`
    Bare,
    /// `(/(?P<p>re))?`, takes the slash in front of it.
    Leading,
    /// `((?P<p>re)/)?`, takes the slash after it.
    Trailing,
}

const CONNECTIVES: &[u8] = b"/-._,~";

fn is_connective(b: u8) -> bool {
    CONNECTIVES.contains(&b)
}

/// Decides a binding for every placeholder of `source`, in order.
///
/// A run of optional placeholders at the very start of the pattern (each
/// followed by `/` and more pattern) keeps its trailing slash, so that
/// `<lang>/<page>/posts` can lose `en/` without leaving an empty segment.
/// An optional placeholder enclosed by slashes (or a slash and the end)
/// keeps its leading slash instead.
pub fn bind_slashes(
    source: &str,
    placeholders: &[&Placeholder],
    is_optional: &dyn Fn(&str) -> bool,
    allow_trailing: bool,
) -> Vec<SlashBinding> {
    let bytes = source.as_bytes();
    let mut bindings = Vec::with_capacity(placeholders.len());
    let mut old_offset = 0usize;
    let mut in_leading_run = false;

    for ph in placeholders {
        if !is_optional(&ph.name) {
            in_leading_run = false;
            bindings.push(SlashBinding::Required);
            continue;
        }

        let offset = ph.offset;
        let end = ph.end();
        let binding = if allow_trailing
            && (in_leading_run || offset == 1)
            && offset == old_offset + 1
            && bytes.get(end) == Some(&b'/')
            && end + 1 < bytes.len()
        {
            in_leading_run = true;
            SlashBinding::Trailing
        } else if offset > 1
            && bytes[offset - 1] == b'/'
            && (end == bytes.len() || bytes[end] == b'/')
        {
            in_leading_run = false;
            SlashBinding::Leading
        } else {
            SlashBinding::Bare
        };

        old_offset = end;
        bindings.push(binding);
    }

    bindings
}

/// True when removing every `/<optional>/` leaves nothing but slashes, in
/// which case trailing-slash binding must not be used.
pub fn only_optional_content(
    source: &str,
    placeholders: &[&Placeholder],
    is_optional: &dyn Fn(&str) -> bool,
) -> bool {
    let mut required = source.to_string();
    for ph in placeholders {
        if is_optional(&ph.name) {
            let raw = &source[ph.offset..ph.end()];
            required = required.replace(&format!("/{raw}/"), "//");
        }
    }
    required.trim_matches('/').is_empty()
}

/// Byte offsets at which `source` can be cut to drop 1, 2, ... trailing
/// optional placeholders together with their connective text.
///
/// The run is walked from the end: each member must be optional and be
/// preceded by a literal ending in connective characters. The walk stops at
/// a required placeholder, at two adjacent placeholders, or at a literal that
/// carries more than connectives.
pub fn collapse_cuts(
    tokens: &[PatternToken],
    trailing_wrapper: &str,
    is_optional: &dyn Fn(&str) -> bool,
) -> Vec<usize> {
    let mut cuts = Vec::new();

    let mut core_len = tokens.len();
    if !trailing_wrapper.is_empty() {
        match tokens.last() {
            Some(PatternToken::Literal(text)) if text == trailing_wrapper => core_len -= 1,
            _ => return cuts,
        }
    }

    let mut idx = match core_len.checked_sub(1) {
        Some(idx) => idx,
        None => return cuts,
    };

    loop {
        let Some(ph) = tokens[idx].as_placeholder() else {
            break;
        };
        if !is_optional(&ph.name) || idx == 0 {
            break;
        }
        let Some(literal) = tokens[idx - 1].as_literal() else {
            break;
        };

        let connective_len = literal
            .bytes()
            .rev()
            .take_while(|b| is_connective(*b))
            .count();
        if connective_len == 0 {
            break;
        }

        cuts.push(ph.offset - connective_len);

        if connective_len < literal.len() || idx < 2 {
            break;
        }
        idx -= 2;
    }

    cuts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::lexer::tokenize;

    fn placeholders(tokens: &[PatternToken]) -> Vec<&Placeholder> {
        tokens.iter().filter_map(PatternToken::as_placeholder).collect()
    }

    fn bindings_for(source: &str, optional: &[&str], allow_trailing: bool) -> Vec<SlashBinding> {
        let tokens = tokenize(source).unwrap();
        let phs = placeholders(&tokens);
        bind_slashes(source, &phs, &|n| optional.contains(&n), allow_trailing)
    }

    #[test]
    fn required_placeholders_stay_required() {
        assert_eq!(
            bindings_for("/post/<id>/", &[], true),
            vec![SlashBinding::Required]
        );
    }

    #[test]
    fn enclosed_optional_takes_leading_slash() {
        assert_eq!(
            bindings_for("/post/<page>/<tag>/", &["page"], true),
            vec![SlashBinding::Leading, SlashBinding::Required]
        );
    }

    #[test]
    fn optional_next_to_text_stays_bare() {
        assert_eq!(
            bindings_for("/post/<page>-<tag>/", &["page"], true),
            vec![SlashBinding::Bare, SlashBinding::Required]
        );
    }

    #[test]
    fn leading_run_takes_trailing_slashes() {
        assert_eq!(
            bindings_for("/<lang>/<page>/posts/", &["lang", "page"], true),
            vec![SlashBinding::Trailing, SlashBinding::Trailing]
        );
    }

    #[test]
    fn leading_run_breaks_on_required_placeholder() {
        assert_eq!(
            bindings_for("/<lang>/<id>/<page>/x/", &["lang", "page"], true),
            vec![
                SlashBinding::Trailing,
                SlashBinding::Required,
                SlashBinding::Leading
            ]
        );
    }

    #[test]
    fn trailing_binding_can_be_disabled() {
        assert_eq!(
            bindings_for("/<a>/<b>/", &["a", "b"], false),
            vec![SlashBinding::Bare, SlashBinding::Leading]
        );
    }

    #[test]
    fn detects_patterns_made_only_of_optionals() {
        let source = "/<a>/<b>/";
        let tokens = tokenize(source).unwrap();
        let phs = placeholders(&tokens);
        assert!(only_optional_content(source, &phs, &|_| true));
        assert!(!only_optional_content(source, &phs, &|n| n == "a"));

        let source = "/<a>-<b>/";
        let tokens = tokenize(source).unwrap();
        let phs = placeholders(&tokens);
        assert!(!only_optional_content(source, &phs, &|_| true));
    }

    #[test]
    fn collapse_cut_per_drop_length() {
        let source = "/post/<page:\\d+>-<tag>/";
        let tokens = tokenize(source).unwrap();

        let cuts = collapse_cuts(&tokens, "/", &|_| true);
        assert_eq!(cuts.len(), 2);
        assert_eq!(&source[..cuts[0]], "/post/<page:\\d+>");
        assert_eq!(&source[..cuts[1]], "/post");
    }

    #[test]
    fn collapse_stops_at_required_placeholder() {
        let source = "/post/<page:\\d+>-<tag>/";
        let tokens = tokenize(source).unwrap();
        assert!(collapse_cuts(&tokens, "/", &|n| n == "page").is_empty());

        let cuts = collapse_cuts(&tokens, "/", &|n| n == "tag");
        assert_eq!(cuts.len(), 1);
        assert_eq!(&source[..cuts[0]], "/post/<page:\\d+>");
    }

    #[test]
    fn collapse_requires_connective_text() {
        let source = "/post/<a><b>/";
        let tokens = tokenize(source).unwrap();
        let cuts = collapse_cuts(&tokens, "/", &|_| true);
        assert!(cuts.is_empty());

        let source = "/post/<a>x<b>/";
        let tokens = tokenize(source).unwrap();
        assert!(collapse_cuts(&tokens, "/", &|_| true).is_empty());
    }

    #[test]
    fn collapse_ignores_patterns_not_ending_in_placeholder() {
        let source = "/<page>/posts/";
        let tokens = tokenize(source).unwrap();
        assert!(collapse_cuts(&tokens, "/", &|_| true).is_empty());
    }

    #[test]
    fn collapse_walks_through_three_members() {
        let source = "/a/<x>/<y>.<z>/";
        let tokens = tokenize(source).unwrap();
        let cuts = collapse_cuts(&tokens, "/", &|_| true);
        let heads: Vec<&str> = cuts.iter().map(|c| &source[..*c]).collect();
        assert_eq!(heads, vec!["/a/<x>/<y>", "/a/<x>", "/a"]);
    }
}
