use regex::Regex;

use super::collapse::{SlashBinding, bind_slashes, collapse_cuts, only_optional_content};
use super::lexer::{PatternToken, Placeholder, tokenize};
use super::{PatternError, PatternResult};

pub const DEFAULT_PARAM_PATTERN: &str = "[^/]+";
const ANY_SCHEME: &str = r"\w+://";

/// Compiles an anchored full-match regex for a placeholder constraint.
pub fn full_match_regex(pattern: &str, name: &str, constraint: &str) -> PatternResult<Regex> {
    Regex::new(&format!("^(?:{constraint})$")).map_err(|err| PatternError::RegexConstraintInvalid {
        pattern: pattern.to_string(),
        name: name.to_string(),
        error: err.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderSpec {
    pub name: String,
    pub group: String,
    pub constraint: Option<String>,
    pub optional: bool,
    pub binding: SlashBinding,
}

impl PlaceholderSpec {
    pub fn regex_source(&self) -> &str {
        self.constraint.as_deref().unwrap_or(DEFAULT_PARAM_PATTERN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Literal(String),
    Slot(usize),
}

/// One matcher/template pair. The full pattern is the first shape, each
/// collapse variant adds another with fewer trailing placeholders.
#[derive(Debug, Clone)]
pub struct PatternShape {
    regex: Regex,
    template: Vec<TemplatePart>,
    slots: usize,
}

impl PatternShape {
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn slot_count(&self) -> usize {
        self.slots
    }
}

#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    placeholders: Vec<PlaceholderSpec>,
    shapes: Vec<PatternShape>,
}

/// Input knobs for [`CompiledPattern::compile`].
pub struct CompileOptions<'a> {
    pub is_optional: &'a dyn Fn(&str) -> bool,
    /// `source` starts with `//` and must accept any scheme.
    pub protocol_relative: bool,
    /// Literal the source was wrapped in at its end (`/` for plain paths).
    pub trailing_wrapper: &'a str,
}

pub struct PatternMatch<'t> {
    values: Vec<Option<&'t str>>,
}

impl<'t> PatternMatch<'t> {
    /// Captured value of placeholder `index`, `None` when it did not take part.
    pub fn get(&self, index: usize) -> Option<&'t str> {
        self.values.get(index).copied().flatten()
    }
}

impl CompiledPattern {
    /// Matches only the empty string.
    pub fn empty() -> Self {
        let regex = Regex::new("^$").expect("empty matcher should compile");
        Self {
            source: String::new(),
            placeholders: Vec::new(),
            shapes: vec![PatternShape {
                regex,
                template: Vec::new(),
                slots: 0,
            }],
        }
    }

    #[tracing::instrument(level = "trace", skip(options), fields(source=%source))]
    pub fn compile(source: &str, options: &CompileOptions<'_>) -> PatternResult<Self> {
        let tokens = tokenize(source)?;
        let phs: Vec<&Placeholder> = tokens
            .iter()
            .filter_map(PatternToken::as_placeholder)
            .collect();

        let allow_trailing = !only_optional_content(source, &phs, options.is_optional);
        let bindings = bind_slashes(source, &phs, options.is_optional, allow_trailing);

        let mut placeholders = Vec::with_capacity(phs.len());
        for (idx, (ph, binding)) in phs.iter().zip(bindings).enumerate() {
            if let Some(constraint) = &ph.constraint {
                full_match_regex(source, &ph.name, constraint)?;
            }
            placeholders.push(PlaceholderSpec {
                name: ph.name.clone(),
                group: format!("p{idx}"),
                constraint: ph.constraint.clone(),
                optional: (options.is_optional)(&ph.name),
                binding,
            });
        }

        let mut shapes = vec![build_shape(
            source,
            &tokens,
            &placeholders,
            options.protocol_relative,
        )?];

        for cut in collapse_cuts(&tokens, options.trailing_wrapper, options.is_optional) {
            let head = format!("{}{}", &source[..cut], options.trailing_wrapper);
            let head_tokens = tokenize(&head)?;
            let head_phs: Vec<&Placeholder> = head_tokens
                .iter()
                .filter_map(PatternToken::as_placeholder)
                .collect();
            let allow = !only_optional_content(&head, &head_phs, options.is_optional);
            let head_bindings = bind_slashes(&head, &head_phs, options.is_optional, allow);
            let head_specs: Vec<PlaceholderSpec> = placeholders
                .iter()
                .zip(head_bindings)
                .map(|(spec, binding)| PlaceholderSpec {
                    binding,
                    ..spec.clone()
                })
                .collect();
            shapes.push(build_shape(
                &head,
                &head_tokens,
                &head_specs,
                options.protocol_relative,
            )?);
        }

        Ok(Self {
            source: source.to_string(),
            placeholders,
            shapes,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn placeholders(&self) -> &[PlaceholderSpec] {
        &self.placeholders
    }

    pub fn placeholder(&self, name: &str) -> Option<&PlaceholderSpec> {
        self.placeholders.iter().find(|p| p.name == name)
    }

    pub fn shapes(&self) -> &[PatternShape] {
        &self.shapes
    }

    /// The full-pattern matcher.
    pub fn regex(&self) -> &Regex {
        &self.shapes[0].regex
    }

    /// Tries the full matcher, then every collapse variant in drop order.
    pub fn match_str<'t>(&self, subject: &'t str) -> Option<PatternMatch<'t>> {
        self.shapes.iter().find_map(|shape| {
            let caps = shape.regex.captures(subject)?;
            let values = self
                .placeholders
                .iter()
                .enumerate()
                .map(|(idx, spec)| {
                    if idx >= shape.slots {
                        return None;
                    }
                    caps.name(&spec.group).map(|m| m.as_str())
                })
                .collect();
            Some(PatternMatch { values })
        })
    }

    /// Renders the template. `values` is indexed like [`Self::placeholders`];
    /// an empty value marks an elided placeholder. When a trailing run of
    /// placeholders is entirely elided the matching collapse variant is used.
    pub fn render(&self, values: &[String]) -> String {
        let elided = |idx: usize| values.get(idx).is_none_or(String::is_empty);

        let shape = self
            .shapes
            .iter()
            .skip(1)
            .rev()
            .find(|shape| (shape.slots..self.placeholders.len()).all(elided))
            .unwrap_or(&self.shapes[0]);

        let mut out = String::with_capacity(self.source.len());
        for part in &shape.template {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Slot(idx) => {
                    if let Some(value) = values.get(*idx) {
                        out.push_str(value);
                    }
                }
            }
        }
        out
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.placeholders.iter().map(|p| p.name.as_str())
    }
}

fn build_shape(
    source: &str,
    tokens: &[PatternToken],
    specs: &[PlaceholderSpec],
    protocol_relative: bool,
) -> PatternResult<PatternShape> {
    let body = emit_regex(tokens, specs);
    let body = body.trim_matches('/');
    let anchored = if protocol_relative {
        format!("^{ANY_SCHEME}{body}$")
    } else {
        format!("^{body}$")
    };

    let regex = Regex::new(&anchored).map_err(|err| PatternError::MatcherInvalid {
        pattern: source.to_string(),
        error: err.to_string(),
    })?;

    let mut template = Vec::with_capacity(tokens.len());
    let mut slot = 0usize;
    for token in tokens {
        match token {
            PatternToken::Literal(text) => template.push(TemplatePart::Literal(text.clone())),
            PatternToken::Placeholder(_) => {
                template.push(TemplatePart::Slot(slot));
                slot += 1;
            }
        }
    }

    Ok(PatternShape {
        regex,
        template,
        slots: slot,
    })
}

/// Concatenates escaped literals and placeholder groups. A slash claimed by
/// a `Trailing` placeholder is taken from the start of the next literal; a
/// slash claimed by a `Leading` placeholder from the end of the previous one.
/// When both want the same lone slash the earlier placeholder keeps it.
fn emit_regex(tokens: &[PatternToken], specs: &[PlaceholderSpec]) -> String {
    let mut out = String::new();
    let mut slot = 0usize;
    let mut head_taken = false;
    let mut leading_granted = false;

    for (idx, token) in tokens.iter().enumerate() {
        match token {
            PatternToken::Literal(text) => {
                let mut text = text.as_str();
                if head_taken {
                    text = &text[1..];
                    head_taken = false;
                }

                let next_wants_slash = tokens
                    .get(idx + 1)
                    .and_then(PatternToken::as_placeholder)
                    .is_some()
                    && specs.get(slot).map(|s| s.binding) == Some(SlashBinding::Leading);

                leading_granted = next_wants_slash && text.ends_with('/');
                if leading_granted {
                    text = &text[..text.len() - 1];
                }
                out.push_str(&regex::escape(text));
            }
            PatternToken::Placeholder(_) => {
                let Some(spec) = specs.get(slot) else {
                    continue;
                };
                let group = format!("(?P<{}>{})", spec.group, spec.regex_source());
                match spec.binding {
                    SlashBinding::Required => out.push_str(&group),
                    SlashBinding::Bare => {
                        out.push_str(&group);
                        out.push('?');
                    }
                    SlashBinding::Leading if leading_granted => {
                        out.push_str("(/");
                        out.push_str(&group);
                        out.push_str(")?");
                    }
                    SlashBinding::Leading => {
                        out.push_str(&group);
                        out.push('?');
                    }
                    SlashBinding::Trailing => {
                        out.push('(');
                        out.push_str(&group);
                        out.push_str("/)?");
                        head_taken = true;
                    }
                }
                leading_granted = false;
                slot += 1;
            }
        }
    }

    out
}
