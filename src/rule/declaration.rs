use crate::enums::{HttpMethod, RuleMode};
use crate::group::{GroupRule, GroupRuleOptions, RestRule, RestRuleOptions};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;

use super::{Rule, RuleResult, UrlRule, UrlRuleOptions};

/// A rule as written in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleDeclaration {
    /// `"VERB,VERB pattern" => route`.
    Short { key: String, route: String },
    Full(UrlRuleOptions),
    Group(GroupRuleOptions),
    Rest(RestRuleOptions),
    #[serde(skip)]
    Custom(Arc<dyn Rule>),
}

impl RuleDeclaration {
    pub fn short<K: Into<String>, R: Into<String>>(key: K, route: R) -> Self {
        RuleDeclaration::Short {
            key: key.into(),
            route: route.into(),
        }
    }

    pub fn custom<R: Rule + 'static>(rule: R) -> Self {
        RuleDeclaration::Custom(Arc::new(rule))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RuleDeclaration::Short { .. } => "short",
            RuleDeclaration::Full(_) => "full",
            RuleDeclaration::Group(_) => "group",
            RuleDeclaration::Rest(_) => "rest",
            RuleDeclaration::Custom(_) => "custom",
        }
    }

    /// Builds the rule the way a manager does: a short rule that cannot
    /// answer `GET` is only used for parsing.
    pub fn into_rule(self) -> RuleResult<Arc<dyn Rule>> {
        match self {
            RuleDeclaration::Short { key, route } => {
                let parsed = parse_verb_key(&key, false);
                let mode = if parsed.verbs.is_empty() || parsed.verbs.contains(&HttpMethod::Get) {
                    RuleMode::Both
                } else {
                    RuleMode::ParsingOnly
                };
                let options = UrlRuleOptions::builder()
                    .pattern(parsed.pattern)
                    .route(route)
                    .verbs(parsed.verbs.into_vec())
                    .mode(mode)
                    .build();
                Ok(Arc::new(UrlRule::new(options)?))
            }
            RuleDeclaration::Full(options) => Ok(Arc::new(UrlRule::new(options)?)),
            RuleDeclaration::Group(options) => Ok(Arc::new(GroupRule::new(options)?)),
            RuleDeclaration::Rest(options) => Ok(Arc::new(RestRule::new(options)?)),
            RuleDeclaration::Custom(rule) => Ok(rule),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerbKey<'a> {
    pub verbs: SmallVec<[HttpMethod; 2]>,
    pub pattern: &'a str,
}

/// Splits `"PUT,PATCH post/<id>"` into its verbs and pattern. Only upper-case
/// verbs count; a key without a verb list is all pattern. With `allow_bare`
/// a key made of verbs alone (`"POST"`) has an empty pattern.
pub fn parse_verb_key(key: &str, allow_bare: bool) -> VerbKey<'_> {
    let all_pattern = VerbKey {
        verbs: SmallVec::new(),
        pattern: key,
    };

    let (head, pattern) = match key.find(char::is_whitespace) {
        Some(split) => (&key[..split], key[split..].trim_start()),
        None if allow_bare => (key, ""),
        None => return all_pattern,
    };

    let mut verbs = SmallVec::new();
    for word in head.split(',') {
        match HttpMethod::from_keyword(word) {
            Some(verb) => verbs.push(verb),
            None => return all_pattern,
        }
    }

    VerbKey { verbs, pattern }
}
