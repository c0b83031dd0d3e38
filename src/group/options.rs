use crate::rule::RuleDeclaration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupRuleOptions {
    pub prefix: String,
    /// Defaults to `prefix`.
    pub route_prefix: Option<String>,
    pub rules: Vec<RuleDeclaration>,
}

impl GroupRuleOptions {
    pub fn builder() -> GroupRuleOptionsBuilder {
        GroupRuleOptionsBuilder::default()
    }
}

#[derive(Debug, Default, Clone)]
pub struct GroupRuleOptionsBuilder {
    options: GroupRuleOptions,
}

impl GroupRuleOptionsBuilder {
    pub fn prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.options.prefix = prefix.into();
        self
    }

    pub fn route_prefix<S: Into<String>>(mut self, route_prefix: S) -> Self {
        self.options.route_prefix = Some(route_prefix.into());
        self
    }

    pub fn rule(mut self, rule: RuleDeclaration) -> Self {
        self.options.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: Vec<RuleDeclaration>) -> Self {
        self.options.rules = rules;
        self
    }

    pub fn build(self) -> GroupRuleOptions {
        self.options
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestController {
    pub controller: String,
    /// Defaults to the controller's last segment, pluralized when enabled.
    #[serde(default)]
    pub url_name: Option<String>,
}

impl RestController {
    pub fn new<S: Into<String>>(controller: S) -> Self {
        Self {
            controller: controller.into(),
            url_name: None,
        }
    }

    pub fn with_url_name<S: Into<String>>(mut self, url_name: S) -> Self {
        self.url_name = Some(url_name.into());
        self
    }
}

/// `"VERB,VERB pattern" => action`. The verbs, the pattern or both may be
/// left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestPattern {
    pub key: String,
    pub action: String,
}

impl RestPattern {
    pub fn new<K: Into<String>, A: Into<String>>(key: K, action: A) -> Self {
        Self {
            key: key.into(),
            action: action.into(),
        }
    }
}

pub fn default_rest_patterns() -> Vec<RestPattern> {
    vec![
        RestPattern::new("PUT,PATCH {id}", "update"),
        RestPattern::new("DELETE {id}", "delete"),
        RestPattern::new("GET,HEAD {id}", "view"),
        RestPattern::new("POST", "create"),
        RestPattern::new("GET,HEAD", "index"),
        RestPattern::new("{id}", "options"),
        RestPattern::new("", "options"),
    ]
}

pub fn default_rest_tokens() -> BTreeMap<String, String> {
    BTreeMap::from([("{id}".to_string(), r"<id:\d[\d,]*>".to_string())])
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RestRuleOptions {
    pub prefix: String,
    pub suffix: Option<String>,
    pub controllers: Vec<RestController>,
    pub pluralize: bool,
    pub only: Vec<String>,
    pub except: Vec<String>,
    pub tokens: BTreeMap<String, String>,
    pub patterns: Vec<RestPattern>,
    /// Tried before `patterns`; a key present in both uses this action.
    pub extra_patterns: Vec<RestPattern>,
}

impl Default for RestRuleOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: None,
            controllers: Vec::new(),
            pluralize: true,
            only: Vec::new(),
            except: Vec::new(),
            tokens: default_rest_tokens(),
            patterns: default_rest_patterns(),
            extra_patterns: Vec::new(),
        }
    }
}

impl RestRuleOptions {
    pub fn builder() -> RestRuleOptionsBuilder {
        RestRuleOptionsBuilder::default()
    }
}

#[derive(Debug, Default, Clone)]
pub struct RestRuleOptionsBuilder {
    options: RestRuleOptions,
}

impl RestRuleOptionsBuilder {
    pub fn prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.options.prefix = prefix.into();
        self
    }

    pub fn suffix<S: Into<String>>(mut self, suffix: S) -> Self {
        self.options.suffix = Some(suffix.into());
        self
    }

    pub fn controller(mut self, controller: RestController) -> Self {
        self.options.controllers.push(controller);
        self
    }

    pub fn pluralize(mut self, value: bool) -> Self {
        self.options.pluralize = value;
        self
    }

    pub fn only<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.only = actions.into_iter().map(Into::into).collect();
        self
    }

    pub fn except<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.except = actions.into_iter().map(Into::into).collect();
        self
    }

    pub fn token<K: Into<String>, V: Into<String>>(mut self, token: K, replacement: V) -> Self {
        self.options.tokens.insert(token.into(), replacement.into());
        self
    }

    pub fn patterns(mut self, patterns: Vec<RestPattern>) -> Self {
        self.options.patterns = patterns;
        self
    }

    pub fn extra_pattern(mut self, pattern: RestPattern) -> Self {
        self.options.extra_patterns.push(pattern);
        self
    }

    pub fn build(self) -> RestRuleOptions {
        self.options
    }
}
