use crate::normalizer::RouteOutcome;
use crate::request::Request;
use crate::rule::{
    CreateStatus, Rule, RuleContext, RuleDeclaration, RuleError, RuleResult, UrlCreation, UrlRule,
    UrlRuleOptions, create_with_rules, parse_with_rules, parse_verb_key,
};
use crate::types::RouteParams;
use std::sync::Arc;

use super::GroupRuleOptions;

/// Rules sharing a URL prefix and a route prefix. Requests outside the
/// prefix never reach the children.
#[derive(Debug)]
pub struct GroupRule {
    prefix: String,
    route_prefix: String,
    rules: Vec<Arc<dyn Rule>>,
}

impl GroupRule {
    pub fn new(options: GroupRuleOptions) -> RuleResult<Self> {
        let GroupRuleOptions {
            prefix,
            route_prefix,
            rules: declarations,
        } = options;
        let (prefix, route_prefix) = Self::prefixes(&prefix, route_prefix.as_deref())?;

        let mut rules: Vec<Arc<dyn Rule>> = Vec::with_capacity(declarations.len());
        for declaration in declarations {
            let rule: Arc<dyn Rule> = match declaration {
                RuleDeclaration::Short { key, route } => {
                    let parsed = parse_verb_key(&key, false);
                    Arc::new(UrlRule::new(
                        UrlRuleOptions::builder()
                            .pattern(join_prefix(&prefix, parsed.pattern))
                            .route(join_prefix(&route_prefix, &route))
                            .verbs(parsed.verbs.into_vec())
                            .build(),
                    )?)
                }
                RuleDeclaration::Full(mut options) => {
                    options.pattern = join_prefix(&prefix, &options.pattern);
                    options.route = join_prefix(&route_prefix, &options.route);
                    Arc::new(UrlRule::new(options)?)
                }
                RuleDeclaration::Custom(rule) => rule,
                other => {
                    return Err(RuleError::UnsupportedGroupMember { kind: other.kind() });
                }
            };
            rules.push(rule);
        }

        Ok(Self {
            prefix,
            route_prefix,
            rules,
        })
    }

    /// Groups already-built rules. They are used as given, without prefixing.
    pub fn from_rules(
        prefix: &str,
        route_prefix: Option<&str>,
        rules: Vec<Arc<dyn Rule>>,
    ) -> RuleResult<Self> {
        let (prefix, route_prefix) = Self::prefixes(prefix, route_prefix)?;
        Ok(Self {
            prefix,
            route_prefix,
            rules,
        })
    }

    fn prefixes(prefix: &str, route_prefix: Option<&str>) -> RuleResult<(String, String)> {
        let prefix = prefix.trim_matches('/').to_string();
        if prefix.contains('<') {
            return Err(RuleError::GroupPrefixContainsPlaceholder { prefix });
        }
        let route_prefix = route_prefix
            .map(|value| value.trim_matches('/').to_string())
            .unwrap_or_else(|| prefix.clone());
        Ok((prefix, route_prefix))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn route_prefix(&self) -> &str {
        &self.route_prefix
    }

    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }
}

impl Rule for GroupRule {
    fn parse_request(&self, ctx: &RuleContext<'_>, request: &Request) -> Option<RouteOutcome> {
        if !self.prefix.is_empty() && !has_segment_prefix(request.path_info(), &self.prefix) {
            return None;
        }
        parse_with_rules(&self.rules, ctx, request)
    }

    fn create_url(&self, ctx: &RuleContext<'_>, route: &str, params: &RouteParams) -> UrlCreation {
        if !self.route_prefix.is_empty()
            && !route
                .strip_prefix(self.route_prefix.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
        {
            return UrlCreation::failed(CreateStatus::ROUTE_MISMATCH);
        }
        create_with_rules(&self.rules, ctx, route, params)
    }

    fn describe(&self) -> String {
        format!("group '{}'", self.prefix)
    }
}

/// `prefix/value` with the leading slash of an empty prefix dropped.
pub(crate) fn join_prefix(prefix: &str, value: &str) -> String {
    format!("{prefix}/{value}").trim_start_matches('/').to_string()
}

/// `true` when `path` is `prefix` itself or continues it with `/`.
pub(crate) fn has_segment_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
