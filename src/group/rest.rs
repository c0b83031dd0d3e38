use crate::normalizer::RouteOutcome;
use crate::request::Request;
use crate::rule::{
    CreateStatus, Rule, RuleContext, RuleError, RuleResult, UrlCreation, UrlRule, UrlRuleOptions,
    iterate_rules, parse_verb_key, parse_with_rules,
};
use crate::types::RouteParams;
use hashbrown::HashSet;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::group_rule::has_segment_prefix;
use super::inflector::{camel_to_id, pluralize};
use super::{RestPattern, RestRuleOptions};

#[derive(Debug)]
struct ControllerRules {
    url_name: String,
    controller: String,
    rules: Vec<Arc<dyn Rule>>,
}

/// Expands REST controllers into verb-bound rules such as
/// `PUT,PATCH users/<id>` → `user/update`.
#[derive(Debug)]
pub struct RestRule {
    prefix: String,
    controllers: Vec<ControllerRules>,
}

impl RestRule {
    pub fn new(options: RestRuleOptions) -> RuleResult<Self> {
        if options.controllers.is_empty() {
            return Err(RuleError::EmptyRestControllers);
        }

        let prefix = options.prefix.trim_matches('/').to_string();
        let patterns = merge_patterns(&options.extra_patterns, &options.patterns);
        let allowed = |action: &str| {
            !options.except.iter().any(|a| a == action)
                && (options.only.is_empty() || options.only.iter().any(|a| a == action))
        };

        let mut controllers = Vec::with_capacity(options.controllers.len());
        for entry in &options.controllers {
            let url_name = match &entry.url_name {
                Some(name) => name.clone(),
                None => {
                    let base = entry.controller.rsplit('/').next().unwrap_or(&entry.controller);
                    let id = camel_to_id(base);
                    if options.pluralize { pluralize(&id) } else { id }
                }
            };
            let rule_prefix = format!("{prefix}/{url_name}").trim_matches('/').to_string();

            let mut rules: Vec<Arc<dyn Rule>> = Vec::new();
            for pattern in patterns.iter().filter(|p| allowed(&p.action)) {
                let route = format!("{}/{}", entry.controller, pattern.action);
                rules.push(Arc::new(build_rule(
                    &pattern.key,
                    &rule_prefix,
                    route,
                    &options.tokens,
                    options.suffix.as_deref(),
                )?));
            }

            controllers.push(ControllerRules {
                url_name,
                controller: entry.controller.clone(),
                rules,
            });
        }

        Ok(Self {
            prefix,
            controllers,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `(url name, controller)` pairs in declaration order.
    pub fn controllers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.controllers
            .iter()
            .map(|c| (c.url_name.as_str(), c.controller.as_str()))
    }

    pub fn rule_count(&self) -> usize {
        self.controllers.iter().map(|c| c.rules.len()).sum()
    }
}

impl Rule for RestRule {
    fn parse_request(&self, ctx: &RuleContext<'_>, request: &Request) -> Option<RouteOutcome> {
        let path = request.path_info();
        if !self.prefix.is_empty() && !has_segment_prefix(path, &self.prefix) {
            return None;
        }
        self.controllers
            .iter()
            .filter(|c| path.contains(c.url_name.as_str()))
            .find_map(|c| parse_with_rules(&c.rules, ctx, request))
    }

    fn create_url(&self, ctx: &RuleContext<'_>, route: &str, params: &RouteParams) -> UrlCreation {
        let mut status = CreateStatus::SUCCESS;
        for entry in &self.controllers {
            if !route.contains(entry.controller.as_str()) {
                status |= CreateStatus::ROUTE_MISMATCH;
                continue;
            }
            match iterate_rules(&entry.rules, ctx, route, params, status) {
                Ok(url) => return UrlCreation::created(url),
                Err(acc) => status = acc,
            }
        }

        if status.is_success() {
            status = CreateStatus::PARSING_ONLY;
        }
        UrlCreation::failed(status)
    }

    fn describe(&self) -> String {
        let names: Vec<&str> = self.controllers.iter().map(|c| c.url_name.as_str()).collect();
        format!("rest '{}'", names.join(","))
    }
}

/// `extra` first, then every pattern of `base` whose key `extra` lacks.
fn merge_patterns<'a>(extra: &'a [RestPattern], base: &'a [RestPattern]) -> Vec<&'a RestPattern> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(extra.len() + base.len());
    extra
        .iter()
        .chain(base)
        .filter(|p| seen.insert(p.key.as_str()))
        .collect()
}

fn build_rule(
    key: &str,
    prefix: &str,
    route: String,
    tokens: &BTreeMap<String, String>,
    suffix: Option<&str>,
) -> RuleResult<UrlRule> {
    let parsed = parse_verb_key(key, true);
    let pattern = format!("{prefix}/{}", parsed.pattern);

    let mut builder = UrlRuleOptions::builder()
        .pattern(pattern.trim_end_matches('/'))
        .route(route)
        .verbs(parsed.verbs.into_vec())
        .tokens(tokens.clone());
    if let Some(suffix) = suffix {
        builder = builder.suffix(suffix);
    }
    UrlRule::new(builder.build())
}
