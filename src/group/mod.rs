mod group_rule;
mod inflector;
mod options;
mod rest;

pub use group_rule::GroupRule;
pub use inflector::{camel_to_id, pluralize};
pub use options::{
    GroupRuleOptions, GroupRuleOptionsBuilder, RestController, RestPattern, RestRuleOptions,
    RestRuleOptionsBuilder, default_rest_patterns, default_rest_tokens,
};
pub use rest::RestRule;
