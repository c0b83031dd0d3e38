pub mod enums;
pub mod errors;
pub mod group;
pub mod manager;
pub mod normalizer;
pub mod pattern;
pub mod request;
pub mod rule;
pub mod types;

pub use enums::{HttpMethod, RuleMode, UnknownHttpMethod};
pub use errors::{UrlManagerError, UrlManagerResult};
pub use group::{
    GroupRule, GroupRuleOptions, RestController, RestPattern, RestRule, RestRuleOptions,
};
pub use manager::{
    CreatedUrl, Resolution, ShadowedRule, UrlManager, UrlManagerConfig, UrlManagerOptions,
    UrlManagerOptionsError,
};
pub use normalizer::{NormalizerAction, RedirectStatus, RouteOutcome, UrlNormalizer};
pub use pattern::{CompiledPattern, PatternError};
pub use request::Request;
pub use rule::{
    CreateStatus, Rule, RuleContext, RuleDeclaration, RuleError, RuleNormalizer, RuleResult,
    RuleSignature, UrlCreation, UrlRule, UrlRuleOptions,
};
pub use types::{ANCHOR_PARAM, ParsedRoute, RouteParams, params};
