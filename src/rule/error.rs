use crate::pattern::PatternError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("route '{route}' uses parameter '{name}' which does not appear in pattern '{pattern}'")]
    RouteParamNotInPattern {
        route: String,
        pattern: String,
        name: String,
    },
    #[error("group prefix '{prefix}' must not contain placeholders")]
    GroupPrefixContainsPlaceholder { prefix: String },
    #[error("group member of kind '{kind}' is not supported")]
    UnsupportedGroupMember { kind: &'static str },
    #[error("rest rule needs at least one controller")]
    EmptyRestControllers,
}

pub type RuleResult<T> = Result<T, RuleError>;
