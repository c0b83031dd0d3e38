use crate::manager::UrlManagerOptionsError;
use crate::pattern::PatternError;
use crate::rule::RuleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UrlManagerError {
    #[error(transparent)]
    Rule(#[from] RuleError),
    #[error(transparent)]
    Options(#[from] UrlManagerOptionsError),
    #[error("invalid url manager configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("host_info is not configured; absolute urls cannot be created")]
    HostInfoMissing,
}

impl From<PatternError> for UrlManagerError {
    fn from(err: PatternError) -> Self {
        UrlManagerError::Rule(RuleError::Pattern(err))
    }
}

pub type UrlManagerResult<T> = Result<T, UrlManagerError>;
