mod cache;
mod options;
mod outcome;
mod service;

pub use cache::{CacheStats, RuleCache, RuleIndices};
pub use options::{
    DEFAULT_ROUTE_PARAM, UrlManagerConfig, UrlManagerOptions, UrlManagerOptionsBuilder,
    UrlManagerOptionsError,
};
pub use outcome::{CreatedUrl, Resolution, ShadowedRule};
pub use service::UrlManager;
