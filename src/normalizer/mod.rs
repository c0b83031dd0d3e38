mod action;
mod normalize;

pub use action::{NormalizerAction, RedirectStatus, RouteOutcome, RouteTransform};
pub use normalize::{NormalizedPath, UrlNormalizer, collapse_slashes, normalize_trailing_slash};
