mod collapse;
mod compiled;
mod error;
mod lexer;

pub use collapse::SlashBinding;
pub use compiled::{
    CompileOptions, CompiledPattern, DEFAULT_PARAM_PATTERN, PatternMatch, PatternShape,
    PlaceholderSpec, full_match_regex,
};
pub use error::{PatternError, PatternResult};
pub use lexer::{PatternToken, Placeholder, tokenize, tokenize_route};
