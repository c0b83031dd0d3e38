use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("placeholder opened at index {start} in '{pattern}' is never closed")]
    UnterminatedPlaceholder { pattern: String, start: usize },
    #[error("unexpected '>' at index {index} in '{pattern}'")]
    UnexpectedClosingBracket { pattern: String, index: usize },
    #[error("placeholder at index {start} in '{pattern}' is missing a name")]
    ParameterMissingName { pattern: String, start: usize },
    #[error("placeholder name '{name}' in '{pattern}' contains invalid character '{invalid}'")]
    ParameterInvalidCharacter {
        pattern: String,
        name: String,
        invalid: char,
    },
    #[error("duplicate placeholder name '{name}' in '{pattern}'")]
    DuplicateParamName { pattern: String, name: String },
    #[error("regex constraint for '{name}' in '{pattern}' is invalid: {error}")]
    RegexConstraintInvalid {
        pattern: String,
        name: String,
        error: String,
    },
    #[error("compiled matcher for '{pattern}' is invalid: {error}")]
    MatcherInvalid { pattern: String, error: String },
    #[error("route '{route}' declares a regex for '{name}'; constraints belong in the pattern")]
    ConstraintInRoute { route: String, name: String },
}

pub type PatternResult<T> = Result<T, PatternError>;
