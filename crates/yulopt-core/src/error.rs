//! Error types for the front-end, configuration and optimiser.

use thiserror::Error;

/// Lexing or parsing failure in textual IR. Positions are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        ParseError {
            message: message.into(),
            line,
            column,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid optimizer configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Internal-contract violations detected while optimising.
///
/// These indicate that an upstream stage did not establish a precondition
/// the optimiser relies on. The driver aborts on the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptimizerError {
    #[error("function `{0}` is defined more than once")]
    DuplicateFunction(String),

    #[error("function `{name}` is not hoisted to the top level")]
    NotHoisted { name: String },

    #[error(
        "call to `{callee}` passes {found_arguments} argument(s) and binds {found_returns} \
         result(s), but the definition takes {expected_arguments} and returns {expected_returns}"
    )]
    ArityMismatch {
        callee: String,
        expected_arguments: usize,
        found_arguments: usize,
        expected_returns: usize,
        found_returns: usize,
    },
}

pub type Result<T> = std::result::Result<T, OptimizerError>;
