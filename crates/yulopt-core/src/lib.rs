//! Optimiser for a Yul-style intermediate representation.
//!
//! The crate parses textual IR into an owned tree ([`ast`]), runs
//! whole-program passes over it ([`optimizer`]) and prints it back
//! ([`printer`]).

pub mod ast;
pub mod config;
pub mod error;
pub mod name_dispenser;
pub mod optimizer;
pub mod parser;
pub mod printer;

pub use config::{OptimizationLevel, OptimizerConfig};
pub use error::{ConfigError, OptimizerError, ParseError};
pub use name_dispenser::NameDispenser;
pub use optimizer::{Optimizer, OptimizerStepContext, WholeProgramPass};
pub use parser::parse;
