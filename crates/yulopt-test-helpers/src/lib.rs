//! Shared test utilities for yulopt crates.

pub mod compile;
pub mod interpreter;

pub use compile::{
    execute_before_and_after, init_tracing, optimize, optimize_program, optimize_with_config,
    optimize_with_level, parse_program,
};
pub use interpreter::{Event, Execution, Interpreter};
