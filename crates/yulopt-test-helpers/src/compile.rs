//! Optimisation helpers for tests.
//!
//! Each helper parses textual IR, runs the optimiser and prints the result,
//! flattening every error into a `String` so tests can `unwrap()` or match
//! on the message.

use crate::interpreter::{Execution, Interpreter};
use yulopt_core::ast::Program;
use yulopt_core::config::{OptimizationLevel, OptimizerConfig};
use yulopt_core::optimizer::Optimizer;
use yulopt_core::parser::parse;

/// Installs a test-friendly `tracing` subscriber honouring `RUST_LOG`.
/// Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Parses textual IR.
pub fn parse_program(source: &str) -> Result<Program, String> {
    parse(source).map_err(|e| format!("parse error: {e}"))
}

/// Optimises `source` with the default configuration with precondition
/// checks enabled.
///
/// # Returns
/// The printed program or an error message
pub fn optimize(source: &str) -> Result<String, String> {
    let config = OptimizerConfig {
        verify_preconditions: true,
        ..OptimizerConfig::default()
    };
    optimize_with_config(source, config)
}

/// Optimises `source` at the given level.
pub fn optimize_with_level(source: &str, level: OptimizationLevel) -> Result<String, String> {
    let config = OptimizerConfig {
        verify_preconditions: true,
        ..OptimizerConfig::with_level(level)
    };
    optimize_with_config(source, config)
}

pub fn optimize_with_config(source: &str, config: OptimizerConfig) -> Result<String, String> {
    optimize_program(source, config).map(|program| program.to_string())
}

/// Like [`optimize_with_config`] but returns the tree.
pub fn optimize_program(source: &str, config: OptimizerConfig) -> Result<Program, String> {
    init_tracing();
    let mut program = parse_program(source)?;
    Optimizer::new(config)
        .optimize(&mut program)
        .map_err(|e| format!("optimizer error: {e}"))?;
    Ok(program)
}

/// Runs `source` before and after optimisation and returns both executions.
pub fn execute_before_and_after(source: &str) -> Result<(Execution, Execution), String> {
    let interpreter = Interpreter::new();
    let before = interpreter.run(&parse_program(source)?)?;
    let optimized = optimize_program(
        source,
        OptimizerConfig {
            verify_preconditions: true,
            ..OptimizerConfig::default()
        },
    )?;
    let after = interpreter.run(&optimized)?;
    Ok((before, after))
}
