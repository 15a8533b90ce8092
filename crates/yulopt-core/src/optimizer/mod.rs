//! Whole-program optimisation passes and the driver that runs them.

pub mod analysis;
pub mod passes;

use crate::ast::{AstFeatures, Program};
use crate::config::{OptimizationLevel, OptimizerConfig};
use crate::error::OptimizerError;
use crate::name_dispenser::NameDispenser;
use passes::UnusedFunctionParameterPrunerPass;
use tracing::{debug, info, trace};

/// Per-run state shared by every pass of one optimisation run.
pub struct OptimizerStepContext<'a> {
    pub dispenser: &'a mut NameDispenser,
    pub config: &'a OptimizerConfig,
}

impl<'a> OptimizerStepContext<'a> {
    pub fn new(dispenser: &'a mut NameDispenser, config: &'a OptimizerConfig) -> Self {
        OptimizerStepContext { dispenser, config }
    }
}

/// A pass that sees and may rewrite the whole program at once.
pub trait WholeProgramPass {
    fn name(&self) -> &'static str;

    /// Lowest optimisation level at which the pass runs.
    fn min_level(&self) -> OptimizationLevel;

    /// Node kinds that must be present for the pass to have any effect.
    fn required_features(&self) -> AstFeatures {
        AstFeatures::empty()
    }

    /// Returns whether the program changed.
    fn run(
        &mut self,
        program: &mut Program,
        ctx: &mut OptimizerStepContext<'_>,
    ) -> Result<bool, OptimizerError>;
}

pub struct Optimizer {
    config: OptimizerConfig,
    passes: Vec<Box<dyn WholeProgramPass>>,
}

impl Optimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        let mut optimizer = Optimizer {
            config,
            passes: Vec::new(),
        };
        optimizer.add_pass(Box::new(UnusedFunctionParameterPrunerPass::new()));
        optimizer
    }

    /// Appends a pass; passes run in registration order.
    pub fn add_pass(&mut self, pass: Box<dyn WholeProgramPass>) {
        self.passes.push(pass);
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Runs every enabled pass once over `program`. A fresh name dispenser
    /// is built from the program at the start of each run.
    pub fn optimize(&mut self, program: &mut Program) -> Result<bool, OptimizerError> {
        if self.config.level == OptimizationLevel::None {
            debug!("optimisation disabled");
            return Ok(false);
        }

        if self.config.verify_preconditions {
            analysis::verify_preconditions(program)?;
        }

        let mut dispenser = NameDispenser::from_program(program);
        let mut ctx = OptimizerStepContext::new(&mut dispenser, &self.config);
        let mut changed = false;
        let mut applied = Vec::new();

        for pass in &mut self.passes {
            let name = pass.name();
            if ctx.config.level < pass.min_level() {
                trace!(pass = name, "below minimum level, skipping");
                continue;
            }
            if ctx.config.is_pass_disabled(name) {
                trace!(pass = name, "disabled by configuration, skipping");
                continue;
            }
            let features = AstFeatures::detect(program);
            if !features.contains(pass.required_features()) {
                trace!(pass = name, ?features, "required features missing, skipping");
                continue;
            }

            let pass_changed = pass.run(program, &mut ctx)?;
            debug!(pass = name, changed = pass_changed, "pass finished");
            if pass_changed {
                changed = true;
                applied.push(name);
            }
        }

        if ctx.config.verify_preconditions && changed {
            analysis::verify_preconditions(program)?;
        }

        info!(
            level = ?ctx.config.level,
            changed,
            passes = ?applied,
            "optimisation run complete"
        );
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    struct CountingPass {
        runs: usize,
    }

    impl WholeProgramPass for CountingPass {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn min_level(&self) -> OptimizationLevel {
            OptimizationLevel::Minimal
        }

        fn run(
            &mut self,
            _program: &mut Program,
            _ctx: &mut OptimizerStepContext<'_>,
        ) -> Result<bool, OptimizerError> {
            self.runs += 1;
            Ok(false)
        }
    }

    #[test]
    fn test_default_passes() {
        let optimizer = Optimizer::new(OptimizerConfig::default());
        assert_eq!(optimizer.pass_names(), vec!["unused-function-parameter-pruner"]);
    }

    #[test]
    fn test_level_none_leaves_program_alone() {
        let source = "{ function f(a) { } f(1) }";
        let mut program = parse(source).unwrap();
        let mut optimizer = Optimizer::new(OptimizerConfig::with_level(OptimizationLevel::None));
        assert_eq!(optimizer.optimize(&mut program), Ok(false));
        assert_eq!(program, parse(source).unwrap());
    }

    #[test]
    fn test_pruner_skipped_below_moderate() {
        let source = "{ function f(a) { } f(1) }";
        let mut program = parse(source).unwrap();
        let mut optimizer =
            Optimizer::new(OptimizerConfig::with_level(OptimizationLevel::Minimal));
        assert_eq!(optimizer.optimize(&mut program), Ok(false));
        assert_eq!(program, parse(source).unwrap());
    }

    #[test]
    fn test_disabled_pass_is_skipped() {
        let source = "{ function f(a) { } f(1) }";
        let mut program = parse(source).unwrap();
        let mut config = OptimizerConfig::default();
        config
            .disabled_passes
            .push("unused-function-parameter-pruner".to_string());
        let mut optimizer = Optimizer::new(config);
        assert_eq!(optimizer.optimize(&mut program), Ok(false));
    }

    #[test]
    fn test_precondition_violation_aborts() {
        let mut program = parse("{ function f(a) { } f(1, 2) }").unwrap();
        let mut config = OptimizerConfig::default();
        config.verify_preconditions = true;
        let mut optimizer = Optimizer::new(config);
        assert!(matches!(
            optimizer.optimize(&mut program),
            Err(OptimizerError::ArityMismatch { .. })
        ));
    }

    #[test]
    fn test_custom_pass_runs_after_pruner() {
        let mut program = parse("{ sstore(0, 1) }").unwrap();
        let mut optimizer = Optimizer::new(OptimizerConfig::default());
        optimizer.add_pass(Box::new(CountingPass { runs: 0 }));
        assert_eq!(
            optimizer.pass_names(),
            vec!["unused-function-parameter-pruner", "counting"]
        );
        assert_eq!(optimizer.optimize(&mut program), Ok(false));
    }
}
