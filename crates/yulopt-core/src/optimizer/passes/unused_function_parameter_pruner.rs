// =============================================================================
// O2: Unused Function Parameter Pruner
// =============================================================================
//
// Removes parameters and return variables that a function body never
// references. Each affected function is split into a reduced function that
// keeps the original name and a shim with a fresh name and the original
// signature that forwards to it. Every call site is then redirected to the
// shim, so no caller changes shape.
//
// Preconditions (established by earlier stages, not re-checked here):
// - all identifiers are globally unique
// - call results are bound in single-assignment form
// - calls only appear as statements, with simple arguments
// - all function definitions are hoisted to the top level
//
// The inliner is expected to run afterwards and fold the shims away.
//
// Example transformation:
//   function f(a, b, c) -> x, y { x := div(a, b) }
//   z, w := f(1, 2, 3)
// →
//   function f(a, b) -> x { x := div(a, b) }
//   function f_1(a_1, b_1, c_1) -> x_1, y_1 { x_1 := f(a_1, b_1) }
//   z, w := f_1(1, 2, 3)

use super::call_site_rewriter::CallSiteRewriter;
use super::function_splitter::split_function;
use crate::ast::{AstFeatures, FunctionDefinition, Name, Program, Statement};
use crate::config::OptimizationLevel;
use crate::error::OptimizerError;
use crate::optimizer::analysis::{FunctionIndex, FunctionUsage, UsageAnalyzer};
use crate::optimizer::{OptimizerStepContext, WholeProgramPass};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

#[derive(Debug, Default)]
pub struct UnusedFunctionParameterPrunerPass;

impl UnusedFunctionParameterPrunerPass {
    pub fn new() -> Self {
        Self
    }
}

impl WholeProgramPass for UnusedFunctionParameterPrunerPass {
    fn name(&self) -> &'static str {
        "unused-function-parameter-pruner"
    }

    fn min_level(&self) -> OptimizationLevel {
        OptimizationLevel::Moderate
    }

    fn required_features(&self) -> AstFeatures {
        AstFeatures::HAS_FUNCTIONS
    }

    fn run(
        &mut self,
        program: &mut Program,
        ctx: &mut OptimizerStepContext<'_>,
    ) -> Result<bool, OptimizerError> {
        // Phase 1: classify every slot before touching the tree
        let index = FunctionIndex::build(program);
        let usage = UsageAnalyzer::analyze(program);
        let candidates: Vec<(Name, FunctionUsage)> = usage
            .prunable()
            .map(|(name, usage)| (name.clone(), usage.clone()))
            .collect();

        if candidates.is_empty() {
            trace!("no function has unused parameters or return variables");
            return Ok(false);
        }

        // Phase 2: build reduced functions and shims, swapping the reduced
        // form in under the original name
        let mut translations: FxHashMap<Name, Name> = FxHashMap::default();
        let mut shims: FxHashMap<usize, FunctionDefinition> = FxHashMap::default();

        for (name, usage) in &candidates {
            let Some(position) = index.position(name.as_str()) else {
                continue;
            };
            let Statement::FunctionDefinition(original) = &program.root.statements[position]
            else {
                continue;
            };

            let split = split_function(original, usage, ctx.dispenser);
            debug!(
                function = %name,
                shim = %split.shim.name,
                slots = %usage.mask(),
                "pruning unused function slots"
            );

            translations.insert(name.clone(), split.shim.name.clone());
            program.root.statements[position] = Statement::FunctionDefinition(split.reduced);
            shims.insert(position, split.shim);
        }

        // Phase 3: place each shim directly after its reduced function
        let statements = std::mem::take(&mut program.root.statements);
        program.root.statements.reserve(statements.len() + shims.len());
        for (i, stmt) in statements.into_iter().enumerate() {
            program.root.statements.push(stmt);
            if let Some(shim) = shims.remove(&i) {
                program.root.statements.push(Statement::FunctionDefinition(shim));
            }
        }

        // Phase 4: redirect every call site, except the shims' forwarding
        // calls, to the shims
        let excluded: FxHashSet<Name> = translations.values().cloned().collect();
        let rewritten = CallSiteRewriter::new(&translations, &excluded).rewrite_program(program);
        debug!(
            functions = translations.len(),
            call_sites = rewritten,
            "redirected call sites to shims"
        );

        Ok(true)
    }
}
