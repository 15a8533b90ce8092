//! Checks for the structural preconditions established by earlier stages.

use super::FunctionIndex;
use crate::ast::{Block, Expression, FunctionCall, FunctionDefinition, Program, Statement};
use crate::error::OptimizerError;
use rustc_hash::FxHashSet;

/// Verifies that every function is defined once, at the top level, and
/// that every call to a user-defined function matches its arity.
pub fn verify_preconditions(program: &Program) -> Result<(), OptimizerError> {
    verify_unique_hoisted_functions(program)?;
    verify_call_arity(program)
}

pub fn verify_unique_hoisted_functions(program: &Program) -> Result<(), OptimizerError> {
    let mut seen = FxHashSet::default();
    for stmt in &program.root.statements {
        match stmt {
            Statement::FunctionDefinition(func) => {
                if !seen.insert(func.name.clone()) {
                    return Err(OptimizerError::DuplicateFunction(func.name.to_string()));
                }
                if let Some(nested) = first_nested_function(&func.body) {
                    return Err(OptimizerError::NotHoisted {
                        name: nested.name.to_string(),
                    });
                }
            }
            other => {
                if let Some(nested) = find_function(other) {
                    return Err(OptimizerError::NotHoisted {
                        name: nested.name.to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}

fn first_nested_function(block: &Block) -> Option<&FunctionDefinition> {
    block.statements.iter().find_map(find_function)
}

/// `stmt` itself if it is a definition, otherwise the first one inside it.
fn find_function(stmt: &Statement) -> Option<&FunctionDefinition> {
    match stmt {
        Statement::FunctionDefinition(func) => Some(func),
        Statement::If { body, .. } => first_nested_function(body),
        Statement::Switch { cases, .. } => cases
            .iter()
            .find_map(|case| first_nested_function(&case.body)),
        Statement::ForLoop {
            pre, post, body, ..
        } => first_nested_function(pre)
            .or_else(|| first_nested_function(post))
            .or_else(|| first_nested_function(body)),
        Statement::Block(inner) => first_nested_function(inner),
        Statement::ExpressionStatement(_)
        | Statement::Assignment { .. }
        | Statement::VariableDeclaration { .. }
        | Statement::Break
        | Statement::Continue
        | Statement::Leave => None,
    }
}

/// Every call to a user-defined function must pass as many arguments as the
/// definition has parameters and bind as many results as it has return
/// variables. Calls nested in expressions must produce exactly one value.
pub fn verify_call_arity(program: &Program) -> Result<(), OptimizerError> {
    let index = FunctionIndex::build(program);
    ArityChecker {
        program,
        index: &index,
    }
    .block(&program.root)
}

struct ArityChecker<'a> {
    program: &'a Program,
    index: &'a FunctionIndex,
}

impl ArityChecker<'_> {
    fn block(&self, block: &Block) -> Result<(), OptimizerError> {
        block.statements.iter().try_for_each(|stmt| self.statement(stmt))
    }

    fn statement(&self, stmt: &Statement) -> Result<(), OptimizerError> {
        match stmt {
            Statement::ExpressionStatement(expr) => self.value(expr, 0),
            Statement::Assignment { targets, value } => self.value(value, targets.len()),
            Statement::VariableDeclaration { names, value } => match value {
                Some(value) => self.value(value, names.len()),
                None => Ok(()),
            },
            Statement::FunctionDefinition(func) => self.block(&func.body),
            Statement::If { condition, body } => {
                self.value(condition, 1)?;
                self.block(body)
            }
            Statement::Switch { expression, cases } => {
                self.value(expression, 1)?;
                cases.iter().try_for_each(|case| self.block(&case.body))
            }
            Statement::ForLoop {
                pre,
                condition,
                post,
                body,
            } => {
                self.block(pre)?;
                self.value(condition, 1)?;
                self.block(post)?;
                self.block(body)
            }
            Statement::Break | Statement::Continue | Statement::Leave => Ok(()),
            Statement::Block(block) => self.block(block),
        }
    }

    /// Checks an expression whose value is bound to `destinations` results.
    fn value(&self, expr: &Expression, destinations: usize) -> Result<(), OptimizerError> {
        match expr {
            Expression::Identifier(_) | Expression::Literal(_) => Ok(()),
            Expression::FunctionCall(call) => {
                self.call(call, destinations)?;
                call.arguments.iter().try_for_each(|arg| self.value(arg, 1))
            }
        }
    }

    fn call(&self, call: &FunctionCall, destinations: usize) -> Result<(), OptimizerError> {
        let Some(position) = self.index.position(call.function_name.as_str()) else {
            return Ok(());
        };
        let Statement::FunctionDefinition(func) = &self.program.root.statements[position] else {
            return Ok(());
        };

        if func.parameters.len() != call.arguments.len()
            || func.return_variables.len() != destinations
        {
            return Err(OptimizerError::ArityMismatch {
                callee: call.function_name.to_string(),
                expected_arguments: func.parameters.len(),
                found_arguments: call.arguments.len(),
                expected_returns: func.return_variables.len(),
                found_returns: destinations,
            });
        }
        Ok(())
    }
}
