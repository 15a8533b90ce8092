//! Classification of function parameters and return variables.
//!
//! A slot is unused when its body never references it, neither reading nor
//! assigning it. A dropped slot therefore never appears in the reduced body.
//!
//! For return variables, "never referenced" only implies "no caller observes
//! the value" because the single-assignment transform runs first: callers
//! bind every result to a fresh variable, so nothing outside the callee can
//! involve the return variable's name.

use super::{FunctionIndex, ReferenceCounter};
use crate::ast::{Expression, FunctionDefinition, Name, Program, Statement};
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Usage {
    Used,
    Unused,
}

impl Usage {
    pub fn is_used(self) -> bool {
        self == Usage::Used
    }
}

/// Per-slot classification of one function, in signature order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionUsage {
    pub parameters: Vec<Usage>,
    pub return_variables: Vec<Usage>,
    /// The body only forwards to another user-defined function. Such
    /// functions are left to the inliner; every shim has this shape.
    pub forwarding: bool,
}

impl FunctionUsage {
    pub fn has_unused(&self) -> bool {
        self.parameters
            .iter()
            .chain(&self.return_variables)
            .any(|usage| !usage.is_used())
    }

    /// Has at least one unused slot and is not a forwarding function.
    pub fn is_prunable(&self) -> bool {
        !self.forwarding && self.has_unused()
    }

    /// Compact mask for logging, e.g. `(u_u) -> _`.
    pub fn mask(&self) -> String {
        let render = |slots: &[Usage]| -> String {
            slots
                .iter()
                .map(|u| if u.is_used() { 'u' } else { '_' })
                .collect()
        };
        format!(
            "({}) -> {}",
            render(&self.parameters),
            render(&self.return_variables)
        )
    }
}

/// Usage of every top-level function, in program order.
#[derive(Debug, Clone, Default)]
pub struct UsageMap {
    functions: IndexMap<Name, FunctionUsage>,
}

impl UsageMap {
    pub fn get(&self, name: &str) -> Option<&FunctionUsage> {
        self.functions.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &FunctionUsage)> {
        self.functions.iter()
    }

    /// Functions the pruner should split.
    pub fn prunable(&self) -> impl Iterator<Item = (&Name, &FunctionUsage)> {
        self.functions.iter().filter(|(_, usage)| usage.is_prunable())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

pub struct UsageAnalyzer;

impl UsageAnalyzer {
    /// Classifies every slot of every top-level function. Read-only.
    pub fn analyze(program: &Program) -> UsageMap {
        let index = FunctionIndex::build(program);
        let mut functions = IndexMap::new();

        for func in program.functions() {
            if functions.contains_key(&func.name) {
                continue;
            }
            functions.insert(func.name.clone(), Self::analyze_function(func, &index));
        }

        UsageMap { functions }
    }

    pub fn analyze_function(func: &FunctionDefinition, index: &FunctionIndex) -> FunctionUsage {
        let references = ReferenceCounter::count_block(&func.body);
        let classify = |names: &[Name]| -> Vec<Usage> {
            names
                .iter()
                .map(|name| {
                    if references.references(name.as_str()) > 0 {
                        Usage::Used
                    } else {
                        Usage::Unused
                    }
                })
                .collect()
        };

        FunctionUsage {
            parameters: classify(&func.parameters),
            return_variables: classify(&func.return_variables),
            forwarding: is_forwarding_function(func, index),
        }
    }
}

/// True if the body is a single call to a user-defined function whose
/// arguments are all parameters of `func` and whose results (if any) are
/// bound to return variables of `func`.
fn is_forwarding_function(func: &FunctionDefinition, index: &FunctionIndex) -> bool {
    let [stmt] = func.body.statements.as_slice() else {
        return false;
    };

    let (call, targets) = match stmt {
        Statement::ExpressionStatement(Expression::FunctionCall(call)) => (call, &[][..]),
        Statement::Assignment {
            targets,
            value: Expression::FunctionCall(call),
        } => (call, targets.as_slice()),
        _ => return false,
    };

    index.contains(call.function_name.as_str())
        && call.arguments.iter().all(|arg| {
            matches!(arg, Expression::Identifier(name) if func.parameters.contains(name))
        })
        && targets
            .iter()
            .all(|target| func.return_variables.contains(target))
}
