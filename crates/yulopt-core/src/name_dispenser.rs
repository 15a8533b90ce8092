//! Fresh-name allocation.
//!
//! A [`NameDispenser`] is created once per optimisation run from every name
//! already present in the program and handed to passes through the step
//! context. It never returns a name that is in the program or that it has
//! returned before.

use crate::ast::{Block, Expression, Name, Program, Statement};
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Default, Clone)]
pub struct NameDispenser {
    used: FxHashSet<Name>,
    /// Next suffix to try, per hint.
    counters: FxHashMap<String, usize>,
}

impl NameDispenser {
    pub fn new(used: FxHashSet<Name>) -> Self {
        NameDispenser {
            used,
            counters: FxHashMap::default(),
        }
    }

    pub fn from_program(program: &Program) -> Self {
        Self::new(NameCollector::collect(program))
    }

    /// Returns `<hint>_<n>` for the smallest `n` that has not been tried for
    /// this hint and is not in use, then marks it used.
    pub fn new_name(&mut self, hint: &Name) -> Name {
        let counter = self.counters.entry(hint.as_str().to_string()).or_insert(1);
        loop {
            let candidate = Name::new(format!("{hint}_{counter}"));
            *counter += 1;
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    pub fn mark_used(&mut self, name: Name) {
        self.used.insert(name);
    }

    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }
}

/// Collects every identifier occurring anywhere in a program: definitions,
/// parameters, return variables, declared and assigned variables, references
/// and callee names (including builtins).
pub struct NameCollector {
    names: FxHashSet<Name>,
}

impl NameCollector {
    pub fn collect(program: &Program) -> FxHashSet<Name> {
        let mut collector = NameCollector {
            names: FxHashSet::default(),
        };
        collector.block(&program.root);
        collector.names
    }

    fn block(&mut self, block: &Block) {
        for stmt in &block.statements {
            self.statement(stmt);
        }
    }

    fn statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::ExpressionStatement(expr) => self.expression(expr),
            Statement::Assignment { targets, value } => {
                self.names.extend(targets.iter().cloned());
                self.expression(value);
            }
            Statement::VariableDeclaration { names, value } => {
                self.names.extend(names.iter().cloned());
                if let Some(value) = value {
                    self.expression(value);
                }
            }
            Statement::FunctionDefinition(func) => {
                self.names.insert(func.name.clone());
                self.names.extend(func.parameters.iter().cloned());
                self.names.extend(func.return_variables.iter().cloned());
                self.block(&func.body);
            }
            Statement::If { condition, body } => {
                self.expression(condition);
                self.block(body);
            }
            Statement::Switch { expression, cases } => {
                self.expression(expression);
                for case in cases {
                    self.block(&case.body);
                }
            }
            Statement::ForLoop {
                pre,
                condition,
                post,
                body,
            } => {
                self.block(pre);
                self.expression(condition);
                self.block(post);
                self.block(body);
            }
            Statement::Break | Statement::Continue | Statement::Leave => {}
            Statement::Block(block) => self.block(block),
        }
    }

    fn expression(&mut self, expr: &Expression) {
        match expr {
            Expression::Identifier(name) => {
                self.names.insert(name.clone());
            }
            Expression::Literal(_) => {}
            Expression::FunctionCall(call) => {
                self.names.insert(call.function_name.clone());
                for arg in &call.arguments {
                    self.expression(arg);
                }
            }
        }
    }
}
