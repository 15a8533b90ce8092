//! Redirects calls from split functions to their shims.
//!
//! Only the callee name changes. Arguments and destinations stay exactly as
//! they were, which is what keeps evaluation order and count intact: the
//! shim has the original signature.

use crate::ast::{Block, Expression, Name, Program, Statement};
use rustc_hash::{FxHashMap, FxHashSet};

pub struct CallSiteRewriter<'a> {
    /// original name -> shim name
    translations: &'a FxHashMap<Name, Name>,
    /// Functions whose bodies are left alone (the shims themselves, whose
    /// only call must keep targeting the reduced function).
    excluded: &'a FxHashSet<Name>,
    rewritten: usize,
}

impl<'a> CallSiteRewriter<'a> {
    pub fn new(translations: &'a FxHashMap<Name, Name>, excluded: &'a FxHashSet<Name>) -> Self {
        CallSiteRewriter {
            translations,
            excluded,
            rewritten: 0,
        }
    }

    /// Rewrites the whole program and returns the number of call sites
    /// that were redirected.
    pub fn rewrite_program(mut self, program: &mut Program) -> usize {
        self.block(&mut program.root);
        self.rewritten
    }

    fn block(&mut self, block: &mut Block) {
        for stmt in &mut block.statements {
            self.statement(stmt);
        }
    }

    fn statement(&mut self, stmt: &mut Statement) {
        match stmt {
            Statement::ExpressionStatement(expr) => self.expression(expr),
            Statement::Assignment { value, .. } => self.expression(value),
            Statement::VariableDeclaration { value, .. } => {
                if let Some(value) = value {
                    self.expression(value);
                }
            }
            Statement::FunctionDefinition(func) => {
                if !self.excluded.contains(&func.name) {
                    self.block(&mut func.body);
                }
            }
            Statement::If { condition, body } => {
                self.expression(condition);
                self.block(body);
            }
            Statement::Switch { expression, cases } => {
                self.expression(expression);
                for case in cases {
                    self.block(&mut case.body);
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

    fn expression(&mut self, expr: &mut Expression) {
        match expr {
            Expression::Identifier(_) | Expression::Literal(_) => {}
            Expression::FunctionCall(call) => {
                if let Some(shim) = self.translations.get(&call.function_name) {
                    call.function_name = shim.clone();
                    self.rewritten += 1;
                }
                for arg in &mut call.arguments {
                    self.expression(arg);
                }
            }
        }
    }
}
