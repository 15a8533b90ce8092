use crate::ast::{Block, Expression, Name, Statement};
use rustc_hash::FxHashMap;

/// Counts variable references in a block.
///
/// A reference is an identifier in expression position or an assignment
/// target. Declared names and callee names are not references.
#[derive(Debug, Default)]
pub struct ReferenceCounter {
    counts: FxHashMap<Name, usize>,
}

impl ReferenceCounter {
    pub fn count_block(block: &Block) -> Self {
        let mut counter = ReferenceCounter::default();
        counter.block(block);
        counter
    }

    pub fn references(&self, name: &str) -> usize {
        self.counts.get(name).copied().unwrap_or(0)
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
                for target in targets {
                    self.reference(target);
                }
                self.expression(value);
            }
            Statement::VariableDeclaration { value, .. } => {
                if let Some(value) = value {
                    self.expression(value);
                }
            }
            Statement::FunctionDefinition(func) => self.block(&func.body),
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

    fn reference(&mut self, name: &Name) {
        *self.counts.entry(name.clone()).or_insert(0) += 1;
    }

    fn expression(&mut self, expr: &Expression) {
        match expr {
            Expression::Identifier(name) => self.reference(name),
            Expression::Literal(_) => {}
            Expression::FunctionCall(call) => {
                for arg in &call.arguments {
                    self.expression(arg);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_assignment_targets_count_declarations_do_not() {
        let program = parse("{ let a := 1 let c a := add(b, b) }").unwrap();
        let counter = ReferenceCounter::count_block(&program.root);
        assert_eq!(counter.references("a"), 1);
        assert_eq!(counter.references("b"), 2);
        assert_eq!(counter.references("c"), 0);
        assert_eq!(counter.references("add"), 0);
    }

    #[test]
    fn test_counts_references_in_nested_control_flow() {
        let program =
            parse("{ for { } lt(i, n) { i := add(i, 1) } { switch i case 0 { if x { } } } }")
                .unwrap();
        let counter = ReferenceCounter::count_block(&program.root);
        assert_eq!(counter.references("i"), 4);
        assert_eq!(counter.references("n"), 1);
        assert_eq!(counter.references("x"), 1);
    }
}
