use super::{Block, Expression, Program, Statement};
use bitflags::bitflags;

bitflags! {
    /// Constructs present in a program. Passes declare the features they need
    /// so the driver can skip them on programs that cannot benefit.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct AstFeatures: u32 {
        const HAS_FUNCTIONS = 1 << 0;
        const HAS_CALLS = 1 << 1;
        const HAS_LOOPS = 1 << 2;
        const HAS_SWITCH = 1 << 3;
        const HAS_CONDITIONALS = 1 << 4;
    }
}

impl AstFeatures {
    pub fn detect(program: &Program) -> Self {
        let mut features = AstFeatures::empty();
        scan_block(&program.root, &mut features);
        features
    }
}

fn scan_block(block: &Block, features: &mut AstFeatures) {
    for stmt in &block.statements {
        scan_statement(stmt, features);
    }
}

fn scan_statement(stmt: &Statement, features: &mut AstFeatures) {
    match stmt {
        Statement::ExpressionStatement(expr) => scan_expression(expr, features),
        Statement::Assignment { value, .. } => scan_expression(value, features),
        Statement::VariableDeclaration { value, .. } => {
            if let Some(value) = value {
                scan_expression(value, features);
            }
        }
        Statement::FunctionDefinition(func) => {
            *features |= AstFeatures::HAS_FUNCTIONS;
            scan_block(&func.body, features);
        }
        Statement::If { condition, body } => {
            *features |= AstFeatures::HAS_CONDITIONALS;
            scan_expression(condition, features);
            scan_block(body, features);
        }
        Statement::Switch { expression, cases } => {
            *features |= AstFeatures::HAS_SWITCH;
            scan_expression(expression, features);
            for case in cases {
                scan_block(&case.body, features);
            }
        }
        Statement::ForLoop {
            pre,
            condition,
            post,
            body,
        } => {
            *features |= AstFeatures::HAS_LOOPS;
            scan_block(pre, features);
            scan_expression(condition, features);
            scan_block(post, features);
            scan_block(body, features);
        }
        Statement::Break | Statement::Continue | Statement::Leave => {}
        Statement::Block(block) => scan_block(block, features),
    }
}

fn scan_expression(expr: &Expression, features: &mut AstFeatures) {
    match expr {
        Expression::Identifier(_) | Expression::Literal(_) => {}
        Expression::FunctionCall(call) => {
            *features |= AstFeatures::HAS_CALLS;
            for arg in &call.arguments {
                scan_expression(arg, features);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Block, FunctionDefinition};

    #[test]
    fn test_empty_program_has_no_features() {
        assert_eq!(AstFeatures::detect(&Program::default()), AstFeatures::empty());
    }

    #[test]
    fn test_detects_functions_and_calls() {
        let program = Program::new(vec![
            Statement::FunctionDefinition(FunctionDefinition {
                name: "f".into(),
                parameters: vec![],
                return_variables: vec![],
                body: Block::default(),
            }),
            Statement::ExpressionStatement(Expression::call("f", vec![])),
        ]);

        let features = AstFeatures::detect(&program);
        assert!(features.contains(AstFeatures::HAS_FUNCTIONS | AstFeatures::HAS_CALLS));
        assert!(!features.contains(AstFeatures::HAS_LOOPS));
    }
}
