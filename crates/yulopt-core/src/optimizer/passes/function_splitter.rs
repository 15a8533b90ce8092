//! Splits a function with unused slots into a reduced function and a shim.
//!
//! ```text
//! function f(a, b, c) -> x, y { x := div(a, b) }
//! →
//! function f(a, b) -> x { x := div(a, b) }
//! function f_1(a_1, b_1, c_1) -> x_1, y_1 { x_1 := f(a_1, b_1) }
//! ```
//!
//! The reduced function keeps the original name and body; a dropped slot is
//! never referenced, so the body needs no adjustment. The shim takes the
//! original signature under a fresh name so that call sites only need their
//! callee renamed.

use crate::ast::{Block, Expression, FunctionCall, FunctionDefinition, Name, Statement};
use crate::name_dispenser::NameDispenser;
use crate::optimizer::analysis::{FunctionUsage, Usage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitFunction {
    pub reduced: FunctionDefinition,
    pub shim: FunctionDefinition,
}

pub fn split_function(
    original: &FunctionDefinition,
    usage: &FunctionUsage,
    dispenser: &mut NameDispenser,
) -> SplitFunction {
    debug_assert_eq!(original.parameters.len(), usage.parameters.len());
    debug_assert_eq!(original.return_variables.len(), usage.return_variables.len());

    let shim = build_shim(original, usage, dispenser);

    let reduced = FunctionDefinition {
        name: original.name.clone(),
        parameters: select(&original.parameters, &usage.parameters, Usage::Used),
        return_variables: select(
            &original.return_variables,
            &usage.return_variables,
            Usage::Used,
        ),
        body: original.body.clone(),
    };

    SplitFunction { reduced, shim }
}

/// Names classified as `wanted`, in signature order.
fn select(names: &[Name], usage: &[Usage], wanted: Usage) -> Vec<Name> {
    names
        .iter()
        .zip(usage)
        .filter(|(_, u)| **u == wanted)
        .map(|(name, _)| name.clone())
        .collect()
}

fn build_shim(
    original: &FunctionDefinition,
    usage: &FunctionUsage,
    dispenser: &mut NameDispenser,
) -> FunctionDefinition {
    let name = dispenser.new_name(&original.name);
    let parameters: Vec<Name> = original
        .parameters
        .iter()
        .map(|p| dispenser.new_name(p))
        .collect();
    let return_variables: Vec<Name> = original
        .return_variables
        .iter()
        .map(|r| dispenser.new_name(r))
        .collect();

    let call = Expression::FunctionCall(FunctionCall {
        function_name: original.name.clone(),
        arguments: select(&parameters, &usage.parameters, Usage::Used)
            .into_iter()
            .map(Expression::Identifier)
            .collect(),
    });
    let targets = select(&return_variables, &usage.return_variables, Usage::Used);

    let forward = if targets.is_empty() {
        Statement::ExpressionStatement(call)
    } else {
        Statement::Assignment {
            targets,
            value: call,
        }
    };

    FunctionDefinition {
        name,
        parameters,
        return_variables,
        body: Block::new(vec![forward]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::analysis::{FunctionIndex, UsageAnalyzer};
    use crate::parser::parse;

    fn split(source: &str, name: &str) -> SplitFunction {
        let program = parse(source).unwrap();
        let index = FunctionIndex::build(&program);
        let func = program.function(name).unwrap();
        let usage = UsageAnalyzer::analyze_function(func, &index);
        let mut dispenser = NameDispenser::from_program(&program);
        split_function(func, &usage, &mut dispenser)
    }

    #[test]
    fn test_split_drops_unused_slots() {
        let result = split(
            "{ function f(a, b, c) -> x, y { x := div(a, b) sstore(0, x) } }",
            "f",
        );

        assert_eq!(
            result.reduced.to_string(),
            "function f(a, b) -> x {\n    x := div(a, b)\n    sstore(0, x)\n}"
        );
        assert_eq!(
            result.shim.to_string(),
            "function f_1(a_1, b_1, c_1) -> x_1, y_1 {\n    x_1 := f(a_1, b_1)\n}"
        );
    }

    #[test]
    fn test_arity_contract() {
        let source =
            "{ function g(p, q, r, s) -> u, v, w { u := p sstore(u, r) w := 2 sstore(w, w) } }";
        let program = parse(source).unwrap();
        let original = program.function("g").unwrap();
        let result = split(source, "g");

        assert_eq!(result.shim.parameters.len(), original.parameters.len());
        assert_eq!(result.shim.return_variables.len(), original.return_variables.len());
        assert_eq!(result.reduced.parameters, vec![Name::from("p"), Name::from("r")]);
        assert_eq!(result.reduced.return_variables, vec![Name::from("u"), Name::from("w")]);
    }

    #[test]
    fn test_shim_without_used_returns_is_expression_statement() {
        let result = split("{ function h(a, b) -> r { sstore(a, 1) } }", "h");
        assert_eq!(
            result.shim.body.statements,
            vec![Statement::ExpressionStatement(Expression::call(
                "h",
                vec![Expression::identifier("a_1")]
            ))]
        );
        assert!(result.reduced.return_variables.is_empty());
        assert_eq!(result.reduced.body.statements.len(), 1);
    }

    #[test]
    fn test_reduced_body_is_unchanged() {
        let source = "{ function f(a, b) -> x, y { if a { x := 1 } for { } x { } { x := 0 } } }";
        let program = parse(source).unwrap();
        let result = split(source, "f");
        assert_eq!(result.reduced.body, program.function("f").unwrap().body);
        assert_eq!(result.reduced.parameters, vec![Name::from("a")]);
        assert_eq!(result.reduced.return_variables, vec![Name::from("x")]);
    }

    #[test]
    fn test_shim_names_are_fresh() {
        let result = split(
            "{ function f(a) -> r { sstore(0, 0) } function f_1() { } let a_1 := 0 }",
            "f",
        );
        assert_eq!(result.shim.name.as_str(), "f_2");
        assert_eq!(result.shim.parameters, vec![Name::from("a_2")]);
        assert_eq!(result.shim.return_variables, vec![Name::from("r_1")]);
    }
}
