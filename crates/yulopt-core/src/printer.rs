//! Deterministic pretty printer for the IR.
//!
//! Output re-parses to an identical tree, which tests rely on to compare
//! programs textually.

use crate::ast::{Block, Expression, FunctionDefinition, Literal, Name, Program, Statement};
use std::fmt::{self, Write};

const INDENT: &str = "    ";

struct Printer<'a, 'b> {
    out: &'a mut fmt::Formatter<'b>,
    depth: usize,
}

impl Printer<'_, '_> {
    fn indent(&mut self) -> fmt::Result {
        for _ in 0..self.depth {
            self.out.write_str(INDENT)?;
        }
        Ok(())
    }

    fn block(&mut self, block: &Block) -> fmt::Result {
        if block.statements.is_empty() {
            return self.out.write_str("{ }");
        }
        self.out.write_str("{\n")?;
        self.depth += 1;
        for stmt in &block.statements {
            self.indent()?;
            self.statement(stmt)?;
            self.out.write_char('\n')?;
        }
        self.depth -= 1;
        self.indent()?;
        self.out.write_char('}')
    }

    fn statement(&mut self, stmt: &Statement) -> fmt::Result {
        match stmt {
            Statement::ExpressionStatement(expr) => write!(self.out, "{expr}"),
            Statement::Assignment { targets, value } => {
                write!(self.out, "{} := {value}", NameList(targets))
            }
            Statement::VariableDeclaration { names, value } => {
                write!(self.out, "let {}", NameList(names))?;
                if let Some(value) = value {
                    write!(self.out, " := {value}")?;
                }
                Ok(())
            }
            Statement::FunctionDefinition(func) => self.function(func),
            Statement::If { condition, body } => {
                write!(self.out, "if {condition} ")?;
                self.block(body)
            }
            Statement::Switch { expression, cases } => {
                write!(self.out, "switch {expression}")?;
                for case in cases {
                    self.out.write_char('\n')?;
                    self.indent()?;
                    match &case.value {
                        Some(value) => write!(self.out, "case {value} ")?,
                        None => self.out.write_str("default ")?,
                    }
                    self.block(&case.body)?;
                }
                Ok(())
            }
            Statement::ForLoop {
                pre,
                condition,
                post,
                body,
            } => {
                self.out.write_str("for ")?;
                self.block(pre)?;
                write!(self.out, " {condition} ")?;
                self.block(post)?;
                self.out.write_char(' ')?;
                self.block(body)
            }
            Statement::Break => self.out.write_str("break"),
            Statement::Continue => self.out.write_str("continue"),
            Statement::Leave => self.out.write_str("leave"),
            Statement::Block(block) => self.block(block),
        }
    }

    fn function(&mut self, func: &FunctionDefinition) -> fmt::Result {
        write!(self.out, "function {}({})", func.name, NameList(&func.parameters))?;
        if !func.return_variables.is_empty() {
            write!(self.out, " -> {}", NameList(&func.return_variables))?;
        }
        self.out.write_char(' ')?;
        self.block(&func.body)
    }
}

struct NameList<'a>(&'a [Name]);

impl fmt::Display for NameList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Printer { out: f, depth: 0 }.block(&self.root)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Printer { out: f, depth: 0 }.block(self)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Printer { out: f, depth: 0 }.statement(self)
    }
}

impl fmt::Display for FunctionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Printer { out: f, depth: 0 }.function(self)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(name) => write!(f, "{name}"),
            Expression::Literal(literal) => write!(f, "{literal}"),
            Expression::FunctionCall(call) => {
                write!(f, "{}(", call.function_name)?;
                for (i, arg) in call.arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_char(')')
            }
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{n}"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::String(s) => {
                f.write_char('"')?;
                for c in s.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        c => f.write_char(c)?,
                    }
                }
                f.write_char('"')
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;

    #[test]
    fn test_print_function_and_call() {
        let program = parse("{ function f(a,b) -> x { x := div(a,b) } let z := f(1,2) }").unwrap();
        assert_eq!(
            program.to_string(),
            "{\n    function f(a, b) -> x {\n        x := div(a, b)\n    }\n    let z := f(1, 2)\n}"
        );
    }

    #[test]
    fn test_print_empty_blocks() {
        let program = parse("{ function g() { } }").unwrap();
        assert_eq!(program.to_string(), "{\n    function g() { }\n}");
        assert_eq!(parse("{}").unwrap().to_string(), "{ }");
    }

    #[test]
    fn test_print_switch_and_for() {
        let source = "{ switch x case 1 { } default { leave } for { } 1 { } { break } }";
        let printed = parse(source).unwrap().to_string();
        assert_eq!(
            printed,
            "{\n    switch x\n    case 1 { }\n    default {\n        leave\n    }\n    for { } 1 { } {\n        break\n    }\n}"
        );
    }

    #[test]
    fn test_printed_output_reparses_identically() {
        let source = r#"{
            function h(a) -> r { let s := "q\"t" if a { r := s } }
            let v := h(0x20)
            { let w }
        }"#;
        let program = parse(source).unwrap();
        assert_eq!(parse(&program.to_string()).unwrap(), program);
    }
}
