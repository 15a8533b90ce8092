//! Yul-style nested intermediate representation.
//!
//! A program is a single root [`Block`]. Function definitions are ordinary
//! statements; after hoisting they only appear as direct children of the
//! root block. All nodes are owned values so that passes can build whole
//! replacement definitions and swap them into the tree.

mod features;

pub use features::AstFeatures;

use std::borrow::Borrow;
use std::fmt;

/// An identifier: a variable, parameter, return binding or function name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Name(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Name {
    fn from(name: &str) -> Self {
        Name(name.to_string())
    }
}

impl From<String> for Name {
    fn from(name: String) -> Self {
        Name(name)
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Root of the tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    pub root: Block,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Program {
            root: Block { statements },
        }
    }

    /// Top-level function definitions in program order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDefinition> {
        self.root.statements.iter().filter_map(|stmt| match stmt {
            Statement::FunctionDefinition(func) => Some(func),
            _ => None,
        })
    }

    /// Looks up a top-level function definition by name.
    pub fn function(&self, name: &str) -> Option<&FunctionDefinition> {
        self.functions().find(|func| func.name.as_str() == name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    pub statements: Vec<Statement>,
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Block { statements }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionDefinition {
    pub name: Name,
    pub parameters: Vec<Name>,
    pub return_variables: Vec<Name>,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement {
    ExpressionStatement(Expression),
    /// `a, b := f()`
    Assignment {
        targets: Vec<Name>,
        value: Expression,
    },
    /// `let a, b := f()` or `let a`
    VariableDeclaration {
        names: Vec<Name>,
        value: Option<Expression>,
    },
    FunctionDefinition(FunctionDefinition),
    If {
        condition: Expression,
        body: Block,
    },
    Switch {
        expression: Expression,
        cases: Vec<Case>,
    },
    ForLoop {
        pre: Block,
        condition: Expression,
        post: Block,
        body: Block,
    },
    Break,
    Continue,
    Leave,
    Block(Block),
}

/// One arm of a `switch`. `value == None` is the `default` arm.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Case {
    pub value: Option<Literal>,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expression {
    Identifier(Name),
    Literal(Literal),
    FunctionCall(FunctionCall),
}

impl Expression {
    pub fn identifier(name: impl Into<Name>) -> Self {
        Expression::Identifier(name.into())
    }

    pub fn call(function_name: impl Into<Name>, arguments: Vec<Expression>) -> Self {
        Expression::FunctionCall(FunctionCall {
            function_name: function_name.into(),
            arguments,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionCall {
    pub function_name: Name,
    pub arguments: Vec<Expression>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Literal {
    Number(u128),
    String(String),
    Bool(bool),
}

impl Literal {
    /// Numeric value used by `switch` matching and the interpreter.
    pub fn value(&self) -> u128 {
        match self {
            Literal::Number(n) => *n,
            Literal::Bool(b) => u128::from(*b),
            Literal::String(s) => s
                .bytes()
                .take(16)
                .fold(0u128, |acc, byte| (acc << 8) | u128::from(byte)),
        }
    }
}
