//! Recursive-descent parser for the textual form of the IR.
//!
//! ```text
//! {
//!     function f(a, b) -> x { x := add(a, b) }
//!     let z := f(1, 2)
//! }
//! ```

mod lexer;

pub use lexer::{Lexer, Token, TokenKind};

use crate::ast::{
    Block, Case, Expression, FunctionCall, FunctionDefinition, Literal, Name, Program, Statement,
};
use crate::error::ParseError;

/// Parses a whole program. The source must be a single root block.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser::new(tokens);
    let root = parser.block()?;
    parser.expect(TokenKind::Eof, "end of input")?;
    Ok(Program { root })
}

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            position: 0,
        }
    }

    fn peek(&self) -> &Token {
        // The lexer always terminates the stream with `Eof`.
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn peek_nth(&self, n: usize) -> &TokenKind {
        &self.tokens[(self.position + n).min(self.tokens.len() - 1)].kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let token = self.peek();
        ParseError::new(message, token.line, token.column)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ParseError> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected {what}, found {:?}", self.peek().kind)))
        }
    }

    fn identifier(&mut self) -> Result<Name, ParseError> {
        match &self.peek().kind {
            TokenKind::Identifier(name) => {
                let name = Name::new(name.clone());
                self.advance();
                Ok(name)
            }
            other => Err(self.error(format!("expected identifier, found {other:?}"))),
        }
    }

    /// `a, b, c`
    fn identifier_list(&mut self) -> Result<Vec<Name>, ParseError> {
        let mut names = vec![self.identifier()?];
        while self.eat(&TokenKind::Comma) {
            names.push(self.identifier()?);
        }
        Ok(names)
    }

    pub fn block(&mut self) -> Result<Block, ParseError> {
        self.expect(TokenKind::LeftBrace, "`{`")?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RightBrace) {
            if self.check(&TokenKind::Eof) {
                return Err(self.error("unterminated block"));
            }
            statements.push(self.statement()?);
        }
        self.advance();
        Ok(Block { statements })
    }

    fn statement(&mut self) -> Result<Statement, ParseError> {
        match &self.peek().kind {
            TokenKind::LeftBrace => Ok(Statement::Block(self.block()?)),
            TokenKind::Function => self.function_definition(),
            TokenKind::Let => {
                self.advance();
                let names = self.identifier_list()?;
                let value = if self.eat(&TokenKind::Assign) {
                    Some(self.expression()?)
                } else {
                    None
                };
                Ok(Statement::VariableDeclaration { names, value })
            }
            TokenKind::If => {
                self.advance();
                let condition = self.expression()?;
                let body = self.block()?;
                Ok(Statement::If { condition, body })
            }
            TokenKind::Switch => self.switch(),
            TokenKind::For => {
                self.advance();
                let pre = self.block()?;
                let condition = self.expression()?;
                let post = self.block()?;
                let body = self.block()?;
                Ok(Statement::ForLoop {
                    pre,
                    condition,
                    post,
                    body,
                })
            }
            TokenKind::Break => {
                self.advance();
                Ok(Statement::Break)
            }
            TokenKind::Continue => {
                self.advance();
                Ok(Statement::Continue)
            }
            TokenKind::Leave => {
                self.advance();
                Ok(Statement::Leave)
            }
            TokenKind::Identifier(_) => {
                let is_assignment =
                    matches!(self.peek_nth(1), TokenKind::Assign | TokenKind::Comma);
                if is_assignment {
                    let targets = self.identifier_list()?;
                    self.expect(TokenKind::Assign, "`:=`")?;
                    let value = self.expression()?;
                    Ok(Statement::Assignment { targets, value })
                } else {
                    let expression = self.expression()?;
                    match expression {
                        Expression::FunctionCall(_) => {
                            Ok(Statement::ExpressionStatement(expression))
                        }
                        _ => Err(self.error("only function calls can be used as statements")),
                    }
                }
            }
            other => Err(self.error(format!("expected statement, found {other:?}"))),
        }
    }

    fn function_definition(&mut self) -> Result<Statement, ParseError> {
        self.expect(TokenKind::Function, "`function`")?;
        let name = self.identifier()?;
        self.expect(TokenKind::LeftParen, "`(`")?;
        let parameters = if self.check(&TokenKind::RightParen) {
            Vec::new()
        } else {
            self.identifier_list()?
        };
        self.expect(TokenKind::RightParen, "`)`")?;
        let return_variables = if self.eat(&TokenKind::Arrow) {
            self.identifier_list()?
        } else {
            Vec::new()
        };
        let body = self.block()?;
        Ok(Statement::FunctionDefinition(FunctionDefinition {
            name,
            parameters,
            return_variables,
            body,
        }))
    }

    fn switch(&mut self) -> Result<Statement, ParseError> {
        self.expect(TokenKind::Switch, "`switch`")?;
        let expression = self.expression()?;
        let mut cases = Vec::new();
        loop {
            if self.eat(&TokenKind::Case) {
                let value = self.literal()?;
                let body = self.block()?;
                cases.push(Case {
                    value: Some(value),
                    body,
                });
            } else if self.eat(&TokenKind::Default) {
                let body = self.block()?;
                cases.push(Case { value: None, body });
                break;
            } else {
                break;
            }
        }
        if cases.is_empty() {
            return Err(self.error("switch needs at least one case or default"));
        }
        Ok(Statement::Switch { expression, cases })
    }

    fn literal(&mut self) -> Result<Literal, ParseError> {
        let literal = match &self.peek().kind {
            TokenKind::Number(n) => Literal::Number(*n),
            TokenKind::String(s) => Literal::String(s.clone()),
            TokenKind::True => Literal::Bool(true),
            TokenKind::False => Literal::Bool(false),
            other => return Err(self.error(format!("expected literal, found {other:?}"))),
        };
        self.advance();
        Ok(literal)
    }

    pub fn expression(&mut self) -> Result<Expression, ParseError> {
        if let TokenKind::Identifier(_) = self.peek().kind {
            let name = self.identifier()?;
            if !self.eat(&TokenKind::LeftParen) {
                return Ok(Expression::Identifier(name));
            }
            let mut arguments = Vec::new();
            if !self.check(&TokenKind::RightParen) {
                arguments.push(self.expression()?);
                while self.eat(&TokenKind::Comma) {
                    arguments.push(self.expression()?);
                }
            }
            self.expect(TokenKind::RightParen, "`)`")?;
            return Ok(Expression::FunctionCall(FunctionCall {
                function_name: name,
                arguments,
            }));
        }
        Ok(Expression::Literal(self.literal()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_function_definition() {
        let program = parse("{ function f(a, b) -> x, y { x := div(a, b) } }").unwrap();
        let func = program.function("f").unwrap();
        assert_eq!(func.parameters, vec![Name::from("a"), Name::from("b")]);
        assert_eq!(func.return_variables, vec![Name::from("x"), Name::from("y")]);
        assert_eq!(
            func.body.statements,
            vec![Statement::Assignment {
                targets: vec!["x".into()],
                value: Expression::call(
                    "div",
                    vec![Expression::identifier("a"), Expression::identifier("b")]
                ),
            }]
        );
    }

    #[test]
    fn test_parse_function_without_signature() {
        let program = parse("{ function g() { } }").unwrap();
        let func = program.function("g").unwrap();
        assert!(func.parameters.is_empty());
        assert!(func.return_variables.is_empty());
    }

    #[test]
    fn test_parse_multi_assignment() {
        let program = parse("{ let a, b := f() a, b := f() }").unwrap();
        assert!(matches!(
            &program.root.statements[1],
            Statement::Assignment { targets, .. } if targets.len() == 2
        ));
    }

    #[test]
    fn test_parse_control_flow() {
        let source = "{
            for { let i := 0 } lt(i, 10) { i := add(i, 1) } { if eq(i, 5) { break } continue }
            switch x case 0 { leave } case \"a\" { } default { }
        }";
        let program = parse(source).unwrap();
        assert!(matches!(program.root.statements[0], Statement::ForLoop { .. }));
        match &program.root.statements[1] {
            Statement::Switch { cases, .. } => {
                assert_eq!(cases.len(), 3);
                assert_eq!(cases[2].value, None);
            }
            other => panic!("expected switch, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_identifier_is_not_a_statement() {
        let err = parse("{ x }").unwrap_err();
        assert!(err.message.contains("function calls"));
    }

    #[test]
    fn test_unterminated_block() {
        assert!(parse("{ function f() {").is_err());
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert!(parse("{ } }").is_err());
    }
}
