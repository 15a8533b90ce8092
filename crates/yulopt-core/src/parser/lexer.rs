use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Identifier(String),
    Number(u128),
    String(String),
    // keywords
    Function,
    Let,
    If,
    Switch,
    Case,
    Default,
    For,
    Break,
    Continue,
    Leave,
    True,
    False,
    // punctuation
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    Comma,
    Assign,
    Arrow,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

pub struct Lexer<'src> {
    chars: std::iter::Peekable<std::str::Chars<'src>>,
    line: usize,
    column: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Lexer {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let (line, column) = (self.line, self.column);
            let Some(c) = self.bump() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    line,
                    column,
                });
                return Ok(tokens);
            };

            let kind = match c {
                '{' => TokenKind::LeftBrace,
                '}' => TokenKind::RightBrace,
                '(' => TokenKind::LeftParen,
                ')' => TokenKind::RightParen,
                ',' => TokenKind::Comma,
                ':' => {
                    if self.eat('=') {
                        TokenKind::Assign
                    } else {
                        return Err(ParseError::new("expected `=` after `:`", line, column));
                    }
                }
                '-' => {
                    if self.eat('>') {
                        TokenKind::Arrow
                    } else {
                        return Err(ParseError::new("expected `>` after `-`", line, column));
                    }
                }
                '"' => TokenKind::String(self.string(line, column)?),
                c if c.is_ascii_digit() => self.number(c, line, column)?,
                c if is_identifier_start(c) => keyword_or_identifier(self.identifier(c)),
                other => {
                    return Err(ParseError::new(
                        format!("unexpected character `{other}`"),
                        line,
                        column,
                    ))
                }
            };
            tokens.push(Token { kind, line, column });
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.chars.peek() == Some(&expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.chars.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    let (line, column) = (self.line, self.column);
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    match lookahead.next() {
                        Some('/') => {
                            while let Some(c) = self.bump() {
                                if c == '\n' {
                                    break;
                                }
                            }
                        }
                        Some('*') => {
                            self.bump();
                            self.bump();
                            let mut previous = '\0';
                            loop {
                                match self.bump() {
                                    Some('/') if previous == '*' => break,
                                    Some(c) => previous = c,
                                    None => {
                                        return Err(ParseError::new(
                                            "unterminated block comment",
                                            line,
                                            column,
                                        ))
                                    }
                                }
                            }
                        }
                        _ => return Ok(()),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn string(&mut self, line: usize, column: usize) -> Result<String, ParseError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(value),
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some(c @ ('"' | '\\')) => value.push(c),
                    _ => return Err(ParseError::new("invalid escape sequence", line, column)),
                },
                Some('\n') | None => {
                    return Err(ParseError::new("unterminated string literal", line, column))
                }
                Some(c) => value.push(c),
            }
        }
    }

    fn number(&mut self, first: char, line: usize, column: usize) -> Result<TokenKind, ParseError> {
        let mut text = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_alphanumeric() {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }

        let parsed = match text.strip_prefix("0x") {
            Some(hex) => u128::from_str_radix(hex, 16),
            None => text.parse::<u128>(),
        };
        parsed
            .map(TokenKind::Number)
            .map_err(|_| ParseError::new(format!("invalid number literal `{text}`"), line, column))
    }

    fn identifier(&mut self, first: char) -> String {
        let mut text = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if is_identifier_continue(c) {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        text
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_continue(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit() || c == '.'
}

fn keyword_or_identifier(text: String) -> TokenKind {
    match text.as_str() {
        "function" => TokenKind::Function,
        "let" => TokenKind::Let,
        "if" => TokenKind::If,
        "switch" => TokenKind::Switch,
        "case" => TokenKind::Case,
        "default" => TokenKind::Default,
        "for" => TokenKind::For,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "leave" => TokenKind::Leave,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        _ => TokenKind::Identifier(text),
    }
}
