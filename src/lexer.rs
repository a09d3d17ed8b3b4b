use crate::error::{Loc, RillError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    IntLiteral,
    Operator,
    Punctuation,
    /// Sentinel produced by the parser when lookahead runs past the stream;
    /// the scanner never emits it.
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub loc: Loc,
}

impl Token {
    pub fn new(kind: TokenKind, text: String, loc: Loc) -> Self {
        Self { kind, text, loc }
    }
}

/// Character-level scanner. Classifies runs of characters into tokens,
/// skips whitespace and `//` comments, and tracks 0-based line/column
/// positions so every token carries the location of its first character.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 0,
            column: 0,
            tokens: Vec::new(),
        }
    }

    pub fn scan_tokens(mut self) -> Result<Vec<Token>, RillError> {
        while !self.is_at_end() {
            self.scan_token()?;
        }
        Ok(self.tokens)
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn scan_token(&mut self) -> Result<(), RillError> {
        let loc = Loc::new(self.line, self.column);
        let c = self.advance();

        match c {
            ' ' | '\r' | '\t' | '\n' => {
                // Whitespace; advance() already tracked the position.
            }
            '(' | ')' | '{' | '}' | ',' | ';' => {
                self.add_token(TokenKind::Punctuation, c.to_string(), loc);
            }
            '+' | '-' | '*' | '%' => {
                self.add_token(TokenKind::Operator, c.to_string(), loc);
            }
            '/' => {
                if self.match_char('/') {
                    // Comment goes until end of line
                    while !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                } else {
                    self.add_token(TokenKind::Operator, "/".to_string(), loc);
                }
            }
            '=' => {
                let text = if self.match_char('=') { "==" } else { "=" };
                self.add_token(TokenKind::Operator, text.to_string(), loc);
            }
            '<' => {
                let text = if self.match_char('=') { "<=" } else { "<" };
                self.add_token(TokenKind::Operator, text.to_string(), loc);
            }
            '>' => {
                let text = if self.match_char('=') { ">=" } else { ">" };
                self.add_token(TokenKind::Operator, text.to_string(), loc);
            }
            '!' => {
                if self.match_char('=') {
                    self.add_token(TokenKind::Operator, "!=".to_string(), loc);
                } else {
                    return Err(RillError::lex_error(
                        loc,
                        "unexpected character: '!'".to_string(),
                    ));
                }
            }
            c if c.is_ascii_digit() => self.number(c, loc),
            c if c.is_alphabetic() || c == '_' => self.identifier(c, loc),
            _ => {
                return Err(RillError::lex_error(
                    loc,
                    format!("unexpected character: '{}'", c),
                ));
            }
        }

        Ok(())
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.pos];
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        c
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    fn peek(&self) -> char {
        self.chars[self.pos]
    }

    fn number(&mut self, first: char, loc: Loc) {
        let mut text = String::from(first);
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            text.push(self.advance());
        }
        self.add_token(TokenKind::IntLiteral, text, loc);
    }

    fn identifier(&mut self, first: char, loc: Loc) {
        let mut text = String::from(first);
        while !self.is_at_end() && (self.peek().is_alphanumeric() || self.peek() == '_') {
            text.push(self.advance());
        }

        // The word operators are the only identifiers classified specially;
        // keywords like `if` and `var` stay identifiers and the parser
        // dispatches on their text.
        let kind = match text.as_str() {
            "and" | "or" | "not" => TokenKind::Operator,
            _ => TokenKind::Identifier,
        };
        self.add_token(kind, text, loc);
    }

    fn add_token(&mut self, kind: TokenKind, text: String, loc: Loc) {
        self.tokens.push(Token::new(kind, text, loc));
    }
}
