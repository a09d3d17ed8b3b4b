use crate::ast::Expr;
use crate::error::{Loc, RillError};
use crate::lexer::{Token, TokenKind};

/// Parses a token stream into a single expression.
///
/// An empty stream is an error, and so is any token left over after one
/// complete expression has been parsed.
pub fn parse(tokens: Vec<Token>) -> Result<Expr, RillError> {
    if tokens.is_empty() {
        return Err(RillError::parse_error_no_loc(
            "expected non-empty token list".to_string(),
        ));
    }

    let mut parser = Parser::new(tokens);
    let expression = parser.parse_expression()?;

    if !parser.is_at_end() {
        return Err(RillError::parse_error(
            parser.peek().loc.clone(),
            "token was not parsed".to_string(),
        ));
    }
    Ok(expression)
}

/// Recursive-descent parser with single-token lookahead and a precedence
/// ladder for binary operators. `pos` is the read cursor; `peek` past the
/// end of the stream yields an `End` sentinel carrying the last real
/// token's location, so trailing-input errors report a sensible position.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    end: Token,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let end_loc = tokens
            .last()
            .map(|token| token.loc.clone())
            .unwrap_or_else(|| Loc::new(0, 0));
        Self {
            tokens,
            pos: 0,
            end: Token::new(TokenKind::End, String::new(), end_loc),
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.end)
    }

    fn peek_text_in(&self, texts: &[&str]) -> bool {
        texts.contains(&self.peek().text.as_str())
    }

    /// Text of the most recently consumed token, if any.
    fn previous_text(&self) -> Option<&str> {
        if self.pos == 0 {
            None
        } else {
            Some(self.tokens[self.pos - 1].text.as_str())
        }
    }

    fn consume(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &str) -> Result<Token, RillError> {
        if self.peek().text != expected {
            return Err(RillError::parse_error(
                self.peek().loc.clone(),
                format!("expected \"{}\"", expected),
            ));
        }
        Ok(self.consume())
    }

    fn expect_one_of(&mut self, expected: &[&str]) -> Result<Token, RillError> {
        if !self.peek_text_in(expected) {
            let comma_separated = expected
                .iter()
                .map(|text| format!("\"{}\"", text))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(RillError::parse_error(
                self.peek().loc.clone(),
                format!("expected one of: {}", comma_separated),
            ));
        }
        Ok(self.consume())
    }

    pub fn parse_expression(&mut self) -> Result<Expr, RillError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr, RillError> {
        let left = self.parse_or()?;

        if self.peek().text == "=" {
            let op_token = self.consume();
            // Right-associative: the right side re-enters the whole ladder,
            // so `a = b = c` nests as `a = (b = c)`.
            let right = self.parse_expression()?;
            return Ok(Expr::Binary {
                left: Box::new(left),
                op: op_token.text,
                right: Box::new(right),
                loc: op_token.loc,
            });
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, RillError> {
        let mut left = self.parse_and()?;
        while self.peek().text == "or" {
            let op_token = self.consume();
            let right = self.parse_and()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: op_token.text,
                right: Box::new(right),
                loc: op_token.loc,
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, RillError> {
        let mut left = self.parse_equality()?;
        while self.peek().text == "and" {
            let op_token = self.consume();
            let right = self.parse_equality()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: op_token.text,
                right: Box::new(right),
                loc: op_token.loc,
            };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, RillError> {
        let mut left = self.parse_comparison()?;
        while self.peek_text_in(&["==", "!="]) {
            let op_token = self.consume();
            let right = self.parse_comparison()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: op_token.text,
                right: Box::new(right),
                loc: op_token.loc,
            };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, RillError> {
        let mut left = self.parse_term()?;
        while self.peek_text_in(&["<", "<=", ">", ">="]) {
            let op_token = self.consume();
            let right = self.parse_term()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: op_token.text,
                right: Box::new(right),
                loc: op_token.loc,
            };
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, RillError> {
        let mut left = self.parse_factor()?;
        while self.peek_text_in(&["+", "-"]) {
            let op_token = self.consume();
            let right = self.parse_factor()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: op_token.text,
                right: Box::new(right),
                loc: op_token.loc,
            };
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr, RillError> {
        let mut left = self.parse_unary()?;
        while self.peek_text_in(&["*", "/", "%"]) {
            let op_token = self.consume();
            let right = self.parse_unary()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: op_token.text,
                right: Box::new(right),
                loc: op_token.loc,
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, RillError> {
        if self.peek_text_in(&["not", "-"]) {
            let op_token = self.consume();
            // The operand re-enters the whole ladder, so the operator spans
            // everything to its right: `not a and b` is `not (a and b)`.
            let operand = self.parse_expression()?;
            return Ok(Expr::Unary {
                op: op_token.text,
                operand: Box::new(operand),
                loc: op_token.loc,
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, RillError> {
        if self.peek().text == "(" {
            return self.parse_parenthesized();
        }
        if self.peek().text == "if" {
            return self.parse_if_expression();
        }
        if self.peek().text == "var" {
            return self.parse_var_declaration();
        }
        if self.peek().text == "{" {
            return self.parse_block();
        }
        match self.peek().kind {
            TokenKind::IntLiteral => self.parse_int_literal(),
            TokenKind::Identifier => self.parse_identifier(),
            _ => Err(RillError::parse_error(
                self.peek().loc.clone(),
                "expected \"(\", an integer literal or an identifier".to_string(),
            )),
        }
    }

    fn parse_parenthesized(&mut self) -> Result<Expr, RillError> {
        self.expect("(")?;
        // Parentheses are transparent: the inner expression's node is
        // returned directly.
        let expression = self.parse_expression()?;
        self.expect(")")?;
        Ok(expression)
    }

    fn parse_if_expression(&mut self) -> Result<Expr, RillError> {
        let if_token = self.expect("if")?;
        let condition = self.parse_expression()?;
        self.expect("then")?;
        let then_branch = self.parse_expression()?;
        let else_branch = if self.peek().text == "else" {
            self.consume();
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        Ok(Expr::If {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch,
            loc: if_token.loc,
        })
    }

    fn parse_var_declaration(&mut self) -> Result<Expr, RillError> {
        // A declaration is only legal directly inside a block or as the
        // first token of the whole input.
        match self.previous_text() {
            None | Some("{") | Some("}") | Some(";") => {}
            Some(_) => {
                return Err(RillError::parse_error_with_help(
                    self.peek().loc.clone(),
                    "var declaration is not allowed here".to_string(),
                    "var is only legal directly inside a block or at the top level".to_string(),
                ));
            }
        }

        let var_token = self.expect("var")?;
        if self.peek().kind != TokenKind::Identifier {
            return Err(RillError::parse_error(
                self.peek().loc.clone(),
                "expected an identifier".to_string(),
            ));
        }
        let name_token = self.consume();
        self.expect("=")?;
        let initializer = self.parse_expression()?;
        Ok(Expr::VarDecl {
            name: name_token.text,
            initializer: Box::new(initializer),
            loc: var_token.loc,
        })
    }

    fn parse_block(&mut self) -> Result<Expr, RillError> {
        let brace_token = self.expect("{")?;
        let mut statements = Vec::new();
        let mut result = None;

        while self.peek().text != "}" {
            if self.peek().kind == TokenKind::End {
                return Err(RillError::parse_error(
                    self.peek().loc.clone(),
                    "expected \"}\"".to_string(),
                ));
            }

            let expression = self.parse_expression()?;
            if self.peek().text == ";" {
                self.consume();
                statements.push(expression);
            } else if self.peek().text == "}" {
                result = Some(Box::new(expression));
            } else if matches!(self.previous_text(), Some(";") | Some("}")) {
                // The expression ended in a block (or swallowed its own
                // trailing semicolon), so the separator is optional.
                statements.push(expression);
            } else {
                return Err(RillError::parse_error(
                    self.peek().loc.clone(),
                    "expected \";\"".to_string(),
                ));
            }
        }

        self.expect("}")?;
        if self.peek().text == ";" {
            self.consume();
        }
        Ok(Expr::Block {
            statements,
            result,
            loc: brace_token.loc,
        })
    }

    fn parse_int_literal(&mut self) -> Result<Expr, RillError> {
        if self.peek().kind != TokenKind::IntLiteral {
            return Err(RillError::parse_error(
                self.peek().loc.clone(),
                "expected an integer literal".to_string(),
            ));
        }
        let token = self.consume();
        let value = token.text.parse::<i64>().map_err(|_| {
            RillError::parse_error(
                token.loc.clone(),
                format!("invalid integer literal: {}", token.text),
            )
        })?;
        Ok(Expr::Literal {
            value,
            loc: token.loc,
        })
    }

    fn parse_identifier(&mut self) -> Result<Expr, RillError> {
        if self.peek().kind != TokenKind::Identifier {
            return Err(RillError::parse_error(
                self.peek().loc.clone(),
                "expected an identifier".to_string(),
            ));
        }
        let token = self.consume();
        if self.peek().text == "(" {
            return self.parse_call(token);
        }
        Ok(Expr::Identifier {
            name: token.text,
            loc: token.loc,
        })
    }

    /// An identifier immediately followed by `(` is a call: zero or more
    /// comma-separated arguments closed by `)`.
    fn parse_call(&mut self, name_token: Token) -> Result<Expr, RillError> {
        self.expect("(")?;
        let mut args = Vec::new();
        if self.peek().text == ")" {
            self.consume();
        } else {
            loop {
                args.push(self.parse_expression()?);
                let separator = self.expect_one_of(&[",", ")"])?;
                if separator.text == ")" {
                    break;
                }
            }
        }
        Ok(Expr::Call {
            name: name_token.text,
            args,
            loc: name_token.loc,
        })
    }
}
