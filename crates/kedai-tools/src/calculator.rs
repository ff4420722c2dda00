//! Arithmetic expression evaluator.
//!
//! A small recursive-descent evaluator over `+ - * /`, parentheses,
//! decimals, and unary minus. It evaluates arithmetic and nothing else;
//! division by zero and unparseable syntax fail with distinguishable
//! errors so callers can name the specific problem to the user.

use async_trait::async_trait;

use crate::error::ToolError;

/// Arithmetic evaluation capability.
#[async_trait]
pub trait Calculator: Send + Sync {
    async fn evaluate(&self, expr: &str) -> Result<f64, ToolError>;
}

/// The default expression evaluator.
pub struct ArithmeticCalculator;

#[async_trait]
impl Calculator for ArithmeticCalculator {
    async fn evaluate(&self, expr: &str) -> Result<f64, ToolError> {
        evaluate_expression(expr)
    }
}

/// Evaluate an arithmetic expression string.
pub fn evaluate_expression(expr: &str) -> Result<f64, ToolError> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return Err(ToolError::MalformedExpression("empty expression".to_string()));
    }
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.parse_expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(ToolError::MalformedExpression(format!(
            "unexpected trailing input near '{}'",
            parser.tokens[parser.pos]
        )));
    }
    if !value.is_finite() {
        return Err(ToolError::DivisionByZero);
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Num(n) => write!(f, "{}", n),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

fn tokenize(expr: &str) -> Result<Vec<Token>, ToolError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = expr.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' | 'x' | 'X' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let n: f64 = literal.parse().map_err(|_| {
                    ToolError::MalformedExpression(format!("bad number '{}'", literal))
                })?;
                tokens.push(Token::Num(n));
            }
            other => {
                return Err(ToolError::MalformedExpression(format!(
                    "unexpected character '{}'",
                    other
                )));
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    // expr := term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<f64, ToolError> {
        let mut value = self.parse_term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.advance();
                    value += self.parse_term()?;
                }
                Token::Minus => {
                    self.advance();
                    value -= self.parse_term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    // term := factor (('*' | '/') factor)*
    fn parse_term(&mut self) -> Result<f64, ToolError> {
        let mut value = self.parse_factor()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.advance();
                    value *= self.parse_factor()?;
                }
                Token::Slash => {
                    self.advance();
                    let divisor = self.parse_factor()?;
                    if divisor == 0.0 {
                        return Err(ToolError::DivisionByZero);
                    }
                    value /= divisor;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    // factor := '-' factor | number | '(' expr ')'
    fn parse_factor(&mut self) -> Result<f64, ToolError> {
        match self.advance() {
            Some(Token::Minus) => Ok(-self.parse_factor()?),
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.parse_expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(ToolError::MalformedExpression(
                        "missing closing parenthesis".to_string(),
                    )),
                }
            }
            Some(t) => Err(ToolError::MalformedExpression(format!(
                "unexpected token '{}'",
                t
            ))),
            None => Err(ToolError::MalformedExpression(
                "expression ended unexpectedly".to_string(),
            )),
        }
    }
}
