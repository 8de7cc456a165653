//! Arithmetic Evaluator
//!
//! Parses expression text produced by the builder into an [`Expr`] tree and
//! evaluates it against a [`Scope`] of variable bindings. The grammar covers
//! `+ - * / ^`, unary signs, parentheses, implicit multiplication, the
//! constants `pi`/`e` and a small set of single-argument functions. A
//! function name may be followed by a parenthesised argument or directly by
//! its operand (`sqrt 16`).

use crate::error::{EngineError, EngineResult};
use std::collections::{BTreeSet, HashMap};

// =============================================================================
// Tokenizer
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),
    Operator(char),
    OpenParen,
    CloseParen,
    Eof,
}

struct Tokenizer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn next_token(&mut self) -> EngineResult<Token> {
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }

        let c = match self.chars.peek() {
            Some(&c) => c,
            None => return Ok(Token::Eof),
        };

        match c {
            '0'..='9' | '.' => self.read_number(),
            '\u{03C0}' => {
                self.chars.next();
                Ok(Token::Identifier("pi".to_string()))
            }
            '\u{221A}' => {
                self.chars.next();
                Ok(Token::Identifier("sqrt".to_string()))
            }
            c if c.is_alphabetic() => Ok(self.read_identifier()),
            '+' | '-' | '*' | '/' | '^' => {
                self.chars.next();
                Ok(Token::Operator(c))
            }
            '\u{00D7}' => {
                self.chars.next();
                Ok(Token::Operator('*'))
            }
            '\u{00F7}' => {
                self.chars.next();
                Ok(Token::Operator('/'))
            }
            '\u{2212}' => {
                self.chars.next();
                Ok(Token::Operator('-'))
            }
            '(' => {
                self.chars.next();
                Ok(Token::OpenParen)
            }
            ')' => {
                self.chars.next();
                Ok(Token::CloseParen)
            }
            other => Err(EngineError::EvaluationFailure(format!(
                "Unexpected character '{}'",
                other
            ))),
        }
    }

    fn read_number(&mut self) -> EngineResult<Token> {
        let mut num = String::new();
        let mut has_dot = false;

        while let Some(&c) = self.chars.peek() {
            match c {
                '0'..='9' => num.push(c),
                '.' if !has_dot => {
                    has_dot = true;
                    num.push(c);
                }
                _ => break,
            }
            self.chars.next();
        }

        num.parse()
            .map(Token::Number)
            .map_err(|_| EngineError::EvaluationFailure(format!("Invalid number '{}'", num)))
    }

    fn read_identifier(&mut self) -> Token {
        let mut ident = String::new();

        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                ident.push(c);
                self.chars.next();
            } else {
                break;
            }
        }

        Token::Identifier(ident)
    }
}

// =============================================================================
// Expression tree
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sqrt,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Ln,
    Log10,
    Exp,
    Abs,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sqrt" => Function::Sqrt,
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "asin" => Function::Asin,
            "acos" => Function::Acos,
            "atan" => Function::Atan,
            // natural logarithm, as on the equation palette
            "ln" | "log" => Function::Ln,
            "log10" => Function::Log10,
            "exp" => Function::Exp,
            "abs" => Function::Abs,
            _ => return None,
        })
    }

    fn apply(self, value: f64) -> f64 {
        match self {
            Function::Sqrt => value.sqrt(),
            Function::Sin => value.sin(),
            Function::Cos => value.cos(),
            Function::Tan => value.tan(),
            Function::Asin => value.asin(),
            Function::Acos => value.acos(),
            Function::Atan => value.atan(),
            Function::Ln => value.ln(),
            Function::Log10 => value.log10(),
            Function::Exp => value.exp(),
            Function::Abs => value.abs(),
        }
    }
}

/// Parsed arithmetic expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable(String),
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        function: Function,
        arg: Box<Expr>,
    },
}

impl Expr {
    fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Evaluate against a scope; unbound variables and non-finite results fail
    pub fn eval(&self, scope: &Scope) -> EngineResult<f64> {
        let value = self.eval_inner(scope)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EngineError::EvaluationFailure(
                "Result is not a finite number".to_string(),
            ))
        }
    }

    fn eval_inner(&self, scope: &Scope) -> EngineResult<f64> {
        Ok(match self {
            Expr::Number(n) => *n,
            Expr::Variable(name) => scope.get(name).ok_or_else(|| {
                EngineError::EvaluationFailure(format!("Undefined variable: {}", name))
            })?,
            Expr::Negate(inner) => -inner.eval_inner(scope)?,
            Expr::Binary { op, lhs, rhs } => {
                let a = lhs.eval_inner(scope)?;
                let b = rhs.eval_inner(scope)?;
                match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Subtract => a - b,
                    BinaryOp::Multiply => a * b,
                    BinaryOp::Divide => a / b,
                    BinaryOp::Power => a.powf(b),
                }
            }
            Expr::Call { function, arg } => function.apply(arg.eval_inner(scope)?),
        })
    }

    /// Names of the free variables
    pub fn variables(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables(&self, names: &mut BTreeSet<String>) {
        match self {
            Expr::Number(_) => {}
            Expr::Variable(name) => {
                names.insert(name.clone());
            }
            Expr::Negate(inner) => inner.collect_variables(names),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_variables(names);
                rhs.collect_variables(names);
            }
            Expr::Call { arg, .. } => arg.collect_variables(names),
        }
    }
}

/// Variable bindings for evaluation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    values: HashMap<String, f64>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style binding
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}

// =============================================================================
// Parser
// =============================================================================

struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    fn new(input: &str) -> EngineResult<Self> {
        let mut tokenizer = Tokenizer::new(input);
        let mut tokens = Vec::new();

        loop {
            let token = tokenizer.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }

        Ok(Self {
            tokens,
            position: 0,
        })
    }

    fn parse(&mut self) -> EngineResult<Expr> {
        if self.is_at_end() {
            return Err(EngineError::EvaluationFailure(
                "Empty expression".to_string(),
            ));
        }
        let expr = self.parse_sum()?;
        if !self.is_at_end() {
            return Err(EngineError::EvaluationFailure(format!(
                "Unexpected token {:?}",
                self.peek()
            )));
        }
        Ok(expr)
    }

    /// sum := product (('+' | '-') product)*
    fn parse_sum(&mut self) -> EngineResult<Expr> {
        let mut lhs = self.parse_product()?;
        loop {
            let op = match self.peek() {
                Token::Operator('+') => BinaryOp::Add,
                Token::Operator('-') => BinaryOp::Subtract,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_product()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    /// product := unary (('*' | '/')? unary)*
    fn parse_product(&mut self) -> EngineResult<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Operator('*') => {
                    self.advance();
                    BinaryOp::Multiply
                }
                Token::Operator('/') => {
                    self.advance();
                    BinaryOp::Divide
                }
                // implicit multiplication: 2x, 2(3), x sin x
                Token::Number(_) | Token::Identifier(_) | Token::OpenParen => BinaryOp::Multiply,
                _ => return Ok(lhs),
            };
            let rhs = self.parse_unary()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    /// unary := ('+' | '-') unary | power
    fn parse_unary(&mut self) -> EngineResult<Expr> {
        match self.peek() {
            Token::Operator('-') => {
                self.advance();
                Ok(Expr::Negate(Box::new(self.parse_unary()?)))
            }
            Token::Operator('+') => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    /// power := primary ('^' unary)?
    fn parse_power(&mut self) -> EngineResult<Expr> {
        let base = self.parse_primary()?;
        if matches!(self.peek(), Token::Operator('^')) {
            self.advance();
            let exponent = self.parse_unary()?;
            return Ok(Expr::binary(BinaryOp::Power, base, exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> EngineResult<Expr> {
        match self.advance() {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Identifier(name) => {
                if let Some(function) = Function::from_name(&name) {
                    let arg = self.parse_power()?;
                    return Ok(Expr::Call {
                        function,
                        arg: Box::new(arg),
                    });
                }
                Ok(match name.as_str() {
                    "pi" => Expr::Number(std::f64::consts::PI),
                    "e" => Expr::Number(std::f64::consts::E),
                    _ => Expr::Variable(name),
                })
            }
            Token::OpenParen => {
                let inner = self.parse_sum()?;
                match self.advance() {
                    Token::CloseParen => Ok(inner),
                    _ => Err(EngineError::EvaluationFailure(
                        "Expected closing ')'".to_string(),
                    )),
                }
            }
            Token::Eof => Err(EngineError::EvaluationFailure(
                "Unexpected end of expression".to_string(),
            )),
            token => Err(EngineError::EvaluationFailure(format!(
                "Unexpected token {:?}",
                token
            ))),
        }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token != Token::Eof {
            self.position += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }
}

/// Parse expression text into a tree
pub fn parse(input: &str) -> EngineResult<Expr> {
    Parser::new(input)?.parse()
}

/// Parse and evaluate in one step
pub fn evaluate(input: &str, scope: &Scope) -> EngineResult<f64> {
    parse(input)?.eval(scope)
}

// =============================================================================
// Tests
// =============================================================================
