//! Sandboxed numeric expression evaluation for calculated columns.
//!
//! Expressions reference columns by name and combine them with arithmetic
//! and comparison operators plus a fixed function whitelist. There is no
//! host access of any kind: the pipeline is tokenizer, AST, row-by-row
//! evaluator, and every value is an `Option<f64>` so missing inputs
//! propagate to a missing output.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;

/// Errors raised while parsing a calculated-column expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("expression ended unexpectedly")]
    UnexpectedEnd,

    #[error("unexpected token '{token}'")]
    UnexpectedToken { token: String },

    #[error("unknown identifier '{name}' in expression")]
    UnknownIdentifier { name: String },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("function '{name}' expects {expected} argument(s), got {got}")]
    WrongArity {
        name: String,
        expected: usize,
        got: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Power,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(v) => write!(f, "{v}"),
            Token::Ident(name) => write!(f, "{name}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::Power => write!(f, "**"),
            Token::Eq => write!(f, "=="),
            Token::Ne => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::Le => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::Ge => write!(f, ">="),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

/// Whitelisted numeric functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Abs,
    Sqrt,
    Ln,
    Log10,
    Exp,
    Sin,
    Cos,
    Tan,
    Round,
    Floor,
    Ceil,
    Min,
    Max,
    Pow,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "abs" => Some(Self::Abs),
            "sqrt" => Some(Self::Sqrt),
            "ln" | "log" => Some(Self::Ln),
            "log10" => Some(Self::Log10),
            "exp" => Some(Self::Exp),
            "sin" => Some(Self::Sin),
            "cos" => Some(Self::Cos),
            "tan" => Some(Self::Tan),
            "round" => Some(Self::Round),
            "floor" => Some(Self::Floor),
            "ceil" => Some(Self::Ceil),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "pow" => Some(Self::Pow),
            _ => None,
        }
    }

    fn arity(self) -> usize {
        match self {
            Self::Min | Self::Max | Self::Pow => 2,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Column(String),
    Neg(Box<Expr>),
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Call {
        function: Function,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Column names referenced anywhere in the tree.
    pub fn column_refs(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_refs(&mut out);
        out
    }

    fn collect_refs(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Number(_) => {}
            Expr::Column(name) => {
                out.insert(name.clone());
            }
            Expr::Neg(inner) => inner.collect_refs(out),
            Expr::Binary { left, right, .. } => {
                left.collect_refs(out);
                right.collect_refs(out);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_refs(out);
                }
            }
        }
    }

    /// Evaluate one row against pre-coerced column vectors.
    ///
    /// A missing operand, a zero divisor, or an unbound column reference all
    /// yield `None`. Comparisons evaluate to 1.0 / 0.0.
    pub fn evaluate(&self, columns: &BTreeMap<String, Vec<Option<f64>>>, row: usize) -> Option<f64> {
        match self {
            Expr::Number(v) => Some(*v),
            Expr::Column(name) => columns.get(name)?.get(row).copied().flatten(),
            Expr::Neg(inner) => inner.evaluate(columns, row).map(|v| -v),
            Expr::Binary { left, op, right } => {
                let l = left.evaluate(columns, row)?;
                let r = right.evaluate(columns, row)?;
                apply_binary(l, *op, r)
            }
            Expr::Call { function, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(arg.evaluate(columns, row)?);
                }
                Some(apply_function(*function, &values))
            }
        }
    }
}

fn apply_binary(l: f64, op: BinaryOp, r: f64) -> Option<f64> {
    match op {
        BinaryOp::Add => Some(l + r),
        BinaryOp::Subtract => Some(l - r),
        BinaryOp::Multiply => Some(l * r),
        BinaryOp::Divide => (r != 0.0).then(|| l / r),
        // Sign follows the divisor.
        BinaryOp::Modulo => (r != 0.0).then(|| ((l % r) + r) % r),
        BinaryOp::Power => Some(l.powf(r)),
        BinaryOp::Eq => Some(bool_value(l == r)),
        BinaryOp::Ne => Some(bool_value(l != r)),
        BinaryOp::Lt => Some(bool_value(l < r)),
        BinaryOp::Le => Some(bool_value(l <= r)),
        BinaryOp::Gt => Some(bool_value(l > r)),
        BinaryOp::Ge => Some(bool_value(l >= r)),
    }
}

fn apply_function(function: Function, values: &[f64]) -> f64 {
    match function {
        Function::Abs => values[0].abs(),
        Function::Sqrt => values[0].sqrt(),
        Function::Ln => values[0].ln(),
        Function::Log10 => values[0].log10(),
        Function::Exp => values[0].exp(),
        Function::Sin => values[0].sin(),
        Function::Cos => values[0].cos(),
        Function::Tan => values[0].tan(),
        Function::Round => values[0].round(),
        Function::Floor => values[0].floor(),
        Function::Ceil => values[0].ceil(),
        Function::Min => values[0].min(values[1]),
        Function::Max => values[0].max(values[1]),
        Function::Pow => values[0].powf(values[1]),
    }
}

fn bool_value(v: bool) -> f64 {
    if v { 1.0 } else { 0.0 }
}

/// Parse an expression string into a tree.
pub fn parse(input: &str) -> Result<Expr, ExpressionError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_comparison()?;
    match parser.peek() {
        Some(token) => Err(ExpressionError::UnexpectedToken {
            token: token.to_string(),
        }),
        None => Ok(expr),
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            c if c.is_ascii_digit() => {
                tokens.push(scan_number(&mut chars, pos, input)?);
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(name));
            }
            '+' => push_single(&mut chars, &mut tokens, Token::Plus),
            '-' => push_single(&mut chars, &mut tokens, Token::Minus),
            '/' => push_single(&mut chars, &mut tokens, Token::Slash),
            '%' => push_single(&mut chars, &mut tokens, Token::Percent),
            '^' => push_single(&mut chars, &mut tokens, Token::Power),
            '(' => push_single(&mut chars, &mut tokens, Token::LParen),
            ')' => push_single(&mut chars, &mut tokens, Token::RParen),
            ',' => push_single(&mut chars, &mut tokens, Token::Comma),
            '*' => {
                chars.next();
                if matches!(chars.peek(), Some((_, '*'))) {
                    chars.next();
                    tokens.push(Token::Power);
                } else {
                    tokens.push(Token::Star);
                }
            }
            '<' => {
                chars.next();
                if matches!(chars.peek(), Some((_, '='))) {
                    chars.next();
                    tokens.push(Token::Le);
                } else {
                    tokens.push(Token::Lt);
                }
            }
            '>' => {
                chars.next();
                if matches!(chars.peek(), Some((_, '='))) {
                    chars.next();
                    tokens.push(Token::Ge);
                } else {
                    tokens.push(Token::Gt);
                }
            }
            '=' => {
                chars.next();
                if matches!(chars.peek(), Some((_, '='))) {
                    chars.next();
                    tokens.push(Token::Eq);
                } else {
                    return Err(ExpressionError::UnexpectedChar { ch: '=', pos });
                }
            }
            '!' => {
                chars.next();
                if matches!(chars.peek(), Some((_, '='))) {
                    chars.next();
                    tokens.push(Token::Ne);
                } else {
                    return Err(ExpressionError::UnexpectedChar { ch: '!', pos });
                }
            }
            other => return Err(ExpressionError::UnexpectedChar { ch: other, pos }),
        }
    }

    Ok(tokens)
}

fn push_single(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    tokens: &mut Vec<Token>,
    token: Token,
) {
    chars.next();
    tokens.push(token);
}

fn scan_number(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    start: usize,
    input: &str,
) -> Result<Token, ExpressionError> {
    let mut end = start;
    let mut seen_dot = false;
    while let Some(&(pos, c)) = chars.peek() {
        if c.is_ascii_digit() || (c == '.' && !seen_dot) {
            seen_dot |= c == '.';
            end = pos + c.len_utf8();
            chars.next();
        } else {
            break;
        }
    }
    let text = &input[start..end];
    text.parse::<f64>()
        .map(Token::Number)
        .map_err(|_| ExpressionError::UnexpectedChar {
            ch: '.',
            pos: start,
        })
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<Token, ExpressionError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(ExpressionError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(token)
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Eq) => BinaryOp::Eq,
                Some(Token::Ne) => BinaryOp::Ne,
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Ge) => BinaryOp::Ge,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_additive()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Subtract,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Multiply,
                Some(Token::Slash) => BinaryOp::Divide,
                Some(Token::Percent) => BinaryOp::Modulo,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ExpressionError> {
        if self.eat(&Token::Minus) {
            return Ok(Expr::Neg(Box::new(self.parse_unary()?)));
        }
        if self.eat(&Token::Plus) {
            return self.parse_unary();
        }
        self.parse_power()
    }

    // Exponentiation binds tighter than unary minus on its left and is
    // right-associative, so -2**2 is -4 and 2**3**2 is 512.
    fn parse_power(&mut self) -> Result<Expr, ExpressionError> {
        let base = self.parse_primary()?;
        if self.eat(&Token::Power) {
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary {
                left: Box::new(base),
                op: BinaryOp::Power,
                right: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExpressionError> {
        match self.next()? {
            Token::Number(v) => Ok(Expr::Number(v)),
            Token::LParen => {
                let inner = self.parse_comparison()?;
                if self.eat(&Token::RParen) {
                    Ok(inner)
                } else {
                    Err(self.unexpected())
                }
            }
            Token::Ident(name) => {
                if self.eat(&Token::LParen) {
                    self.parse_call(&name)
                } else {
                    Ok(Expr::Column(name))
                }
            }
            other => Err(ExpressionError::UnexpectedToken {
                token: other.to_string(),
            }),
        }
    }

    fn parse_call(&mut self, name: &str) -> Result<Expr, ExpressionError> {
        let function =
            Function::from_name(name).ok_or_else(|| ExpressionError::UnknownFunction {
                name: name.to_string(),
            })?;

        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.parse_comparison()?);
                if self.eat(&Token::Comma) {
                    continue;
                }
                if self.eat(&Token::RParen) {
                    break;
                }
                return Err(self.unexpected());
            }
        }

        if args.len() != function.arity() {
            return Err(ExpressionError::WrongArity {
                name: name.to_string(),
                expected: function.arity(),
                got: args.len(),
            });
        }

        Ok(Expr::Call { function, args })
    }

    fn unexpected(&self) -> ExpressionError {
        match self.peek() {
            Some(token) => ExpressionError::UnexpectedToken {
                token: token.to_string(),
            },
            None => ExpressionError::UnexpectedEnd,
        }
    }
}
