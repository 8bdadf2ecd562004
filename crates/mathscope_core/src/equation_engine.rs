use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// Variable name to value mapping supplied to every evaluation call.
pub type Bindings = HashMap<String, f64>;

/// Convention for trig inputs and inverse-trig outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleMode {
    Degrees,
    #[default]
    Radians,
}

impl AngleMode {
    /// Converts a forward trig argument to radians.
    pub fn to_radians(self, value: f64) -> f64 {
        match self {
            AngleMode::Degrees => value.to_radians(),
            AngleMode::Radians => value,
        }
    }

    /// Converts an inverse trig result (always radians) to this mode.
    pub fn from_radians(self, value: f64) -> f64 {
        match self {
            AngleMode::Degrees => value.to_degrees(),
            AngleMode::Radians => value,
        }
    }
}

impl FromStr for AngleMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deg" | "degrees" => Ok(AngleMode::Degrees),
            "rad" | "radians" => Ok(AngleMode::Radians),
            other => Err(EngineError::InputFormat(format!(
                "Unknown angle mode: {other}"
            ))),
        }
    }
}

/// The closed set of named unary functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    /// Natural logarithm.
    Ln,
    /// Base-10 logarithm.
    Log,
    Sqrt,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        let func = match name {
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "asin" => Function::Asin,
            "acos" => Function::Acos,
            "atan" => Function::Atan,
            "ln" => Function::Ln,
            "log" => Function::Log,
            "sqrt" => Function::Sqrt,
            _ => return None,
        };
        Some(func)
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Asin => "asin",
            Function::Acos => "acos",
            Function::Atan => "atan",
            Function::Ln => "ln",
            Function::Log => "log",
            Function::Sqrt => "sqrt",
        }
    }

    pub fn apply(self, arg: f64, mode: AngleMode) -> f64 {
        match self {
            Function::Sin => mode.to_radians(arg).sin(),
            Function::Cos => mode.to_radians(arg).cos(),
            Function::Tan => mode.to_radians(arg).tan(),
            Function::Asin => mode.from_radians(arg.asin()),
            Function::Acos => mode.from_radians(arg.acos()),
            Function::Atan => mode.from_radians(arg.atan()),
            Function::Ln => arg.ln(),
            Function::Log => arg.log10(),
            Function::Sqrt => arg.sqrt(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "π" | "pi" => Some(Constant::Pi),
            "e" => Some(Constant::E),
            _ => None,
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    /// Floored modulo, `a - b * floor(a / b)`.
    Rem,
}

impl BinaryOp {
    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
            BinaryOp::Pow => '^',
            BinaryOp::Rem => '%',
        }
    }

    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Pow => a.powf(b),
            BinaryOp::Rem => a - b * (a / b).floor(),
        }
    }
}

/// Abstract Syntax Tree nodes for expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Constant(Constant),
    Variable(String),
    Neg(Box<Expr>),
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    Call(Function, Box<Expr>),
}

impl Expr {
    pub fn contains_variable(&self, name: &str) -> bool {
        match self {
            Expr::Number(_) | Expr::Constant(_) => false,
            Expr::Variable(var) => var == name,
            Expr::Neg(inner) | Expr::Call(_, inner) => inner.contains_variable(name),
            Expr::Binary(left, _, right) => {
                left.contains_variable(name) || right.contains_variable(name)
            }
        }
    }

    fn collect_variables<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Expr::Number(_) | Expr::Constant(_) => {}
            Expr::Variable(var) => {
                out.insert(var.as_str());
            }
            Expr::Neg(inner) | Expr::Call(_, inner) => inner.collect_variables(out),
            Expr::Binary(left, _, right) => {
                left.collect_variables(out);
                right.collect_variables(out);
            }
        }
    }

    /// Walks the tree. Non-finite intermediates propagate; only missing
    /// bindings are errors.
    pub fn eval(&self, bindings: &Bindings, mode: AngleMode) -> EngineResult<f64> {
        match self {
            Expr::Number(n) => Ok(*n),
            Expr::Constant(c) => Ok(c.value()),
            Expr::Variable(name) => bindings
                .get(name)
                .copied()
                .ok_or_else(|| EngineError::Evaluation(format!("Unknown variable: {name}"))),
            Expr::Neg(inner) => Ok(-inner.eval(bindings, mode)?),
            Expr::Binary(left, op, right) => {
                let a = left.eval(bindings, mode)?;
                let b = right.eval(bindings, mode)?;
                Ok(op.apply(a, b))
            }
            Expr::Call(func, arg) => Ok(func.apply(arg.eval(bindings, mode)?, mode)),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary(_, BinaryOp::Add | BinaryOp::Sub, _) => 1,
            Expr::Binary(_, BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem, _) => 2,
            Expr::Neg(_) => 3,
            Expr::Number(n) if n.is_sign_negative() && *n != 0.0 => 3,
            Expr::Binary(_, BinaryOp::Pow, _) => 4,
            _ => 5,
        }
    }

    fn fmt_child(&self, f: &mut fmt::Formatter<'_>, min_precedence: u8) -> fmt::Result {
        if self.precedence() < min_precedence {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{n}"),
            Expr::Constant(Constant::Pi) => write!(f, "π"),
            Expr::Constant(Constant::E) => write!(f, "e"),
            Expr::Variable(name) => write!(f, "{name}"),
            Expr::Neg(inner) => {
                write!(f, "-")?;
                inner.fmt_child(f, 4)
            }
            Expr::Binary(left, op, right) => {
                let (left_min, right_min) = match op {
                    BinaryOp::Add | BinaryOp::Sub => (1, 2),
                    BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => (2, 3),
                    BinaryOp::Pow => (5, 3),
                };
                left.fmt_child(f, left_min)?;
                if *op == BinaryOp::Pow {
                    write!(f, "^")?;
                } else {
                    write!(f, " {} ", op.symbol())?;
                }
                right.fmt_child(f, right_min)
            }
            Expr::Call(func, arg) => write!(f, "{}({arg})", func.name()),
        }
    }
}

/// A parsed formula together with the text it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Expr,
}

impl Expression {
    pub fn parse(source: &str) -> EngineResult<Self> {
        let root = parse(source)?;
        Ok(Self {
            source: source.trim().to_string(),
            root,
        })
    }

    /// Wraps a tree built elsewhere (e.g. a derivative); the source text is
    /// the rendered tree.
    pub fn from_expr(root: Expr) -> Self {
        Self {
            source: root.to_string(),
            root,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Expr {
        &self.root
    }

    /// Free variables in lexical order.
    pub fn variables(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        self.root.collect_variables(&mut names);
        names.into_iter().map(str::to_string).collect()
    }

    /// Returns `Ok(None)` when the result is `NaN` or infinite.
    pub fn evaluate(&self, bindings: &Bindings, mode: AngleMode) -> EngineResult<Option<f64>> {
        let value = self.root.eval(bindings, mode)?;
        Ok(value.is_finite().then_some(value))
    }
}

impl FromStr for Expression {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expression::parse(s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

/// Parses and evaluates in one call.
pub fn evaluate(expr: &str, bindings: &Bindings, mode: AngleMode) -> EngineResult<Option<f64>> {
    Expression::parse(expr)?.evaluate(bindings, mode)
}

// --- Tokenizer ---

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
}

impl Token {
    /// Tokens that may follow an operand as an implicit factor. A number
    /// never does: `2 3` is malformed, not `6`.
    fn continues_product(&self) -> bool {
        matches!(self, Token::Identifier(_) | Token::LParen)
    }

    fn describe(&self) -> String {
        match self {
            Token::Number(n) => n.to_string(),
            Token::Identifier(name) => name.clone(),
            Token::Plus => "+".into(),
            Token::Minus => "-".into(),
            Token::Star => "*".into(),
            Token::Slash => "/".into(),
            Token::Percent => "%".into(),
            Token::Caret => "^".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
        }
    }
}

/// Token plus its character offset in the input.
type Spanned = (Token, usize);

fn tokenize(input: &str) -> EngineResult<Vec<Spanned>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_digit() || c == '.' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let digit_at = |k: usize| chars.get(k).is_some_and(|d| d.is_ascii_digit());
                if digit_at(i + 1) {
                    i += 1;
                } else if matches!(chars.get(i + 1), Some('+') | Some('-')) && digit_at(i + 2) {
                    i += 2;
                }
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
            let text: String = chars[start..i].iter().collect();
            let value = text
                .parse::<f64>()
                .map_err(|_| EngineError::parse_at(format!("Invalid number '{text}'"), start))?;
            tokens.push((Token::Number(value), start));
        } else if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let ident: String = chars[start..i].iter().collect();
            tokens.push((Token::Identifier(ident), start));
        } else {
            let token = match c {
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' => Token::Star,
                '/' => Token::Slash,
                '%' => Token::Percent,
                '^' => Token::Caret,
                '(' => Token::LParen,
                ')' => Token::RParen,
                other => {
                    return Err(EngineError::parse_at(format!("Unknown token '{other}'"), i));
                }
            };
            tokens.push((token, i));
            i += 1;
        }
    }
    Ok(tokens)
}

// --- Parser ---

/// Limit on parenthesis/call/sign nesting and on the height of the tree.
///
/// Evaluation, rendering and differentiation all recurse over the tree, so
/// this bounds their stack use as well as the parser's.
pub const MAX_DEPTH: usize = 200;

/// Parses a string expression into an AST.
///
/// Precedence, loosest first: `+ -`, then `* / %` and implicit
/// multiplication, then unary sign, then right-associative `^`.
pub fn parse(input: &str) -> EngineResult<Expr> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(EngineError::Parse("Empty expression".to_string()));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: input.chars().count(),
        depth: 0,
    };
    let (expr, _) = parser.parse_sum()?;
    if let Some((token, at)) = parser.peek() {
        let message = if *token == Token::RParen {
            "Unbalanced parentheses: unexpected ')'".to_string()
        } else {
            format!("Unexpected token '{}'", token.describe())
        };
        return Err(EngineError::parse_at(message, *at));
    }
    Ok(expr)
}

/// A subtree and its height.
type Parsed = (Expr, usize);

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<Spanned> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn position(&self) -> usize {
        self.peek().map_or(self.end, |(_, at)| *at)
    }

    fn descend(&mut self, at: usize) -> EngineResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EngineError::parse_at("Expression nested too deeply", at));
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    fn expect_rparen(&mut self) -> EngineResult<()> {
        match self.consume() {
            Some((Token::RParen, _)) => Ok(()),
            Some((token, at)) => Err(EngineError::parse_at(
                format!("Expected ')' but found '{}'", token.describe()),
                at,
            )),
            None => Err(EngineError::parse_at(
                "Unbalanced parentheses: expected ')'",
                self.end,
            )),
        }
    }

    fn parse_sum(&mut self) -> EngineResult<Parsed> {
        let mut left = self.parse_product()?;

        loop {
            let (op, at) = match self.peek() {
                Some((Token::Plus, at)) => (BinaryOp::Add, *at),
                Some((Token::Minus, at)) => (BinaryOp::Sub, *at),
                _ => break,
            };
            self.consume();
            let right = self.parse_product()?;
            left = binary(left, op, right, at)?;
        }
        Ok(left)
    }

    fn parse_product(&mut self) -> EngineResult<Parsed> {
        let mut left = self.parse_unary()?;

        loop {
            let (explicit, at) = match self.peek() {
                Some((Token::Star, at)) => (Some(BinaryOp::Mul), *at),
                Some((Token::Slash, at)) => (Some(BinaryOp::Div), *at),
                Some((Token::Percent, at)) => (Some(BinaryOp::Rem), *at),
                Some((token, at)) if token.continues_product() => (None, *at),
                _ => break,
            };
            let right = match explicit {
                Some(_) => {
                    self.consume();
                    self.parse_unary()?
                }
                // Implicit multiplication: `2x`, `3(x + 1)`, `(x - 1)(x + 1)`.
                None => self.parse_power()?,
            };
            let op = explicit.unwrap_or(BinaryOp::Mul);
            left = binary(left, op, right, at)?;
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> EngineResult<Parsed> {
        let (sign, at) = match self.peek() {
            Some((Token::Minus, at)) => (Token::Minus, *at),
            Some((Token::Plus, at)) => (Token::Plus, *at),
            _ => return self.parse_power(),
        };
        self.consume();
        self.descend(at)?;
        let (operand, height) = self.parse_unary()?;
        self.ascend();
        if sign == Token::Plus {
            return Ok((operand, height));
        }
        checked((Expr::Neg(Box::new(operand)), height + 1), at)
    }

    fn parse_power(&mut self) -> EngineResult<Parsed> {
        let base = self.parse_primary()?;
        let at = match self.peek() {
            Some((Token::Caret, at)) => *at,
            _ => return Ok(base),
        };
        self.consume();
        self.descend(at)?;
        let exponent = self.parse_unary()?;
        self.ascend();
        binary(base, BinaryOp::Pow, exponent, at)
    }

    fn parse_primary(&mut self) -> EngineResult<Parsed> {
        let at = self.position();
        match self.consume() {
            Some((Token::Number(n), _)) => Ok((Expr::Number(n), 1)),
            Some((Token::Identifier(name), _)) => {
                let call_follows = matches!(self.peek(), Some((Token::LParen, _)));
                if let Some(func) = Function::from_name(&name) {
                    if !call_follows {
                        return Err(EngineError::parse_at(
                            format!("Function '{name}' requires parentheses"),
                            at,
                        ));
                    }
                    self.consume();
                    self.descend(at)?;
                    let (arg, height) = self.parse_sum()?;
                    self.expect_rparen()?;
                    self.ascend();
                    return checked((Expr::Call(func, Box::new(arg)), height + 1), at);
                }
                if let Some(constant) = Constant::from_name(&name) {
                    return Ok((Expr::Constant(constant), 1));
                }
                if call_follows {
                    return Err(EngineError::parse_at(format!("Unknown function: {name}"), at));
                }
                Ok((Expr::Variable(name), 1))
            }
            Some((Token::LParen, _)) => {
                self.descend(at)?;
                let inner = self.parse_sum()?;
                self.expect_rparen()?;
                self.ascend();
                Ok(inner)
            }
            Some((Token::RParen, _)) => Err(EngineError::parse_at(
                "Unbalanced parentheses: unexpected ')'",
                at,
            )),
            Some((token, _)) => Err(EngineError::parse_at(
                format!("Unexpected token '{}'", token.describe()),
                at,
            )),
            None => Err(EngineError::parse_at(
                "Unexpected end of expression",
                self.end,
            )),
        }
    }
}

fn binary(left: Parsed, op: BinaryOp, right: Parsed, at: usize) -> EngineResult<Parsed> {
    let height = left.1.max(right.1) + 1;
    checked(
        (Expr::Binary(Box::new(left.0), op, Box::new(right.0)), height),
        at,
    )
}

fn checked(parsed: Parsed, at: usize) -> EngineResult<Parsed> {
    if parsed.1 > MAX_DEPTH {
        return Err(EngineError::parse_at("Expression nested too deeply", at));
    }
    Ok(parsed)
}
