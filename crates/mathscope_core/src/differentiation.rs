//! Symbolic differentiation over the evaluator's AST.
//!
//! The transform is purely structural: it never evaluates anything, and the
//! result is an ordinary [`Expression`] that the evaluator handles like user
//! input (angle mode included). Trivial identities are folded while the
//! derivative is built so that `d/dx x^2` renders as `2 * x` rather than a
//! tree of ones and zeros.

use crate::equation_engine::{BinaryOp, Constant, Expr, Expression, Function};
use crate::error::{EngineError, EngineResult};

/// Parses `expr` and differentiates it with respect to `variable`.
pub fn derive(expr: &str, variable: &str) -> EngineResult<Expression> {
    Expression::parse(expr)?.derivative(variable)
}

impl Expression {
    pub fn derivative(&self, variable: &str) -> EngineResult<Expression> {
        ensure_differentiable(self.root())?;
        let root = derive_expr(self.root(), variable)?;
        Ok(Expression::from_expr(root))
    }
}

fn ensure_differentiable(expr: &Expr) -> EngineResult<()> {
    match expr {
        Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) => Ok(()),
        Expr::Neg(inner) | Expr::Call(_, inner) => ensure_differentiable(inner),
        Expr::Binary(_, BinaryOp::Rem, _) => Err(EngineError::Differentiation(
            "Operator '%' cannot be differentiated".to_string(),
        )),
        Expr::Binary(left, _, right) => {
            ensure_differentiable(left)?;
            ensure_differentiable(right)
        }
    }
}

fn derive_expr(expr: &Expr, var: &str) -> EngineResult<Expr> {
    let derived = match expr {
        Expr::Number(_) | Expr::Constant(_) => number(0.0),
        Expr::Variable(name) => number(if name == var { 1.0 } else { 0.0 }),
        Expr::Neg(inner) => neg(derive_expr(inner, var)?),
        Expr::Binary(u, op, v) => derive_binary(u, *op, v, var)?,
        Expr::Call(func, arg) => {
            let inner_prime = derive_expr(arg, var)?;
            let outer = function_derivative(*func, arg.as_ref().clone());
            mul(outer, inner_prime)
        }
    };
    Ok(derived)
}

fn derive_binary(u: &Expr, op: BinaryOp, v: &Expr, var: &str) -> EngineResult<Expr> {
    let derived = match op {
        BinaryOp::Add => add(derive_expr(u, var)?, derive_expr(v, var)?),
        BinaryOp::Sub => sub(derive_expr(u, var)?, derive_expr(v, var)?),
        BinaryOp::Mul => {
            // (uv)' = u'v + uv'
            let du = derive_expr(u, var)?;
            let dv = derive_expr(v, var)?;
            add(mul(du, v.clone()), mul(u.clone(), dv))
        }
        BinaryOp::Div => {
            let du = derive_expr(u, var)?;
            if !v.contains_variable(var) {
                div(du, v.clone())
            } else {
                // (u/v)' = (u'v - uv') / v^2
                let dv = derive_expr(v, var)?;
                div(
                    sub(mul(du, v.clone()), mul(u.clone(), dv)),
                    pow(v.clone(), number(2.0)),
                )
            }
        }
        BinaryOp::Pow => derive_power(u, v, var)?,
        BinaryOp::Rem => {
            return Err(EngineError::Differentiation(
                "Operator '%' cannot be differentiated".to_string(),
            ))
        }
    };
    Ok(derived)
}

fn derive_power(base: &Expr, exponent: &Expr, var: &str) -> EngineResult<Expr> {
    let base_varies = base.contains_variable(var);
    let exponent_varies = exponent.contains_variable(var);

    let derived = match (base_varies, exponent_varies) {
        (false, false) => number(0.0),
        // Power rule: (u^n)' = n * u^(n-1) * u'
        (true, false) => {
            let du = derive_expr(base, var)?;
            let lowered = sub(exponent.clone(), number(1.0));
            mul(mul(exponent.clone(), pow(base.clone(), lowered)), du)
        }
        // Exponential: (a^v)' = a^v * ln(a) * v'
        (false, true) => {
            let dv = derive_expr(exponent, var)?;
            let power = pow(base.clone(), exponent.clone());
            match base {
                Expr::Constant(Constant::E) => mul(power, dv),
                _ => mul(mul(power, call(Function::Ln, base.clone())), dv),
            }
        }
        // General case: (u^v)' = u^v * (v' ln(u) + v u' / u)
        (true, true) => {
            let du = derive_expr(base, var)?;
            let dv = derive_expr(exponent, var)?;
            let power = pow(base.clone(), exponent.clone());
            let log_term = mul(dv, call(Function::Ln, base.clone()));
            let ratio_term = div(mul(exponent.clone(), du), base.clone());
            mul(power, add(log_term, ratio_term))
        }
    };
    Ok(derived)
}

/// Outer derivative `f'(u)` for the chain rule.
fn function_derivative(func: Function, u: Expr) -> Expr {
    match func {
        Function::Sin => call(Function::Cos, u),
        Function::Cos => neg(call(Function::Sin, u)),
        Function::Tan => div(number(1.0), pow(call(Function::Cos, u), number(2.0))),
        Function::Asin => div(number(1.0), call(Function::Sqrt, one_minus_square(u))),
        Function::Acos => neg(div(
            number(1.0),
            call(Function::Sqrt, one_minus_square(u)),
        )),
        Function::Atan => div(number(1.0), add(number(1.0), pow(u, number(2.0)))),
        Function::Ln => div(number(1.0), u),
        Function::Log => div(
            number(1.0),
            mul(u, call(Function::Ln, number(10.0))),
        ),
        Function::Sqrt => div(number(1.0), mul(number(2.0), call(Function::Sqrt, u))),
    }
}

fn one_minus_square(u: Expr) -> Expr {
    sub(number(1.0), pow(u, number(2.0)))
}

// --- Folding constructors ---

fn number(value: f64) -> Expr {
    Expr::Number(value)
}

fn as_number(expr: &Expr) -> Option<f64> {
    match expr {
        Expr::Number(n) => Some(*n),
        _ => None,
    }
}

fn is_number(expr: &Expr, value: f64) -> bool {
    as_number(expr) == Some(value)
}

/// Folds two literals when the result stays finite.
fn fold(a: &Expr, b: &Expr, op: fn(f64, f64) -> f64) -> Option<Expr> {
    let value = op(as_number(a)?, as_number(b)?);
    value.is_finite().then_some(Expr::Number(value))
}

fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr::Binary(Box::new(left), op, Box::new(right))
}

fn call(func: Function, arg: Expr) -> Expr {
    Expr::Call(func, Box::new(arg))
}

fn neg(expr: Expr) -> Expr {
    match expr {
        Expr::Number(n) => Expr::Number(-n),
        Expr::Neg(inner) => *inner,
        other => Expr::Neg(Box::new(other)),
    }
}

fn add(a: Expr, b: Expr) -> Expr {
    if is_number(&a, 0.0) {
        return b;
    }
    if is_number(&b, 0.0) {
        return a;
    }
    fold(&a, &b, |x, y| x + y).unwrap_or_else(|| binary(a, BinaryOp::Add, b))
}

fn sub(a: Expr, b: Expr) -> Expr {
    if is_number(&b, 0.0) {
        return a;
    }
    if is_number(&a, 0.0) {
        return neg(b);
    }
    fold(&a, &b, |x, y| x - y).unwrap_or_else(|| binary(a, BinaryOp::Sub, b))
}

fn mul(a: Expr, b: Expr) -> Expr {
    if is_number(&a, 0.0) || is_number(&b, 0.0) {
        return number(0.0);
    }
    if is_number(&a, 1.0) {
        return b;
    }
    if is_number(&b, 1.0) {
        return a;
    }
    if is_number(&a, -1.0) {
        return neg(b);
    }
    if is_number(&b, -1.0) {
        return neg(a);
    }
    fold(&a, &b, |x, y| x * y).unwrap_or_else(|| binary(a, BinaryOp::Mul, b))
}

fn div(a: Expr, b: Expr) -> Expr {
    if is_number(&a, 0.0) {
        return number(0.0);
    }
    if is_number(&b, 1.0) {
        return a;
    }
    fold(&a, &b, |x, y| x / y).unwrap_or_else(|| binary(a, BinaryOp::Div, b))
}

fn pow(base: Expr, exponent: Expr) -> Expr {
    if is_number(&exponent, 0.0) {
        return number(1.0);
    }
    if is_number(&exponent, 1.0) {
        return base;
    }
    fold(&base, &exponent, f64::powf).unwrap_or_else(|| binary(base, BinaryOp::Pow, exponent))
}
