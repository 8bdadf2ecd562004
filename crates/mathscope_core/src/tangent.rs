use crate::equation_engine::{AngleMode, Bindings, Expression};
use crate::error::EngineResult;
use crate::sampling::{Domain, Point2D};
use serde::{Deserialize, Serialize};

/// Touch point and slope, for display next to the line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TangentInfo {
    pub x0: f64,
    pub y0: f64,
    pub slope: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tangent {
    pub line: Vec<Point2D>,
    pub info: TangentInfo,
}

/// Tangent of `expr` at `x0`, drawn across `domain`.
///
/// `Ok(None)` when `x0` is not finite or the function or its derivative has
/// no finite value there. Parse and differentiation failures are errors.
pub fn tangent_at(
    expr: &str,
    x0: f64,
    domain: &Domain,
    mode: AngleMode,
) -> EngineResult<Option<Tangent>> {
    let expression = Expression::parse(expr)?;
    tangent_for(&expression, x0, domain, &Bindings::new(), mode)
}

/// As [`tangent_at`] for a compiled expression whose other variables are
/// bound by `template`.
pub fn tangent_for(
    expression: &Expression,
    x0: f64,
    domain: &Domain,
    template: &Bindings,
    mode: AngleMode,
) -> EngineResult<Option<Tangent>> {
    if !x0.is_finite() {
        return Ok(None);
    }
    let derivative = expression.derivative("x")?;

    let mut bindings = template.clone();
    bindings.insert("x".to_string(), x0);
    let (slope, y0) = match (
        derivative.evaluate(&bindings, mode),
        expression.evaluate(&bindings, mode),
    ) {
        (Ok(Some(slope)), Ok(Some(y0))) => (slope, y0),
        _ => return Ok(None),
    };

    let line = domain
        .x_values()
        .map(|x| Point2D::new(x, slope * (x - x0) + y0))
        .collect();

    Ok(Some(Tangent {
        line,
        info: TangentInfo { x0, y0, slope },
    }))
}
