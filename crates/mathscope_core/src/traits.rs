use crate::equation_engine::{AngleMode, Bindings, Expression};
use crate::error::EngineResult;
use std::cell::RefCell;

/// A real function of one variable that the sampler can walk.
///
/// Each call reports its own outcome: `Ok(Some(y))` for a finite value,
/// `Ok(None)` for "no value" and `Err` for a failed evaluation. The sampler
/// keeps only the first kind.
pub trait CurveFunction {
    fn value_at(&self, x: f64) -> EngineResult<Option<f64>>;
}

/// A height field `z = f(x, y)` that the surface mesher can walk.
pub trait SurfaceFunction {
    fn height_at(&self, x: f64, y: f64) -> EngineResult<Option<f64>>;
}

/// Binds `x` (and `y` for surfaces) on top of a fixed template and evaluates
/// an [`Expression`] under an explicit angle mode.
pub struct ExpressionFunction<'a> {
    expression: &'a Expression,
    mode: AngleMode,
    // Interior mutability for the binding map to avoid a clone per sample.
    // This makes the adapter !Sync; build one per request.
    scratch: RefCell<Bindings>,
}

impl<'a> ExpressionFunction<'a> {
    pub fn new(expression: &'a Expression, template: &Bindings, mode: AngleMode) -> Self {
        Self {
            expression,
            mode,
            scratch: RefCell::new(template.clone()),
        }
    }

    pub fn mode(&self) -> AngleMode {
        self.mode
    }
}

impl CurveFunction for ExpressionFunction<'_> {
    fn value_at(&self, x: f64) -> EngineResult<Option<f64>> {
        let mut bindings = self.scratch.borrow_mut();
        bindings.insert("x".to_string(), x);
        self.expression.evaluate(&bindings, self.mode)
    }
}

impl SurfaceFunction for ExpressionFunction<'_> {
    fn height_at(&self, x: f64, y: f64) -> EngineResult<Option<f64>> {
        let mut bindings = self.scratch.borrow_mut();
        bindings.insert("x".to_string(), x);
        bindings.insert("y".to_string(), y);
        self.expression.evaluate(&bindings, self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::{CurveFunction, ExpressionFunction, SurfaceFunction};
    use crate::equation_engine::{AngleMode, Bindings, Expression};

    #[test]
    fn curve_binds_x_over_template() {
        let expr = Expression::parse("a * x").expect("parse");
        let template: Bindings = [("a".to_string(), 3.0), ("x".to_string(), 100.0)]
            .into_iter()
            .collect();
        let curve = ExpressionFunction::new(&expr, &template, AngleMode::Radians);
        assert_eq!(curve.value_at(2.0), Ok(Some(6.0)));
        assert_eq!(curve.value_at(-1.0), Ok(Some(-3.0)));
    }

    #[test]
    fn surface_binds_both_coordinates() {
        let expr = Expression::parse("x^2 + y^2").expect("parse");
        let surface = ExpressionFunction::new(&expr, &Bindings::new(), AngleMode::Radians);
        assert_eq!(surface.height_at(3.0, 4.0), Ok(Some(25.0)));
    }

    #[test]
    fn per_point_outcomes_are_explicit() {
        let expr = Expression::parse("sqrt(x) + b").expect("parse");
        let curve = ExpressionFunction::new(&expr, &Bindings::new(), AngleMode::Radians);
        assert!(curve.value_at(4.0).is_err(), "b is unbound");

        let template: Bindings = [("b".to_string(), 1.0)].into_iter().collect();
        let curve = ExpressionFunction::new(&expr, &template, AngleMode::Radians);
        assert_eq!(curve.value_at(-4.0), Ok(None));
        assert_eq!(curve.value_at(4.0), Ok(Some(3.0)));
    }
}
