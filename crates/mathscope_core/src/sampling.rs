use crate::equation_engine::{AngleMode, Bindings, Expression};
use crate::error::{EngineError, EngineResult};
use crate::traits::{CurveFunction, ExpressionFunction};
use serde::{Deserialize, Serialize};

/// Sampling range and resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
    pub steps: usize,
}

impl Domain {
    pub const MIN_STEPS: usize = 2;

    /// Validates the bounds; `steps` below two is raised to two.
    pub fn new(min: f64, max: f64, steps: usize) -> EngineResult<Self> {
        let domain = Self {
            min,
            max,
            steps: steps.max(Self::MIN_STEPS),
        };
        domain.validate()?;
        Ok(domain)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(EngineError::InvalidDomain(
                "Domain bounds must be finite.".to_string(),
            ));
        }
        if self.min >= self.max {
            return Err(EngineError::InvalidDomain(format!(
                "Domain requires min < max (got min = {}, max = {}).",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Steps as used for sampling, never below two.
    pub fn step_count(&self) -> usize {
        self.steps.max(Self::MIN_STEPS)
    }

    /// Spacing between consecutive sampler x-values.
    pub fn spacing(&self) -> f64 {
        (self.max - self.min) / (self.step_count() - 1) as f64
    }

    /// `step_count()` evenly spaced values over `[min, max]`, both ends
    /// included.
    pub fn x_values(&self) -> impl Iterator<Item = f64> + '_ {
        let count = self.step_count();
        let spacing = self.spacing();
        (0..count).map(move |i| {
            if i + 1 == count {
                self.max
            } else {
                self.min + spacing * i as f64
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Ascending in x; points whose evaluation failed are absent.
pub type PointSequence = Vec<Point2D>;

/// Walks `domain`, keeping only the points where `function` produced a
/// finite value.
pub fn sample_function<F: CurveFunction + ?Sized>(function: &F, domain: &Domain) -> PointSequence {
    domain
        .x_values()
        .filter_map(|x| match function.value_at(x) {
            Ok(Some(y)) => Some(Point2D::new(x, y)),
            Ok(None) | Err(_) => None,
        })
        .collect()
}

/// Samples an already compiled expression with `x` bound over `template`.
pub fn sample_expression(
    expression: &Expression,
    domain: &Domain,
    template: &Bindings,
    mode: AngleMode,
) -> PointSequence {
    let function = ExpressionFunction::new(expression, template, mode);
    sample_function(&function, domain)
}

/// Parses `expr` and samples it. Only a parse failure fails the call; points
/// that cannot be evaluated are dropped from the sequence.
pub fn sample(
    expr: &str,
    domain: &Domain,
    template: &Bindings,
    mode: AngleMode,
) -> EngineResult<PointSequence> {
    let expression = Expression::parse(expr)?;
    Ok(sample_expression(&expression, domain, template, mode))
}
