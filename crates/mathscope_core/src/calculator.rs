use crate::equation_engine::{evaluate, AngleMode, Bindings};
use crate::error::EngineResult;

/// Evaluates a keypad expression with no free variables.
///
/// `Ok(None)` means the expression has no finite value (`1/0`, `sqrt(-1)`).
pub fn evaluate_expression(text: &str, mode: AngleMode) -> EngineResult<Option<f64>> {
    evaluate(text, &Bindings::new(), mode)
}

#[cfg(test)]
mod tests {
    use super::evaluate_expression;
    use crate::equation_engine::AngleMode;
    use crate::error::EngineError;

    #[test]
    fn keypad_expressions() {
        let eval = |text| evaluate_expression(text, AngleMode::Radians).expect("valid");
        assert_eq!(eval("2 + 3 * 4"), Some(14.0));
        assert_eq!(eval("7 % 3"), Some(1.0));
        assert_eq!(eval("-7 % 3"), Some(2.0));
        assert_eq!(eval("2π"), Some(2.0 * std::f64::consts::PI));
        assert_eq!(eval("sqrt(16) + log(100)"), Some(6.0));
        assert_eq!(eval("1 / 0"), None);
    }

    #[test]
    fn degree_keypad() {
        let value = evaluate_expression("sin(30)", AngleMode::Degrees)
            .expect("valid")
            .expect("finite");
        assert!((value - 0.5).abs() < 1e-12);
    }

    #[test]
    fn variables_are_not_allowed() {
        let err = evaluate_expression("x + 1", AngleMode::Radians).expect_err("unbound");
        assert!(matches!(err, EngineError::Evaluation(_)));
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        let err = evaluate_expression("3 +* 4", AngleMode::Radians).expect_err("malformed");
        assert!(matches!(err, EngineError::Parse(_)));
    }
}
