//! Free functions for the calculator and number theory views.

use crate::shared::{parse_angle_mode, to_js_error};
use mathscope_core::calculator::evaluate_expression as core_evaluate_expression;
use mathscope_core::equation_engine::AngleMode;
use mathscope_core::number_theory::primes_up_to as core_primes_up_to;
use mathscope_core::settings::EngineSettings;
use wasm_bindgen::prelude::*;

/// Value of a keypad expression, `undefined` when it has no finite value.
#[wasm_bindgen]
pub fn evaluate_expression(text: &str, angle_mode: &str) -> Result<Option<f64>, JsValue> {
    let mode = parse_angle_mode(angle_mode, AngleMode::default())?;
    core_evaluate_expression(text, mode).map_err(|err| to_js_error("calculator", err))
}

/// Primes up to `limit`, refusing limits above the configured sieve size.
#[wasm_bindgen]
pub fn primes_up_to(limit: u32) -> Result<Vec<u32>, JsValue> {
    let max = EngineSettings::default().max_prime_limit;
    let limit = limit as usize;
    if limit > max {
        return Err(to_js_error(
            "primes",
            format!("Limit {limit} exceeds the maximum of {max}."),
        ));
    }
    Ok(core_primes_up_to(limit)
        .into_iter()
        .map(|prime| prime as u32)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{evaluate_expression, primes_up_to};

    #[test]
    fn evaluates_keypad_input() {
        assert_eq!(evaluate_expression("2 + 3 * 4", "").expect("valid"), Some(14.0));
        assert_eq!(evaluate_expression("1 / 0", "radians").expect("valid"), None);
        let value = evaluate_expression("cos(60)", "degrees")
            .expect("valid")
            .expect("finite");
        assert!((value - 0.5).abs() < 1e-12);
    }

    #[test]
    fn primes_to_thirty() {
        assert_eq!(
            primes_up_to(30).expect("within limit"),
            vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]
        );
        assert!(primes_up_to(1).expect("within limit").is_empty());
    }

    #[test]
    #[cfg(target_arch = "wasm32")]
    fn rejects_oversized_limits() {
        assert!(primes_up_to(u32::MAX).is_err());
        assert!(evaluate_expression("2 +", "").is_err());
    }
}
