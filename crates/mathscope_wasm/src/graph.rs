//! 2D graphing wrapper: sampling, roots, tangents and derivative text.

use crate::shared::{angle_mode_name, load_settings, parse_angle_mode, to_js, to_js_error};
use mathscope_core::equation_engine::{AngleMode, Bindings, Expression};
use mathscope_core::error::EngineResult;
use mathscope_core::roots::find_roots_with_tolerance;
use mathscope_core::sampling::{sample_expression, Domain, PointSequence};
use mathscope_core::settings::EngineSettings;
use mathscope_core::tangent::{tangent_for, Tangent};
use wasm_bindgen::prelude::*;

/// One plotted curve `y = f(x)` with its viewing domain and parameter values.
#[wasm_bindgen]
pub struct WasmGraph {
    expression: Expression,
    domain: Domain,
    bindings: Bindings,
    mode: AngleMode,
    settings: EngineSettings,
}

#[wasm_bindgen]
impl WasmGraph {
    #[wasm_bindgen(constructor)]
    pub fn new(
        expression: &str,
        angle_mode: &str,
        settings_json: Option<String>,
    ) -> Result<WasmGraph, JsValue> {
        console_error_panic_hook::set_once();

        let settings = load_settings(settings_json)?;
        let mode = parse_angle_mode(angle_mode, settings.angle_mode)?;
        let expression =
            Expression::parse(expression).map_err(|err| to_js_error("expression", err))?;

        Ok(WasmGraph {
            expression,
            domain: settings.clamp_curve_domain(settings.curve_domain),
            bindings: Bindings::new(),
            mode,
            settings,
        })
    }

    /// Replaces the plotted expression. On a parse error the previous one is kept.
    pub fn set_expression(&mut self, expression: &str) -> Result<(), JsValue> {
        self.expression =
            Expression::parse(expression).map_err(|err| to_js_error("expression", err))?;
        Ok(())
    }

    pub fn expression(&self) -> String {
        self.expression.source().to_string()
    }

    /// Free variables of the expression, sorted.
    pub fn variables(&self) -> Vec<String> {
        self.expression.variables()
    }

    pub fn set_domain(&mut self, min: f64, max: f64, steps: u32) -> Result<(), JsValue> {
        let domain =
            Domain::new(min, max, steps as usize).map_err(|err| to_js_error("domain", err))?;
        self.domain = self.settings.clamp_curve_domain(domain);
        Ok(())
    }

    pub fn domain_min(&self) -> f64 {
        self.domain.min
    }

    pub fn domain_max(&self) -> f64 {
        self.domain.max
    }

    pub fn domain_steps(&self) -> u32 {
        self.domain.steps as u32
    }

    pub fn set_binding(&mut self, name: &str, value: f64) {
        self.bindings.insert(name.to_string(), value);
    }

    pub fn remove_binding(&mut self, name: &str) {
        self.bindings.remove(name);
    }

    pub fn clear_bindings(&mut self) {
        self.bindings.clear();
    }

    pub fn set_angle_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        self.mode = parse_angle_mode(mode, self.settings.angle_mode)?;
        Ok(())
    }

    pub fn angle_mode(&self) -> String {
        angle_mode_name(self.mode).to_string()
    }

    /// `f(x)` at one point, `undefined` when it has no finite value. An
    /// unbound variable throws.
    pub fn evaluate_at(&self, x: f64) -> Result<Option<f64>, JsValue> {
        let mut bindings = self.bindings.clone();
        bindings.insert("x".to_string(), x);
        self.expression
            .evaluate(&bindings, self.mode)
            .map_err(|err| to_js_error("evaluate", err))
    }

    /// Sampled points as `[{x, y}, ...]`.
    pub fn sample(&self) -> Result<JsValue, JsValue> {
        to_js("curve samples", &self.points())
    }

    /// Sampled points as a flat `[x0, y0, x1, y1, ...]` buffer.
    pub fn sample_flat(&self) -> Vec<f64> {
        self.points().iter().flat_map(|p| [p.x, p.y]).collect()
    }

    /// Ascending zero crossings of the sampled curve.
    pub fn roots(&self) -> Vec<f64> {
        find_roots_with_tolerance(&self.points(), self.settings.root_tolerance)
    }

    /// `{line, info}` for the tangent at `x0`, or `null` when the curve has
    /// no finite value or slope there.
    pub fn tangent(&self, x0: f64) -> Result<JsValue, JsValue> {
        match self.tangent_at(x0).map_err(|err| to_js_error("tangent", err))? {
            Some(tangent) => to_js("tangent", &tangent),
            None => Ok(JsValue::NULL),
        }
    }

    /// Rendered derivative with respect to `x`.
    pub fn derivative(&self) -> Result<String, JsValue> {
        self.expression
            .derivative("x")
            .map(|derivative| derivative.source().to_string())
            .map_err(|err| to_js_error("derivative", err))
    }
}

impl WasmGraph {
    fn points(&self) -> PointSequence {
        sample_expression(&self.expression, &self.domain, &self.bindings, self.mode)
    }

    pub(crate) fn tangent_at(&self, x0: f64) -> EngineResult<Option<Tangent>> {
        tangent_for(&self.expression, x0, &self.domain, &self.bindings, self.mode)
    }
}
