//! 3D surface wrapper exposing mesh buffers as typed arrays.

use crate::shared::{load_settings, parse_angle_mode, to_js_error};
use js_sys::{Float64Array, Uint32Array};
use mathscope_core::equation_engine::{Bindings, Expression};
use mathscope_core::sampling::Domain;
use mathscope_core::surface::{build_surface_for, SurfaceMesh};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmSurface {
    mesh: SurfaceMesh,
}

#[wasm_bindgen]
impl WasmSurface {
    /// Meshes `z = f(x, y)` over `[min, max]²`. `steps` is capped by the
    /// settings' surface limit.
    #[wasm_bindgen(constructor)]
    pub fn new(
        expression: &str,
        min: f64,
        max: f64,
        steps: u32,
        angle_mode: &str,
        settings_json: Option<String>,
    ) -> Result<WasmSurface, JsValue> {
        console_error_panic_hook::set_once();

        let settings = load_settings(settings_json)?;
        let mode = parse_angle_mode(angle_mode, settings.angle_mode)?;
        let expression =
            Expression::parse(expression).map_err(|err| to_js_error("surface expression", err))?;
        let domain = Domain::new(min, max, steps as usize)
            .map_err(|err| to_js_error("surface domain", err))?;
        let domain = settings.clamp_surface_domain(domain);

        let mesh = build_surface_for(&expression, &domain, &Bindings::new(), mode);
        Ok(WasmSurface { mesh })
    }

    pub fn steps(&self) -> u32 {
        self.mesh.steps as u32
    }

    pub fn vertex_count(&self) -> u32 {
        self.mesh.vertex_count() as u32
    }

    pub fn triangle_count(&self) -> u32 {
        self.mesh.triangle_count() as u32
    }

    /// Vertices whose height could not be evaluated and were drawn at zero.
    pub fn substituted_vertices(&self) -> u32 {
        self.mesh.substituted_vertices as u32
    }

    pub fn vertices(&self) -> Float64Array {
        Float64Array::from(self.mesh.vertices.as_slice())
    }

    pub fn indices(&self) -> Uint32Array {
        Uint32Array::from(self.mesh.indices.as_slice())
    }

    pub fn normals(&self) -> Float64Array {
        Float64Array::from(self.mesh.normals.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::WasmSurface;

    #[test]
    fn ten_steps_builds_full_grid() {
        let surface = WasmSurface::new("x^2 + y^2", -5.0, 5.0, 10, "radians", None)
            .expect("surface should build");
        assert_eq!(surface.steps(), 10);
        assert_eq!(surface.vertex_count(), 121);
        assert_eq!(surface.triangle_count(), 200);
        assert_eq!(surface.substituted_vertices(), 0);
    }

    #[test]
    fn steps_are_capped_by_settings() {
        let settings = r#"{"maxSurfaceSteps": 20}"#.to_string();
        let surface = WasmSurface::new("x * y", -1.0, 1.0, 500, "", Some(settings))
            .expect("surface should build");
        assert_eq!(surface.steps(), 20);
        assert_eq!(surface.vertex_count(), 441);
    }

    #[test]
    fn undefined_heights_are_reported() {
        let surface = WasmSurface::new("ln(x)", -1.0, 1.0, 2, "radians", None)
            .expect("surface should build");
        // x = -1 and x = 0 rows have no finite logarithm.
        assert_eq!(surface.substituted_vertices(), 6);
    }

    #[test]
    #[cfg(target_arch = "wasm32")]
    fn buffers_have_mesh_lengths() {
        let surface = WasmSurface::new("sin(x) * cos(y)", -3.0, 3.0, 8, "radians", None)
            .expect("surface should build");
        assert_eq!(surface.vertices().length(), 81 * 3);
        assert_eq!(surface.normals().length(), 81 * 3);
        assert_eq!(surface.indices().length(), 8 * 8 * 6);
    }

    #[test]
    #[cfg(target_arch = "wasm32")]
    fn rejects_inverted_domain() {
        assert!(WasmSurface::new("x", 1.0, -1.0, 10, "radians", None).is_err());
    }
}
