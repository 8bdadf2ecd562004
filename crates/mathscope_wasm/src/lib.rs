//! WASM bindings for the MathScope engine.
//!
//! Each view gets one wrapper: `WasmGraph` for 2D curves, `WasmSurface` for 3D
//! meshes and `WasmStatistics` for chart data, plus free functions for the
//! calculator and prime sieve. Failed requests are logged to the browser
//! console and returned to JS as string errors.

mod calculator;
mod graph;
mod shared;
mod statistics;
mod surface;

pub use calculator::{evaluate_expression, primes_up_to};
pub use graph::WasmGraph;
pub use statistics::WasmStatistics;
pub use surface::WasmSurface;
