pub mod calculator;
pub mod datasets;
pub mod differentiation;
pub mod error;
pub mod number_theory;
pub mod roots;
pub mod sampling;
pub mod settings;
pub mod statistics;
pub mod surface;
pub mod tangent;
/// The `mathscope_core` crate is the numeric engine behind the MathScope graphing and
/// statistics views. It is pure and synchronous; the browser reaches it through `mathscope_wasm`.
///
/// Key components:
/// - **Equation Engine**: tokenizer, recursive-descent parser and tree-walking evaluator with
///   explicit angle mode.
/// - **Traits**: `CurveFunction` / `SurfaceFunction`, the seams the sampler and mesher walk.
/// - **Differentiation**: symbolic derivatives that fold constants as they are built.
/// - **Sampling, Roots, Tangent, Surface**: curve points, sign-change roots, tangent lines and
///   indexed triangle meshes with smooth normals.
/// - **Statistics, Datasets**: descriptive stats, histograms, regression, Gaussian curves and
///   JSON chart data.
pub mod equation_engine;
pub mod traits;
