use crate::equation_engine::AngleMode;
use crate::sampling::Domain;
use crate::surface::SurfaceMesh;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Defaults and resolution limits shared by the graphing and statistics
/// front-ends. Missing JSON fields fall back to [`EngineSettings::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineSettings {
    pub curve_domain: Domain,
    pub surface_domain: Domain,
    pub max_curve_steps: usize,
    pub max_surface_steps: usize,
    pub root_tolerance: f64,
    pub histogram_bins: usize,
    pub normal_sample_size: usize,
    pub max_prime_limit: usize,
    pub angle_mode: AngleMode,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            curve_domain: Domain {
                min: -10.0,
                max: 10.0,
                steps: 200,
            },
            surface_domain: Domain {
                min: -5.0,
                max: 5.0,
                steps: 30,
            },
            max_curve_steps: 1000,
            max_surface_steps: 200,
            root_tolerance: 1e-6,
            histogram_bins: 10,
            normal_sample_size: 100,
            max_prime_limit: 10_000_000,
            angle_mode: AngleMode::default(),
        }
    }
}

impl EngineSettings {
    pub fn from_json(text: &str) -> Result<Self> {
        let settings: Self =
            serde_json::from_str(text).context("Settings must be a JSON object.")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_curve_steps < Domain::MIN_STEPS {
            bail!("max_curve_steps must be at least {}.", Domain::MIN_STEPS);
        }
        if self.max_surface_steps < Domain::MIN_STEPS {
            bail!("max_surface_steps must be at least {}.", Domain::MIN_STEPS);
        }
        if self.max_surface_steps > SurfaceMesh::MAX_STEPS {
            bail!("max_surface_steps must be at most {}.", SurfaceMesh::MAX_STEPS);
        }
        if !(self.root_tolerance.is_finite() && self.root_tolerance > 0.0) {
            bail!("root_tolerance must be positive.");
        }
        if self.histogram_bins == 0 {
            bail!("histogram_bins must be at least 1.");
        }
        if self.normal_sample_size == 0 {
            bail!("normal_sample_size must be at least 1.");
        }
        self.curve_domain
            .validate()
            .context("Invalid default curve domain")?;
        self.surface_domain
            .validate()
            .context("Invalid default surface domain")?;
        Ok(())
    }

    /// `domain` with its resolution capped at `max_curve_steps`.
    pub fn clamp_curve_domain(&self, domain: Domain) -> Domain {
        Domain {
            steps: domain
                .steps
                .clamp(Domain::MIN_STEPS, self.max_curve_steps.max(Domain::MIN_STEPS)),
            ..domain
        }
    }

    /// `domain` with its cells per side capped at `max_surface_steps`.
    pub fn clamp_surface_domain(&self, domain: Domain) -> Domain {
        Domain {
            steps: domain
                .steps
                .clamp(Domain::MIN_STEPS, self.max_surface_steps.max(Domain::MIN_STEPS)),
            ..domain
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EngineSettings;
    use crate::equation_engine::AngleMode;
    use crate::sampling::Domain;

    #[test]
    fn defaults_are_valid() {
        let settings = EngineSettings::default();
        settings.validate().expect("defaults validate");
        assert_eq!(settings.curve_domain.steps, 200);
        assert_eq!(settings.surface_domain.steps, 30);
        assert_eq!(settings.angle_mode, AngleMode::Radians);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let settings =
            EngineSettings::from_json(r#"{"maxCurveSteps": 500, "angleMode": "degrees"}"#)
                .expect("valid settings");
        assert_eq!(settings.max_curve_steps, 500);
        assert_eq!(settings.angle_mode, AngleMode::Degrees);
        assert_eq!(settings.max_surface_steps, 200);
        assert_eq!(settings.histogram_bins, 10);
    }

    #[test]
    fn rejects_bad_limits() {
        assert!(EngineSettings::from_json("not json").is_err());
        assert!(EngineSettings::from_json(r#"{"rootTolerance": -1.0}"#).is_err());
        assert!(EngineSettings::from_json(r#"{"histogramBins": 0}"#).is_err());
        let err = EngineSettings::from_json(r#"{"maxSurfaceSteps": 100000}"#)
            .expect_err("grid too large");
        assert!(err.to_string().contains("at most 1000"));
        EngineSettings::from_json(r#"{"maxSurfaceSteps": 1000}"#).expect("largest grid");
        let err = EngineSettings::from_json(
            r#"{"curveDomain": {"min": 3.0, "max": 1.0, "steps": 10}}"#,
        )
        .expect_err("inverted domain");
        assert!(format!("{err:#}").contains("curve domain"));
    }

    #[test]
    fn clamps_requested_resolution() {
        let settings = EngineSettings::default();
        let domain = Domain {
            min: 0.0,
            max: 1.0,
            steps: 50_000,
        };
        assert_eq!(settings.clamp_curve_domain(domain).steps, 1000);
        assert_eq!(settings.clamp_surface_domain(domain).steps, 200);

        let tiny = Domain { steps: 0, ..domain };
        assert_eq!(settings.clamp_curve_domain(tiny).steps, 2);
        assert_eq!(settings.clamp_surface_domain(tiny).steps, 2);
        assert_eq!(settings.clamp_curve_domain(tiny).min, 0.0);
    }
}
