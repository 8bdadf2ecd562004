//! Error conversion, settings loading and serialization shared by the wrappers.

use anyhow::Context;
use mathscope_core::equation_engine::AngleMode;
use mathscope_core::settings::EngineSettings;
use serde::Serialize;
use std::fmt::Display;
use wasm_bindgen::prelude::*;
use web_sys::console;

/// Logs a failed request to the browser console and hands the message to JS.
pub(crate) fn to_js_error(context: &str, err: impl Display) -> JsValue {
    let message = err.to_string();
    console::warn_1(&JsValue::from_str(&format!("mathscope: {context}: {message}")));
    JsValue::from_str(&message)
}

pub(crate) fn to_js<T: Serialize>(context: &str, value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|err| to_js_error(context, format!("Failed to serialize {context}: {err}")))
}

/// Defaults when no settings JSON (or an empty string) is supplied.
pub(crate) fn load_settings(settings_json: Option<String>) -> Result<EngineSettings, JsValue> {
    match settings_json {
        Some(text) if !text.trim().is_empty() => EngineSettings::from_json(&text)
            .context("Rejected engine settings")
            .map_err(|err| to_js_error("settings", format!("{err:#}"))),
        _ => Ok(EngineSettings::default()),
    }
}

/// An empty mode string selects the settings default.
pub(crate) fn parse_angle_mode(mode: &str, fallback: AngleMode) -> Result<AngleMode, JsValue> {
    if mode.trim().is_empty() {
        return Ok(fallback);
    }
    mode.parse::<AngleMode>().map_err(|err| to_js_error("angle mode", err))
}

pub(crate) fn angle_mode_name(mode: AngleMode) -> &'static str {
    match mode {
        AngleMode::Degrees => "degrees",
        AngleMode::Radians => "radians",
    }
}

#[cfg(test)]
mod tests {
    use super::{angle_mode_name, load_settings, parse_angle_mode};
    use mathscope_core::equation_engine::AngleMode;

    #[test]
    fn missing_settings_fall_back_to_defaults() {
        let settings = load_settings(None).expect("defaults");
        assert_eq!(settings.max_curve_steps, 1000);
        let settings = load_settings(Some("  ".to_string())).expect("defaults");
        assert_eq!(settings.histogram_bins, 10);
    }

    #[test]
    fn settings_json_is_applied() {
        let settings =
            load_settings(Some(r#"{"histogramBins": 4}"#.to_string())).expect("valid settings");
        assert_eq!(settings.histogram_bins, 4);
    }

    #[test]
    fn angle_mode_round_trips_through_names() {
        for mode in [AngleMode::Degrees, AngleMode::Radians] {
            let parsed = parse_angle_mode(angle_mode_name(mode), AngleMode::Radians).expect("mode");
            assert_eq!(parsed, mode);
        }
        assert_eq!(
            parse_angle_mode("", AngleMode::Degrees).expect("fallback"),
            AngleMode::Degrees
        );
    }

    #[test]
    #[cfg(target_arch = "wasm32")]
    fn unknown_angle_mode_is_rejected() {
        assert!(parse_angle_mode("gradians", AngleMode::Radians).is_err());
    }
}
