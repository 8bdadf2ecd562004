use crate::error::{EngineError, EngineResult};
use crate::sampling::Point2D;
use crate::statistics::{linear_regression, RegressionLine};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const NAMED_VALUES_HINT: &str = r#"Invalid JSON. Example: [{"name": "A", "value": 10}]"#;
const POINTS_HINT: &str = r#"Invalid JSON. Example: [{"x": 1, "y": 10}]"#;

/// A labelled value, as drawn by bar and pie charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

fn parse_array<T: DeserializeOwned>(text: &str, hint: &str) -> EngineResult<Vec<T>> {
    serde_json::from_str::<Vec<T>>(text).map_err(|_| EngineError::InputFormat(hint.to_string()))
}

/// `[{"name": ..., "value": ...}, ...]`
pub fn parse_named_values(text: &str) -> EngineResult<Vec<NamedValue>> {
    parse_array(text, NAMED_VALUES_HINT)
}

/// `[{"x": ..., "y": ...}, ...]`
pub fn parse_points(text: &str) -> EngineResult<Vec<Point2D>> {
    parse_array(text, POINTS_HINT)
}

/// Last successfully processed data for each chart.
///
/// A `process_*` call that fails leaves the previous data for that chart
/// exactly as it was.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartDatasets {
    bar: Vec<NamedValue>,
    scatter: Vec<Point2D>,
    pie: Vec<NamedValue>,
}

impl ChartDatasets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_bar(&mut self, text: &str) -> EngineResult<&[NamedValue]> {
        self.bar = parse_named_values(text)?;
        Ok(&self.bar)
    }

    pub fn process_scatter(&mut self, text: &str) -> EngineResult<&[Point2D]> {
        self.scatter = parse_points(text)?;
        Ok(&self.scatter)
    }

    pub fn process_pie(&mut self, text: &str) -> EngineResult<&[NamedValue]> {
        self.pie = parse_named_values(text)?;
        Ok(&self.pie)
    }

    pub fn bar(&self) -> &[NamedValue] {
        &self.bar
    }

    pub fn scatter(&self) -> &[Point2D] {
        &self.scatter
    }

    pub fn pie(&self) -> &[NamedValue] {
        &self.pie
    }

    /// Fit over the current scatter data.
    pub fn regression(&self) -> RegressionLine {
        linear_regression(&self.scatter)
    }

    /// Each slice's fraction of the pie total; empty when the total is not a
    /// positive finite number.
    pub fn pie_shares(&self) -> Vec<NamedValue> {
        let total: f64 = self.pie.iter().map(|slice| slice.value).sum();
        if !total.is_finite() || total <= 0.0 {
            return Vec::new();
        }
        self.pie
            .iter()
            .map(|slice| NamedValue {
                name: slice.name.clone(),
                value: slice.value / total,
            })
            .collect()
    }
}
