//! Chart datasets and statistics wrapper.

use crate::shared::{load_settings, to_js, to_js_error};
use mathscope_core::datasets::ChartDatasets;
use mathscope_core::settings::EngineSettings;
use mathscope_core::statistics::{descriptive_stats, histogram, normal_curve, parse_sample};
use wasm_bindgen::prelude::*;

/// Holds the last good bar, scatter and pie data between requests.
#[wasm_bindgen]
pub struct WasmStatistics {
    datasets: ChartDatasets,
    settings: EngineSettings,
}

#[wasm_bindgen]
impl WasmStatistics {
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: Option<String>) -> Result<WasmStatistics, JsValue> {
        console_error_panic_hook::set_once();

        Ok(WasmStatistics {
            datasets: ChartDatasets::new(),
            settings: load_settings(settings_json)?,
        })
    }

    /// Returns the number of bars accepted. A rejected input leaves the
    /// previous bars in place.
    pub fn process_bar(&mut self, text: &str) -> Result<usize, JsValue> {
        self.datasets
            .process_bar(text)
            .map(<[_]>::len)
            .map_err(|err| to_js_error("bar data", err))
    }

    pub fn process_scatter(&mut self, text: &str) -> Result<usize, JsValue> {
        self.datasets
            .process_scatter(text)
            .map(<[_]>::len)
            .map_err(|err| to_js_error("scatter data", err))
    }

    pub fn process_pie(&mut self, text: &str) -> Result<usize, JsValue> {
        self.datasets
            .process_pie(text)
            .map(<[_]>::len)
            .map_err(|err| to_js_error("pie data", err))
    }

    pub fn bar_data(&self) -> Result<JsValue, JsValue> {
        to_js("bar data", &self.datasets.bar())
    }

    pub fn scatter_data(&self) -> Result<JsValue, JsValue> {
        to_js("scatter data", &self.datasets.scatter())
    }

    pub fn pie_data(&self) -> Result<JsValue, JsValue> {
        to_js("pie data", &self.datasets.pie())
    }

    pub fn pie_shares(&self) -> Result<JsValue, JsValue> {
        to_js("pie shares", &self.datasets.pie_shares())
    }

    /// `{slope, intercept, endpoints}` over the scatter data.
    pub fn regression(&self) -> Result<JsValue, JsValue> {
        to_js("regression", &self.datasets.regression())
    }

    /// Stats of a comma separated sample, or `null` when it has no numbers.
    pub fn descriptive_stats(&self, text: &str) -> Result<JsValue, JsValue> {
        match descriptive_stats(&parse_sample(text)) {
            Some(stats) => to_js("descriptive stats", &stats),
            None => Ok(JsValue::NULL),
        }
    }

    /// `[{rangeLabel, count}, ...]`. Without `bins` the settings default is used.
    pub fn histogram(&self, text: &str, bins: Option<u32>) -> Result<JsValue, JsValue> {
        let bins = bins.map_or(self.settings.histogram_bins, |bins| bins as usize);
        to_js("histogram", &histogram(&parse_sample(text), bins))
    }

    /// `[{x, density}, ...]`. Without `sample_size` the settings default is used.
    pub fn normal_curve(
        &self,
        mean: f64,
        std_dev: f64,
        sample_size: Option<u32>,
    ) -> Result<JsValue, JsValue> {
        let sample_size =
            sample_size.map_or(self.settings.normal_sample_size, |size| size as usize);
        to_js("normal curve", &normal_curve(mean, std_dev, sample_size))
    }

    pub fn bar_count(&self) -> usize {
        self.datasets.bar().len()
    }

    pub fn scatter_count(&self) -> usize {
        self.datasets.scatter().len()
    }

    pub fn pie_count(&self) -> usize {
        self.datasets.pie().len()
    }

    /// Slope and intercept of the scatter fit as `[slope, intercept]`.
    pub fn regression_coefficients(&self) -> Vec<f64> {
        let line = self.datasets.regression();
        vec![line.slope, line.intercept]
    }
}
