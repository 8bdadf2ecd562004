use crate::sampling::Point2D;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Population summary of a numeric sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptiveStats {
    pub mean: f64,
    pub median: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub q3: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    pub range_label: String,
    pub count: usize,
}

/// Least-squares fit `y = slope * x + intercept`. `endpoints` spans the
/// smallest and largest x of the input and is empty below two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionLine {
    pub slope: f64,
    pub intercept: f64,
    pub endpoints: Vec<Point2D>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalPoint {
    pub x: f64,
    pub density: f64,
}

/// Comma separated numbers. Each trimmed entry contributes its leading
/// number (`"10%"` reads as 10); entries with none are skipped.
pub fn parse_sample(text: &str) -> Vec<f64> {
    text.split(',')
        .filter_map(|entry| leading_number(entry.trim()))
        .filter(|value| !value.is_nan())
        .collect()
}

/// Longest prefix of `entry` that is a decimal literal: optional sign,
/// digits with an optional fraction, optional exponent, or `Infinity`.
fn leading_number(entry: &str) -> Option<f64> {
    let bytes = entry.as_bytes();
    let digits_from = |from: usize| {
        bytes
            .get(from..)
            .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if entry[end..].starts_with("Infinity") {
        return entry[..end + "Infinity".len()].parse().ok();
    }

    let whole = digits_from(end);
    end += whole;
    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits_from(end + 1);
        if whole + fraction > 0 {
            end += 1 + fraction;
        }
    }
    if whole + fraction == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent_at = end + 1;
        if matches!(bytes.get(exponent_at), Some(b'+' | b'-')) {
            exponent_at += 1;
        }
        let exponent = digits_from(exponent_at);
        if exponent > 0 {
            end = exponent_at + exponent;
        }
    }
    entry[..end].parse().ok()
}

/// `None` for a sample with no usable values.
///
/// Quartiles use the nearest rank `sorted[floor(p * n)]`, no interpolation.
pub fn descriptive_stats(sample: &[f64]) -> Option<DescriptiveStats> {
    let mut sorted: Vec<f64> = sample.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    let rank = |p: f64| sorted[((p * n as f64).floor() as usize).min(n - 1)];

    Some(DescriptiveStats {
        mean,
        median,
        variance,
        std_dev: variance.sqrt(),
        min: sorted[0],
        max: sorted[n - 1],
        q1: rank(0.25),
        q3: rank(0.75),
    })
}

/// Equal-width bins between the sample's min and max.
///
/// NaN values are ignored; every other value lands in exactly one bin, with
/// the maximum falling into the last one. A zero bin count is read as one.
pub fn histogram(sample: &[f64], bins: usize) -> Vec<HistogramBin> {
    let values: Vec<f64> = sample.iter().copied().filter(|v| !v.is_nan()).collect();
    if values.is_empty() {
        return Vec::new();
    }
    let bins = bins.max(1);

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut width = (max - min) / bins as f64;
    if width == 0.0 || width.is_nan() {
        width = 1.0;
    }

    let last = bins as i64 - 1;
    let mut counts = vec![0usize; bins];
    for value in values {
        // NaN quotients cast to zero; infinities saturate and are clamped.
        let index = (((value - min) / width).floor() as i64).clamp(0, last);
        counts[index as usize] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let low = min + i as f64 * width;
            let high = min + (i + 1) as f64 * width;
            HistogramBin {
                range_label: format!("{low:.2}-{high:.2}"),
                count,
            }
        })
        .collect()
}

pub fn linear_regression(points: &[Point2D]) -> RegressionLine {
    if points.len() < 2 {
        return RegressionLine {
            slope: 0.0,
            intercept: 0.0,
            endpoints: Vec::new(),
        };
    }

    let n = points.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for p in points {
        sum_x += p.x;
        sum_y += p.y;
        sum_xy += p.x * p.y;
        sum_xx += p.x * p.x;
    }

    let mut denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        denominator = 1.0;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = sum_y / n - slope * sum_x / n;

    let x_min = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let x_max = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let endpoints = vec![
        Point2D::new(x_min, slope * x_min + intercept),
        Point2D::new(x_max, slope * x_max + intercept),
    ];

    RegressionLine {
        slope,
        intercept,
        endpoints,
    }
}

/// Gaussian density sampled at `mean + i * std_dev` for `i` stepping from -4
/// to 4 in `sample_size` equal steps, both ends included.
pub fn normal_curve(mean: f64, std_dev: f64, sample_size: usize) -> Vec<NormalPoint> {
    if sample_size == 0 || !mean.is_finite() || !std_dev.is_finite() || std_dev <= 0.0 {
        return Vec::new();
    }

    let scale = 1.0 / (std_dev * (2.0 * PI).sqrt());
    let step = 8.0 / sample_size as f64;
    (0..=sample_size)
        .map(|k| {
            let i = -4.0 + k as f64 * step;
            let x = mean + i * std_dev;
            let z = (x - mean) / std_dev;
            NormalPoint {
                x,
                density: scale * (-0.5 * z * z).exp(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{descriptive_stats, histogram, linear_regression, normal_curve, parse_sample};
    use crate::sampling::Point2D;
    use approx::assert_relative_eq;

    #[test]
    fn parse_sample_skips_junk() {
        assert_eq!(parse_sample(" 1, 2.5 ,abc,, -3e1 ,NaN"), vec![1.0, 2.5, -30.0]);
        assert!(parse_sample("").is_empty());
    }

    #[test]
    fn parse_sample_reads_leading_numbers() {
        assert_eq!(parse_sample("3abc, 4 5, 10%, 7"), vec![3.0, 4.0, 10.0, 7.0]);
        assert_eq!(
            parse_sample("1e, .5, -.25, 5., +2, 2e-1x"),
            vec![1.0, 0.5, -0.25, 5.0, 2.0, 0.2]
        );
        assert_eq!(parse_sample("-Infinity, .e3, -, x1"), vec![f64::NEG_INFINITY]);
    }

    #[test]
    fn descriptive_stats_of_small_sample() {
        let stats = descriptive_stats(&parse_sample("1,2,3,4,5")).expect("stats");
        assert_relative_eq!(stats.mean, 3.0);
        assert_relative_eq!(stats.median, 3.0);
        assert_relative_eq!(stats.variance, 2.0);
        assert_relative_eq!(stats.std_dev, 2f64.sqrt());
        assert_eq!((stats.min, stats.max), (1.0, 5.0));
        // floor(1.25) = 1, floor(3.75) = 3
        assert_eq!((stats.q1, stats.q3), (2.0, 4.0));
    }

    #[test]
    fn even_median_averages_middle_pair() {
        let stats = descriptive_stats(&[4.0, 1.0, 3.0, 2.0]).expect("stats");
        assert_relative_eq!(stats.median, 2.5);
        assert_eq!((stats.q1, stats.q3), (2.0, 4.0));
    }

    #[test]
    fn empty_sample_has_no_stats() {
        assert_eq!(descriptive_stats(&[]), None);
        assert_eq!(descriptive_stats(&parse_sample("x, y")), None);
    }

    #[test]
    fn histogram_counts_and_labels() {
        let bins = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].range_label, "0.00-2.00");
        assert_eq!(bins[1].range_label, "2.00-4.00");
        // The maximum lands in the last bin.
        assert_eq!((bins[0].count, bins[1].count), (2, 3));
    }

    #[test]
    fn histogram_degenerate_inputs() {
        assert!(histogram(&[], 10).is_empty());

        let bins = histogram(&[7.0, 7.0, 7.0], 4);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins[0].count, 3);
        assert_eq!(bins[0].range_label, "7.00-8.00");

        let bins = histogram(&[1.0, 2.0], 0);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 2);

        let bins = histogram(&[f64::NAN, 1.0, 2.0], 3);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn histogram_counts_every_parsed_value() {
        let inputs = [
            "1,2,3,4,5,6,7,8,9,10",
            "-5, 0.5, 1e3, junk, 42",
            "3",
            "inf, -inf, 2",
            "1e308, -1e308, 0",
            ",,,",
        ];
        for input in inputs {
            let sample = parse_sample(input);
            for bins in [0, 1, 3, 10] {
                let total: usize = histogram(&sample, bins).iter().map(|b| b.count).sum();
                assert_eq!(total, sample.len(), "input {input:?} with {bins} bins");
            }
        }
    }

    #[test]
    fn regression_on_exact_line() {
        let points = [
            Point2D::new(1.0, 2.0),
            Point2D::new(2.0, 4.0),
            Point2D::new(3.0, 6.0),
        ];
        let line = linear_regression(&points);
        assert_relative_eq!(line.slope, 2.0);
        assert_relative_eq!(line.intercept, 0.0, epsilon = 1e-12);
        assert_eq!(line.endpoints.len(), 2);
        assert_eq!(line.endpoints[0].x, 1.0);
        assert_eq!(line.endpoints[1].x, 3.0);
        assert_relative_eq!(line.endpoints[1].y, 6.0);
    }

    #[test]
    fn regression_needs_two_points() {
        let line = linear_regression(&[Point2D::new(1.0, 1.0)]);
        assert_eq!((line.slope, line.intercept), (0.0, 0.0));
        assert!(line.endpoints.is_empty());
    }

    #[test]
    fn regression_with_vertical_data_does_not_divide_by_zero() {
        let points = [Point2D::new(2.0, 1.0), Point2D::new(2.0, 5.0)];
        let line = linear_regression(&points);
        assert!(line.slope.is_finite());
        assert!(line.intercept.is_finite());
    }

    #[test]
    fn normal_curve_spans_four_deviations() {
        let curve = normal_curve(10.0, 2.0, 100);
        assert_eq!(curve.len(), 101);
        assert_relative_eq!(curve[0].x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(curve[100].x, 18.0, epsilon = 1e-9);
        let peak = &curve[50];
        assert_relative_eq!(peak.x, 10.0, epsilon = 1e-9);
        assert_relative_eq!(
            peak.density,
            1.0 / (2.0 * (2.0 * std::f64::consts::PI).sqrt()),
            epsilon = 1e-9
        );
        assert_relative_eq!(curve[0].density, curve[100].density, max_relative = 1e-12);
    }

    #[test]
    fn normal_curve_rejects_bad_parameters() {
        assert!(normal_curve(0.0, 1.0, 0).is_empty());
        assert!(normal_curve(0.0, 0.0, 100).is_empty());
        assert!(normal_curve(0.0, -1.0, 100).is_empty());
        assert!(normal_curve(0.0, f64::NAN, 100).is_empty());
    }
}
