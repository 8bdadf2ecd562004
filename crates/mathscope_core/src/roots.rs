use crate::sampling::Point2D;
use std::cmp::Ordering;

/// Roots closer than this to the previously kept root are the same root
/// detected twice at a shared sample.
pub const ROOT_DEDUP_TOLERANCE: f64 = 1e-6;

/// Zero crossings of a sampled curve, ascending.
///
/// `points` must already be ascending in x (sampler output is); the scan
/// trusts that order. Gaps in the sequence are bridged: consecutive entries
/// are compared even when points between them were dropped.
pub fn find_roots(points: &[Point2D]) -> Vec<f64> {
    find_roots_with_tolerance(points, ROOT_DEDUP_TOLERANCE)
}

pub fn find_roots_with_tolerance(points: &[Point2D], tolerance: f64) -> Vec<f64> {
    let mut roots = Vec::new();
    for pair in points.windows(2) {
        let (p0, p1) = (pair[0], pair[1]);
        if p0.y == 0.0 {
            roots.push(p0.x);
        } else if p1.y == 0.0 {
            roots.push(p1.x);
        } else if (p0.y < 0.0) != (p1.y < 0.0) {
            let t = -p0.y / (p1.y - p0.y);
            roots.push(p0.x + t * (p1.x - p0.x));
        }
    }

    roots.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    roots.dedup_by(|current, kept| (*current - *kept).abs() <= tolerance);
    roots
}

#[cfg(test)]
mod tests {
    use super::{find_roots, find_roots_with_tolerance};
    use crate::equation_engine::{AngleMode, Bindings};
    use crate::sampling::{sample, Domain, Point2D};

    fn points(pairs: &[(f64, f64)]) -> Vec<Point2D> {
        pairs.iter().map(|&(x, y)| Point2D::new(x, y)).collect()
    }

    #[test]
    fn finds_both_roots_of_shifted_parabola() {
        let domain = Domain::new(-10.0, 10.0, 200).expect("domain");
        let sampled = sample("x^2 - 4", &domain, &Bindings::new(), AngleMode::Radians)
            .expect("sample");
        let roots = find_roots(&sampled);
        assert_eq!(roots.len(), 2, "roots: {roots:?}");
        assert!((roots[0] + 2.0).abs() < 0.1, "got {}", roots[0]);
        assert!((roots[1] - 2.0).abs() < 0.1, "got {}", roots[1]);
    }

    #[test]
    fn interpolates_sign_change_linearly() {
        let roots = find_roots(&points(&[(0.0, -1.0), (1.0, 3.0)]));
        assert_eq!(roots, vec![0.25]);
    }

    #[test]
    fn exact_zero_at_shared_sample_is_reported_once() {
        // The zero at x = 1 is seen by the pair (1, 2) as y0 = 0 and by the
        // pair (0, 1) as y1 = 0.
        let roots = find_roots(&points(&[(0.0, -1.0), (1.0, 0.0), (2.0, 1.0)]));
        assert_eq!(roots, vec![1.0]);
    }

    #[test]
    fn no_sign_change_means_no_roots() {
        let roots = find_roots(&points(&[(0.0, 1.0), (1.0, 2.0), (2.0, 0.5)]));
        assert!(roots.is_empty());
        assert!(find_roots(&[]).is_empty());
        assert!(find_roots(&points(&[(0.0, 0.0)])).is_empty());
    }

    #[test]
    fn near_coincident_roots_collapse() {
        let roots = find_roots_with_tolerance(
            &points(&[(0.0, -1.0), (1.0, 1e-12), (1.0 + 1e-9, -1.0)]),
            1e-6,
        );
        assert_eq!(roots.len(), 1, "roots: {roots:?}");
    }

    #[test]
    fn sine_roots_are_sorted() {
        let domain = Domain::new(-7.0, 7.0, 400).expect("domain");
        let sampled = sample("sin(x)", &domain, &Bindings::new(), AngleMode::Radians)
            .expect("sample");
        let roots = find_roots(&sampled);
        let expected = [-2.0, -1.0, 0.0, 1.0, 2.0].map(|k| k * std::f64::consts::PI);
        assert_eq!(roots.len(), expected.len(), "roots: {roots:?}");
        for (root, want) in roots.iter().zip(expected) {
            assert!((root - want).abs() < 1e-2, "{root} vs {want}");
        }
    }
}
