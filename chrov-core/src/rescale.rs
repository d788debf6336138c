//! Linear rescaling of coordinates between numeric ranges.

use std::f64::consts::PI;

/// Default target range of [`rescale`]: one full turn in radians
pub const FULL_TURN: (f64, f64) = (0.0, 2.0 * PI);

/// Min and max of `values`, `None` for an empty slice
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Rescale `values` linearly from `source` to `target`, preserving order.
///
/// `source` defaults to the values' own min/max and `target` to
/// [`FULL_TURN`]. A zero-width source maps every value to the midpoint of
/// the target range.
pub fn rescale(values: &[f64], source: Option<(f64, f64)>, target: Option<(f64, f64)>) -> Vec<f64> {
    let (t0, t1) = target.unwrap_or(FULL_TURN);
    let (s0, s1) = match source.or_else(|| min_max(values)) {
        Some(range) => range,
        None => return Vec::new(),
    };
    let width = s1 - s0;
    if width == 0.0 || !width.is_finite() {
        let mid = (t0 + t1) / 2.0;
        return vec![mid; values.len()];
    }
    let scale = (t1 - t0) / width;
    values.iter().map(|&v| t0 + (v - s0) * scale).collect()
}

/// Rescale a single value; see [`rescale`] for the zero-width fallback
pub fn rescale_value(value: f64, source: (f64, f64), target: (f64, f64)) -> f64 {
    rescale(&[value], Some(source), Some(target))[0]
}

/// 1-based ranks with ties sharing the average of their positions.
pub fn rank_average(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = rank;
        }
        i = j + 1;
    }
    ranks
}

/// `n` evenly spaced values from `lo` to `hi` inclusive
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| lo + step * i as f64).collect();
            out[n - 1] = hi;
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rescale_defaults_to_full_turn() {
        let out = rescale(&[0.0, 5.0, 10.0], None, None);
        assert_eq!(out, vec![0.0, PI, 2.0 * PI]);
    }

    #[test]
    fn test_rescale_endpoints_are_exact() {
        let values = [3.0, 7.5, 1.0, 9.0];
        let out = rescale(&values, None, Some((-1.0, 1.0)));
        assert_eq!(out[2], -1.0);
        assert_eq!(out[3], 1.0);
    }

    #[test]
    fn test_zero_width_source_maps_to_midpoint() {
        let out = rescale(&[42.0], None, Some((0.0, 10.0)));
        assert_eq!(out, vec![5.0]);
        let out = rescale(&[1.0, 2.0], Some((3.0, 3.0)), Some((2.0, 4.0)));
        assert_eq!(out, vec![3.0, 3.0]);
        assert!(rescale(&[], None, None).is_empty());
    }

    #[test]
    fn test_rank_average_ties() {
        assert_eq!(rank_average(&[10.0, 30.0, 20.0, 20.0]), vec![1.0, 4.0, 2.5, 2.5]);
        assert_eq!(rank_average(&[5.0]), vec![1.0]);
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    fn range() -> impl Strategy<Value = (f64, f64)> {
        (-1e4f64..1e4, 1f64..1e4).prop_map(|(lo, width)| (lo, lo + width))
    }

    proptest! {
        #[test]
        fn prop_round_trip(values in prop::collection::vec(-1e4f64..1e4, 1..50), r1 in range(), r2 in range()) {
            let there = rescale(&values, Some(r1), Some(r2));
            let back = rescale(&there, Some(r2), Some(r1));
            for (a, b) in values.iter().zip(back.iter()) {
                let tol = 1e-6 * (1.0 + a.abs().max(r1.0.abs()).max(r1.1.abs()));
                prop_assert!((a - b).abs() <= tol, "{} vs {}", a, b);
            }
        }

        #[test]
        fn prop_preserves_order(values in prop::collection::vec(-1e6f64..1e6, 2..50), r2 in range()) {
            let out = rescale(&values, None, Some(r2));
            for i in 0..values.len() {
                for j in 0..values.len() {
                    if values[i] < values[j] {
                        prop_assert!(out[i] <= out[j]);
                    }
                }
            }
        }
    }
}
