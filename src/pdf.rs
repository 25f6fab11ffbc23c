//! Discrete, piecewise-uniform probability density over integer bins of the
//! scaled rate axis.
//!
//! `RatePdf` is the nuisance-parameter workhorse for the "decreasing" phase
//! shape: it tracks the evolving distribution of a correlated rate as it
//! decays slot by slot, supports conditioning on an observation
//! (`range_limit`) and supports the day-to-day decay step itself, which is
//! convolution with a uniform distribution followed by a translation.

use crate::compensated_sum::{prefix_diff, prefix_sum, sum};
use crate::range::intersect_length;

/// A piecewise-uniform distribution over `[value_start, value_end)`, one
/// probability mass per unit-width bin.
#[derive(Debug, Clone, PartialEq)]
pub struct RatePdf {
    pub value_start: i64,
    pub value_end: i64,
    pub prob: Vec<f64>,
}

impl RatePdf {
    /// Builds a PDF over `⌊a⌋..⌈b⌉`. If `uniform`, mass is the continuous
    /// uniform distribution on `[a, b]` binned onto that integer partition;
    /// otherwise every bin starts at zero (an "invalid" PDF once trimmed to
    /// empty by `range_limit`/construction with a degenerate range).
    pub fn new(a: f64, b: f64, uniform: bool) -> Self {
        let value_start = a.floor() as i64;
        let value_end = b.ceil() as i64;
        let len = (value_end - value_start).max(0) as usize;
        let mut prob = vec![0.0; len];
        if uniform {
            let width = b - a;
            for (i, p) in prob.iter_mut().enumerate() {
                let bin = [
                    (value_start + i as i64) as f64,
                    (value_start + i as i64 + 1) as f64,
                ];
                *p = intersect_length(bin, [a, b]) / width;
            }
        }
        RatePdf {
            value_start,
            value_end,
            prob,
        }
    }

    fn invalidate(&mut self) {
        self.value_start = 0;
        self.value_end = 0;
        self.prob = Vec::new();
    }

    pub fn is_invalid(&self) -> bool {
        self.value_start == 0 && self.value_end == 0 && self.prob.is_empty()
    }

    pub fn min_value(&self) -> f64 {
        self.value_start as f64
    }

    pub fn max_value(&self) -> f64 {
        self.value_end as f64
    }

    /// Conditions the PDF on `r`, renormalizes, and returns the probability
    /// mass that lay in `r` under the prior PDF (0.0 if `r` doesn't overlap
    /// the support at all, which also invalidates the PDF).
    pub fn range_limit(&mut self, r: [f64; 2]) -> f64 {
        if self.is_invalid() {
            return 0.0;
        }
        let clip_start = r[0].max(self.value_start as f64);
        let clip_end = r[1].min(self.value_end as f64);
        if clip_start >= clip_end {
            self.invalidate();
            return 0.0;
        }
        let clipped = [clip_start, clip_end];
        let start = clip_start.floor() as i64;
        let end = clip_end.ceil() as i64;

        let mut new_prob = vec![0.0; (end - start) as usize];
        for (local_i, global_i) in (0..(end - start)).enumerate() {
            let bin_idx = (start - self.value_start) + global_i;
            let bin = [
                (self.value_start + bin_idx) as f64,
                (self.value_start + bin_idx + 1) as f64,
            ];
            new_prob[local_i] = self.prob[bin_idx as usize] * intersect_length(bin, clipped);
        }

        let total = sum(&new_prob);
        if total > 0.0 {
            for p in new_prob.iter_mut() {
                *p /= total;
            }
        }

        self.value_start = start;
        self.value_end = end;
        self.prob = new_prob;
        total
    }

    /// Replaces the tracked variable `X` with `X - U[min, max]` (`min`/`max`
    /// rounded to the nearest integer). Mass is preserved by construction —
    /// no renormalization needed.
    pub fn decay(&mut self, min: f64, max: f64) {
        if self.is_invalid() {
            return;
        }
        let min_r = min.round();
        let max_r = max.round();
        let max_y = (max_r - min_r) as i64;

        if max_y == 0 {
            // Zero-width uniform: pure translation, prob unchanged.
            self.value_start -= max_r as i64;
            self.value_end -= min_r as i64;
            return;
        }

        let max_x = self.prob.len() as i64;
        let prefixes = prefix_sum(&self.prob);
        let new_len = (max_x + max_y) as usize;
        let mut new_prob = vec![0.0; new_len];

        for i in 0..new_len as i64 {
            let lo = (i - max_y).max(0);
            let hi = (max_x - 1).min(i);
            if lo > hi {
                continue;
            }
            let mut val = prefix_diff(prefixes[lo as usize], prefixes[(hi + 1) as usize]);

            let left_in_range = i - max_y >= 0;
            if left_in_range {
                val -= 0.5 * self.prob[(i - max_y) as usize];
            }
            let right_in_range = i <= max_x - 1;
            if right_in_range {
                val -= 0.5 * self.prob[i as usize];
            }

            new_prob[i as usize] = val / max_y as f64;
        }

        self.value_start -= max_r as i64;
        self.value_end -= min_r as i64;
        self.prob = new_prob;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn new_uniform_sums_to_one() {
        let pdf = RatePdf::new(10.0, 13.5, true);
        assert_relative_eq!(sum(&pdf.prob), 1.0, epsilon = 1e-12);
        assert_eq!(pdf.value_start, 10);
        assert_eq!(pdf.value_end, 14);
    }

    #[test]
    fn range_limit_full_range_is_identity() {
        let mut pdf = RatePdf::new(10.0, 13.5, true);
        let before = pdf.prob.clone();
        let mass = pdf.range_limit([pdf.min_value(), pdf.max_value()]);
        assert_relative_eq!(mass, 1.0, epsilon = 1e-9);
        for (a, b) in before.iter().zip(pdf.prob.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn range_limit_disjoint_range_invalidates() {
        let mut pdf = RatePdf::new(10.0, 13.5, true);
        let mass = pdf.range_limit([100.0, 200.0]);
        assert_eq!(mass, 0.0);
        assert!(pdf.is_invalid());
    }

    #[test]
    fn range_limit_renormalizes_to_one() {
        let mut pdf = RatePdf::new(0.0, 10.0, true);
        pdf.range_limit([2.0, 4.0]);
        assert_relative_eq!(sum(&pdf.prob), 1.0, epsilon = 1e-9);
        assert_eq!(pdf.value_start, 2);
        assert_eq!(pdf.value_end, 4);
    }

    #[test]
    fn decay_zero_width_is_pure_translation() {
        let mut pdf = RatePdf::new(0.0, 10.0, true);
        let before = pdf.prob.clone();
        pdf.decay(3.0, 3.0);
        assert_eq!(pdf.value_start, -3);
        assert_eq!(pdf.value_end, 7);
        assert_eq!(pdf.prob, before);
    }

    #[test]
    fn decay_preserves_total_mass() {
        let mut pdf = RatePdf::new(0.0, 10.0, true);
        pdf.decay(1.0, 3.0);
        assert_relative_eq!(sum(&pdf.prob), 1.0, epsilon = 1e-9);
        assert_eq!(pdf.prob.len(), 12);
        assert_eq!(pdf.value_start, -3);
        assert_eq!(pdf.value_end, 9);
    }

    #[test]
    fn decay_then_range_limit_stays_normalized() {
        let mut pdf = RatePdf::new(0.0, 10.0, true);
        pdf.decay(1.0, 2.0);
        let mass = pdf.range_limit([-1.0, 5.0]);
        assert!(mass > 0.0 && mass <= 1.0);
        assert_relative_eq!(sum(&pdf.prob), 1.0, epsilon = 1e-9);
    }
}
