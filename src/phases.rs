//! The four primitive phase shapes a pattern generator composes: i.i.d.
//! uniform, decaying uniform, nested-uniform "peak", and fixed per-slot
//! uniform bands.
//!
//! Every phase function takes the slot range it owns, appends one `MinMax`
//! per owned slot to the shared `predicted_prices` buffer, and returns a
//! scalar conditional probability — `0.0` means the observation was outside
//! the phase's envelope even after fudging, and the caller must drop the
//! whole scenario.

use crate::pattern::MinMax;
use crate::pdf::RatePdf;
use crate::range::intersect_length;
use crate::rates::{self, RATE_MULTIPLIER};

/// Borrowed state threaded through every phase call within one scenario.
pub struct PhaseContext<'a> {
    pub buy: f64,
    pub fudge: i64,
    pub observations: &'a [f64; 14],
    pub predicted_prices: &'a mut Vec<MinMax>,
}

fn is_missing(p: f64) -> bool {
    p.is_nan()
}

fn accepts_fudge(observed: f64, min_pred: f64, max_pred: f64, fudge: i64) -> bool {
    let f = fudge as f64;
    observed >= min_pred - f && observed <= max_pred + f
}

/// `length` consecutive slots starting at `start`, each an i.i.d. draw of
/// `rate ~ U(rate_min, rate_max)` (unscaled, e.g. `0.9..1.4`).
pub fn individual_random(
    start: usize,
    length: usize,
    rate_min: f64,
    rate_max: f64,
    ctx: &mut PhaseContext,
) -> f64 {
    let scaled_min = rate_min * RATE_MULTIPLIER;
    let scaled_max = rate_max * RATE_MULTIPLIER;
    let min_pred = rates::predicted_price(scaled_min, ctx.buy);
    let max_pred = rates::predicted_price(scaled_max, ctx.buy);

    let mut prob = 1.0;
    for slot in start..start + length {
        let observed = ctx.observations[slot];
        if is_missing(observed) {
            ctx.predicted_prices
                .push(MinMax::range(min_pred as i64, max_pred as i64));
            continue;
        }
        if !accepts_fudge(observed, min_pred, max_pred, ctx.fudge) {
            return 0.0;
        }
        let clamped = observed.max(min_pred).min(max_pred);
        let real_rate_range = [rates::min_rate(clamped, ctx.buy), rates::max_rate(clamped, ctx.buy)];
        let overlap = intersect_length([scaled_min, scaled_max], real_rate_range);
        prob *= overlap / (scaled_max - scaled_min);
        ctx.predicted_prices.push(MinMax::exact(observed as i64));
        if prob <= 0.0 {
            return 0.0;
        }
    }
    prob
}

/// `length` consecutive slots, correlated decay: `rate` starts at
/// `U(start_rate_min, start_rate_max)` and has `U(decay_min, decay_max)`
/// (unscaled) subtracted off after every slot.
pub fn decreasing_random(
    start: usize,
    length: usize,
    start_rate_min: f64,
    start_rate_max: f64,
    decay_min: f64,
    decay_max: f64,
    ctx: &mut PhaseContext,
) -> f64 {
    let mut pdf = RatePdf::new(
        start_rate_min * RATE_MULTIPLIER,
        start_rate_max * RATE_MULTIPLIER,
        true,
    );
    let scaled_decay_min = decay_min * RATE_MULTIPLIER;
    let scaled_decay_max = decay_max * RATE_MULTIPLIER;

    let mut prob = 1.0;
    for slot in start..start + length {
        let rate_min = pdf.min_value();
        let rate_max = pdf.max_value();
        let min_pred = rates::predicted_price(rate_min, ctx.buy);
        let max_pred = rates::predicted_price(rate_max, ctx.buy);
        let observed = ctx.observations[slot];

        if is_missing(observed) {
            ctx.predicted_prices
                .push(MinMax::range(min_pred as i64, max_pred as i64));
        } else {
            if !accepts_fudge(observed, min_pred, max_pred, ctx.fudge) {
                return 0.0;
            }
            let clamped = observed.max(min_pred).min(max_pred);
            let real_rate_range = [rates::min_rate(clamped, ctx.buy), rates::max_rate(clamped, ctx.buy)];
            prob *= pdf.range_limit(real_rate_range);
            if prob <= 0.0 {
                return 0.0;
            }
            ctx.predicted_prices.push(MinMax::exact(observed as i64));
        }
        pdf.decay(scaled_decay_min, scaled_decay_max);
    }
    prob
}

/// Three consecutive slots `[start, start+1, start+2]` with a nested
/// structure: the middle slot draws `rate ~ U(rate_min, rate_max)`
/// (unscaled outer range), and the left/right slots each draw
/// `⌈U(rate_min, rate) · buy⌉ − 1` independently, conditioned on `rate`.
pub fn peak(start: usize, rate_min: f64, rate_max: f64, ctx: &mut PhaseContext) -> f64 {
    let scaled_min = rate_min * RATE_MULTIPLIER;
    let scaled_max = rate_max * RATE_MULTIPLIER;
    let mut rate_range = [scaled_min, scaled_max];
    let mut prob = 1.0;

    let obs_left = ctx.observations[start];
    let obs_middle = ctx.observations[start + 1];
    let obs_right = ctx.observations[start + 2];

    // 1. Middle observation, handled like individual_random, then narrow
    // the working rate_range to what's consistent with it.
    let mid_min_pred = rates::predicted_price(rate_range[0], ctx.buy);
    let mid_max_pred = rates::predicted_price(rate_range[1], ctx.buy);
    if !is_missing(obs_middle) {
        if !accepts_fudge(obs_middle, mid_min_pred, mid_max_pred, ctx.fudge) {
            return 0.0;
        }
        let clamped = obs_middle.max(mid_min_pred).min(mid_max_pred);
        let real_rate_range = [rates::min_rate(clamped, ctx.buy), rates::max_rate(clamped, ctx.buy)];
        let overlap = intersect_length(rate_range, real_rate_range);
        prob *= overlap / (rate_range[1] - rate_range[0]);
        if prob <= 0.0 {
            return 0.0;
        }
        if let Some(narrowed) = crate::range::intersect(rate_range, real_rate_range) {
            rate_range = narrowed;
        } else {
            return 0.0;
        }
    }

    // Left/right envelope bounds are always relative to the outer bounds,
    // never the narrowed rate_range — only the nested conditional
    // probability below uses the narrowed range.
    let side_min_pred = rates::predicted_price(scaled_min, ctx.buy) - 1.0;
    let side_max_pred = rates::predicted_price(scaled_max, ctx.buy) - 1.0;

    for obs in [obs_left, obs_right] {
        if is_missing(obs) {
            continue;
        }
        if !accepts_fudge(obs, side_min_pred, side_max_pred, ctx.fudge) {
            return 0.0;
        }
        let clamped = obs.max(side_min_pred).min(side_max_pred);
        let adjusted = clamped + 1.0;
        let rate2_range = [
            rates::min_rate(adjusted, ctx.buy),
            rates::max_rate(adjusted, ctx.buy),
        ];

        let a = rate_range[0];
        let b = rate_range[1];
        let c = scaled_min;
        let z1 = a - c;
        let z2 = b - c;

        let f = |t: f64, z: f64| -> f64 {
            if t <= 0.0 {
                0.0
            } else if z < t {
                z
            } else {
                t - t * (t.ln() - z.ln())
            }
        };
        let p_y = |x: f64| -> f64 { (f(x - c, z2) - f(x - c, z1)) / (z2 - z1) };

        let contribution = p_y(rate2_range[1]) - p_y(rate2_range[0]);
        prob *= contribution;
        if prob <= 0.0 {
            return 0.0;
        }
    }

    // Emission, in forward slot order, always against the outer envelope.
    let left_mm = if is_missing(obs_left) {
        MinMax::range(side_min_pred as i64, side_max_pred as i64)
    } else {
        MinMax::exact(obs_left as i64)
    };
    ctx.predicted_prices.push(left_mm);

    let middle_mm = if is_missing(obs_middle) {
        MinMax::range(left_mm.min, mid_max_pred as i64)
    } else {
        MinMax::exact(obs_middle as i64)
    };
    ctx.predicted_prices.push(middle_mm);

    let right_mm = if is_missing(obs_right) {
        MinMax::range(side_min_pred as i64, middle_mm.max - 1)
    } else {
        MinMax::exact(obs_right as i64)
    };
    ctx.predicted_prices.push(right_mm);

    prob
}

/// `bands.len()` consecutive slots, each an independent i.i.d. draw from its
/// own fixed `(rate_min, rate_max)` band.
pub fn fixed_bands(start: usize, bands: &[(f64, f64)], ctx: &mut PhaseContext) -> f64 {
    let mut prob = 1.0;
    for (i, &(lo, hi)) in bands.iter().enumerate() {
        prob *= individual_random(start + i, 1, lo, hi, ctx);
        if prob <= 0.0 {
            return 0.0;
        }
    }
    prob
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with<'a>(
        buy: f64,
        fudge: i64,
        observations: &'a [f64; 14],
        predicted_prices: &'a mut Vec<MinMax>,
    ) -> PhaseContext<'a> {
        PhaseContext {
            buy,
            fudge,
            observations,
            predicted_prices,
        }
    }

    #[test]
    fn individual_random_all_missing_has_probability_one() {
        let obs = [f64::NAN; 14];
        let mut predicted = Vec::new();
        let mut ctx = ctx_with(100.0, 0, &obs, &mut predicted);
        let prob = individual_random(2, 3, 0.9, 1.4, &mut ctx);
        assert_eq!(prob, 1.0);
        assert_eq!(predicted.len(), 3);
        for mm in &predicted {
            assert!(mm.min <= mm.max);
        }
    }

    #[test]
    fn individual_random_rejects_impossible_observation() {
        let mut obs = [f64::NAN; 14];
        obs[2] = 999.0;
        let mut predicted = Vec::new();
        let mut ctx = ctx_with(100.0, 0, &obs, &mut predicted);
        let prob = individual_random(2, 1, 0.9, 1.4, &mut ctx);
        assert_eq!(prob, 0.0);
    }

    #[test]
    fn individual_random_accepts_plausible_observation() {
        let mut obs = [f64::NAN; 14];
        obs[2] = 120.0;
        let mut predicted = Vec::new();
        let mut ctx = ctx_with(100.0, 0, &obs, &mut predicted);
        let prob = individual_random(2, 1, 0.9, 1.4, &mut ctx);
        assert!(prob > 0.0);
        assert_eq!(predicted[0], MinMax::exact(120));
    }

    #[test]
    fn decreasing_random_all_missing_has_probability_one() {
        let obs = [f64::NAN; 14];
        let mut predicted = Vec::new();
        let mut ctx = ctx_with(100.0, 0, &obs, &mut predicted);
        let prob = decreasing_random(2, 5, 0.6, 0.8, 0.04, 0.10, &mut ctx);
        assert_eq!(prob, 1.0);
        assert_eq!(predicted.len(), 5);
    }

    #[test]
    fn decreasing_random_rejects_rising_observation() {
        let mut obs = [f64::NAN; 14];
        obs[2] = 60.0;
        obs[3] = 90.0; // rate can't go back up under a pure decay
        let mut predicted = Vec::new();
        let mut ctx = ctx_with(100.0, 0, &obs, &mut predicted);
        let prob = decreasing_random(2, 2, 0.6, 0.8, 0.04, 0.10, &mut ctx);
        assert_eq!(prob, 0.0);
    }

    #[test]
    fn peak_all_missing_has_probability_one() {
        let obs = [f64::NAN; 14];
        let mut predicted = Vec::new();
        let mut ctx = ctx_with(100.0, 0, &obs, &mut predicted);
        let prob = peak(2, 1.4, 2.0, &mut ctx);
        assert_eq!(prob, 1.0);
        assert_eq!(predicted.len(), 3);
        assert!(predicted[0].min <= predicted[1].min);
    }

    #[test]
    fn peak_with_middle_observed_narrows_and_emits() {
        let mut obs = [f64::NAN; 14];
        obs[3] = 180.0; // middle slot
        let mut predicted = Vec::new();
        let mut ctx = ctx_with(100.0, 0, &obs, &mut predicted);
        let prob = peak(2, 1.4, 2.0, &mut ctx);
        assert!(prob > 0.0);
        assert_eq!(predicted[1], MinMax::exact(180));
    }
}
