//! The four top-level pattern generators. Each enumerates its hidden
//! discrete parameters, composes phase generators over the 14-slot week,
//! and yields `(prices, probability)` scenarios in deterministic
//! lexicographic order over hidden parameters (outer loop = earliest
//! declared parameter).

use crate::pattern::MinMax;
use crate::phases::{self, PhaseContext};

/// One fully-enumerated hidden-parameter assignment for a pattern, before
/// the driver applies the transition-matrix prior.
#[derive(Debug, Clone)]
pub struct PatternScenario {
    pub prices: [MinMax; 14],
    pub probability: f64,
}

fn seed_buy_slots(buy: f64) -> Vec<MinMax> {
    let mm = MinMax::exact(buy.round() as i64);
    vec![mm, mm]
}

fn finish(predicted_prices: Vec<MinMax>, probability: f64, out: &mut Vec<PatternScenario>) {
    debug_assert_eq!(predicted_prices.len(), 14);
    let prices: [MinMax; 14] = predicted_prices
        .try_into()
        .expect("pattern generators must fill exactly 14 slots");
    out.push(PatternScenario { prices, probability });
}

/// Pattern 0 — FLUCTUATING: high1, dec1, high2, dec2, high3.
pub fn fluctuating(observations: &[f64; 14], buy: f64, fudge: i64) -> Vec<PatternScenario> {
    let mut out = Vec::new();

    for dec1_len in 2..=3usize {
        for high1_len in 0..=6usize {
            for high3_len in 0..=(6 - high1_len) {
                let high2_len = 7 - high1_len - high3_len;
                let dec2_len = 5 - dec1_len;
                debug_assert_eq!(high1_len + dec1_len + high2_len + dec2_len + high3_len, 12);

                let prior = 1.0 / (2.0 * 7.0 * (7 - high1_len) as f64);
                let mut predicted_prices = seed_buy_slots(buy);
                let mut ctx = PhaseContext {
                    buy,
                    fudge,
                    observations,
                    predicted_prices: &mut predicted_prices,
                };

                let mut slot = 2usize;
                let mut prob = prior;

                prob *= phases::individual_random(slot, high1_len, 0.9, 1.4, &mut ctx);
                slot += high1_len;
                if prob <= 0.0 {
                    continue;
                }

                prob *= phases::decreasing_random(slot, dec1_len, 0.6, 0.8, 0.04, 0.10, &mut ctx);
                slot += dec1_len;
                if prob <= 0.0 {
                    continue;
                }

                prob *= phases::individual_random(slot, high2_len, 0.9, 1.4, &mut ctx);
                slot += high2_len;
                if prob <= 0.0 {
                    continue;
                }

                prob *= phases::decreasing_random(slot, dec2_len, 0.6, 0.8, 0.04, 0.10, &mut ctx);
                slot += dec2_len;
                if prob <= 0.0 {
                    continue;
                }

                prob *= phases::individual_random(slot, high3_len, 0.9, 1.4, &mut ctx);
                slot += high3_len;
                if prob <= 0.0 {
                    continue;
                }

                debug_assert_eq!(slot, 14);
                finish(predicted_prices, prob, &mut out);
            }
        }
    }

    out
}

const LARGE_SPIKE_BANDS: [(f64, f64); 5] = [
    (0.9, 1.4),
    (1.4, 2.0),
    (2.0, 6.0),
    (1.4, 2.0),
    (0.9, 1.4),
];

/// Pattern 1 — LARGE_SPIKE: decay, then a five-slot fixed-band spike, then
/// an i.i.d. tail.
pub fn large_spike(observations: &[f64; 14], buy: f64, fudge: i64) -> Vec<PatternScenario> {
    let mut out = Vec::new();

    for peak_start in 3..=9usize {
        let prior = 1.0 / 7.0;
        let decay_len = peak_start - 2;
        let fill_len = 9 - peak_start; // 14 - (peak_start + 5)

        let mut predicted_prices = seed_buy_slots(buy);
        let mut ctx = PhaseContext {
            buy,
            fudge,
            observations,
            predicted_prices: &mut predicted_prices,
        };

        let mut prob = prior;
        prob *= phases::decreasing_random(2, decay_len, 0.85, 0.9, 0.03, 0.05, &mut ctx);
        if prob <= 0.0 {
            continue;
        }

        prob *= phases::fixed_bands(peak_start, &LARGE_SPIKE_BANDS, &mut ctx);
        if prob <= 0.0 {
            continue;
        }

        prob *= phases::individual_random(peak_start + 5, fill_len, 0.4, 0.9, &mut ctx);
        if prob <= 0.0 {
            continue;
        }

        finish(predicted_prices, prob, &mut out);
    }

    out
}

/// Pattern 2 — DECREASING: a single decay over all twelve sell slots, no
/// hidden parameters.
pub fn decreasing(observations: &[f64; 14], buy: f64, fudge: i64) -> Vec<PatternScenario> {
    let mut predicted_prices = seed_buy_slots(buy);
    let mut ctx = PhaseContext {
        buy,
        fudge,
        observations,
        predicted_prices: &mut predicted_prices,
    };

    let prob = phases::decreasing_random(2, 12, 0.85, 0.9, 0.03, 0.05, &mut ctx);
    if prob <= 0.0 {
        return Vec::new();
    }

    let mut out = Vec::new();
    finish(predicted_prices, prob, &mut out);
    out
}

/// Pattern 3 — SMALL_SPIKE: decay, two i.i.d. slots, a three-slot peak,
/// then an optional trailing decay filling whatever's left.
pub fn small_spike(observations: &[f64; 14], buy: f64, fudge: i64) -> Vec<PatternScenario> {
    let mut out = Vec::new();

    for peak_start in 2..=9usize {
        let prior = 1.0 / 8.0;
        let decay1_len = peak_start - 2;
        let remaining = 9usize.saturating_sub(peak_start); // 14 - (peak_start + 5)

        let mut predicted_prices = seed_buy_slots(buy);
        let mut ctx = PhaseContext {
            buy,
            fudge,
            observations,
            predicted_prices: &mut predicted_prices,
        };

        let mut prob = prior;
        prob *= phases::decreasing_random(2, decay1_len, 0.4, 0.9, 0.03, 0.05, &mut ctx);
        if prob <= 0.0 {
            continue;
        }

        let mut slot = 2 + decay1_len;
        prob *= phases::individual_random(slot, 2, 0.9, 1.4, &mut ctx);
        slot += 2;
        if prob <= 0.0 {
            continue;
        }

        prob *= phases::peak(slot, 1.4, 2.0, &mut ctx);
        slot += 3;
        if prob <= 0.0 {
            continue;
        }

        if remaining > 0 {
            prob *= phases::decreasing_random(slot, remaining, 0.4, 0.9, 0.03, 0.05, &mut ctx);
            if prob <= 0.0 {
                continue;
            }
        }

        finish(predicted_prices, prob, &mut out);
    }

    out
}
