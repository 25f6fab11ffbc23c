//! The pattern enumeration, per-slot price envelopes, the scenario output
//! type, and the Bayesian transition prior over patterns.

use serde::Serialize;

/// One of the four generative regimes, plus the synthetic `All` tag used
/// only on the aggregated output row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Pattern {
    Fluctuating = 0,
    LargeSpike = 1,
    Decreasing = 2,
    SmallSpike = 3,
    All = 4,
}

impl Pattern {
    pub const ACTIVE: [Pattern; 4] = [
        Pattern::Fluctuating,
        Pattern::LargeSpike,
        Pattern::Decreasing,
        Pattern::SmallSpike,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Pattern::Fluctuating => "FLUCTUATING",
            Pattern::LargeSpike => "LARGE_SPIKE",
            Pattern::Decreasing => "DECREASING",
            Pattern::SmallSpike => "SMALL_SPIKE",
            Pattern::All => "ALL",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(i: u8) -> Option<Pattern> {
        match i {
            0 => Some(Pattern::Fluctuating),
            1 => Some(Pattern::LargeSpike),
            2 => Some(Pattern::Decreasing),
            3 => Some(Pattern::SmallSpike),
            _ => None,
        }
    }

    /// Prior over this week's pattern given last week's. Falls back to the
    /// steady-state row whenever `previous` is unknown or out of range.
    pub fn transition_row(previous: Option<Pattern>) -> [f64; 4] {
        match previous {
            Some(p) if p.index() < 4 => PROBABILITY_MATRIX[p.index()],
            _ => STEADY_STATE_ROW,
        }
    }
}

/// An inclusive price range for one slot. `min == max` means the slot was
/// observed (or pinned to a fudge-clamped observation); `min < max` means
/// the slot is an unresolved prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MinMax {
    pub min: i64,
    pub max: i64,
}

impl MinMax {
    pub fn exact(v: i64) -> Self {
        MinMax { min: v, max: v }
    }

    pub fn range(min: i64, max: i64) -> Self {
        debug_assert!(min <= max);
        MinMax { min, max }
    }
}

/// One fully-specified scenario: a pattern, its hidden-parameter
/// assignment folded into a per-slot envelope, and its posterior
/// probability.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub pattern_number: u8,
    pub pattern_name: &'static str,
    pub prices: [MinMax; 14],
    pub probability: f64,
    pub week_guaranteed_minimum: i64,
    pub week_max: i64,
    pub category_total_probability: f64,
}

/// Row-stochastic 4x4 transition matrix, rows indexed by last week's
/// pattern, columns by this week's.
pub const PROBABILITY_MATRIX: [[f64; 4]; 4] = [
    [0.20, 0.30, 0.15, 0.35],
    [0.50, 0.05, 0.20, 0.25],
    [0.25, 0.45, 0.05, 0.25],
    [0.45, 0.25, 0.15, 0.15],
];

/// Prior used when last week's pattern is unknown.
pub const STEADY_STATE_ROW: [f64; 4] = [
    4530.0 / 13082.0,
    3236.0 / 13082.0,
    1931.0 / 13082.0,
    3385.0 / 13082.0,
];

pub const BUY_PRICE_MIN: i64 = 90;
pub const BUY_PRICE_MAX: i64 = 110;
pub const FUDGE_FACTOR_MAX: i64 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_row_falls_back_to_steady_state() {
        assert_eq!(Pattern::transition_row(None), STEADY_STATE_ROW);
    }

    #[test]
    fn transition_row_indexes_matrix_rows() {
        assert_eq!(
            Pattern::transition_row(Some(Pattern::SmallSpike)),
            PROBABILITY_MATRIX[3]
        );
    }

    #[test]
    fn probability_matrix_rows_sum_to_one() {
        for row in PROBABILITY_MATRIX {
            let total: f64 = row.iter().sum();
            assert!((total - 1.0).abs() < 1e-12);
        }
        let steady_total: f64 = STEADY_STATE_ROW.iter().sum();
        assert!((steady_total - 1.0).abs() < 1e-9);
    }
}
