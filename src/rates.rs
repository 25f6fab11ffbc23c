//! Scaled-rate arithmetic shared by the phase generators.
//!
//! Rates are multipliers on the buy price. Internally every PDF and phase
//! computation works in the scaled domain (`rate * RATE_MULTIPLIER`) so that
//! integer bin indices carry meaningful resolution; `int_ceil` reproduces the
//! reverse-engineered game's 32-bit float rounding bit-for-bit and must not
//! be replaced by `f64::ceil`.

pub const RATE_MULTIPLIER: f64 = 10000.0;

/// `trunc(x + 0.99999)`, not `ceil(x)` — matches the source game's rounding.
pub fn int_ceil(x: f64) -> f64 {
    (x + 0.99999).trunc()
}

/// Lower bound of the scaled-rate range consistent with observed price `p`
/// at buy price `b`.
pub fn min_rate(p: f64, b: f64) -> f64 {
    RATE_MULTIPLIER * (p - 0.99999) / b
}

/// Upper bound of the scaled-rate range consistent with observed price `p`
/// at buy price `b`.
pub fn max_rate(p: f64, b: f64) -> f64 {
    RATE_MULTIPLIER * (p + 0.00001) / b
}

/// Bin-ceil price predicted by a scaled `rate` at buy price `buy`.
pub fn predicted_price(rate: f64, buy: f64) -> f64 {
    int_ceil(rate * buy / RATE_MULTIPLIER)
}
