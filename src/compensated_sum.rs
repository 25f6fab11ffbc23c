//! Neumaier compensated summation.
//!
//! Plain floating-point summation loses precision when terms differ by many
//! orders of magnitude, which happens constantly once PDF bins get decayed
//! and renormalized a few times over. This is Neumaier's enhancement of
//! Kahan summation: it tracks a running correction term and folds it back in
//! at the end.

/// Compensated sum of `terms`.
pub fn sum(terms: &[f64]) -> f64 {
    let mut s = 0.0;
    let mut c = 0.0;
    for &cur in terms {
        let t = s + cur;
        if s.abs() >= cur.abs() {
            c += (s - t) + cur;
        } else {
            c += (cur - t) + s;
        }
        s = t;
    }
    s + c
}

/// Prefix sums of `terms`, as `(sum, correction)` pairs, one more entry than
/// `terms` (index 0 is `(0.0, 0.0)`, the empty prefix).
///
/// Keeping `sum` and `correction` separate at every step lets a caller
/// subtract two prefixes, `prefix[j] - prefix[i]`, compensated component by
/// component, to recover a compensated sum over an arbitrary sub-range in
/// O(1).
pub fn prefix_sum(terms: &[f64]) -> Vec<(f64, f64)> {
    let mut out = Vec::with_capacity(terms.len() + 1);
    out.push((0.0, 0.0));
    let mut s = 0.0;
    let mut c = 0.0;
    for &cur in terms {
        let t = s + cur;
        if s.abs() >= cur.abs() {
            c += (s - t) + cur;
        } else {
            c += (cur - t) + s;
        }
        s = t;
        out.push((s, c));
    }
    out
}

/// Compensated difference of two prefix-sum entries: `b - a` with both the
/// sum and correction components subtracted independently.
pub fn prefix_diff(a: (f64, f64), b: (f64, f64)) -> f64 {
    (b.0 - a.0) + (b.1 - a.1)
}
