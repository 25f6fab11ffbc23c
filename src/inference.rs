//! The inference driver: fudge-factor escalation, first-buy-price
//! enumeration, transition-prior weighting, normalization, ranking, and
//! week/category aggregation.

use rayon::prelude::*;

use crate::compensated_sum::sum;
use crate::observation::ObservationRow;
use crate::pattern::{MinMax, Pattern, PredictionResult, BUY_PRICE_MAX, BUY_PRICE_MIN, FUDGE_FACTOR_MAX};
use crate::patterns;

struct RawScenario {
    pattern: Pattern,
    prices: [MinMax; 14],
    probability: f64,
}

fn push_all_patterns(
    observations: &ObservationRow,
    buy: f64,
    fudge: i64,
    weights: &[f64; 4],
    raw: &mut Vec<RawScenario>,
) {
    for s in patterns::fluctuating(observations.slots(), buy, fudge) {
        raw.push(RawScenario {
            pattern: Pattern::Fluctuating,
            prices: s.prices,
            probability: s.probability * weights[0],
        });
    }
    for s in patterns::large_spike(observations.slots(), buy, fudge) {
        raw.push(RawScenario {
            pattern: Pattern::LargeSpike,
            prices: s.prices,
            probability: s.probability * weights[1],
        });
    }
    for s in patterns::decreasing(observations.slots(), buy, fudge) {
        raw.push(RawScenario {
            pattern: Pattern::Decreasing,
            prices: s.prices,
            probability: s.probability * weights[2],
        });
    }
    for s in patterns::small_spike(observations.slots(), buy, fudge) {
        raw.push(RawScenario {
            pattern: Pattern::SmallSpike,
            prices: s.prices,
            probability: s.probability * weights[3],
        });
    }
}

/// Materializes every scenario consistent with `observations` at a given
/// fudge factor. Enumerates buy-price candidates in parallel (mirroring how
/// the teacher's sweep engine parallelizes over parameter grids) whenever
/// the buy price itself is a hidden variable.
fn materialize(
    observations: &ObservationRow,
    first_buy: bool,
    previous_pattern: Option<Pattern>,
    fudge: i64,
) -> Vec<RawScenario> {
    let needs_buy_enumeration = first_buy || observations.buy_price().is_none();

    if !needs_buy_enumeration {
        let buy = observations.buy_price().expect("buy price present");
        let weights = Pattern::transition_row(previous_pattern);
        let mut raw = Vec::new();
        push_all_patterns(observations, buy, fudge, &weights, &mut raw);
        return raw;
    }

    (BUY_PRICE_MIN..=BUY_PRICE_MAX)
        .into_par_iter()
        .flat_map(|buy_i| {
            let buy = buy_i as f64;
            let candidate = observations.with_buy(buy);
            let mut local = Vec::new();
            if first_buy {
                // First-week promotional constraint: only Pattern 3, with no
                // transition-prior weighting at all (previous_pattern is
                // ignored verbatim, per the source this was distilled from).
                for s in patterns::small_spike(candidate.slots(), buy, fudge) {
                    local.push(RawScenario {
                        pattern: Pattern::SmallSpike,
                        prices: s.prices,
                        probability: s.probability,
                    });
                }
            } else {
                let weights = Pattern::transition_row(previous_pattern);
                push_all_patterns(&candidate, buy, fudge, &weights, &mut local);
            }
            local
        })
        .collect()
}

/// Walks `prices[2..]` collecting unresolved `(min, max)` ranges; a scalar
/// slot (an observation) discards whatever ranges were accumulated before
/// it, since it means the trailing prefix before it is stale. If no ranges
/// survive the walk, the final slot's own `(min, max)` is used.
fn week_aggregate(prices: &[MinMax; 14]) -> (i64, i64) {
    let mut collected: Vec<MinMax> = Vec::new();
    for mm in &prices[2..] {
        if mm.min == mm.max {
            collected.clear();
        } else {
            collected.push(*mm);
        }
    }
    if collected.is_empty() {
        let last = prices[13];
        (last.min, last.max)
    } else {
        let gmin = collected.iter().map(|m| m.min).max().unwrap();
        let gmax = collected.iter().map(|m| m.max).max().unwrap();
        (gmin, gmax)
    }
}

fn all_row(results: &[PredictionResult]) -> PredictionResult {
    let mut prices = [MinMax { min: 999, max: 0 }; 14];
    let mut week_min = 999i64;
    let mut week_max = 0i64;
    for r in results {
        for i in 0..14 {
            prices[i].min = prices[i].min.min(r.prices[i].min);
            prices[i].max = prices[i].max.max(r.prices[i].max);
        }
        week_min = week_min.min(r.week_guaranteed_minimum);
        week_max = week_max.max(r.week_max);
    }
    PredictionResult {
        pattern_number: Pattern::All.index() as u8,
        pattern_name: Pattern::All.name(),
        prices,
        probability: 0.0,
        week_guaranteed_minimum: week_min,
        week_max,
        category_total_probability: 0.0,
    }
}

fn finalize(raw: Vec<RawScenario>) -> Vec<PredictionResult> {
    if raw.is_empty() {
        return Vec::new();
    }

    let probabilities: Vec<f64> = raw.iter().map(|r| r.probability).collect();
    let total = sum(&probabilities);

    let mut category_totals = [0.0f64; 4];
    let mut results: Vec<PredictionResult> = raw
        .iter()
        .map(|r| {
            let probability = if total > 0.0 {
                r.probability / total
            } else {
                r.probability
            };
            category_totals[r.pattern.index()] += probability;
            let (week_guaranteed_minimum, week_max) = week_aggregate(&r.prices);
            PredictionResult {
                pattern_number: r.pattern.index() as u8,
                pattern_name: r.pattern.name(),
                prices: r.prices,
                probability,
                week_guaranteed_minimum,
                week_max,
                category_total_probability: 0.0,
            }
        })
        .collect();

    for res in results.iter_mut() {
        res.category_total_probability = category_totals[res.pattern_number as usize];
    }

    results.sort_by(|a, b| {
        b.category_total_probability
            .partial_cmp(&a.category_total_probability)
            .unwrap()
            .then_with(|| b.probability.partial_cmp(&a.probability).unwrap())
    });

    let all = all_row(&results);
    let mut out = Vec::with_capacity(results.len() + 1);
    out.push(all);
    out.extend(results);
    out
}

/// Entry point: enumerates every internally-consistent generative scenario
/// for `observations`, escalating the fudge factor from 0 to 5 until at
/// least one scenario survives, then normalizes, ranks, and prepends the
/// `ALL` aggregate row.
pub fn analyze_possibilities(
    observations: &ObservationRow,
    first_buy: bool,
    previous_pattern: Option<Pattern>,
) -> Vec<PredictionResult> {
    let mut raw = Vec::new();
    for fudge in 0..=FUDGE_FACTOR_MAX {
        raw = materialize(observations, first_buy, previous_pattern, fudge);
        if !raw.is_empty() {
            break;
        }
    }
    finalize(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::MISSING;

    fn all_missing() -> ObservationRow {
        ObservationRow::new([MISSING; 14]).unwrap()
    }

    #[test]
    fn week_aggregate_uses_final_slot_when_no_ranges_survive() {
        let mut prices = [MinMax::exact(100); 14];
        prices[13] = MinMax::exact(150);
        let (min, max) = week_aggregate(&prices);
        assert_eq!((min, max), (150, 150));
    }

    #[test]
    fn week_aggregate_collects_trailing_ranges() {
        let mut prices = [MinMax::exact(100); 14];
        prices[10] = MinMax::range(80, 120);
        prices[11] = MinMax::range(90, 140);
        prices[12] = MinMax::range(70, 160);
        prices[13] = MinMax::range(60, 130);
        let (min, max) = week_aggregate(&prices);
        assert_eq!(min, 90); // max of mins: 80,90,70,60 -> 90
        assert_eq!(max, 160); // max of maxes: 120,140,160,130 -> 160
    }

    #[test]
    fn week_aggregate_multiple_resets_keeps_only_last_run() {
        let mut prices = [MinMax::exact(100); 14];
        prices[2] = MinMax::range(10, 20); // stale range, discarded by the scalar below
        prices[3] = MinMax::exact(15);
        prices[4] = MinMax::range(200, 300); // the run that survives
        prices[5] = MinMax::range(210, 320);
        let (min, max) = week_aggregate(&prices);
        assert_eq!(min, 210);
        assert_eq!(max, 320);
    }

    #[test]
    fn all_observations_missing_yields_all_four_patterns() {
        let obs = all_missing();
        let results = analyze_possibilities(&obs, false, None);
        assert_eq!(results[0].pattern_name, "ALL");
        let patterns: std::collections::HashSet<_> =
            results[1..].iter().map(|r| r.pattern_number).collect();
        assert_eq!(patterns.len(), 4);
    }

    #[test]
    fn first_buy_yields_only_small_spike() {
        let obs = all_missing();
        let results = analyze_possibilities(&obs, true, None);
        for r in &results[1..] {
            assert_eq!(r.pattern_number, Pattern::SmallSpike.index() as u8);
        }
    }

    #[test]
    fn probabilities_normalize_to_one() {
        let obs = all_missing();
        let results = analyze_possibilities(&obs, false, None);
        let total: f64 = results[1..].iter().map(|r| r.probability).sum();
        assert!((total - 1.0).abs() < 1e-9, "total = {}", total);
    }

    #[test]
    fn category_total_equals_sum_of_member_probabilities() {
        let obs = all_missing();
        let results = analyze_possibilities(&obs, false, None);
        for pattern in Pattern::ACTIVE {
            let members_total: f64 = results[1..]
                .iter()
                .filter(|r| r.pattern_number == pattern.index() as u8)
                .map(|r| r.probability)
                .sum();
            let stamped = results[1..]
                .iter()
                .find(|r| r.pattern_number == pattern.index() as u8)
                .map(|r| r.category_total_probability)
                .unwrap_or(0.0);
            assert!((members_total - stamped).abs() < 1e-9);
        }
    }

    #[test]
    fn sort_order_is_non_increasing_by_category_then_probability() {
        let obs = all_missing();
        let results = analyze_possibilities(&obs, false, None);
        for pair in results[1..].windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.category_total_probability > b.category_total_probability
                    || (a.category_total_probability == b.category_total_probability
                        && a.probability >= b.probability)
            );
        }
    }

    #[test]
    fn impossible_single_observation_escalates_to_fudge_five_then_gives_up() {
        let mut slots = [MISSING; 14];
        slots[0] = 100.0;
        slots[1] = 100.0;
        slots[2] = 999.0; // unreachable under any pattern even with fudge 5
        let obs = ObservationRow::new(slots).unwrap();
        let results = analyze_possibilities(&obs, false, None);
        assert!(results.is_empty());
    }

    #[test]
    fn decreasing_only_match_survives_with_observed_prefix() {
        let mut slots = [MISSING; 14];
        slots[0] = 100.0;
        slots[1] = 100.0;
        slots[2] = 200.0; // refutes DECREASING's tighter 0.85..0.9 start band... see below
        let obs = ObservationRow::new(slots).unwrap();
        let results = analyze_possibilities(&obs, false, None);
        // slot2=200 refutes DECREASING (whose start band tops out well below
        // 200) but is within FLUCTUATING/LARGE_SPIKE/SMALL_SPIKE's wider
        // 0.9..1.4 opening bands, so DECREASING drops out of the mix.
        let has_decreasing = results[1..]
            .iter()
            .any(|r| r.pattern_number == Pattern::Decreasing.index() as u8);
        assert!(!has_decreasing);
    }
}
