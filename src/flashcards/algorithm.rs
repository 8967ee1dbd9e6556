//! FSRS memory model
//!
//! Implementation of the FSRS-5 formulas used to update a card's
//! difficulty (D) and stability (S) and to derive its retrievability (R):
//!
//! - `R(t, S) = (1 + F * t / S) ^ C` with `C = -0.5`, `F = 19 / 81`,
//!   so that `R(S, S) = 0.9`
//! - `S0(G) = w[G-1]`, `D0(G) = w4 - e^(w5 * (G - 1)) + 1`
//! - `D' = w7 * D0(Easy) + (1 - w7) * (D - w6 * (G - 3) * (10 - D) / 9)`
//! - recall: `S' = S * (1 + e^w8 * (11 - D) * S^-w9 * (e^(w10 * (1 - R)) - 1) * h * b)`
//! - lapse: `S' = min(w11 * D^-w12 * ((S + 1)^w13 - 1) * e^(w14 * (1 - R)), S / e^(w17 * w18))`
//! - same day: `S' = S * e^(w17 * (G - 3 + w18))`
//!
//! Every function clamps its result into the valid domain, so no NaN or
//! infinity escapes even for malformed inputs.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::WEIGHT_COUNT;
use super::models::Rating;

/// Forgetting curve exponent
pub const DECAY: f64 = -0.5;
/// Forgetting curve scale, chosen so that `R(S, S) = 0.9`
pub const FACTOR: f64 = 19.0 / 81.0;

/// Smallest stability ever produced
pub const MIN_STABILITY: f64 = 0.01;
pub const MIN_DIFFICULTY: f64 = 1.0;
pub const MAX_DIFFICULTY: f64 = 10.0;

/// Intervals shorter than this are never fuzzed
const FUZZ_THRESHOLD: f64 = 2.5;

/// (start, end, factor) bands used to size the fuzz window
const FUZZ_RANGES: [(f64, f64, f64); 3] = [
    (2.5, 7.0, 0.15),
    (7.0, 20.0, 0.1),
    (20.0, f64::INFINITY, 0.05),
];

type Weights = [f64; WEIGHT_COUNT];

pub fn clamp_difficulty(difficulty: f64) -> f64 {
    if difficulty.is_nan() {
        return MIN_DIFFICULTY;
    }
    difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

pub fn clamp_stability(stability: f64) -> f64 {
    if stability.is_nan() {
        return MIN_STABILITY;
    }
    stability.clamp(MIN_STABILITY, f64::MAX)
}

/// Probability of recall after `elapsed_days` for a card of `stability`
pub fn retrievability(elapsed_days: f64, stability: f64) -> f64 {
    if elapsed_days.is_nan() || elapsed_days <= 0.0 {
        return 1.0;
    }
    let stability = clamp_stability(stability);
    (1.0 + FACTOR * elapsed_days / stability).powf(DECAY)
}

/// Seed stability for a card's first review
pub fn init_stability(w: &Weights, rating: Rating) -> f64 {
    let index = usize::from(rating.value() - 1);
    clamp_stability(w[index])
}

/// Seed difficulty for a card's first review
pub fn init_difficulty(w: &Weights, rating: Rating) -> f64 {
    clamp_difficulty(w[4] - (w[5] * (rating.grade() - 1.0)).exp() + 1.0)
}

/// Difficulty after a review: rating delta with linear damping toward 10,
/// then mean reversion toward the Easy seed
pub fn next_difficulty(w: &Weights, difficulty: f64, rating: Rating) -> f64 {
    let difficulty = clamp_difficulty(difficulty);
    let delta = -w[6] * (rating.grade() - 3.0);
    let damped = difficulty + delta * (MAX_DIFFICULTY - difficulty) / 9.0;
    let target = init_difficulty(w, Rating::Easy);
    clamp_difficulty(w[7] * target + (1.0 - w[7]) * damped)
}

/// Stability after a successful recall (Hard, Good or Easy)
pub fn next_recall_stability(
    w: &Weights,
    difficulty: f64,
    stability: f64,
    retrievability: f64,
    rating: Rating,
) -> f64 {
    let difficulty = clamp_difficulty(difficulty);
    let stability = clamp_stability(stability);

    let hard_penalty = if rating == Rating::Hard { w[15] } else { 1.0 };
    let easy_bonus = if rating == Rating::Easy { w[16] } else { 1.0 };

    let growth = w[8].exp()
        * (11.0 - difficulty)
        * stability.powf(-w[9])
        * ((w[10] * (1.0 - retrievability)).exp() - 1.0)
        * hard_penalty
        * easy_bonus;

    clamp_stability(stability * (1.0 + growth))
}

/// Stability after a lapse, never above the down-weighted prior stability
pub fn next_forget_stability(
    w: &Weights,
    difficulty: f64,
    stability: f64,
    retrievability: f64,
) -> f64 {
    let difficulty = clamp_difficulty(difficulty);
    let stability = clamp_stability(stability);

    let forget = w[11]
        * difficulty.powf(-w[12])
        * ((stability + 1.0).powf(w[13]) - 1.0)
        * (w[14] * (1.0 - retrievability)).exp();
    let ceiling = stability / (w[17] * w[18]).exp();

    clamp_stability(forget.min(ceiling))
}

/// Stability after a review on the same day as the previous one
pub fn next_short_term_stability(w: &Weights, stability: f64, rating: Rating) -> f64 {
    let stability = clamp_stability(stability);
    let mut increase = (w[17] * (rating.grade() - 3.0 + w[18])).exp();
    if rating >= Rating::Good {
        increase = increase.max(1.0);
    }
    clamp_stability(stability * increase)
}

/// Whole-day interval at which predicted retrievability falls to
/// `request_retention`, clamped to `[1, maximum_interval]`
pub fn next_interval(stability: f64, request_retention: f64, maximum_interval: u32) -> u32 {
    let stability = clamp_stability(stability);
    let maximum = f64::from(maximum_interval.max(1));

    let raw = stability / FACTOR * (request_retention.powf(1.0 / DECAY) - 1.0);
    // f64::round rounds ties away from zero, i.e. up for positive intervals
    let days = raw.round();
    if days.is_nan() {
        return 1;
    }
    days.clamp(1.0, maximum) as u32
}

/// Inclusive window an interval may be fuzzed into
pub fn fuzz_range(interval: u32, elapsed_days: u32, maximum_interval: u32) -> (u32, u32) {
    let interval = f64::from(interval);
    let maximum = f64::from(maximum_interval.max(1));

    let mut delta = 1.0;
    for (start, end, factor) in FUZZ_RANGES {
        delta += factor * (interval.min(end) - start).max(0.0);
    }

    let interval = interval.min(maximum);
    let mut min_ivl = (interval - delta).round().max(2.0);
    let max_ivl = (interval + delta).round().min(maximum);
    if interval > f64::from(elapsed_days) {
        min_ivl = min_ivl.max(f64::from(elapsed_days) + 1.0);
    }
    let min_ivl = min_ivl.min(max_ivl);

    (min_ivl as u32, max_ivl as u32)
}

/// Spread an interval inside its fuzz window using a seeded generator
pub fn apply_fuzz(interval: u32, elapsed_days: u32, maximum_interval: u32, seed: u64) -> u32 {
    if f64::from(interval) < FUZZ_THRESHOLD {
        return interval;
    }
    let (low, high) = fuzz_range(interval, elapsed_days, maximum_interval);
    let mut rng = StdRng::seed_from_u64(seed);
    rng.gen_range(low..=high)
}

/// Seed derived from the review inputs, so fuzzed results stay reproducible
pub fn fuzz_seed(now: DateTime<Utc>, reps: u32, difficulty: f64, stability: f64) -> u64 {
    let mut seed = now.timestamp_millis() as u64;
    seed = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15).wrapping_add(u64::from(reps));
    seed ^ (difficulty * stability).to_bits()
}

/// Format a duration as a short human-readable interval
pub fn format_interval(duration: Duration) -> String {
    let minutes = duration.num_minutes();
    if minutes < 1 {
        return "now".to_string();
    }
    if minutes < 60 {
        return format!("{}m", minutes);
    }
    let hours = duration.num_hours();
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = duration.num_days();
    if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flashcards::config::DEFAULT_WEIGHTS;
    use chrono::TimeZone;

    const W: &Weights = &DEFAULT_WEIGHTS;

    #[test]
    fn test_retrievability_at_zero() {
        assert_eq!(retrievability(0.0, 1.0), 1.0);
        assert_eq!(retrievability(0.0, 250.0), 1.0);
    }

    #[test]
    fn test_retrievability_at_stability_is_ninety_percent() {
        for s in [0.5, 3.0, 42.0, 900.0] {
            assert!((retrievability(s, s) - 0.9).abs() < 1e-10);
        }
    }

    #[test]
    fn test_retrievability_strictly_decreasing() {
        let mut previous = 1.0;
        for t in 1..200 {
            let r = retrievability(f64::from(t), 7.5);
            assert!(r > 0.0 && r < 1.0);
            assert!(r < previous);
            previous = r;
        }
    }

    #[test]
    fn test_retrievability_lower_for_lower_stability() {
        assert!(retrievability(10.0, 2.0) < retrievability(10.0, 20.0));
    }

    #[test]
    fn test_retrievability_handles_bad_stability() {
        let r = retrievability(3.0, -4.0);
        assert!(r > 0.0 && r < 1.0);
        let r = retrievability(3.0, f64::NAN);
        assert!(r.is_finite());
    }

    #[test]
    fn test_init_stability_increases_with_rating() {
        let values: Vec<f64> = Rating::ALL.iter().map(|&r| init_stability(W, r)).collect();
        assert!(values.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(values.iter().all(|&s| s > 0.0));
    }

    #[test]
    fn test_init_difficulty_decreases_with_rating() {
        let values: Vec<f64> = Rating::ALL.iter().map(|&r| init_difficulty(W, r)).collect();
        assert!(values.windows(2).all(|pair| pair[0] > pair[1]));
        assert!(values.iter().all(|&d| (1.0..=10.0).contains(&d)));
    }

    #[test]
    fn test_next_difficulty_direction() {
        assert!(next_difficulty(W, 5.0, Rating::Again) > 5.0);
        assert!(next_difficulty(W, 5.0, Rating::Easy) < 5.0);
    }

    #[test]
    fn test_difficulty_stays_in_bounds() {
        let mut d = init_difficulty(W, Rating::Again);
        for _ in 0..100 {
            d = next_difficulty(W, d, Rating::Again);
        }
        assert!(d <= MAX_DIFFICULTY);

        let mut d = init_difficulty(W, Rating::Easy);
        for _ in 0..100 {
            d = next_difficulty(W, d, Rating::Easy);
        }
        assert_eq!(d, MIN_DIFFICULTY);
    }

    #[test]
    fn test_recall_stability_grows_with_rating() {
        let r = retrievability(10.0, 10.0);
        let hard = next_recall_stability(W, 5.0, 10.0, r, Rating::Hard);
        let good = next_recall_stability(W, 5.0, 10.0, r, Rating::Good);
        let easy = next_recall_stability(W, 5.0, 10.0, r, Rating::Easy);
        assert!(10.0 < hard && hard < good && good < easy);
    }

    #[test]
    fn test_recall_gain_lower_when_retrievability_high() {
        let fresh = next_recall_stability(W, 5.0, 10.0, 0.97, Rating::Good);
        let faded = next_recall_stability(W, 5.0, 10.0, 0.7, Rating::Good);
        assert!(fresh < faded);
    }

    #[test]
    fn test_recall_relative_gain_shrinks_with_stability() {
        let r = 0.9;
        let low = next_recall_stability(W, 5.0, 5.0, r, Rating::Good) / 5.0;
        let high = next_recall_stability(W, 5.0, 500.0, r, Rating::Good) / 500.0;
        assert!(high < low);
    }

    #[test]
    fn test_forget_stability_below_previous() {
        for s in [0.5, 10.0, 365.0, 5000.0] {
            let r = retrievability(s, s);
            let next = next_forget_stability(W, 5.0, s, r);
            assert!(next < s, "lapse from {} gave {}", s, next);
            assert!(next >= MIN_STABILITY);
        }
    }

    #[test]
    fn test_short_term_stability() {
        let s = 3.0;
        assert!(next_short_term_stability(W, s, Rating::Again) < s);
        assert!(next_short_term_stability(W, s, Rating::Good) >= s);
        assert!(
            next_short_term_stability(W, s, Rating::Easy)
                > next_short_term_stability(W, s, Rating::Good)
        );
    }

    #[test]
    fn test_next_interval_matches_stability_at_ninety_percent() {
        assert_eq!(next_interval(5.0, 0.9, 36500), 5);
        assert_eq!(next_interval(37.4, 0.9, 36500), 37);
        assert_eq!(next_interval(37.6, 0.9, 36500), 38);
    }

    #[test]
    fn test_next_interval_clamped() {
        assert_eq!(next_interval(0.01, 0.9, 36500), 1);
        assert_eq!(next_interval(1e9, 0.9, 365), 365);
        assert_eq!(next_interval(f64::NAN, 0.9, 365), 1);
    }

    #[test]
    fn test_higher_retention_shortens_interval() {
        assert!(next_interval(100.0, 0.95, 36500) < next_interval(100.0, 0.8, 36500));
    }

    #[test]
    fn test_fuzz_skips_short_intervals() {
        assert_eq!(apply_fuzz(1, 0, 36500, 42), 1);
        assert_eq!(apply_fuzz(2, 0, 36500, 42), 2);
    }

    #[test]
    fn test_fuzz_within_range_and_deterministic() {
        for seed in 0..50 {
            let fuzzed = apply_fuzz(30, 25, 36500, seed);
            let (low, high) = fuzz_range(30, 25, 36500);
            assert!(low <= fuzzed && fuzzed <= high);
            assert_eq!(fuzzed, apply_fuzz(30, 25, 36500, seed));
        }
    }

    #[test]
    fn test_fuzz_range_respects_maximum() {
        let (low, high) = fuzz_range(100, 90, 100);
        assert!(high <= 100);
        assert!(low <= high);
    }

    #[test]
    fn test_fuzz_seed_depends_on_inputs() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let a = fuzz_seed(now, 3, 5.0, 10.0);
        assert_eq!(a, fuzz_seed(now, 3, 5.0, 10.0));
        assert_ne!(a, fuzz_seed(now, 4, 5.0, 10.0));
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(Duration::seconds(20)), "now");
        assert_eq!(format_interval(Duration::minutes(10)), "10m");
        assert_eq!(format_interval(Duration::hours(3)), "3h");
        assert_eq!(format_interval(Duration::days(1)), "1d");
        assert_eq!(format_interval(Duration::days(5)), "5d");
        assert_eq!(format_interval(Duration::days(7)), "1w");
        assert_eq!(format_interval(Duration::days(14)), "2w");
        assert_eq!(format_interval(Duration::days(30)), "1mo");
        assert_eq!(format_interval(Duration::days(90)), "3mo");
        assert_eq!(format_interval(Duration::days(365)), "1y");
        assert_eq!(format_interval(Duration::days(730)), "2y");
    }
}
