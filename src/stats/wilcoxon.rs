//! Wilcoxon signed-rank test for paired consistency scores.

use super::distributions::normal_two_sided_p;
use super::TestStatistic;

/// Two-sided Wilcoxon signed-rank test over paired observations.
///
/// Zero differences are dropped; tied magnitudes share their average rank.
/// The statistic is W = min(W+, W-) and the p-value comes from the
/// tie-corrected normal approximation, the same large-sample path the
/// reference implementations take at this study's sample sizes. Small
/// samples are therefore approximate rather than exact.
///
/// Degenerate inputs (no pairs, or all differences zero) report a statistic
/// of 0 with p = 1.0: no evidence of any shift.
pub fn wilcoxon_signed_rank(pairs: &[(f64, f64)]) -> TestStatistic {
    let diffs: Vec<f64> = pairs
        .iter()
        .map(|(a, b)| a - b)
        .filter(|d| *d != 0.0)
        .collect();

    let n = diffs.len();
    if n == 0 {
        return TestStatistic {
            statistic: 0.0,
            p_value: 1.0,
        };
    }

    let magnitudes: Vec<f64> = diffs.iter().map(|d| d.abs()).collect();
    let (ranks, tie_sum) = average_ranks(&magnitudes);

    let w_plus: f64 = diffs
        .iter()
        .zip(&ranks)
        .filter(|(d, _)| **d > 0.0)
        .map(|(_, rank)| rank)
        .sum();
    let w_minus: f64 = diffs
        .iter()
        .zip(&ranks)
        .filter(|(d, _)| **d < 0.0)
        .map(|(_, rank)| rank)
        .sum();
    let statistic = w_plus.min(w_minus);

    let nf = n as f64;
    let mean = nf * (nf + 1.0) / 4.0;
    let variance = nf * (nf + 1.0) * (2.0 * nf + 1.0) / 24.0 - tie_sum / 48.0;
    if variance <= 0.0 {
        return TestStatistic {
            statistic,
            p_value: 1.0,
        };
    }

    let z = (statistic - mean) / variance.sqrt();
    TestStatistic {
        statistic,
        p_value: normal_two_sided_p(z),
    }
}

/// Ranks (1-based, ties averaged) aligned to the input order, plus the tie
/// correction term sum of t^3 - t over tie groups.
fn average_ranks(values: &[f64]) -> (Vec<f64>, f64) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut tie_sum = 0.0;

    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start..end hold equal values; ranks are 1-based.
        let average = (start + end + 1) as f64 / 2.0;
        for &index in &order[start..end] {
            ranks[index] = average;
        }
        let t = (end - start) as f64;
        tie_sum += t * t * t - t;
        start = end;
    }

    (ranks, tie_sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_positive_tied_differences() {
        // Four differences of exactly +0.25; every magnitude rank ties at
        // 2.5, so W- = 0 and z = -2.0.
        let pairs = [(1.0, 0.75), (0.75, 0.5), (0.5, 0.25), (0.25, 0.0)];
        let result = wilcoxon_signed_rank(&pairs);
        assert_eq!(result.statistic, 0.0);
        assert!((result.p_value - 0.0455).abs() < 2e-3);
    }

    #[test]
    fn test_zero_differences_are_dropped() {
        // Differences +0.25, 0, +0.25, -0.25: the zero is discarded,
        // the rest tie in magnitude.
        let pairs = [(0.5, 0.25), (0.5, 0.5), (0.75, 0.5), (0.25, 0.5)];
        let result = wilcoxon_signed_rank(&pairs);
        assert_eq!(result.statistic, 2.0);
        assert!((result.p_value - 0.5637).abs() < 2e-3);
    }

    #[test]
    fn test_distinct_magnitudes() {
        // Differences 0.5, -0.25, 0.125, 1.0, 0.0625: ranks 4, 3, 2, 5, 1.
        let pairs = [
            (0.5, 0.0),
            (0.25, 0.5),
            (0.625, 0.5),
            (1.0, 0.0),
            (0.5625, 0.5),
        ];
        let result = wilcoxon_signed_rank(&pairs);
        assert_eq!(result.statistic, 3.0);
        assert!((result.p_value - 0.2249).abs() < 2e-3);
    }

    #[test]
    fn test_identical_samples() {
        let pairs = [(0.4, 0.4), (0.8, 0.8), (1.0, 1.0)];
        let result = wilcoxon_signed_rank(&pairs);
        assert_eq!(result.statistic, 0.0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_empty_input() {
        let result = wilcoxon_signed_rank(&[]);
        assert_eq!(result.statistic, 0.0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_symmetry_in_pair_order() {
        // Swapping the paired columns flips the signs but not W or p.
        let pairs = [(1.0, 0.75), (0.5, 0.75), (0.25, 0.0), (1.0, 0.5)];
        let swapped: Vec<(f64, f64)> = pairs.iter().map(|&(a, b)| (b, a)).collect();
        let forward = wilcoxon_signed_rank(&pairs);
        let backward = wilcoxon_signed_rank(&swapped);
        assert_eq!(forward.statistic, backward.statistic);
        assert!((forward.p_value - backward.p_value).abs() < 1e-12);
    }

    #[test]
    fn test_average_ranks() {
        let (ranks, tie_sum) = average_ranks(&[0.25, 0.25, 0.5, 0.125]);
        assert_eq!(ranks, vec![2.5, 2.5, 4.0, 1.0]);
        // One tie group of size 2: 2^3 - 2 = 6.
        assert_eq!(tie_sum, 6.0);
    }
}
