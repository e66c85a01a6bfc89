//! McNemar's test for paired correctness outcomes.

use super::distributions::chi_squared_sf_1df;
use super::TestStatistic;

/// McNemar's test with continuity correction over paired binary outcomes.
///
/// Only discordant pairs carry information: `b` counts questions the first
/// model got right and the second wrong, `c` the reverse. The statistic is
/// (|b - c| - 1)^2 / (b + c) against chi-squared with one degree of
/// freedom. With no discordant pairs at all the models are
/// indistinguishable and the result is statistic 0, p = 1.0.
pub fn mcnemar(pairs: &[(bool, bool)]) -> TestStatistic {
    let b = pairs.iter().filter(|(a, o)| *a && !*o).count() as f64;
    let c = pairs.iter().filter(|(a, o)| !*a && *o).count() as f64;

    if b + c == 0.0 {
        return TestStatistic {
            statistic: 0.0,
            p_value: 1.0,
        };
    }

    let statistic = ((b - c).abs() - 1.0).powi(2) / (b + c);
    TestStatistic {
        statistic,
        p_value: chi_squared_sf_1df(statistic),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discordant(b: usize, c: usize, concordant: usize) -> Vec<(bool, bool)> {
        let mut pairs = Vec::new();
        pairs.extend(std::iter::repeat_n((true, false), b));
        pairs.extend(std::iter::repeat_n((false, true), c));
        pairs.extend(std::iter::repeat_n((true, true), concordant));
        pairs
    }

    #[test]
    fn test_clear_asymmetry() {
        // b = 15, c = 5: chi2 = (10 - 1)^2 / 20 = 4.05.
        let result = mcnemar(&discordant(15, 5, 80));
        assert!((result.statistic - 4.05).abs() < 1e-12);
        assert!((result.p_value - 0.0442).abs() < 2e-3);
    }

    #[test]
    fn test_balanced_discordance() {
        // b = c = 1: the continuity correction still gives chi2 = 0.5.
        let result = mcnemar(&discordant(1, 1, 10));
        assert!((result.statistic - 0.5).abs() < 1e-12);
        assert!((result.p_value - 0.4795).abs() < 2e-3);
    }

    #[test]
    fn test_no_discordant_pairs() {
        let result = mcnemar(&discordant(0, 0, 50));
        assert_eq!(result.statistic, 0.0);
        assert_eq!(result.p_value, 1.0);

        let result = mcnemar(&[]);
        assert_eq!(result.statistic, 0.0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_concordant_pairs_do_not_matter() {
        let few = mcnemar(&discordant(8, 2, 0));
        let many = mcnemar(&discordant(8, 2, 500));
        assert_eq!(few.statistic, many.statistic);
        assert_eq!(few.p_value, many.p_value);
    }

    #[test]
    fn test_direction_symmetric() {
        let forward = mcnemar(&discordant(12, 3, 40));
        let backward = mcnemar(&discordant(3, 12, 40));
        assert_eq!(forward.statistic, backward.statistic);
        assert_eq!(forward.p_value, backward.p_value);
    }
}
