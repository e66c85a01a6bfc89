//! Tail probabilities for the test statistics.
//!
//! Only the two distributions the tests need: the standard normal (for the
//! signed-rank z statistic) and chi-squared with one degree of freedom (for
//! McNemar). Both reduce to the complementary error function, approximated
//! with the Abramowitz and Stegun 7.1.26 polynomial (absolute error below
//! 1.5e-7, far finer than the four decimals the reports carry).

/// Complementary error function.
pub(crate) fn erfc(x: f64) -> f64 {
    if x < 0.0 {
        return 2.0 - erfc(-x);
    }

    const P: f64 = 0.327_591_1;
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;

    let t = 1.0 / (1.0 + P * x);
    let poly = t * (A1 + t * (A2 + t * (A3 + t * (A4 + t * A5))));
    poly * (-x * x).exp()
}

/// Two-sided p-value for a standard normal statistic.
pub(crate) fn normal_two_sided_p(z: f64) -> f64 {
    erfc(z.abs() / std::f64::consts::SQRT_2)
}

/// Survival function of chi-squared with one degree of freedom.
///
/// A chi-squared(1) variable is the square of a standard normal, so the
/// upper tail is the two-sided normal tail at sqrt(x).
pub(crate) fn chi_squared_sf_1df(x: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    erfc((x / 2.0).sqrt())
}
