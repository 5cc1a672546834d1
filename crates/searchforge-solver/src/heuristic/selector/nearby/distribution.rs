//! Distributions over nearby ranks.
//!
//! Candidates are ranked by distance from the origin (rank 0 is the
//! nearest). A distribution draws a rank in `0..nearby_size`, biased toward
//! low ranks.

use rand::rngs::StdRng;
use rand::Rng;
use searchforge_core::{Result, SearchForgeError};

/// Rank distribution of nearby selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NearbyDistribution {
    /// Uniform over the first `size` ranks, where `size` is
    /// `nearby_size * size_ratio` clamped to `[size_minimum, size_maximum]`.
    /// With `uniform_distribution_probability`, a draw ignores the block and
    /// picks any rank.
    Block {
        size_minimum: usize,
        size_maximum: usize,
        size_ratio: f64,
        uniform_distribution_probability: f64,
    },
    /// Probability falls linearly from rank 0 to `size_maximum`.
    Linear { size_maximum: usize },
    /// Probability falls quadratically from rank 0 to `size_maximum`.
    Parabolic { size_maximum: usize },
    /// Beta distribution over the relative rank.
    Beta { alpha: f64, beta: f64 },
}

impl Default for NearbyDistribution {
    fn default() -> Self {
        NearbyDistribution::Beta {
            alpha: 1.0,
            beta: 5.0,
        }
    }
}

impl NearbyDistribution {
    pub fn block() -> Self {
        NearbyDistribution::Block {
            size_minimum: 1,
            size_maximum: usize::MAX,
            size_ratio: 1.0,
            uniform_distribution_probability: 0.0,
        }
    }

    pub fn linear() -> Self {
        NearbyDistribution::Linear {
            size_maximum: usize::MAX,
        }
    }

    pub fn parabolic() -> Self {
        NearbyDistribution::Parabolic {
            size_maximum: usize::MAX,
        }
    }

    /// Checks the parameter ranges.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(SearchForgeError::Config(message));
        match *self {
            NearbyDistribution::Block {
                size_minimum,
                size_maximum,
                size_ratio,
                uniform_distribution_probability,
            } => {
                if size_minimum < 1 {
                    return invalid(format!(
                        "the block distribution size minimum ({}) must be at least 1",
                        size_minimum
                    ));
                }
                if size_maximum < size_minimum {
                    return invalid(format!(
                        "the block distribution size maximum ({}) is below its minimum ({})",
                        size_maximum, size_minimum
                    ));
                }
                if !(0.0..=1.0).contains(&size_ratio) {
                    return invalid(format!(
                        "the block distribution size ratio ({}) must be in [0, 1]",
                        size_ratio
                    ));
                }
                if !(0.0..=1.0).contains(&uniform_distribution_probability) {
                    return invalid(format!(
                        "the block distribution uniform probability ({}) must be in [0, 1]",
                        uniform_distribution_probability
                    ));
                }
                Ok(())
            }
            NearbyDistribution::Linear { size_maximum }
            | NearbyDistribution::Parabolic { size_maximum } => {
                if size_maximum < 1 {
                    return invalid(format!(
                        "the distribution size maximum ({}) must be at least 1",
                        size_maximum
                    ));
                }
                Ok(())
            }
            NearbyDistribution::Beta { alpha, beta } => {
                if alpha.is_nan() || beta.is_nan() || alpha <= 0.0 || beta <= 0.0 {
                    return invalid(format!(
                        "the beta distribution alpha ({}) and beta ({}) must be positive",
                        alpha, beta
                    ));
                }
                Ok(())
            }
        }
    }

    /// Draws a rank in `0..nearby_size`. `nearby_size` must be positive.
    pub fn next_index(&self, rng: &mut StdRng, nearby_size: usize) -> usize {
        match *self {
            NearbyDistribution::Block {
                size_minimum,
                size_maximum,
                size_ratio,
                uniform_distribution_probability,
            } => {
                if uniform_distribution_probability > 0.0
                    && rng.random::<f64>() < uniform_distribution_probability
                {
                    return rng.random_range(0..nearby_size);
                }
                let mut size = if size_ratio < 1.0 {
                    let size = (nearby_size as f64 * size_ratio) as usize;
                    if size < size_minimum {
                        size_minimum.min(nearby_size)
                    } else {
                        size
                    }
                } else {
                    nearby_size
                };
                size = size.min(size_maximum).max(1);
                rng.random_range(0..size)
            }
            NearbyDistribution::Linear { size_maximum } => {
                let m = size_maximum.min(nearby_size);
                let p = rng.random::<f64>();
                let x = m as f64 * (1.0 - (1.0 - p).sqrt());
                clamp_rank(x, m)
            }
            NearbyDistribution::Parabolic { size_maximum } => {
                let m = size_maximum.min(nearby_size);
                let p = rng.random::<f64>();
                let x = m as f64 * (1.0 - (1.0 - p).powf(1.0 / 3.0));
                clamp_rank(x, m)
            }
            NearbyDistribution::Beta { alpha, beta } => {
                let p = rng.random::<f64>();
                let x = inverse_regularized_beta(p, alpha, beta) * nearby_size as f64;
                clamp_rank(x, nearby_size)
            }
        }
    }
}

// Rounding can land exactly on m.
fn clamp_rank(x: f64, m: usize) -> usize {
    let next = x as usize;
    if next >= m {
        m - 1
    } else {
        next
    }
}

/// Inverse of the regularized incomplete beta function, by bisection.
pub(crate) fn inverse_regularized_beta(p: f64, alpha: f64, beta: f64) -> f64 {
    if p <= 0.0 {
        return 0.0;
    }
    if p >= 1.0 {
        return 1.0;
    }
    let (mut low, mut high) = (0.0f64, 1.0f64);
    for _ in 0..100 {
        let mid = 0.5 * (low + high);
        if regularized_beta(mid, alpha, beta) < p {
            low = mid;
        } else {
            high = mid;
        }
    }
    0.5 * (low + high)
}

/// Regularized incomplete beta function `I_x(a, b)`.
pub(crate) fn regularized_beta(x: f64, a: f64, b: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let front = (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln())
        .exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(x, a, b) / a
    } else {
        1.0 - front * beta_continued_fraction(1.0 - x, b, a) / b
    }
}

// Lentz's method for the continued fraction of the incomplete beta function.
fn beta_continued_fraction(x: f64, a: f64, b: f64) -> f64 {
    const MAX_ITERATIONS: usize = 300;
    const EPSILON: f64 = 1e-15;
    const TINY: f64 = 1e-300;

    let guard = |v: f64| if v.abs() < TINY { TINY } else { v };
    let (qab, qap, qam) = (a + b, a + 1.0, a - 1.0);
    let mut c = 1.0;
    let mut d = 1.0 / guard(1.0 - qab * x / qap);
    let mut h = d;
    for m in 1..=MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;
        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        h *= d * c;
        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < EPSILON {
            break;
        }
    }
    h
}

// Lanczos approximation, g = 7.
fn ln_gamma(x: f64) -> f64 {
    const COEFFICIENTS: [f64; 9] = [
        0.999_999_999_999_809_93,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_13,
        -176.615_029_162_140_59,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_571_6e-6,
        1.505_632_735_149_311_6e-7,
    ];
    if x < 0.5 {
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut sum = COEFFICIENTS[0];
    for (i, coefficient) in COEFFICIENTS.iter().enumerate().skip(1) {
        sum += coefficient / (x + i as f64);
    }
    let t = x + 7.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}
