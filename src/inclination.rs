//! Inclination-only statistics.
//!
//! When declinations are unreliable (unoriented drill cores, for example)
//! the mean inclination has to be estimated from inclinations alone. The
//! arithmetic mean of the inclinations is biased towards shallow values,
//! so the main estimator here is the maximum likelihood method of
//! Arason & Levi (2010). The arithmetic mean is kept as a companion
//! statistic for comparison.
//!
//! # Error codes
//!
//! The maximum likelihood search reports problems through a bit set rather
//! than an error, since a poor fit is an expected outcome:
//!
//! | Bit | Meaning |
//! |-----|---------|
//! | 1 | The selected solution did not converge (also set for a single inclination) |
//! | 2 | A nearby point has higher likelihood than the selected solution |

use crate::config::StatsConfig;
use crate::error::{PalaeomagError, Result};
use crate::math::special::{coth, scaled_bessel, student_t_quantile, TwoSided};
use tracing::{debug, warn};

/// θ63 for directions uniformly spread over the sphere, in degrees.
pub const T63_MAX: f64 = 105.070_062_145;

/// α95 for directions uniformly spread over the sphere, in degrees.
pub const A95_MAX: f64 = 154.158_067_237;

/// Error code bit for a non-converged solution.
pub const ERROR_CONVERGENCE: u8 = 1;

/// Error code bit for a solution that is not a local likelihood maximum.
pub const ERROR_ROBUSTNESS: u8 = 2;

/// Limits on co-inclination estimates, in degrees.
const THETA_MIN: f64 = 0.000_001;
const THETA_MAX: f64 = 179.999_999;

/// Precision assigned to data with no measurable spread.
const KAPPA_LIMIT: f64 = 1e10;

fn validate_inclinations(inclinations: &[f64]) -> Result<()> {
    if inclinations.is_empty() {
        return Err(PalaeomagError::insufficient_data(1, 0));
    }
    if let Some(bad) = inclinations.iter().find(|i| !(-90.0..=90.0).contains(*i)) {
        return Err(PalaeomagError::invalid_input(format!(
            "inclination {bad} is outside [-90, 90]"
        )));
    }
    Ok(())
}

/// Maximum likelihood estimate of mean inclination (Arason & Levi 2010).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArasonLevi {
    n: usize,
    mean_inc: f64,
    kappa: f64,
    t63: f64,
    a95: f64,
    error_code: u8,
}

impl ArasonLevi {
    /// Estimate with the default iteration settings.
    ///
    /// # Arguments
    ///
    /// * `inclinations` - Inclinations in degrees, each in `[-90, 90]`
    ///
    /// # Errors
    ///
    /// Returns an error if `inclinations` is empty or contains a value
    /// outside `[-90, 90]` (including NaN).
    pub fn calculate(inclinations: &[f64]) -> Result<Self> {
        Self::calculate_with_config(inclinations, &StatsConfig::default())
    }

    /// Estimate with explicit iteration cap and tolerance.
    ///
    /// # Errors
    ///
    /// As [`ArasonLevi::calculate`], or if the configuration is invalid.
    pub fn calculate_with_config(inclinations: &[f64], config: &StatsConfig) -> Result<Self> {
        config.validate()?;
        validate_inclinations(inclinations)?;
        let n = inclinations.len();

        if n == 1 {
            warn!("only one inclination supplied");
            return Ok(Self {
                n,
                mean_inc: inclinations[0],
                kappa: -1.0,
                t63: T63_MAX,
                a95: A95_MAX,
                error_code: ERROR_CONVERGENCE,
            });
        }

        if inclinations.iter().all(|&i| i == inclinations[0]) {
            warn!("all inclinations are identical");
            return Ok(Self {
                n,
                mean_inc: inclinations[0],
                kappa: KAPPA_LIMIT,
                t63: 0.0,
                a95: 0.0,
                error_code: 0,
            });
        }

        let th: Vec<f64> = inclinations.iter().map(|i| 90.0 - i).collect();
        let nf = n as f64;

        // Arithmetic mean as the first guess.
        let s: f64 = th.iter().sum();
        let s2: f64 = th.iter().map(|t| t * t).sum();
        let c = th.iter().map(|t| t.to_radians().cos()).sum::<f64>() / nf;
        let mean_theta = s / nf;
        let x = (s2 - s * s / nf).to_radians().to_radians();
        let mean_kappa = if x / (nf - 1.0) > 1e-10 {
            (nf - 1.0) / x
        } else {
            KAPPA_LIMIT
        };

        let candidates = [
            interior_solution(&th, mean_theta, mean_kappa, config),
            edge_solution(&th, 0.0, c, mean_kappa, config),
            edge_solution(&th, 180.0, c, mean_kappa, config),
            Candidate::new(&th, 90.0, 0.0, true),
        ];
        let mut best = &candidates[0];
        for candidate in &candidates[1..] {
            if candidate.log_likelihood > best.log_likelihood {
                best = candidate;
            }
        }

        let mut error_code = if best.converged { 0 } else { ERROR_CONVERGENCE };
        if error_code != 0 {
            warn!("convergence problems in Arason-Levi estimate");
        }
        if !is_local_maximum(&th, best) {
            warn!("robustness problem in Arason-Levi estimate");
            error_code |= ERROR_ROBUSTNESS;
        }

        Ok(Self {
            n,
            mean_inc: 90.0 - best.theta,
            kappa: best.kappa,
            t63: kono_t63(best.kappa),
            a95: kono_a95(nf, best.kappa),
            error_code,
        })
    }

    /// Number of inclinations.
    #[must_use]
    pub const fn n(&self) -> usize {
        self.n
    }

    /// Mean inclination in degrees.
    #[must_use]
    pub const fn mean_inc(&self) -> f64 {
        self.mean_inc
    }

    /// Precision parameter κ (-1 when undefined).
    #[must_use]
    pub const fn kappa(&self) -> f64 {
        self.kappa
    }

    /// Angular standard deviation θ63, in degrees.
    #[must_use]
    pub const fn t63(&self) -> f64 {
        self.t63
    }

    /// 95% confidence limit of the mean, in degrees.
    #[must_use]
    pub const fn a95(&self) -> f64 {
        self.a95
    }

    /// Problem bits; 0 means a clean solution.
    #[must_use]
    pub const fn error_code(&self) -> u8 {
        self.error_code
    }

    /// True if the estimate carries no problem bits.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error_code == 0
    }
}

/// A local likelihood maximum in (θ, κ) space.
#[derive(Debug)]
struct Candidate {
    theta: f64,
    kappa: f64,
    log_likelihood: f64,
    converged: bool,
}

impl Candidate {
    fn new(th: &[f64], theta: f64, kappa: f64, converged: bool) -> Self {
        Self {
            theta,
            kappa,
            log_likelihood: log_likelihood(th, theta, kappa),
            converged,
        }
    }
}

/// Sums `Σ sin θᵢ·I1/I0(κ sin θ sin θᵢ)` and `Σ cos θᵢ` used by both update steps.
fn bessel_sums(th: &[f64], theta: f64, kappa: f64) -> (f64, f64) {
    let st = theta.to_radians().sin();
    th.iter().fold((0.0, 0.0), |(s, c), t| {
        let (sin_t, cos_t) = t.to_radians().sin_cos();
        let ratio = scaled_bessel(kappa * st * sin_t).ratio;
        (s + sin_t * ratio, c + cos_t)
    })
}

/// Updated co-inclination estimate in degrees.
fn next_theta(th: &[f64], theta: f64, kappa: f64) -> f64 {
    let (s, c) = bessel_sums(th, theta, kappa);
    s.atan2(c).to_degrees().clamp(THETA_MIN, THETA_MAX)
}

/// Updated precision estimate.
fn next_kappa(th: &[f64], theta: f64, kappa: f64) -> f64 {
    let n = th.len() as f64;
    let (s, c) = bessel_sums(th, theta, kappa);
    let (sin_theta, cos_theta) = theta.to_radians().sin_cos();
    let x = n * coth(kappa) - cos_theta * c - sin_theta * s;
    let k = if x / n > 1e-10 { n / x } else { KAPPA_LIMIT };
    k.max(1e-6)
}

/// Log-likelihood of co-inclinations `th` for mean co-inclination `theta`
/// (degrees) and precision `kappa`.
fn log_likelihood(th: &[f64], theta: f64, kappa: f64) -> f64 {
    if th.is_empty() || kappa < 0.0 {
        return -1e10;
    }
    let n = th.len() as f64;

    // N ln κ - N ln sinh κ - N ln 2
    let a1 = if kappa < 0.01 {
        let q = -kappa
            * (1.0
                - kappa
                    * (2.0 / 3.0
                        - kappa * (1.0 / 3.0 - kappa * (2.0 / 15.0 - kappa * (8.0 / 45.0)))));
        n * (-(2f64.ln()) - (1.0 + q).ln() - kappa)
    } else if kappa <= 15.0 {
        n * (kappa.ln() - (1.0 - (-2.0 * kappa).exp()).ln() - kappa)
    } else {
        n * (kappa.ln() - kappa)
    };

    let sin_theta = theta.to_radians().sin();
    let a2: f64 = th
        .iter()
        .map(|t| {
            let x = kappa * sin_theta * t.to_radians().sin();
            kappa * (t - theta).to_radians().cos() + scaled_bessel(x).i0e.ln()
        })
        .sum();

    let a3: f64 = th
        .iter()
        .map(|t| t.clamp(THETA_MIN, THETA_MAX).to_radians().sin().ln())
        .sum();

    a1 + a2 + a3
}

/// Alternate θ and κ updates from the arithmetic-mean guess.
fn interior_solution(th: &[f64], theta0: f64, kappa0: f64, config: &StatsConfig) -> Candidate {
    let mut theta = theta0;
    let mut kappa = kappa0;
    let mut converged = false;
    let mut iterations = 0;
    while iterations < config.aralev_max_iterations {
        let new_theta = next_theta(th, theta, kappa);
        let new_kappa = next_kappa(th, new_theta, kappa);
        let dt = (new_theta - theta).abs();
        let dk = ((new_kappa - kappa) / new_kappa).abs();
        theta = new_theta;
        kappa = new_kappa;
        if iterations > 10 && dt < config.aralev_tolerance && dk < config.aralev_tolerance {
            converged = true;
            break;
        }
        iterations += 1;
    }
    debug!(iterations, converged, theta, kappa, "interior likelihood search");
    Candidate::new(th, theta, kappa, converged)
}

/// Best κ with θ pinned at 0° or 180°.
fn edge_solution(th: &[f64], theta: f64, mean_cos: f64, kappa0: f64, config: &StatsConfig) -> Candidate {
    let c = if theta == 0.0 { mean_cos } else { -mean_cos };
    let mut kappa = if 1.0 - c > 1e-10 { 1.0 / (1.0 - c) } else { kappa0 };
    let mut converged = false;
    let mut iterations = 0;
    while iterations < config.aralev_max_iterations {
        let x = coth(kappa) - c;
        let new_kappa = if x > 1e-10 { 1.0 / x } else { KAPPA_LIMIT };
        let dk = ((new_kappa - kappa) / new_kappa).abs();
        kappa = new_kappa;
        if iterations > 4 && dk < config.aralev_tolerance {
            converged = true;
            break;
        }
        iterations += 1;
    }
    debug!(iterations, converged, theta, kappa, "edge likelihood search");
    Candidate::new(th, theta, kappa, converged)
}

/// False if any of 16 trial points at θ ± 0.01° and κ ± 0.1% beats the solution.
fn is_local_maximum(th: &[f64], best: &Candidate) -> bool {
    (0..16_i32).all(|i| {
        let angle = (22.5 * f64::from(i)).to_radians();
        let theta = best.theta + 0.01 * angle.cos();
        let kappa = best.kappa * (1.0 + 0.001 * angle.sin());
        !(0.0..=180.0).contains(&theta) || log_likelihood(th, theta, kappa) <= best.log_likelihood
    })
}

/// Convert a cosine to a co-angle in degrees using Kono's convention:
/// negative cosines map to 180, cosines at or beyond ±1 use the fallback.
fn kono_angle(co: f64, limit: f64) -> f64 {
    let mut angle = 0.0;
    if co < 0.0 {
        angle = 180.0;
    }
    if co.abs() < 1.0 {
        angle = 90.0 - (co / (1.0 - co * co).sqrt()).atan().to_degrees();
    }
    angle.min(limit)
}

/// θ63 from κ (Kono 1980).
fn kono_t63(kappa: f64) -> f64 {
    let co = if kappa >= 20.0 {
        1.0 + (1.0 - 0.63f64).ln() / kappa
    } else if kappa > 0.1 {
        1.0 + (1.0 - 0.63 * (1.0 - (-2.0 * kappa).exp())).ln() / kappa
    } else {
        -0.26 + 0.4662 * kappa
    };
    kono_angle(co, T63_MAX)
}

/// α95 from N and κ (Kono 1980).
fn kono_a95(n: f64, kappa: f64) -> f64 {
    let co = 1.0 - (n - 1.0) * (20f64.powf(1.0 / (n - 1.0)) - 1.0) / (n * (kappa - 1.0) + 1.0);
    kono_angle(co, A95_MAX)
}

/// Arithmetic mean of inclinations with Student's t confidence limits.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArithmeticMean {
    n: usize,
    mean_inc: f64,
    kappa: f64,
    t63: f64,
    a95: f64,
}

impl ArithmeticMean {
    /// Arithmetic mean inclination, inverse variance and t-based limits.
    ///
    /// # Arguments
    ///
    /// * `inclinations` - Inclinations in degrees, each in `[-90, 90]`
    ///
    /// # Errors
    ///
    /// Returns an error if `inclinations` is empty or contains a value
    /// outside `[-90, 90]`.
    pub fn calculate(inclinations: &[f64]) -> Result<Self> {
        validate_inclinations(inclinations)?;
        let n = inclinations.len();
        if n == 1 {
            warn!("only one inclination supplied");
            return Ok(Self {
                n,
                mean_inc: inclinations[0],
                kappa: -1.0,
                t63: T63_MAX,
                a95: A95_MAX,
            });
        }

        let nf = n as f64;
        let mean = inclinations.iter().sum::<f64>() / nf;
        let ss: f64 = inclinations.iter().map(|i| (i - mean).powi(2)).sum();
        if ss == 0.0 {
            warn!("all inclinations are identical");
        }
        let sd = (ss / (nf - 1.0)).sqrt();
        let kappa = (nf - 1.0) / ss.to_radians().to_radians();

        let df = nf - 1.0;
        Ok(Self {
            n,
            mean_inc: mean,
            kappa,
            t63: student_t_quantile(TwoSided::P63, df) * sd,
            a95: student_t_quantile(TwoSided::P95, df) * sd / nf.sqrt(),
        })
    }

    /// Number of inclinations.
    #[must_use]
    pub const fn n(&self) -> usize {
        self.n
    }

    /// Arithmetic mean inclination in degrees.
    #[must_use]
    pub const fn mean_inc(&self) -> f64 {
        self.mean_inc
    }

    /// Inverse variance (in radians⁻²) as an estimate of κ; -1 for a single
    /// value and infinite for identical values.
    #[must_use]
    pub const fn kappa(&self) -> f64 {
        self.kappa
    }

    /// Angular standard deviation scaled by the 63% t quantile, in degrees.
    #[must_use]
    pub const fn t63(&self) -> f64 {
        self.t63
    }

    /// 95% confidence limit of the mean, in degrees.
    #[must_use]
    pub const fn a95(&self) -> f64 {
        self.a95
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SCATTERED: [f64; 20] = [
        39.0, 28.0, 43.0, 33.0, 7.0, -25.0, 2.0, -16.0, 10.0, 15.0, 39.0, -3.0, -84.0, -72.0,
        14.0, -5.0, -41.0, 47.0, -16.0, 43.0,
    ];

    const STEEP: [f64; 12] = [
        86.0, 86.5, 86.1, 87.0, 87.5, 87.2, 86.7, 86.7, 87.2, 87.1, 89.0, 89.9,
    ];

    #[test]
    fn test_scattered_set() {
        let al = ArasonLevi::calculate(&SCATTERED).unwrap();
        assert_eq!(al.n(), 20);
        assert_eq!(al.error_code(), 0);
        assert_relative_eq!(al.mean_inc(), 8.564_65, epsilon = 1e-3);
        assert_relative_eq!(al.kappa(), 1.788_07, max_relative = 1e-4);
        assert_relative_eq!(al.t63(), 61.9667, epsilon = 1e-2);
        assert_relative_eq!(al.a95(), 36.2532, epsilon = 1e-3);
    }

    #[test]
    fn test_steep_set() {
        let al = ArasonLevi::calculate(&STEEP).unwrap();
        assert!(al.is_ok());
        assert_relative_eq!(al.mean_inc(), 87.4946, epsilon = 1e-3);
        assert_relative_eq!(al.kappa(), 2602.31, max_relative = 1e-4);
        assert_relative_eq!(al.t63(), 1.583_87, epsilon = 1e-3);
        assert_relative_eq!(al.a95(), 0.851_019, epsilon = 1e-3);
    }

    #[test]
    fn test_negated_inputs_negate_mean() {
        let negated: Vec<f64> = SCATTERED.iter().map(|i| -i).collect();
        let al = ArasonLevi::calculate(&SCATTERED).unwrap();
        let neg = ArasonLevi::calculate(&negated).unwrap();
        assert_relative_eq!(neg.mean_inc(), -al.mean_inc(), epsilon = 1e-6);
        assert_relative_eq!(neg.kappa(), al.kappa(), max_relative = 1e-6);
    }

    #[test]
    fn test_single_inclination() {
        let al = ArasonLevi::calculate(&[1.0]).unwrap();
        assert_eq!(al.mean_inc(), 1.0);
        assert_eq!(al.kappa(), -1.0);
        assert_eq!(al.t63(), T63_MAX);
        assert_eq!(al.a95(), A95_MAX);
        assert_eq!(al.error_code(), ERROR_CONVERGENCE);

        let am = ArithmeticMean::calculate(&[1.0]).unwrap();
        assert_eq!(am.mean_inc(), 1.0);
        assert_eq!(am.kappa(), -1.0);
        assert_eq!(am.t63(), T63_MAX);
        assert_eq!(am.a95(), A95_MAX);
    }

    #[test]
    fn test_identical_inclinations() {
        let al = ArasonLevi::calculate(&[12.0; 5]).unwrap();
        assert_eq!(al.error_code(), 0);
        assert_eq!(al.mean_inc(), 12.0);
        assert_eq!(al.kappa(), 1e10);
        assert_eq!(al.t63(), 0.0);
        assert_eq!(al.a95(), 0.0);

        let am = ArithmeticMean::calculate(&[12.0; 5]).unwrap();
        assert_eq!(am.mean_inc(), 12.0);
        assert!(am.kappa().is_infinite());
        assert_eq!(am.a95(), 0.0);
    }

    #[test]
    fn test_invalid_inclinations() {
        assert_eq!(
            ArasonLevi::calculate(&[]),
            Err(PalaeomagError::insufficient_data(1, 0))
        );
        assert!(ArasonLevi::calculate(&[10.0, 91.0]).is_err());
        assert!(ArasonLevi::calculate(&[10.0, f64::NAN]).is_err());
        assert!(ArithmeticMean::calculate(&[]).is_err());
        assert!(ArithmeticMean::calculate(&[-90.5, 3.0]).is_err());
    }

    #[test]
    fn test_arithmetic_mean() {
        let am = ArithmeticMean::calculate(&SCATTERED).unwrap();
        assert_eq!(am.n(), 20);
        assert_relative_eq!(am.mean_inc(), 2.9, epsilon = 1e-10);
        assert_relative_eq!(am.kappa(), 2.369_83, max_relative = 1e-4);
        // t(0.975; 19) · sd / √20 with sd = 37.219
        assert_relative_eq!(am.a95(), 17.419, epsilon = 1e-2);
        assert!((am.t63() - 35.9).abs() < 10.0);
    }

    #[test]
    fn test_kono_limits() {
        assert_relative_eq!(kono_t63(0.0), T63_MAX, epsilon = 1e-6);
        assert!(kono_t63(1e10) < 1e-3);
        assert_eq!(kono_a95(10.0, 0.681), 0.0);
    }

    #[test]
    fn test_iteration_cap_sets_error_bit() {
        let config = StatsConfig::default().with_aralev_max_iterations(2);
        let al = ArasonLevi::calculate_with_config(&STEEP, &config).unwrap();
        assert_ne!(al.error_code() & ERROR_CONVERGENCE, 0);
    }
}
