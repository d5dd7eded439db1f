//! Special functions for inclination-only statistics.
//!
//! - Exponentially scaled modified Bessel functions `I0`, `I1` and their
//!   ratio, using the polynomial approximations of Abramowitz & Stegun
//!   (9.8.1 to 9.8.4)
//! - Hyperbolic cotangent with a series branch near zero
//! - Student's t quantiles from a baked table

/// Modified Bessel functions of orders 0 and 1, scaled by `exp(-|x|)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledBessel {
    /// `I0(x) / exp(|x|)`, in `(0, 1]`.
    pub i0e: f64,
    /// `I1(x) / exp(|x|)`.
    pub i1e: f64,
    /// `I1(x) / I0(x)`, in `(-1, 1)`.
    pub ratio: f64,
}

const P: [f64; 7] = [
    1.0, 3.515_622_9, 3.089_942_4, 1.206_749_2, 0.265_973_2, 0.360_768e-1, 0.458_13e-2,
];
const Q: [f64; 9] = [
    0.398_942_28,
    0.132_859_2e-1,
    0.225_319e-2,
    -0.157_565e-2,
    0.916_281e-2,
    -0.205_770_6e-1,
    0.263_553_7e-1,
    -0.164_763_3e-1,
    0.392_377e-2,
];
const U: [f64; 7] = [
    0.5, 0.878_905_94, 0.514_988_69, 0.150_849_34, 0.265_873_3e-1, 0.301_532e-2, 0.324_11e-3,
];
const V: [f64; 9] = [
    0.398_942_28,
    -0.398_802_4e-1,
    -0.362_018e-2,
    0.163_801e-2,
    -0.103_155_5e-1,
    0.228_296_7e-1,
    -0.289_531_2e-1,
    0.178_765_4e-1,
    -0.420_059e-2,
];

/// Horner evaluation of `c[0] + c[1] t + c[2] t² + ...`.
fn polynomial(coefficients: &[f64], t: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| c + t * acc)
}

/// Scaled Bessel functions `I0`, `I1` and their ratio at `x`.
///
/// Absolute errors are below about 2e-7 over the whole real line.
#[must_use]
pub fn scaled_bessel(x: f64) -> ScaledBessel {
    let ax = x.abs();
    if ax < 3.75 {
        let t = (x / 3.75) * (x / 3.75);
        let b0 = polynomial(&P, t);
        let b1 = x * polynomial(&U, t);
        let scale = ax.exp();
        ScaledBessel {
            i0e: b0 / scale,
            i1e: b1 / scale,
            ratio: b1 / b0,
        }
    } else {
        let t = 3.75 / ax;
        let b0 = polynomial(&Q, t);
        let b1 = polynomial(&V, t).copysign(x);
        let scale = ax.sqrt();
        ScaledBessel {
            i0e: b0 / scale,
            i1e: b1 / scale,
            ratio: b1 / b0,
        }
    }
}

/// Hyperbolic cotangent, returning 0 at 0.
///
/// Uses a Taylor series below 1e-3 and the constant 1 above 15, where
/// `coth` equals 1 to double precision.
#[must_use]
pub fn coth(x: f64) -> f64 {
    if x == 0.0 {
        return 0.0;
    }
    let t = x.abs();
    let result = if t < 0.001 {
        1.0 / t + t / 3.0 - t.powi(3) / 45.0 + t.powi(5) * 2.0 / 945.0
    } else if t <= 15.0 {
        let ep = t.exp();
        let em = (-t).exp();
        (ep + em) / (ep - em)
    } else {
        1.0
    };
    result.copysign(x)
}

/// Degrees of freedom with an exact entry in the quantile tables.
const T_TABLE_DF: [f64; 33] = [
    1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0,
    18.0, 19.0, 20.0, 21.0, 22.0, 23.0, 24.0, 25.0, 26.0, 27.0, 28.0, 29.0, 30.0, 40.0, 60.0,
    120.0,
];

/// Two-sided 63% quantiles, `t(0.815; df)`.
const T_0815: [f64; 33] = [
    1.5224, 1.1473, 1.0521, 1.0091, 0.9847, 0.9689, 0.9579, 0.9498, 0.9436, 0.9387, 0.9347,
    0.9314, 0.9286, 0.9263, 0.9242, 0.9224, 0.9209, 0.9195, 0.9182, 0.9171, 0.9161, 0.9152,
    0.9144, 0.9136, 0.9129, 0.9123, 0.9117, 0.9111, 0.9106, 0.9101, 0.9067, 0.9033, 0.8999,
];
const Z_0815: f64 = 0.896_473;

/// Two-sided 95% quantiles, `t(0.975; df)`.
const T_0975: [f64; 33] = [
    12.7062, 4.3027, 3.1824, 2.7764, 2.5706, 2.4469, 2.3646, 2.3060, 2.2622, 2.2281, 2.2010,
    2.1788, 2.1604, 2.1448, 2.1314, 2.1199, 2.1098, 2.1009, 2.0930, 2.0860, 2.0796, 2.0739,
    2.0687, 2.0639, 2.0595, 2.0555, 2.0518, 2.0484, 2.0452, 2.0423, 2.0211, 2.0003, 1.9799,
];
const Z_0975: f64 = 1.959_964;

/// Two-sided confidence levels available from [`student_t_quantile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwoSided {
    /// 63% (upper-tail probability 0.815), used for θ63.
    P63,
    /// 95% (upper-tail probability 0.975), used for α95.
    P95,
}

/// Student's t quantile for `df` degrees of freedom.
///
/// Table entries cover 1 to 30, 40, 60 and 120 degrees of freedom and are
/// rounded to four decimals, so those values are within 5e-5 of the exact
/// quantile. Between entries, and from 120 towards the normal limit, the
/// quantile is interpolated linearly in `1/df`; for integer `df` above 30
/// the result stays within 1e-4 of the exact quantile. Fractional `df`
/// below 30 is interpolated between neighbouring integers and is much
/// less accurate, especially for `df < 3`.
///
/// Returns NaN for `df < 1`.
#[must_use]
pub fn student_t_quantile(level: TwoSided, df: f64) -> f64 {
    let (table, limit) = match level {
        TwoSided::P63 => (&T_0815, Z_0815),
        TwoSided::P95 => (&T_0975, Z_0975),
    };
    if df.is_nan() || df < 1.0 {
        return f64::NAN;
    }
    if let Some(i) = T_TABLE_DF.iter().position(|&d| d == df) {
        return table[i];
    }
    let upper = T_TABLE_DF.iter().position(|&d| d > df);
    let (df0, t0, inv1, t1) = match upper {
        Some(i) => (T_TABLE_DF[i - 1], table[i - 1], 1.0 / T_TABLE_DF[i], table[i]),
        None => (120.0, table[32], 0.0, limit),
    };
    let inv0 = 1.0 / df0;
    let inv = 1.0 / df;
    t0 + (t1 - t0) * (inv0 - inv) / (inv0 - inv1)
}
