//! Probability ↔ point-spread conversions.
//!
//! The final home margin is modelled as normal with standard deviation
//! `sd` (13.5 points for the NFL). A win probability `p` then implies a
//! mean margin `μ = sd·Φ⁻¹(p)` and a home line `−μ`.

/// Probabilities are clipped to `[EPS, 1 − EPS]` before inversion.
const EPS: f64 = 1e-6;

/// Complementary error function, Numerical Recipes `erfcc`
/// (fractional error below 1.2e-7 everywhere).
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87 + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let ans = t * poly.exp();
    if x >= 0.0 {
        ans
    } else {
        2.0 - ans
    }
}

/// Standard normal CDF.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Inverse standard normal CDF (Acklam's rational approximation,
/// relative error below 1.15e-9). Input is clipped to `(0, 1)`.
pub fn norm_ppf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    let p = clip(p);

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p > 1.0 - P_LOW {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    } else {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    }
}

fn clip(p: f64) -> f64 {
    p.clamp(EPS, 1.0 - EPS)
}

/// Expected home margin implied by a home win probability.
pub fn mean_margin(p_home: f64, sd: f64) -> f64 {
    sd * norm_ppf(p_home)
}

/// Home line implied by a home win probability; negative ⇒ home favored.
pub fn prob_to_home_line(p_home: f64, sd: f64) -> f64 {
    -mean_margin(p_home, sd)
}

/// Probability the home team covers `home_line` given mean margin `mu`.
/// With `home_line = −3` home must win by more than 3.
pub fn home_cover_prob(mu: f64, home_line: f64, sd: f64) -> f64 {
    let threshold = -home_line;
    1.0 - norm_cdf((threshold - mu) / sd)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
