//! Log-space Poisson PMF and the Dixon-Coles low-score correction (spec
//! §4.1, §4.2). Log-space avoids underflow for the small lambdas typical of
//! football scorelines.

use statrs::function::gamma::ln_gamma;

/// `ln P(k; lambda)` for the Poisson distribution, `k! = Γ(k+1)`.
pub fn ln_poisson_pmf(k: u32, lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return if k == 0 { 0.0 } else { f64::NEG_INFINITY };
    }
    k as f64 * lambda.ln() - lambda - ln_gamma(k as f64 + 1.0)
}

pub fn poisson_pmf(k: u32, lambda: f64) -> f64 {
    ln_poisson_pmf(k, lambda).exp()
}

/// Dixon-Coles low-score correction factor `τ(x, y)` (spec §4.1). Only the
/// four cells `(0,0), (0,1), (1,0), (1,1)` deviate from `1`.
pub fn tau(x: u32, y: u32, lambda_h: f64, lambda_a: f64, rho: f64) -> f64 {
    match (x, y) {
        (0, 0) => 1.0 - lambda_h * lambda_a * rho,
        (0, 1) => 1.0 + lambda_h * rho,
        (1, 0) => 1.0 + lambda_a * rho,
        (1, 1) => 1.0 - rho,
        _ => 1.0,
    }
}

/// `P(X=x, Y=y)` under the Dixon-Coles bivariate-Poisson model.
pub fn dc_joint_pmf(x: u32, y: u32, lambda_h: f64, lambda_a: f64, rho: f64) -> f64 {
    tau(x, y, lambda_h, lambda_a, rho) * poisson_pmf(x, lambda_h) * poisson_pmf(y, lambda_a)
}
