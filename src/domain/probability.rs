use serde::{Deserialize, Serialize};

/// `(p_H, p_D, p_A)` plus the ancillary fields every path must attach
/// (spec §3). Invariants are validated by [`ProbabilityTriple::validate`],
/// never silently repaired after construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProbabilityTriple {
    pub p_home: f64,
    pub p_draw: f64,
    pub p_away: f64,
    pub entropy: f64,
    pub xg_home: f64,
    pub xg_away: f64,
    pub xg_confidence: f64,
    pub dc_applied: bool,
}

pub const SUM_TOLERANCE: f64 = 1e-6;

impl ProbabilityTriple {
    pub fn new(p_home: f64, p_draw: f64, p_away: f64, xg_home: f64, xg_away: f64, dc_applied: bool) -> Self {
        let entropy = shannon_entropy_bits(&[p_home, p_draw, p_away]);
        let xg_confidence = 1.0 / (1.0 + (xg_home - xg_away).abs());
        Self {
            p_home,
            p_draw,
            p_away,
            entropy,
            xg_home,
            xg_away,
            xg_confidence,
            dc_applied,
        }
    }

    pub fn sum(&self) -> f64 {
        self.p_home + self.p_draw + self.p_away
    }

    pub fn validate(&self) -> bool {
        let sum_ok = (self.sum() - 1.0).abs() <= SUM_TOLERANCE;
        let range_ok = [self.p_home, self.p_draw, self.p_away]
            .iter()
            .all(|p| *p >= -SUM_TOLERANCE && *p <= 1.0 + SUM_TOLERANCE);
        sum_ok && range_ok
    }

    /// Renormalize so the three probabilities sum to exactly 1, recomputing
    /// the derived fields. Used after truncation-mass renormalization,
    /// blending, and calibration (spec §4.2, §4.3, §4.4).
    pub fn renormalized(mut self) -> Self {
        let total = self.sum();
        if total > 0.0 {
            self.p_home /= total;
            self.p_draw /= total;
            self.p_away /= total;
        }
        self.entropy = shannon_entropy_bits(&[self.p_home, self.p_draw, self.p_away]);
        self
    }

    pub fn probs(&self) -> [f64; 3] {
        [self.p_home, self.p_draw, self.p_away]
    }
}

/// Shannon entropy in bits, with the convention `0 * log 0 = 0`.
pub fn shannon_entropy_bits(probs: &[f64]) -> f64 {
    -probs
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| p * p.log2())
        .sum::<f64>()
}

/// The seven named perspectives over one fixture (spec §4.3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ProbabilitySetKind {
    /// Pure model output.
    A,
    /// Balanced blend (default; entropy-weighted variant, see ModelVersion).
    B,
    /// Market-dominant blend.
    C,
    /// Draw-boosted variant of B.
    D,
    /// Entropy-penalized (sharpened) variant of B.
    E,
    /// Kelly-weighted variant of B.
    F,
    /// Mean of A, B, C.
    G,
}

impl ProbabilitySetKind {
    pub const ALL: [ProbabilitySetKind; 7] = [
        ProbabilitySetKind::A,
        ProbabilitySetKind::B,
        ProbabilitySetKind::C,
        ProbabilitySetKind::D,
        ProbabilitySetKind::E,
        ProbabilitySetKind::F,
        ProbabilitySetKind::G,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProbabilitySetKind::A => "A",
            ProbabilitySetKind::B => "B",
            ProbabilitySetKind::C => "C",
            ProbabilitySetKind::D => "D",
            ProbabilitySetKind::E => "E",
            ProbabilitySetKind::F => "F",
            ProbabilitySetKind::G => "G",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entropy_convention_zero_log_zero() {
        assert_eq!(shannon_entropy_bits(&[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn renormalize_fixes_truncation_mass() {
        let t = ProbabilityTriple::new(0.5, 0.25, 0.2499, 1.0, 1.0, false).renormalized();
        assert!((t.sum() - 1.0).abs() < SUM_TOLERANCE);
    }
}
