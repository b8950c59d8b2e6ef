//! The Calibrator (spec §4.4): fits and applies per-outcome monotone maps
//! on top of a blended triple. Calibration runs strictly after blending.

pub mod isotonic;

use std::collections::HashMap;

use crate::domain::{CalibrationCurve, ProbabilityTriple};
use isotonic::CalibrationSample;

const ECE_WARNING_THRESHOLD: f64 = 0.10;
const ECE_BINS: usize = 10;

/// Per-outcome sample sets collected from an out-of-sample window, keyed by
/// `"H"`, `"D"`, `"A"` and, optionally, a league-scoped key (e.g. `"EPL:H"`)
/// when that league clears the per-league minimum independently.
pub struct CalibrationTrainingSet {
    pub home: Vec<CalibrationSample>,
    pub draw: Vec<CalibrationSample>,
    pub away: Vec<CalibrationSample>,
}

pub struct FittedCalibration {
    pub curves: HashMap<String, CalibrationCurve>,
    pub quality_warning: bool,
}

/// Fit the three outcome curves, returning the curve map to embed in a
/// `ModelVersion` plus a quality-warning flag for ECE > 0.10 on any curve.
pub fn fit_calibration(training: &CalibrationTrainingSet) -> FittedCalibration {
    let mut curves = HashMap::new();
    let mut quality_warning = false;

    for (key, samples) in [("H", &training.home), ("D", &training.draw), ("A", &training.away)] {
        let curve = isotonic::fit(samples);
        if !curve.is_identity {
            let ece = isotonic::expected_calibration_error(samples, &curve, ECE_BINS);
            if ece > ECE_WARNING_THRESHOLD {
                quality_warning = true;
            }
        }
        curves.insert(key.to_string(), curve);
    }

    FittedCalibration { curves, quality_warning }
}

/// Apply the fitted curves to one triple and renormalize (mandatory — the
/// three independent maps do not preserve the sum on their own).
pub fn apply(triple: &ProbabilityTriple, curves: &HashMap<String, CalibrationCurve>) -> ProbabilityTriple {
    let identity = CalibrationCurve {
        points: vec![
            crate::domain::CalibrationPoint { x: 0.0, y: 0.0 },
            crate::domain::CalibrationPoint { x: 1.0, y: 1.0 },
        ],
        is_identity: true,
    };
    let g_home = curves.get("H").unwrap_or(&identity);
    let g_draw = curves.get("D").unwrap_or(&identity);
    let g_away = curves.get("A").unwrap_or(&identity);

    ProbabilityTriple::new(
        isotonic::apply(g_home, triple.p_home),
        isotonic::apply(g_draw, triple.p_draw),
        isotonic::apply(g_away, triple.p_away),
        triple.xg_home,
        triple.xg_away,
        triple.dc_applied,
    )
    .renormalized()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn calibration_with_identity_curves_is_a_no_op() {
        let triple = ProbabilityTriple::new(0.5, 0.3, 0.2, 1.5, 1.0, false);
        let curves = HashMap::new();
        let out = apply(&triple, &curves);
        assert_abs_diff_eq!(out.p_home, triple.p_home, epsilon = 1e-9);
        assert_abs_diff_eq!(out.p_draw, triple.p_draw, epsilon = 1e-9);
        assert_abs_diff_eq!(out.p_away, triple.p_away, epsilon = 1e-9);
    }

    #[test]
    fn sparse_training_set_falls_back_to_identity_and_no_warning() {
        let training = CalibrationTrainingSet { home: vec![], draw: vec![], away: vec![] };
        let fitted = fit_calibration(&training);
        assert!(!fitted.quality_warning);
        assert!(fitted.curves["H"].is_identity);
    }
}
