//! Converting a storage budget into perceptron predictor parameters.
//!
//! These are the formulas used when sweeping perceptron configurations over
//! hardware budgets. They only choose inputs for a simulation and have no
//! effect on how a predictor behaves.

use crate::config::PredictorConfig;

/// History lengths which performed best for each budget (in KiB) in the
/// experiments of "Dynamic Branch Prediction with Perceptrons"
/// (Jiménez and Lin, 2001).
pub const PERCEPTRON_HISTORY_BY_BUDGET_KIB: [(usize, u32); 10] = [
    (1, 12),
    (2, 22),
    (4, 28),
    (8, 34),
    (16, 36),
    (32, 59),
    (64, 59),
    (128, 62),
    (256, 62),
    (512, 62),
];

/// Training threshold suggested for some history length.
pub fn theta_for_history(history_bits: u32) -> u32 {
    (1.93 * history_bits as f64 + 14.0).round() as u32
}

/// Number of perceptrons that fit in `budget_bytes`, where every weight
/// needs `log2(theta) + 1` bits.
///
/// Returns [None] when the configuration is degenerate (no history, no
/// threshold) or when not even a single perceptron fits.
pub fn num_perceptrons_for_budget(budget_bytes: usize, history_bits: u32, theta: u32)
    -> Option<u32>
{
    if history_bits == 0 || theta == 0 {
        return None;
    }
    let h = history_bits as f64;
    let weight_bits = (theta as f64).log2() + 1.0;
    let n = ((budget_bytes as f64 * 8.0 - h) / (weight_bits * h)).round();
    if n < 1.0 || n > u32::MAX as f64 {
        None
    } else {
        Some(n as u32)
    }
}

/// Size a perceptron predictor with `history_bits` of history to fit in
/// `budget_bytes`.
pub fn perceptron_for_budget(budget_bytes: usize, history_bits: u32)
    -> Option<PredictorConfig>
{
    let theta = theta_for_history(history_bits);
    let num_perceptrons = num_perceptrons_for_budget(budget_bytes, history_bits, theta)?;
    let cfg = PredictorConfig::Perceptron { history_bits, num_perceptrons, theta };
    cfg.validate().ok().map(|_| cfg)
}

/// Size a perceptron predictor for a budget in KiB, using the history
/// length listed in [PERCEPTRON_HISTORY_BY_BUDGET_KIB].
pub fn perceptron_for_budget_kib(budget_kib: usize) -> Option<PredictorConfig> {
    let (_, h) = PERCEPTRON_HISTORY_BY_BUDGET_KIB.iter()
        .find(|(kib, _)| *kib == budget_kib)?;
    perceptron_for_budget(budget_kib * 1024, *h)
}
