//! Calibration and sensitivity metrics for a ranked protein output.
//!
//! These drive the grid search objective and are also reported for the final
//! inference pass, so the same accumulation rules are used in both places.
//!
//! Käll, 2008 [https://pubmed.ncbi.nlm.nih.gov/18052118/]
//! Serang, 2010 [https://pubmed.ncbi.nlm.nih.gov/20712337/]

use crate::evidence::Classified;
use crate::output::ProteinOutput;

/// Weight of the ROC term in the combined objective. Closer to 1.0 favors a
/// more discriminative model, closer to 0.0 a better calibrated one.
pub const LAMBDA: f64 = 0.15;

/// Only ranks with estimated FDR at or below this threshold enter MSE_FDR.
pub const MSE_FDR_THRESHOLD: f64 = 0.1;

/// ROC curve is integrated up to this many false positives.
pub const ROC_FP_LIMIT: u32 = 50;

/// Estimated and empirical FDR per rank, as parallel equal-length arrays.
///
/// Estimated FDR at rank `k` is the q-value (the output's own error
/// estimate); empirical FDR is the fraction of false-positive groups among
/// ranks `0..=k`, where a group is false positive if any member protein is
/// in the false-positive set.
pub fn fdr_curves(output: &ProteinOutput, classified: &Classified) -> (Vec<f64>, Vec<f64>) {
    let mut estimated = Vec::with_capacity(output.len());
    let mut empirical = Vec::with_capacity(output.len());
    let mut fp_groups = 0usize;
    for (k, group) in output.groups.iter().enumerate() {
        if classified.group_is_fp(group) {
            fp_groups += 1;
        }
        estimated.push(output.q_values[k]);
        empirical.push(fp_groups as f64 / (k + 1) as f64);
    }
    (estimated, empirical)
}

/// Mean squared difference between estimated and empirical FDR, restricted
/// to ranks with estimated FDR <= `threshold`.
///
/// When no rank qualifies the result is defined as 0.0 -- this is the
/// documented boundary rule, not a division-by-zero hazard.
pub fn mse_fdr(threshold: f64, estimated: &[f64], empirical: &[f64]) -> f64 {
    debug_assert_eq!(estimated.len(), empirical.len());
    let mut sum = 0.0;
    let mut n = 0usize;
    for (est, emp) in estimated.iter().zip(empirical) {
        if *est <= threshold {
            sum += (est - emp).powi(2);
            n += 1;
        }
    }
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Running false-positive and true-positive group counts per rank.
///
/// A group increments the true-positive count if any member protein is in
/// the true-positive set, and (independently) the false-positive count if
/// any member is in the false-positive set; mixed-evidence groups increment
/// both, mirroring the non-exclusive protein classification.
pub fn roc_counts(output: &ProteinOutput, classified: &Classified) -> (Vec<u32>, Vec<u32>) {
    let mut fps = Vec::with_capacity(output.len());
    let mut tps = Vec::with_capacity(output.len());
    let mut fp = 0u32;
    let mut tp = 0u32;
    for group in &output.groups {
        if classified.group_is_fp(group) {
            fp += 1;
        }
        if classified.group_is_tp(group) {
            tp += 1;
        }
        fps.push(fp);
        tps.push(tp);
    }
    (fps, tps)
}

/// Normalized area under the (fp, tp) curve while false positives <= `n`.
///
/// Accumulation rule (kept identical between the grid search and final
/// reporting): trapezoids between consecutive ranks with distinct
/// false-positive counts, accumulated while fp < `n`, with `n` clamped to
/// the final false-positive count, normalized by `n * total_tp`. Degenerate
/// curves (no true positives, no false positives, or a single rank) score
/// 0.0.
pub fn roc_n(n: u32, fps: &[u32], tps: &[u32]) -> f64 {
    debug_assert_eq!(fps.len(), tps.len());
    let total_tp = tps.last().copied().unwrap_or(0);
    let n = n.min(fps.last().copied().unwrap_or(0));
    if total_tp == 0 || n == 0 {
        return 0.0;
    }
    let mut area = 0.0;
    for k in 0..fps.len() - 1 {
        if fps[k] >= n {
            break;
        }
        if fps[k] != fps[k + 1] {
            area += (fps[k + 1] - fps[k]) as f64 * (tps[k] + tps[k + 1]) as f64 / 2.0;
        }
    }
    area / (n as f64 * total_tp as f64)
}

/// Combined grid search objective: `(1 - LAMBDA) * mse_fdr - LAMBDA * roc_n`.
///
/// The optimizer maximizes this value as-is. The sign convention comes from
/// the reference model selection procedure and must not be "corrected":
/// changing it changes which grid cell wins.
pub fn objective(mse_fdr: f64, roc_n: f64) -> f64 {
    (1.0 - LAMBDA) * mse_fdr - LAMBDA * roc_n
}
