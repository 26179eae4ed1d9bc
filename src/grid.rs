//! Grid search over the (alpha, beta) smoothing priors.
//!
//! Selects the pair that jointly maximizes sensitivity (ROC50) and
//! calibration (MSE between estimated and empirical FDR) by exhaustively
//! re-running inference across a 2-D parameter grid. Each cell is a full,
//! independent inference pass; nothing is cached between cells.

use crate::estimator::ProteinProbEstimator;
use crate::evidence::Classified;
use crate::inference::InferenceEngine;
use crate::metrics;
use crate::output::ProteinOutput;
use crate::params::ModelParameters;

pub const ALPHA_LOWER: f64 = 0.01;
pub const ALPHA_UPPER: f64 = 0.76;
pub const BETA_LOWER: f64 = 0.0;
pub const BETA_UPPER: f64 = 0.80;
pub const GRID_STEP: f64 = 0.05;

/// One evaluated grid cell: the candidate parameters, the combined objective
/// value, and the true/false-positive protein sets discovered at that point.
#[derive(Clone, Debug)]
pub struct Evaluated {
    pub alpha: f64,
    pub beta: f64,
    pub objective: f64,
    pub classified: Classified,
}

/// Optional per-cell diagnostics sink. The default [`NoTrace`] discards
/// everything; tests and offline analysis can capture the intermediate
/// outputs and curves of every cell instead.
pub trait GridTrace {
    fn record(
        &mut self,
        point: &Evaluated,
        output: &ProteinOutput,
        estimated_fdr: &[f64],
        empirical_fdr: &[f64],
        fps: &[u32],
        tps: &[u32],
    );
}

/// Discards all per-cell diagnostics.
pub struct NoTrace;

impl GridTrace for NoTrace {
    fn record(
        &mut self,
        _point: &Evaluated,
        _output: &ProteinOutput,
        _estimated_fdr: &[f64],
        _empirical_fdr: &[f64],
        _fps: &[u32],
        _tps: &[u32],
    ) {
    }
}

/// Axis values from `lower` to `upper` inclusive at `step` resolution.
///
/// The loop bound carries a half-step tolerance so that accumulated
/// floating-point drift can neither skip the documented upper bound nor
/// overshoot it by a full step.
pub(crate) fn grid_axis(lower: f64, upper: f64, step: f64) -> Vec<f64> {
    let mut axis = Vec::new();
    let mut value = lower;
    while value <= upper + step * 0.5 {
        axis.push(value);
        value += step;
    }
    axis
}

/// Run the grid search and leave the estimator's alpha/beta at the best
/// point found. A pre-assigned alpha (resp. beta) collapses that axis to the
/// single supplied value, so with both assigned exactly one cell is
/// evaluated and the parameters pass through unchanged.
pub fn search<E: InferenceEngine>(estimator: &mut ProteinProbEstimator<'_, E>) -> ModelParameters {
    search_with_trace(estimator, &mut NoTrace)
}

/// [`search`], forwarding every evaluated cell to `trace`.
pub fn search_with_trace<E: InferenceEngine>(
    estimator: &mut ProteinProbEstimator<'_, E>,
    trace: &mut dyn GridTrace,
) -> ModelParameters {
    let params = estimator.params();
    let alphas = match params.alpha_assigned() {
        true => vec![params.alpha],
        false => grid_axis(ALPHA_LOWER, ALPHA_UPPER, GRID_STEP),
    };
    let betas = match params.beta_assigned() {
        true => vec![params.beta],
        false => grid_axis(BETA_LOWER, BETA_UPPER, GRID_STEP),
    };

    // Strictly-greater comparison against the most negative representable
    // starting value: the first cell always becomes current best, and exact
    // ties keep the earlier-evaluated cell (lower alpha, then lower beta).
    let mut best: Option<Evaluated> = None;
    let mut best_objective = f64::MIN;
    for &alpha in &alphas {
        for &beta in &betas {
            log::debug!("- testing alpha = {:.2}, beta = {:.2}", alpha, beta);
            let point = evaluate(estimator, alpha, beta, trace);
            log::debug!("- objective function value: {:.8}", point.objective);
            if point.objective > best_objective {
                log::trace!("- best parameters so far");
                best_objective = point.objective;
                best = Some(point);
            }
        }
    }

    let best = best.expect("grid axes are never empty");
    estimator.set_alpha_beta(best.alpha, best.beta);
    estimator.params()
}

/// Evaluate one grid cell: run a full inference pass at (alpha, beta),
/// classify the indexed proteins, and score the output with the combined
/// calibration/sensitivity objective.
fn evaluate<E: InferenceEngine>(
    estimator: &mut ProteinProbEstimator<'_, E>,
    alpha: f64,
    beta: f64,
    trace: &mut dyn GridTrace,
) -> Evaluated {
    estimator.set_alpha_beta(alpha, beta);
    let output = estimator.run_inference();
    let classified = estimator.classify();

    let (estimated, empirical) = metrics::fdr_curves(&output, &classified);
    let mse_fdr = metrics::mse_fdr(metrics::MSE_FDR_THRESHOLD, &estimated, &empirical);

    let (fps, tps) = metrics::roc_counts(&output, &classified);
    let roc50 = metrics::roc_n(metrics::ROC_FP_LIMIT, &fps, &tps);

    let point = Evaluated {
        alpha,
        beta,
        objective: metrics::objective(mse_fdr, roc50),
        classified,
    };
    trace.record(&point, &output, &estimated, &empirical, &fps, &tps);
    point
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::evidence::{AssociationIndex, PeptideEvidence};
    use crate::inference::RawInference;
    use crate::params::UNASSIGNED;
    use std::sync::Arc;

    #[test]
    fn axes_cover_inclusive_bounds_despite_fp_drift() {
        let alphas = grid_axis(ALPHA_LOWER, ALPHA_UPPER, GRID_STEP);
        assert_eq!(alphas.len(), 16);
        assert!((alphas[0] - 0.01).abs() < 1e-9);
        assert!((alphas.last().unwrap() - 0.76).abs() < 1e-9);

        let betas = grid_axis(BETA_LOWER, BETA_UPPER, GRID_STEP);
        assert_eq!(betas.len(), 17);
        assert!((betas.last().unwrap() - 0.80).abs() < 1e-9);
    }

    fn evidence() -> Vec<PeptideEvidence> {
        vec![
            PeptideEvidence::new("AAAK", 1, 0.9, ["P1"]),
            PeptideEvidence::new("CCCK", -1, 0.2, ["P2"]),
        ]
    }

    fn constant_engine(
        _: &ModelParameters,
        _: &[PeptideEvidence],
        _: &AssociationIndex,
    ) -> RawInference {
        RawInference {
            probabilities: vec![0.9, 0.2],
            groups: vec![vec![Arc::from("P1")], vec![Arc::from("P2")]],
        }
    }

    #[test]
    fn ties_keep_the_earliest_cell() {
        // a parameter-blind engine gives every cell the same objective, so
        // the first cell evaluated (lowest alpha, then lowest beta) wins
        let evidence = evidence();
        let mut est = ProteinProbEstimator::new(constant_engine, ModelParameters::default());
        est.initialize(&evidence);
        let chosen = search(&mut est);
        assert!((chosen.alpha - ALPHA_LOWER).abs() < 1e-9);
        assert!((chosen.beta - BETA_LOWER).abs() < 1e-9);
    }

    #[test]
    fn fixed_parameters_collapse_to_a_single_cell() {
        let evidence = evidence();
        let calls = std::cell::Cell::new(0usize);
        let counting = |_: &ModelParameters, _: &[PeptideEvidence], _: &AssociationIndex| {
            calls.set(calls.get() + 1);
            RawInference {
                probabilities: vec![0.9, 0.2],
                groups: vec![vec![Arc::from("P1")], vec![Arc::from("P2")]],
            }
        };
        let mut est = ProteinProbEstimator::new(counting, ModelParameters::new(0.31, 0.45));
        est.initialize(&evidence);
        let chosen = search(&mut est);
        assert_eq!(calls.get(), 1);
        assert_eq!(chosen.alpha, 0.31);
        assert_eq!(chosen.beta, 0.45);
    }

    #[test]
    fn fixing_one_axis_searches_only_the_other() {
        let evidence = evidence();
        let calls = std::cell::Cell::new(0usize);
        let counting = |_: &ModelParameters, _: &[PeptideEvidence], _: &AssociationIndex| {
            calls.set(calls.get() + 1);
            RawInference {
                probabilities: vec![0.9, 0.2],
                groups: vec![vec![Arc::from("P1")], vec![Arc::from("P2")]],
            }
        };
        let mut est =
            ProteinProbEstimator::new(counting, ModelParameters::new(0.31, UNASSIGNED));
        est.initialize(&evidence);
        let chosen = search(&mut est);
        // one alpha value, 17 beta values
        assert_eq!(calls.get(), 17);
        assert_eq!(chosen.alpha, 0.31);
        assert!((chosen.beta - BETA_LOWER).abs() < 1e-9);
    }

    #[test]
    fn strictly_better_cell_wins() {
        // well calibrated everywhere except one cell, where the estimated
        // FDR drops under the MSE threshold and the squared error explodes;
        // with the reference sign convention that cell *wins*
        let evidence = evidence();
        let engine = |params: &ModelParameters, _: &[PeptideEvidence], _: &AssociationIndex| {
            let special =
                (params.alpha - 0.26).abs() < 1e-6 && (params.beta - 0.25).abs() < 1e-6;
            let probabilities = match special {
                true => vec![0.05, 0.01],
                false => vec![0.5, 0.4],
            };
            RawInference {
                probabilities,
                groups: vec![vec![Arc::from("P1")], vec![Arc::from("P2")]],
            }
        };
        let mut est = ProteinProbEstimator::new(engine, ModelParameters::default());
        est.initialize(&evidence);
        let chosen = search(&mut est);
        assert!((chosen.alpha - 0.26).abs() < 1e-6);
        assert!((chosen.beta - 0.25).abs() < 1e-6);
    }

    #[test]
    fn search_leaves_estimator_at_the_chosen_point() {
        let evidence = evidence();
        let mut est = ProteinProbEstimator::new(constant_engine, ModelParameters::default());
        est.initialize(&evidence);
        let chosen = search(&mut est);
        assert_eq!(est.params().alpha, chosen.alpha);
        assert_eq!(est.params().beta, chosen.beta);
        // a final pass at the chosen parameters now succeeds
        est.calculate_protein_probabilities(false);
    }

    #[test]
    fn trace_sees_every_cell() {
        struct Counting(usize);
        impl GridTrace for Counting {
            fn record(
                &mut self,
                _point: &Evaluated,
                _output: &ProteinOutput,
                _estimated: &[f64],
                _empirical: &[f64],
                _fps: &[u32],
                _tps: &[u32],
            ) {
                self.0 += 1;
            }
        }
        let evidence = evidence();
        let mut est = ProteinProbEstimator::new(constant_engine, ModelParameters::default());
        est.initialize(&evidence);
        let mut trace = Counting(0);
        search_with_trace(&mut est, &mut trace);
        assert_eq!(trace.0, 16 * 17);
    }
}
