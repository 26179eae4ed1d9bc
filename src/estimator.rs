//! Orchestrator that owns the association index and the model parameters,
//! and drives inference either at fixed (alpha, beta) or after a grid search.

use crate::evidence::{AssociationIndex, Classified, PeptideEvidence};
use crate::grid;
use crate::inference::InferenceEngine;
use crate::output::ProteinOutput;
use crate::params::ModelParameters;

/// Computes protein-level identification probabilities from peptide-level
/// evidence.
///
/// Lifecycle: construct, [`initialize`](Self::initialize) with the scored
/// evidence (builds the association index once), then
/// [`calculate_protein_probabilities`](Self::calculate_protein_probabilities).
/// The estimator holds at most one output at a time -- each scoring pass
/// replaces the previous one. Calling out of order is a caller bug and
/// panics rather than degrading.
pub struct ProteinProbEstimator<'a, E: InferenceEngine> {
    engine: E,
    params: ModelParameters,
    evidence: Option<&'a [PeptideEvidence]>,
    index: Option<AssociationIndex>,
    output: Option<ProteinOutput>,
}

impl<'a, E: InferenceEngine> ProteinProbEstimator<'a, E> {
    pub fn new(engine: E, params: ModelParameters) -> Self {
        Self {
            engine,
            params,
            evidence: None,
            index: None,
            output: None,
        }
    }

    /// Bind the scored peptide evidence and build the association index.
    ///
    /// Returns true iff a grid search is still needed, i.e. alpha or beta
    /// was left unassigned.
    pub fn initialize(&mut self, evidence: &'a [PeptideEvidence]) -> bool {
        let index = AssociationIndex::build(evidence);
        log::info!(
            "associated {} proteins with {} peptide evidence records",
            index.len(),
            evidence.len()
        );
        self.evidence = Some(evidence);
        self.index = Some(index);
        !self.params.assigned()
    }

    /// Calculate protein-level probabilities.
    ///
    /// With `run_grid_search` set, alpha and beta are first estimated by the
    /// grid search (any pre-assigned value collapses its axis); afterwards --
    /// and always -- one inference pass runs at the now-fixed parameters and
    /// its output is stored and returned.
    pub fn calculate_protein_probabilities(&mut self, run_grid_search: bool) -> &ProteinOutput {
        assert!(
            self.index.is_some(),
            "calculate_protein_probabilities called before initialize"
        );
        if run_grid_search {
            log::info!("estimating alpha and beta by grid search");
            grid::search(self);
            log::info!(
                "grid search selected alpha = {:.2}, beta = {:.2}",
                self.params.alpha,
                self.params.beta
            );
        }
        let output = self.run_inference();
        self.output = Some(output);
        self.output.as_ref().expect("output was just stored")
    }

    /// One full inference pass at the current parameters (the inference
    /// adapter): runs the engine fresh over the bound evidence and assembles
    /// the sorted, q-value-annotated output. Panics if alpha or beta is
    /// still unassigned -- that indicates a control-flow bug in the caller,
    /// not a recoverable condition.
    pub fn run_inference(&mut self) -> ProteinOutput {
        assert!(
            self.params.alpha_assigned(),
            "inference invoked with unassigned alpha"
        );
        assert!(
            self.params.beta_assigned(),
            "inference invoked with unassigned beta"
        );
        let evidence = self.evidence.expect("inference invoked before initialize");
        let index = self.index.as_ref().expect("inference invoked before initialize");
        let raw = self.engine.infer(&self.params, evidence, index);
        ProteinOutput::build(raw.probabilities, raw.groups)
    }

    /// Classify every indexed protein into (non-exclusive) true-positive and
    /// false-positive sets from its peptides' target/decoy labels.
    pub fn classify(&self) -> Classified {
        let evidence = self.evidence.expect("classify invoked before initialize");
        let index = self.index.as_ref().expect("classify invoked before initialize");
        index.classify(evidence)
    }

    pub fn params(&self) -> ModelParameters {
        self.params
    }

    pub(crate) fn set_alpha_beta(&mut self, alpha: f64, beta: f64) {
        self.params.alpha = alpha;
        self.params.beta = beta;
    }

    /// Skip the grid search by falling back to the stock alpha/beta values.
    pub fn set_default_parameters(&mut self) {
        self.params.set_defaults();
    }

    pub fn index(&self) -> &AssociationIndex {
        self.index.as_ref().expect("estimator is not initialized")
    }

    /// Most recent scoring output, if a pass has completed.
    pub fn output(&self) -> Option<&ProteinOutput> {
        self.output.as_ref()
    }
}
