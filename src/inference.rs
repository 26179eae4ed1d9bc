//! Boundary to the external bipartite-graph inference engine.
//!
//! The engine itself (the factor-graph machinery that turns the
//! peptide-protein graph into per-group marginal probabilities) is a
//! separate subsystem; this module only pins down the contract the
//! estimator and grid search require from it.

use crate::evidence::{AssociationIndex, PeptideEvidence};
use crate::params::ModelParameters;
use std::sync::Arc;

/// Raw parallel arrays produced by one engine run: a flat probability array
/// and, ordered identically, the member proteins of each scored group.
/// Proteins indistinguishable by the available evidence are expected to be
/// merged into a single group by the engine.
#[derive(Clone, Debug, Default)]
pub struct RawInference {
    pub probabilities: Vec<f64>,
    pub groups: Vec<Vec<Arc<str>>>,
}

/// A protein inference engine.
///
/// `infer` is one full inference pass: alpha and beta arrive pinned to
/// single values (the degenerate `[alpha, alpha]` range of the reference
/// engine) together with the fixed gamma prior. Every call must behave as a
/// fresh run over the supplied evidence -- implementations must not carry
/// fitted state from one call into the next, since the grid search relies on
/// each cell being evaluated independently. The association index is passed
/// alongside the evidence so engines can use primitives like
/// [`AssociationIndex::max_peptide_fanout`] as features.
pub trait InferenceEngine {
    fn infer(
        &mut self,
        params: &ModelParameters,
        evidence: &[PeptideEvidence],
        index: &AssociationIndex,
    ) -> RawInference;
}

impl<F> InferenceEngine for F
where
    F: FnMut(&ModelParameters, &[PeptideEvidence], &AssociationIndex) -> RawInference,
{
    fn infer(
        &mut self,
        params: &ModelParameters,
        evidence: &[PeptideEvidence],
        index: &AssociationIndex,
    ) -> RawInference {
        self(params, evidence, index)
    }
}
