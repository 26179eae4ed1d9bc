//! Assembly of the ranked, q-value-annotated protein-level output from the
//! raw probability/group arrays produced by an inference engine run.

use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;

/// Ranked protein-group output of a single inference pass.
///
/// The three columns are parallel: `peps[k]` is the probability-as-error
/// estimate of group `groups[k]`, ranked best first, and `q_values[k]` is the
/// running mean of `peps[0..=k]` -- the expected false-discovery proportion
/// among the top `k + 1` groups. Because the PEPs are sorted descending,
/// the q-values are monotone (non-increasing) by construction.
#[derive(Clone, Debug, Serialize)]
pub struct ProteinOutput {
    pub peps: Vec<f64>,
    pub groups: Vec<Vec<Arc<str>>>,
    pub q_values: Vec<f64>,
}

impl ProteinOutput {
    /// Sort the raw probabilities descending (carrying the group names along
    /// by the same permutation) and annotate each rank with its q-value.
    ///
    /// The sort is stable, so groups with equal probability retain their
    /// relative order from the raw engine output and the ranking is fully
    /// deterministic.
    ///
    /// Panics if `probabilities` is empty or the arrays disagree in length:
    /// both indicate a bug in the calling inference adapter.
    pub fn build(probabilities: Vec<f64>, groups: Vec<Vec<Arc<str>>>) -> Self {
        assert!(
            !probabilities.is_empty(),
            "cannot build protein output from an empty probability array"
        );
        assert_eq!(
            probabilities.len(),
            groups.len(),
            "probability and group arrays must be parallel"
        );

        let mut order = (0..probabilities.len()).collect::<Vec<_>>();
        order.par_sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));

        let peps = order.iter().map(|&i| probabilities[i]).collect::<Vec<_>>();
        let mut groups = groups;
        let groups = order
            .iter()
            .map(|&i| std::mem::take(&mut groups[i]))
            .collect::<Vec<_>>();

        let mut sum = 0.0;
        let q_values = peps
            .iter()
            .enumerate()
            .map(|(k, pep)| {
                sum += pep;
                sum / (k + 1) as f64
            })
            .collect();

        Self {
            peps,
            groups,
            q_values,
        }
    }

    pub fn len(&self) -> usize {
        self.peps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peps.is_empty()
    }
}
