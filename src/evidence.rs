//! Peptide evidence records and the protein -> peptide association index.
//!
//! Peptides are ambiguous: a single peptide sequence may map to several
//! candidate proteins, and a protein's evidence is the pooled support of all
//! peptides assigned to it. The [`AssociationIndex`] materializes that
//! many-to-many relationship once, keyed by protein identifier, so that the
//! grid search and the report writers can look up a protein's peptides
//! without rescanning the evidence list.

use fnv::{FnvHashMap, FnvHashSet};
use serde::Serialize;
use std::sync::Arc;

/// A scored, target/decoy-labeled peptide identification produced by the
/// upstream peptide scorer. Immutable once constructed; the association
/// index refers to records by position in the caller's slice.
#[derive(Clone, Debug, Serialize)]
pub struct PeptideEvidence {
    /// Peptide sequence, without flanking residues
    pub peptide: String,
    /// Target/Decoy label, 1 is target, anything else is decoy
    pub label: i32,
    /// Posterior-error-probability-like score assigned by the peptide scorer
    pub score: f64,
    /// Candidate proteins this peptide maps to (unique, order as supplied)
    pub proteins: Vec<Arc<str>>,
}

impl PeptideEvidence {
    /// Build an evidence record, de-duplicating the protein set while
    /// preserving first-seen order.
    pub fn new<P, S>(peptide: impl Into<String>, label: i32, score: f64, proteins: P) -> Self
    where
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = FnvHashSet::default();
        let proteins = proteins
            .into_iter()
            .filter_map(|p| {
                let p: Arc<str> = Arc::from(p.as_ref());
                seen.insert(p.clone()).then_some(p)
            })
            .collect();
        Self {
            peptide: peptide.into(),
            label,
            score,
            proteins,
        }
    }

    pub fn is_target(&self) -> bool {
        self.label == 1
    }
}

/// Position of an evidence record in the caller-owned evidence slice.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EvidenceIx(pub u32);

/// Target/decoy classification of every protein in the index, derived from
/// the labels of the associated peptides.
///
/// The two sets are *not* mutually exclusive: a protein whose peptides carry
/// both target and decoy labels is a member of both. Downstream metrics rely
/// on this, so it must not be collapsed to a single assignment.
#[derive(Clone, Debug, Default)]
pub struct Classified {
    pub true_positives: FnvHashSet<Arc<str>>,
    pub false_positives: FnvHashSet<Arc<str>>,
}

impl Classified {
    /// A protein group counts as true positive if any member protein does.
    pub fn group_is_tp(&self, group: &[Arc<str>]) -> bool {
        group.iter().any(|p| self.true_positives.contains(p))
    }

    /// A protein group counts as false positive if any member protein does.
    pub fn group_is_fp(&self, group: &[Arc<str>]) -> bool {
        group.iter().any(|p| self.false_positives.contains(p))
    }
}

/// Mapping from protein identifier to the evidence records that reference it.
///
/// Entries are kept in insertion order: the first evidence record mentioning
/// a protein fixes that protein's position, which keeps classification and
/// report iteration deterministic for a given evidence list.
#[derive(Clone, Debug, Default)]
pub struct AssociationIndex {
    entries: Vec<(Arc<str>, Vec<EvidenceIx>)>,
    lookup: FnvHashMap<Arc<str>, usize>,
}

impl AssociationIndex {
    /// Fan every evidence record out under each of its candidate proteins,
    /// creating protein entries on first sight.
    pub fn build(evidence: &[PeptideEvidence]) -> Self {
        let mut index = Self::default();
        for (i, record) in evidence.iter().enumerate() {
            let ix = EvidenceIx(i as u32);
            for protein in &record.proteins {
                let slot = match index.lookup.get(protein) {
                    Some(&slot) => slot,
                    None => {
                        index.entries.push((protein.clone(), Vec::new()));
                        index.lookup.insert(protein.clone(), index.entries.len() - 1);
                        index.entries.len() - 1
                    }
                };
                let peptides = &mut index.entries[slot].1;
                // guards against a record listing the same protein twice
                if peptides.last() != Some(&ix) {
                    peptides.push(ix);
                }
            }
        }
        index
    }

    /// Number of distinct protein keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evidence records associated with a protein, in evidence order.
    pub fn peptides(&self, protein: &str) -> Option<&[EvidenceIx]> {
        self.lookup
            .get(protein)
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    /// Iterate (protein, peptides) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, &[EvidenceIx])> {
        self.entries
            .iter()
            .map(|(protein, peptides)| (protein, peptides.as_slice()))
    }

    /// Maximum, over the given proteins, of the number of distinct peptides
    /// associated with that protein. Proteins absent from the index
    /// contribute 0. Used by inference engines as a per-group feature.
    pub fn max_peptide_fanout<P, S>(&self, proteins: P) -> usize
    where
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        proteins
            .into_iter()
            .map(|p| self.peptides(p.as_ref()).map_or(0, |peps| peps.len()))
            .max()
            .unwrap_or(0)
    }

    /// Classify every protein in the index by the labels of its peptides:
    /// any target-labeled peptide marks the protein true positive, any
    /// decoy-labeled peptide marks it false positive. A protein with mixed
    /// evidence lands in both sets.
    pub fn classify(&self, evidence: &[PeptideEvidence]) -> Classified {
        let mut classified = Classified::default();
        for (protein, peptides) in self.iter() {
            let mut tp = false;
            let mut fp = false;
            for &EvidenceIx(ix) in peptides {
                if evidence[ix as usize].is_target() {
                    tp = true;
                } else {
                    fp = true;
                }
            }
            if tp {
                classified.true_positives.insert(protein.clone());
            }
            if fp {
                classified.false_positives.insert(protein.clone());
            }
        }
        classified
    }
}
