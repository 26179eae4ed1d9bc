//! Result writers: the plain-text ranking and the XML `<proteins>` fragment.

use crate::evidence::{AssociationIndex, EvidenceIx, PeptideEvidence};
use crate::output::ProteinOutput;
use crate::Error;
use itertools::Itertools;
use std::io::Write;
use std::sync::Arc;

/// Deterministic display identifier for a protein group: member names
/// sorted lexicographically and joined with `/`.
pub fn group_id(members: &[Arc<str>]) -> String {
    members.iter().map(|p| p.as_ref()).sorted().join("/")
}

/// One line per ranked group, best rank first:
/// `<probability-as-error-estimate> <protein-group-id>`.
pub fn write_flat<W: Write>(output: &ProteinOutput, mut writer: W) -> Result<(), Error> {
    for k in 0..output.len() {
        writeln!(writer, "{} {}", output.peps[k], group_id(&output.groups[k]))?;
    }
    Ok(())
}

/// Append a `<proteins>` block to an existing XML stream: for each ranked
/// group, one `<protein>` element per member protein carrying the PEP, the
/// q-value, and a `<peptide_seq>` element for every peptide the association
/// index holds for that protein.
pub fn write_xml<W: Write>(
    output: &ProteinOutput,
    index: &AssociationIndex,
    evidence: &[PeptideEvidence],
    mut writer: W,
) -> Result<(), Error> {
    writeln!(writer, "  <proteins>")?;
    for k in 0..output.len() {
        for protein in &output.groups[k] {
            writeln!(writer, "    <protein p:protein_id=\"{}\">", protein)?;
            writeln!(writer, "      <pep>{}</pep>", output.peps[k])?;
            writeln!(writer, "      <q_value>{}</q_value>", output.q_values[k])?;
            if let Some(peptides) = index.peptides(protein) {
                for &EvidenceIx(ix) in peptides {
                    let record = &evidence[ix as usize];
                    // the index entry and the record's own protein set must
                    // agree, or the index was built from different evidence
                    debug_assert!(record.proteins.iter().any(|p| p == protein));
                    writeln!(writer, "      <peptide_seq seq=\"{}\"/>", record.peptide)?;
                }
            }
            writeln!(writer, "    </protein>")?;
        }
    }
    writeln!(writer, "  </proteins>")?;
    writeln!(writer)?;
    Ok(())
}
