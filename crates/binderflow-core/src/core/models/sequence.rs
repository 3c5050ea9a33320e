use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Where a loaded sequence came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SequenceSource {
    Direct,
    Fasta { path: PathBuf },
    Structure { path: PathBuf, chain_id: String },
}

impl fmt::Display for SequenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceSource::Direct => write!(f, "direct"),
            SequenceSource::Fasta { path } => write!(f, "fasta:{}", path.display()),
            SequenceSource::Structure { path, chain_id } => {
                write!(f, "pdb:{}:{}", path.display(), chain_id)
            }
        }
    }
}

/// A protein sequence resolved from one of the supported sources.
///
/// Records are only created by the sequence loader, which guarantees a non-empty
/// sequence; the fields are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceRecord {
    name: String,
    sequence: String,
    source: SequenceSource,
}

impl SequenceRecord {
    pub(crate) fn new(name: impl Into<String>, sequence: String, source: SequenceSource) -> Self {
        debug_assert!(!sequence.is_empty());
        Self {
            name: name.into(),
            sequence,
            source,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn source(&self) -> &SequenceSource {
        &self.source
    }

    pub fn length(&self) -> usize {
        self.sequence.len()
    }

    /// Returns at most `max_len` leading residues, for console previews.
    pub fn preview(&self, max_len: usize) -> &str {
        let end = self.sequence.len().min(max_len);
        &self.sequence[..end]
    }
}

/// The user-facing description of a protein, before any file is touched.
///
/// When several sources are set, the loader resolves them in the order
/// `sequence` > `fasta_path` > `pdb_path`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProteinSpec {
    pub name: String,
    pub sequence: Option<String>,
    pub fasta_path: Option<PathBuf>,
    pub pdb_path: Option<PathBuf>,
    pub chain_id: Option<String>,
}

impl ProteinSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_sequence(mut self, sequence: impl Into<String>) -> Self {
        self.sequence = Some(sequence.into());
        self
    }

    pub fn with_fasta(mut self, path: impl Into<PathBuf>) -> Self {
        self.fasta_path = Some(path.into());
        self
    }

    pub fn with_pdb(mut self, path: impl Into<PathBuf>, chain_id: Option<String>) -> Self {
        self.pdb_path = Some(path.into());
        self.chain_id = chain_id;
        self
    }

    /// True when at least one sequence source is set.
    pub fn has_source(&self) -> bool {
        self.sequence.as_deref().is_some_and(|s| !s.is_empty())
            || self.fasta_path.is_some()
            || self.pdb_path.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_matches_sequence_length() {
        let record = SequenceRecord::new("t", "MKQH".to_string(), SequenceSource::Direct);
        assert_eq!(record.length(), 4);
        assert_eq!(record.sequence(), "MKQH");
    }

    #[test]
    fn preview_is_clamped_to_sequence_length() {
        let record = SequenceRecord::new("t", "MKQH".to_string(), SequenceSource::Direct);
        assert_eq!(record.preview(2), "MK");
        assert_eq!(record.preview(50), "MKQH");
    }

    #[test]
    fn source_display_matches_legacy_labels() {
        assert_eq!(SequenceSource::Direct.to_string(), "direct");
        assert_eq!(
            SequenceSource::Fasta {
                path: PathBuf::from("a.fasta")
            }
            .to_string(),
            "fasta:a.fasta"
        );
        assert_eq!(
            SequenceSource::Structure {
                path: PathBuf::from("t.pdb"),
                chain_id: "B".into()
            }
            .to_string(),
            "pdb:t.pdb:B"
        );
    }

    #[test]
    fn empty_inline_sequence_is_not_a_source() {
        assert!(!ProteinSpec::new("x").with_sequence("").has_source());
        assert!(ProteinSpec::new("x").with_fasta("x.fa").has_source());
    }
}
