use crate::core::io::fasta::{FastaError, FastaFile};
use crate::core::io::input_file::{InputDocument, InputFile, InputFileError};
use crate::core::io::pdb::{DEFAULT_CHAIN_ID, PdbChainReader, PdbError};
use crate::core::io::traits::SequenceFile;
use crate::core::models::sequence::{ProteinSpec, SequenceRecord, SequenceSource};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const PREVIEW_RESIDUES: usize = 10;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Empty sequence loaded for '{0}'")]
    EmptySequence(String),

    #[error("No sequence source specified for '{0}' (sequence, fasta path, or pdb path)")]
    UnsupportedSource(String),

    #[error("Sequence for '{name}' contains invalid character '{character}'")]
    InvalidResidue { name: String, character: char },

    #[error("Failed to read FASTA file '{path}': {source}", path = path.display())]
    Fasta {
        path: PathBuf,
        #[source]
        source: FastaError,
    },

    #[error("Failed to read PDB file '{path}': {source}", path = path.display())]
    Pdb {
        path: PathBuf,
        #[source]
        source: PdbError,
    },

    #[error("Failed to read input file '{path}': {source}", path = path.display())]
    InputFile {
        path: PathBuf,
        #[source]
        source: InputFileError,
    },
}

/// Resolves a protein specification into a sequence record.
///
/// Sources are tried in the fixed order inline sequence, FASTA file, PDB file; the
/// first one present wins and the others are never read. Residues are uppercased
/// whatever the source.
///
/// # Errors
///
/// - [`LoadError::UnsupportedSource`] if the spec names no source.
/// - [`LoadError::NotFound`] if the selected file does not exist.
/// - [`LoadError::EmptySequence`] if extraction yields zero residues.
/// - [`LoadError::InvalidResidue`] if the sequence contains non-letter characters.
pub fn load(spec: &ProteinSpec) -> Result<SequenceRecord, LoadError> {
    let (sequence, source) = if let Some(inline) = spec.sequence.as_deref().filter(|s| !s.is_empty())
    {
        let sequence: String = inline
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        (sequence, SequenceSource::Direct)
    } else if let Some(path) = &spec.fasta_path {
        ensure_exists(path)?;
        let sequence = FastaFile
            .read_from_path(path)
            .map_err(|source| LoadError::Fasta {
                path: path.clone(),
                source,
            })?;
        (sequence, SequenceSource::Fasta { path: path.clone() })
    } else if let Some(path) = &spec.pdb_path {
        ensure_exists(path)?;
        let chain_id = spec
            .chain_id
            .clone()
            .unwrap_or_else(|| DEFAULT_CHAIN_ID.to_string());
        let sequence = PdbChainReader::new(chain_id.clone())
            .read_from_path(path)
            .map_err(|source| LoadError::Pdb {
                path: path.clone(),
                source,
            })?;
        (
            sequence,
            SequenceSource::Structure {
                path: path.clone(),
                chain_id,
            },
        )
    } else {
        return Err(LoadError::UnsupportedSource(spec.name.clone()));
    };
    let sequence = sequence.to_ascii_uppercase();

    if sequence.is_empty() {
        return Err(LoadError::EmptySequence(spec.name.clone()));
    }
    if let Some(character) = sequence.chars().find(|c| !c.is_ascii_alphabetic()) {
        return Err(LoadError::InvalidResidue {
            name: spec.name.clone(),
            character,
        });
    }

    let record = SequenceRecord::new(spec.name.clone(), sequence, source);
    info!(
        "Loaded '{}' from {} ({} residues, {}...)",
        record.name(),
        record.source(),
        record.length(),
        record.preview(PREVIEW_RESIDUES)
    );
    Ok(record)
}

/// Reads a `key=value` input file describing a target and an optional binder.
pub fn load_input_file(path: &Path) -> Result<InputDocument, LoadError> {
    ensure_exists(path)?;
    debug!("Reading input file {:?}", path);
    InputFile
        .read_from_path(path)
        .map_err(|source| LoadError::InputFile {
            path: path.to_path_buf(),
            source,
        })
}

fn ensure_exists(path: &Path) -> Result<(), LoadError> {
    if path.exists() {
        Ok(())
    } else {
        Err(LoadError::NotFound(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const TARGET_50: &str = "MKQHKAMIVALIVICITAVVAALVTRKDLCEVHIRTGQTEVAVFTAYESE";

    #[test]
    fn inline_sequence_is_normalized() {
        let spec = ProteinSpec::new("t").with_sequence(" mkqh\nKAM ");
        let record = load(&spec).unwrap();
        assert_eq!(record.sequence(), "MKQHKAM");
        assert_eq!(record.length(), 7);
        assert_eq!(record.source(), &SequenceSource::Direct);
    }

    #[test]
    fn inline_sequence_takes_precedence_and_fasta_is_never_read() {
        let spec = ProteinSpec::new("t")
            .with_sequence(TARGET_50)
            .with_fasta("/definitely/not/here.fasta")
            .with_pdb("/definitely/not/here.pdb", None);
        let record = load(&spec).unwrap();
        assert_eq!(record.sequence(), TARGET_50);
        assert_eq!(record.source(), &SequenceSource::Direct);
    }

    #[test]
    fn fasta_takes_precedence_over_pdb() {
        let dir = tempdir().unwrap();
        let fasta = dir.path().join("t.fasta");
        fs::write(&fasta, ">t\nMKQH\n").unwrap();
        let spec = ProteinSpec::new("t")
            .with_fasta(&fasta)
            .with_pdb(dir.path().join("missing.pdb"), None);
        let record = load(&spec).unwrap();
        assert_eq!(record.sequence(), "MKQH");
        assert_eq!(record.source(), &SequenceSource::Fasta { path: fasta });
    }

    #[test]
    fn fasta_round_trip_is_stable() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.fasta");
        fs::write(&first, format!(">target desc\n{}\n{}\n", &TARGET_50[..25], &TARGET_50[25..])).unwrap();
        let loaded = load(&ProteinSpec::new("t").with_fasta(&first)).unwrap();

        let second = dir.path().join("second.fasta");
        let mut buffer = Vec::new();
        FastaFile::write_record("target desc", loaded.sequence(), &mut buffer).unwrap();
        fs::write(&second, buffer).unwrap();
        let reloaded = load(&ProteinSpec::new("t").with_fasta(&second)).unwrap();

        assert_eq!(reloaded.sequence(), loaded.sequence());
        assert_eq!(loaded.sequence(), TARGET_50);
    }

    #[test]
    fn lowercase_fasta_is_uppercased_like_inline_input() {
        let dir = tempdir().unwrap();
        let fasta = dir.path().join("lower.fasta");
        fs::write(&fasta, ">t\nmkqh\n").unwrap();

        assert_eq!(FastaFile.read_from_path(&fasta).unwrap(), "mkqh");
        let from_file = load(&ProteinSpec::new("t").with_fasta(&fasta)).unwrap();
        let inline = load(&ProteinSpec::new("t").with_sequence("mkqh")).unwrap();
        assert_eq!(from_file.sequence(), "MKQH");
        assert_eq!(from_file.sequence(), inline.sequence());
    }

    #[test]
    fn pdb_source_uses_default_chain_a() {
        let dir = tempdir().unwrap();
        let pdb = dir.path().join("t.pdb");
        fs::write(
            &pdb,
            "ATOM      1  CA  GLY A   1       0.000   0.000   0.000  1.00  0.00           C\n\
             ATOM      2  CA  SER B   1       0.000   0.000   0.000  1.00  0.00           C\n",
        )
        .unwrap();
        let record = load(&ProteinSpec::new("t").with_pdb(&pdb, None)).unwrap();
        assert_eq!(record.sequence(), "G");
        assert_eq!(
            record.source(),
            &SequenceSource::Structure {
                path: pdb.clone(),
                chain_id: "A".into()
            }
        );

        let record = load(&ProteinSpec::new("t").with_pdb(&pdb, Some("B".into()))).unwrap();
        assert_eq!(record.sequence(), "S");
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load(&ProteinSpec::new("t").with_fasta("/no/such/file.fasta")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(p) if p == PathBuf::from("/no/such/file.fasta")));
    }

    #[test]
    fn header_only_fasta_is_empty_sequence() {
        let dir = tempdir().unwrap();
        let fasta = dir.path().join("empty.fasta");
        fs::write(&fasta, ">nothing here\n").unwrap();
        let err = load(&ProteinSpec::new("t").with_fasta(&fasta)).unwrap_err();
        assert!(matches!(err, LoadError::EmptySequence(name) if name == "t"));
    }

    #[test]
    fn spec_without_sources_is_unsupported() {
        let err = load(&ProteinSpec::new("t")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedSource(_)));
        let err = load(&ProteinSpec::new("t").with_sequence("")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedSource(_)));
    }

    #[test]
    fn digits_in_sequence_are_rejected() {
        let err = load(&ProteinSpec::new("t").with_sequence("MKQ1")).unwrap_err();
        assert!(matches!(err, LoadError::InvalidResidue { character: '1', .. }));
    }

    #[test]
    fn input_file_round_trips_through_loader() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("input.txt");
        fs::write(&path, "target_sequence=MKQH\nbinder_sequence=MAEG\njob_name=t1\n").unwrap();
        let doc = load_input_file(&path).unwrap();
        assert_eq!(load(&doc.target).unwrap().sequence(), "MKQH");
        assert_eq!(load(doc.binder.as_ref().unwrap()).unwrap().sequence(), "MAEG");
    }

    #[test]
    fn missing_input_file_is_not_found() {
        let err = load_input_file(Path::new("/no/such/input.txt")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }
}
