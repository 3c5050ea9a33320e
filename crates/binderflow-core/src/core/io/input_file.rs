use super::traits::SequenceFile;
use crate::core::models::sequence::ProteinSpec;
use std::collections::HashMap;
use std::io::{self, BufRead};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_JOB_NAME: &str = "binding_test";

const KNOWN_SUFFIXES: [&str; 5] = ["name", "sequence", "fasta", "pdb", "chain"];

#[derive(Debug, Error)]
pub enum InputFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed line {line}: expected KEY=VALUE, found '{content}'")]
    MalformedLine { line: usize, content: String },
}

/// The proteins and job name described by a `key=value` input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDocument {
    pub target: ProteinSpec,
    /// Absent when the file carries no `binder_*` key; the generation flow needs only a target.
    pub binder: Option<ProteinSpec>,
    pub job_name: String,
}

/// Reader for the plain-text input format.
///
/// ```text
/// # comment
/// target_name=MyTarget
/// target_fasta=./test_data/target.fasta
/// binder_sequence=MKQHKAMIV...
/// job_name=t1
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct InputFile;

impl SequenceFile for InputFile {
    type Output = InputDocument;
    type Error = InputFileError;

    fn read_from(&self, reader: &mut impl BufRead) -> Result<Self::Output, Self::Error> {
        let mut entries: HashMap<String, String> = HashMap::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(InputFileError::MalformedLine {
                    line: line_num + 1,
                    content: trimmed.to_string(),
                });
            };
            entries.insert(key.trim().to_string(), value.trim().to_string());
        }

        for key in entries.keys() {
            let recognized = key == "job_name"
                || ["target_", "binder_"].iter().any(|prefix| {
                    key.strip_prefix(prefix)
                        .is_some_and(|suffix| KNOWN_SUFFIXES.contains(&suffix))
                });
            if !recognized {
                debug!("Ignoring unrecognized input key '{}'", key);
            }
        }

        let target = protein_from_entries(&entries, "target");
        let binder = entries
            .keys()
            .any(|k| k.starts_with("binder_"))
            .then(|| protein_from_entries(&entries, "binder"));
        let job_name = entries
            .get("job_name")
            .cloned()
            .unwrap_or_else(|| DEFAULT_JOB_NAME.to_string());

        Ok(InputDocument {
            target,
            binder,
            job_name,
        })
    }
}

fn protein_from_entries(entries: &HashMap<String, String>, role: &str) -> ProteinSpec {
    let get = |suffix: &str| {
        entries
            .get(&format!("{}_{}", role, suffix))
            .filter(|v| !v.is_empty())
            .cloned()
    };
    ProteinSpec {
        name: get("name").unwrap_or_else(|| role.to_string()),
        sequence: get("sequence"),
        fasta_path: get("fasta").map(Into::into),
        pdb_path: get("pdb").map(Into::into),
        chain_id: get("chain"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn read(content: &str) -> Result<InputDocument, InputFileError> {
        InputFile.read_from(&mut Cursor::new(content))
    }

    #[test]
    fn parses_keys_comments_and_blank_lines() {
        let doc = read(
            "# binding test\n\ntarget_name = MyTarget\ntarget_fasta=./target.fasta\n\
             binder_name=MyBinder\nbinder_sequence=MKQHKAMIV\njob_name=t1\n",
        )
        .unwrap();

        assert_eq!(doc.target.name, "MyTarget");
        assert_eq!(doc.target.fasta_path, Some(PathBuf::from("./target.fasta")));
        let binder = doc.binder.unwrap();
        assert_eq!(binder.name, "MyBinder");
        assert_eq!(binder.sequence.as_deref(), Some("MKQHKAMIV"));
        assert_eq!(doc.job_name, "t1");
    }

    #[test]
    fn defaults_apply_for_missing_names() {
        let doc = read("target_sequence=MKQH\nbinder_sequence=MAEG\n").unwrap();
        assert_eq!(doc.target.name, "target");
        assert_eq!(doc.binder.unwrap().name, "binder");
        assert_eq!(doc.job_name, DEFAULT_JOB_NAME);
    }

    #[test]
    fn pdb_source_carries_chain() {
        let doc = read("target_pdb=t.pdb\ntarget_chain=B\n").unwrap();
        assert_eq!(doc.target.pdb_path, Some(PathBuf::from("t.pdb")));
        assert_eq!(doc.target.chain_id.as_deref(), Some("B"));
        assert!(doc.binder.is_none());
    }

    #[test]
    fn value_may_contain_equals_sign() {
        let doc = read("target_name=a=b\n").unwrap();
        assert_eq!(doc.target.name, "a=b");
    }

    #[test]
    fn line_without_separator_is_rejected_with_line_number() {
        let err = read("# header\ntarget_sequence=MKQH\nnot a pair\n").unwrap_err();
        match err {
            InputFileError::MalformedLine { line, content } => {
                assert_eq!(line, 3);
                assert_eq!(content, "not a pair");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
