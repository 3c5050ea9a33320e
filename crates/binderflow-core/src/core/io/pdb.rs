use super::traits::SequenceFile;
use crate::core::utils::residues::one_letter_code;
use std::io::{self, BufRead};
use thiserror::Error;

pub const DEFAULT_CHAIN_ID: &str = "A";

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

/// Extracts the one-letter sequence of a single chain from PDB `ATOM` records.
///
/// Only the first model containing the chain is read. `HETATM` records are skipped,
/// and residue names outside the standard twenty map to `X`.
#[derive(Debug, Clone)]
pub struct PdbChainReader {
    chain_id: String,
}

impl PdbChainReader {
    pub fn new(chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
        }
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }
}

impl Default for PdbChainReader {
    fn default() -> Self {
        Self::new(DEFAULT_CHAIN_ID)
    }
}

impl SequenceFile for PdbChainReader {
    type Output = String;
    type Error = PdbError;

    fn read_from(&self, reader: &mut impl BufRead) -> Result<Self::Output, Self::Error> {
        let mut sequence = String::new();
        let mut found_in_model = false;
        let mut last_residue: Option<(String, String)> = None;

        for line in reader.lines() {
            let line = line?;
            let record_type = slice_and_trim(&line, 0, 6);

            match record_type {
                "MODEL" => {
                    last_residue = None;
                }
                "ENDMDL" | "END" => {
                    if found_in_model {
                        break;
                    }
                }
                "ATOM" => {
                    if slice_and_trim(&line, 21, 22) != self.chain_id {
                        continue;
                    }
                    found_in_model = true;

                    let res_seq = slice_and_trim(&line, 22, 26);
                    let insertion_code = slice_and_trim(&line, 26, 27);
                    let key = (res_seq.to_string(), insertion_code.to_string());
                    if last_residue.as_ref() == Some(&key) {
                        continue;
                    }
                    sequence.push(one_letter_code(slice_and_trim(&line, 17, 20)));
                    last_residue = Some(key);
                }
                _ => {}
            }
        }

        Ok(sequence)
    }
}
