use super::traits::SequenceFile;
use std::io::{self, BufRead, Write};
use thiserror::Error;

const LINE_WIDTH: usize = 60;

#[derive(Debug, Error)]
pub enum FastaError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Reads FASTA content as a single concatenated sequence.
///
/// Header lines (`>`) are skipped and every other line is stripped of whitespace.
/// Case is preserved; multi-record files yield the concatenation of all records.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastaFile;

impl FastaFile {
    /// Writes one record, wrapping the sequence at 60 residues per line.
    pub fn write_record(
        header: &str,
        sequence: &str,
        writer: &mut impl Write,
    ) -> Result<(), FastaError> {
        writeln!(writer, ">{}", header)?;
        for chunk in sequence.as_bytes().chunks(LINE_WIDTH) {
            writer.write_all(chunk)?;
            writeln!(writer)?;
        }
        Ok(())
    }
}

impl SequenceFile for FastaFile {
    type Output = String;
    type Error = FastaError;

    fn read_from(&self, reader: &mut impl BufRead) -> Result<Self::Output, Self::Error> {
        let mut sequence = String::new();
        for line in reader.lines() {
            let line = line?;
            if line.starts_with('>') {
                continue;
            }
            sequence.extend(line.chars().filter(|c| !c.is_whitespace()));
        }
        Ok(sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read(content: &str) -> String {
        FastaFile.read_from(&mut Cursor::new(content)).unwrap()
    }

    #[test]
    fn header_is_skipped_and_lines_are_joined() {
        let content = ">sp|P1|TEST some protein\nMKQHK\n  AMIV \n\nALIV\n";
        assert_eq!(read(content), "MKQHKAMIVALIV");
    }

    #[test]
    fn case_is_preserved() {
        assert_eq!(read(">x\nmkQh\n"), "mkQh");
    }

    #[test]
    fn crlf_line_endings_are_stripped() {
        assert_eq!(read(">x\r\nMKQ\r\nHKA\r\n"), "MKQHKA");
    }

    #[test]
    fn header_only_file_yields_empty_sequence() {
        assert_eq!(read(">x\n"), "");
    }

    #[test]
    fn written_record_reads_back_to_the_same_sequence() {
        let original = read(">target\nMKQHKAMIVALIVICITAVVAALVTRKDLCEVHIRTGQTEVAVFTAYESE\nMKQHKAMIVALIV\n");

        let mut buffer = Vec::new();
        FastaFile::write_record("target", &original, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.lines().skip(1).all(|l| l.len() <= LINE_WIDTH));

        assert_eq!(read(&text), original);
    }
}
