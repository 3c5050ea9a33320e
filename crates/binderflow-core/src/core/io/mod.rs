//! Readers for the plain-text formats binderflow consumes.
//!
//! All readers share the [`traits::SequenceFile`] interface, so they can be driven from
//! an in-memory buffer in tests or from a path in production.

pub mod fasta;
pub mod input_file;
pub mod pdb;
pub mod traits;
