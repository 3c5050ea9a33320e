//! # Core Module
//!
//! Stateless building blocks: the data model shared across the crate and the readers
//! for sequence inputs.
//!
//! - **Data Model** ([`models`]) - Sequence records, job specifications, handles, statuses and results
//! - **File I/O** ([`io`]) - FASTA, PDB chain extraction and the `key=value` input file
//! - **Utilities** ([`utils`]) - Residue code tables

pub mod io;
pub mod models;
pub mod utils;
