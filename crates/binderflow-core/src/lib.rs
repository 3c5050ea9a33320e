//! # binderflow Core Library
//!
//! Job orchestration for protein binder design on a batch scheduler: structure-prediction
//! jobs that evaluate a target/binder complex, and binder-generation jobs whose designs are
//! fanned out into evaluations.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the same three layers throughout.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`SequenceRecord`, `JobSpec`,
//!   `JobHandle`, `BindingResult`) and the readers for FASTA, PDB and input files.
//!
//! - **[`engine`]: The Logic Core.** Stateful components configured at construction: the
//!   sequence loader, job spec builder, scheduler client, output collector and job ledger.
//!   External commands run behind the `CommandRunner` seam.
//!
//! - **[`workflows`]: The Public API.** Evaluation and generate-then-evaluate flows that tie
//!   `engine` and `core` together one lifecycle step at a time.

pub mod core;
pub mod engine;
pub mod workflows;
