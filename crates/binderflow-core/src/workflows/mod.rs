//! # Workflows Module
//!
//! High-level entry points that carry jobs through their lifecycle: load inputs, build
//! the job spec, submit, poll and collect.
//!
//! ## Overview
//!
//! Workflows never block waiting on the scheduler. Each call performs at most one status
//! query per job and returns; callers re-invoke them to make progress. Submitted jobs are
//! recorded in the job ledger so a later invocation can pick them up by name.
//!
//! - **Evaluation** ([`evaluate`]) - Predict a target/binder complex and score the interface
//! - **Generation** ([`generate`]) - Design binders against a target structure, then fan
//!   out one evaluation per design

pub mod evaluate;
pub mod generate;
