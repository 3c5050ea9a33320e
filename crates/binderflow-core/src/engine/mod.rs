//! # Engine Module
//!
//! Stateful components that carry a job from loaded sequences to parsed results.
//!
//! ## Overview
//!
//! Every component receives its configuration at construction; there is no process-wide
//! state. Scheduler interaction goes through the [`scheduler::CommandRunner`] seam, so
//! the whole lifecycle can be exercised without a real batch system.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Tool installations, scheduler commands and defaults
//! - **Workflow Context** ([`context`]) - Shared handles and ledger-guarded submission
//! - **Sequence Loading** ([`loader`]) - Resolving protein specifications into sequence records
//! - **Job Specs** ([`spec_builder`]) - Prediction input documents, generation commands and batch scripts
//! - **Scheduler Client** ([`scheduler`]) - Submission and status normalization
//! - **Output Collection** ([`collector`]) - Confidence scores, model files and generated binders
//! - **Job Ledger** ([`ledger`]) - Persisted job handles keyed by job name
//! - **Lifecycle State** ([`state`]) - Per-job stage tracking
//! - **Progress Monitoring** ([`progress`]) - Callbacks for user feedback
//! - **Error Handling** ([`error`]) - Engine-level error taxonomy

pub mod collector;
pub mod config;
pub mod context;
pub mod error;
pub mod ledger;
pub mod loader;
pub mod progress;
pub mod scheduler;
pub mod spec_builder;
pub mod state;
