//! # Core Models Module
//!
//! Plain data types shared by every layer of binderflow.
//!
//! - [`sequence`] - Protein specifications and the sequence records resolved from them
//! - [`job`] - Job names, job specifications for both external tools, handles and statuses
//! - [`result`] - Binding metrics extracted from prediction artifacts
//!
//! The types here perform validation at construction and carry no I/O.

pub mod job;
pub mod result;
pub mod sequence;
