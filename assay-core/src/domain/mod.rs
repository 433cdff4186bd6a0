//! Core domain types
//!
//! These types represent the evaluation jobs tracked by the server and are
//! shared with the client (for decoding) and the CLI (for display).

pub mod evaluation;
pub mod job;
pub mod stage;
