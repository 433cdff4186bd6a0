//! Concrete collaborators used by the server binary
//!
//! - Guidance: reference context read from a local directory
//! - Analysis: stages executed by a remote analysis service over HTTP

mod analysis;
mod guidance;

pub use analysis::{HttpStage, http_stages, validate_stage_output};
pub use guidance::DirectoryContextProvider;
