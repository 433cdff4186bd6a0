//! Data Transfer Objects
//!
//! Bodies exchanged between the Assay server and its clients over HTTP,
//! including the messages pushed on the progress stream.

pub mod evaluate;
pub mod stream;
