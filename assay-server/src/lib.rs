//! Assay Server
//!
//! Runs document evaluations as background jobs and streams their progress.
//!
//! Architecture:
//! - Store: in-memory job registry with time-based expiry
//! - Pipeline: sequential analysis stages over one document
//! - Driver: launches pipelines and records their outcome in the store
//! - Stream: polls the store and turns job state into update messages
//! - API: HTTP endpoints for submission, snapshots and SSE progress
//! - Collab: concrete context provider and analysis stage clients

pub mod api;
pub mod collab;
pub mod config;
pub mod driver;
pub mod pipeline;
pub mod state;
pub mod store;
pub mod stream;
