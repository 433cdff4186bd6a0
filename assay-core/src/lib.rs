//! Assay Core
//!
//! Core types shared by the Assay evaluation service and its clients.
//!
//! This crate contains:
//! - Domain types: Job records, progress, stage identifiers, evaluations
//! - DTOs: Request/response bodies and streamed update messages

pub mod domain;
pub mod dto;
