//! # carta-core
//!
//! Core domain types and error types for Carta.
//!
//! This crate provides the foundational types shared across all Carta crates:
//! - Facility registry entities (facility, address, coordinates, location rows)
//! - Quality-measure dictionary entries and per-snapshot observations
//! - Snapshot (publish date) handling
//! - Benchmark aggregates and the hierarchical benchmark selector
//! - The comparison matrix shape returned to callers
//! - The import dataset shape consumed by the ingestion path
//! - Cross-cutting error types

pub mod dataset;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod matrix;
pub mod responses;
pub mod snapshot;

pub use snapshot::Snapshot;
