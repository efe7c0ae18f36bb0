//! # carta-engine
//!
//! Proximity resolution and comparison-matrix construction for Carta.
//!
//! Coordinates between:
//! - Proximity resolution (bounding-box prefilter in the store, great-circle
//!   filtering and per-facility deduplication here)
//! - Market averages derived over a competitor set and ranked against the
//!   national distribution
//! - The national / state / county benchmark hierarchy
//! - Per-column best/worst classification
//!
//! The engine reads through the [`source`] traits, so any store (the libSQL
//! [`carta_db::service::CartaService`] or an in-memory fake) can back it.

pub mod benchmark;
pub mod cache;
pub mod classify;
pub mod error;
pub mod geo;
pub mod market;
pub mod matrix;
pub mod proximity;
pub mod request;
pub mod source;

#[cfg(test)]
mod memory;

pub use cache::{CacheKey, MatrixCache, NoopCache, TtlCache, cache_from_config};
pub use error::EngineError;
pub use matrix::{EngineOptions, MatrixBuilder, MatrixRequest};
pub use request::{RequestGate, RequestTicket};
