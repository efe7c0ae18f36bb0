//! Repository modules implementing store access for the Carta domain.
//!
//! Each module adds methods to `CartaService` via `impl CartaService` blocks.

pub mod benchmark;
pub mod facility;
pub mod ingest;
pub mod measure;
pub mod snapshot;
