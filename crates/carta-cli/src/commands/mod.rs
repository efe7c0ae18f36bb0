pub mod benchmark;
pub mod dispatch;
pub mod import;
pub mod matrix;
pub mod measures;
pub mod nearby;
pub mod schema;
pub mod shared;
pub mod snapshots;
