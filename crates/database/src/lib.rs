//! # Peerview Ratio Store
//!
//! Postgres persistence for computed CAMEL ratio rows and the credit union
//! identity table. All SQL lives behind [`DbRepository`]; the rest of the
//! workspace works with typed rows and never sees a query string.
//!
//! Writes are idempotent by construction: ratio rows are upserted wholesale,
//! keyed by `(cu_number, year, quarter)`, so replaying a batch run replaces
//! prior results instead of duplicating them. The metric column set is
//! generated from the shared catalog in the `ratios` crate, which keeps the
//! schema, the upsert bindings, and the peer-engine unpivot in lockstep.

pub mod connection;
pub mod error;
pub mod repository;

pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::{CreditUnion, DbRepository, WriteOutcome};
