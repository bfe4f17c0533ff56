//! # Peerview Ratio Engine
//!
//! This crate derives the standardized CAMEL soundness ratios for one credit
//! union and one quarter from its typed call-report records.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of
//!   external systems. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `RatioEngine` is a stateless calculator.
//!   It takes the current period's records plus two historical reference
//!   snapshots and produces a `RatioRow`. Missing upstream data degrades to
//!   null fields, never to an error, so the engine has no error type.
//!
//! ## Public API
//!
//! - `RatioEngine`: the calculator.
//! - `RatioRow`: the wide per-(entity, year, quarter) result row.
//! - `METRIC_CATALOG` / `MetricDef` / `MetricCategory`: the static catalog
//!   that maps metric names onto `RatioRow` fields, shared with the peer
//!   comparison engine so the two stay structurally synchronized.

pub mod catalog;
pub mod engine;
pub mod math;
pub mod row;

// Re-export the key components to create a clean, public-facing API.
pub use catalog::{METRIC_CATALOG, MetricCategory, MetricDef};
pub use engine::RatioEngine;
pub use row::RatioRow;
