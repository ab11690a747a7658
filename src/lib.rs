//! bqflatten - Flatten nested BigQuery tables into joinable views
//!
//! Nested tables are a pain for profiling tools that only accept flat input.
//! This crate compiles a nested table schema into one flat view definition per
//! nesting lineage:
//! - Nullable records (structs) are reached by dot access and never multiply rows
//! - Repeated records (arrays of structs) become chained UNNEST stages
//! - Repeated scalars are projected as element counts, never exploded
//! - The root table's primary key is threaded into every view, so all views
//!   stay joinable back to the root and to each other
//!
//! The compiler core (`view_generator`) is pure and synchronous; all BigQuery
//! I/O lives behind the `bigquery::BigQueryOps` trait.

pub mod bigquery;
pub mod config;
pub mod schema;
pub mod view_generator;
