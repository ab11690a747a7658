//! Unit test harness
//!
//! Exercises the compiler pipeline and the materializer without a live
//! BigQuery backend.

mod flatten_pipeline_tests;
