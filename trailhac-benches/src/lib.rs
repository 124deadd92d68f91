//! Benchmark support crate for trailhac.
//!
//! Builds planted-partition inputs (graph, hop-distance matrix and clique
//! bases) for the Criterion benchmarks of the agglomeration engine and the
//! level evaluator.

pub mod error;
pub mod params;
pub mod source;
