//! Parquet-backed loader for dense node distance matrices.
//!
//! The matrix is stored as a single column of `FixedSizeList<Float32, N>`
//! values holding exactly `N` rows. Loaded values are widened to `f64` and
//! validated into a [`trailhac_core::DistanceMatrix`].

mod errors;
mod ingest;
mod provider;

pub use errors::DenseDistanceError;
pub use provider::DenseDistanceProvider;

#[cfg(test)]
mod tests;
