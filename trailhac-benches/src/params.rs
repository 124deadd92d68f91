//! Benchmark parameter types.
//!
//! Labels passed to `BenchmarkId::from_parameter`.

use std::fmt;

use trailhac_core::LinkageMethod;

/// Parameters for an agglomeration benchmark run.
#[derive(Clone, Debug)]
pub struct AgglomerationBenchParams {
    /// Nodes in the planted graph.
    pub node_count: usize,
    /// Bases fed to the engine.
    pub base_count: usize,
    /// Linkage statistic.
    pub method: LinkageMethod,
}

impl fmt::Display for AgglomerationBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={},bases={},{}",
            self.node_count,
            self.base_count,
            self.method.as_str()
        )
    }
}

/// Parameters for a cut enumeration or scoring benchmark run.
#[derive(Clone, Debug)]
pub struct EvaluationBenchParams {
    /// Nodes in the planted graph.
    pub node_count: usize,
    /// Minimum community size applied to each level.
    pub min_community_size: usize,
}

impl fmt::Display for EvaluationBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},min={}", self.node_count, self.min_community_size)
    }
}
