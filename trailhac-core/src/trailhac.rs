//! Pipeline orchestration for the trailhac library.
//!
//! Provides the [`Trailhac`] runtime entry point, which chains the
//! agglomeration engine, the cut enumerator and the quality evaluator into a
//! single [`HierarchyReport`].

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::{
    Result,
    agglomeration::{AgglomerationConfig, CancelToken, agglomerate_with_cancel},
    builder::ExecutionStrategy,
    distance::DistanceMatrix,
    graph::{Graph, NodeSet},
    hierarchy::{CandidatePartition, CandidateSet, CutConfig, enumerate_candidates},
    quality::{
        EdgeWeighting, PartitionScores, QualityError, SelectionCriterion, evaluate_partition,
        select_best,
    },
    result::{HierarchyReport, LevelReport, SkipReason, SkippedLevel},
};

type Scored = core::result::Result<PartitionScores, QualityError>;

/// Entry point for running the clustering pipeline.
///
/// # Examples
/// ```
/// use trailhac_core::{DistanceMatrix, Graph, NodeSet, TrailhacBuilder};
///
/// // Two triangles sharing the edge {1, 2}.
/// let graph = Graph::try_new(4, [(0, 1), (0, 2), (1, 2), (1, 3), (2, 3)])?;
/// let matrix = DistanceMatrix::try_from_rows(vec![
///     vec![0.0, 1.0, 1.0, 4.0],
///     vec![1.0, 0.0, 1.0, 1.0],
///     vec![1.0, 1.0, 0.0, 1.0],
///     vec![4.0, 1.0, 1.0, 0.0],
/// ])?;
/// let bases: Vec<NodeSet> = vec![[0, 1, 2].into(), [1, 2, 3].into()];
///
/// let trailhac = TrailhacBuilder::new().with_min_community_size(3).build()?;
/// let report = trailhac.run(&graph, &matrix, &bases)?;
/// assert_eq!(report.linkage().merge_count(), 1);
/// let best = report.best_level().expect("one level is scored");
/// assert_eq!(best.communities, vec![NodeSet::from([0, 1, 2, 3])]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Trailhac {
    agglomeration: AgglomerationConfig,
    cuts: CutConfig,
    criterion: SelectionCriterion,
    execution_strategy: ExecutionStrategy,
}

impl Trailhac {
    pub(crate) fn new(
        agglomeration: AgglomerationConfig,
        cuts: CutConfig,
        criterion: SelectionCriterion,
        execution_strategy: ExecutionStrategy,
    ) -> Self {
        Self {
            agglomeration,
            cuts,
            criterion,
            execution_strategy,
        }
    }

    /// Returns the agglomeration parameters.
    #[rustfmt::skip]
    #[must_use]
    pub fn agglomeration_config(&self) -> AgglomerationConfig { self.agglomeration }

    /// Returns the cut enumerator parameters.
    #[rustfmt::skip]
    #[must_use]
    pub fn cut_config(&self) -> &CutConfig { &self.cuts }

    /// Returns the criterion used to pick the best level.
    #[rustfmt::skip]
    #[must_use]
    pub fn criterion(&self) -> SelectionCriterion { self.criterion }

    /// Returns the execution strategy requested at build time.
    #[rustfmt::skip]
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy { self.execution_strategy }

    /// Runs the full pipeline over `bases`.
    ///
    /// # Errors
    /// Returns [`crate::TrailhacError::Agglomeration`] when the engine rejects
    /// its inputs and [`crate::TrailhacError::Hierarchy`] when the cut
    /// enumerator does. Per-level scoring failures are reported as skipped
    /// levels instead.
    pub fn run(
        &self,
        graph: &Graph,
        distances: &DistanceMatrix,
        bases: &[NodeSet],
    ) -> Result<HierarchyReport> {
        self.run_with_cancel(graph, distances, bases, &CancelToken::new())
    }

    /// Runs the full pipeline, stopping between merges once `cancel` fires.
    ///
    /// # Errors
    /// Returns the errors of [`Self::run`] and
    /// [`crate::AgglomerationError::Cancelled`] (wrapped) on cancellation.
    #[instrument(
        name = "core.run",
        err,
        skip(self, graph, distances, bases, cancel),
        fields(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            bases = bases.len(),
            strategy = ?self.execution_strategy,
            criterion = self.criterion.as_str(),
        ),
    )]
    pub fn run_with_cancel(
        &self,
        graph: &Graph,
        distances: &DistanceMatrix,
        bases: &[NodeSet],
        cancel: &CancelToken,
    ) -> Result<HierarchyReport> {
        let linkage = agglomerate_with_cancel(graph, distances, bases, self.agglomeration, cancel)?;
        let CandidateSet {
            candidates,
            mut skipped,
        } = enumerate_candidates(graph, bases, &linkage, &self.cuts)?;

        let merge_distances = linkage.distances();
        let weighting = EdgeWeighting::from_flag(self.agglomeration.uses_edge_weights());
        let parallel = self.agglomeration.is_parallel();
        let (levels, failed) = score_levels(candidates, parallel, |candidate| {
            evaluate_partition(
                graph,
                distances,
                &candidate.communities,
                weighting,
                candidate.level,
                &merge_distances,
            )
        });
        skipped.extend(failed);
        skipped.sort_by_key(|level| level.level);

        let table: Vec<PartitionScores> = levels.iter().map(|level| level.scores).collect();
        let best = select_best(&table, self.criterion);
        info!(
            levels = levels.len(),
            skipped = skipped.len(),
            best_level = ?best.and_then(|index| levels.get(index)).map(|level| level.level),
            "hierarchy run completed"
        );
        Ok(HierarchyReport::new(
            linkage,
            levels,
            skipped,
            self.criterion,
            best,
        ))
    }
}

/// Scores every candidate with `score`, keeping the level order.
///
/// A level whose scorer fails is returned as a [`SkipReason::ScoringFailed`]
/// entry; the remaining levels are still scored.
fn score_levels(
    candidates: Vec<CandidatePartition>,
    parallel: bool,
    score: impl Fn(&CandidatePartition) -> Scored + Send + Sync,
) -> (Vec<LevelReport>, Vec<SkippedLevel>) {
    let scored = score_all(&candidates, parallel, score);
    let mut levels = Vec::with_capacity(candidates.len());
    let mut failed = Vec::new();
    for (candidate, outcome) in candidates.into_iter().zip(scored) {
        match outcome {
            Ok(scores) => {
                record_level_scored();
                levels.push(LevelReport {
                    level: candidate.level,
                    distance: candidate.distance,
                    communities: candidate.communities,
                    coverage: candidate.coverage,
                    scores,
                });
            }
            Err(error) => {
                warn!(
                    level = candidate.level,
                    code = error.code().as_str(),
                    %error,
                    "level scoring failed; skipping"
                );
                failed.push(SkippedLevel {
                    level: candidate.level,
                    distance: candidate.distance,
                    reason: SkipReason::ScoringFailed {
                        code: error.code().as_str(),
                        message: error.to_string(),
                    },
                });
            }
        }
    }
    (levels, failed)
}

#[cfg(feature = "parallel")]
fn score_all(
    candidates: &[CandidatePartition],
    parallel: bool,
    score: impl Fn(&CandidatePartition) -> Scored + Send + Sync,
) -> Vec<Scored> {
    if parallel {
        candidates.par_iter().map(score).collect()
    } else {
        candidates.iter().map(score).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn score_all(
    candidates: &[CandidatePartition],
    _parallel: bool,
    score: impl Fn(&CandidatePartition) -> Scored + Send + Sync,
) -> Vec<Scored> {
    candidates.iter().map(score).collect()
}

#[cfg(feature = "metrics")]
fn record_level_scored() {
    metrics::counter!("trailhac_levels_scored_total").increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_level_scored() {}
