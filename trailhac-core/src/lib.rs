//! Trailhac core library.
//!
//! Hierarchical agglomerative clustering of graph nodes under a closed-trail
//! distance. Seed node-sets ("bases", usually maximal cliques) are merged
//! bottom-up with a clique-overlap discount, every level of the resulting
//! merge tree is expanded into overlapping communities, and each level is
//! scored so the best partition can be picked.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod agglomeration;
mod builder;
mod cliques;
mod distance;
mod error;
mod graph;
mod hierarchy;
mod linkage;
mod quality;
mod result;
mod trailhac;

#[cfg(test)]
mod test_utils;

pub use crate::{
    agglomeration::{
        AgglomerationConfig, AgglomerationError, AgglomerationErrorCode, CancelToken,
        ClusterDistances, LinkageMethod, agglomerate, agglomerate_with_cancel, initial_distances,
    },
    builder::{ExecutionStrategy, TrailhacBuilder},
    cliques::{maximal_clique_bases, maximal_cliques},
    distance::DistanceMatrix,
    error::{
        DistanceMatrixError, DistanceMatrixErrorCode, GraphError, GraphErrorCode, Result,
        TrailhacError, TrailhacErrorCode,
    },
    graph::{EdgeKey, Graph, NodeSet, edge_key},
    hierarchy::{
        CandidatePartition, CandidateSet, CommunityWindow, CoverageMode, CoverageStats, CutConfig,
        CutOutcome, CutSchedule, DEFAULT_MIN_COMMUNITY_SIZE, FlatCut, FlatCuts, HierarchyError,
        HierarchyErrorCode, LevelCut, communities_for_cut, cover_with_neighbours,
        cover_with_singletons, cut_at, drop_small_communities, drop_unmerged_bases,
        enumerate_candidates, flat_cuts, merge_bases,
    },
    linkage::{Linkage, LinkageError, LinkageErrorCode, LinkageRecord},
    quality::{
        EdgeWeighting, FitnessMeasure, FitnessReport, FitnessSummary, PartitionScores,
        QualityError, QualityErrorCode, SelectionCriterion, cao_modularity, community_fitness,
        eq_modularity, evaluate_partition, overlap_modularity, overlapping_silhouette,
        partition_diameter, select_best, separation_index,
    },
    result::{
        ClusterId, FlatPartition, HierarchyReport, LevelReport, SkipReason, SkippedLevel,
    },
    trailhac::Trailhac,
};
