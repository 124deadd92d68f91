//! Partition quality evaluation.
//!
//! Scores every candidate partition with coverage ratios, three modularity
//! variants, community fitness summaries, a Dunn-like separation index and
//! an overlapping silhouette, then picks the best level by a configurable
//! criterion.

mod evaluator;
mod fitness;
mod modularity;

pub use self::{
    evaluator::{
        PartitionScores, QualityError, QualityErrorCode, evaluate_partition,
        overlapping_silhouette, partition_diameter, separation_index,
    },
    fitness::{
        EdgeWeighting, FitnessMeasure, FitnessReport, FitnessSummary, community_fitness,
    },
    modularity::{cao_modularity, eq_modularity, overlap_modularity},
};

/// Statistic used to pick the best level.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[non_exhaustive]
pub enum SelectionCriterion {
    /// Maximise [`PartitionScores::overlap_modularity`].
    #[default]
    OverlapModularity,
    /// Maximise [`PartitionScores::eq_modularity`].
    EqModularity,
    /// Maximise [`PartitionScores::cao_modularity`].
    CaoModularity,
    /// Minimise the mean conductance.
    Conductance,
    /// Minimise the mean normalized cut.
    NormalizedCut,
    /// Maximise [`PartitionScores::separation_index`].
    SeparationIndex,
    /// Maximise [`PartitionScores::silhouette_mean`].
    Silhouette,
    /// Maximise [`PartitionScores::silhouette_max_mean`].
    SilhouetteMax,
}

impl SelectionCriterion {
    /// Returns whether larger values are better.
    #[must_use]
    pub const fn higher_is_better(self) -> bool {
        !matches!(self, Self::Conductance | Self::NormalizedCut)
    }

    /// Extracts the criterion's value from `scores`.
    #[must_use]
    pub const fn value(self, scores: &PartitionScores) -> f64 {
        match self {
            Self::OverlapModularity => scores.overlap_modularity,
            Self::EqModularity => scores.eq_modularity,
            Self::CaoModularity => scores.cao_modularity,
            Self::Conductance => scores.fitness.conductance.mean,
            Self::NormalizedCut => scores.fitness.normalized_cut.mean,
            Self::SeparationIndex => scores.separation_index,
            Self::Silhouette => scores.silhouette_mean,
            Self::SilhouetteMax => scores.silhouette_max_mean,
        }
    }

    /// Returns the snake-case name used in reports and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OverlapModularity => "overlap_modularity",
            Self::EqModularity => "eq_modularity",
            Self::CaoModularity => "cao_modularity",
            Self::Conductance => "conductance",
            Self::NormalizedCut => "normalized_cut",
            Self::SeparationIndex => "separation_index",
            Self::Silhouette => "silhouette",
            Self::SilhouetteMax => "silhouette_max",
        }
    }
}

/// Returns the index of the best scores under `criterion`.
///
/// Ties keep the earliest entry and non-finite values never win.
///
/// # Examples
/// ```
/// use trailhac_core::{PartitionScores, SelectionCriterion, select_best};
///
/// let table = [0.2, 0.5, 0.5].map(|value| PartitionScores {
///     overlap_modularity: value,
///     ..PartitionScores::default()
/// });
/// assert_eq!(select_best(&table, SelectionCriterion::OverlapModularity), Some(1));
/// assert_eq!(select_best(&[], SelectionCriterion::Conductance), None);
/// ```
#[must_use]
pub fn select_best(scores: &[PartitionScores], criterion: SelectionCriterion) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, value) in scores
        .iter()
        .map(|entry| criterion.value(entry))
        .enumerate()
        .filter(|(_, value)| value.is_finite())
    {
        let improves = best.is_none_or(|(_, top)| {
            if criterion.higher_is_better() {
                value > top
            } else {
                value < top
            }
        });
        if improves {
            best = Some((index, value));
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests;
