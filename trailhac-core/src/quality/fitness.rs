//! Per-community fitness functions.
//!
//! Every measure is computed from a [`CommunityProfile`]: the internal and
//! boundary weight of the community plus each member's internal and external
//! degree. Zero denominators resolve to `0` for the affected community.

use crate::graph::{Graph, NodeSet};

/// Whether quality measures use stored edge weights or count edges.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum EdgeWeighting {
    /// Every edge counts as `1`.
    #[default]
    Unweighted,
    /// Edges contribute their stored weight.
    Weighted,
}

impl EdgeWeighting {
    /// Picks weighted measures when `weighted` is set.
    #[must_use]
    pub const fn from_flag(weighted: bool) -> Self {
        if weighted {
            Self::Weighted
        } else {
            Self::Unweighted
        }
    }

    pub(crate) const fn apply(self, weight: f64) -> f64 {
        match self {
            Self::Unweighted => 1.0,
            Self::Weighted => weight,
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "edge counts stay far below the f64 mantissa"
    )]
    pub(crate) fn total(self, graph: &Graph) -> f64 {
        match self {
            Self::Unweighted => graph.edge_count() as f64,
            Self::Weighted => graph.total_weight(),
        }
    }

    #[expect(clippy::cast_precision_loss, reason = "degrees are small integers")]
    pub(crate) fn degree(self, graph: &Graph, node: usize) -> f64 {
        match self {
            Self::Unweighted => graph.degree(node) as f64,
            Self::Weighted => graph.strength(node),
        }
    }
}

/// Distribution of a fitness measure across communities.
///
/// `std` is the population standard deviation. An empty input yields all
/// zeros.
///
/// # Examples
/// ```
/// use trailhac_core::FitnessSummary;
///
/// let summary = FitnessSummary::from_values(&[1.0, 3.0]);
/// assert_eq!(summary.min, 1.0);
/// assert_eq!(summary.max, 3.0);
/// assert_eq!(summary.mean, 2.0);
/// assert_eq!(summary.std, 1.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FitnessSummary {
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
}

impl FitnessSummary {
    /// Summarises `values`.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "summary statistics are floating-point by definition"
    )]
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let count = values.len() as f64;
        let mean = values.iter().sum::<f64>() / count;
        let variance = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / count;
        Self {
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean,
            std: variance.sqrt(),
        }
    }
}

/// Community fitness functions.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FitnessMeasure {
    /// `cs / (2 ms + cs)`.
    Conductance,
    /// Conductance plus the same ratio taken against the rest of the graph.
    NormalizedCut,
    /// Boundary weight per member.
    Expansion,
    /// Internal weight over the possible internal pairs.
    InternalEdgeDensity,
    /// Boundary weight over the possible boundary pairs.
    CutRatio,
    /// Mean external degree of the members.
    AverageOdf,
    /// Fraction of members with more external than internal degree.
    FlakeOdf,
}

impl FitnessMeasure {
    /// Every measure, in report order.
    pub const ALL: [Self; 7] = [
        Self::Conductance,
        Self::NormalizedCut,
        Self::Expansion,
        Self::InternalEdgeDensity,
        Self::CutRatio,
        Self::AverageOdf,
        Self::FlakeOdf,
    ];

    /// Returns the snake-case name used in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Conductance => "conductance",
            Self::NormalizedCut => "normalized_cut",
            Self::Expansion => "expansion",
            Self::InternalEdgeDensity => "internal_edge_density",
            Self::CutRatio => "cut_ratio",
            Self::AverageOdf => "average_odf",
            Self::FlakeOdf => "flake_odf",
        }
    }
}

/// Weight totals of one community.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct CommunityProfile {
    pub(crate) size: usize,
    pub(crate) internal: f64,
    pub(crate) boundary: f64,
    pub(crate) member_internal: Vec<f64>,
    pub(crate) member_external: Vec<f64>,
}

impl CommunityProfile {
    #[expect(clippy::float_arithmetic, reason = "weights are accumulated as f64")]
    pub(crate) fn new(graph: &Graph, community: &NodeSet, weighting: EdgeWeighting) -> Self {
        let mut profile = Self {
            size: community.len(),
            ..Self::default()
        };
        let mut internal_twice = 0.0;
        for &node in community {
            let mut inside = 0.0;
            let mut outside = 0.0;
            for (neighbour, weight) in graph.weighted_neighbours(node) {
                let weight = weighting.apply(weight);
                if community.contains(&neighbour) {
                    inside += weight;
                } else {
                    outside += weight;
                }
            }
            internal_twice += inside;
            profile.boundary += outside;
            profile.member_internal.push(inside);
            profile.member_external.push(outside);
        }
        profile.internal = internal_twice / 2.0;
        profile
    }
}

#[expect(clippy::float_arithmetic, reason = "ratio of non-negative weights")]
pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "pair counts are floating-point in the density formulas"
)]
pub(crate) fn comb2(value: usize) -> f64 {
    let as_float = value as f64;
    as_float * (as_float - 1.0) / 2.0
}

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "fitness formulas are floating-point ratios"
)]
fn measure_profile(
    profile: &CommunityProfile,
    measure: FitnessMeasure,
    node_count: usize,
    total_weight: f64,
) -> f64 {
    let size = profile.size as f64;
    let ms = profile.internal;
    let cs = profile.boundary;
    match measure {
        FitnessMeasure::Conductance => ratio(cs, 2.0 * ms + cs),
        FitnessMeasure::NormalizedCut => {
            ratio(cs, 2.0 * ms + cs) + ratio(cs, 2.0 * (total_weight - ms) + cs)
        }
        FitnessMeasure::Expansion => ratio(cs, size),
        FitnessMeasure::InternalEdgeDensity => ratio(ms, comb2(profile.size)),
        FitnessMeasure::CutRatio => {
            ratio(cs, size * node_count.saturating_sub(profile.size) as f64)
        }
        FitnessMeasure::AverageOdf => ratio(profile.member_external.iter().sum(), size),
        FitnessMeasure::FlakeOdf => {
            let flaky = profile
                .member_internal
                .iter()
                .zip(&profile.member_external)
                .filter(|(inside, outside)| inside < outside)
                .count();
            ratio(flaky as f64, size)
        }
    }
}

/// Evaluates `measure` for every community.
///
/// # Examples
/// ```
/// use trailhac_core::{EdgeWeighting, FitnessMeasure, Graph, NodeSet, community_fitness};
///
/// // Two triangles joined by the edge {2, 3}.
/// let graph = Graph::try_new(6, [(0, 1), (0, 2), (1, 2), (2, 3), (3, 4), (3, 5), (4, 5)])?;
/// let communities: Vec<NodeSet> = vec![[0, 1, 2].into(), [3, 4, 5].into()];
/// let values = community_fitness(
///     &graph,
///     &communities,
///     FitnessMeasure::Conductance,
///     EdgeWeighting::Unweighted,
/// );
/// assert_eq!(values, vec![1.0 / 7.0, 1.0 / 7.0]);
/// # Ok::<(), trailhac_core::GraphError>(())
/// ```
#[must_use]
pub fn community_fitness(
    graph: &Graph,
    communities: &[NodeSet],
    measure: FitnessMeasure,
    weighting: EdgeWeighting,
) -> Vec<f64> {
    let total = weighting.total(graph);
    communities
        .iter()
        .map(|community| {
            let profile = CommunityProfile::new(graph, community, weighting);
            measure_profile(&profile, measure, graph.node_count(), total)
        })
        .collect()
}

/// Summaries of every fitness measure for one partition.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FitnessReport {
    /// Conductance.
    pub conductance: FitnessSummary,
    /// Normalized cut.
    pub normalized_cut: FitnessSummary,
    /// Expansion.
    pub expansion: FitnessSummary,
    /// Internal edge density.
    pub internal_edge_density: FitnessSummary,
    /// Cut ratio.
    pub cut_ratio: FitnessSummary,
    /// Average out-degree fraction.
    pub average_odf: FitnessSummary,
    /// Flake out-degree fraction.
    pub flake_odf: FitnessSummary,
}

impl FitnessReport {
    /// Computes every measure from one profile pass per community.
    #[must_use]
    pub fn compute(graph: &Graph, communities: &[NodeSet], weighting: EdgeWeighting) -> Self {
        let total = weighting.total(graph);
        let profiles: Vec<CommunityProfile> = communities
            .iter()
            .map(|community| CommunityProfile::new(graph, community, weighting))
            .collect();
        let summarise = |measure| {
            let values: Vec<f64> = profiles
                .iter()
                .map(|profile| measure_profile(profile, measure, graph.node_count(), total))
                .collect();
            FitnessSummary::from_values(&values)
        };
        Self {
            conductance: summarise(FitnessMeasure::Conductance),
            normalized_cut: summarise(FitnessMeasure::NormalizedCut),
            expansion: summarise(FitnessMeasure::Expansion),
            internal_edge_density: summarise(FitnessMeasure::InternalEdgeDensity),
            cut_ratio: summarise(FitnessMeasure::CutRatio),
            average_odf: summarise(FitnessMeasure::AverageOdf),
            flake_odf: summarise(FitnessMeasure::FlakeOdf),
        }
    }

    /// Returns the summary of `measure`.
    #[must_use]
    pub const fn get(&self, measure: FitnessMeasure) -> FitnessSummary {
        match measure {
            FitnessMeasure::Conductance => self.conductance,
            FitnessMeasure::NormalizedCut => self.normalized_cut,
            FitnessMeasure::Expansion => self.expansion,
            FitnessMeasure::InternalEdgeDensity => self.internal_edge_density,
            FitnessMeasure::CutRatio => self.cut_ratio,
            FitnessMeasure::AverageOdf => self.average_odf,
            FitnessMeasure::FlakeOdf => self.flake_odf,
        }
    }
}
