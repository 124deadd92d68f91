//! Builder utilities for configuring trailhac runs.
//!
//! Exposes the execution strategy selection surface and builder validation used before constructing [`Trailhac`] instances.

use std::num::NonZeroUsize;

use crate::{
    Result,
    agglomeration::{AgglomerationConfig, LinkageMethod},
    error::TrailhacError,
    hierarchy::{CommunityWindow, CoverageMode, CutConfig, DEFAULT_MIN_COMMUNITY_SIZE},
    quality::SelectionCriterion,
    trailhac::Trailhac,
};

/// Indicates how [`Trailhac`] distributes work when [`Trailhac::run`] is
/// invoked.
///
/// `Auto` uses Rayon whenever the `parallel` feature is compiled in and runs
/// sequentially otherwise, so it never fails to resolve.
///
/// # Examples
/// ```
/// use trailhac_core::ExecutionStrategy;
///
/// let strategy = ExecutionStrategy::Auto;
/// assert!(matches!(strategy, ExecutionStrategy::Auto));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ExecutionStrategy {
    /// Allow the library to select parallelism automatically.
    #[default]
    Auto,
    /// Run every stage on the calling thread.
    Sequential,
    /// Require Rayon for row recomputation and level scoring.
    Parallel,
}

impl ExecutionStrategy {
    const fn resolve(self) -> Option<bool> {
        match self {
            Self::Auto => Some(cfg!(feature = "parallel")),
            Self::Sequential => Some(false),
            Self::Parallel if cfg!(feature = "parallel") => Some(true),
            Self::Parallel => None,
        }
    }
}

/// Configures and constructs [`Trailhac`] instances.
///
/// # Examples
/// ```
/// use trailhac_core::{ExecutionStrategy, LinkageMethod, TrailhacBuilder};
///
/// let trailhac = TrailhacBuilder::new()
///     .with_linkage_method(LinkageMethod::Average)
///     .with_min_community_size(3)
///     .with_execution_strategy(ExecutionStrategy::Sequential)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(trailhac.cut_config().min_community_size().get(), 3);
/// assert_eq!(trailhac.execution_strategy(), ExecutionStrategy::Sequential);
/// ```
#[derive(Debug, Clone)]
pub struct TrailhacBuilder {
    linkage_method: LinkageMethod,
    use_edge_weights: bool,
    execution_strategy: ExecutionStrategy,
    min_merge_distance: f64,
    min_community_size: usize,
    min_neighbour_support: usize,
    community_window: Option<(usize, usize)>,
    include_unmerged: bool,
    drop_unmerged_bases: bool,
    coverage: CoverageMode,
    criterion: SelectionCriterion,
}

impl Default for TrailhacBuilder {
    fn default() -> Self {
        Self {
            linkage_method: LinkageMethod::Single,
            use_edge_weights: false,
            execution_strategy: ExecutionStrategy::Auto,
            min_merge_distance: 0.0,
            min_community_size: DEFAULT_MIN_COMMUNITY_SIZE.get(),
            min_neighbour_support: 1,
            community_window: None,
            include_unmerged: false,
            drop_unmerged_bases: false,
            coverage: CoverageMode::Neighbours,
            criterion: SelectionCriterion::OverlapModularity,
        }
    }
}

impl TrailhacBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use trailhac_core::{ExecutionStrategy, TrailhacBuilder};
    ///
    /// let builder = TrailhacBuilder::new();
    /// assert_eq!(builder.min_community_size(), 5);
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Auto);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the linkage statistic.
    #[must_use]
    pub fn with_linkage_method(mut self, method: LinkageMethod) -> Self {
        self.linkage_method = method;
        self
    }

    /// Enables edge weights in the overlap discount and quality measures.
    #[must_use]
    pub fn with_edge_weights(mut self, enabled: bool) -> Self {
        self.use_edge_weights = enabled;
        self
    }

    /// Sets the execution strategy to use when running the pipeline.
    ///
    /// # Examples
    /// ```
    /// use trailhac_core::{ExecutionStrategy, TrailhacBuilder};
    ///
    /// let builder = TrailhacBuilder::new().with_execution_strategy(ExecutionStrategy::Sequential);
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Sequential);
    /// ```
    #[must_use]
    pub fn with_execution_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.execution_strategy = strategy;
        self
    }

    /// Skips cut levels whose merge distance is below `distance`.
    #[must_use]
    pub fn with_min_merge_distance(mut self, distance: f64) -> Self {
        self.min_merge_distance = distance;
        self
    }

    /// Overrides the minimum community size.
    ///
    /// # Examples
    /// ```
    /// use trailhac_core::TrailhacBuilder;
    ///
    /// let builder = TrailhacBuilder::new().with_min_community_size(10);
    /// assert_eq!(builder.min_community_size(), 10);
    /// ```
    #[must_use]
    pub fn with_min_community_size(mut self, size: usize) -> Self {
        self.min_community_size = size;
        self
    }

    /// Sets how many neighbours must agree before a node joins a community.
    #[must_use]
    pub fn with_min_neighbour_support(mut self, support: usize) -> Self {
        self.min_neighbour_support = support;
        self
    }

    /// Only scores levels producing between `min` and `max` communities.
    #[must_use]
    pub fn with_community_window(mut self, min: usize, max: usize) -> Self {
        self.community_window = Some((min, max));
        self
    }

    /// Also scores rank `0`, before any merge.
    #[must_use]
    pub fn with_include_unmerged(mut self, enabled: bool) -> Self {
        self.include_unmerged = enabled;
        self
    }

    /// Discards communities identical to an input base.
    #[must_use]
    pub fn with_drop_unmerged_bases(mut self, enabled: bool) -> Self {
        self.drop_unmerged_bases = enabled;
        self
    }

    /// Selects how uncovered nodes are placed.
    #[must_use]
    pub fn with_coverage(mut self, coverage: CoverageMode) -> Self {
        self.coverage = coverage;
        self
    }

    /// Selects the statistic used to pick the best level.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SelectionCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Returns the configured minimum community size.
    #[rustfmt::skip]
    #[must_use]
    pub fn min_community_size(&self) -> usize { self.min_community_size }

    /// Returns the currently configured execution strategy.
    #[rustfmt::skip]
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy { self.execution_strategy }

    /// Validates the configuration and constructs a [`Trailhac`] instance.
    ///
    /// # Errors
    /// Returns [`TrailhacError::InvalidMinCommunitySize`] or
    /// [`TrailhacError::InvalidNeighbourSupport`] for zero sizes,
    /// [`TrailhacError::InvalidMinMergeDistance`] for a negative or
    /// non-finite threshold, [`TrailhacError::InvalidCommunityWindow`] for an
    /// inverted window and [`TrailhacError::BackendUnavailable`] when
    /// [`ExecutionStrategy::Parallel`] is requested without the `parallel`
    /// feature.
    ///
    /// # Examples
    /// ```
    /// use trailhac_core::{TrailhacBuilder, TrailhacErrorCode};
    ///
    /// let err = TrailhacBuilder::new()
    ///     .with_community_window(4, 2)
    ///     .build()
    ///     .expect_err("inverted windows are rejected");
    /// assert_eq!(err.code(), TrailhacErrorCode::InvalidCommunityWindow);
    /// ```
    pub fn build(self) -> Result<Trailhac> {
        let min_community_size = NonZeroUsize::new(self.min_community_size).ok_or(
            TrailhacError::InvalidMinCommunitySize {
                got: self.min_community_size,
            },
        )?;
        let min_neighbour_support = NonZeroUsize::new(self.min_neighbour_support).ok_or(
            TrailhacError::InvalidNeighbourSupport {
                got: self.min_neighbour_support,
            },
        )?;
        if !self.min_merge_distance.is_finite() || self.min_merge_distance < 0.0 {
            return Err(TrailhacError::InvalidMinMergeDistance {
                got: self.min_merge_distance,
            });
        }
        let window = self
            .community_window
            .map(|(min, max)| {
                CommunityWindow::new(min, max)
                    .ok_or(TrailhacError::InvalidCommunityWindow { min, max })
            })
            .transpose()?;
        let parallel = self
            .execution_strategy
            .resolve()
            .ok_or(TrailhacError::BackendUnavailable {
                requested: self.execution_strategy,
            })?;

        let agglomeration = AgglomerationConfig::new(self.linkage_method)
            .with_edge_weights(self.use_edge_weights)
            .with_parallel(parallel);
        let cuts = CutConfig::default()
            .with_min_merge_distance(self.min_merge_distance)
            .with_min_community_size(min_community_size)
            .with_min_neighbour_support(min_neighbour_support)
            .with_window(window)
            .with_include_unmerged(self.include_unmerged)
            .with_drop_unmerged_bases(self.drop_unmerged_bases)
            .with_coverage(self.coverage);
        Ok(Trailhac::new(
            agglomeration,
            cuts,
            self.criterion,
            self.execution_strategy,
        ))
    }
}
