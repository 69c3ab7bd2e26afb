//! The prove-or-split builder (B): §4.3 verbatim, plus the builder-pattern
//! entry point used to pick between the single- and multi-threaded
//! algorithms.
//!
//! ```
//! use quadgeo::builder::TreeBuilder;
//! use quadgeo::oracle::UniformOracle;
//! use quadgeo::quantize::Precision;
//!
//! let oracle = UniformOracle { id: 7 };
//! let tree = TreeBuilder::new()
//!     .with_precision(Precision::from_u8(0))
//!     .build_using_single_threaded_algorithm(&oracle)
//!     .unwrap();
//! ```

mod multi_threaded;
mod single_threaded;

pub use multi_threaded::MultiThreadedBuilder;
pub use single_threaded::SingleThreadedBuilder;

use thiserror::Error;

use crate::geometry::Rectangle;
use crate::node::Node;
use crate::oracle::{Oracle, OracleError};
use crate::quantize::Precision;

pub const DEFAULT_SAMPLE_K: u32 = 16;
pub const DEFAULT_BRUTE_FORCE_THRESHOLD: u64 = 64;
pub const DEFAULT_MAX_DEPTH: u32 = 40;
pub const DEFAULT_RNG_SEED: u64 = 0;
pub const DEFAULT_MAX_THREAD_COUNT: u8 = 4;

/// Tuning knobs for a single build (§4.3's `cfg`), plus the ambient
/// concurrency/namespace knobs from `SPEC_FULL.md` §3. Blob compression is
/// an opaque post-processing step outside this crate's core (§1/§4.4) and
/// has no field here to gate it.
#[derive(Debug, Clone, derive_builder::Builder)]
#[builder(setter(into), default)]
pub struct BuildConfig {
    pub precision: Precision,
    pub sample_k: u32,
    pub brute_force_threshold: u64,
    pub max_depth: u32,
    pub rng_seed: u64,
    pub max_thread_count: u8,
    pub namespace: String,
    /// §9 Open Question, decided: never applied in this implementation.
    pub zero_elision: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            precision: Precision::default(),
            sample_k: DEFAULT_SAMPLE_K,
            brute_force_threshold: DEFAULT_BRUTE_FORCE_THRESHOLD,
            max_depth: DEFAULT_MAX_DEPTH,
            rng_seed: DEFAULT_RNG_SEED,
            max_thread_count: DEFAULT_MAX_THREAD_COUNT,
            namespace: "quadgeo".to_string(),
            zero_elision: false,
        }
    }
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("oracle failed during build: {0}")]
    OracleFailure(#[from] OracleError),
    #[error("build was cancelled")]
    Cancelled,
    #[error("precision must be in the supported range: {0}")]
    InvalidPrecision(#[from] crate::quantize::PrecisionError),
    #[error("max_depth must be at least 1")]
    ZeroMaxDepth,
}

#[derive(Debug, Default)]
pub struct TreeBuilder {
    config: BuildConfig,
}

impl TreeBuilder {
    pub fn new() -> Self {
        TreeBuilder::default()
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.config.precision = precision;
        self
    }

    pub fn with_sample_k(mut self, sample_k: u32) -> Self {
        self.config.sample_k = sample_k;
        self
    }

    pub fn with_brute_force_threshold(mut self, threshold: u64) -> Self {
        self.config.brute_force_threshold = threshold;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn with_rng_seed(mut self, rng_seed: u64) -> Self {
        self.config.rng_seed = rng_seed;
        self
    }

    pub fn with_max_thread_count(mut self, max_thread_count: u8) -> Self {
        self.config.max_thread_count = max_thread_count;
        self
    }

    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    fn verify(&self) -> Result<(), BuildError> {
        if self.config.max_depth == 0 {
            return Err(BuildError::ZeroMaxDepth);
        }
        Ok(())
    }

    pub fn build_using_single_threaded_algorithm(
        self,
        oracle: &dyn Oracle,
    ) -> Result<Node, BuildError> {
        self.verify()?;
        single_threaded::build(oracle, &self.config, None)
    }

    pub fn build_using_single_threaded_algorithm_cancellable(
        self,
        oracle: &dyn Oracle,
        cancel: triggered::Listener,
    ) -> Result<Node, BuildError> {
        self.verify()?;
        single_threaded::build(oracle, &self.config, Some(cancel))
    }

    pub fn build_using_multi_threaded_algorithm(
        self,
        oracle: &(impl Oracle + Send + Sync + 'static),
    ) -> Result<Node, BuildError> {
        self.verify()?;
        multi_threaded::build(oracle, &self.config, None)
    }

    pub fn build_using_multi_threaded_algorithm_cancellable(
        self,
        oracle: &(impl Oracle + Send + Sync + 'static),
        cancel: triggered::Listener,
    ) -> Result<Node, BuildError> {
        self.verify()?;
        multi_threaded::build(oracle, &self.config, Some(cancel))
    }
}

/// Root rectangle for a given config's precision.
pub fn root_rectangle(config: &BuildConfig) -> Rectangle {
    Rectangle::root(config.precision.x_max(), config.precision.y_max())
}

/// §4.3 step 2 "Sample": evaluate the oracle at the deterministic sample
/// set, returning `None` if any two samples disagree (signalling "split"),
/// otherwise the unanimous id.
pub(crate) fn sample_and_check_unanimous(
    oracle: &dyn Oracle,
    rect: &Rectangle,
    config: &BuildConfig,
) -> Result<Option<u16>, BuildError> {
    let points = crate::sampling::sample_points(rect, config.sample_k, config.rng_seed);
    let mut unanimous: Option<u16> = None;
    for (ilat, ilon) in points {
        let id = oracle.country_at(ilat, ilon)?;
        match unanimous {
            None => unanimous = Some(id),
            Some(existing) if existing != id => return Ok(None),
            Some(_) => {}
        }
    }
    Ok(unanimous)
}

/// §4.3 step 3 "Prove": exhaustively evaluate every lattice point in `rect`
/// (only called when `rect.point_count() <= brute_force_threshold`).
/// Parallelized with `rayon` over the point grid, matching the teacher's own
/// use of rayon for bulk iteration rather than task scheduling.
pub(crate) fn brute_force_uniform(
    oracle: &(dyn Oracle + Sync),
    rect: &Rectangle,
    expected: u16,
) -> Result<bool, BuildError> {
    use rayon::prelude::*;

    let rows: Vec<u32> = (rect.y0..=rect.y1).collect();
    let result: Result<bool, OracleError> = rows.par_iter().try_fold(
        || true,
        |acc, &ilat| {
            if !acc {
                return Ok(false);
            }
            for ilon in rect.x0..=rect.x1 {
                if oracle.country_at(ilat, ilon)? != expected {
                    return Ok(false);
                }
            }
            Ok(true)
        },
    ).try_reduce(|| true, |a, b| Ok(a && b));
    Ok(result?)
}

/// §4.3 step 6 "Depth guard": forced brute force by repeated bisection
/// until every sub-rectangle is uniform or a singleton. Used both when the
/// depth guard trips and (in principle) as a correctness fallback.
pub(crate) fn forced_brute_force(
    oracle: &(dyn Oracle + Sync),
    rect: Rectangle,
) -> Result<Node, BuildError> {
    if rect.is_point() {
        let id = oracle.country_at(rect.y0, rect.x0)?;
        return Ok(Node::Leaf(id));
    }

    let first = oracle.country_at(rect.y0, rect.x0)?;
    if brute_force_uniform(oracle, &rect, first)? {
        return Ok(Node::Leaf(first));
    }

    let mut children = Vec::new();
    for (_, child_rect) in rect.children() {
        children.push(forced_brute_force(oracle, child_rect)?);
    }
    Ok(Node::Internal(children).collapse_if_uniform())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::UniformOracle;

    #[test]
    fn config_defaults_are_sane() {
        let config = BuildConfig::default();
        assert!(config.sample_k > 0);
        assert!(config.brute_force_threshold > 0);
        assert!(config.max_depth > 0);
        assert!(!config.zero_elision);
    }

    #[test]
    fn zero_max_depth_is_rejected() {
        let oracle = UniformOracle { id: 1 };
        let result = TreeBuilder::new()
            .with_max_depth(0)
            .build_using_single_threaded_algorithm(&oracle);
        assert!(matches!(result, Err(BuildError::ZeroMaxDepth)));
    }
}
