//! # gridsec-core: Static Security Assessment Data Model
//!
//! Canonical records, typed units, limit configuration, and violation types
//! for assessing an already-solved power-flow operating point.
//!
//! Upstream solvers report bus voltages and branch flows in several shapes;
//! the normalization layer (in `gridsec-engine`) reduces them all to the two
//! record types here. Everything downstream — violation detection, scoring,
//! the wire response — works purely in these types.
//!
//! ```
//! use gridsec_core::*;
//!
//! let flow = BranchFlow {
//!     index: Some(BranchIdx::new(3)),
//!     active_power: Some(Megawatts(80.0)),
//!     reactive_power: Some(Megavars(60.0)),
//!     rating: Some(MegavoltAmperes(90.0)),
//! };
//!
//! // All three numeric fields present and rating > 0: thermally checkable.
//! let (s, rating) = flow.thermal_loading().unwrap();
//! assert!(s > rating);
//! ```
//!
//! ## Modules
//!
//! - [`units`] - Newtype wrappers for per-unit voltage and MW/Mvar/MVA power
//! - [`limits`] - Per-request operating limits and scoring weights
//! - [`violation`] - Violation records and the assessment result
//! - [`error`] - Structured whole-request rejections

use serde::{Deserialize, Serialize};

pub mod error;
pub mod limits;
pub mod units;
pub mod violation;

pub use error::{GridsecError, GridsecResult};
pub use limits::{Limits, ScoreWeights};
pub use units::{Megavars, MegavoltAmperes, Megawatts, PerUnit};
pub use violation::{Assessment, AssessmentSummary, Violation};

// Newtype wrappers for IDs for type safety

/// Identifier of a bus as reported by the upstream solver.
///
/// Signed because the id comes from an untrusted document; nothing here
/// indexes storage by it, it only labels violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusId(i64);

/// Position of a branch in the upstream solver's branch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchIdx(i64);

impl BusId {
    #[inline]
    pub fn new(value: i64) -> Self {
        BusId(value)
    }
    #[inline]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl BranchIdx {
    #[inline]
    pub fn new(value: i64) -> Self {
        BranchIdx(value)
    }
    #[inline]
    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Canonical bus record: one solved voltage magnitude.
///
/// Duplicate ids within a request are tolerated and each record is assessed
/// independently; no deduplication happens anywhere in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BusVoltage {
    pub id: BusId,
    /// Solved voltage magnitude in per-unit.
    pub voltage: PerUnit,
}

impl BusVoltage {
    pub fn new(id: i64, voltage: f64) -> Self {
        Self {
            id: BusId::new(id),
            voltage: PerUnit(voltage),
        }
    }
}

/// Canonical branch record: one solved power flow with an optional rating.
///
/// Every field is independently optional; upstream documents routinely omit
/// some of them. Nullability is resolved by [`thermal_loading`], not during
/// normalization.
///
/// [`thermal_loading`]: BranchFlow::thermal_loading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BranchFlow {
    /// Position in the upstream branch table, when reported.
    pub index: Option<BranchIdx>,
    /// Active power flow at the from-end.
    pub active_power: Option<Megawatts>,
    /// Reactive power flow at the from-end.
    pub reactive_power: Option<Megavars>,
    /// Continuous thermal rating.
    pub rating: Option<MegavoltAmperes>,
}

impl BranchFlow {
    /// Apparent power and rating, when this branch is thermally checkable.
    ///
    /// A branch participates in thermal checking only if active power,
    /// reactive power, and rating are all present and the rating is
    /// positive. Anything else returns `None` and the branch is silently
    /// excluded — missing data is not a violation.
    pub fn thermal_loading(&self) -> Option<(MegavoltAmperes, MegavoltAmperes)> {
        let p = self.active_power?;
        let q = self.reactive_power?;
        let rating = self.rating?;
        if rating.value() <= 0.0 {
            return None;
        }
        Some((p.apparent_power(q), rating))
    }
}
