//! # gridsec-engine: Security Assessment Engine
//!
//! Takes an already-solved power-flow result, normalizes it into canonical
//! records, checks voltage and thermal limits, and folds the findings into
//! one bounded security score.
//!
//! The pipeline runs in a fixed order per request — normalize → detect →
//! score — and holds no state between requests:
//!
//! ```
//! use gridsec_core::Limits;
//! use gridsec_engine::SecurityEngine;
//! use serde_json::json;
//!
//! let engine = SecurityEngine::new();
//! let pf = json!({
//!     "bus": [{"id": 1, "Vm_pu": 1.00}],
//! });
//!
//! let assessment = engine.assess(&pf, &Limits::default()).unwrap();
//! assert_eq!(assessment.score, 1.0);
//! assert!(assessment.violations.is_empty());
//! ```
//!
//! ## Modules
//!
//! - [`normalize`] - Tolerant reduction of raw documents to canonical records
//! - [`detect`] - Voltage band and thermal rating checks
//! - [`score`] - The loss fold and the `1 / (1 + loss)` score

use serde_json::Value;
use tracing::debug;

use gridsec_core::{Assessment, GridsecError, GridsecResult, Limits, ScoreWeights};

pub mod detect;
pub mod normalize;
pub mod score;

pub use detect::{check_limits, LimitCheckReport};
pub use normalize::{normalize_document, NormalizeStats, NormalizedInput};
pub use score::{security_loss, security_score};

/// The assessment pipeline plus its scoring configuration.
///
/// Holds only the weights; every request's data is local to [`assess`] and
/// discarded when it returns, so one engine value can serve any number of
/// concurrent callers.
///
/// [`assess`]: SecurityEngine::assess
#[derive(Debug, Clone, Default)]
pub struct SecurityEngine {
    weights: ScoreWeights,
}

impl SecurityEngine {
    /// Engine with the default scoring weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with operator-supplied scoring weights.
    pub fn with_weights(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Assess one raw power-flow document against `limits`.
    ///
    /// Fatal conditions — the document is not an object, normalization
    /// yields no usable buses, or a present value refuses numeric coercion —
    /// reject the whole request with no partial result. Everything else the
    /// normalizer cannot use is dropped silently and the assessment
    /// proceeds on what remains.
    pub fn assess(&self, pf: &Value, limits: &Limits) -> GridsecResult<Assessment> {
        let document = pf.as_object().ok_or(GridsecError::DocumentNotObject)?;

        let normalized = normalize::normalize_document(document)?;
        if normalized.stats.total() > 0 {
            debug!(
                buses_dropped = normalized.stats.buses_dropped,
                rows_dropped = normalized.stats.rows_dropped,
                branches_dropped = normalized.stats.branches_dropped,
                "normalization dropped unusable records"
            );
        }
        if normalized.buses.is_empty() {
            return Err(GridsecError::NoBusData);
        }

        let report = detect::check_limits(&normalized.buses, &normalized.branches, limits);
        let score = score::security_score(&report, &self.weights);

        Ok(Assessment {
            ok: true,
            score,
            summary: report.summary(),
            violations: report.violations,
        })
    }
}
