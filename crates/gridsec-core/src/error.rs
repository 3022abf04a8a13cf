//! Structured rejections for assessment requests.
//!
//! Normalization is deliberately tolerant: individual malformed records are
//! dropped, not reported. [`GridsecError`] covers the opposite channel — the
//! conditions under which the whole request is rejected and no partial
//! result is produced. Every variant is a client error; the `Display`
//! strings are the client-facing detail messages and [`reason`] gives a
//! stable machine-readable code per variant.
//!
//! [`reason`]: GridsecError::reason

use thiserror::Error;

/// Fatal rejection of an assessment request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridsecError {
    /// The top-level power-flow document is not a JSON object.
    #[error("pf must be an object")]
    DocumentNotObject,

    /// Normalization produced no usable bus voltages at all.
    #[error("pf.bus missing or unrecognized")]
    NoBusData,

    /// A field was present and non-null but could not be coerced to its
    /// numeric type. Tolerance stops here: dropping the record would
    /// silently assess wrong data.
    #[error("{entity} field '{field}' is not numeric: {value}")]
    InvalidField {
        /// What kind of record carried the field (`"bus"`, `"bus row"`, `"branch"`).
        entity: &'static str,
        /// The offending key or column.
        field: &'static str,
        /// The offending value, rendered as JSON.
        value: String,
    },
}

impl GridsecError {
    /// Stable reason code for logs and request metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            GridsecError::DocumentNotObject => "not_an_object",
            GridsecError::NoBusData => "no_bus_data",
            GridsecError::InvalidField { .. } => "invalid_field",
        }
    }
}

/// Convenience type alias for Results using GridsecError.
pub type GridsecResult<T> = Result<T, GridsecError>;
