//! Error taxonomy shared across dispatch, simulation, and the case sweep.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure modes surfaced by dispatch, simulation, and persistence.
///
/// Errors raised while evaluating one candidate design are reported to the
/// optimization driver as an infeasible point; errors raised while running
/// one case of a sweep are logged and must not abort sibling cases.
#[derive(Debug, Error)]
pub enum Error {
    /// Time series passed together do not share the same length.
    #[error("dimension mismatch in {context}: expected {expected} values, got {actual}")]
    DimensionMismatch {
        /// What was being aligned (e.g., `"dispatch input series"`).
        context: String,
        /// Expected series length.
        expected: usize,
        /// Offending series length.
        actual: usize,
    },

    /// A physical or numeric parameter is invalid (e.g., zero battery power).
    #[error("configuration error: {field} — {message}")]
    Configuration {
        /// Dotted field path (e.g., `"battery.power_kw"`).
        field: String,
        /// Human-readable constraint description.
        message: String,
    },

    /// The scenario is structurally infeasible before or during simulation.
    #[error("infeasible scenario: {0}")]
    InfeasibleScenario(String),

    /// Reading or writing a persisted case file failed.
    #[error("persistence error for {path}: {message}")]
    Persistence {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying failure description.
        message: String,
    },
}

impl Error {
    /// Builds a [`Error::DimensionMismatch`].
    pub fn dimension_mismatch(
        context: impl Into<String>,
        expected: usize,
        actual: usize,
    ) -> Self {
        Self::DimensionMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }

    /// Builds a [`Error::Configuration`].
    pub fn configuration(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Builds a [`Error::Persistence`].
    pub fn persistence(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Persistence {
            path: path.into(),
            message: message.into(),
        }
    }
}
