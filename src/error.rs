//! Error types for each boundary of the planning pipeline.
//!
//! The packer boundary separates retryable infeasibility from everything else,
//! and the planner boundary separates caller mistakes from terminal failures.

use thiserror::Error;

/// Outcome of a failed packing attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackError {
    /// No arrangement of all items fits in the supplied panel units.
    #[error("no feasible placement of all items in the supplied panels")]
    Infeasible,

    /// Anything else; not retried.
    #[error("packer failure: {reason}")]
    Fatal {
        /// What the packer reported.
        reason: String,
    },
}

/// Errors surfaced by the planner.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// The request was rejected before any expansion.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The retry ceiling was reached while the packer still reported infeasible.
    #[error(
        "UnresolvableError: No valid cutting solution found even with {total} panels. \
         Try adjusting item dimensions or using a different optimization method."
    )]
    CeilingExhausted {
        /// Total panel quantity of the final attempt.
        total: u64,
    },

    /// The packer and the expander disagree about unit identifiers.
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// A non-retryable packer failure.
    #[error("PackerError: {0}")]
    Packer(String),

    /// The caller's deadline passed between attempts.
    #[error("deadline exceeded after {attempts} attempt(s)")]
    DeadlineExceeded {
        /// Attempts completed before giving up.
        attempts: u32,
    },
}

impl PlanError {
    pub fn is_validation(&self) -> bool {
        matches!(self, PlanError::Validation(_))
    }
}

impl From<PackError> for PlanError {
    fn from(err: PackError) -> Self {
        match err {
            // Infeasibility only escapes the retry controller as ceiling exhaustion.
            PackError::Infeasible => PlanError::Packer(err.to_string()),
            PackError::Fatal { reason } => PlanError::Packer(reason),
        }
    }
}

/// Convenient result alias for planner operations.
pub type Result<T> = std::result::Result<T, PlanError>;
