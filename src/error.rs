//! Error types for the inference engine.
//!
//! All errors are strongly typed using thiserror so callers can pattern
//! match on specific conditions. Construction problems surface as
//! [`ValidationError`]; problems with a single evaluation surface as
//! [`EvaluationError`] and never as a numeric sentinel.

use thiserror::Error;

/// Validation errors raised while building universes, variables, rules and systems.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Universe must contain at least one point")]
    EmptyUniverse,

    #[error("Universe is not strictly increasing at index {index} ({previous} -> {current})")]
    UniverseNotIncreasing {
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("Universe bounds are invalid: min ({min}) must be below max ({max})")]
    InvalidUniverseBounds {
        min: f64,
        max: f64,
    },

    #[error("Discretization step {step} must be positive, finite and no wider than the universe")]
    InvalidStep {
        step: f64,
    },

    #[error("Breakpoints ({a}, {b}, {c}) must be finite and non-decreasing")]
    InvalidBreakpoints {
        a: f64,
        b: f64,
        c: f64,
    },

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Term '{term}' is already defined on variable '{variable}'")]
    DuplicateTerm {
        variable: String,
        term: String,
    },

    #[error("Variable '{name}' is declared more than once")]
    DuplicateVariable {
        name: String,
    },

    #[error("Rule references unknown variable '{variable}'")]
    UnknownVariable {
        variable: String,
    },

    #[error("Rule references unknown term '{term}' on variable '{variable}'")]
    UnknownTerm {
        variable: String,
        term: String,
    },

    #[error("Antecedent references '{variable}', which is not an input variable")]
    AntecedentNotInput {
        variable: String,
    },

    #[error("Consequent references '{variable}', which is not the output variable")]
    ConsequentNotOutput {
        variable: String,
    },

    #[error("Control system needs at least one rule")]
    NoRules,

    #[error("Required field '{field}' is missing")]
    MissingField {
        field: String,
    },

    #[error("Cannot parse rule '{text}': {reason}")]
    RuleSyntax {
        text: String,
        reason: String,
    },
}

/// Errors raised by a single evaluation (set inputs, compute, read output).
///
/// Every variant is local and recoverable: fix the inputs and retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("No crisp value was supplied for input variable '{variable}'")]
    MissingInput {
        variable: String,
    },

    #[error("No rule fired: aggregated membership of '{variable}' is zero everywhere")]
    NoRuleFired {
        variable: String,
    },

    #[error("Output '{variable}' has not been computed for the current inputs")]
    NotComputed {
        variable: String,
    },

    #[error("Variable '{name}' is not declared by this system")]
    UnknownVariable {
        name: String,
    },

    #[error("Input '{variable}' must be finite, got {value}")]
    NonFiniteInput {
        variable: String,
        value: f64,
    },
}

/// Top-level error type.
#[derive(Debug, Error)]
pub enum FuzzyError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl FuzzyError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an evaluation error.
    #[must_use]
    pub const fn is_evaluation(&self) -> bool {
        matches!(self, Self::Evaluation(_))
    }

    /// Returns true if the caller can retry after correcting its inputs.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Evaluation(_))
    }
}

impl From<config::ConfigError> for FuzzyError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for engine operations.
pub type FuzzyResult<T> = Result<T, FuzzyError>;
