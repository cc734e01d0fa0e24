//! # fuzzy-satisfaction - Mamdani fuzzy inference for customer satisfaction
//!
//! Estimates a customer-satisfaction score from two crisp inputs, service
//! speed and food quality, with a rule-based Mamdani inference system.
//!
//! ## Core Concepts
//!
//! - **LinguisticVariable**: a named dimension with a discretized universe and fuzzy terms
//! - **Triangular**: the membership shape of every term
//! - **Rule**: an AND/OR antecedent over input terms implying one output term
//! - **ControlSystem**: immutable variables + rule base; fuzzify, fire, aggregate, defuzzify
//! - **Simulation**: private set-inputs / compute / read-output scratch state
//!
//! ## Usage
//!
//! ```rust
//! use fuzzy_satisfaction::SatisfactionModel;
//!
//! let model = SatisfactionModel::new()?;
//! let score = model.score(10.0, 10.0)?;
//! assert!(score > 8.0 && score < 8.5);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Engine building blocks
pub mod defuzz;
pub mod error;
pub mod membership;
pub mod rule;
pub mod universe;
pub mod variable;

// Inference and evaluation
pub mod batch;
pub mod config;
pub mod satisfaction;
pub mod simulation;
pub mod system;

// Re-export primary types at crate root for convenience
pub use batch::BatchEvaluator;
pub use config::EngineConfig;
pub use defuzz::Defuzzification;
pub use error::{EvaluationError, FuzzyError, FuzzyResult, ValidationError};
pub use membership::Triangular;
pub use rule::{Antecedent, Rule, TermRef};
pub use satisfaction::{
    customer_satisfaction_system, SatisfactionInput, SatisfactionInputs, SatisfactionModel,
    SatisfactionSimulation, CUSTOMER_SATISFACTION, FOOD_QUALITY, SERVICE_SPEED,
};
pub use simulation::{SharedSimulation, Simulation, SimulationState};
pub use system::{ControlSystem, ControlSystemBuilder, Evaluation, InputValues};
pub use universe::Universe;
pub use variable::{Fuzzification, FuzzyTerm, LinguisticVariable, LinguisticVariableBuilder};
