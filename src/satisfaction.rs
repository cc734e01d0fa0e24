//! The customer-satisfaction model.
//!
//! Two inputs, service speed and food quality, each scored on `[0, 10]`,
//! drive one output, customer satisfaction on `[0, 10]`, through a fixed
//! nine-rule table:
//!
//! | speed \ quality | bad    | good   | excellent |
//! |-----------------|--------|--------|-----------|
//! | slow            | low    | medium | medium    |
//! | normal          | low    | medium | high      |
//! | fast            | medium | high   | high      |

use std::fmt;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::defuzz::Defuzzification;
use crate::error::{EvaluationError, FuzzyResult, ValidationError};
use crate::membership::Triangular;
use crate::rule::{Antecedent, Rule, TermRef};
use crate::simulation::Simulation;
use crate::system::{ControlSystem, Evaluation, InputValues};
use crate::universe::Universe;
use crate::variable::LinguisticVariable;

/// Input variable name for service speed.
pub const SERVICE_SPEED: &str = "service_speed";
/// Input variable name for food quality.
pub const FOOD_QUALITY: &str = "food_quality";
/// Output variable name.
pub const CUSTOMER_SATISFACTION: &str = "customer_satisfaction";

/// Lower bound shared by every universe.
pub const UNIVERSE_MIN: f64 = 0.0;
/// Upper bound shared by every universe.
pub const UNIVERSE_MAX: f64 = 10.0;

const SPEED_TERMS: [(&str, [f64; 3]); 3] = [
    ("slow", [0.0, 0.0, 5.0]),
    ("normal", [2.0, 5.0, 8.0]),
    ("fast", [5.0, 10.0, 10.0]),
];

const QUALITY_TERMS: [(&str, [f64; 3]); 3] = [
    ("bad", [0.0, 0.0, 5.0]),
    ("good", [2.0, 5.0, 8.0]),
    ("excellent", [5.0, 10.0, 10.0]),
];

const SATISFACTION_TERMS: [(&str, [f64; 3]); 3] = [
    ("low", [0.0, 0.0, 5.0]),
    ("medium", [2.0, 5.0, 8.0]),
    ("high", [5.0, 10.0, 10.0]),
];

/// `(speed term, quality term, satisfaction term)` for every rule.
pub const RULE_TABLE: [(&str, &str, &str); 9] = [
    ("slow", "bad", "low"),
    ("slow", "good", "medium"),
    ("slow", "excellent", "medium"),
    ("normal", "bad", "low"),
    ("normal", "good", "medium"),
    ("normal", "excellent", "high"),
    ("fast", "bad", "medium"),
    ("fast", "good", "high"),
    ("fast", "excellent", "high"),
];

/// The closed set of model inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SatisfactionInput {
    /// How quickly the customer was served.
    ServiceSpeed,
    /// How good the food was.
    FoodQuality,
}

impl SatisfactionInput {
    /// Every input, in declaration order.
    pub const ALL: [Self; 2] = [Self::ServiceSpeed, Self::FoodQuality];

    /// Variable name inside the control system.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ServiceSpeed => SERVICE_SPEED,
            Self::FoodQuality => FOOD_QUALITY,
        }
    }
}

impl fmt::Display for SatisfactionInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn variable(
    name: &str,
    universe: &Universe,
    terms: &[(&str, [f64; 3])],
) -> Result<LinguisticVariable, ValidationError> {
    let mut builder = LinguisticVariable::builder(name).universe(universe.clone());
    for &(term, [a, b, c]) in terms {
        builder = builder.term(term, Triangular::new(a, b, c)?);
    }
    builder.build()
}

/// Builds the nine-rule customer-satisfaction system.
///
/// `step` is the spacing of the `[0, 10]` universes; `1.0` reproduces the
/// reference discretization, smaller steps refine defuzzification.
///
/// # Errors
///
/// Returns `ValidationError::InvalidStep` for a step that is not positive,
/// not finite, or wider than the universe.
pub fn customer_satisfaction_system(
    step: f64,
    method: Defuzzification,
) -> Result<ControlSystem, ValidationError> {
    let universe = Universe::range(UNIVERSE_MIN, UNIVERSE_MAX, step)?;

    let rules = RULE_TABLE.iter().map(|&(speed, quality, satisfaction)| {
        Rule::new(
            Antecedent::is(SERVICE_SPEED, speed).and(Antecedent::is(FOOD_QUALITY, quality)),
            TermRef::new(CUSTOMER_SATISFACTION, satisfaction),
        )
    });

    ControlSystem::builder()
        .input(variable(SERVICE_SPEED, &universe, &SPEED_TERMS)?)
        .input(variable(FOOD_QUALITY, &universe, &QUALITY_TERMS)?)
        .output(variable(CUSTOMER_SATISFACTION, &universe, &SATISFACTION_TERMS)?)
        .rules(rules)
        .defuzzification(method)
        .build()
}

/// Crisp scores for both inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatisfactionInputs {
    /// Service speed score.
    pub service_speed: f64,
    /// Food quality score.
    pub food_quality: f64,
}

impl SatisfactionInputs {
    /// Value for one input.
    #[must_use]
    pub const fn get(&self, input: SatisfactionInput) -> f64 {
        match input {
            SatisfactionInput::ServiceSpeed => self.service_speed,
            SatisfactionInput::FoodQuality => self.food_quality,
        }
    }
}

impl From<SatisfactionInputs> for InputValues {
    fn from(inputs: SatisfactionInputs) -> Self {
        SatisfactionInput::ALL
            .iter()
            .map(|i| (i.name().to_string(), inputs.get(*i)))
            .collect()
    }
}

/// A ready-to-use satisfaction model shared across evaluations.
///
/// Cheap to clone; clones share the same immutable system.
#[derive(Debug, Clone)]
pub struct SatisfactionModel {
    system: Arc<ControlSystem>,
}

impl SatisfactionModel {
    /// Model with the reference discretization (step 1) and centroid output.
    ///
    /// # Errors
    ///
    /// Only fails if the built-in definition is inconsistent.
    pub fn new() -> FuzzyResult<Self> {
        Self::from_config(&EngineConfig::default())
    }

    /// Model using the step and defuzzification method from `config`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the configured step is unusable.
    pub fn from_config(config: &EngineConfig) -> FuzzyResult<Self> {
        let system = customer_satisfaction_system(config.universe_step, config.defuzzification)?;
        Ok(Self {
            system: Arc::new(system),
        })
    }

    /// The underlying control system.
    #[must_use]
    pub fn system(&self) -> &Arc<ControlSystem> {
        &self.system
    }

    /// Starts a typed simulation with its own scratch state.
    #[must_use]
    pub fn simulation(&self) -> SatisfactionSimulation {
        SatisfactionSimulation {
            inner: Simulation::new(Arc::clone(&self.system)),
        }
    }

    /// Scores one customer.
    ///
    /// # Errors
    ///
    /// Returns `EvaluationError::NonFiniteInput` for NaN or infinite scores
    /// and `EvaluationError::NoRuleFired` when either score falls outside
    /// every term.
    pub fn score(&self, service_speed: f64, food_quality: f64) -> Result<f64, EvaluationError> {
        let mut sim = self.simulation();
        sim.set(SatisfactionInput::ServiceSpeed, service_speed)?;
        sim.set(SatisfactionInput::FoodQuality, food_quality)?;
        sim.compute()
    }

    /// Evaluates with the full trace.
    ///
    /// # Errors
    ///
    /// Same as [`SatisfactionModel::score`].
    pub fn evaluate(&self, inputs: SatisfactionInputs) -> Result<Evaluation, EvaluationError> {
        self.system.evaluate(&inputs.into())
    }
}

/// Simulation restricted to the model's declared inputs.
#[derive(Debug, Clone)]
pub struct SatisfactionSimulation {
    inner: Simulation,
}

impl SatisfactionSimulation {
    /// Sets one input.
    ///
    /// # Errors
    ///
    /// Returns `EvaluationError::NonFiniteInput` for NaN or infinite values.
    pub fn set(&mut self, input: SatisfactionInput, value: f64) -> Result<(), EvaluationError> {
        self.inner.set_input(input.name(), value)
    }

    /// Computes the satisfaction score for the current inputs.
    ///
    /// # Errors
    ///
    /// Returns `EvaluationError::MissingInput` or `EvaluationError::NoRuleFired`.
    pub fn compute(&mut self) -> Result<f64, EvaluationError> {
        self.inner.compute()
    }

    /// The last computed score.
    ///
    /// # Errors
    ///
    /// Returns `EvaluationError::NotComputed` before a successful compute.
    pub fn output(&self) -> Result<f64, EvaluationError> {
        self.inner.get_output(CUSTOMER_SATISFACTION)
    }

    /// Access to the untyped protocol.
    #[must_use]
    pub const fn as_simulation(&self) -> &Simulation {
        &self.inner
    }
}
