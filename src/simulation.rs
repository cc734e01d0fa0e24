//! The set-inputs / compute / read-output evaluation protocol.
//!
//! A [`Simulation`] owns its scratch state (current inputs and last output)
//! and only borrows the immutable [`ControlSystem`] through an `Arc`, so
//! separate simulations never observe each other's inputs. When a single
//! scratch state really must be shared, [`SharedSimulation`] runs the whole
//! sequence under one lock.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::error::{EvaluationError, FuzzyError, FuzzyResult};
use crate::system::{ControlSystem, Evaluation, InputValues};

/// Where a simulation is in its evaluation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationState {
    /// At least one declared input has no value yet.
    Uninitialized,
    /// Every declared input has a value; nothing computed for them yet.
    InputsSet,
    /// Output is available for the current inputs.
    Computed,
}

impl fmt::Display for SimulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::InputsSet => write!(f, "inputs_set"),
            Self::Computed => write!(f, "computed"),
        }
    }
}

/// Private evaluation scratch state over a shared control system.
///
/// # Examples
///
/// ```
/// use fuzzy_satisfaction::{customer_satisfaction_system, Defuzzification, Simulation};
/// use std::sync::Arc;
///
/// let system = Arc::new(customer_satisfaction_system(1.0, Defuzzification::Centroid).unwrap());
/// let mut sim = Simulation::new(system);
/// sim.set_input("service_speed", 5.0).unwrap();
/// sim.set_input("food_quality", 5.0).unwrap();
/// sim.compute().unwrap();
/// let score = sim.get_output("customer_satisfaction").unwrap();
/// assert!((score - 5.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct Simulation {
    system: Arc<ControlSystem>,
    inputs: InputValues,
    last: Option<Evaluation>,
}

impl Simulation {
    /// Creates a simulation with empty scratch state.
    #[must_use]
    pub fn new(system: Arc<ControlSystem>) -> Self {
        Self {
            system,
            inputs: InputValues::new(),
            last: None,
        }
    }

    /// The control system being simulated.
    #[must_use]
    pub fn system(&self) -> &ControlSystem {
        &self.system
    }

    /// Current state of the evaluation cycle.
    #[must_use]
    pub fn state(&self) -> SimulationState {
        if self.last.is_some() {
            SimulationState::Computed
        } else if self
            .system
            .inputs()
            .iter()
            .all(|v| self.inputs.contains_key(v.name()))
        {
            SimulationState::InputsSet
        } else {
            SimulationState::Uninitialized
        }
    }

    /// Sets the crisp value of an input variable.
    ///
    /// Values outside the universe are accepted; they simply fuzzify to zero
    /// beyond the outermost term. Any previously computed output is discarded.
    ///
    /// # Errors
    ///
    /// Returns `EvaluationError::UnknownVariable` if `name` is not a declared
    /// input and `EvaluationError::NonFiniteInput` for NaN or infinite values.
    pub fn set_input(&mut self, name: &str, value: f64) -> Result<(), EvaluationError> {
        if self.system.input(name).is_none() {
            return Err(EvaluationError::UnknownVariable {
                name: name.to_string(),
            });
        }
        if !value.is_finite() {
            return Err(EvaluationError::NonFiniteInput {
                variable: name.to_string(),
                value,
            });
        }
        self.inputs.insert(name.to_string(), value);
        self.last = None;
        Ok(())
    }

    /// Sets several inputs at once, stopping at the first error.
    ///
    /// # Errors
    ///
    /// See [`Simulation::set_input`].
    pub fn set_inputs<'a>(
        &mut self,
        values: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Result<(), EvaluationError> {
        values
            .into_iter()
            .try_for_each(|(name, value)| self.set_input(name, value))
    }

    /// Runs the pipeline for the current inputs and stores the result.
    ///
    /// Computing twice with unchanged inputs yields the same output.
    ///
    /// # Errors
    ///
    /// Returns `EvaluationError::MissingInput` if a declared input has no
    /// value and `EvaluationError::NoRuleFired` if no rule fires.
    pub fn compute(&mut self) -> Result<f64, EvaluationError> {
        self.last = None;
        let evaluation = self.system.evaluate(&self.inputs)?;
        let output = evaluation.output();
        self.last = Some(evaluation);
        Ok(output)
    }

    /// Reads the crisp output computed for the current inputs.
    ///
    /// # Errors
    ///
    /// Returns `EvaluationError::UnknownVariable` if `name` is not the output
    /// variable and `EvaluationError::NotComputed` before a successful
    /// [`Simulation::compute`] for the current inputs.
    pub fn get_output(&self, name: &str) -> Result<f64, EvaluationError> {
        if name != self.system.output().name() {
            return Err(EvaluationError::UnknownVariable {
                name: name.to_string(),
            });
        }
        self.last
            .as_ref()
            .map(Evaluation::output)
            .ok_or_else(|| EvaluationError::NotComputed {
                variable: name.to_string(),
            })
    }

    /// The full trace of the last successful computation.
    #[must_use]
    pub fn last_evaluation(&self) -> Option<&Evaluation> {
        self.last.as_ref()
    }

    /// Clears inputs and output.
    pub fn reset(&mut self) {
        self.inputs.clear();
        self.last = None;
    }
}

/// One scratch state shared between callers, serialized by a mutex.
///
/// Each [`SharedSimulation::run`] holds the lock for the whole
/// set-inputs, compute, read-output sequence, so no caller can overwrite
/// another's inputs mid-evaluation.
#[derive(Debug)]
pub struct SharedSimulation {
    inner: Mutex<Simulation>,
}

impl SharedSimulation {
    /// Wraps a fresh simulation of `system`.
    #[must_use]
    pub fn new(system: Arc<ControlSystem>) -> Self {
        Self {
            inner: Mutex::new(Simulation::new(system)),
        }
    }

    /// Sets all inputs, computes and reads the output atomically.
    ///
    /// # Errors
    ///
    /// Returns the evaluation error of any step, or an internal error if the
    /// lock was poisoned.
    pub fn run<'a>(&self, values: impl IntoIterator<Item = (&'a str, f64)>) -> FuzzyResult<f64> {
        let mut sim = self
            .inner
            .lock()
            .map_err(|_| FuzzyError::internal("shared simulation lock poisoned"))?;
        sim.reset();
        sim.set_inputs(values)?;
        sim.compute()?;
        let output = sim.system().output().name().to_string();
        Ok(sim.get_output(&output)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defuzz::Defuzzification;
    use crate::satisfaction::{
        customer_satisfaction_system, CUSTOMER_SATISFACTION, FOOD_QUALITY, SERVICE_SPEED,
    };

    fn sim() -> Simulation {
        Simulation::new(Arc::new(
            customer_satisfaction_system(1.0, Defuzzification::Centroid).unwrap(),
        ))
    }

    #[test]
    fn state_machine_transitions() {
        let mut s = sim();
        assert_eq!(s.state(), SimulationState::Uninitialized);
        s.set_input(SERVICE_SPEED, 3.0).unwrap();
        assert_eq!(s.state(), SimulationState::Uninitialized);
        s.set_input(FOOD_QUALITY, 7.0).unwrap();
        assert_eq!(s.state(), SimulationState::InputsSet);
        s.compute().unwrap();
        assert_eq!(s.state(), SimulationState::Computed);
        s.set_input(SERVICE_SPEED, 4.0).unwrap();
        assert_eq!(s.state(), SimulationState::InputsSet);
    }

    #[test]
    fn output_before_compute_is_not_computed() {
        let mut s = sim();
        assert!(matches!(
            s.get_output(CUSTOMER_SATISFACTION),
            Err(EvaluationError::NotComputed { .. })
        ));
        s.set_inputs([(SERVICE_SPEED, 1.0), (FOOD_QUALITY, 1.0)]).unwrap();
        assert!(matches!(
            s.get_output(CUSTOMER_SATISFACTION),
            Err(EvaluationError::NotComputed { .. })
        ));
    }

    #[test]
    fn compute_requires_every_input() {
        let mut s = sim();
        s.set_input(SERVICE_SPEED, 1.0).unwrap();
        assert_eq!(
            s.compute(),
            Err(EvaluationError::MissingInput {
                variable: FOOD_QUALITY.to_string()
            })
        );
    }

    #[test]
    fn new_input_invalidates_previous_output() {
        let mut s = sim();
        s.set_inputs([(SERVICE_SPEED, 10.0), (FOOD_QUALITY, 10.0)]).unwrap();
        s.compute().unwrap();
        assert!(s.get_output(CUSTOMER_SATISFACTION).is_ok());
        s.set_input(FOOD_QUALITY, 0.0).unwrap();
        assert!(matches!(
            s.get_output(CUSTOMER_SATISFACTION),
            Err(EvaluationError::NotComputed { .. })
        ));
    }

    #[test]
    fn failed_compute_leaves_no_output() {
        let mut s = sim();
        s.set_inputs([(SERVICE_SPEED, 5.0), (FOOD_QUALITY, 5.0)]).unwrap();
        s.compute().unwrap();
        s.set_inputs([(SERVICE_SPEED, -20.0), (FOOD_QUALITY, 50.0)]).unwrap();
        assert!(matches!(s.compute(), Err(EvaluationError::NoRuleFired { .. })));
        assert!(matches!(
            s.get_output(CUSTOMER_SATISFACTION),
            Err(EvaluationError::NotComputed { .. })
        ));
        assert_eq!(s.state(), SimulationState::InputsSet);
    }

    #[test]
    fn unknown_names_rejected() {
        let mut s = sim();
        assert!(matches!(
            s.set_input("ambience", 3.0),
            Err(EvaluationError::UnknownVariable { .. })
        ));
        assert!(matches!(
            s.set_input(CUSTOMER_SATISFACTION, 3.0),
            Err(EvaluationError::UnknownVariable { .. })
        ));
        assert!(matches!(
            s.get_output(SERVICE_SPEED),
            Err(EvaluationError::UnknownVariable { .. })
        ));
        assert!(matches!(
            s.set_input(SERVICE_SPEED, f64::INFINITY),
            Err(EvaluationError::NonFiniteInput { .. })
        ));
    }

    #[test]
    fn clones_have_independent_scratch_state() {
        let mut a = sim();
        a.set_inputs([(SERVICE_SPEED, 0.0), (FOOD_QUALITY, 0.0)]).unwrap();
        let mut b = a.clone();
        b.set_inputs([(SERVICE_SPEED, 10.0), (FOOD_QUALITY, 10.0)]).unwrap();
        let low = a.compute().unwrap();
        let high = b.compute().unwrap();
        assert!(low < high);
    }

    #[test]
    fn shared_simulation_runs_whole_sequence() {
        let shared = SharedSimulation::new(Arc::new(
            customer_satisfaction_system(1.0, Defuzzification::Centroid).unwrap(),
        ));
        let out = shared.run([(SERVICE_SPEED, 5.0), (FOOD_QUALITY, 5.0)]).unwrap();
        assert!((out - 5.0).abs() < 1e-9);
        let err = shared.run([(SERVICE_SPEED, 5.0)]).unwrap_err();
        assert!(err.is_recoverable());
    }
}
