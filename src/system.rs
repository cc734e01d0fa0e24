//! Mamdani control system: fuzzification, rule evaluation, aggregation and
//! defuzzification.
//!
//! A [`ControlSystem`] is immutable once built and holds no per-evaluation
//! state, so one instance can be shared (e.g. behind an `Arc`) by any number
//! of concurrent evaluations.

use std::collections::BTreeMap;

use crate::defuzz::Defuzzification;
use crate::error::{EvaluationError, ValidationError};
use crate::rule::Rule;
use crate::variable::{Fuzzification, LinguisticVariable};

/// Crisp values keyed by input variable name.
pub type InputValues = BTreeMap<String, f64>;

/// Result of one evaluation, with the intermediate quantities that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    output: f64,
    firing_strengths: Vec<f64>,
    term_activation: BTreeMap<String, f64>,
    aggregated: Vec<(f64, f64)>,
}

impl Evaluation {
    /// The crisp output value.
    #[must_use]
    pub const fn output(&self) -> f64 {
        self.output
    }

    /// Firing strength of every rule, in rule order.
    #[must_use]
    pub fn firing_strengths(&self) -> &[f64] {
        &self.firing_strengths
    }

    /// Strongest firing per output term (max over rules sharing the term).
    #[must_use]
    pub const fn term_activation(&self) -> &BTreeMap<String, f64> {
        &self.term_activation
    }

    /// Aggregated output set as `(universe point, membership)` pairs.
    #[must_use]
    pub fn aggregated(&self) -> &[(f64, f64)] {
        &self.aggregated
    }
}

/// An immutable set of input variables, one output variable and a rule base.
#[derive(Debug, Clone)]
pub struct ControlSystem {
    inputs: Vec<LinguisticVariable>,
    output: LinguisticVariable,
    rules: Vec<Rule>,
    defuzzification: Defuzzification,
    // Output term curves sampled over the output universe, by term name.
    output_curves: BTreeMap<String, Vec<f64>>,
}

impl ControlSystem {
    /// Starts building a control system.
    #[must_use]
    pub fn builder() -> ControlSystemBuilder {
        ControlSystemBuilder::default()
    }

    /// Input variables in declaration order.
    #[must_use]
    pub fn inputs(&self) -> &[LinguisticVariable] {
        &self.inputs
    }

    /// Looks up an input variable by name.
    #[must_use]
    pub fn input(&self, name: &str) -> Option<&LinguisticVariable> {
        self.inputs.iter().find(|v| v.name() == name)
    }

    /// The output variable.
    #[must_use]
    pub const fn output(&self) -> &LinguisticVariable {
        &self.output
    }

    /// The rule base.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Defuzzification method used by [`ControlSystem::evaluate`].
    #[must_use]
    pub const fn defuzzification(&self) -> Defuzzification {
        self.defuzzification
    }

    /// Fuzzifies every input.
    ///
    /// # Errors
    ///
    /// Returns `EvaluationError::UnknownVariable` for a value naming an
    /// undeclared input, `EvaluationError::NonFiniteInput` for NaN or
    /// infinite values, and `EvaluationError::MissingInput` if a declared
    /// input has no value.
    pub fn fuzzify(
        &self,
        values: &InputValues,
    ) -> Result<BTreeMap<String, Fuzzification>, EvaluationError> {
        if let Some(unknown) = values.keys().find(|k| self.input(k).is_none()) {
            return Err(EvaluationError::UnknownVariable {
                name: unknown.clone(),
            });
        }

        let mut fuzzified = BTreeMap::new();
        for var in &self.inputs {
            let value = *values
                .get(var.name())
                .ok_or_else(|| EvaluationError::MissingInput {
                    variable: var.name().to_string(),
                })?;
            if !value.is_finite() {
                return Err(EvaluationError::NonFiniteInput {
                    variable: var.name().to_string(),
                    value,
                });
            }
            fuzzified.insert(var.name().to_string(), var.fuzzify(value));
        }
        Ok(fuzzified)
    }

    /// Runs the full pipeline for one set of crisp inputs.
    ///
    /// Pure: the system is not mutated and concurrent calls are independent.
    ///
    /// # Errors
    ///
    /// Propagates the input errors of [`ControlSystem::fuzzify`] and returns
    /// `EvaluationError::NoRuleFired` when the aggregated set is zero
    /// everywhere.
    pub fn evaluate(&self, values: &InputValues) -> Result<Evaluation, EvaluationError> {
        let fuzzified = self.fuzzify(values)?;

        let firing_strengths: Vec<f64> = self
            .rules
            .iter()
            .map(|rule| {
                let strength = rule.firing_strength(&fuzzified);
                tracing::trace!(rule = %rule, strength, "rule evaluated");
                strength
            })
            .collect();

        let (term_activation, membership) = self.aggregate(&firing_strengths);
        let points = self.output.universe().points();

        let output = self
            .defuzzification
            .defuzzify(points, &membership)
            .ok_or_else(|| {
                tracing::warn!(
                    output = self.output.name(),
                    ?values,
                    "no rule fired; aggregated set is empty"
                );
                EvaluationError::NoRuleFired {
                    variable: self.output.name().to_string(),
                }
            })?;

        tracing::debug!(
            output = self.output.name(),
            value = output,
            method = %self.defuzzification,
            ?values,
            "evaluation finished"
        );

        Ok(Evaluation {
            output,
            firing_strengths,
            term_activation,
            aggregated: points.iter().copied().zip(membership).collect(),
        })
    }

    /// Clips each consequent curve at its rule's strength (min implication)
    /// and unions everything pointwise (max aggregation).
    fn aggregate(&self, strengths: &[f64]) -> (BTreeMap<String, f64>, Vec<f64>) {
        let mut activation: BTreeMap<String, f64> = self
            .output
            .terms()
            .iter()
            .map(|t| (t.name().to_string(), 0.0))
            .collect();
        let mut membership = vec![0.0_f64; self.output.universe().len()];

        for (rule, &strength) in self.rules.iter().zip(strengths) {
            let term = &rule.consequent().term;
            if let Some(level) = activation.get_mut(term) {
                *level = level.max(strength);
            }
            if strength <= 0.0 {
                continue;
            }
            let Some(curve) = self.output_curves.get(term) else {
                continue;
            };
            for (acc, &mu) in membership.iter_mut().zip(curve) {
                *acc = acc.max(mu.min(strength));
            }
        }

        (activation, membership)
    }
}

/// Builder for [`ControlSystem`].
#[derive(Debug, Clone, Default)]
pub struct ControlSystemBuilder {
    inputs: Vec<LinguisticVariable>,
    output: Option<LinguisticVariable>,
    rules: Vec<Rule>,
    defuzzification: Defuzzification,
}

impl ControlSystemBuilder {
    /// Declares an input variable.
    #[must_use]
    pub fn input(mut self, variable: LinguisticVariable) -> Self {
        self.inputs.push(variable);
        self
    }

    /// Declares the output variable.
    #[must_use]
    pub fn output(mut self, variable: LinguisticVariable) -> Self {
        self.output = Some(variable);
        self
    }

    /// Adds a rule.
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several rules.
    #[must_use]
    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Sets the defuzzification method (centroid by default).
    #[must_use]
    pub fn defuzzification(mut self, method: Defuzzification) -> Self {
        self.defuzzification = method;
        self
    }

    /// Validates and builds the system.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the output is missing, names collide,
    /// there are no rules, or a rule references an unknown variable or term,
    /// uses the output in its antecedent, or concludes on an input.
    pub fn build(self) -> Result<ControlSystem, ValidationError> {
        let output = self.output.ok_or(ValidationError::MissingField {
            field: "output".to_string(),
        })?;

        let mut names: Vec<&str> = Vec::with_capacity(self.inputs.len() + 1);
        for var in self.inputs.iter().chain(std::iter::once(&output)) {
            if names.contains(&var.name()) {
                return Err(ValidationError::DuplicateVariable {
                    name: var.name().to_string(),
                });
            }
            names.push(var.name());
        }

        if self.rules.is_empty() {
            return Err(ValidationError::NoRules);
        }

        let find_input = |name: &str| self.inputs.iter().find(|v| v.name() == name);
        for rule in &self.rules {
            for r in rule.antecedent().term_refs() {
                let var = match find_input(&r.variable) {
                    Some(var) => var,
                    None if r.variable == output.name() => {
                        return Err(ValidationError::AntecedentNotInput {
                            variable: r.variable.clone(),
                        })
                    }
                    None => {
                        return Err(ValidationError::UnknownVariable {
                            variable: r.variable.clone(),
                        })
                    }
                };
                if var.term(&r.term).is_none() {
                    return Err(ValidationError::UnknownTerm {
                        variable: r.variable.clone(),
                        term: r.term.clone(),
                    });
                }
            }

            let consequent = rule.consequent();
            if consequent.variable != output.name() {
                return Err(if find_input(&consequent.variable).is_some() {
                    ValidationError::ConsequentNotOutput {
                        variable: consequent.variable.clone(),
                    }
                } else {
                    ValidationError::UnknownVariable {
                        variable: consequent.variable.clone(),
                    }
                });
            }
            if output.term(&consequent.term).is_none() {
                return Err(ValidationError::UnknownTerm {
                    variable: consequent.variable.clone(),
                    term: consequent.term.clone(),
                });
            }
        }

        let output_curves = output
            .terms()
            .iter()
            .map(|t| (t.name().to_string(), t.shape().sample(output.universe())))
            .collect();

        tracing::debug!(
            inputs = self.inputs.len(),
            output = output.name(),
            rules = self.rules.len(),
            method = %self.defuzzification,
            "control system built"
        );

        Ok(ControlSystem {
            inputs: self.inputs,
            output,
            rules: self.rules,
            defuzzification: self.defuzzification,
            output_curves,
        })
    }
}
