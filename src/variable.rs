//! Linguistic variables and their fuzzy terms.
//!
//! A variable owns a fixed universe and an ordered set of uniquely named
//! terms. Both are frozen once the builder succeeds.

use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::membership::Triangular;
use crate::universe::Universe;

/// A named membership function attached to a variable.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyTerm {
    variable: String,
    name: String,
    shape: Triangular,
}

impl FuzzyTerm {
    /// Name of the owning variable.
    #[must_use]
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Term label, e.g. `"slow"`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The membership shape.
    #[must_use]
    pub const fn shape(&self) -> &Triangular {
        &self.shape
    }

    /// Degree of membership of a crisp value.
    #[must_use]
    pub fn membership(&self, x: f64) -> f64 {
        self.shape.evaluate(x)
    }
}

/// Membership degree of every term of one variable for one crisp value.
#[derive(Debug, Clone, PartialEq)]
pub struct Fuzzification {
    value: f64,
    degrees: BTreeMap<String, f64>,
}

impl Fuzzification {
    /// The crisp value that was fuzzified.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Degree for a term, or `None` if the variable has no such term.
    #[must_use]
    pub fn degree(&self, term: &str) -> Option<f64> {
        self.degrees.get(term).copied()
    }

    /// All degrees keyed by term name.
    #[must_use]
    pub const fn degrees(&self) -> &BTreeMap<String, f64> {
        &self.degrees
    }

    /// Returns true if no term has positive membership.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.degrees.values().all(|&d| d == 0.0)
    }
}

/// A named numeric dimension described by fuzzy terms.
///
/// # Examples
///
/// ```
/// use fuzzy_satisfaction::{LinguisticVariable, Triangular, Universe};
///
/// let speed = LinguisticVariable::builder("service_speed")
///     .universe(Universe::range(0.0, 10.0, 1.0).unwrap())
///     .term("slow", Triangular::new(0.0, 0.0, 5.0).unwrap())
///     .term("fast", Triangular::new(5.0, 10.0, 10.0).unwrap())
///     .build()
///     .unwrap();
///
/// let degrees = speed.fuzzify(10.0);
/// assert_eq!(degrees.degree("fast"), Some(1.0));
/// assert_eq!(degrees.degree("slow"), Some(0.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LinguisticVariable {
    name: String,
    universe: Universe,
    terms: Vec<FuzzyTerm>,
}

impl LinguisticVariable {
    /// Starts building a variable with the given name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> LinguisticVariableBuilder {
        LinguisticVariableBuilder {
            name: name.into(),
            universe: None,
            terms: Vec::new(),
        }
    }

    /// Variable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The discretized universe.
    #[must_use]
    pub const fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Terms in declaration order.
    #[must_use]
    pub fn terms(&self) -> &[FuzzyTerm] {
        &self.terms
    }

    /// Looks up a term by name.
    #[must_use]
    pub fn term(&self, name: &str) -> Option<&FuzzyTerm> {
        self.terms.iter().find(|t| t.name == name)
    }

    /// Computes the membership degree of every term for `value`.
    #[must_use]
    pub fn fuzzify(&self, value: f64) -> Fuzzification {
        let degrees = self
            .terms
            .iter()
            .map(|t| (t.name.clone(), t.membership(value)))
            .collect();
        Fuzzification { value, degrees }
    }
}

/// Builder for [`LinguisticVariable`].
#[derive(Debug, Clone)]
pub struct LinguisticVariableBuilder {
    name: String,
    universe: Option<Universe>,
    terms: Vec<(String, Triangular)>,
}

impl LinguisticVariableBuilder {
    /// Sets the universe.
    #[must_use]
    pub fn universe(mut self, universe: Universe) -> Self {
        self.universe = Some(universe);
        self
    }

    /// Adds a term.
    #[must_use]
    pub fn term(mut self, name: impl Into<String>, shape: Triangular) -> Self {
        self.terms.push((name.into(), shape));
        self
    }

    /// Builds the variable.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the name or a term name is empty, the
    /// universe is missing, or two terms share a name.
    pub fn build(self) -> Result<LinguisticVariable, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let universe = self.universe.ok_or(ValidationError::MissingField {
            field: "universe".to_string(),
        })?;

        let mut terms: Vec<FuzzyTerm> = Vec::with_capacity(self.terms.len());
        for (term, shape) in self.terms {
            if term.trim().is_empty() {
                return Err(ValidationError::EmptyName);
            }
            if terms.iter().any(|t| t.name == term) {
                return Err(ValidationError::DuplicateTerm {
                    variable: self.name,
                    term,
                });
            }
            terms.push(FuzzyTerm {
                variable: self.name.clone(),
                name: term,
                shape,
            });
        }

        Ok(LinguisticVariable {
            name: self.name,
            universe,
            terms,
        })
    }
}
