//! Fuzzy rules: antecedent expressions and their consequents.
//!
//! Antecedents are trees of term references joined by fuzzy AND (minimum)
//! and fuzzy OR (maximum). Rules can be built with combinators or parsed
//! from text:
//!
//! ```text
//! IF service_speed IS slow AND food_quality IS bad THEN customer_satisfaction IS low
//! ```
//!
//! Keywords are case-insensitive, AND binds tighter than OR, and
//! parentheses group sub-expressions.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;

use crate::error::ValidationError;
use crate::variable::Fuzzification;

const TOKEN_PATTERN: &str = r"\(|\)|[A-Za-z_][A-Za-z0-9_]*|\S";

/// Reference to one term of one variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermRef {
    /// Variable name.
    pub variable: String,
    /// Term name on that variable.
    pub term: String,
}

impl TermRef {
    /// Creates a term reference.
    #[must_use]
    pub fn new(variable: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            term: term.into(),
        }
    }
}

impl fmt::Display for TermRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} IS {}", self.variable, self.term)
    }
}

/// Antecedent expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Antecedent {
    /// Leaf: membership of a term for its variable's crisp input.
    Term(TermRef),

    /// Fuzzy AND (minimum).
    And(Box<Antecedent>, Box<Antecedent>),

    /// Fuzzy OR (maximum).
    Or(Box<Antecedent>, Box<Antecedent>),
}

impl Antecedent {
    /// Leaf referencing `variable IS term`.
    #[must_use]
    pub fn is(variable: impl Into<String>, term: impl Into<String>) -> Self {
        Self::Term(TermRef::new(variable, term))
    }

    /// Combines with another expression using fuzzy AND.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// Combines with another expression using fuzzy OR.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// Evaluates the tree bottom-up against fuzzified inputs.
    ///
    /// A leaf whose variable or term is absent contributes zero.
    #[must_use]
    pub fn evaluate(&self, inputs: &BTreeMap<String, Fuzzification>) -> f64 {
        match self {
            Self::Term(r) => inputs
                .get(&r.variable)
                .and_then(|f| f.degree(&r.term))
                .unwrap_or(0.0),
            Self::And(lhs, rhs) => lhs.evaluate(inputs).min(rhs.evaluate(inputs)),
            Self::Or(lhs, rhs) => lhs.evaluate(inputs).max(rhs.evaluate(inputs)),
        }
    }

    /// Every term referenced by the tree, left to right.
    #[must_use]
    pub fn term_refs(&self) -> Vec<&TermRef> {
        let mut out = Vec::new();
        self.collect_refs(&mut out);
        out
    }

    fn collect_refs<'a>(&'a self, out: &mut Vec<&'a TermRef>) {
        match self {
            Self::Term(r) => out.push(r),
            Self::And(lhs, rhs) | Self::Or(lhs, rhs) => {
                lhs.collect_refs(out);
                rhs.collect_refs(out);
            }
        }
    }
}

impl fmt::Display for Antecedent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Term(r) => write!(f, "{r}"),
            Self::And(lhs, rhs) => {
                write_operand(f, lhs, false)?;
                write!(f, " AND ")?;
                write_operand(f, rhs, false)
            }
            Self::Or(lhs, rhs) => {
                write_operand(f, lhs, true)?;
                write!(f, " OR ")?;
                write_operand(f, rhs, true)
            }
        }
    }
}

// OR operands never need parentheses; AND operands do when they are ORs.
fn write_operand(f: &mut fmt::Formatter<'_>, node: &Antecedent, under_or: bool) -> fmt::Result {
    match node {
        Antecedent::Or(..) if !under_or => write!(f, "({node})"),
        _ => write!(f, "{node}"),
    }
}

/// A fuzzy rule: antecedent implies one output term.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    antecedent: Antecedent,
    consequent: TermRef,
}

impl Rule {
    /// Creates a rule.
    #[must_use]
    pub fn new(antecedent: Antecedent, consequent: TermRef) -> Self {
        Self {
            antecedent,
            consequent,
        }
    }

    /// Parses `IF <expr> THEN <variable> IS <term>`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::RuleSyntax` if the text does not follow the
    /// rule grammar.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let re = Regex::new(TOKEN_PATTERN).map_err(|e| syntax(text, format!("tokenizer: {e}")))?;
        let tokens: Vec<&str> = re.find_iter(text).map(|m| m.as_str()).collect();
        let mut parser = Parser {
            text,
            tokens,
            pos: 0,
        };
        let rule = parser.rule()?;
        if let Some(extra) = parser.peek() {
            return Err(syntax(text, format!("unexpected '{extra}' after consequent")));
        }
        Ok(rule)
    }

    /// The antecedent expression.
    #[must_use]
    pub const fn antecedent(&self) -> &Antecedent {
        &self.antecedent
    }

    /// The consequent output term.
    #[must_use]
    pub const fn consequent(&self) -> &TermRef {
        &self.consequent
    }

    /// Degree to which the antecedent holds, in `[0, 1]`.
    #[must_use]
    pub fn firing_strength(&self, inputs: &BTreeMap<String, Fuzzification>) -> f64 {
        self.antecedent.evaluate(inputs).clamp(0.0, 1.0)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IF {} THEN {}", self.antecedent, self.consequent)
    }
}

fn syntax(text: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError::RuleSyntax {
        text: text.to_string(),
        reason: reason.into(),
    }
}

fn is_identifier(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
}

struct Parser<'a> {
    text: &'a str,
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<&'a str> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        self.peek().is_some_and(|t| t.eq_ignore_ascii_case(keyword))
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), ValidationError> {
        match self.next() {
            Some(t) if t.eq_ignore_ascii_case(keyword) => Ok(()),
            Some(t) => Err(syntax(self.text, format!("expected {keyword}, found '{t}'"))),
            None => Err(syntax(self.text, format!("expected {keyword}, found end of input"))),
        }
    }

    fn identifier(&mut self) -> Result<&'a str, ValidationError> {
        match self.next() {
            Some(t) if is_identifier(t) && !is_keyword(t) => Ok(t),
            Some(t) => Err(syntax(self.text, format!("expected a name, found '{t}'"))),
            None => Err(syntax(self.text, "expected a name, found end of input")),
        }
    }

    fn rule(&mut self) -> Result<Rule, ValidationError> {
        self.expect_keyword("IF")?;
        let antecedent = self.or_expr()?;
        self.expect_keyword("THEN")?;
        let consequent = self.clause()?;
        Ok(Rule::new(antecedent, consequent))
    }

    fn or_expr(&mut self) -> Result<Antecedent, ValidationError> {
        let mut expr = self.and_expr()?;
        while self.peek_keyword("OR") {
            self.pos += 1;
            expr = expr.or(self.and_expr()?);
        }
        Ok(expr)
    }

    fn and_expr(&mut self) -> Result<Antecedent, ValidationError> {
        let mut expr = self.atom()?;
        while self.peek_keyword("AND") {
            self.pos += 1;
            expr = expr.and(self.atom()?);
        }
        Ok(expr)
    }

    fn atom(&mut self) -> Result<Antecedent, ValidationError> {
        if self.peek() == Some("(") {
            self.pos += 1;
            let inner = self.or_expr()?;
            return match self.next() {
                Some(")") => Ok(inner),
                _ => Err(syntax(self.text, "unbalanced parentheses")),
            };
        }
        Ok(Antecedent::Term(self.clause()?))
    }

    fn clause(&mut self) -> Result<TermRef, ValidationError> {
        let variable = self.identifier()?;
        self.expect_keyword("IS")?;
        let term = self.identifier()?;
        Ok(TermRef::new(variable, term))
    }
}

fn is_keyword(token: &str) -> bool {
    ["IF", "THEN", "AND", "OR", "IS"]
        .iter()
        .any(|k| token.eq_ignore_ascii_case(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::Triangular;
    use crate::universe::Universe;
    use crate::variable::LinguisticVariable;

    fn inputs(speed: f64, quality: f64) -> BTreeMap<String, Fuzzification> {
        let u = Universe::range(0.0, 10.0, 1.0).unwrap();
        let speed_var = LinguisticVariable::builder("speed")
            .universe(u.clone())
            .term("slow", Triangular::new(0.0, 0.0, 5.0).unwrap())
            .term("fast", Triangular::new(5.0, 10.0, 10.0).unwrap())
            .build()
            .unwrap();
        let quality_var = LinguisticVariable::builder("quality")
            .universe(u)
            .term("bad", Triangular::new(0.0, 0.0, 5.0).unwrap())
            .term("good", Triangular::new(2.0, 5.0, 8.0).unwrap())
            .build()
            .unwrap();
        let mut map = BTreeMap::new();
        map.insert("speed".to_string(), speed_var.fuzzify(speed));
        map.insert("quality".to_string(), quality_var.fuzzify(quality));
        map
    }

    #[test]
    fn and_is_minimum_or_is_maximum() {
        let fuzz = inputs(1.0, 3.5);
        // slow(1) = 0.8, good(3.5) = 0.5
        let and = Antecedent::is("speed", "slow").and(Antecedent::is("quality", "good"));
        let or = Antecedent::is("speed", "slow").or(Antecedent::is("quality", "good"));
        assert!((and.evaluate(&fuzz) - 0.5).abs() < 1e-12);
        assert!((or.evaluate(&fuzz) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn unmatched_inputs_fire_at_zero() {
        let rule = Rule::new(
            Antecedent::is("speed", "fast").and(Antecedent::is("quality", "good")),
            TermRef::new("out", "high"),
        );
        assert_eq!(rule.firing_strength(&inputs(0.0, 5.0)), 0.0);
    }

    #[test]
    fn unknown_leaf_contributes_zero() {
        let a = Antecedent::is("speed", "warp");
        assert_eq!(a.evaluate(&inputs(10.0, 10.0)), 0.0);
    }

    #[test]
    fn parse_simple_rule() {
        let rule =
            Rule::parse("IF service_speed IS slow AND food_quality IS bad THEN customer_satisfaction IS low")
                .unwrap();
        assert_eq!(
            rule.antecedent(),
            &Antecedent::is("service_speed", "slow").and(Antecedent::is("food_quality", "bad"))
        );
        assert_eq!(rule.consequent(), &TermRef::new("customer_satisfaction", "low"));
    }

    #[test]
    fn parse_respects_precedence_and_parentheses() {
        let flat = Rule::parse("if a is x or b is y and c is z then o is t").unwrap();
        assert_eq!(
            flat.antecedent(),
            &Antecedent::is("a", "x").or(Antecedent::is("b", "y").and(Antecedent::is("c", "z")))
        );

        let grouped = Rule::parse("IF (a IS x OR b IS y) AND c IS z THEN o IS t").unwrap();
        assert_eq!(
            grouped.antecedent(),
            &Antecedent::is("a", "x").or(Antecedent::is("b", "y")).and(Antecedent::is("c", "z"))
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        let text = "IF (a IS x OR b IS y) AND c IS z THEN o IS t";
        let rule = Rule::parse(text).unwrap();
        assert_eq!(rule.to_string(), text);
        assert_eq!(Rule::parse(&rule.to_string()).unwrap(), rule);
    }

    #[test]
    fn parse_errors_are_reported() {
        for bad in [
            "",
            "service_speed IS slow THEN out IS low",
            "IF service_speed IS slow",
            "IF (a IS x THEN o IS t",
            "IF a IS x THEN o IS t extra",
            "IF a IS THEN o IS t",
            "IF a IS x; THEN o IS t",
        ] {
            assert!(
                matches!(Rule::parse(bad), Err(ValidationError::RuleSyntax { .. })),
                "expected syntax error for {bad:?}"
            );
        }
    }

    #[test]
    fn term_refs_in_order() {
        let a = Antecedent::is("a", "x").and(Antecedent::is("b", "y").or(Antecedent::is("c", "z")));
        let vars: Vec<&str> = a.term_refs().iter().map(|r| r.variable.as_str()).collect();
        assert_eq!(vars, vec!["a", "b", "c"]);
    }
}
