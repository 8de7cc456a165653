//! System of equations solver
//!
//! Solves systems that reduce to one linear unknown per equation by
//! substitution. Equations that never get there leave their variable
//! unknown; nothing here fails.

use crate::evaluator::{self, Scope};
use crate::format::format_value;
use canvas_model::glyphs;
use std::collections::{BTreeMap, BTreeSet};

/// Values found for a system, keyed by variable name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemSolution {
    pub values: BTreeMap<String, f64>,
}

impl SystemSolution {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// `name = value` for every variable, `unknown` when unsolved
    pub fn describe(&self, variables: &BTreeSet<String>, precision: u32) -> String {
        variables
            .iter()
            .map(|name| match self.get(name) {
                Some(value) => format!("{} = {}", name, format_value(value, precision)),
                None => format!("{} = unknown", name),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A top-level additive term of one equation side
#[derive(Debug, Clone, PartialEq)]
struct Term {
    negative: bool,
    words: Vec<String>,
}

impl Term {
    fn new(negative: bool) -> Self {
        Self {
            negative,
            words: Vec::new(),
        }
    }

    fn sign(&self) -> f64 {
        if self.negative {
            -1.0
        } else {
            1.0
        }
    }

    fn text(&self) -> String {
        self.words.join(" ")
    }

    /// The variable name if the term is a single identifier
    fn lone_variable(&self) -> Option<&str> {
        match self.words.as_slice() {
            [word] if is_variable_name(word) => Some(word),
            _ => None,
        }
    }
}

fn is_variable_name(word: &str) -> bool {
    let mut chars = word.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_alphabetic());
    starts_alpha && chars.all(|c| c.is_alphanumeric() || c == '_') && !matches!(word, "pi" | "e")
}

fn is_additive(word: &str) -> bool {
    matches!(word, "+" | "-") || word == glyphs::MINUS_SIGN
}

/// Split a side into top-level additive terms
fn split_terms(side: &str) -> Vec<Term> {
    let mut terms = Vec::new();
    let mut current = Term::new(false);
    let mut depth: i32 = 0;

    for word in side.split_whitespace() {
        if depth == 0 && is_additive(word) {
            let negative = word != glyphs::PLUS;
            let after_operator = current
                .words
                .last()
                .is_some_and(|w| matches!(w.as_str(), "*" | "/" | "^"));

            if current.words.is_empty() {
                // leading sign
                current.negative ^= negative;
            } else if after_operator {
                current.words.push(word.to_string());
            } else {
                terms.push(std::mem::replace(&mut current, Term::new(negative)));
            }
            continue;
        }

        depth += word.matches('(').count() as i32;
        depth -= word.matches(')').count() as i32;
        current.words.push(word.to_string());
    }

    if !current.words.is_empty() {
        terms.push(current);
    }
    terms
}

/// Replace whole-word occurrences of bound variables with their values
fn substitute(side: &str, values: &BTreeMap<String, f64>) -> String {
    side.split_whitespace()
        .map(|word| match values.get(word) {
            Some(value) if *value < 0.0 => format!("({})", value),
            Some(value) => value.to_string(),
            None => word.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn split_sides(equation: &str) -> Option<(&str, &str)> {
    let mut parts = equation.split(glyphs::EQUALS);
    let left = parts.next()?.trim();
    let right = parts.next()?.trim();
    if parts.next().is_some() {
        return None;
    }
    Some((left, right))
}

/// `x = 9` or `9 = x`
fn direct_binding(equation: &str) -> Option<(String, f64)> {
    let (left, right) = split_sides(equation)?;
    let is_integer = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());

    if is_variable_name(left) && is_integer(right) {
        Some((left.to_string(), right.parse().ok()?))
    } else if is_variable_name(right) && is_integer(left) {
        Some((right.to_string(), left.parse().ok()?))
    } else {
        None
    }
}

/// Solve one equation for its single lone unknown after substitution
fn isolate(equation: &str, values: &BTreeMap<String, f64>) -> Option<(String, f64)> {
    let (left, right) = split_sides(equation)?;
    let left_terms = split_terms(&substitute(left, values));
    let right_terms = split_terms(&substitute(right, values));

    let mut unknown: Option<(String, bool, bool)> = None;
    let mut sum = 0.0;

    let sides = [(&left_terms, false), (&right_terms, true)];
    for (terms, on_right) in sides {
        for term in terms.iter() {
            if let Some(name) = term.lone_variable() {
                if unknown.is_some() {
                    return None;
                }
                unknown = Some((name.to_string(), on_right, term.negative));
                continue;
            }

            let expr = evaluator::parse(&term.text()).ok()?;
            if !expr.variables().is_empty() {
                return None;
            }
            let value = term.sign() * expr.eval(&Scope::new()).ok()?;
            if on_right {
                sum -= value;
            } else {
                sum += value;
            }
        }
    }

    let (name, on_right, negative) = unknown?;
    let value = if on_right { sum } else { -sum };
    Some((name, if negative { -value } else { value }))
}

/// Solve a system by direct bindings, then repeated substitution
pub fn solve_system<S: AsRef<str>>(equations: &[S]) -> SystemSolution {
    let mut values = BTreeMap::new();

    for equation in equations {
        if let Some((name, value)) = direct_binding(equation.as_ref()) {
            tracing::debug!("Bound {} = {}", name, value);
            values.insert(name, value);
        }
    }

    loop {
        let mut progress = false;
        for equation in equations {
            if let Some((name, value)) = isolate(equation.as_ref(), &values) {
                if !values.contains_key(&name) {
                    tracing::debug!("Solved {} = {} from {}", name, value, equation.as_ref());
                    values.insert(name, value);
                    progress = true;
                }
            }
        }
        if !progress {
            break;
        }
    }

    SystemSolution { values }
}
