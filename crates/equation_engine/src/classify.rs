//! Pattern Classifier
//!
//! Decides, per container, which solving path applies, and for the
//! whole workspace whether to solve a single equation or a system.

use crate::builder::{self, BuiltExpression};
use crate::lexer::{self, Lexeme};
use crate::resolve::ResolvedLayout;
use crate::units::ConversionRequest;
use canvas_model::{glyphs, ContainerId};
use std::collections::BTreeSet;

/// `<p> % of <v>`
#[derive(Debug, Clone, PartialEq)]
pub struct PercentagePattern {
    pub percent: f64,
    pub percent_text: String,
    pub value: f64,
    pub value_text: String,
    /// Whether the container also holds an `=`
    pub has_equals: bool,
}

impl PercentagePattern {
    /// Find the first `%` and match `number % of number` around it
    pub fn from_lexemes(lexemes: &[Lexeme]) -> Option<Self> {
        let k = lexemes.iter().position(|l| l.is_op(&[glyphs::PERCENT]))?;
        if k == 0 {
            return None;
        }
        let percent = &lexemes[k - 1];
        let of = lexemes.get(k + 1)?;
        let value = lexemes.get(k + 2)?;
        if !of.is_op(&[glyphs::OF]) {
            return None;
        }

        Some(Self {
            percent: percent.number()?,
            percent_text: percent.text.clone(),
            value: value.number()?,
            value_text: value.text.clone(),
            has_equals: lexemes.iter().any(Lexeme::is_equals),
        })
    }

    /// Arithmetic form, `(p / 100) * v`
    pub fn expression(&self) -> String {
        format!("({} / 100) * {}", self.percent_text, self.value_text)
    }

    pub fn result(&self) -> f64 {
        (self.percent / 100.0) * self.value
    }
}

/// Solving path chosen for one container
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Percentage(PercentagePattern),
    UnitConversion(ConversionRequest),
    Equation,
    /// Expression without `=`; context only
    Expression,
}

/// Everything derived from one container's tokens
#[derive(Debug, Clone)]
pub struct ContainerAnalysis {
    pub container_id: ContainerId,
    pub built: BuiltExpression,
    pub lexemes: Vec<Lexeme>,
    pub classification: Classification,
}

impl ContainerAnalysis {
    /// Text the container contributes as an equation, if it is one
    pub fn equation_text(&self) -> Option<String> {
        match &self.classification {
            Classification::Percentage(p) if p.has_equals => {
                Some(format!("{} {}", p.expression(), glyphs::EQUALS))
            }
            Classification::Percentage(_) | Classification::Expression => None,
            Classification::UnitConversion(_) | Classification::Equation => {
                Some(lexer::join(&self.lexemes))
            }
        }
    }

    pub fn is_equation(&self) -> bool {
        self.equation_text().is_some()
    }
}

/// Classify one container's ordered tokens
pub fn analyze(container_id: ContainerId, tokens: &[&canvas_model::PlacedToken]) -> ContainerAnalysis {
    let built = builder::build(tokens);
    let lexemes = lexer::lex(tokens);
    let classification = classify(&built, &lexemes);
    ContainerAnalysis {
        container_id,
        built,
        lexemes,
        classification,
    }
}

fn classify(built: &BuiltExpression, lexemes: &[Lexeme]) -> Classification {
    if let Some(pattern) = PercentagePattern::from_lexemes(lexemes) {
        return Classification::Percentage(pattern);
    }

    let typed_units = built.units.len() >= 2 && built.units.iter().all(|u| u.category.is_some());
    if typed_units {
        if let Some(request) = ConversionRequest::from_lexemes(lexemes) {
            return Classification::UnitConversion(request);
        }
    }

    if built.is_equation() {
        Classification::Equation
    } else {
        Classification::Expression
    }
}

/// What the workspace as a whole should solve
#[derive(Debug, Clone)]
pub enum WorkspacePlan<'a> {
    NoEquation,
    Single(&'a ContainerAnalysis),
    System {
        equations: Vec<&'a ContainerAnalysis>,
        variables: BTreeSet<String>,
    },
}

/// Analyze every non-empty equation container of a resolved layout.
///
/// Operation containers hold pending transformations and are skipped.
pub fn analyze_layout(layout: &ResolvedLayout<'_>) -> Vec<ContainerAnalysis> {
    layout
        .iter()
        .filter(|(container, tokens)| !container.is_operation() && !tokens.is_empty())
        .map(|(container, tokens)| analyze(container.id, tokens))
        .collect()
}

/// Pick the workspace plan from per-container analyses
pub fn plan(analyses: &[ContainerAnalysis]) -> WorkspacePlan<'_> {
    let equations: Vec<&ContainerAnalysis> = analyses.iter().filter(|a| a.is_equation()).collect();
    let variables: BTreeSet<String> = analyses
        .iter()
        .flat_map(|a| a.built.variables.iter().cloned())
        .collect();

    tracing::debug!(
        "Found {} equation(s), variables: {:?}",
        equations.len(),
        variables
    );

    match equations.first() {
        None => WorkspacePlan::NoEquation,
        Some(_) if equations.len() >= 2 && !variables.is_empty() => WorkspacePlan::System {
            equations,
            variables,
        },
        Some(&first) => WorkspacePlan::Single(first),
    }
}
