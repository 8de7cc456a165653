//! Expression Builder
//!
//! Renders an ordered token sequence into the normalized textual expression
//! shown to the user, collecting unit annotations and variable names on the
//! way.

use crate::lexer;
use canvas_model::{glyphs, PlacedToken, Symbol, SymbolKind, UnitCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A unit seen while building an expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitAnnotation {
    pub unit: String,
    pub category: Option<UnitCategory>,
    pub conversion_base: f64,
    pub offset: f64,
    /// Byte offset in the expression text where the unit starts
    pub position: usize,
}

/// Output of [`build`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BuiltExpression {
    pub text: String,
    pub units: Vec<UnitAnnotation>,
    pub variables: BTreeSet<String>,
}

impl BuiltExpression {
    /// Whether the expression is an equation candidate
    pub fn is_equation(&self) -> bool {
        self.text.contains(glyphs::EQUALS)
    }
}

/// Text a symbol contributes to an expression
pub fn render(symbol: &Symbol) -> &str {
    match &symbol.kind {
        SymbolKind::Constant if symbol.text == glyphs::PI => "pi",
        SymbolKind::Operator if symbol.text == glyphs::TIMES => "*",
        SymbolKind::Operator if symbol.text == glyphs::DIVIDE => "/",
        SymbolKind::Function if symbol.text == glyphs::RADICAL => "sqrt",
        SymbolKind::Number
        | SymbolKind::Variable
        | SymbolKind::Operator
        | SymbolKind::Function
        | SymbolKind::Grouping
        | SymbolKind::Constant
        | SymbolKind::Unit(_)
        | SymbolKind::Conversion(_) => &symbol.text,
    }
}

/// Build the expression for an ordered token sequence
pub fn build(tokens: &[&PlacedToken]) -> BuiltExpression {
    let mut text = String::new();
    let mut units = Vec::new();
    let mut variables = BTreeSet::new();

    for (i, token) in tokens.iter().enumerate() {
        let symbol = &token.symbol;
        match &symbol.kind {
            SymbolKind::Unit(spec) => units.push(UnitAnnotation {
                unit: symbol.text.clone(),
                category: spec.category,
                conversion_base: spec.conversion_base,
                offset: spec.offset,
                position: text.len(),
            }),
            SymbolKind::Variable => {
                variables.insert(symbol.text.clone());
            }
            _ => {}
        }

        text.push_str(render(symbol));
        if i + 1 < tokens.len() {
            text.push(' ');
        }
    }

    BuiltExpression {
        text: text.trim().to_string(),
        units,
        variables,
    }
}

/// Evaluator-ready form of a token sequence.
///
/// Same rendering as [`build`], except that adjacent number tokens are joined
/// into one literal (`1 2 . 5` becomes `12.5`).
pub fn evaluation_text(tokens: &[&PlacedToken]) -> String {
    lexer::join(&lexer::lex(tokens))
}
