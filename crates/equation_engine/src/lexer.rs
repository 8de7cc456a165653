//! Lexer over the canonical token stream
//!
//! Groups runs of digit tokens into single numeric lexemes while keeping the
//! range of tokens each lexeme covers. Classification, unit extraction and
//! simplification all read lexemes instead of re-parsing rendered text.

use crate::builder::render;
use canvas_model::{glyphs, ConversionFactor, PlacedToken, SymbolKind, UnitSpec};
use std::ops::Range;

/// Operators that separate additive terms
pub const ADDITIVE_OPS: &[&str] = &[glyphs::PLUS, glyphs::MINUS, glyphs::MINUS_SIGN];
/// Subtraction operators
pub const SUBTRACT_OPS: &[&str] = &[glyphs::MINUS, glyphs::MINUS_SIGN];
/// Multiplication as rendered
pub const MULTIPLY_OPS: &[&str] = &["*"];
/// Division as rendered
pub const DIVIDE_OPS: &[&str] = &["/"];

/// Kind of a lexeme
#[derive(Debug, Clone, PartialEq)]
pub enum LexemeKind {
    /// One or more adjacent number tokens
    Number,
    Variable,
    Operator,
    Function,
    Grouping,
    Constant,
    Unit(UnitSpec),
    /// A conversion block such as `5280 ft / 1 mi`
    Conversion(ConversionFactor),
}

/// A lexical unit of a container's token sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub kind: LexemeKind,
    /// Rendered text; number runs are concatenated without spaces
    pub text: String,
    /// Indices of the tokens this lexeme covers
    pub span: Range<usize>,
}

impl Lexeme {
    pub fn is_number(&self) -> bool {
        self.kind == LexemeKind::Number
    }

    pub fn is_variable(&self) -> bool {
        self.kind == LexemeKind::Variable
    }

    pub fn is_unit(&self) -> bool {
        matches!(self.kind, LexemeKind::Unit(_))
    }

    /// Numeric value of a number lexeme; `None` for malformed runs like `1.2.3`
    pub fn number(&self) -> Option<f64> {
        if self.is_number() {
            self.text.parse().ok()
        } else {
            None
        }
    }

    /// Whether this is an operator rendered as one of `texts`
    pub fn is_op(&self, texts: &[&str]) -> bool {
        self.kind == LexemeKind::Operator && texts.contains(&self.text.as_str())
    }

    pub fn is_equals(&self) -> bool {
        self.is_op(&[glyphs::EQUALS])
    }

    pub fn is_grouping(&self, text: &str) -> bool {
        self.kind == LexemeKind::Grouping && self.text == text
    }

    /// Text handed to the evaluator; a conversion block becomes `(factor / 1)`
    pub fn evaluation_text(&self) -> String {
        match &self.kind {
            LexemeKind::Conversion(block) => format!("({} / 1)", block.factor),
            _ => self.text.clone(),
        }
    }
}

/// Lex an ordered token sequence
pub fn lex(tokens: &[&PlacedToken]) -> Vec<Lexeme> {
    let mut lexemes: Vec<Lexeme> = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        let symbol = &token.symbol;
        if symbol.is_number() {
            if let Some(last) = lexemes.last_mut() {
                if last.is_number() && last.span.end == i {
                    last.text.push_str(&symbol.text);
                    last.span.end = i + 1;
                    continue;
                }
            }
        }

        let kind = match &symbol.kind {
            SymbolKind::Number => LexemeKind::Number,
            SymbolKind::Variable => LexemeKind::Variable,
            SymbolKind::Operator => LexemeKind::Operator,
            SymbolKind::Function => LexemeKind::Function,
            SymbolKind::Grouping => LexemeKind::Grouping,
            SymbolKind::Constant => LexemeKind::Constant,
            SymbolKind::Unit(spec) => LexemeKind::Unit(spec.clone()),
            SymbolKind::Conversion(factor) => LexemeKind::Conversion(factor.clone()),
        };
        lexemes.push(Lexeme {
            kind,
            text: render(symbol).to_string(),
            span: i..i + 1,
        });
    }

    lexemes
}

/// Join lexeme texts with single spaces
pub fn join(lexemes: &[Lexeme]) -> String {
    lexemes
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Join lexemes for evaluation, expanding conversion blocks to their factors
pub fn join_for_evaluation(lexemes: &[Lexeme]) -> String {
    lexemes
        .iter()
        .map(Lexeme::evaluation_text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split at the first `=` into left and right sides
pub fn split_at_equals(lexemes: &[Lexeme]) -> Option<(&[Lexeme], &[Lexeme])> {
    let index = lexemes.iter().position(Lexeme::is_equals)?;
    Some((&lexemes[..index], &lexemes[index + 1..]))
}

/// Token range covered by a run of lexemes
pub fn token_range(lexemes: &[Lexeme]) -> Range<usize> {
    match (lexemes.first(), lexemes.last()) {
        (Some(first), Some(last)) => first.span.start..last.span.end,
        _ => 0..0,
    }
}
