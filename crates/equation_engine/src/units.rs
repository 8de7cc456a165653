//! Unit conversion and unit stripping
//!
//! Reads conversion requests off the lexeme stream and converts through the
//! base unit of a category: `base = (n + offset) * conversion_base`.

use crate::error::{EngineError, EngineResult};
use crate::format::format_value;
use crate::lexer::{self, Lexeme, LexemeKind};
use canvas_model::{UnitCategory, UnitTable};

/// `<amount> <from> = <to>` read from a container
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub amount: f64,
    /// Amount as written, echoed back in the result
    pub amount_text: String,
    pub from_unit: String,
    pub to_unit: String,
}

impl ConversionRequest {
    /// Match the conversion shape.
    ///
    /// The left side needs a number run and a unit; the right side is either a
    /// bare unit or a number run followed by a unit.
    pub fn from_lexemes(lexemes: &[Lexeme]) -> Option<Self> {
        let (left, right) = lexer::split_at_equals(lexemes)?;

        let number = left.iter().find(|l| l.is_number())?;
        let from = left.iter().find(|l| l.is_unit())?;
        let to = match right {
            [unit] if unit.is_unit() => unit,
            [number, unit] if number.is_number() && unit.is_unit() => unit,
            _ => return None,
        };

        Some(Self {
            amount: number.number()?,
            amount_text: number.text.clone(),
            from_unit: from.text.clone(),
            to_unit: to.text.clone(),
        })
    }

    /// Convert and render `"<n> <from> = <result> <to>"`
    pub fn convert(&self, table: &UnitTable, precision: u32) -> EngineResult<String> {
        let mismatch = || EngineError::UnitCategoryMismatch {
            from: self.from_unit.clone(),
            to: self.to_unit.clone(),
        };

        let from = table.get(&self.from_unit).ok_or_else(mismatch)?;
        let to = table.get(&self.to_unit).ok_or_else(mismatch)?;
        match (from.category, to.category) {
            (Some(a), Some(b)) if a == b => {}
            _ => return Err(mismatch()),
        }

        let result = to.from_base(from.to_base(self.amount));
        tracing::debug!(
            "Converted {} {} to {} {}",
            self.amount,
            self.from_unit,
            result,
            self.to_unit
        );

        Ok(format!(
            "{} {} = {} {}",
            self.amount_text,
            self.from_unit,
            format_value(result, precision),
            self.to_unit
        ))
    }
}

/// Drop unit lexemes that directly follow a number run
pub fn strip_units(lexemes: &[Lexeme]) -> Vec<Lexeme> {
    lexemes
        .iter()
        .enumerate()
        .filter(|(i, lexeme)| !(lexeme.is_unit() && *i > 0 && lexemes[i - 1].is_number()))
        .map(|(_, lexeme)| lexeme.clone())
        .collect()
}

/// First length unit, by first appearance, that occurs an odd number of times.
///
/// Units inside a conversion block count too, so `3 mi * (5280 ft / 1 mi)`
/// leaves `ft` behind.
pub fn residual_length_unit<'a>(lexemes: &'a [Lexeme], table: &UnitTable) -> Option<&'a str> {
    let is_length = |unit: &str| {
        table
            .get(unit)
            .is_some_and(|spec| spec.category == Some(UnitCategory::Length))
    };

    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut count = |unit: &'a str| match counts.iter_mut().find(|(u, _)| *u == unit) {
        Some((_, n)) => *n += 1,
        None => counts.push((unit, 1)),
    };
    for lexeme in lexemes {
        match &lexeme.kind {
            LexemeKind::Unit(spec) if spec.category == Some(UnitCategory::Length) => {
                count(lexeme.text.as_str());
            }
            LexemeKind::Conversion(block) => {
                for unit in [block.to_unit.as_str(), block.from_unit.as_str()] {
                    if is_length(unit) {
                        count(unit);
                    }
                }
            }
            _ => {}
        }
    }

    counts
        .into_iter()
        .find(|(_, n)| n % 2 == 1)
        .map(|(unit, _)| unit)
}
