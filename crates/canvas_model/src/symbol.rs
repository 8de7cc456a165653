//! Symbol templates
//!
//! A [`Symbol`] is the immutable template a user picks from the palette: a
//! digit, an operator, a function name, a unit, and so on. Placing a symbol
//! on the workspace instantiates it as a [`crate::PlacedToken`].

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Glyphs
// =============================================================================

/// Display glyphs with special meaning to the engine
pub mod glyphs {
    pub const EQUALS: &str = "=";
    pub const PLUS: &str = "+";
    pub const MINUS: &str = "-";
    /// Unicode minus sign, accepted wherever `-` is
    pub const MINUS_SIGN: &str = "\u{2212}";
    pub const TIMES: &str = "\u{00D7}";
    pub const DIVIDE: &str = "\u{00F7}";
    pub const POWER: &str = "^";
    pub const PERCENT: &str = "%";
    pub const OF: &str = "of";
    pub const PI: &str = "\u{03C0}";
    pub const RADICAL: &str = "\u{221A}";
    pub const OPEN_PAREN: &str = "(";
    pub const CLOSE_PAREN: &str = ")";
    pub const DECIMAL_POINT: &str = ".";
}

// =============================================================================
// Units
// =============================================================================

/// Dimension of measurement within which units are mutually convertible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitCategory {
    Length,
    Mass,
    Volume,
    Temperature,
    Time,
}

impl UnitCategory {
    /// All categories in palette order
    pub fn all() -> [UnitCategory; 5] {
        [
            UnitCategory::Length,
            UnitCategory::Mass,
            UnitCategory::Volume,
            UnitCategory::Temperature,
            UnitCategory::Time,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitCategory::Length => "length",
            UnitCategory::Mass => "mass",
            UnitCategory::Volume => "volume",
            UnitCategory::Temperature => "temperature",
            UnitCategory::Time => "time",
        }
    }
}

impl fmt::Display for UnitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversion data carried by a unit symbol.
///
/// A value `v` in this unit equals `(v + offset) * conversion_base` in the
/// category's base unit. The offset is zero for everything but temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub category: Option<UnitCategory>,
    pub conversion_base: f64,
    #[serde(default)]
    pub offset: f64,
}

impl UnitSpec {
    /// A purely multiplicative unit
    pub fn new(category: UnitCategory, conversion_base: f64) -> Self {
        Self {
            category: Some(category),
            conversion_base,
            offset: 0.0,
        }
    }

    /// Set the additive offset (affine scales such as temperature)
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Convert a value in this unit to the category's base unit
    pub fn to_base(&self, value: f64) -> f64 {
        (value + self.offset) * self.conversion_base
    }

    /// Convert a value in the category's base unit to this unit
    pub fn from_base(&self, value: f64) -> f64 {
        value / self.conversion_base - self.offset
    }
}

/// A pre-built conversion block such as `5280 ft / 1 mi`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionFactor {
    pub from_unit: String,
    pub to_unit: String,
    pub factor: f64,
}

// =============================================================================
// Symbol
// =============================================================================

/// The kind of a symbol, with the data only some kinds carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SymbolKind {
    Number,
    Variable,
    Operator,
    Function,
    Grouping,
    Constant,
    Unit(UnitSpec),
    Conversion(ConversionFactor),
}

impl SymbolKind {
    pub fn name(&self) -> &'static str {
        match self {
            SymbolKind::Number => "number",
            SymbolKind::Variable => "variable",
            SymbolKind::Operator => "operator",
            SymbolKind::Function => "function",
            SymbolKind::Grouping => "grouping",
            SymbolKind::Constant => "constant",
            SymbolKind::Unit(_) => "unit",
            SymbolKind::Conversion(_) => "conversion",
        }
    }
}

/// An immutable token template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Palette identifier (e.g. "plus", "kilometer")
    pub id: String,
    /// Text shown on the token
    pub text: String,
    #[serde(flatten)]
    pub kind: SymbolKind,
}

impl Symbol {
    /// Create a symbol with an explicit palette id
    pub fn new(id: impl Into<String>, text: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind,
        }
    }

    fn keyed(text: &str, kind: SymbolKind) -> Self {
        Self::new(text, text, kind)
    }

    pub fn number(text: &str) -> Self {
        Self::keyed(text, SymbolKind::Number)
    }

    pub fn variable(text: &str) -> Self {
        Self::keyed(text, SymbolKind::Variable)
    }

    pub fn operator(text: &str) -> Self {
        Self::keyed(text, SymbolKind::Operator)
    }

    pub fn function(text: &str) -> Self {
        Self::keyed(text, SymbolKind::Function)
    }

    pub fn grouping(text: &str) -> Self {
        Self::keyed(text, SymbolKind::Grouping)
    }

    pub fn constant(text: &str) -> Self {
        Self::keyed(text, SymbolKind::Constant)
    }

    pub fn unit(text: &str, spec: UnitSpec) -> Self {
        Self::keyed(text, SymbolKind::Unit(spec))
    }

    /// The `=` operator
    pub fn equals() -> Self {
        Self::operator(glyphs::EQUALS)
    }

    pub fn is_number(&self) -> bool {
        matches!(self.kind, SymbolKind::Number)
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.kind, SymbolKind::Variable)
    }

    pub fn is_operator(&self) -> bool {
        matches!(self.kind, SymbolKind::Operator)
    }

    /// Whether this is an operator whose text is one of `texts`
    pub fn is_operator_in(&self, texts: &[&str]) -> bool {
        self.is_operator() && texts.contains(&self.text.as_str())
    }

    pub fn is_equals(&self) -> bool {
        self.is_operator_in(&[glyphs::EQUALS])
    }

    /// Unit data, if this is a unit symbol
    pub fn unit_spec(&self) -> Option<&UnitSpec> {
        match &self.kind {
            SymbolKind::Unit(spec) => Some(spec),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_spec_affine_conversion() {
        let fahrenheit = UnitSpec::new(UnitCategory::Temperature, 5.0 / 9.0).with_offset(-32.0);
        assert!((fahrenheit.to_base(212.0) - 100.0).abs() < 1e-9);
        assert!((fahrenheit.from_base(0.0) - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_operator_predicates() {
        let times = Symbol::operator(glyphs::TIMES);
        assert!(times.is_operator_in(&[glyphs::TIMES, "*"]));
        assert!(!times.is_equals());
        assert!(Symbol::equals().is_equals());
        assert!(!Symbol::variable("=").is_equals());
    }

    #[test]
    fn test_symbol_serde_shape() {
        let km = Symbol::new(
            "kilometer",
            "km",
            SymbolKind::Unit(UnitSpec::new(UnitCategory::Length, 1000.0)),
        );
        let json = serde_json::to_value(&km).unwrap();
        assert_eq!(json["kind"], "unit");
        assert_eq!(json["category"], "length");
        assert_eq!(json["conversion_base"], 1000.0);

        let back: Symbol = serde_json::from_value(json).unwrap();
        assert_eq!(back, km);
    }

    #[test]
    fn test_plain_symbol_deserializes_without_payload() {
        let sym: Symbol =
            serde_json::from_str(r#"{"id":"plus","text":"+","kind":"operator"}"#).unwrap();
        assert!(sym.is_operator());
        assert_eq!(sym.kind.name(), "operator");
    }
}
