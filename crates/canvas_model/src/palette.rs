//! Symbol palettes, the unit table and equation templates
//!
//! This module provides the built-in symbols offered to the user: math
//! symbols, units grouped by category, pre-built conversion blocks, and
//! common equations that can be dropped into a container in one step.

use crate::symbol::{glyphs, ConversionFactor, Symbol, SymbolKind, UnitCategory, UnitSpec};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

// =============================================================================
// Palette Categories
// =============================================================================

/// Tabs of the symbol palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteCategory {
    /// Digits, operators, functions, constants and grouping
    Math,
    /// Units of one category
    Units(UnitCategory),
    /// Pre-built conversion factor blocks
    Conversions,
    /// Common equation templates
    Equations,
}

/// Get all palette categories in display order
pub fn all_palette_categories() -> Vec<PaletteCategory> {
    let mut categories = vec![PaletteCategory::Math];
    categories.extend(UnitCategory::all().into_iter().map(PaletteCategory::Units));
    categories.push(PaletteCategory::Conversions);
    categories.push(PaletteCategory::Equations);
    categories
}

/// Get the symbols shown under a palette tab.
///
/// The equations tab holds templates rather than symbols; see
/// [`builtin_templates`].
pub fn symbols_for_category(category: PaletteCategory) -> Vec<Symbol> {
    match category {
        PaletteCategory::Math => math_symbols(),
        PaletteCategory::Units(unit_category) => unit_symbols()
            .into_iter()
            .filter(|s| s.unit_spec().and_then(|u| u.category) == Some(unit_category))
            .collect(),
        PaletteCategory::Conversions => conversion_blocks(),
        PaletteCategory::Equations => Vec::new(),
    }
}

// =============================================================================
// Math Symbols
// =============================================================================

/// Digits, operators, functions, constants and grouping symbols
pub fn math_symbols() -> Vec<Symbol> {
    let mut symbols = vec![
        Symbol::variable("x"),
        Symbol::variable("y"),
        Symbol::new("plus", glyphs::PLUS, SymbolKind::Operator),
        Symbol::new("minus", glyphs::MINUS, SymbolKind::Operator),
        Symbol::new("multiply", glyphs::TIMES, SymbolKind::Operator),
        Symbol::new("divide", glyphs::DIVIDE, SymbolKind::Operator),
        Symbol::new("power", glyphs::POWER, SymbolKind::Operator),
        Symbol::new("equals", glyphs::EQUALS, SymbolKind::Operator),
        Symbol::new("of", glyphs::OF, SymbolKind::Operator),
        Symbol::new("percent", glyphs::PERCENT, SymbolKind::Operator),
        Symbol::new("pi", glyphs::PI, SymbolKind::Constant),
        Symbol::new("e", "e", SymbolKind::Constant),
    ];
    symbols.extend(["1", "2", "3", "4", "5", "6", "7", "8", "9", "0"].map(Symbol::number));
    symbols.extend([
        Symbol::new("sqrt", glyphs::RADICAL, SymbolKind::Function),
        Symbol::function("sin"),
        Symbol::function("cos"),
        Symbol::function("tan"),
        Symbol::new("open_paren", glyphs::OPEN_PAREN, SymbolKind::Grouping),
        Symbol::new("close_paren", glyphs::CLOSE_PAREN, SymbolKind::Grouping),
        Symbol::new("dot", glyphs::DECIMAL_POINT, SymbolKind::Number),
    ]);
    symbols
}

/// Find a math symbol by its displayed text
pub fn math_symbol(text: &str) -> Option<Symbol> {
    math_symbols().into_iter().find(|s| s.text == text)
}

// =============================================================================
// Units
// =============================================================================

fn unit(id: &str, text: &str, spec: UnitSpec) -> Symbol {
    Symbol::new(id, text, SymbolKind::Unit(spec))
}

/// All built-in unit symbols
pub fn unit_symbols() -> Vec<Symbol> {
    use UnitCategory::*;
    vec![
        // Length (base: meter)
        unit("meter", "m", UnitSpec::new(Length, 1.0)),
        unit("kilometer", "km", UnitSpec::new(Length, 1000.0)),
        unit("centimeter", "cm", UnitSpec::new(Length, 0.01)),
        unit("millimeter", "mm", UnitSpec::new(Length, 0.001)),
        unit("foot", "ft", UnitSpec::new(Length, 0.3048)),
        unit("inch", "in", UnitSpec::new(Length, 0.0254)),
        unit("yard", "yd", UnitSpec::new(Length, 0.9144)),
        unit("mile", "mi", UnitSpec::new(Length, 1609.34)),
        // Mass (base: gram)
        unit("gram", "g", UnitSpec::new(Mass, 1.0)),
        unit("kilogram", "kg", UnitSpec::new(Mass, 1000.0)),
        unit("milligram", "mg", UnitSpec::new(Mass, 0.001)),
        unit("pound", "lb", UnitSpec::new(Mass, 453.592)),
        unit("ounce", "oz", UnitSpec::new(Mass, 28.3495)),
        unit("ton", "ton", UnitSpec::new(Mass, 907185.0)),
        // Volume (base: liter)
        unit("liter", "L", UnitSpec::new(Volume, 1.0)),
        unit("milliliter", "mL", UnitSpec::new(Volume, 0.001)),
        unit("gallon", "gal", UnitSpec::new(Volume, 3.78541)),
        unit("quart", "qt", UnitSpec::new(Volume, 0.946353)),
        unit("pint", "pt", UnitSpec::new(Volume, 0.473176)),
        unit("cup", "cup", UnitSpec::new(Volume, 0.24)),
        unit("fluidounce", "fl oz", UnitSpec::new(Volume, 0.0295735)),
        // Temperature (base: celsius)
        unit("celsius", "\u{00B0}C", UnitSpec::new(Temperature, 1.0)),
        unit(
            "fahrenheit",
            "\u{00B0}F",
            UnitSpec::new(Temperature, 5.0 / 9.0).with_offset(-32.0),
        ),
        unit("kelvin", "K", UnitSpec::new(Temperature, 1.0).with_offset(-273.15)),
        // Time (base: second)
        unit("second", "s", UnitSpec::new(Time, 1.0)),
        unit("minute", "min", UnitSpec::new(Time, 60.0)),
        unit("hour", "hr", UnitSpec::new(Time, 3600.0)),
        unit("day", "day", UnitSpec::new(Time, 86400.0)),
        unit("week", "wk", UnitSpec::new(Time, 604800.0)),
    ]
}

/// Unit definitions keyed by display text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitTable {
    units: Vec<(String, UnitSpec)>,
}

impl UnitTable {
    /// Build a table from unit symbols; non-unit symbols are skipped
    pub fn from_symbols(symbols: &[Symbol]) -> Self {
        let units = symbols
            .iter()
            .filter_map(|s| s.unit_spec().map(|spec| (s.text.clone(), spec.clone())))
            .collect();
        Self { units }
    }

    /// The shared table of built-in units
    pub fn builtin() -> &'static UnitTable {
        static TABLE: OnceLock<UnitTable> = OnceLock::new();
        TABLE.get_or_init(|| UnitTable::from_symbols(&unit_symbols()))
    }

    /// Look up a unit by its display text
    pub fn get(&self, text: &str) -> Option<&UnitSpec> {
        self.units
            .iter()
            .find(|(unit_text, _)| unit_text == text)
            .map(|(_, spec)| spec)
    }

    /// All unit texts of one category, in table order
    pub fn units_in(&self, category: UnitCategory) -> Vec<&str> {
        self.units
            .iter()
            .filter(|(_, spec)| spec.category == Some(category))
            .map(|(text, _)| text.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl Default for UnitTable {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

// =============================================================================
// Conversion Blocks
// =============================================================================

fn conversion(from_unit: &str, to_unit: &str, factor: f64, text: &str) -> Symbol {
    Symbol::new(
        format!("{}-{}", from_unit, to_unit),
        text,
        SymbolKind::Conversion(ConversionFactor {
            from_unit: from_unit.to_string(),
            to_unit: to_unit.to_string(),
            factor,
        }),
    )
}

/// Pre-defined conversion factors offered as blocks
pub fn conversion_blocks() -> Vec<Symbol> {
    vec![
        conversion("mi", "ft", 5280.0, "5280 ft / 1 mi"),
        conversion("ft", "in", 12.0, "12 in / 1 ft"),
        conversion("yd", "ft", 3.0, "3 ft / 1 yd"),
        conversion("mi", "km", 1.60934, "1.60934 km / 1 mi"),
        conversion("m", "cm", 100.0, "100 cm / 1 m"),
        conversion("kg", "lb", 2.20462, "2.20462 lb / 1 kg"),
        conversion("lb", "oz", 16.0, "16 oz / 1 lb"),
        conversion("gal", "L", 3.78541, "3.78541 L / 1 gal"),
        conversion("L", "mL", 1000.0, "1000 mL / 1 L"),
        conversion("hr", "min", 60.0, "60 min / 1 hr"),
        conversion("min", "s", 60.0, "60 s / 1 min"),
    ]
}

// =============================================================================
// Equation Templates
// =============================================================================

/// Function names templates may use beyond the math palette
const TEMPLATE_FUNCTIONS: &[&str] = &["ln", "abs", "log", "exp"];

/// A common equation that can be inserted in one step
#[derive(Debug, Clone)]
pub struct EquationTemplate {
    /// Unique identifier
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Space separated symbol texts, read left to right
    pub notation: &'static str,
}

impl EquationTemplate {
    /// Create the symbol sequence for this template
    pub fn symbols(&self) -> Vec<Symbol> {
        self.notation.split_whitespace().map(template_symbol).collect()
    }
}

fn template_symbol(text: &str) -> Symbol {
    if let Some(symbol) = math_symbol(text) {
        return symbol;
    }
    if TEMPLATE_FUNCTIONS.contains(&text) {
        Symbol::function(text)
    } else if text.chars().all(|c| c.is_ascii_digit() || c == '.') {
        Symbol::number(text)
    } else {
        Symbol::variable(text)
    }
}

/// Built-in equation templates
pub fn builtin_templates() -> Vec<EquationTemplate> {
    vec![
        EquationTemplate {
            id: "natural_exp",
            name: "Natural Exponential (y = e^x)",
            notation: "y = e ^ x",
        },
        EquationTemplate {
            id: "exp_decay",
            name: "Exponential Decay (y = e^-x)",
            notation: "y = e ^ ( - x )",
        },
        EquationTemplate {
            id: "tan",
            name: "Tangent (y = tan(x))",
            notation: "y = tan ( x )",
        },
        EquationTemplate {
            id: "ln",
            name: "Natural Log (y = ln(x))",
            notation: "y = ln ( x )",
        },
        EquationTemplate {
            id: "abs",
            name: "Absolute Value (y = |x|)",
            notation: "y = abs ( x )",
        },
        EquationTemplate {
            id: "linear",
            name: "Linear (y = x)",
            notation: "y = x",
        },
        EquationTemplate {
            id: "quadratic",
            name: "Quadratic (y = x\u{00B2})",
            notation: "y = x ^ 2",
        },
        EquationTemplate {
            id: "cubic",
            name: "Cubic (y = x\u{00B3})",
            notation: "y = x ^ 3",
        },
        EquationTemplate {
            id: "sine",
            name: "Sine (y = sin(x))",
            notation: "y = sin ( x )",
        },
        EquationTemplate {
            id: "cosine",
            name: "Cosine (y = cos(x))",
            notation: "y = cos ( x )",
        },
        EquationTemplate {
            id: "exponential",
            name: "Exponential (y = 2^x)",
            notation: "y = 2 ^ x",
        },
        EquationTemplate {
            id: "root",
            name: "Square Root (y = \u{221A}x)",
            notation: "y = \u{221A} x",
        },
        EquationTemplate {
            id: "inverse",
            name: "Inverse (y = 1/x)",
            notation: "y = 1 \u{00F7} x",
        },
    ]
}

/// Find a template by id
pub fn template(id: &str) -> Option<&'static EquationTemplate> {
    static TEMPLATES: OnceLock<Vec<EquationTemplate>> = OnceLock::new();
    TEMPLATES.get_or_init(builtin_templates).iter().find(|t| t.id == id)
}
