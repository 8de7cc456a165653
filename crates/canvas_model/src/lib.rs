//! Canvas Model - data model for the symbolic equation workspace
//!
//! This crate holds everything the presentation layer produces and the
//! equation engine consumes:
//! - Symbol templates, including units with their conversion data
//! - Tokens placed on the canvas and the containers grouping them
//! - The [`Workspace`] owning both, with placement and container operations
//! - Built-in palettes, the unit table and equation templates

pub mod error;
pub mod ids;
pub mod palette;
pub mod symbol;
pub mod token;
pub mod workspace;

pub use error::*;
pub use ids::{ContainerId, TokenId};
pub use palette::{
    all_palette_categories, builtin_templates, conversion_blocks, math_symbol, math_symbols,
    symbols_for_category, template, unit_symbols, EquationTemplate, PaletteCategory, UnitTable,
};
pub use symbol::{glyphs, ConversionFactor, Symbol, SymbolKind, UnitCategory, UnitSpec};
pub use token::{Container, ContainerKind, PlacedToken};
pub use workspace::{Workspace, TOKEN_SPACING, TOKEN_START_OFFSET};
