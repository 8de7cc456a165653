//! Equation Engine - inference and solving for the equation workspace
//!
//! Turns spatially placed tokens into equations and answers:
//! - Layout resolution: tokens grouped per container in reading order
//! - Expression building and lexing of the token stream
//! - Classification into percentages, unit conversions and equations
//! - Evaluation, single-variable root search and substitution for systems
//! - Algebraic rewriting: both-sides operations and step-wise simplification
//! - Persistent engine settings

pub mod builder;
pub mod classify;
pub mod error;
pub mod evaluator;
pub mod format;
pub mod lexer;
pub mod resolve;
pub mod settings;
pub mod simplify;
pub mod solver;
pub mod system;
pub mod transform;
pub mod units;

pub use builder::{build, evaluation_text, BuiltExpression, UnitAnnotation};
pub use classify::{analyze, plan, Classification, ContainerAnalysis, PercentagePattern, WorkspacePlan};
pub use error::*;
pub use evaluator::{evaluate, Expr, Scope};
pub use format::format_value;
pub use lexer::{lex, Lexeme, LexemeKind};
pub use resolve::{resolve, ResolvedLayout};
pub use settings::{DisplaySettings, EngineSettings, LayoutSettings, SettingsManager, SolverSettings};
pub use simplify::{simplify, SimplifyOutcome};
pub use solver::{Engine, SolveOutcome};
pub use system::{solve_system, SystemSolution};
pub use transform::{apply_eq_op, Rewrite};
pub use units::ConversionRequest;

/// Solve a workspace with the built-in units and default settings
pub fn solve_workspace(workspace: &canvas_model::Workspace) -> SolveOutcome {
    let settings = EngineSettings::default();
    Engine::new(canvas_model::UnitTable::builtin(), &settings).solve(workspace)
}
