//! Solver
//!
//! Entry point that turns a workspace snapshot into a [`SolveOutcome`], plus
//! the [`Engine`] facade that also commits transformations to a workspace.

use crate::classify::{self, Classification, ContainerAnalysis, WorkspacePlan};
use crate::error::{EngineError, EngineResult};
use crate::evaluator::{self, Scope};
use crate::format::format_value;
use crate::lexer::{self, Lexeme};
use crate::resolve::resolve;
use crate::settings::EngineSettings;
use crate::simplify::{self, SimplifyOutcome};
use crate::system::solve_system;
use crate::transform;
use crate::units;
use canvas_model::{ContainerId, UnitTable, Workspace};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Result of one solve attempt; exactly one of result and error is set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveOutcome {
    pub equation_text: String,
    pub result_text: Option<String>,
    pub error_text: Option<String>,
}

impl SolveOutcome {
    pub fn solved(equation_text: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            equation_text: equation_text.into(),
            result_text: Some(result.into()),
            error_text: None,
        }
    }

    pub fn failed(equation_text: impl Into<String>, error: &EngineError) -> Self {
        Self {
            equation_text: equation_text.into(),
            result_text: None,
            error_text: Some(error.to_string()),
        }
    }

    fn from_result(equation_text: String, result: EngineResult<String>) -> Self {
        match result {
            Ok(text) => Self::solved(equation_text, text),
            Err(e) => {
                tracing::debug!("Solve failed for '{}': {}", equation_text, e);
                Self::failed(equation_text, &e)
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.result_text.is_some()
    }
}

impl fmt::Display for SolveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.result_text, &self.error_text) {
            (Some(result), _) => write!(f, "{}", result),
            (None, Some(error)) => write!(f, "{}", error),
            (None, None) => Ok(()),
        }
    }
}

/// Solver and transformation engine over a unit table and settings
#[derive(Debug, Clone, Copy)]
pub struct Engine<'a> {
    units: &'a UnitTable,
    settings: &'a EngineSettings,
}

impl<'a> Engine<'a> {
    pub fn new(units: &'a UnitTable, settings: &'a EngineSettings) -> Self {
        Self { units, settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        self.settings
    }

    /// Solve whatever the workspace currently holds
    pub fn solve(&self, workspace: &Workspace) -> SolveOutcome {
        let layout = resolve(workspace.containers(), workspace.tokens());
        let analyses = classify::analyze_layout(&layout);

        match classify::plan(&analyses) {
            WorkspacePlan::NoEquation => SolveOutcome::failed("", &EngineError::NoEquationFound),
            WorkspacePlan::Single(analysis) => {
                let equation_text = analysis.equation_text().unwrap_or_default();
                SolveOutcome::from_result(equation_text, self.solve_container(analysis))
            }
            WorkspacePlan::System {
                equations,
                variables,
            } => self.solve_equations(&equations, &variables),
        }
    }

    fn solve_equations(
        &self,
        equations: &[&ContainerAnalysis],
        variables: &BTreeSet<String>,
    ) -> SolveOutcome {
        let texts: Vec<String> = equations.iter().filter_map(|a| a.equation_text()).collect();
        let solution = solve_system(&texts);
        SolveOutcome::solved(
            texts.join(" and "),
            solution.describe(variables, self.settings.display.value_precision),
        )
    }

    /// Solve one classified container
    pub fn solve_container(&self, analysis: &ContainerAnalysis) -> EngineResult<String> {
        match &analysis.classification {
            Classification::Percentage(pattern) if pattern.has_equals => {
                let value = evaluator::evaluate(&pattern.expression(), &Scope::new())?;
                Ok(format_value(value, self.settings.display.value_precision))
            }
            Classification::UnitConversion(request) => {
                request.convert(self.units, self.settings.display.precision)
            }
            Classification::Equation => self.solve_equation(&analysis.lexemes),
            Classification::Percentage(_) | Classification::Expression => {
                Err(EngineError::NoEquationFound)
            }
        }
    }

    /// Solve a single equation given as lexemes
    pub fn solve_equation(&self, lexemes: &[Lexeme]) -> EngineResult<String> {
        let sides: Vec<&[Lexeme]> = lexemes.split(Lexeme::is_equals).collect();

        if let [left, []] = sides.as_slice() {
            return self.evaluate_left(left);
        }
        let [left, right] = sides.as_slice() else {
            return Err(EngineError::InvalidEquationFormat);
        };

        let variables: BTreeSet<&str> = lexemes
            .iter()
            .filter(|l| l.is_variable())
            .map(|l| l.text.as_str())
            .collect();

        let left_text = lexer::join_for_evaluation(left);
        let right_text = lexer::join_for_evaluation(right);
        match variables.len() {
            0 => self.check_equality(&left_text, &right_text, lexemes),
            1 => {
                let name = variables.iter().next().copied().unwrap_or_default();
                self.find_root(name, &left_text, &right_text)
            }
            _ => Err(EngineError::UnsupportedVariableCount),
        }
    }

    /// `expr =`: evaluate the left side, carrying a residual length unit
    fn evaluate_left(&self, left: &[Lexeme]) -> EngineResult<String> {
        let text = lexer::join_for_evaluation(&units::strip_units(left));
        let value = evaluator::evaluate(&text, &Scope::new())?;
        let formatted = format_value(value, self.settings.display.value_precision);

        Ok(match units::residual_length_unit(left, self.units) {
            Some(unit) => format!("{} {}", formatted, unit),
            None => formatted,
        })
    }

    fn check_equality(&self, left: &str, right: &str, lexemes: &[Lexeme]) -> EngineResult<String> {
        let l = evaluator::evaluate(left, &Scope::new())?;
        let r = evaluator::evaluate(right, &Scope::new())?;

        if lexemes.iter().any(|lexeme| lexeme.text == "sqrt") {
            let precision = self.settings.display.value_precision;
            return Ok(format!(
                "{} = {}",
                format_value(l, precision),
                format_value(r, precision)
            ));
        }

        if (l - r).abs() < self.settings.solver.tolerance {
            Ok("Equation is valid".to_string())
        } else {
            Ok("Equation is invalid".to_string())
        }
    }

    /// Scan the configured range for the first root of `left - (right)`
    fn find_root(&self, name: &str, left: &str, right: &str) -> EngineResult<String> {
        let difference = evaluator::parse(&format!("{} - ({})", left, right))?;
        let solver = &self.settings.solver;

        tracing::debug!(
            "Searching {} in [{}, {}] with step {}",
            name,
            solver.search_min,
            solver.search_max,
            solver.search_step
        );

        let mut scope = Scope::new();
        for i in 0..solver.sample_count() {
            let v = solver.sample(i);
            scope.set(name, v);
            match difference.eval(&scope) {
                Ok(d) if d.abs() < solver.tolerance => {
                    tracing::debug!("Found {} = {}", name, v);
                    return Ok(format!(
                        "{} = {}",
                        name,
                        format_value(v, self.settings.display.precision)
                    ));
                }
                _ => continue,
            }
        }

        Err(EngineError::NoSolutionInRange)
    }

    /// Apply the operation container's `[operator, operand]` to the nearest
    /// equation and commit the rewrite
    pub fn apply_operation(
        &self,
        workspace: &mut Workspace,
        operation: ContainerId,
    ) -> EngineResult<transform::Rewrite> {
        let rewrite = transform::apply_eq_op(workspace, operation, &self.settings.layout)?;
        rewrite.apply_to(workspace)?;
        Ok(rewrite)
    }

    /// Run one simplification step on a container, returning its message
    pub fn simplify(&self, workspace: &mut Workspace, container: ContainerId) -> EngineResult<String> {
        match simplify::simplify(workspace, container, self.settings.display.value_precision)? {
            SimplifyOutcome::Rewritten(rewrite) => {
                rewrite.apply_to(workspace)?;
                Ok(rewrite.message)
            }
            SimplifyOutcome::FixedPoint => Ok(simplify::FIXED_POINT_MESSAGE.to_string()),
        }
    }

    /// Simplify until no rule applies; returns the messages of applied steps
    pub fn simplify_all(
        &self,
        workspace: &mut Workspace,
        container: ContainerId,
    ) -> EngineResult<Vec<String>> {
        let mut messages = Vec::new();
        while let SimplifyOutcome::Rewritten(rewrite) =
            simplify::simplify(workspace, container, self.settings.display.value_precision)?
        {
            rewrite.apply_to(workspace)?;
            messages.push(rewrite.message);
        }
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_model::{PlacedToken, Symbol};

    fn lexemes(symbols: Vec<Symbol>) -> Vec<Lexeme> {
        let tokens: Vec<PlacedToken> = symbols
            .into_iter()
            .enumerate()
            .map(|(i, s)| PlacedToken::new(s, i as f64, 0.0))
            .collect();
        let refs: Vec<_> = tokens.iter().collect();
        lexer::lex(&refs)
    }

    fn solve(symbols: Vec<Symbol>) -> EngineResult<String> {
        let settings = EngineSettings::default();
        Engine::new(UnitTable::builtin(), &settings).solve_equation(&lexemes(symbols))
    }

    fn n(text: &str) -> Symbol {
        Symbol::number(text)
    }

    fn op(text: &str) -> Symbol {
        Symbol::operator(text)
    }

    #[test]
    fn test_linear_root() {
        let result = solve(vec![
            Symbol::variable("x"),
            op("+"),
            n("5"),
            Symbol::equals(),
            n("1"),
            n("0"),
        ]);
        assert_eq!(result.unwrap(), "x = 5");
    }

    #[test]
    fn test_root_for_any_variable_name() {
        let result = solve(vec![n("2"), Symbol::variable("y"), Symbol::equals(), n("7")]);
        assert_eq!(result.unwrap(), "y = 3.5");
    }

    #[test]
    fn test_no_root_in_range() {
        let result = solve(vec![
            Symbol::variable("x"),
            op("^"),
            n("2"),
            Symbol::equals(),
            op("-"),
            n("1"),
        ]);
        assert!(matches!(result, Err(EngineError::NoSolutionInRange)));
    }

    #[test]
    fn test_empty_right_side_evaluates() {
        let result = solve(vec![n("7"), op("+"), n("9"), Symbol::equals()]);
        assert_eq!(result.unwrap(), "16");
    }

    #[test]
    fn test_validity() {
        let valid = solve(vec![n("2"), op("+"), n("2"), Symbol::equals(), n("4")]);
        assert_eq!(valid.unwrap(), "Equation is valid");
        let invalid = solve(vec![n("2"), op("+"), n("2"), Symbol::equals(), n("5")]);
        assert_eq!(invalid.unwrap(), "Equation is invalid");
    }

    #[test]
    fn test_sqrt_reports_both_sides() {
        let result = solve(vec![
            Symbol::function("\u{221A}"),
            n("1"),
            n("6"),
            Symbol::equals(),
            n("4"),
        ]);
        assert_eq!(result.unwrap(), "4 = 4");
    }

    #[test]
    fn test_multiple_variables() {
        let result = solve(vec![
            Symbol::variable("x"),
            op("+"),
            Symbol::variable("y"),
            Symbol::equals(),
            n("3"),
        ]);
        assert!(matches!(result, Err(EngineError::UnsupportedVariableCount)));
    }

    #[test]
    fn test_too_many_sides() {
        let result = solve(vec![
            Symbol::variable("x"),
            Symbol::equals(),
            n("1"),
            Symbol::equals(),
            n("1"),
        ]);
        assert!(matches!(result, Err(EngineError::InvalidEquationFormat)));
    }

    #[test]
    fn test_evaluation_failure_surfaces() {
        let result = solve(vec![n("1"), op("/"), n("0"), Symbol::equals()]);
        assert!(matches!(result, Err(EngineError::EvaluationFailure(_))));
    }

    #[test]
    fn test_custom_search_range() {
        let mut settings = EngineSettings::default();
        settings.solver.search_min = 0.0;
        settings.solver.search_max = 500.0;
        settings.solver.search_step = 1.0;
        let engine = Engine::new(UnitTable::builtin(), &settings);
        let result = engine.solve_equation(&lexemes(vec![
            Symbol::variable("x"),
            Symbol::equals(),
            n("2"),
            n("5"),
            n("0"),
        ]));
        assert_eq!(result.unwrap(), "x = 250");
    }

    #[test]
    fn test_outcome_display() {
        let ok = SolveOutcome::solved("x = 1", "x = 1");
        assert!(ok.is_success());
        assert_eq!(ok.to_string(), "x = 1");

        let err = SolveOutcome::failed("", &EngineError::NoEquationFound);
        assert!(!err.is_success());
        assert_eq!(
            err.to_string(),
            "No equation found. Add an equals sign (=) to a container."
        );
    }
}
