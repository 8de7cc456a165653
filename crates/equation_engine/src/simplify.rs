//! Single-step simplification
//!
//! Scans a container's lexemes left to right and applies the first rewrite
//! rule that matches. Every rule removes tokens, so repeating the step
//! terminates.

use crate::error::EngineResult;
use crate::format::format_value;
use crate::lexer::{self, Lexeme, ADDITIVE_OPS, DIVIDE_OPS, MULTIPLY_OPS, SUBTRACT_OPS};
use crate::resolve::resolve;
use crate::transform::Rewrite;
use canvas_model::{glyphs, ContainerId, PlacedToken, Symbol, Workspace};
use std::ops::Range;

/// Message reported when no rule applies
pub const FIXED_POINT_MESSAGE: &str = "No more simplifications found";

/// Result of one simplification step
#[derive(Debug, Clone)]
pub enum SimplifyOutcome {
    Rewritten(Rewrite),
    FixedPoint,
}

/// A matched rule: lexemes to remove and an optional replacement token
struct Edit {
    remove: Range<usize>,
    insert: Option<Symbol>,
    message: String,
}

impl Edit {
    fn drop(remove: Range<usize>, message: String) -> Self {
        Self {
            remove,
            insert: None,
            message,
        }
    }
}

fn is_plus(lexeme: &Lexeme) -> bool {
    lexeme.is_op(&[glyphs::PLUS])
}

fn is_zero(lexeme: &Lexeme) -> bool {
    lexeme.number() == Some(0.0)
}

/// Position after nothing, `=`, `(` or `+` starts an additive run
fn opens_term(prev: Option<&Lexeme>) -> bool {
    match prev {
        None => true,
        Some(l) => l.is_equals() || l.is_grouping(glyphs::OPEN_PAREN) || is_plus(l),
    }
}

/// The preceding literal is a complete additive term
fn closes_term(next: Option<&Lexeme>) -> bool {
    match next {
        None => true,
        Some(l) => l.is_op(ADDITIVE_OPS) || l.is_equals() || l.is_grouping(glyphs::CLOSE_PAREN),
    }
}

fn same_variable(a: &Lexeme, b: &Lexeme) -> bool {
    a.is_variable() && b.is_variable() && a.text == b.text
}

fn same_number(a: &Lexeme, b: &Lexeme) -> bool {
    a.is_number() && b.is_number() && a.text == b.text
}

/// Try every rule at position `i`, in order
fn match_at(lexemes: &[Lexeme], i: usize, precision: u32) -> Option<Edit> {
    let at = |k: usize| lexemes.get(k);
    let prev = i.checked_sub(1).and_then(at);
    let cur = at(i)?;

    // var + 0
    if let (Some(plus), Some(zero)) = (at(i + 1), at(i + 2)) {
        let after_variable = prev.is_some_and(Lexeme::is_variable);
        if cur.is_variable() && !after_variable && is_plus(plus) && is_zero(zero) && closes_term(at(i + 3)) {
            return Some(Edit::drop(i + 1..i + 3, format!("Removed + 0 after {}", cur.text)));
        }
    }

    // + 0 / 0 +
    if let Some(next) = at(i + 1) {
        let after_variable = prev.is_some_and(Lexeme::is_variable);
        if is_plus(cur) && is_zero(next) && !after_variable && closes_term(at(i + 2)) {
            return Some(Edit::drop(i..i + 2, "Removed + 0".to_string()));
        }
        if is_zero(cur) && is_plus(next) && opens_term(prev) {
            return Some(Edit::drop(i..i + 2, "Removed 0 +".to_string()));
        }
    }

    // × N ÷ N / ÷ N × N
    if let (Some(a), Some(op), Some(b)) = (at(i + 1), at(i + 2), at(i + 3)) {
        let cancels = (cur.is_op(MULTIPLY_OPS) && op.is_op(DIVIDE_OPS))
            || (cur.is_op(DIVIDE_OPS) && op.is_op(MULTIPLY_OPS));
        let raised = at(i + 4).is_some_and(|l| l.is_op(&[glyphs::POWER]));
        if cancels && same_number(a, b) && !raised {
            return Some(Edit::drop(
                i..i + 4,
                format!("Cancelled {} {} {} {}", cur.text, a.text, op.text, b.text),
            ));
        }
    }

    // number ± number
    if let (Some(op), Some(b)) = (at(i + 1), at(i + 2)) {
        if let (Some(x), Some(y)) = (cur.number(), b.number()) {
            if op.is_op(ADDITIVE_OPS) && opens_term(prev) && closes_term(at(i + 3)) {
                let value = if op.is_op(SUBTRACT_OPS) { x - y } else { x + y };
                let text = format_value(value, precision);
                return Some(Edit {
                    remove: i..i + 3,
                    insert: Some(Symbol::number(&text)),
                    message: format!("Combined {} {} {} into {}", cur.text, op.text, b.text, text),
                });
            }
        }
    }

    // var − var
    if let (Some(op), Some(b)) = (at(i + 1), at(i + 2)) {
        if same_variable(cur, b) && op.is_op(SUBTRACT_OPS) && opens_term(prev) && closes_term(at(i + 3)) {
            return Some(Edit {
                remove: i..i + 3,
                insert: Some(Symbol::number("0")),
                message: format!("Simplified {} - {} to 0", cur.text, b.text),
            });
        }
    }

    // var − N + N
    if let (Some(minus), Some(a), Some(plus), Some(b)) = (at(i + 1), at(i + 2), at(i + 3), at(i + 4)) {
        if cur.is_variable()
            && minus.is_op(SUBTRACT_OPS)
            && is_plus(plus)
            && same_number(a, b)
            && closes_term(at(i + 5))
        {
            return Some(Edit::drop(
                i + 1..i + 5,
                format!("Simplified {} - {} + {} to {}", cur.text, a.text, b.text, cur.text),
            ));
        }
    }

    None
}

/// Find the first applicable rewrite in a lexeme sequence
fn find_edit(lexemes: &[Lexeme], precision: u32) -> Option<Edit> {
    (0..lexemes.len()).find_map(|i| match_at(lexemes, i, precision))
}

/// Compute one simplification step for a container
pub fn simplify(
    workspace: &Workspace,
    container_id: ContainerId,
    precision: u32,
) -> EngineResult<SimplifyOutcome> {
    workspace.container(container_id)?;
    let resolved = resolve(workspace.containers(), workspace.tokens());
    let tokens = resolved.tokens(container_id).unwrap_or_default();
    let lexemes = lexer::lex(tokens);

    let Some(edit) = find_edit(&lexemes, precision) else {
        return Ok(SimplifyOutcome::FixedPoint);
    };

    let span = lexer::token_range(&lexemes[edit.remove.clone()]);
    let mut rewritten: Vec<PlacedToken> = tokens[..span.start].iter().map(|t| (*t).clone()).collect();
    if let Some(symbol) = edit.insert {
        let anchor = tokens[span.start];
        rewritten.push(PlacedToken::new(symbol, anchor.x, anchor.y).in_container(container_id));
    }
    rewritten.extend(tokens[span.end..].iter().map(|t| (*t).clone()));

    tracing::debug!("{} in container {}", edit.message, container_id);
    Ok(SimplifyOutcome::Rewritten(Rewrite {
        container_id,
        tokens: rewritten,
        message: edit.message,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn workspace(symbols: Vec<Symbol>) -> (Workspace, ContainerId) {
        let mut ws = Workspace::new();
        let id = ws.containers()[0].id;
        for symbol in symbols {
            ws.append_symbol(id, symbol).unwrap();
        }
        (ws, id)
    }

    fn text(ws: &Workspace, id: ContainerId) -> String {
        let resolved = resolve(ws.containers(), ws.tokens());
        lexer::join(&lexer::lex(resolved.tokens(id).unwrap()))
    }

    /// Apply one step and return (message, resulting text)
    fn step(symbols: Vec<Symbol>) -> (String, String) {
        let (mut ws, id) = workspace(symbols);
        match simplify(&ws, id, 10).unwrap() {
            SimplifyOutcome::Rewritten(rewrite) => {
                rewrite.apply_to(&mut ws).unwrap();
                (rewrite.message, text(&ws, id))
            }
            SimplifyOutcome::FixedPoint => (FIXED_POINT_MESSAGE.to_string(), text(&ws, id)),
        }
    }

    fn x() -> Symbol {
        Symbol::variable("x")
    }

    fn n(t: &str) -> Symbol {
        Symbol::number(t)
    }

    fn op(t: &str) -> Symbol {
        Symbol::operator(t)
    }

    #[test]
    fn test_variable_plus_zero() {
        let (message, result) = step(vec![x(), op("+"), n("0"), Symbol::equals(), n("5")]);
        assert_eq!(result, "x = 5");
        assert_eq!(message, "Removed + 0 after x");
    }

    #[test]
    fn test_leading_zero_plus() {
        let (_, result) = step(vec![n("0"), op("+"), x(), Symbol::equals(), n("5")]);
        assert_eq!(result, "x = 5");
    }

    #[test]
    fn test_zero_must_be_a_whole_term() {
        let (message, result) = step(vec![x(), op("+"), n("0"), op(glyphs::TIMES), n("5")]);
        assert_eq!(message, FIXED_POINT_MESSAGE);
        assert_eq!(result, "x + 0 * 5");
    }

    #[test]
    fn test_cancel_multiply_divide() {
        let (_, result) = step(vec![
            x(),
            op(glyphs::TIMES),
            n("2"),
            op(glyphs::DIVIDE),
            n("2"),
            Symbol::equals(),
            n("4"),
        ]);
        assert_eq!(result, "x = 4");
    }

    #[test]
    fn test_cancel_skips_powers() {
        let (message, _) = step(vec![
            x(),
            op(glyphs::DIVIDE),
            n("2"),
            op(glyphs::TIMES),
            n("2"),
            op("^"),
            n("2"),
        ]);
        assert_eq!(message, FIXED_POINT_MESSAGE);
    }

    #[test]
    fn test_fold_numbers() {
        let (message, result) = step(vec![x(), Symbol::equals(), n("5"), op("+"), n("3")]);
        assert_eq!(result, "x = 8");
        assert_eq!(message, "Combined 5 + 3 into 8");
    }

    #[test]
    fn test_fold_decimals_and_negatives() {
        let (_, result) = step(vec![n("1"), n("."), n("5"), op("-"), n("4"), Symbol::equals(), x()]);
        assert_eq!(result, "-2.5 = x");
    }

    #[test]
    fn test_fold_respects_precedence() {
        let (message, _) = step(vec![n("2"), op("+"), n("3"), op(glyphs::TIMES), x()]);
        assert_eq!(message, FIXED_POINT_MESSAGE);

        let (message, _) = step(vec![x(), op(glyphs::TIMES), n("2"), op("+"), n("3")]);
        assert_eq!(message, FIXED_POINT_MESSAGE);
    }

    #[test]
    fn test_variable_minus_itself() {
        let (_, result) = step(vec![x(), op("-"), x(), Symbol::equals(), n("0")]);
        assert_eq!(result, "0 = 0");

        let (message, _) = step(vec![x(), op("+"), x()]);
        assert_eq!(message, FIXED_POINT_MESSAGE);
    }

    #[test]
    fn test_subtract_then_add_back() {
        let (_, result) = step(vec![x(), op("-"), n("3"), op("+"), n("3"), Symbol::equals(), n("7")]);
        assert_eq!(result, "x = 7");
    }

    #[test]
    fn test_first_match_wins() {
        // both `+ 0` and `2 + 3` match; the leftmost applies first
        let (_, result) = step(vec![x(), op("+"), n("0"), Symbol::equals(), n("2"), op("+"), n("3")]);
        assert_eq!(result, "x = 2 + 3");
    }

    #[test]
    fn test_new_token_takes_anchor_position() {
        let (mut ws, id) = workspace(vec![x(), Symbol::equals(), n("5"), op("+"), n("3")]);
        let anchor_x = ws.tokens_in(id).nth(2).unwrap().x;
        match simplify(&ws, id, 10).unwrap() {
            SimplifyOutcome::Rewritten(rewrite) => rewrite.apply_to(&mut ws).unwrap(),
            SimplifyOutcome::FixedPoint => panic!("expected a rewrite"),
        }
        let folded = ws.tokens_in(id).find(|t| t.text() == "8").unwrap();
        assert_eq!(folded.x, anchor_x);
    }

    #[test]
    fn test_unknown_container() {
        let (ws, _) = workspace(vec![]);
        assert!(simplify(&ws, ContainerId::new(), 10).is_err());
    }

    fn alphabet() -> impl Strategy<Value = Symbol> {
        prop_oneof![
            Just(Symbol::variable("x")),
            Just(Symbol::variable("y")),
            Just(Symbol::number("0")),
            Just(Symbol::number("2")),
            Just(Symbol::number("3")),
            Just(Symbol::operator("+")),
            Just(Symbol::operator("-")),
            Just(Symbol::operator(glyphs::TIMES)),
            Just(Symbol::operator(glyphs::DIVIDE)),
            Just(Symbol::equals()),
        ]
    }

    proptest! {
        #[test]
        fn prop_simplify_reaches_fixed_point(symbols in prop::collection::vec(alphabet(), 0..16)) {
            let (mut ws, id) = workspace(symbols);
            let mut count = ws.tokens_in(id).count();

            for _ in 0..=count {
                match simplify(&ws, id, 10).unwrap() {
                    SimplifyOutcome::Rewritten(rewrite) => {
                        rewrite.apply_to(&mut ws).unwrap();
                        let next = ws.tokens_in(id).count();
                        prop_assert!(next < count);
                        count = next;
                    }
                    SimplifyOutcome::FixedPoint => return Ok(()),
                }
            }
            prop_assert!(matches!(simplify(&ws, id, 10).unwrap(), SimplifyOutcome::FixedPoint));
        }
    }
}
