//! Algebraic Transformation Engine
//!
//! Applies an operation to both sides of an equation. Transformations are
//! computed against a borrowed workspace and returned as a [`Rewrite`], so a
//! failed attempt never touches state.

use crate::builder;
use crate::error::{EngineError, EngineResult};
use crate::lexer;
use crate::resolve::resolve;
use crate::settings::LayoutSettings;
use canvas_model::{glyphs, Container, ContainerId, PlacedToken, Symbol, Workspace};

/// Operators an operation container may start with
pub const EQ_OPERATORS: &[&str] = &[
    glyphs::PLUS,
    glyphs::MINUS,
    glyphs::MINUS_SIGN,
    glyphs::TIMES,
    glyphs::DIVIDE,
    "*",
    "/",
];

const MULTIPLICATIVE_OPERATORS: &[&str] = &[glyphs::TIMES, glyphs::DIVIDE, "*", "/"];

/// New token set for one container
#[derive(Debug, Clone)]
pub struct Rewrite {
    pub container_id: ContainerId,
    /// Replacement tokens, in order
    pub tokens: Vec<PlacedToken>,
    pub message: String,
}

impl Rewrite {
    /// Rendered expression of the rewritten container
    pub fn text(&self) -> String {
        let refs: Vec<&PlacedToken> = self.tokens.iter().collect();
        builder::build(&refs).text
    }

    /// Replace the container's tokens in `workspace`
    pub fn apply_to(&self, workspace: &mut Workspace) -> EngineResult<()> {
        workspace.replace_tokens(self.container_id, self.tokens.clone())?;
        Ok(())
    }
}

/// Lay tokens out left to right along a container's baseline
pub fn lay_out(tokens: &mut [PlacedToken], container: &Container, layout: &LayoutSettings) {
    for (i, token) in tokens.iter_mut().enumerate() {
        token.x = container.x + layout.start_offset + i as f64 * layout.spacing;
        token.y = container.baseline();
        token.container_id = Some(container.id);
    }
}

fn fresh(symbol: Symbol) -> PlacedToken {
    PlacedToken::new(symbol, 0.0, 0.0)
}

/// Apply the `[operator, operand]` held by `operation` to the nearest
/// equation container.
///
/// The operand is the operation container's second lexeme, so a multi-digit
/// operand spread over several number tokens is taken whole.
pub fn apply_eq_op(
    workspace: &Workspace,
    operation: ContainerId,
    layout: &LayoutSettings,
) -> EngineResult<Rewrite> {
    let op_container = workspace.container(operation)?;
    let resolved = resolve(workspace.containers(), workspace.tokens());
    let op_tokens = resolved.tokens(operation).unwrap_or_default();

    let op_lexemes = lexer::lex(op_tokens);
    let (operator, operand) = match op_lexemes.as_slice() {
        [operator, operand, ..] => (&op_tokens[operator.span.start], &op_tokens[operand.span.clone()]),
        _ => {
            return Err(EngineError::TransformationTargetMissing(
                "operation needs an operator and a value".to_string(),
            ))
        }
    };
    if !operator.symbol.is_operator_in(EQ_OPERATORS) {
        return Err(EngineError::UnsupportedOperation(operator.text().to_string()));
    }

    let target = workspace
        .containers()
        .iter()
        .filter(|c| c.id != operation && !c.is_operation())
        .min_by(|a, b| {
            a.distance_to(op_container)
                .total_cmp(&b.distance_to(op_container))
        })
        .ok_or_else(|| {
            EngineError::TransformationTargetMissing("no equation container".to_string())
        })?;

    let target_tokens = resolved.tokens(target.id).unwrap_or_default();
    let equals = target_tokens
        .iter()
        .position(|t| t.symbol.is_equals())
        .ok_or(EngineError::InvalidEquationFormat)?;
    let (left, right) = (&target_tokens[..equals], &target_tokens[equals + 1..]);

    let multiplicative = operator.symbol.is_operator_in(MULTIPLICATIVE_OPERATORS);
    let side = |tokens: &[&PlacedToken]| -> Vec<PlacedToken> {
        let mut out = Vec::new();
        if multiplicative {
            out.push(fresh(Symbol::grouping(glyphs::OPEN_PAREN)));
        }
        out.extend(tokens.iter().map(|t| (*t).clone()));
        if multiplicative {
            out.push(fresh(Symbol::grouping(glyphs::CLOSE_PAREN)));
        }
        out.push(fresh(operator.symbol.clone()));
        out.extend(operand.iter().map(|t| fresh(t.symbol.clone())));
        out
    };

    let mut tokens = side(left);
    tokens.push(fresh(Symbol::equals()));
    tokens.extend(side(right));
    lay_out(&mut tokens, target, layout);

    let operand_text: String = operand.iter().map(|t| t.text()).collect();
    let message = format!("Applied {} {} to both sides", operator.text(), operand_text);
    tracing::debug!("{} of container {}", message, target.id);

    Ok(Rewrite {
        container_id: target.id,
        tokens,
        message,
    })
}
