//! The workspace: the collection of containers and placed tokens
//!
//! The workspace exclusively owns every [`PlacedToken`] and [`Container`].
//! It enforces the membership invariant: a token's `container_id` always
//! names an existing container.

use crate::error::{ModelError, ModelResult};
use crate::ids::{ContainerId, TokenId};
use crate::palette::EquationTemplate;
use crate::symbol::Symbol;
use crate::token::{Container, ContainerKind, PlacedToken};
use serde::{Deserialize, Serialize};

/// Horizontal inset of the first token inside a container
pub const TOKEN_START_OFFSET: f64 = 50.0;
/// Horizontal spacing between consecutively laid out tokens
pub const TOKEN_SPACING: f64 = 50.0;
/// A container with fewer tokens than this accepts a template
const TEMPLATE_TARGET_MAX_TOKENS: usize = 3;

/// Containers and tokens placed on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WorkspaceParts")]
pub struct Workspace {
    containers: Vec<Container>,
    tokens: Vec<PlacedToken>,
}

/// Unchecked serialized form; membership is validated on the way in
#[derive(Deserialize)]
struct WorkspaceParts {
    containers: Vec<Container>,
    #[serde(default)]
    tokens: Vec<PlacedToken>,
}

impl TryFrom<WorkspaceParts> for Workspace {
    type Error = ModelError;

    fn try_from(parts: WorkspaceParts) -> ModelResult<Self> {
        Self::from_parts(parts.containers, parts.tokens)
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// Create a workspace with the two initial equation containers
    pub fn new() -> Self {
        Self {
            containers: vec![Container::new(50.0, 40.0), Container::new(50.0, 220.0)],
            tokens: Vec::new(),
        }
    }

    /// Build a workspace from existing parts, checking token membership
    pub fn from_parts(containers: Vec<Container>, tokens: Vec<PlacedToken>) -> ModelResult<Self> {
        for token in &tokens {
            if let Some(id) = token.container_id {
                if !containers.iter().any(|c| c.id == id) {
                    return Err(ModelError::UnknownContainer(id));
                }
            }
        }
        Ok(Self { containers, tokens })
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn tokens(&self) -> &[PlacedToken] {
        &self.tokens
    }

    pub fn container(&self, id: ContainerId) -> ModelResult<&Container> {
        self.containers
            .iter()
            .find(|c| c.id == id)
            .ok_or(ModelError::UnknownContainer(id))
    }

    pub fn token(&self, id: TokenId) -> ModelResult<&PlacedToken> {
        self.tokens
            .iter()
            .find(|t| t.instance_id == id)
            .ok_or(ModelError::UnknownToken(id))
    }

    fn token_mut(&mut self, id: TokenId) -> ModelResult<&mut PlacedToken> {
        self.tokens
            .iter_mut()
            .find(|t| t.instance_id == id)
            .ok_or(ModelError::UnknownToken(id))
    }

    /// Tokens assigned to a container, in insertion order
    pub fn tokens_in(&self, id: ContainerId) -> impl Iterator<Item = &PlacedToken> {
        self.tokens.iter().filter(move |t| t.container_id == Some(id))
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    /// Place a symbol on the canvas outside any container
    pub fn place_symbol(&mut self, symbol: Symbol, x: f64, y: f64) -> TokenId {
        let token = PlacedToken::new(symbol, x, y);
        let id = token.instance_id;
        self.tokens.push(token);
        id
    }

    /// Place a symbol in the next free slot to the right of a container's tokens
    pub fn append_symbol(&mut self, container_id: ContainerId, symbol: Symbol) -> ModelResult<TokenId> {
        let container = self.container(container_id)?;
        let slot = self.tokens_in(container_id).count();
        let x = container.x + TOKEN_START_OFFSET + slot as f64 * TOKEN_SPACING;
        let token = PlacedToken::new(symbol, x, container.baseline()).in_container(container_id);
        let id = token.instance_id;
        self.tokens.push(token);
        Ok(id)
    }

    /// Move a token without changing its container membership
    pub fn move_token(&mut self, id: TokenId, x: f64, y: f64) -> ModelResult<()> {
        let token = self.token_mut(id)?;
        token.x = x;
        token.y = y;
        Ok(())
    }

    /// Finish a drag: assign the token to the first container under it, if any
    pub fn drop_token(&mut self, id: TokenId) -> ModelResult<Option<ContainerId>> {
        let (x, y) = {
            let token = self.token(id)?;
            (token.x, token.y)
        };
        let target = self
            .containers
            .iter()
            .find(|c| c.contains(x, y))
            .map(|c| c.id);
        self.token_mut(id)?.container_id = target;
        tracing::debug!(token = %id, container = ?target, "token dropped");
        Ok(target)
    }

    pub fn remove_token(&mut self, id: TokenId) -> ModelResult<PlacedToken> {
        let index = self
            .tokens
            .iter()
            .position(|t| t.instance_id == id)
            .ok_or(ModelError::UnknownToken(id))?;
        Ok(self.tokens.remove(index))
    }

    // =========================================================================
    // Containers
    // =========================================================================

    /// Add a container of the given kind below the initial ones
    pub fn add_container(&mut self, kind: ContainerKind) -> ContainerId {
        let container = Container::new(50.0, 350.0).with_kind(kind);
        let id = container.id;
        self.containers.push(container);
        id
    }

    /// Add a fully specified container
    pub fn insert_container(&mut self, container: Container) -> ContainerId {
        let id = container.id;
        self.containers.push(container);
        id
    }

    /// Move a container, carrying its tokens along by the same delta
    pub fn move_container(&mut self, id: ContainerId, x: f64, y: f64) -> ModelResult<()> {
        let container = self
            .containers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(ModelError::UnknownContainer(id))?;
        let (dx, dy) = (x - container.x, y - container.y);
        container.x = x;
        container.y = y;

        for token in self.tokens.iter_mut().filter(|t| t.container_id == Some(id)) {
            token.x += dx;
            token.y += dy;
        }
        Ok(())
    }

    /// Remove a container; its tokens stay on the canvas unassigned
    pub fn remove_container(&mut self, id: ContainerId) -> ModelResult<Container> {
        let index = self
            .containers
            .iter()
            .position(|c| c.id == id)
            .ok_or(ModelError::UnknownContainer(id))?;
        if self.containers.len() <= 1 {
            return Err(ModelError::LastContainerRemovalRefused);
        }

        for token in self.tokens.iter_mut().filter(|t| t.container_id == Some(id)) {
            token.container_id = None;
        }
        Ok(self.containers.remove(index))
    }

    /// Delete every token in a container
    pub fn clear_container(&mut self, id: ContainerId) -> ModelResult<usize> {
        self.container(id)?;
        let before = self.tokens.len();
        self.tokens.retain(|t| t.container_id != Some(id));
        Ok(before - self.tokens.len())
    }

    /// Replace a container's token set; tokens of other containers are untouched
    pub fn replace_tokens(&mut self, id: ContainerId, tokens: Vec<PlacedToken>) -> ModelResult<()> {
        self.container(id)?;
        self.tokens.retain(|t| t.container_id != Some(id));
        self.tokens
            .extend(tokens.into_iter().map(|t| t.in_container(id)));
        Ok(())
    }

    /// Lay a template out in the first container holding fewer than three tokens
    pub fn insert_template(&mut self, template: &EquationTemplate) -> ModelResult<ContainerId> {
        let target = self
            .containers
            .iter()
            .find(|c| self.tokens_in(c.id).count() < TEMPLATE_TARGET_MAX_TOKENS)
            .cloned()
            .ok_or(ModelError::NoFreeContainer)?;

        let start_x = target.x + TOKEN_START_OFFSET;
        let y = target.baseline();
        for (index, symbol) in template.symbols().into_iter().enumerate() {
            let token = PlacedToken::new(symbol, start_x + index as f64 * TOKEN_SPACING, y)
                .in_container(target.id);
            self.tokens.push(token);
        }
        tracing::debug!(template = template.id, container = %target.id, "template inserted");
        Ok(target.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette;
    use proptest::prelude::*;

    #[test]
    fn test_new_workspace_has_two_containers() {
        let ws = Workspace::new();
        assert_eq!(ws.containers().len(), 2);
        assert!(ws.tokens().is_empty());
    }

    #[test]
    fn test_drop_token_assigns_container() {
        let mut ws = Workspace::new();
        let second = ws.containers()[1].id;
        let id = ws.place_symbol(Symbol::number("5"), 0.0, 0.0);
        assert_eq!(ws.drop_token(id).unwrap(), None);

        ws.move_token(id, 100.0, 300.0).unwrap();
        assert_eq!(ws.drop_token(id).unwrap(), Some(second));
        assert_eq!(ws.tokens_in(second).count(), 1);
    }

    #[test]
    fn test_move_container_drags_tokens() {
        let mut ws = Workspace::new();
        let first = ws.containers()[0].id;
        let id = ws.append_symbol(first, Symbol::variable("x")).unwrap();
        let before = ws.token(id).unwrap().clone();

        ws.move_container(first, 60.0, 60.0).unwrap();
        let after = ws.token(id).unwrap();
        assert_eq!(after.x - before.x, 10.0);
        assert_eq!(after.y - before.y, 20.0);
    }

    #[test]
    fn test_remove_container_unassigns_tokens() {
        let mut ws = Workspace::new();
        let first = ws.containers()[0].id;
        let id = ws.append_symbol(first, Symbol::variable("x")).unwrap();

        ws.remove_container(first).unwrap();
        assert_eq!(ws.token(id).unwrap().container_id, None);
        assert_eq!(ws.tokens().len(), 1);
    }

    #[test]
    fn test_last_container_cannot_be_removed() {
        let mut ws = Workspace::new();
        let first = ws.containers()[0].id;
        let second = ws.containers()[1].id;
        ws.remove_container(first).unwrap();
        assert_eq!(
            ws.remove_container(second),
            Err(ModelError::LastContainerRemovalRefused)
        );
        assert_eq!(ws.containers().len(), 1);
    }

    #[test]
    fn test_clear_container_deletes_only_its_tokens() {
        let mut ws = Workspace::new();
        let first = ws.containers()[0].id;
        let second = ws.containers()[1].id;
        ws.append_symbol(first, Symbol::number("1")).unwrap();
        ws.append_symbol(first, Symbol::number("2")).unwrap();
        ws.append_symbol(second, Symbol::number("3")).unwrap();

        assert_eq!(ws.clear_container(first).unwrap(), 2);
        assert_eq!(ws.tokens().len(), 1);
    }

    #[test]
    fn test_insert_template_skips_full_containers() {
        let mut ws = Workspace::new();
        let first = ws.containers()[0].id;
        let second = ws.containers()[1].id;
        for digit in ["1", "2", "3"] {
            ws.append_symbol(first, Symbol::number(digit)).unwrap();
        }

        let linear = palette::template("linear").unwrap();
        assert_eq!(ws.insert_template(linear).unwrap(), second);
        let xs: Vec<f64> = ws.tokens_in(second).map(|t| t.x).collect();
        assert_eq!(xs, vec![100.0, 150.0, 200.0]);

        ws.insert_template(linear).unwrap_err();
    }

    #[test]
    fn test_from_parts_rejects_dangling_membership() {
        let stray = PlacedToken::new(Symbol::number("1"), 0.0, 0.0).in_container(ContainerId::new());
        assert!(matches!(
            Workspace::from_parts(vec![Container::new(0.0, 0.0)], vec![stray]),
            Err(ModelError::UnknownContainer(_))
        ));
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut ws = Workspace::new();
        let first = ws.containers()[0].id;
        ws.append_symbol(first, Symbol::variable("x")).unwrap();
        let json = serde_json::to_string(&ws).unwrap();
        let back: Workspace = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ws);
    }

    #[test]
    fn test_deserialize_rejects_dangling_membership() {
        let container = Container::new(0.0, 0.0);
        let stray = PlacedToken::new(Symbol::number("1"), 0.0, 0.0).in_container(ContainerId::new());
        let json = serde_json::json!({ "containers": [container], "tokens": [stray] });

        let err = serde_json::from_value::<Workspace>(json).unwrap_err();
        assert!(err.to_string().contains("Unknown container"), "{}", err);
    }

    proptest! {
        #[test]
        fn test_drop_inside_container_always_assigns(dx in 0.0f64..400.0, dy in 0.0f64..160.0) {
            let mut ws = Workspace::new();
            let first = ws.containers()[0].clone();
            let id = ws.place_symbol(Symbol::number("7"), first.x + dx, first.y + dy);
            prop_assert_eq!(ws.drop_token(id).unwrap(), Some(first.id));
            prop_assert_eq!(ws.tokens_in(first.id).count(), 1);
        }
    }
}
