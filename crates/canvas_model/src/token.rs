//! Placed tokens and containers

use crate::ids::{ContainerId, TokenId};
use crate::symbol::Symbol;
use serde::{Deserialize, Serialize};

/// A symbol instantiated on the workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedToken {
    pub instance_id: TokenId,
    pub symbol: Symbol,
    pub x: f64,
    pub y: f64,
    /// Container this token belongs to, if any
    pub container_id: Option<ContainerId>,
}

impl PlacedToken {
    /// Place a symbol at a position, outside any container
    pub fn new(symbol: Symbol, x: f64, y: f64) -> Self {
        Self {
            instance_id: TokenId::new(),
            symbol,
            x,
            y,
            container_id: None,
        }
    }

    /// Assign the token to a container
    pub fn in_container(mut self, container_id: ContainerId) -> Self {
        self.container_id = Some(container_id);
        self
    }

    /// Displayed text of the underlying symbol
    pub fn text(&self) -> &str {
        &self.symbol.text
    }
}

/// Role of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    /// Tokens read left to right form an expression
    #[default]
    Equation,
    /// Holds an operator and an operand applied to a nearby equation (EqOp)
    Operation,
}

/// A rectangular grouping region on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub id: ContainerId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub kind: ContainerKind,
}

impl Container {
    pub const DEFAULT_WIDTH: f64 = 400.0;
    pub const DEFAULT_HEIGHT: f64 = 160.0;

    /// Create an equation container with the default size
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            id: ContainerId::new(),
            x,
            y,
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            kind: ContainerKind::Equation,
        }
    }

    /// Set the container kind
    pub fn with_kind(mut self, kind: ContainerKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the container size
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn is_operation(&self) -> bool {
        self.kind == ContainerKind::Operation
    }

    /// Whether a point lies inside the rectangle (edges inclusive)
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    /// Euclidean distance between the top-left corners of two containers
    pub fn distance_to(&self, other: &Container) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Vertical center line, where tokens are laid out
    pub fn baseline(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_edge_inclusive() {
        let c = Container::new(50.0, 40.0);
        assert!(c.contains(50.0, 40.0));
        assert!(c.contains(450.0, 200.0));
        assert!(!c.contains(450.1, 100.0));
        assert!(!c.contains(100.0, 39.9));
    }

    #[test]
    fn test_distance_uses_top_left_corners() {
        let a = Container::new(0.0, 0.0);
        let b = Container::new(30.0, 40.0).with_size(10.0, 10.0);
        assert_eq!(a.distance_to(&b), 50.0);
    }

    #[test]
    fn test_placed_token_ids_differ_per_placement() {
        let a = PlacedToken::new(Symbol::number("5"), 0.0, 0.0);
        let b = PlacedToken::new(Symbol::number("5"), 0.0, 0.0);
        assert_ne!(a.instance_id, b.instance_id);
        assert_eq!(a.text(), "5");
        assert!(a.container_id.is_none());
    }
}
