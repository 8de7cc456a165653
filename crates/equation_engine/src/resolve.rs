//! Token Layout Resolver
//!
//! Groups placed tokens by container and orders each group left to right.

use canvas_model::{Container, ContainerId, PlacedToken};
use std::collections::HashMap;

/// Tokens of every container, ordered by horizontal position.
///
/// Entries follow the caller's container order so iteration is
/// deterministic; empty containers get an empty entry.
#[derive(Debug, Clone)]
pub struct ResolvedLayout<'a> {
    entries: Vec<(&'a Container, Vec<&'a PlacedToken>)>,
    index: HashMap<ContainerId, usize>,
}

impl<'a> ResolvedLayout<'a> {
    /// Ordered tokens of a container
    pub fn tokens(&self, id: ContainerId) -> Option<&[&'a PlacedToken]> {
        self.index.get(&id).map(|&i| self.entries[i].1.as_slice())
    }

    /// Iterate containers with their ordered tokens, in container order
    pub fn iter(&self) -> impl Iterator<Item = (&'a Container, &[&'a PlacedToken])> + '_ {
        self.entries
            .iter()
            .map(|(container, tokens)| (*container, tokens.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Group tokens by container and sort each group ascending by `x`.
///
/// The sort is stable, so tokens sharing an `x` keep their insertion order.
/// Tokens outside any container, or naming an unknown one, are ignored.
pub fn resolve<'a>(containers: &'a [Container], tokens: &'a [PlacedToken]) -> ResolvedLayout<'a> {
    let mut entries: Vec<(&Container, Vec<&PlacedToken>)> =
        containers.iter().map(|c| (c, Vec::new())).collect();
    let index: HashMap<ContainerId, usize> = containers
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id, i))
        .collect();

    for token in tokens {
        if let Some(&i) = token.container_id.as_ref().and_then(|id| index.get(id)) {
            entries[i].1.push(token);
        }
    }

    for (_, group) in &mut entries {
        group.sort_by(|a, b| a.x.total_cmp(&b.x));
    }

    ResolvedLayout { entries, index }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_model::Symbol;
    use proptest::prelude::*;

    fn token(text: &str, x: f64, container: &Container) -> PlacedToken {
        PlacedToken::new(Symbol::number(text), x, container.baseline()).in_container(container.id)
    }

    fn texts(tokens: &[&PlacedToken]) -> Vec<String> {
        tokens.iter().map(|t| t.text().to_string()).collect()
    }

    #[test]
    fn test_orders_by_x_per_container() {
        let a = Container::new(0.0, 0.0);
        let b = Container::new(0.0, 200.0);
        let tokens = vec![
            token("3", 300.0, &a),
            token("9", 10.0, &b),
            token("1", 100.0, &a),
            token("2", 200.0, &a),
        ];
        let containers = vec![a.clone(), b.clone()];
        let layout = resolve(&containers, &tokens);

        assert_eq!(texts(layout.tokens(a.id).unwrap()), vec!["1", "2", "3"]);
        assert_eq!(texts(layout.tokens(b.id).unwrap()), vec!["9"]);
    }

    #[test]
    fn test_empty_containers_are_listed_in_order() {
        let containers = vec![Container::new(0.0, 0.0), Container::new(0.0, 200.0)];
        let layout = resolve(&containers, &[]);
        let ids: Vec<_> = layout.iter().map(|(c, _)| c.id).collect();
        assert_eq!(ids, vec![containers[0].id, containers[1].id]);
        assert!(layout.iter().all(|(_, tokens)| tokens.is_empty()));
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let a = Container::new(0.0, 0.0);
        let tokens = vec![token("first", 50.0, &a), token("second", 50.0, &a)];
        let containers = vec![a.clone()];
        let layout = resolve(&containers, &tokens);
        assert_eq!(texts(layout.tokens(a.id).unwrap()), vec!["first", "second"]);
    }

    #[test]
    fn test_unassigned_tokens_are_ignored() {
        let a = Container::new(0.0, 0.0);
        let tokens = vec![
            PlacedToken::new(Symbol::number("1"), 10.0, 10.0),
            PlacedToken::new(Symbol::number("2"), 10.0, 10.0).in_container(ContainerId::new()),
        ];
        let containers = vec![a.clone()];
        let layout = resolve(&containers, &tokens);
        assert!(layout.tokens(a.id).unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn prop_resolve_is_deterministic(
            placements in prop::collection::vec((0usize..3, 0.0f64..500.0), 0..40)
        ) {
            let containers: Vec<Container> =
                (0..3).map(|i| Container::new(0.0, i as f64 * 200.0)).collect();
            let tokens: Vec<PlacedToken> = placements
                .iter()
                .map(|&(c, x)| token("t", x, &containers[c]))
                .collect();

            let first = resolve(&containers, &tokens);
            let second = resolve(&containers, &tokens);
            for container in &containers {
                let a: Vec<_> = first.tokens(container.id).unwrap().iter().map(|t| t.instance_id).collect();
                let b: Vec<_> = second.tokens(container.id).unwrap().iter().map(|t| t.instance_id).collect();
                prop_assert_eq!(&a, &b);

                let xs: Vec<f64> = first.tokens(container.id).unwrap().iter().map(|t| t.x).collect();
                prop_assert!(xs.windows(2).all(|w| w[0] <= w[1]));
            }
        }
    }
}
