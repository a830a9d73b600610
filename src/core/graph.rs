use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

use crate::config::CollisionPolicy;
use crate::error::{ClassdotError, Result};
use super::declaration::{Declaration, Edge};

/// The assembled diagram: named nodes plus deduplicated directed edges.
/// Built exactly once per run, after the complete declaration and edge
/// sets are known. BTree collections keep iteration order stable so
/// serialization is deterministic.
#[derive(Debug, Clone)]
pub struct Graph {
    pub nodes: BTreeMap<String, Declaration>,
    pub edges: BTreeSet<Edge>,
}

/// Combines declarations and inferred edges into one graph, enforcing
/// node-name uniqueness and dropping edges whose endpoints are unknown.
pub struct GraphAssembler {
    collision_policy: CollisionPolicy,
}

impl GraphAssembler {
    pub fn new(collision_policy: CollisionPolicy) -> Self {
        Self { collision_policy }
    }

    pub fn assemble(&self, declarations: Vec<Declaration>, edges: Vec<Edge>) -> Result<Graph> {
        let mut nodes: BTreeMap<String, Declaration> = BTreeMap::new();

        for declaration in declarations {
            if let Some(existing) = nodes.get(&declaration.name) {
                match self.collision_policy {
                    CollisionPolicy::FirstWins => {
                        warn!(
                            "Duplicate declaration {} in {} ignored (first seen in {})",
                            declaration.name,
                            declaration.path.display(),
                            existing.path.display()
                        );
                        continue;
                    }
                    CollisionPolicy::Error => {
                        return Err(ClassdotError::Graph(format!(
                            "{} declared in both {} and {}",
                            declaration.name,
                            existing.path.display(),
                            declaration.path.display()
                        )));
                    }
                }
            }
            nodes.insert(declaration.name.clone(), declaration);
        }

        // One edge per ordered pair: a metadata-driven containment edge
        // wins over a coinciding heuristic reference
        let mut kept: BTreeMap<(String, String), Edge> = BTreeMap::new();
        for edge in edges {
            if !nodes.contains_key(&edge.from) || !nodes.contains_key(&edge.to) {
                warn!("Dropping dangling edge {} -> {}", edge.from, edge.to);
                continue;
            }
            let key = (edge.from.clone(), edge.to.clone());
            match kept.get(&key) {
                Some(existing) if existing.kind <= edge.kind => {}
                _ => {
                    kept.insert(key, edge);
                }
            }
        }

        Ok(Graph {
            nodes,
            edges: kept.into_values().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::declaration::DeclarationKind;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn class(name: &str, path: &str) -> Declaration {
        Declaration {
            kind: DeclarationKind::Class,
            name: name.to_string(),
            path: PathBuf::from(path),
            annotations: BTreeSet::new(),
            members: vec![],
            declared_members: vec![],
        }
    }

    #[test]
    fn test_first_wins_keeps_one_node_per_name() {
        let assembler = GraphAssembler::new(CollisionPolicy::FirstWins);
        let graph = assembler
            .assemble(vec![class("A", "a.ts"), class("A", "other/a.ts")], vec![])
            .unwrap();

        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes["A"].path, PathBuf::from("a.ts"));
    }

    #[test]
    fn test_error_policy_rejects_collisions() {
        let assembler = GraphAssembler::new(CollisionPolicy::Error);
        let result = assembler.assemble(vec![class("A", "a.ts"), class("A", "other/a.ts")], vec![]);
        assert!(matches!(result, Err(ClassdotError::Graph(_))));
    }

    #[test]
    fn test_dangling_edges_are_dropped() {
        let assembler = GraphAssembler::new(CollisionPolicy::FirstWins);
        let graph = assembler
            .assemble(
                vec![class("A", "a.ts"), class("B", "b.ts")],
                vec![
                    Edge::reference("A", "B"),
                    Edge::reference("A", "Missing"),
                    Edge::containment("Ghost", "B"),
                ],
            )
            .unwrap();

        assert_eq!(graph.edges.len(), 1);
        assert!(graph.edges.contains(&Edge::reference("A", "B")));
    }

    #[test]
    fn test_coinciding_containment_and_reference_collapse() {
        let assembler = GraphAssembler::new(CollisionPolicy::FirstWins);
        // Reference first, so precedence is not an artifact of input order
        let graph = assembler
            .assemble(
                vec![class("AppModule", "app.module.ts"), class("FooComponent", "foo.ts")],
                vec![
                    Edge::reference("AppModule", "FooComponent"),
                    Edge::containment("AppModule", "FooComponent"),
                ],
            )
            .unwrap();

        assert_eq!(graph.edges.len(), 1);
        let edge = graph.edges.iter().next().unwrap();
        assert_eq!(edge.kind, crate::core::declaration::EdgeKind::Containment);
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let assembler = GraphAssembler::new(CollisionPolicy::FirstWins);
        let graph = assembler
            .assemble(
                vec![class("A", "a.ts"), class("B", "b.ts")],
                vec![Edge::reference("A", "B"), Edge::reference("A", "B")],
            )
            .unwrap();

        assert_eq!(graph.edges.len(), 1);
    }
}
