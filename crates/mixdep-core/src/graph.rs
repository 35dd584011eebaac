//! Whole-registry dependency validation using `petgraph`.
//!
//! Resolution only walks the aliases a component actually references, so
//! a registration mistake in a rarely-used mixin can sit unnoticed.
//! [`Registry::validate`] audits the complete registry up front: every
//! declared dependency must be registered and the dependency graph must
//! be acyclic.

use std::collections::HashMap;

use mixdep_common::error::{MixdepError, Result};
use petgraph::graph::NodeIndex;

use crate::registry::Registry;

impl<M> Registry<M> {
    /// Audits every registered entry and returns a dependency-first
    /// topological ordering of all aliases.
    ///
    /// Dependencies appear before the aliases that depend on them. The
    /// graph edge points from dependency to dependent so that
    /// `petgraph::algo::toposort` yields dependencies first.
    ///
    /// # Errors
    ///
    /// Returns [`MixdepError::UnknownAlias`] if any entry declares a
    /// dependency on an unregistered alias, or
    /// [`MixdepError::CircularDependency`] naming the members of the
    /// first strongly connected component if the graph contains a cycle.
    pub fn validate(&self) -> Result<Vec<String>> {
        tracing::debug!(aliases = self.len(), "validating mixin registry");
        let mut graph: petgraph::Graph<String, ()> = petgraph::Graph::new();
        let mut indices: HashMap<&str, NodeIndex> = HashMap::new();

        for alias in self.aliases() {
            let idx = graph.add_node(alias.to_owned());
            let _ = indices.insert(alias, idx);
        }

        for alias in self.aliases() {
            let Some(entry) = self.get(alias) else {
                continue;
            };
            let Some(&dependent) = indices.get(alias) else {
                continue;
            };
            for dep in &entry.depends_on {
                let dependency =
                    *indices
                        .get(dep.as_str())
                        .ok_or_else(|| MixdepError::UnknownAlias {
                            alias: dep.clone(),
                        })?;
                let _ = graph.add_edge(dependency, dependent, ());
            }
        }

        match petgraph::algo::toposort(&graph, None) {
            Ok(order) => Ok(order
                .iter()
                .filter_map(|&idx| graph.node_weight(idx).cloned())
                .collect()),
            Err(_) => Err(MixdepError::CircularDependency {
                path: cycle_members(&graph),
            }),
        }
    }
}

/// Names the members of the first strongly connected component that
/// forms a cycle, closed by repeating the first member.
fn cycle_members(graph: &petgraph::Graph<String, ()>) -> Vec<String> {
    for scc in petgraph::algo::tarjan_scc(graph) {
        let is_cycle = scc.len() > 1
            || (scc.len() == 1 && graph.find_edge(scc[0], scc[0]).is_some());
        if is_cycle {
            let mut path: Vec<String> = scc
                .iter()
                .filter_map(|&idx| graph.node_weight(idx).cloned())
                .collect();
            if let Some(first) = path.first().cloned() {
                path.push(first);
            }
            return path;
        }
    }
    Vec::new()
}
