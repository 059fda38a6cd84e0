//! Cycle detection and dependency-depth leveling

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use super::graph::{Dependence, Node, NodeId};

/// Nodes sharing the same count of eligible transitive dependencies.
pub type Level = Vec<NodeId>;

/// A dependency path; each step pairs an edge with the node owning it.
type Path<'a> = Vec<(NodeId, &'a Dependence)>;

/// One hop of a circular reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    /// Referencing field
    pub field: String,
    /// Display name of the object the field refers to
    pub object: String,
}

/// A dependency cycle that makes start/stop ordering impossible.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct CycleError {
    hops: Vec<Hop>,
}

impl CycleError {
    fn from_path(nodes: &[Node], path: &Path<'_>) -> Self {
        let hops = path
            .iter()
            .map(|(_, dep)| Hop {
                field: dep.field.clone(),
                object: nodes[dep.object.index()].to_string(),
            })
            .collect();
        Self { hops }
    }

    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "circular reference detected from")?;
        let single = self.hops.len() == 1;
        for hop in &self.hops {
            f.write_str(if single { " " } else { "\n" })?;
            write!(f, "field {} in {}", hop.field, hop.object)?;
        }
        match self.hops.first() {
            Some(_) if single => write!(f, " to itself"),
            Some(first) => write!(f, "\nfield {} in {}", first.field, first.object),
            None => Ok(()),
        }
    }
}

/// Every path of dependency edges leading from `from` back to `to`.
///
/// Nodes other than `to` are visited at most once across the whole search;
/// `seen` ends up holding every node reachable from `from` except `to`.
fn all_paths<'a>(
    nodes: &'a [Node],
    from: NodeId,
    to: NodeId,
    seen: &mut HashSet<NodeId>,
) -> Vec<Path<'a>> {
    if from != to && !seen.insert(from) {
        return Vec::new();
    }

    let mut paths = Vec::new();
    for dep in nodes[from.index()].dependencies() {
        if dep.object == to {
            paths.push(vec![(from, dep)]);
            continue;
        }
        for tail in all_paths(nodes, dep.object, to, seen) {
            let mut path = Vec::with_capacity(tail.len() + 1);
            path.push((from, dep));
            path.extend(tail);
            paths.push(path);
        }
    }
    paths
}

/// Reject cycles through `id` that involve more than one eligible node,
/// returning the set of nodes `id` transitively depends on.
pub(crate) fn dependencies_of(nodes: &[Node], id: NodeId) -> Result<HashSet<NodeId>, CycleError> {
    let mut deps = HashSet::new();
    for path in all_paths(nodes, id, id, &mut deps) {
        if path.len() == 1 {
            return Err(CycleError::from_path(nodes, &path));
        }

        // a cycle through a single start/stop object is not an ordering problem
        let eligible = path
            .iter()
            .filter(|(from, _)| nodes[from.index()].is_eligible())
            .count();
        if eligible > 1 {
            return Err(CycleError::from_path(nodes, &path));
        }
    }
    Ok(deps)
}

/// Group the eligible members of `subset` by eligible dependency count.
///
/// Only dependencies that are themselves members of `subset` are counted.
/// Returned pairs are `(count, level)`, highest count first.
pub(crate) fn keyed_levels(
    nodes: &[Node],
    subset: &[NodeId],
) -> Result<Vec<(usize, Level)>, CycleError> {
    let members: HashSet<NodeId> = subset.iter().copied().collect();
    let mut buckets: BTreeMap<usize, Level> = BTreeMap::new();

    for &id in subset {
        if !nodes[id.index()].is_eligible() {
            continue;
        }

        let deps = dependencies_of(nodes, id)?;
        let count = deps
            .iter()
            .filter(|dep| members.contains(dep) && nodes[dep.index()].is_eligible())
            .count();
        buckets.entry(count).or_default().push(id);
    }

    Ok(buckets.into_iter().rev().collect())
}

/// Levels of the eligible members of `subset`, most dependencies first.
///
/// Start walks the result from the back, stop walks it from the front.
pub(crate) fn levels(nodes: &[Node], subset: &[NodeId]) -> Result<Vec<Level>, CycleError> {
    Ok(keyed_levels(nodes, subset)?
        .into_iter()
        .map(|(_, level)| level)
        .collect())
}
