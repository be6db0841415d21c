// src/dag/graph.rs

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{trace, warn};

use crate::model::{Event, EventId};
use crate::types::EventStatus;

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone)]
struct DagNode {
    /// Insertion sequence, used to keep `dependents` in creation order.
    seq: u64,
    /// Direct dependencies: events that must complete before this one.
    deps: Vec<EventId>,
    /// Direct dependents: events that list this one as a dependency.
    dependents: Vec<EventId>,
}

/// In-memory adjacency index over the events' dependency lists.
///
/// Edges point from an event to each of its dependencies. The graph holds
/// no statuses; satisfaction checks take a status lookup from the caller.
/// Every repository mutation updates this index in the same step as the
/// event map, so both always describe the same committed state.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: HashMap<EventId, DagNode>,
    next_seq: u64,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from events given in creation order.
    ///
    /// Assumes dependency ids have already been checked (see
    /// [`crate::dag::integrity::check_integrity`]); unknown ids are kept as
    /// forward edges but get no reverse entry.
    pub fn from_events<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut graph = Self::new();

        // First pass: create nodes with their dependency lists.
        let mut order: Vec<EventId> = Vec::new();
        for event in events {
            graph.nodes.insert(
                event.id.clone(),
                DagNode {
                    seq: graph.next_seq,
                    deps: event.dependencies.clone(),
                    dependents: Vec::new(),
                },
            );
            graph.next_seq += 1;
            order.push(event.id.clone());
        }

        // Second pass: populate dependents based on deps, in creation order.
        for id in order {
            let deps = graph
                .nodes
                .get(&id)
                .map(|n| n.deps.clone())
                .unwrap_or_default();

            for dep in deps {
                match graph.nodes.get_mut(&dep) {
                    Some(dep_node) => dep_node.dependents.push(id.clone()),
                    None => warn!(event = %id, dep = %dep, "dependency missing from graph"),
                }
            }
        }

        graph
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Immediate dependencies of an event.
    pub fn dependencies_of(&self, id: &str) -> &[EventId] {
        self.nodes
            .get(id)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of an event, oldest first.
    pub fn dependents_of(&self, id: &str) -> &[EventId] {
        self.nodes
            .get(id)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Add a new node. Its dependencies must already be present.
    pub fn insert_node(&mut self, id: &str, deps: Vec<EventId>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.nodes.insert(
            id.to_string(),
            DagNode {
                seq,
                deps: Vec::new(),
                dependents: Vec::new(),
            },
        );
        self.set_dependencies(id, deps);
    }

    /// Replace the dependency list of `id`, keeping reverse edges in sync.
    pub fn set_dependencies(&mut self, id: &str, deps: Vec<EventId>) {
        let Some(seq) = self.nodes.get(id).map(|n| n.seq) else {
            warn!(event = %id, "set_dependencies on unknown node; ignoring");
            return;
        };

        let old: Vec<EventId> = self
            .nodes
            .get(id)
            .map(|n| n.deps.clone())
            .unwrap_or_default();

        for dep in old.iter().filter(|d| !deps.contains(d)) {
            if let Some(dep_node) = self.nodes.get_mut(dep) {
                dep_node.dependents.retain(|d| d != id);
            }
        }

        for dep in deps.iter().filter(|d| !old.contains(d)) {
            let position = match self.nodes.get(dep) {
                Some(dep_node) => dep_node
                    .dependents
                    .iter()
                    .position(|other| self.seq_of(other) > seq)
                    .unwrap_or(dep_node.dependents.len()),
                None => {
                    warn!(event = %id, dep = %dep, "dependency missing from graph");
                    continue;
                }
            };
            if let Some(dep_node) = self.nodes.get_mut(dep) {
                dep_node.dependents.insert(position, id.to_string());
            }
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.deps = deps;
        }
    }

    /// Remove a node and strip it from its dependents' dependency lists.
    ///
    /// Returns the dependents that lost the edge, oldest first.
    pub fn remove_node(&mut self, id: &str) -> Vec<EventId> {
        let Some(node) = self.nodes.remove(id) else {
            return Vec::new();
        };

        for dep in &node.deps {
            if let Some(dep_node) = self.nodes.get_mut(dep) {
                dep_node.dependents.retain(|d| d != id);
            }
        }

        for dependent in &node.dependents {
            if let Some(dependent_node) = self.nodes.get_mut(dependent) {
                dependent_node.deps.retain(|d| d != id);
            }
        }

        node.dependents
    }

    /// Whether making `id` depend on `new_deps` would close a cycle.
    pub fn would_create_cycle(&self, id: &str, new_deps: &[EventId]) -> bool {
        self.find_cycle(id, new_deps).is_some()
    }

    /// Like [`Self::would_create_cycle`], but returns the offending path as
    /// `id -> dep -> ... -> id`.
    ///
    /// Runs a depth-first search from each candidate dependency along
    /// existing dependency edges, looking for `id`.
    pub fn find_cycle(&self, id: &str, new_deps: &[EventId]) -> Option<Vec<EventId>> {
        let mut visited: HashSet<&str> = HashSet::new();

        for start in new_deps {
            if start == id {
                return Some(vec![id.to_string(), id.to_string()]);
            }

            let mut parent: HashMap<&str, &str> = HashMap::new();
            let mut stack: Vec<&str> = vec![start.as_str()];

            while let Some(current) = stack.pop() {
                if current == id {
                    trace!(event = %id, via = %start, "candidate dependency reaches event");
                    return Some(reconstruct_path(id, start, &parent));
                }
                if !visited.insert(current) {
                    continue;
                }
                for next in self.dependencies_of(current) {
                    if !visited.contains(next.as_str()) {
                        parent.entry(next.as_str()).or_insert(current);
                        stack.push(next.as_str());
                    }
                }
            }
        }

        None
    }

    /// True iff every dependency of `id` is `Completed`.
    ///
    /// `status_of` returns `None` for unknown ids, which count as unsatisfied.
    pub fn is_satisfied<F>(&self, id: &str, status_of: F) -> bool
    where
        F: Fn(&str) -> Option<EventStatus>,
    {
        self.dependencies_of(id).iter().all(|dep| match status_of(dep) {
            Some(EventStatus::Completed) => true,
            Some(_) => false,
            None => {
                warn!(event = %id, dep = %dep, "dependency has no status; treating as unsatisfied");
                false
            }
        })
    }

    /// Every event downstream of `id`, nearest first.
    pub fn transitive_dependents(&self, id: &str) -> Vec<EventId> {
        let mut out = Vec::new();
        let mut seen: HashSet<&str> = HashSet::from([id]);
        let mut queue: VecDeque<&str> = VecDeque::from([id]);

        while let Some(current) = queue.pop_front() {
            for dependent in self.dependents_of(current) {
                if seen.insert(dependent.as_str()) {
                    out.push(dependent.clone());
                    queue.push_back(dependent.as_str());
                }
            }
        }

        out
    }

    fn seq_of(&self, id: &str) -> u64 {
        self.nodes.get(id).map_or(u64::MAX, |n| n.seq)
    }
}

/// Walk parent links back from `id` to `start` and prepend the new edge.
fn reconstruct_path(id: &str, start: &str, parent: &HashMap<&str, &str>) -> Vec<EventId> {
    let mut back: Vec<&str> = vec![id];
    let mut cursor = id;
    while cursor != start {
        match parent.get(cursor) {
            Some(prev) => {
                cursor = prev;
                back.push(cursor);
            }
            None => break,
        }
    }
    back.reverse();

    let mut path = Vec::with_capacity(back.len() + 1);
    path.push(id.to_string());
    path.extend(back.into_iter().map(str::to_string));
    path
}
