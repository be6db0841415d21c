// src/dag/integrity.rs

//! Startup check for events loaded from a store.
//!
//! The repository never commits a dangling reference or a cycle, but a
//! store can be edited behind its back. Loading refuses such data instead
//! of running cascades over a broken graph.

use std::collections::HashSet;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{Result, SchedulerError};
use crate::model::Event;

pub fn check_integrity(events: &[Event]) -> Result<()> {
    check_unique_ids(events)?;
    check_references(events)?;
    check_acyclic(events)?;
    Ok(())
}

fn check_unique_ids(events: &[Event]) -> Result<()> {
    let mut seen = HashSet::new();
    for event in events {
        if !seen.insert(event.id.as_str()) {
            return Err(SchedulerError::Integrity(format!(
                "duplicate event id '{}'",
                event.id
            )));
        }
    }
    Ok(())
}

fn check_references(events: &[Event]) -> Result<()> {
    let ids: HashSet<&str> = events.iter().map(|e| e.id.as_str()).collect();

    for event in events {
        for dep in &event.dependencies {
            if dep == &event.id {
                return Err(SchedulerError::Integrity(format!(
                    "event '{}' depends on itself",
                    event.id
                )));
            }
            if !ids.contains(dep.as_str()) {
                return Err(SchedulerError::Integrity(format!(
                    "event '{}' has unknown dependency '{}'",
                    event.id, dep
                )));
            }
        }
    }
    Ok(())
}

fn check_acyclic(events: &[Event]) -> Result<()> {
    // Edge direction: dep -> event.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for event in events {
        graph.add_node(event.id.as_str());
    }

    for event in events {
        for dep in &event.dependencies {
            graph.add_edge(dep.as_str(), event.id.as_str(), ());
        }
    }

    // A topological sort will fail if there is a cycle.
    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(SchedulerError::Integrity(format!(
            "dependency cycle involving event '{}'",
            cycle.node_id()
        ))),
    }
}
