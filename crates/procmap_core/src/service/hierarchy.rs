//! Page-local hierarchy reconstruction.
//!
//! # Invariants
//! - A process is nested under its parent only when both are in `page`;
//!   a process whose parent lies outside the page is a top-level entry.
//! - Fetched order is preserved at every level.
//! - Every input process appears exactly once in the output.

use crate::model::process::{Process, ProcessNode};
use std::collections::{HashMap, HashSet};

/// Re-nests one fetched page of processes.
pub fn nest_page(page: Vec<Process>) -> Vec<ProcessNode> {
    let index: HashMap<_, _> = page
        .iter()
        .enumerate()
        .map(|(position, process)| (process.id, position))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); page.len()];
    let mut roots = Vec::new();
    for (position, process) in page.iter().enumerate() {
        match process.parent_id.and_then(|parent_id| index.get(&parent_id)) {
            Some(&parent) if parent != position => children[parent].push(position),
            _ => roots.push(position),
        }
    }

    let mut slots: Vec<Option<Process>> = page.into_iter().map(Some).collect();
    let mut placed = HashSet::new();
    let mut nodes: Vec<ProcessNode> = roots
        .into_iter()
        .filter_map(|root| build(root, &children, &mut slots, &mut placed))
        .collect();

    // Stored data should be acyclic; anything only reachable through a cycle
    // is surfaced at top level instead of being dropped.
    for position in 0..slots.len() {
        if let Some(node) = build(position, &children, &mut slots, &mut placed) {
            nodes.push(node);
        }
    }
    nodes
}

fn build(
    position: usize,
    children: &[Vec<usize>],
    slots: &mut [Option<Process>],
    placed: &mut HashSet<usize>,
) -> Option<ProcessNode> {
    if !placed.insert(position) {
        return None;
    }
    let process = slots[position].take()?;
    let nested = children[position]
        .iter()
        .filter_map(|&child| build(child, children, slots, placed))
        .collect();
    Some(ProcessNode {
        process,
        children: nested,
    })
}
