//! Loose flee-destination search.
//!
//! Walks reachable cells outward from the agent, nearest first, and returns
//! the first cell at least `min_distance` from every threat. When no such
//! cell is reachable within the search budget the search settles for the
//! reachable cell farthest from the threats, provided it is farther than
//! where the agent already stands.

use std::collections::{HashSet, VecDeque};

use glam::IVec2;

use bastion_core::types::cell_distance;
use bastion_map::MapGrid;

/// Distance from `cell` to the nearest threat.
pub fn threat_clearance(cell: IVec2, threats: &[IVec2]) -> f32 {
    threats
        .iter()
        .map(|t| cell_distance(cell, *t))
        .fold(f32::INFINITY, f32::min)
}

/// Find somewhere for an agent standing at `from` to run to.
///
/// Returns `None` when there is nothing to flee from or no reachable cell
/// improves on the agent's current clearance.
pub fn find_flee_dest(
    grid: &MapGrid,
    from: IVec2,
    threats: &[IVec2],
    min_distance: f32,
    cell_budget: usize,
) -> Option<IVec2> {
    if threats.is_empty() || cell_budget == 0 {
        return None;
    }

    let start_clearance = threat_clearance(from, threats);
    let mut best = (from, start_clearance);
    let mut visited: HashSet<IVec2> = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(from);
    queue.push_back(from);
    let mut examined = 0;

    while let Some(cell) = queue.pop_front() {
        examined += 1;
        let clearance = threat_clearance(cell, threats);
        if clearance >= min_distance {
            return Some(cell);
        }
        if clearance > best.1 {
            best = (cell, clearance);
        }
        if examined >= cell_budget {
            break;
        }
        for next in grid.neighbors8(cell) {
            if grid.passable(next) && visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    (best.1 > start_clearance).then_some(best.0)
}
