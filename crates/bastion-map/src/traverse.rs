//! Breadth-first traversal over the region graph.

use std::collections::VecDeque;

use glam::IVec2;

use crate::region::{Region, RegionKindSet, RegionMap};

impl RegionMap {
    /// Visit regions breadth-first starting from the one containing `root`.
    ///
    /// `entry(from, to)` decides whether the traversal may cross into `to`;
    /// `processor(region)` returns true to stop early. At most `max_regions`
    /// regions are processed and only regions whose kind is in `kinds` are
    /// entered (the root included). Returns the number of regions processed.
    pub fn breadth_first_traverse<E, P>(
        &self,
        root: IVec2,
        mut entry: E,
        mut processor: P,
        max_regions: usize,
        kinds: RegionKindSet,
    ) -> usize
    where
        E: FnMut(&Region, &Region) -> bool,
        P: FnMut(&Region) -> bool,
    {
        let Some(start) = self.region_at(root) else {
            return 0;
        };
        if max_regions == 0 || !kinds.contains(start.kind.as_set()) {
            return 0;
        }

        let mut visited = vec![false; self.len()];
        let mut queue = VecDeque::new();
        visited[start.id.index()] = true;
        queue.push_back(start.id);
        let mut processed = 0;

        while let Some(id) = queue.pop_front() {
            let Some(region) = self.get(id) else {
                continue;
            };
            processed += 1;
            if processor(region) || processed >= max_regions {
                break;
            }
            for &next_id in &region.neighbors {
                if visited[next_id.index()] {
                    continue;
                }
                let Some(next) = self.get(next_id) else {
                    continue;
                };
                if kinds.contains(next.kind.as_set()) && entry(region, next) {
                    visited[next_id.index()] = true;
                    queue.push_back(next_id);
                }
            }
        }
        processed
    }
}
