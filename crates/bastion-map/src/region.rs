//! Region partition of a map grid.
//!
//! Passable cells are grouped into connected regions no larger than a
//! `REGION_SIZE` square block. Door cells become single-cell portal regions
//! linking the rooms on either side. Walls belong to no region.

use std::collections::VecDeque;

use bitflags::bitflags;
use glam::IVec2;

use bastion_core::constants::REGION_SIZE;

use crate::grid::{MapGrid, Terrain};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub u32);

impl RegionId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Normal,
    Portal,
}

bitflags! {
    /// Region kinds a traversal is allowed to enter.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RegionKindSet: u8 {
        const NORMAL = 0b01;
        const PORTAL = 0b10;
        const ALL = Self::NORMAL.bits() | Self::PORTAL.bits();
    }
}

impl RegionKind {
    pub fn as_set(self) -> RegionKindSet {
        match self {
            RegionKind::Normal => RegionKindSet::NORMAL,
            RegionKind::Portal => RegionKindSet::PORTAL,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Region {
    pub id: RegionId,
    pub kind: RegionKind,
    pub cells: Vec<IVec2>,
    /// Regions sharing an edge with this one, ascending by id.
    pub neighbors: Vec<RegionId>,
}

impl Region {
    pub fn contains(&self, cell: IVec2) -> bool {
        self.cells.contains(&cell)
    }
}

#[derive(Debug, Clone)]
pub struct RegionMap {
    width: i32,
    height: i32,
    regions: Vec<Region>,
    region_of: Vec<Option<RegionId>>,
}

impl RegionMap {
    /// Partition `grid` into regions and link neighbors.
    pub fn build(grid: &MapGrid) -> Self {
        let width = grid.width();
        let height = grid.height();
        let mut region_of: Vec<Option<RegionId>> = vec![None; (width * height) as usize];
        let mut regions: Vec<Region> = Vec::new();

        for y in 0..height {
            for x in 0..width {
                let cell = IVec2::new(x, y);
                let Some(index) = grid.index(cell) else {
                    continue;
                };
                if region_of[index].is_some() {
                    continue;
                }
                let id = RegionId(regions.len() as u32);
                match grid.terrain_at(cell) {
                    Terrain::Wall => continue,
                    Terrain::Door => {
                        region_of[index] = Some(id);
                        regions.push(Region {
                            id,
                            kind: RegionKind::Portal,
                            cells: vec![cell],
                            neighbors: Vec::new(),
                        });
                    }
                    Terrain::Open => {
                        let cells = flood_block(grid, cell, id, &mut region_of);
                        regions.push(Region {
                            id,
                            kind: RegionKind::Normal,
                            cells,
                            neighbors: Vec::new(),
                        });
                    }
                }
            }
        }

        let mut map = Self {
            width,
            height,
            regions,
            region_of,
        };
        map.link_neighbors(grid);
        map
    }

    fn link_neighbors(&mut self, grid: &MapGrid) {
        let mut links: Vec<(RegionId, RegionId)> = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = IVec2::new(x, y);
                let Some(a) = self.region_id_at(cell) else {
                    continue;
                };
                for next in [cell + IVec2::X, cell + IVec2::Y] {
                    if !grid.in_bounds(next) {
                        continue;
                    }
                    if let Some(b) = self.region_id_at(next) {
                        if a != b {
                            links.push((a, b));
                        }
                    }
                }
            }
        }
        for (a, b) in links {
            push_unique(&mut self.regions[a.index()].neighbors, b);
            push_unique(&mut self.regions[b.index()].neighbors, a);
        }
        for region in &mut self.regions {
            region.neighbors.sort();
        }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.index())
    }

    pub fn region_id_at(&self, cell: IVec2) -> Option<RegionId> {
        if cell.x < 0 || cell.y < 0 || cell.x >= self.width || cell.y >= self.height {
            return None;
        }
        self.region_of[(cell.y * self.width + cell.x) as usize]
    }

    pub fn region_at(&self, cell: IVec2) -> Option<&Region> {
        self.region_id_at(cell).and_then(|id| self.get(id))
    }
}

/// Flood-fill open cells connected to `start` within its square block.
fn flood_block(
    grid: &MapGrid,
    start: IVec2,
    id: RegionId,
    region_of: &mut [Option<RegionId>],
) -> Vec<IVec2> {
    let block = block_of(start);
    let mut cells = Vec::new();
    let mut queue = VecDeque::new();
    if let Some(i) = grid.index(start) {
        region_of[i] = Some(id);
    }
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        cells.push(cell);
        for next in grid.neighbors4(cell) {
            if block_of(next) != block || grid.terrain_at(next) != Terrain::Open {
                continue;
            }
            let Some(i) = grid.index(next) else {
                continue;
            };
            if region_of[i].is_none() {
                region_of[i] = Some(id);
                queue.push_back(next);
            }
        }
    }
    cells
}

fn block_of(cell: IVec2) -> IVec2 {
    IVec2::new(
        cell.x.div_euclid(REGION_SIZE),
        cell.y.div_euclid(REGION_SIZE),
    )
}

fn push_unique(list: &mut Vec<RegionId>, id: RegionId) {
    if !list.contains(&id) {
        list.push(id);
    }
}
