//! MapGrid: rectangular cell grid with terrain queries.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// What occupies a cell, as far as movement is concerned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Open,
    Wall,
    Door,
}

impl Terrain {
    pub fn passable(self) -> bool {
        !matches!(self, Terrain::Wall)
    }
}

/// Cell grid, row-major (south-to-north, west-to-east).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapGrid {
    width: i32,
    height: i32,
    cells: Vec<Terrain>,
}

impl MapGrid {
    /// An all-open grid. Dimensions are clamped to at least one cell.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![Terrain::Open; (width * height) as usize],
        }
    }

    /// Parse an ASCII layout: `.` open, `#` wall, `+` door.
    /// The first line is the northernmost row; short rows are padded open.
    pub fn from_ascii(layout: &str) -> Self {
        let rows: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let height = rows.len() as i32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as i32;
        let mut grid = Self::new(width, height);
        for (row, line) in rows.iter().enumerate() {
            let y = height - 1 - row as i32;
            for (x, ch) in line.chars().enumerate() {
                let terrain = match ch {
                    '#' => Terrain::Wall,
                    '+' => Terrain::Door,
                    _ => Terrain::Open,
                };
                grid.set_terrain(IVec2::new(x as i32, y), terrain);
            }
        }
        grid
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    pub(crate) fn index(&self, cell: IVec2) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| (cell.y * self.width + cell.x) as usize)
    }

    /// Terrain at a cell. Out-of-bounds cells read as walls.
    pub fn terrain_at(&self, cell: IVec2) -> Terrain {
        self.index(cell)
            .map(|i| self.cells[i])
            .unwrap_or(Terrain::Wall)
    }

    pub fn set_terrain(&mut self, cell: IVec2, terrain: Terrain) {
        if let Some(i) = self.index(cell) {
            self.cells[i] = terrain;
        }
    }

    pub fn passable(&self, cell: IVec2) -> bool {
        self.terrain_at(cell).passable()
    }

    /// In-bounds cells within `radius` of `center` (inclusive), nearest first.
    pub fn radial_cells(&self, center: IVec2, radius: f32) -> Vec<IVec2> {
        if radius < 0.0 {
            return Vec::new();
        }
        // Scan only the part of the bounding box that lies on the grid.
        let reach = (radius.floor() as i64).min(i64::from(self.width + self.height));
        let (cx, cy) = (i64::from(center.x), i64::from(center.y));
        let x_range = (cx - reach).max(0)..=(cx + reach).min(i64::from(self.width) - 1);
        let y_range = (cy - reach).max(0)..=(cy + reach).min(i64::from(self.height) - 1);
        let r_sq = f64::from(radius) * f64::from(radius);
        let dist_sq = |x: i64, y: i64| (x - cx).pow(2) + (y - cy).pow(2);

        let mut cells = Vec::new();
        for y in y_range {
            for x in x_range.clone() {
                if dist_sq(x, y) as f64 <= r_sq {
                    cells.push((dist_sq(x, y), IVec2::new(x as i32, y as i32)));
                }
            }
        }
        cells.sort_by_key(|(d, c)| (*d, c.y, c.x));
        cells.into_iter().map(|(_, c)| c).collect()
    }

    /// Orthogonal neighbors inside the grid.
    pub fn neighbors4(&self, cell: IVec2) -> impl Iterator<Item = IVec2> + '_ {
        [IVec2::X, IVec2::Y, IVec2::NEG_X, IVec2::NEG_Y]
            .into_iter()
            .map(move |d| cell + d)
            .filter(|c| self.in_bounds(*c))
    }

    /// All eight neighbors inside the grid.
    pub fn neighbors8(&self, cell: IVec2) -> impl Iterator<Item = IVec2> + '_ {
        const DIRS: [IVec2; 8] = [
            IVec2::new(1, 0),
            IVec2::new(0, 1),
            IVec2::new(-1, 0),
            IVec2::new(0, -1),
            IVec2::new(1, 1),
            IVec2::new(-1, 1),
            IVec2::new(-1, -1),
            IVec2::new(1, -1),
        ];
        DIRS.into_iter()
            .map(move |d| cell + d)
            .filter(|c| self.in_bounds(*c))
    }
}
