//! # Minimap Projection
//!
//! Top-down snapshot of the generated cells around the observer.
//!
//! The projector only reads the grid: it walks a small square around the
//! observer with non-creating lookups and never forces generation. The
//! resulting [`MinimapSnapshot`] can be laid out in pixels with
//! [`MinimapLayout`] or printed as text.

use crate::grid::{CellCoord, CellStore, Direction, MazeGrid, Passages};
use serde::{Deserialize, Serialize};

/// One generated cell as seen by the minimap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimapCell {
    /// Offset from the observer's cell
    pub dx: i32,
    pub dz: i32,
    pub visited: bool,
    pub passages: Passages,
}

/// Everything a minimap needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimapSnapshot {
    /// The observer's cell
    pub center: CellCoord,
    /// Half side of the square that was scanned
    pub radius: i32,
    /// Observer yaw in radians
    pub heading: f64,
    /// Generated cells inside the square, row by row from the north
    pub cells: Vec<MinimapCell>,
}

impl MinimapSnapshot {
    /// The cell at offset `(dx, dz)`, if it was generated.
    pub fn cell_at(&self, dx: i32, dz: i32) -> Option<&MinimapCell> {
        self.cells.iter().find(|cell| cell.dx == dx && cell.dz == dz)
    }

    /// Arrow for the cardinal direction nearest to the heading.
    pub fn heading_glyph(&self) -> char {
        let (fx, fz) = (-self.heading.sin(), -self.heading.cos());
        if fx.abs() > fz.abs() {
            if fx > 0.0 {
                '>'
            } else {
                '<'
            }
        } else if fz < 0.0 {
            '^'
        } else {
            'v'
        }
    }

    /// Renders the snapshot as text, three characters square per cell.
    ///
    /// North is up. Visited cells show `o`, others `.`; passages are drawn
    /// as stubs reaching the neighboring cell and the observer is an arrow.
    /// Cells offset beyond `radius` are skipped.
    pub fn to_ascii(&self) -> String {
        let side = (2 * self.radius + 1).max(0) as usize * 3;
        let mut canvas = vec![vec![' '; side]; side];

        for cell in &self.cells {
            // Cells outside the scanned square have no place on the canvas
            if cell.dx.abs() > self.radius || cell.dz.abs() > self.radius {
                continue;
            }
            let column = (cell.dx + self.radius) as usize * 3 + 1;
            let row = (cell.dz + self.radius) as usize * 3 + 1;
            canvas[row][column] = if cell.dx == 0 && cell.dz == 0 {
                self.heading_glyph()
            } else if cell.visited {
                'o'
            } else {
                '.'
            };
            for direction in cell.passages.iter() {
                let (x, z) = direction.delta();
                let glyph = match direction {
                    Direction::North | Direction::South => '|',
                    Direction::East | Direction::West => '-',
                };
                let stub_row = (row as i32 + z) as usize;
                let stub_column = (column as i32 + x) as usize;
                canvas[stub_row][stub_column] = glyph;
            }
        }

        canvas
            .into_iter()
            .map(|line| line.into_iter().collect::<String>().trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Reads the grid into minimap snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimapProjector {
    /// Half side, in cells, of the scanned square
    pub radius: i32,
}

impl MinimapProjector {
    /// Creates a projector scanning `radius` cells around the observer.
    pub fn new(radius: i32) -> Self {
        Self { radius }
    }

    /// Snapshots the generated cells around `center`.
    pub fn project<S: CellStore>(
        &self,
        grid: &MazeGrid<S>,
        center: CellCoord,
        heading: f64,
    ) -> MinimapSnapshot {
        let mut cells = Vec::new();
        for dz in -self.radius..=self.radius {
            for dx in -self.radius..=self.radius {
                let coord = CellCoord::new(center.x + dx, center.z + dz);
                if let Some(cell) = grid.get_existing(coord).filter(|cell| cell.is_generated()) {
                    cells.push(MinimapCell {
                        dx,
                        dz,
                        visited: cell.is_visited(),
                        passages: cell.passages(),
                    });
                }
            }
        }
        MinimapSnapshot {
            center,
            radius: self.radius,
            heading,
            cells,
        }
    }
}

impl Default for MinimapProjector {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MINIMAP_RADIUS)
    }
}

/// Pixel layout of a square minimap canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapLayout {
    /// Canvas side in pixels
    pub size: f64,
    /// Pixels per cell
    pub cell_pixel: f64,
}

impl MinimapLayout {
    /// Fits `2 * radius + 1` cells plus a half-cell border into `size` pixels.
    pub fn new(size: f64, radius: i32) -> Self {
        Self {
            size,
            cell_pixel: size / f64::from(radius * 2 + 2),
        }
    }

    /// Pixel position of the center of the cell at offset `(dx, dz)`.
    pub fn cell_center(&self, dx: i32, dz: i32) -> (f64, f64) {
        let offset = self.size / 2.0;
        (
            offset + f64::from(dx) * self.cell_pixel,
            offset + f64::from(dz) * self.cell_pixel,
        )
    }

    /// Cell square as `(left, top, width, height)`, 80% of a cell wide.
    pub fn cell_rect(&self, dx: i32, dz: i32) -> (f64, f64, f64, f64) {
        let (x, y) = self.cell_center(dx, dz);
        let inset = self.cell_pixel * 0.4;
        (x - inset, y - inset, inset * 2.0, inset * 2.0)
    }

    /// Line segment drawn for an open passage, from the cell edge outwards.
    pub fn passage_stub(&self, dx: i32, dz: i32, direction: Direction) -> [(f64, f64); 2] {
        let (x, y) = self.cell_center(dx, dz);
        let (ux, uy) = direction.delta();
        let (ux, uy) = (f64::from(ux), f64::from(uy));
        let near = self.cell_pixel * 0.4;
        let far = self.cell_pixel * 0.9;
        [
            (x + ux * near, y + uy * near),
            (x + ux * far, y + uy * far),
        ]
    }

    /// Triangle marking the observer, pointing along `yaw`.
    pub fn heading_marker(&self, yaw: f64) -> [(f64, f64); 3] {
        let offset = self.size / 2.0;
        let (sin, cos) = (-yaw).sin_cos();
        [(0.0, -8.0), (6.0, 8.0), (-6.0, 8.0)].map(|(x, y)| {
            (offset + x * cos - y * sin, offset + x * sin + y * cos)
        })
    }
}
