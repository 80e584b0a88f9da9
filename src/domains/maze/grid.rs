use serde::{Deserialize, Serialize};

use super::types::{GridCoord, Position2D};
use crate::common::{DomainError, DomainResult};
use crate::config::MazeConfig;

pub const DEFAULT_WALL_SYMBOL: char = '*';
pub const DEFAULT_CELL_SIZE: f64 = 100.0;

/// Static occupancy grid parsed from a textual wall layout.
///
/// Row 0 of the layout maps to the highest world-Y row; `to_world` and
/// `to_grid` apply that vertical mirroring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MazeGrid {
    width: usize,
    height: usize,
    cell_size: f64,
    /// Row-major, `true` for walls.
    walls: Vec<bool>,
}

impl MazeGrid {
    pub fn parse(layout: &str, wall_symbol: char, cell_size: f64) -> DomainResult<Self> {
        if !(cell_size > 0.0) {
            return Err(DomainError::InvalidInput {
                reason: format!("cell size must be positive, got {}", cell_size),
            });
        }

        let lines: Vec<&str> = layout.lines().collect();
        let first = lines.iter().position(|l| !l.trim().is_empty());
        let last = lines.iter().rposition(|l| !l.trim().is_empty());
        let rows = match (first, last) {
            (Some(first), Some(last)) => &lines[first..=last],
            _ => {
                return Err(DomainError::InvalidInput {
                    reason: "maze layout is empty".to_string(),
                })
            }
        };

        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut walls = vec![false; width * height];
        for (y, row) in rows.iter().enumerate() {
            for (x, symbol) in row.chars().enumerate() {
                if symbol == wall_symbol {
                    walls[y * width + x] = true;
                }
            }
        }

        Ok(Self {
            width,
            height,
            cell_size,
            walls,
        })
    }

    pub fn from_config(layout: &str, config: &MazeConfig) -> DomainResult<Self> {
        Self::parse(layout, config.wall_symbol, config.cell_size)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn cell_count(&self) -> usize {
        self.walls.len()
    }

    pub fn contains(&self, cell: GridCoord) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    pub fn index(&self, cell: GridCoord) -> usize {
        cell.y * self.width + cell.x
    }

    pub fn coord(&self, index: usize) -> GridCoord {
        GridCoord::new(index % self.width, index / self.width)
    }

    /// Out-of-bounds cells count as walls.
    pub fn is_wall(&self, cell: GridCoord) -> bool {
        !self.contains(cell) || self.walls[self.index(cell)]
    }

    pub fn is_free(&self, cell: GridCoord) -> bool {
        !self.is_wall(cell)
    }

    pub fn free_cells(&self) -> impl Iterator<Item = GridCoord> + '_ {
        (0..self.walls.len())
            .filter(|&i| !self.walls[i])
            .map(|i| self.coord(i))
    }

    pub fn free_cell_count(&self) -> usize {
        self.walls.iter().filter(|w| !**w).count()
    }

    pub fn wall_mask(&self) -> &[bool] {
        &self.walls
    }

    /// Free 4-connected neighbours, in left/right/up/down order.
    pub fn free_neighbors(&self, cell: GridCoord) -> impl Iterator<Item = GridCoord> + '_ {
        cell.neighbors_4().filter(move |n| self.is_free(*n))
    }

    /// World-space centre of a cell.
    pub fn to_world(&self, cell: GridCoord) -> Position2D {
        let mirrored_y = self.height - cell.y - 1;
        Position2D {
            x: (cell.x as f64 + 0.5) * self.cell_size,
            y: (mirrored_y as f64 + 0.5) * self.cell_size,
        }
    }

    /// Cell containing a world-space position.
    pub fn to_grid(&self, position: Position2D) -> DomainResult<GridCoord> {
        let gx = (position.x / self.cell_size).floor();
        let gy = (position.y / self.cell_size).floor();
        if !gx.is_finite()
            || !gy.is_finite()
            || gx < 0.0
            || gy < 0.0
            || gx >= self.width as f64
            || gy >= self.height as f64
        {
            return Err(DomainError::OutOfBounds {
                x: position.x,
                y: position.y,
            });
        }
        let row = gy as usize;
        Ok(GridCoord::new(gx as usize, self.height - row - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = "
*****
*  P*
* * *
*   *
*****
";

    #[test]
    fn parses_walls_and_dimensions() {
        let grid = MazeGrid::parse(LAYOUT, '*', 100.0).unwrap();
        assert_eq!(grid.width(), 5);
        assert_eq!(grid.height(), 5);
        assert!(grid.is_wall(GridCoord::new(0, 0)));
        assert!(grid.is_free(GridCoord::new(1, 1)));
        assert!(grid.is_wall(GridCoord::new(2, 2)));
        assert!(grid.is_free(GridCoord::new(3, 1)));
        assert_eq!(grid.free_cell_count(), 8);
    }

    #[test]
    fn short_rows_are_padded_with_free_cells() {
        let grid = MazeGrid::parse("***\n*\n***", '*', 1.0).unwrap();
        assert_eq!(grid.width(), 3);
        assert!(grid.is_free(GridCoord::new(2, 1)));
    }

    #[test]
    fn empty_layout_is_rejected() {
        assert!(matches!(
            MazeGrid::parse("\n  \n", '*', 100.0),
            Err(DomainError::InvalidInput { .. })
        ));
    }

    #[test]
    fn first_layout_row_is_highest_world_row() {
        let grid = MazeGrid::parse(LAYOUT, '*', 100.0).unwrap();
        let top = grid.to_world(GridCoord::new(1, 0));
        assert_eq!(top, Position2D::new(150.0, 450.0));
        let bottom = grid.to_world(GridCoord::new(1, 4));
        assert_eq!(bottom, Position2D::new(150.0, 50.0));
    }

    #[test]
    fn to_grid_truncates_inside_a_cell() {
        let grid = MazeGrid::parse(LAYOUT, '*', 100.0).unwrap();
        assert_eq!(
            grid.to_grid(Position2D::new(199.9, 301.0)).unwrap(),
            GridCoord::new(1, 1)
        );
    }

    #[test]
    fn to_grid_rejects_outside_positions() {
        let grid = MazeGrid::parse(LAYOUT, '*', 100.0).unwrap();
        assert!(matches!(
            grid.to_grid(Position2D::new(-1.0, 10.0)),
            Err(DomainError::OutOfBounds { .. })
        ));
        assert!(grid.to_grid(Position2D::new(10.0, 500.0)).is_err());
    }
}
