use serde::{Deserialize, Serialize};

/// Grid cell index. `x` is the column of the textual layout, `y` its row
/// (row 0 is the first line of the layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: usize,
    pub y: usize,
}

impl GridCoord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// 4-connected neighbours that stay non-negative. Bounds above are the
    /// grid's business.
    pub fn neighbors_4(self) -> impl Iterator<Item = GridCoord> {
        let GridCoord { x, y } = self;
        [
            x.checked_sub(1).map(|nx| GridCoord::new(nx, y)),
            Some(GridCoord::new(x + 1, y)),
            y.checked_sub(1).map(|ny| GridCoord::new(x, ny)),
            Some(GridCoord::new(x, y + 1)),
        ]
        .into_iter()
        .flatten()
    }

    pub fn is_adjacent_4(self, other: GridCoord) -> bool {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) == 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position2D {
    pub x: f64,
    pub y: f64,
}

impl Position2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position2D) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// Ordered world-space waypoints produced by one planning call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WaypointPath {
    pub goal: Option<GridCoord>,
    /// Grid cells from the root to the goal, root included.
    pub cells: Vec<GridCoord>,
    pub waypoints: Vec<Position2D>,
}

impl WaypointPath {
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Position2D> {
        self.waypoints.get(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPolicy {
    /// Farthest unvisited reachable cell.
    Frontier,
    /// Any reachable cell at exactly `goal_distance` hops.
    FixedDistance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathShape {
    OneWay,
    /// Out to the goal and back to the root cell.
    RoundTrip,
}
