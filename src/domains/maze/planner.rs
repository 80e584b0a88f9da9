use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use super::grid::MazeGrid;
use super::types::{GoalPolicy, GridCoord, PathShape, Position2D, WaypointPath};
use crate::common::{DomainError, DomainResult};
use crate::config::PlannerConfig;

/// BFS hop distances from a root cell over 4-connected free cells.
#[derive(Debug, Clone)]
pub struct DistanceField {
    root: GridCoord,
    width: usize,
    distances: Vec<Option<u32>>,
}

impl DistanceField {
    pub fn compute(grid: &MazeGrid, root: GridCoord) -> DomainResult<Self> {
        if grid.is_wall(root) {
            return Err(DomainError::InvalidStart { cell: root });
        }

        let mut distances = vec![None; grid.cell_count()];
        distances[grid.index(root)] = Some(0);
        let mut queue = VecDeque::from([root]);

        while let Some(node) = queue.pop_front() {
            let next = distances[grid.index(node)].map_or(0, |d| d + 1);
            for neighbor in grid.free_neighbors(node) {
                let slot = &mut distances[grid.index(neighbor)];
                if slot.is_none() {
                    *slot = Some(next);
                    queue.push_back(neighbor);
                }
            }
        }

        Ok(Self {
            root,
            width: grid.width(),
            distances,
        })
    }

    pub fn root(&self) -> GridCoord {
        self.root
    }

    /// `None` for walls and cells outside the root's component.
    pub fn get(&self, cell: GridCoord) -> Option<u32> {
        if cell.x >= self.width {
            return None;
        }
        self.distances
            .get(cell.y * self.width + cell.x)
            .copied()
            .flatten()
    }

    pub fn reachable(&self) -> impl Iterator<Item = (GridCoord, u32)> + '_ {
        let width = self.width;
        self.distances
            .iter()
            .enumerate()
            .filter_map(move |(i, d)| d.map(|d| (GridCoord::new(i % width, i / width), d)))
    }

    pub fn reachable_count(&self) -> usize {
        self.distances.iter().filter(|d| d.is_some()).count()
    }

    pub fn max_distance(&self) -> u32 {
        self.distances.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Walk downhill from `goal` to the root, always stepping to the
    /// neighbour with the smallest distance. Returns cells root-first.
    pub fn descend(&self, grid: &MazeGrid, goal: GridCoord) -> DomainResult<Vec<GridCoord>> {
        let Some(goal_distance) = self.get(goal) else {
            return Err(DomainError::InvalidInput {
                reason: format!("goal ({}, {}) is not reachable from the root", goal.x, goal.y),
            });
        };

        let mut cells = Vec::with_capacity(goal_distance as usize + 1);
        let mut current = goal;
        cells.push(current);
        while current != self.root {
            current = grid
                .free_neighbors(current)
                .filter_map(|n| self.get(n).map(|d| (n, d)))
                .min_by_key(|&(_, d)| d)
                .map(|(n, _)| n)
                .ok_or_else(|| {
                    DomainError::InvalidInput {
                        reason: format!("distance field broken at ({}, {})", current.x, current.y),
                    }
                })?;
            cells.push(current);
        }
        cells.reverse();
        Ok(cells)
    }
}

/// Cells already used as planning goals in the current episode. Walls are
/// permanently marked.
#[derive(Debug, Clone)]
pub struct VisitedSet {
    visited: Vec<bool>,
    walls: Vec<bool>,
}

impl VisitedSet {
    pub fn new(grid: &MazeGrid) -> Self {
        let walls = grid.wall_mask().to_vec();
        Self {
            visited: walls.clone(),
            walls,
        }
    }

    pub fn is_visited(&self, grid: &MazeGrid, cell: GridCoord) -> bool {
        !grid.contains(cell) || self.visited[grid.index(cell)]
    }

    pub fn mark(&mut self, grid: &MazeGrid, cell: GridCoord) {
        if grid.contains(cell) {
            self.visited[grid.index(cell)] = true;
        }
    }

    pub fn reset(&mut self) {
        self.visited.copy_from_slice(&self.walls);
    }

    pub fn all_visited(&self) -> bool {
        self.visited.iter().all(|v| *v)
    }

    pub fn visited_free_count(&self) -> usize {
        self.visited
            .iter()
            .zip(&self.walls)
            .filter(|(v, w)| **v && !**w)
            .count()
    }
}

/// Goal selection and shortest-path reconstruction over a [`MazeGrid`].
#[derive(Debug, Clone)]
pub struct PathPlanner {
    grid: MazeGrid,
    visited: VisitedSet,
    goal_policy: GoalPolicy,
    goal_distance: u32,
    path_shape: PathShape,
    rng: StdRng,
}

impl PathPlanner {
    pub fn new(grid: MazeGrid, config: &PlannerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(grid, config, rng)
    }

    pub fn with_rng(grid: MazeGrid, config: &PlannerConfig, rng: StdRng) -> Self {
        let visited = VisitedSet::new(&grid);
        Self {
            grid,
            visited,
            goal_policy: config.goal_policy,
            goal_distance: config.goal_distance,
            path_shape: config.path_shape,
            rng,
        }
    }

    pub fn grid(&self) -> &MazeGrid {
        &self.grid
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn plan_from_world(&mut self, position: Position2D) -> DomainResult<WaypointPath> {
        let root = self.grid.to_grid(position)?;
        self.plan_path(root)
    }

    pub fn plan_path(&mut self, root: GridCoord) -> DomainResult<WaypointPath> {
        let field = DistanceField::compute(&self.grid, root)?;
        if field.reachable_count() <= 1 {
            return Err(DomainError::NoReachableCell { cell: root });
        }

        let goal = match self.goal_policy {
            GoalPolicy::Frontier => self.select_frontier_goal(&field),
            GoalPolicy::FixedDistance => self.select_goal_at_distance(&field)?,
        };

        let cells = field.descend(&self.grid, goal)?;
        for cell in &cells {
            self.visited.mark(&self.grid, *cell);
        }
        if self.visited.all_visited() {
            trace!("every free cell visited, resetting visitation");
            self.visited.reset();
        }

        let mut waypoints: Vec<Position2D> =
            cells[1..].iter().map(|c| self.grid.to_world(*c)).collect();
        if self.path_shape == PathShape::RoundTrip {
            waypoints.extend(cells[..cells.len() - 1].iter().rev().map(|c| self.grid.to_world(*c)));
        }

        debug!(
            root_x = root.x,
            root_y = root.y,
            goal_x = goal.x,
            goal_y = goal.y,
            hops = cells.len() - 1,
            waypoints = waypoints.len(),
            "planned path"
        );

        Ok(WaypointPath {
            goal: Some(goal),
            cells,
            waypoints,
        })
    }

    fn frontier_candidates(&self, field: &DistanceField) -> Vec<(GridCoord, u32)> {
        field
            .reachable()
            .filter(|(cell, _)| *cell != field.root() && !self.visited.is_visited(&self.grid, *cell))
            .collect()
    }

    fn select_frontier_goal(&mut self, field: &DistanceField) -> GridCoord {
        let mut candidates = self.frontier_candidates(field);
        if candidates.is_empty() {
            trace!("no unvisited cell reachable, resetting visitation");
            self.visited.reset();
            candidates = self.frontier_candidates(field);
        }

        // Non-empty: the component holds at least one cell besides the root.
        let best = candidates.iter().map(|(_, d)| *d).max().unwrap_or(0);
        let farthest: Vec<GridCoord> = candidates
            .into_iter()
            .filter(|(_, d)| *d == best)
            .map(|(c, _)| c)
            .collect();
        farthest[self.rng.gen_range(0..farthest.len())]
    }

    fn select_goal_at_distance(&mut self, field: &DistanceField) -> DomainResult<GridCoord> {
        let distance = self.goal_distance;
        if distance == 0 {
            return Err(DomainError::InvalidInput {
                reason: "goal distance must be at least one hop".to_string(),
            });
        }
        let ring: Vec<GridCoord> = field
            .reachable()
            .filter(|(_, d)| *d == distance)
            .map(|(c, _)| c)
            .collect();
        if ring.is_empty() {
            return Err(DomainError::NoGoalAtDistance {
                cell: field.root(),
                distance,
            });
        }
        Ok(ring[self.rng.gen_range(0..ring.len())])
    }
}
