use nalgebra::{Matrix4, Point3, Vector3};
use tracing::trace;

use crate::common::{DomainError, DomainResult};
use crate::config::{MazeConfig, SimulatorConfig};
use crate::domains::maze::{GridCoord, MazeGrid, Position2D};
use crate::domains::navigation::{normalize_degrees, Action, AgentPose, Observation, Simulator};
use crate::domains::reconstruction::{ColorBuffer, DepthBuffer};

/// Layout symbol marking the spawn cell.
pub const SPAWN_SYMBOL: char = 'P';

const WALL_RGB: [f64; 3] = [180.0, 170.0, 150.0];
const FLOOR_RGB: [u8; 3] = [90, 70, 50];
const CEILING_RGB: [u8; 3] = [150, 190, 230];

/// Grid-world simulator with unicycle kinematics and a column raycast
/// camera. Walls are one cell tall and the camera sits at half wall height.
pub struct KinematicSimulator {
    layout: String,
    grid: MazeGrid,
    spawn: Position2D,
    config: SimulatorConfig,
    pose: AgentPose,
    steps: u64,
}

impl KinematicSimulator {
    pub fn new(layout: &str, maze: &MazeConfig, config: SimulatorConfig) -> DomainResult<Self> {
        let grid = MazeGrid::from_config(layout, maze)?;
        let cell = spawn_cell(layout)
            .filter(|c| grid.is_free(*c))
            .or_else(|| grid.free_cells().next())
            .ok_or_else(|| DomainError::InvalidInput {
                reason: "maze layout has no free cell to spawn in".to_string(),
            })?;
        let spawn = grid.to_world(cell);
        Ok(Self {
            layout: layout.to_string(),
            grid,
            spawn,
            config,
            pose: AgentPose::planar(spawn.x, spawn.y, 0.0),
            steps: 0,
        })
    }

    pub fn pose(&self) -> AgentPose {
        self.pose
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Place the agent directly; used to script episodes.
    pub fn teleport(&mut self, pose: AgentPose) {
        self.pose = pose;
    }

    fn is_blocked(&self, x: f64, y: f64) -> bool {
        self.grid
            .to_grid(Position2D::new(x, y))
            .map(|c| self.grid.is_wall(c))
            .unwrap_or(true)
    }

    fn step_once(&mut self, action: Action) {
        let turn = f64::from(action.turn_sign()) * self.config.turn_step_deg;
        self.pose.rotation.yaw = normalize_degrees(self.pose.rotation.yaw + turn);
        if action.moves_forward() {
            let heading = self.pose.rotation.yaw.to_radians();
            let x = self.pose.position.x + self.config.move_step * heading.cos();
            let y = self.pose.position.y + self.config.move_step * heading.sin();
            if !self.is_blocked(x, y) {
                self.pose.position.x = x;
                self.pose.position.y = y;
            }
        }
        self.steps += 1;
    }

    fn eye(&self) -> Point3<f64> {
        Point3::new(
            self.pose.position.x,
            self.pose.position.y,
            self.grid.cell_size() * 0.5,
        )
    }

    pub fn projection(&self) -> Matrix4<f64> {
        Matrix4::new_perspective(
            1.0,
            self.config.fov_deg.to_radians(),
            self.config.near,
            self.config.far,
        )
    }

    /// World to view, looking along the current yaw with +Z up.
    pub fn view(&self) -> Matrix4<f64> {
        let eye = self.eye();
        let heading = self.pose.rotation.yaw.to_radians();
        let forward = Vector3::new(heading.cos(), heading.sin(), 0.0);
        Matrix4::look_at_rh(&eye, &(eye + forward), &Vector3::z())
    }

    /// View depth along the camera axis to the first wall in the horizontal
    /// direction `forward + tan_h * right`.
    fn wall_depth(&self, tan_h: f64) -> f64 {
        let heading = self.pose.rotation.yaw.to_radians();
        let forward = Vector3::new(heading.cos(), heading.sin(), 0.0);
        let right = Vector3::new(heading.sin(), -heading.cos(), 0.0);
        let dir = forward + right * tan_h;
        let step = self.grid.cell_size() / 20.0 / dir.norm();
        let mut s = self.config.near;
        while s < self.config.far {
            let p = self.pose.position + dir * s;
            if self.is_blocked(p.x, p.y) {
                return s;
            }
            s += step;
        }
        self.config.far
    }

    fn render(&self) -> (DepthBuffer, ColorBuffer) {
        let size = self.config.image_size;
        let projection = self.projection();
        let (a, b) = (projection[(2, 2)], projection[(2, 3)]);
        let (fx, fy) = (projection[(0, 0)], projection[(1, 1)]);
        let wall_height = self.grid.cell_size();
        let eye_z = self.eye().z;

        let ndc_at = |i: usize| {
            if size <= 1 {
                -1.0
            } else {
                2.0 * i as f64 / (size - 1) as f64 - 1.0
            }
        };
        let columns: Vec<f64> = (0..size).map(|c| self.wall_depth(ndc_at(c) / fx)).collect();

        let mut depth = Vec::with_capacity(size * size);
        let mut color = Vec::with_capacity(size * size);
        for row in 0..size {
            let tan_v = ndc_at(row) / fy;
            for &wall in &columns {
                let (s, rgb) = if tan_v < 0.0 && eye_z / -tan_v < wall {
                    (eye_z / -tan_v, FLOOR_RGB)
                } else if tan_v > 0.0 && (wall_height - eye_z) / tan_v < wall {
                    ((wall_height - eye_z) / tan_v, CEILING_RGB)
                } else {
                    let shade = 1.0 - 0.7 * (wall / self.config.far).min(1.0);
                    (wall, WALL_RGB.map(|c| (c * shade) as u8))
                };
                let s = s.clamp(self.config.near, self.config.far);
                let ndc = -a + b / s;
                depth.push(((ndc + 1.0) * 0.5) as f32);
                color.push(rgb);
            }
        }
        (
            DepthBuffer {
                width: size,
                height: size,
                values: depth,
            },
            ColorBuffer {
                width: size,
                height: size,
                pixels: color,
            },
        )
    }
}

fn spawn_cell(layout: &str) -> Option<GridCoord> {
    layout
        .lines()
        .skip_while(|l| l.trim().is_empty())
        .enumerate()
        .find_map(|(y, row)| {
            row.chars()
                .position(|c| c == SPAWN_SYMBOL)
                .map(|x| GridCoord::new(x, y))
        })
}

impl Simulator for KinematicSimulator {
    fn reset(&mut self) -> DomainResult<()> {
        self.pose = AgentPose::planar(self.spawn.x, self.spawn.y, 0.0);
        self.steps = 0;
        Ok(())
    }

    fn maze_layout(&self) -> DomainResult<String> {
        Ok(self.layout.clone())
    }

    fn observe(&mut self) -> DomainResult<Observation> {
        if self.config.image_size == 0 {
            return Ok(Observation::pose_only(self.pose));
        }
        let (depth, color) = self.render();
        Ok(Observation {
            pose: self.pose,
            color: Some(color),
            depth: Some(depth),
            projection: Some(self.projection()),
            view: Some(self.view()),
        })
    }

    fn act(&mut self, action: Action, repeat: u32) -> DomainResult<()> {
        for _ in 0..repeat {
            self.step_once(action);
        }
        trace!(
            action = action.name(),
            x = self.pose.position.x,
            y = self.pose.position.y,
            yaw = self.pose.rotation.yaw,
            "act"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = "
*****
*P  *
*****
";

    fn sim() -> KinematicSimulator {
        KinematicSimulator::new(LAYOUT, &MazeConfig::default(), SimulatorConfig::default()).unwrap()
    }

    #[test]
    fn spawns_on_marker() {
        let sim = sim();
        assert_eq!(sim.pose().position_2d(), Position2D::new(150.0, 150.0));
    }

    #[test]
    fn walls_stop_forward_motion() {
        let mut sim = sim();
        sim.teleport(AgentPose::planar(150.0, 150.0, 180.0));
        sim.act(Action::Forward, 100).unwrap();
        assert!(sim.pose().position.x >= 100.0);
    }

    #[test]
    fn turning_right_increases_yaw() {
        let mut sim = sim();
        sim.act(Action::TurnRight, 2).unwrap();
        assert_eq!(sim.pose().yaw(), 10.0);
    }
}
