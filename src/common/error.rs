use thiserror::Error;

use crate::domains::maze::GridCoord;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid start: cell ({}, {}) is a wall", cell.x, cell.y)]
    InvalidStart { cell: GridCoord },

    #[error("No reachable cell: the component of ({}, {}) has no other free cell", cell.x, cell.y)]
    NoReachableCell { cell: GridCoord },

    #[error("No goal at distance {distance} from ({}, {})", cell.x, cell.y)]
    NoGoalAtDistance { cell: GridCoord, distance: u32 },

    #[error("Position ({x:.2}, {y:.2}) is outside the maze")]
    OutOfBounds { x: f64, y: f64 },

    #[error("Degenerate projection: P[2,2]={a}, P[2,3]={b}")]
    DegenerateProjection { a: f64, b: f64 },

    #[error("Numeric instability converting rotation {matrix:?} to a quaternion")]
    NumericInstability { matrix: [[f64; 3]; 3] },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Simulator error: {0}")]
    Simulator(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Trajectory {index} failed: {source}")]
    Trajectory {
        index: usize,
        #[source]
        source: DomainError,
    },

    #[error("Trajectory {index} panicked: {message}")]
    TrajectoryPanicked { index: usize, message: String },

    #[error("Worker task failed: {0}")]
    Join(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
