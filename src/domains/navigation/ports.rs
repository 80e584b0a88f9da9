use super::action::Action;
use super::record::Observation;
use crate::common::DomainResult;

/// Port to the external environment. Implementations drive a real
/// simulator process; the trajectory driver only sees observations in and
/// actions out.
pub trait Simulator: Send {
    /// Start a fresh episode.
    fn reset(&mut self) -> DomainResult<()>;

    /// Textual wall layout of the current episode's maze.
    fn maze_layout(&self) -> DomainResult<String>;

    fn observe(&mut self) -> DomainResult<Observation>;

    /// Apply `action` for `repeat` simulator steps.
    fn act(&mut self, action: Action, repeat: u32) -> DomainResult<()>;

    fn is_running(&self) -> bool {
        true
    }
}

/// Builds one isolated simulator per trajectory.
pub trait SimulatorFactory: Send + Sync {
    fn create(&self, trajectory_index: usize) -> DomainResult<Box<dyn Simulator>>;
}

impl<F> SimulatorFactory for F
where
    F: Fn(usize) -> DomainResult<Box<dyn Simulator>> + Send + Sync,
{
    fn create(&self, trajectory_index: usize) -> DomainResult<Box<dyn Simulator>> {
        self(trajectory_index)
    }
}
