use std::sync::Arc;

use maze_traverse::adapters::inbound::KinematicSimulator;
use maze_traverse::adapters::outbound::{init_noop_logger, BUILTIN_LAYOUT};
use maze_traverse::application::*;
use maze_traverse::config::{BatchConfig, Config, SimulatorConfig};
use maze_traverse::domains::maze::{MazeGrid, Position2D};
use maze_traverse::domains::navigation::{
    Action, Observation, Simulator, SimulatorFactory, TrajectoryEvent,
};
use maze_traverse::{ApplicationError, DomainError, DomainResult};

fn small_config() -> Config {
    let mut config = Config::default();
    config.navigation.warmup_ticks = 4;
    config.recording.length = 30;
    config.planner.seed = Some(42);
    config.simulator = SimulatorConfig {
        image_size: 4,
        ..SimulatorConfig::default()
    };
    config
}

fn simulator(config: &Config) -> KinematicSimulator {
    KinematicSimulator::new(BUILTIN_LAYOUT, &config.maze, config.simulator.clone()).unwrap()
}

#[test]
fn test_episode_records_every_tick_after_warmup() {
    let config = small_config();
    let service = TrajectoryService::new(&config, init_noop_logger());
    let mut sim = simulator(&config);
    let trajectory = service.run_episode(&mut sim, 0).unwrap();

    assert_eq!(service.total_ticks(), 34);
    assert_eq!(trajectory.records.len(), 30);
    assert_eq!(trajectory.records[0].tick, 4);
    assert!(trajectory.records.iter().all(|r| r.action_index < 5));
    assert!(trajectory.records.iter().all(|r| r.camera.is_some()));
    assert!(matches!(
        trajectory.events.first(),
        Some(TrajectoryEvent::EpisodeStarted { .. })
    ));
    assert_eq!(sim.steps(), 34 * u64::from(config.recording.action_repeat));
}

#[test]
fn test_agent_stays_in_free_cells() {
    let config = small_config();
    let service = TrajectoryService::new(&config, init_noop_logger());
    let mut sim = simulator(&config);
    let trajectory = service.run_episode(&mut sim, 1).unwrap();

    let grid = MazeGrid::from_config(BUILTIN_LAYOUT, &config.maze).unwrap();
    for record in &trajectory.records {
        let position = Position2D::new(record.position[0], record.position[1]);
        assert!(grid.is_free(grid.to_grid(position).unwrap()));
    }
}

#[test]
fn test_event_envelopes_carry_trajectory_id() {
    let config = small_config();
    let service = TrajectoryService::new(&config, init_noop_logger());
    let mut sim = simulator(&config);
    let trajectory = service.run_episode(&mut sim, 0).unwrap();

    let envelopes = trajectory.envelopes().unwrap();
    assert_eq!(envelopes.len(), trajectory.events.len());
    assert!(envelopes.iter().all(|e| e.aggregate_id == trajectory.id));
    assert_eq!(envelopes[0].event_type, "EpisodeStarted");
    assert_eq!(envelopes[0].aggregate_type, TRAJECTORY_AGGREGATE);
}

#[test]
fn test_reconstruction_service_builds_cloud_from_records() {
    let config = small_config();
    let service = TrajectoryService::new(&config, init_noop_logger());
    let mut sim = simulator(&config);
    let trajectory = service.run_episode(&mut sim, 0).unwrap();

    let reconstruction = ReconstructionService::new(&config.reconstruction, init_noop_logger());
    let cloud = reconstruction.reconstruct_trajectory(&trajectory).unwrap();
    assert_eq!(cloud.len(), 30 * 16);

    let both = reconstruction
        .reconstruct_all(&[trajectory.clone(), trajectory.clone()])
        .unwrap();
    assert_eq!(both.len(), 2 * cloud.len());

    let summary = reconstruction.depth_summary(&[trajectory]).unwrap();
    assert_eq!(summary.frames, 30);
    let linear = summary.linear.unwrap();
    assert!(linear.min >= config.simulator.near - 1e-3);
    assert!(linear.max <= config.simulator.far + 1.0);
}

struct Stalled;

impl Simulator for Stalled {
    fn reset(&mut self) -> DomainResult<()> {
        Ok(())
    }
    fn maze_layout(&self) -> DomainResult<String> {
        Ok(BUILTIN_LAYOUT.to_string())
    }
    fn observe(&mut self) -> DomainResult<Observation> {
        Err(DomainError::Simulator("no frame".to_string()))
    }
    fn act(&mut self, _: Action, _: u32) -> DomainResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_batch_isolates_failed_trajectories() {
    let config = small_config();
    let service = TrajectoryService::new(&config, init_noop_logger());
    let sim_config = config.clone();
    let factory: Arc<dyn SimulatorFactory> =
        Arc::new(move |index: usize| -> DomainResult<Box<dyn Simulator>> {
            if index == 2 {
                Ok(Box::new(Stalled))
            } else {
                Ok(Box::new(simulator(&sim_config)))
            }
        });

    let batch = BatchConfig {
        trajectories: 5,
        parallelism: 2,
    };
    let report = run_batch(&service, factory, &batch).await.unwrap();

    assert_eq!(report.succeeded(), 4);
    assert_eq!(report.failed(), 1);
    let indices: Vec<usize> = report.trajectories.iter().map(|t| t.index).collect();
    assert_eq!(indices, vec![0, 1, 3, 4]);
    assert!(matches!(
        report.failures[0],
        ApplicationError::Trajectory { index: 2, source: DomainError::Simulator(_) }
    ));
}

#[tokio::test]
async fn test_panicking_trajectory_keeps_its_worker_siblings() {
    let config = small_config();
    let service = TrajectoryService::new(&config, init_noop_logger());
    let sim_config = config.clone();
    let factory: Arc<dyn SimulatorFactory> =
        Arc::new(move |index: usize| -> DomainResult<Box<dyn Simulator>> {
            if index == 1 {
                panic!("simulator crashed for trajectory {}", index);
            }
            Ok(Box::new(simulator(&sim_config)))
        });

    let batch = BatchConfig {
        trajectories: 3,
        parallelism: 1,
    };
    let report = run_batch(&service, factory, &batch).await.unwrap();

    let indices: Vec<usize> = report.trajectories.iter().map(|t| t.index).collect();
    assert_eq!(indices, vec![0, 2]);
    assert_eq!(report.failed(), 1);
    match &report.failures[0] {
        ApplicationError::TrajectoryPanicked { index, message } => {
            assert_eq!(*index, 1);
            assert!(message.contains("simulator crashed"));
        }
        other => panic!("unexpected failure: {}", other),
    }
}

#[tokio::test]
async fn test_batch_rejects_zero_parallelism() {
    let config = small_config();
    let service = TrajectoryService::new(&config, init_noop_logger());
    let factory: Arc<dyn SimulatorFactory> =
        Arc::new(|_: usize| -> DomainResult<Box<dyn Simulator>> { Ok(Box::new(Stalled)) });
    let batch = BatchConfig {
        trajectories: 1,
        parallelism: 0,
    };
    assert!(run_batch(&service, factory, &batch).await.is_err());
}
