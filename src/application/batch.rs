use std::any::Any;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{error, info};

use super::trajectory_service::{Trajectory, TrajectoryService};
use crate::common::{ApplicationError, ApplicationResult, DomainError};
use crate::config::BatchConfig;
use crate::domains::navigation::SimulatorFactory;

/// Split `total` trajectory indices over `workers` units. The first
/// `total % workers` units take one extra; units left empty are skipped.
pub fn partition_trajectories(total: usize, workers: usize) -> Vec<Range<usize>> {
    if workers == 0 {
        return Vec::new();
    }
    let base = total / workers;
    let extra = total % workers;
    let mut start = 0;
    let mut ranges = Vec::with_capacity(workers.min(total));
    for unit in 0..workers {
        let len = base + usize::from(unit < extra);
        if len == 0 {
            continue;
        }
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

#[derive(Debug, Default)]
pub struct BatchReport {
    /// Completed trajectories ordered by index.
    pub trajectories: Vec<Trajectory>,
    pub failures: Vec<ApplicationError>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.trajectories.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Run `config.trajectories` episodes on `config.parallelism` blocking
/// workers, each with its own simulator instances. A failing trajectory
/// is recorded in the report and does not stop the others.
pub async fn run_batch(
    service: &TrajectoryService,
    factory: Arc<dyn SimulatorFactory>,
    config: &BatchConfig,
) -> ApplicationResult<BatchReport> {
    if config.parallelism == 0 {
        return Err(DomainError::InvalidInput {
            reason: "batch parallelism must be at least 1".to_string(),
        }
        .into());
    }

    let ranges = partition_trajectories(config.trajectories, config.parallelism);
    info!(trajectories = config.trajectories, workers = ranges.len(), "starting batch");

    let mut workers = JoinSet::new();
    for range in ranges {
        let service = service.clone();
        let factory = Arc::clone(&factory);
        workers.spawn_blocking(move || {
            range
                .map(|index| run_isolated(&service, factory.as_ref(), index))
                .collect::<Vec<_>>()
        });
    }

    let mut report = BatchReport::default();
    while let Some(joined) = workers.join_next().await {
        let results = match joined {
            Ok(results) => results,
            Err(e) => {
                error!(error = %e, "batch worker failed");
                report.failures.push(ApplicationError::Join(e.to_string()));
                continue;
            }
        };
        for result in results {
            match result {
                Ok(trajectory) => report.trajectories.push(trajectory),
                Err(e) => {
                    error!(error = %e, "trajectory failed");
                    report.failures.push(e);
                }
            }
        }
    }

    report.trajectories.sort_by_key(|t| t.index);
    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "batch finished"
    );
    Ok(report)
}

/// One trajectory on its own simulator. A panic is caught here so the
/// rest of the worker's range still runs.
fn run_isolated(
    service: &TrajectoryService,
    factory: &dyn SimulatorFactory,
    index: usize,
) -> ApplicationResult<Trajectory> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        factory
            .create(index)
            .and_then(|mut sim| service.run_episode(sim.as_mut(), index))
    }));
    match outcome {
        Ok(result) => result.map_err(|source| ApplicationError::Trajectory { index, source }),
        Err(payload) => Err(ApplicationError::TrajectoryPanicked {
            index,
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remainder_goes_to_first_units() {
        let ranges = partition_trajectories(10, 4);
        let sizes: Vec<usize> = ranges.iter().map(|r| r.len()).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);
        assert_eq!(ranges.last().map(|r| r.end), Some(10));
    }

    #[test]
    fn empty_units_are_skipped() {
        assert_eq!(partition_trajectories(2, 4), vec![0..1, 1..2]);
        assert!(partition_trajectories(0, 3).is_empty());
    }
}
