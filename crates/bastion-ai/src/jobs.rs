//! Job model: building jobs, pre-emption rules and per-step movement.
//!
//! Pure functions over `JobTracker` and the grid; the simulation decides
//! when to call them.

use glam::IVec2;

use bastion_core::components::{Job, JobTracker};
use bastion_core::enums::{DirectivePriority, JobDef, JobEndCondition};
use bastion_core::types::{cell_distance_sq, ThingId};
use bastion_map::MapGrid;

/// Result of advancing a job by one movement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStep {
    /// Move to this cell and keep going.
    Continue(IVec2),
    Arrived,
    /// No neighbor gets the agent closer.
    Stuck,
    /// Nothing to walk to.
    Idle,
}

/// A reactive flee job. Optional-interrupt, so any order may replace it.
pub fn flee_job(destination: IVec2, threat: ThingId, tick: u64) -> Job {
    Job {
        def: JobDef::Flee,
        destination: Some(destination),
        threat: Some(threat),
        priority: DirectivePriority::OptionalInterrupt,
        started_tick: tick,
    }
}

/// A player move order.
pub fn goto_job(destination: IVec2, tick: u64) -> Job {
    Job {
        def: JobDef::Goto,
        destination: Some(destination),
        threat: None,
        priority: DirectivePriority::Forced,
        started_tick: tick,
    }
}

pub fn is_fleeing(tracker: &JobTracker) -> bool {
    tracker
        .current
        .as_ref()
        .is_some_and(|job| job.def == JobDef::Flee)
}

/// Whether a directive of `incoming` priority may replace the current job.
pub fn can_replace(tracker: &JobTracker, incoming: DirectivePriority) -> bool {
    tracker
        .current
        .as_ref()
        .map_or(true, |job| incoming >= job.priority)
}

/// Start `job` unconditionally, ending any current job with `end`.
pub fn start_job(tracker: &mut JobTracker, job: Job, end: JobEndCondition) {
    if tracker.current.is_some() {
        tracker.last_end = Some(end);
    }
    tracker.current = Some(job);
    tracker.move_progress = 0;
}

/// Start `job` if its priority allows replacing the current one.
pub fn try_preempt(tracker: &mut JobTracker, job: Job) -> bool {
    if !can_replace(tracker, job.priority) {
        return false;
    }
    let end = match job.priority {
        DirectivePriority::OptionalInterrupt => JobEndCondition::InterruptOptional,
        DirectivePriority::Forced => JobEndCondition::InterruptForced,
    };
    start_job(tracker, job, end);
    true
}

/// Finish the current job.
pub fn end_job(tracker: &mut JobTracker, end: JobEndCondition) {
    if tracker.current.take().is_some() {
        tracker.last_end = Some(end);
    }
    tracker.move_progress = 0;
}

/// Greedy single step from `position` toward the job's destination.
pub fn advance(job: &Job, position: IVec2, grid: &MapGrid) -> JobStep {
    let Some(destination) = job.destination else {
        return JobStep::Idle;
    };
    if position == destination {
        return JobStep::Arrived;
    }
    let current = cell_distance_sq(position, destination);
    grid.neighbors8(position)
        .filter(|c| grid.passable(*c))
        .map(|c| (cell_distance_sq(c, destination), c))
        .filter(|(d, _)| *d < current)
        .min_by_key(|(d, c)| (*d, c.y, c.x))
        .map_or(JobStep::Stuck, |(_, c)| JobStep::Continue(c))
}
