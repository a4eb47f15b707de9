//! Agent job stepping: move along the current job, end finished jobs.

use hecs::World;

use bastion_ai::jobs::{self, JobStep};
use bastion_core::components::{Agent, JobTracker};
use bastion_core::constants::AGENT_TICKS_PER_CELL;
use bastion_core::enums::JobEndCondition;
use bastion_core::types::Position;
use bastion_map::MapGrid;

pub fn run(world: &mut World, grid: &MapGrid) {
    for (_entity, (agent, position, tracker)) in
        world.query_mut::<(&Agent, &mut Position, &mut JobTracker)>()
    {
        if agent.downed || agent.dead {
            jobs::end_job(tracker, JobEndCondition::Incapable);
            continue;
        }
        if tracker.current.is_none() {
            continue;
        }

        tracker.move_progress += 1;
        if tracker.move_progress < AGENT_TICKS_PER_CELL {
            continue;
        }
        tracker.move_progress = 0;

        let step = match tracker.current.as_ref() {
            Some(job) => jobs::advance(job, position.0, grid),
            None => continue,
        };
        match step {
            JobStep::Continue(next) => position.0 = next,
            JobStep::Arrived => jobs::end_job(tracker, JobEndCondition::Succeeded),
            JobStep::Stuck => {
                tracing::debug!(
                    target: "bastion::response",
                    agent = %agent.name,
                    x = position.0.x,
                    y = position.0.y,
                    "agent.job_stuck"
                );
                jobs::end_job(tracker, JobEndCondition::Incapable);
            }
            JobStep::Idle => {}
        }
    }
}
