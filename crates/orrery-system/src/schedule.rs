//! Simulation schedule labels and the frame runner.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::{IntoSystemConfigs, ScheduleBuildError, ScheduleLabel};
use orrery_config::SimConfig;
use tracing::debug;

use crate::SimClock;

/// Execution stages of one simulation frame.
#[derive(ScheduleLabel, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSchedule {
    /// Once per frame: orbits, scene sync, look and capture.
    Variable,
    /// Zero or more times per frame at the fixed timestep: movement.
    Fixed,
}

/// The two schedules plus the fixed-step accumulator.
///
/// Each frame runs `Variable` once and then `Fixed` as many times as the
/// accumulated time allows, capped at `max_fixed_steps`.
pub struct SimSchedules {
    variable: Schedule,
    fixed: Schedule,
    fixed_accumulator: f64,
    fixed_dt: f64,
    max_fixed_steps: u32,
}

impl SimSchedules {
    pub fn new(config: &SimConfig) -> Self {
        let fixed_dt = if config.fixed_dt.is_finite() && config.fixed_dt > 0.0 {
            config.fixed_dt
        } else {
            SimConfig::default().fixed_dt
        };
        Self {
            variable: Schedule::new(SimSchedule::Variable),
            fixed: Schedule::new(SimSchedule::Fixed),
            fixed_accumulator: 0.0,
            fixed_dt,
            max_fixed_steps: config.max_fixed_steps.max(1),
        }
    }

    /// Register a system (or chained tuple) into a stage.
    pub fn add_system<M>(&mut self, stage: SimSchedule, system: impl IntoSystemConfigs<M>) {
        self.schedule_mut(stage).add_systems(system);
    }

    pub fn schedule_mut(&mut self, stage: SimSchedule) -> &mut Schedule {
        match stage {
            SimSchedule::Variable => &mut self.variable,
            SimSchedule::Fixed => &mut self.fixed,
        }
    }

    /// Run one frame and return the number of fixed steps taken.
    ///
    /// A negative or non-finite `frame_dt` is treated as zero.
    pub fn run(&mut self, world: &mut World, frame_dt: f64) -> u32 {
        let frame_dt = if frame_dt.is_finite() { frame_dt.max(0.0) } else { 0.0 };

        if let Some(mut clock) = world.get_resource_mut::<SimClock>() {
            clock.frame_dt = frame_dt as f32;
            clock.fixed_dt = self.fixed_dt as f32;
            clock.elapsed += frame_dt;
            clock.frame += 1;
        }

        self.variable.run(world);

        self.fixed_accumulator += frame_dt;
        let mut steps: u32 = 0;
        while self.fixed_accumulator >= self.fixed_dt && steps < self.max_fixed_steps {
            self.fixed.run(world);
            self.fixed_accumulator -= self.fixed_dt;
            steps += 1;
        }

        if self.fixed_accumulator >= self.fixed_dt {
            debug!(
                backlog = self.fixed_accumulator,
                steps, "Fixed step budget exhausted, dropping backlog"
            );
            self.fixed_accumulator %= self.fixed_dt;
        }

        steps
    }

    /// Build both schedule graphs without running them.
    ///
    /// Fails on ordering cycles or conflicting constraints between systems.
    pub fn initialize(&mut self, world: &mut World) -> Result<(), ScheduleBuildError> {
        self.variable.initialize(world)?;
        self.fixed.initialize(world)?;
        Ok(())
    }

    pub fn fixed_accumulator(&self) -> f64 {
        self.fixed_accumulator
    }

    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }
}

impl Default for SimSchedules {
    fn default() -> Self {
        Self::new(&SimConfig::default())
    }
}
