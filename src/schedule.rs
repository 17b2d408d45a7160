use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::SimConfig;
use crate::definitions::StatusDefinition;
use crate::error::{SimError, SimResult};
use crate::path::PathContext;
use crate::pool::EntityPool;
use crate::spatial::SpatialGrid;
use crate::store::{Entity, EntityStore};
use crate::systems::{self, Kill};

/// One step of the per-frame pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Movement,
    IndexEnemies,
    Status,
    Targeting,
    Firing,
    Projectiles,
    Cleanup,
}

impl Stage {
    pub const STANDARD: [Stage; 7] = [
        Stage::Movement,
        Stage::IndexEnemies,
        Stage::Status,
        Stage::Targeting,
        Stage::Firing,
        Stage::Projectiles,
        Stage::Cleanup,
    ];
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Movement => "movement",
            Self::IndexEnemies => "index-enemies",
            Self::Status => "status",
            Self::Targeting => "targeting",
            Self::Firing => "firing",
            Self::Projectiles => "projectiles",
            Self::Cleanup => "cleanup",
        };
        write!(f, "{name}")
    }
}

/// What happened during one frame
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub lives_lost: u32,
    pub leaked: Vec<Entity>,
    pub kills: Vec<Kill>,
    pub shots_fired: u32,
    pub hits: u32,
    /// Projectiles that hit, lost their target or ran out of range
    pub projectiles_spent: u32,
    pub projectiles_recycled: u32,
    pub enemies_remaining: usize,
}

/// Everything a stage can touch during a frame
pub struct FrameContext<'a> {
    pub store: &'a mut EntityStore,
    pub grid: &'a mut SpatialGrid,
    pub pool: &'a mut EntityPool,
    pub paths: &'a PathContext,
    pub statuses: &'a HashMap<String, StatusDefinition>,
    pub config: &'a SimConfig,
    pub dt: f32,
    pub report: FrameReport,
}

/// A validated stage order. Deserializes from a plain list of stages through [`Schedule::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Stage>", into = "Vec<Stage>")]
pub struct Schedule {
    stages: Vec<Stage>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self::standard()
    }
}

impl Schedule {
    /// Movement, index, status, targeting, firing, projectiles, cleanup
    pub fn standard() -> Self {
        Self {
            stages: Stage::STANDARD.to_vec(),
        }
    }

    /// Build a custom order. Stages may be left out, but not repeated, and
    /// the ones present must respect the data dependencies between them.
    pub fn new(stages: Vec<Stage>) -> SimResult<Self> {
        let position = |stage: Stage| stages.iter().position(|&s| s == stage);

        for (index, stage) in stages.iter().enumerate() {
            if stages[..index].contains(stage) {
                return Err(SimError::InvalidSchedule(format!("{stage} is scheduled twice")));
            }
        }

        let must_precede = |before: Stage, after: Stage| -> SimResult<()> {
            if let (Some(a), Some(b)) = (position(before), position(after))
                && a > b
            {
                return Err(SimError::InvalidSchedule(format!(
                    "{before} must run before {after}"
                )));
            }
            Ok(())
        };
        must_precede(Stage::Movement, Stage::IndexEnemies)?;
        must_precede(Stage::IndexEnemies, Stage::Targeting)?;
        must_precede(Stage::Projectiles, Stage::Cleanup)?;

        if position(Stage::Targeting).is_some() && position(Stage::IndexEnemies).is_none() {
            return Err(SimError::InvalidSchedule(
                "targeting needs index-enemies to be scheduled".to_string(),
            ));
        }

        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run every stage in order and fill in the frame report
    pub fn run(&self, ctx: &mut FrameContext<'_>) {
        for &stage in &self.stages {
            run_stage(stage, ctx);
        }
        ctx.report.enemies_remaining = ctx.store.enemy_count();
    }
}

impl TryFrom<Vec<Stage>> for Schedule {
    type Error = SimError;

    fn try_from(stages: Vec<Stage>) -> SimResult<Self> {
        Self::new(stages)
    }
}

impl From<Schedule> for Vec<Stage> {
    fn from(schedule: Schedule) -> Self {
        schedule.stages
    }
}

fn run_stage(stage: Stage, ctx: &mut FrameContext<'_>) {
    match stage {
        Stage::Movement => {
            let outcome = systems::update_movement(ctx.store, ctx.paths, ctx.dt);
            ctx.report.lives_lost += outcome.lives_lost;
            ctx.report.leaked.extend(outcome.leaked);
        }
        Stage::IndexEnemies => systems::index_enemies(ctx.store, ctx.grid),
        Stage::Status => systems::update_status(ctx.store, ctx.statuses, ctx.dt),
        Stage::Targeting => {
            systems::update_targeting(ctx.store, ctx.grid, ctx.config.targeting_query)
        }
        Stage::Firing => {
            ctx.report.shots_fired += systems::update_firing(ctx.store, ctx.pool, ctx.config, ctx.dt);
        }
        Stage::Projectiles => {
            let outcome = systems::update_projectiles(ctx.store, ctx.config, ctx.dt);
            ctx.report.hits += outcome.hits;
            ctx.report.projectiles_spent += outcome.spent;
        }
        Stage::Cleanup => {
            let outcome = systems::update_cleanup(ctx.store, ctx.pool);
            ctx.report.kills.extend(outcome.kills);
            ctx.report.projectiles_recycled += outcome.recycled;
        }
    }
}
