use glam::Vec2;
use std::collections::HashMap;

use crate::config::SimConfig;
use crate::definitions::{EnemyDefinition, StatusDefinition, TowerDefinition};
use crate::error::SimResult;
use crate::path::PathContext;
use crate::pool::EntityPool;
use crate::schedule::{FrameContext, FrameReport, Schedule};
use crate::spatial::SpatialGrid;
use crate::spawn::{self, EnemyScaling};
use crate::store::{Entity, EntityKind, EntityStore, TRANSFORM};

/// The simulation core for one level: the entity store plus the resources
/// the systems share, stepped once per frame through a [`Schedule`].
#[derive(Debug, Clone)]
pub struct Simulation {
    store: EntityStore,
    paths: PathContext,
    grid: SpatialGrid,
    projectile_pool: EntityPool,
    statuses: HashMap<String, StatusDefinition>,
    config: SimConfig,
    schedule: Schedule,
}

impl Simulation {
    pub fn new(
        paths: PathContext,
        statuses: HashMap<String, StatusDefinition>,
        config: SimConfig,
    ) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            store: EntityStore::default(),
            paths,
            grid: SpatialGrid::new(config.cell_size),
            projectile_pool: EntityPool::default(),
            statuses,
            config,
            schedule: Schedule::standard(),
        })
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Advance one frame. Negative or non-finite deltas are treated as zero.
    pub fn step(&mut self, dt: f32) -> FrameReport {
        let dt = sanitize_dt(dt);
        let mut ctx = FrameContext {
            store: &mut self.store,
            grid: &mut self.grid,
            pool: &mut self.projectile_pool,
            paths: &self.paths,
            statuses: &self.statuses,
            config: &self.config,
            dt,
            report: FrameReport::default(),
        };
        self.schedule.run(&mut ctx);
        ctx.report
    }

    /// Every live entity a renderer should draw, with its role and position
    pub fn renderables(&self) -> impl Iterator<Item = (Entity, EntityKind, Vec2)> + '_ {
        self.store
            .query_entities(TRANSFORM)
            .into_iter()
            .filter_map(|entity| {
                let kind = self.store.kind(entity)?;
                let position = self.store.get_transform(entity)?.position;
                (kind != EntityKind::Pooled).then_some((entity, kind, position))
            })
    }

    pub fn spawn_enemy(
        &mut self,
        definition: &EnemyDefinition,
        path_index: usize,
        scaling: &EnemyScaling,
    ) -> Entity {
        spawn::spawn_enemy(
            &mut self.store,
            definition,
            self.paths.get(path_index),
            path_index,
            scaling,
            self.config.stealth_reveal_time,
        )
    }

    pub fn spawn_tower(&mut self, definition: &TowerDefinition, position: Vec2) -> Entity {
        spawn::spawn_tower(&mut self.store, definition, position)
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    pub fn paths(&self) -> &PathContext {
        &self.paths
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn projectile_pool(&self) -> &EntityPool {
        &self.projectile_pool
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn enemy_count(&self) -> usize {
        self.store.enemy_count()
    }
}

pub(crate) fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt >= 0.0 {
        dt
    } else {
        tracing::warn!(dt, "ignoring invalid frame delta");
        0.0
    }
}
