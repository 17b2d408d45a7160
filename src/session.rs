//! A playable level: waves, economy, lives and tower placement wrapped around a [`Simulation`].
//!
//! Each [`Session::update`] runs, in order: passive income, wave spawning, the simulation
//! pipeline, life and reward bookkeeping, wave-clear detection and the between-wave countdown.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::SimConfig;
use crate::definitions::{Definitions, LevelDefinition, TowerDefinition, WaveDefinition, WaveSpawn};
use crate::error::{SimError, SimResult};
use crate::path::PathContext;
use crate::schedule::FrameReport;
use crate::simulation::{Simulation, sanitize_dt};
use crate::spawn::EnemyScaling;
use crate::store::{ECONOMY, Entity, EntityStore};
use crate::upgrade::{self, Branch};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeedMode {
    #[default]
    Normal,
    Double,
    Triple,
}

impl SpeedMode {
    pub fn multiplier(self) -> u32 {
        match self {
            Self::Normal => 1,
            Self::Double => 2,
            Self::Triple => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Victory,
    Defeat,
}

/// What the HUD shows, refreshed every update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub lives: i32,
    pub coins: i32,
    pub wave: u32,
    pub speed: u32,
    pub paused: bool,
}

#[derive(Debug, Clone)]
pub struct Session {
    definitions: Definitions,
    level: LevelDefinition,
    waves: Vec<WaveDefinition>,
    simulation: Simulation,
    lives: i32,
    coins: i32,
    wave_index: usize,
    wave_timer: f32,
    wave_in_progress: bool,
    /// Entries of the running wave, next one last
    pending_spawns: Vec<WaveSpawn>,
    spawn_timer: f32,
    income_timer: f32,
    speed: SpeedMode,
    paused: bool,
    outcome: Option<Outcome>,
    hud: HudSnapshot,
    towers_by_cell: HashMap<IVec2, Entity>,
}

impl Session {
    pub fn new(definitions: Definitions, level_id: &str, config: SimConfig) -> SimResult<Self> {
        let level = definitions
            .levels
            .get(level_id)
            .cloned()
            .ok_or_else(|| SimError::UnknownLevel(level_id.to_string()))?;
        let waves = definitions.waves_for(&level).to_vec();
        let paths = PathContext::from_tiles(&level.paths, level.tile_size);
        let wave_timer = config.first_wave_delay;
        let simulation = Simulation::new(paths, definitions.balance.statuses.clone(), config)?;

        let mut session = Self {
            lives: level.start_lives,
            coins: level.start_coins,
            definitions,
            level,
            waves,
            simulation,
            wave_index: 0,
            wave_timer,
            wave_in_progress: false,
            pending_spawns: Vec::new(),
            spawn_timer: 0.0,
            income_timer: 0.0,
            speed: SpeedMode::Normal,
            paused: false,
            outcome: None,
            hud: HudSnapshot {
                lives: 0,
                coins: 0,
                wave: 0,
                speed: 1,
                paused: false,
            },
            towers_by_cell: HashMap::new(),
        };
        session.refresh_hud();
        Ok(session)
    }

    /// Advance the level by one frame
    pub fn update(&mut self, dt: f32) -> FrameReport {
        if self.outcome.is_some() || self.paused {
            self.refresh_hud();
            return FrameReport::default();
        }
        let dt = sanitize_dt(dt) * self.speed.multiplier() as f32;

        self.accrue_income(dt);
        self.advance_spawns(dt);

        let report = self.simulation.step(dt);
        self.lives -= report.lives_lost as i32;
        if self.lives <= 0 {
            tracing::info!(level = %self.level.id, wave = self.wave_index, "defeat");
            self.outcome = Some(Outcome::Defeat);
            self.refresh_hud();
            return report;
        }

        let bonus = self.definitions.balance.kill_reward_bonus as i32;
        for kill in &report.kills {
            self.coins += kill.reward + bonus;
        }

        self.check_wave_clear(report.enemies_remaining);
        if !self.wave_in_progress && self.outcome.is_none() {
            self.wave_timer -= dt;
            if self.wave_timer <= 0.0 {
                self.start_next_wave();
            }
        }

        self.refresh_hud();
        report
    }

    /// Buy and place a tower on the buildable cell under `position`
    pub fn place_tower(&mut self, tower_id: &str, position: Vec2) -> SimResult<Entity> {
        let tile = self.level.tile_size;
        let cell = self
            .level
            .buildable
            .iter()
            .copied()
            .find(|&cell| cell_centre(cell, tile).distance(position) < tile * 0.5)
            .ok_or(SimError::NotBuildable {
                x: position.x,
                y: position.y,
            })?;

        if let Some(&existing) = self.towers_by_cell.get(&cell)
            && self.simulation.store().is_alive(existing)
        {
            return Err(SimError::CellOccupied(existing));
        }

        let definition = self
            .definitions
            .towers
            .get(tower_id)
            .ok_or_else(|| SimError::UnknownTower(tower_id.to_string()))?;
        if self.coins < definition.cost {
            return Err(SimError::InsufficientCoins {
                needed: definition.cost,
                available: self.coins,
            });
        }

        self.coins -= definition.cost;
        let tower = self
            .simulation
            .spawn_tower(definition, cell_centre(cell, tile));
        self.towers_by_cell.insert(cell, tower);
        tracing::debug!(%tower, tower_id, cell = ?cell, "tower placed");
        self.refresh_hud();
        Ok(tower)
    }

    pub fn upgrade_tower(&mut self, tower: Entity) -> SimResult<u32> {
        let definition = tower_definition(&self.definitions, self.simulation.store(), tower)?;
        upgrade::upgrade_tower(self.simulation.store_mut(), tower, definition)
    }

    pub fn select_branch(&mut self, tower: Entity, branch: Branch) -> SimResult<()> {
        let definition = tower_definition(&self.definitions, self.simulation.store(), tower)?;
        upgrade::select_branch(self.simulation.store_mut(), tower, definition, branch)
    }

    pub fn set_speed(&mut self, speed: SpeedMode) {
        self.speed = speed;
        self.refresh_hud();
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        self.refresh_hud();
    }

    pub fn hud(&self) -> HudSnapshot {
        self.hud
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn enemy_count(&self) -> usize {
        self.simulation.enemy_count()
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn coins(&self) -> i32 {
        self.coins
    }

    /// Number of waves started so far
    pub fn wave(&self) -> usize {
        self.wave_index
    }

    pub fn wave_in_progress(&self) -> bool {
        self.wave_in_progress
    }

    pub fn level(&self) -> &LevelDefinition {
        &self.level
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    fn accrue_income(&mut self, dt: f32) {
        self.income_timer += dt;
        if self.income_timer < self.simulation.config().income_interval {
            return;
        }
        let store = self.simulation.store();
        let income: i32 = store
            .query_entities(ECONOMY)
            .into_iter()
            .filter_map(|entity| store.get_economy(entity))
            .map(|economy| economy.income as i32)
            .sum();
        self.coins += income;
        self.income_timer = 0.0;
    }

    fn advance_spawns(&mut self, dt: f32) {
        if self.pending_spawns.is_empty() {
            return;
        }
        self.spawn_timer -= dt;
        if self.spawn_timer > 0.0 {
            return;
        }
        let Some(entry) = self.pending_spawns.pop() else {
            return;
        };
        self.spawn_entry(&entry);
        self.spawn_timer = self.pending_spawns.last().map_or(0.0, |next| next.delay);
    }

    fn spawn_entry(&mut self, entry: &WaveSpawn) {
        let Some(definition) = self.definitions.enemies.get(&entry.enemy_type) else {
            tracing::warn!(enemy = %entry.enemy_type, "skipping unknown enemy type");
            return;
        };
        let scaling = EnemyScaling::for_wave(&self.definitions.balance, self.wave_index as u32);
        let path_count = self.simulation.paths().len().max(1);
        for i in 0..entry.count as usize {
            self.simulation.spawn_enemy(definition, i % path_count, &scaling);
        }
    }

    fn check_wave_clear(&mut self, enemies_remaining: usize) {
        if !self.pending_spawns.is_empty() || !self.wave_in_progress || enemies_remaining > 0 {
            return;
        }
        self.wave_in_progress = false;
        self.coins += self.definitions.balance.wave_clear_bonus as i32;
        tracing::debug!(wave = self.wave_index, "wave cleared");

        if self.wave_index >= self.waves.len() {
            tracing::info!(level = %self.level.id, "victory");
            self.outcome = Some(Outcome::Victory);
        }
    }

    fn start_next_wave(&mut self) {
        let Some(wave) = self.waves.get(self.wave_index) else {
            tracing::info!(level = %self.level.id, "victory");
            self.outcome = Some(Outcome::Victory);
            return;
        };
        self.pending_spawns = wave.enemies.iter().rev().cloned().collect();
        self.spawn_timer = self.pending_spawns.last().map_or(0.0, |first| first.delay);
        self.wave_timer = wave.spawn_interval;
        self.wave_index += 1;
        self.wave_in_progress = true;
        tracing::debug!(
            wave = self.wave_index,
            entries = self.pending_spawns.len(),
            "wave started"
        );
    }

    fn refresh_hud(&mut self) {
        self.hud = HudSnapshot {
            lives: self.lives,
            coins: self.coins,
            wave: self.wave_index as u32,
            speed: self.speed.multiplier(),
            paused: self.paused,
        };
    }
}

fn tower_definition<'a>(
    definitions: &'a Definitions,
    store: &EntityStore,
    tower: Entity,
) -> SimResult<&'a TowerDefinition> {
    let stats = store
        .get_tower_stats(tower)
        .ok_or(SimError::NotATower(tower))?;
    definitions
        .towers
        .get(&stats.id)
        .ok_or_else(|| SimError::UnknownTower(stats.id.clone()))
}

fn cell_centre(cell: IVec2, tile_size: f32) -> Vec2 {
    cell.as_vec2() * tile_size + Vec2::splat(tile_size * 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{BalanceDefinition, EnemyDefinition, UpgradeModifier};

    fn meadow(start_lives: i32) -> LevelDefinition {
        LevelDefinition {
            id: "meadow".into(),
            tile_size: 40.0,
            paths: vec![vec![0, 0, 5, 0]],
            buildable: vec![IVec2::new(2, 1), IVec2::new(4, 1)],
            start_coins: 200,
            start_lives,
            ..Default::default()
        }
    }

    fn one_wave(enemy_type: &str) -> Vec<WaveDefinition> {
        vec![WaveDefinition {
            id: 1,
            spawn_interval: 3.0,
            enemies: vec![WaveSpawn {
                enemy_type: enemy_type.into(),
                count: 2,
                delay: 0.5,
            }],
        }]
    }

    fn definitions(start_lives: i32, waves: Vec<WaveDefinition>) -> Definitions {
        Definitions {
            balance: BalanceDefinition {
                kill_reward_bonus: 1.0,
                wave_clear_bonus: 25.0,
                ..Default::default()
            },
            ..Default::default()
        }
        .with_level(meadow(start_lives))
        .with_waves("meadow", waves)
        .with_enemy(EnemyDefinition {
            id: "grunt".into(),
            hp: 10.0,
            speed: 100.0,
            reward: 5,
            ..Default::default()
        })
        .with_tower(TowerDefinition {
            id: "arrow_mk1".into(),
            cost: 100,
            damage: 50.0,
            fire_rate: 2.0,
            range: 120.0,
            upgrades: vec![UpgradeModifier {
                level: 2,
                damage: 10.0,
                ..Default::default()
            }],
            ..Default::default()
        })
        .with_tower(TowerDefinition {
            id: "mint".into(),
            cost: 50,
            income: 3.0,
            ..Default::default()
        })
        .with_tower(TowerDefinition {
            id: "fortress".into(),
            cost: 500,
            ..Default::default()
        })
    }

    fn session(start_lives: i32) -> Session {
        Session::new(definitions(start_lives, one_wave("grunt")), "meadow", SimConfig::default())
            .unwrap()
    }

    #[test]
    fn test_unknown_level() {
        let result = Session::new(definitions(3, Vec::new()), "swamp", SimConfig::default());
        assert!(matches!(result, Err(SimError::UnknownLevel(id)) if id == "swamp"));
    }

    #[test]
    fn test_starts_with_level_resources() {
        let session = session(3);
        assert_eq!(
            session.hud(),
            HudSnapshot {
                lives: 3,
                coins: 200,
                wave: 0,
                speed: 1,
                paused: false,
            }
        );
        assert_eq!(session.outcome(), None);
        assert_eq!(session.simulation().paths().len(), 1);
    }

    #[test]
    fn test_wave_starts_after_delay_and_spawns_entries() {
        let mut session = session(3);

        session.update(1.0);
        assert_eq!(session.wave(), 0);
        session.update(1.0);
        assert_eq!(session.wave(), 1);
        assert!(session.wave_in_progress());
        assert_eq!(session.enemy_count(), 0);

        session.update(0.5);
        assert_eq!(session.enemy_count(), 2);
        assert_eq!(session.hud().wave, 1);
    }

    #[test]
    fn test_leaks_cost_lives_then_clear_wins() {
        let mut session = session(3);
        for dt in [1.0, 1.0, 0.5, 1.0] {
            session.update(dt);
        }
        assert_eq!(session.lives(), 3);

        let report = session.update(1.0);
        assert_eq!(report.lives_lost, 2);
        assert_eq!(session.lives(), 1);
        assert_eq!(session.coins(), 225);
        assert_eq!(session.outcome(), Some(Outcome::Victory));
    }

    #[test]
    fn test_defeat_when_lives_run_out() {
        let mut session = session(2);
        for dt in [1.0, 1.0, 0.5, 1.0, 1.0] {
            session.update(dt);
        }
        assert_eq!(session.outcome(), Some(Outcome::Defeat));
        assert_eq!(session.hud().lives, 0);

        let report = session.update(1.0);
        assert_eq!(report, FrameReport::default());
        assert_eq!(session.coins(), 200);
    }

    #[test]
    fn test_tower_defends_the_wave() {
        let mut session = Session::new(
            definitions(3, one_wave("grunt")),
            "meadow",
            SimConfig::default().with_cell_size(256.0),
        )
        .unwrap();
        session.place_tower("arrow_mk1", Vec2::new(100.0, 60.0)).unwrap();
        assert_eq!(session.coins(), 100);

        for _ in 0..200 {
            session.update(0.05);
            if session.outcome().is_some() {
                break;
            }
        }
        assert_eq!(session.outcome(), Some(Outcome::Victory));
        assert_eq!(session.lives(), 3);
        // two kills at 5 + 1 bonus each, then the clear bonus
        assert_eq!(session.coins(), 137);
    }

    #[test]
    fn test_passive_income() {
        let mut session = session(3);
        session.place_tower("mint", Vec2::new(180.0, 60.0)).unwrap();
        assert_eq!(session.coins(), 150);

        session.update(0.5);
        assert_eq!(session.coins(), 150);
        session.update(0.5);
        assert_eq!(session.coins(), 153);
    }

    #[test]
    fn test_speed_mode_scales_time() {
        let mut session = session(3);
        session.place_tower("mint", Vec2::new(180.0, 60.0)).unwrap();
        session.set_speed(SpeedMode::Triple);
        assert_eq!(session.hud().speed, 3);

        session.update(0.5);
        assert_eq!(session.coins(), 153);
    }

    #[test]
    fn test_pause_freezes_everything_but_hud() {
        let mut session = session(3);
        session.toggle_pause();
        session.update(10.0);
        assert_eq!(session.wave(), 0);
        assert!(session.hud().paused);

        session.toggle_pause();
        session.update(2.0);
        assert_eq!(session.wave(), 1);
        assert!(!session.hud().paused);
    }

    #[test]
    fn test_placement_errors() {
        let mut session = session(3);

        assert!(matches!(
            session.place_tower("arrow_mk1", Vec2::new(0.0, 0.0)),
            Err(SimError::NotBuildable { .. })
        ));
        assert!(matches!(
            session.place_tower("ghost", Vec2::new(100.0, 60.0)),
            Err(SimError::UnknownTower(_))
        ));
        assert!(matches!(
            session.place_tower("fortress", Vec2::new(100.0, 60.0)),
            Err(SimError::InsufficientCoins {
                needed: 500,
                available: 200
            })
        ));

        let tower = session.place_tower("arrow_mk1", Vec2::new(110.0, 55.0)).unwrap();
        assert_eq!(
            session.simulation().store().get_transform(tower).unwrap().position,
            Vec2::new(100.0, 60.0)
        );
        assert!(matches!(
            session.place_tower("mint", Vec2::new(100.0, 60.0)),
            Err(SimError::CellOccupied(existing)) if existing == tower
        ));
        assert_eq!(session.coins(), 100);
    }

    #[test]
    fn test_upgrades_through_session() {
        let mut session = session(3);
        let tower = session.place_tower("arrow_mk1", Vec2::new(100.0, 60.0)).unwrap();

        assert_eq!(session.upgrade_tower(tower).unwrap(), 2);
        assert_eq!(
            session.simulation().store().get_tower_stats(tower).unwrap().damage,
            60.0
        );
        assert!(matches!(
            session.upgrade_tower(tower),
            Err(SimError::MaxLevel { .. })
        ));
        session.select_branch(tower, Branch::A).unwrap();
        assert!(matches!(
            session.select_branch(tower, Branch::B),
            Err(SimError::BranchAlreadySelected(_))
        ));
        assert_eq!(session.coins(), 100);
    }

    #[test]
    fn test_unknown_enemy_entries_are_skipped() {
        let mut session = Session::new(
            definitions(3, one_wave("ghoul")),
            "meadow",
            SimConfig::default(),
        )
        .unwrap();
        for dt in [1.0, 1.0, 0.5] {
            session.update(dt);
        }
        assert_eq!(session.enemy_count(), 0);
        assert_eq!(session.outcome(), Some(Outcome::Victory));
    }

    #[test]
    fn test_level_without_waves_is_won_once_countdown_ends() {
        let mut session =
            Session::new(definitions(3, Vec::new()), "meadow", SimConfig::default()).unwrap();
        session.update(1.0);
        assert_eq!(session.outcome(), None);
        session.update(1.0);
        assert_eq!(session.outcome(), Some(Outcome::Victory));
    }
}
