//! Read-only game content: towers, enemies, statuses, waves, levels and balance.
//!
//! Loading files is up to the host. Every type deserializes from camelCase keys and
//! falls back to defaults for absent fields, so parsed JSON can be handed straight in.

use glam::IVec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Additive stat changes unlocked at a given tower level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpgradeModifier {
    #[serde(alias = "lvl")]
    pub level: u32,
    pub damage: f32,
    pub fire_rate: f32,
    pub range: f32,
    pub armor_pen: f32,
    pub aoe_radius: f32,
    pub status_potency: f32,
    pub status_duration: f32,
    pub chain: f32,
    pub pierce: f32,
    pub income: f32,
}

/// One of the two mutually exclusive specialisations of a tower
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BranchModifier {
    pub name: String,
    pub description: String,
    pub damage: f32,
    pub fire_rate: f32,
    pub range: f32,
    pub armor_pen: f32,
    pub aoe_radius: f32,
    pub chain: f32,
    pub pierce: f32,
    pub status_potency: f32,
    pub status_duration: f32,
    pub income: f32,
    pub can_hit_flying: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TowerDefinition {
    pub id: String,
    pub name: String,
    pub role: String,
    pub cost: i32,
    pub damage: f32,
    pub fire_rate: f32,
    pub range: f32,
    pub aoe_radius: f32,
    pub armor_pen: f32,
    pub chain: f32,
    pub pierce: f32,
    pub status_effect: String,
    pub status_potency: f32,
    pub status_duration: f32,
    pub income: f32,
    pub can_hit_flying: bool,
    pub tags: Vec<String>,
    pub upgrades: Vec<UpgradeModifier>,
    pub branch_a: BranchModifier,
    pub branch_b: BranchModifier,
}

impl Default for TowerDefinition {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            role: String::new(),
            cost: 0,
            damage: 0.0,
            fire_rate: 1.0,
            range: 100.0,
            aoe_radius: 0.0,
            armor_pen: 0.0,
            chain: 0.0,
            pierce: 0.0,
            status_effect: String::new(),
            status_potency: 0.0,
            status_duration: 0.0,
            income: 0.0,
            can_hit_flying: false,
            tags: Vec::new(),
            upgrades: Vec::new(),
            branch_a: BranchModifier::default(),
            branch_b: BranchModifier::default(),
        }
    }
}

impl TowerDefinition {
    pub fn upgrade_for_level(&self, level: u32) -> Option<&UpgradeModifier> {
        self.upgrades.iter().find(|upgrade| upgrade.level == level)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnemyDefinition {
    pub id: String,
    pub name: String,
    pub hp: f32,
    pub speed: f32,
    pub armor: f32,
    pub magic_resist: f32,
    pub reward: i32,
    pub abilities: Vec<String>,
    pub tags: Vec<String>,
}

impl Default for EnemyDefinition {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            hp: 100.0,
            speed: 60.0,
            armor: 0.0,
            magic_resist: 0.0,
            reward: 5,
            abilities: Vec::new(),
            tags: Vec::new(),
        }
    }
}

impl EnemyDefinition {
    pub fn is_flying(&self) -> bool {
        self.tags.iter().any(|tag| tag == "air")
    }

    pub fn is_stealthed(&self) -> bool {
        self.abilities.iter().any(|ability| ability == "stealth")
    }
}

/// Per-frame effect of a status id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusDefinition {
    /// Speed multiplier, applied when strictly between 0 and 1
    pub multiplier: f32,
    pub duration: f32,
    pub dps: f32,
    /// Extra damage per second for every stack beyond the first
    pub stack_dps: f32,
    pub stun: f32,
    pub armor: f32,
    pub magic_resist: f32,
}

impl Default for StatusDefinition {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            duration: 0.0,
            dps: 0.0,
            stack_dps: 0.0,
            stun: 0.0,
            armor: 0.0,
            magic_resist: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WaveSpawn {
    #[serde(rename = "type")]
    pub enemy_type: String,
    pub count: u32,
    /// Countdown before this entry spawns
    pub delay: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WaveDefinition {
    pub id: u32,
    /// Countdown to the next wave once this one is cleared
    pub spawn_interval: f32,
    pub enemies: Vec<WaveSpawn>,
}

impl Default for WaveDefinition {
    fn default() -> Self {
        Self {
            id: 0,
            spawn_interval: 1.0,
            enemies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LevelDefinition {
    pub id: String,
    pub name: String,
    pub biome: String,
    pub width: u32,
    pub height: u32,
    pub tile_size: f32,
    /// Flat tile-coordinate lists, see [`PathContext::from_tiles`](crate::path::PathContext::from_tiles)
    pub paths: Vec<Vec<i32>>,
    pub buildable: Vec<IVec2>,
    pub obstacles: Vec<IVec2>,
    pub rules: Vec<String>,
    /// Key into [`Definitions::waves`]. Empty means the level id.
    pub waves_id: String,
    pub start_coins: i32,
    pub start_lives: i32,
}

impl Default for LevelDefinition {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            biome: String::new(),
            width: 32,
            height: 18,
            tile_size: 40.0,
            paths: Vec::new(),
            buildable: Vec::new(),
            obstacles: Vec::new(),
            rules: Vec::new(),
            waves_id: String::new(),
            start_coins: 300,
            start_lives: 20,
        }
    }
}

/// Multipliers applied to enemies from a given wave onwards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DifficultyStep {
    pub level: u32,
    pub hp: f32,
    pub speed: f32,
    pub reward: f32,
}

impl Default for DifficultyStep {
    fn default() -> Self {
        Self {
            level: 0,
            hp: 1.0,
            speed: 1.0,
            reward: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BalanceDefinition {
    pub base_lives: i32,
    pub base_coins: i32,
    pub enemy_hp_multiplier: f32,
    pub enemy_speed_multiplier: f32,
    pub enemy_reward_multiplier: f32,
    pub difficulty_curve: Vec<DifficultyStep>,
    pub statuses: HashMap<String, StatusDefinition>,
    pub kill_reward_bonus: f32,
    pub wave_clear_bonus: f32,
}

impl Default for BalanceDefinition {
    fn default() -> Self {
        Self {
            base_lives: 20,
            base_coins: 300,
            enemy_hp_multiplier: 1.0,
            enemy_speed_multiplier: 1.0,
            enemy_reward_multiplier: 1.0,
            difficulty_curve: Vec::new(),
            statuses: HashMap::new(),
            kill_reward_bonus: 0.0,
            wave_clear_bonus: 0.0,
        }
    }
}

impl BalanceDefinition {
    /// The curve step with the highest level not above `wave`, or a neutral step
    pub fn difficulty_at(&self, wave: u32) -> DifficultyStep {
        self.difficulty_curve
            .iter()
            .filter(|step| step.level <= wave)
            .max_by_key(|step| step.level)
            .copied()
            .unwrap_or_default()
    }
}

/// Everything a session needs to run any level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Definitions {
    pub towers: HashMap<String, TowerDefinition>,
    pub enemies: HashMap<String, EnemyDefinition>,
    pub waves: HashMap<String, Vec<WaveDefinition>>,
    pub levels: HashMap<String, LevelDefinition>,
    pub balance: BalanceDefinition,
}

impl Definitions {
    pub fn with_tower(mut self, tower: TowerDefinition) -> Self {
        self.towers.insert(tower.id.clone(), tower);
        self
    }

    pub fn with_enemy(mut self, enemy: EnemyDefinition) -> Self {
        self.enemies.insert(enemy.id.clone(), enemy);
        self
    }

    pub fn with_level(mut self, level: LevelDefinition) -> Self {
        self.levels.insert(level.id.clone(), level);
        self
    }

    pub fn with_waves(mut self, key: impl Into<String>, waves: Vec<WaveDefinition>) -> Self {
        self.waves.insert(key.into(), waves);
        self
    }

    /// Waves of a level, looked up by its `waves_id` and then by its own id
    pub fn waves_for(&self, level: &LevelDefinition) -> &[WaveDefinition] {
        let key = if level.waves_id.is_empty() {
            &level.id
        } else {
            &level.waves_id
        };
        self.waves
            .get(key)
            .or_else(|| self.waves.get(&level.id))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
