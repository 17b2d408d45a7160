//! Component records attached to entities in the [`EntityStore`](crate::store::EntityStore).
//!
//! Every component is plain data: `Default + Clone + Debug + Serialize + Deserialize`.
//! Behaviour lives in the systems, not here, with the exception of the status stacking rule.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::store::Entity;

/// Role of an entity, stored alongside it in the entity store
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    #[default]
    Unassigned,
    Enemy,
    Tower,
    Projectile,
    /// A spent projectile parked in a pool. Never rendered or simulated.
    Pooled,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub hp: f32,
    pub max_hp: f32,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Armor {
    pub armor: f32,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagicResist {
    pub resist: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub speed: f32,
    pub path_index: usize,
    pub waypoint: usize,
    /// Fraction of the current segment already covered, always in `[0, 1)`
    pub progress: f32,
    pub reward: i32,
    pub abilities: Vec<String>,
    pub flying: bool,
    pub stealth: bool,
    /// Seconds until a stealthed enemy becomes targetable
    pub stealth_timer: f32,
    /// Recomputed from active statuses every frame
    pub speed_modifier: f32,
    pub dot_timer: f32,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            speed: 0.0,
            path_index: 0,
            waypoint: 0,
            progress: 0.0,
            reward: 0,
            abilities: Vec::new(),
            flying: false,
            stealth: false,
            stealth_timer: 0.0,
            speed_modifier: 1.0,
            dot_timer: 0.0,
        }
    }
}

impl EnemyStats {
    /// Distance travelled along the path, in segments
    pub fn path_position(&self) -> f32 {
        self.waypoint as f32 + self.progress
    }

    pub fn is_hidden(&self) -> bool {
        self.stealth && self.stealth_timer > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    pub id: String,
    pub status_effect: String,
    pub damage: f32,
    pub fire_rate: f32,
    pub cooldown: f32,
    pub range: f32,
    pub aoe_radius: f32,
    pub armor_pen: f32,
    pub chain: f32,
    pub pierce: f32,
    pub status_potency: f32,
    pub status_duration: f32,
    pub can_hit_flying: bool,
    pub level: u32,
    pub branch_a_selected: bool,
    pub branch_b_selected: bool,
}

impl Default for TowerStats {
    fn default() -> Self {
        Self {
            id: String::new(),
            status_effect: String::new(),
            damage: 0.0,
            fire_rate: 1.0,
            cooldown: 0.0,
            range: 100.0,
            aoe_radius: 0.0,
            armor_pen: 0.0,
            chain: 0.0,
            pierce: 0.0,
            status_potency: 0.0,
            status_duration: 0.0,
            can_hit_flying: false,
            level: 1,
            branch_a_selected: false,
            branch_b_selected: false,
        }
    }
}

impl TowerStats {
    /// The status a shot from this tower carries, if any
    pub fn status_payload(&self) -> Option<StatusPayload> {
        (self.status_potency > 0.0 && !self.status_effect.is_empty()).then(|| StatusPayload {
            id: self.status_effect.clone(),
            power: self.status_potency,
            duration: self.status_duration,
        })
    }
}

/// How a tower picks among the enemies it can see
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetingMode {
    /// Scores `-(waypoint + progress)`, so the enemy least far along its path wins
    #[default]
    First,
    /// Scores `waypoint + progress`, so the enemy furthest along its path wins
    Last,
    Closest,
    HighestHp,
    LowestArmor,
}

impl FromStr for TargetingMode {
    type Err = std::convert::Infallible;

    /// Unknown names fall back to [`TargetingMode::First`]
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Ok(match name {
            "last" => Self::Last,
            "closest" => Self::Closest,
            "highest_hp" => Self::HighestHp,
            "lowest_armor" => Self::LowestArmor,
            _ => Self::First,
        })
    }
}

impl TargetingMode {
    /// Higher is better. Scores are only compared between candidates of one tower.
    pub fn score(self, enemy: &EnemyStats, distance: f32, hp: f32, armor: f32) -> f32 {
        match self {
            Self::Closest => -distance,
            Self::HighestHp => hp,
            Self::LowestArmor => -armor,
            Self::Last => enemy.path_position(),
            Self::First => -enemy.path_position(),
        }
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Targeting {
    pub current_target: Option<Entity>,
    pub mode: TargetingMode,
}

/// Status carried by a projectile and applied on impact
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusPayload {
    pub id: String,
    pub power: f32,
    pub duration: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub speed: f32,
    pub damage: f32,
    pub armor_pen: f32,
    pub pierce: f32,
    /// Maximum distance before the projectile is spent
    pub range: f32,
    pub travelled: f32,
    pub target: Option<Entity>,
    pub status: Option<StatusPayload>,
    pub aoe_radius: f32,
}

impl Default for Projectile {
    fn default() -> Self {
        Self {
            speed: 0.0,
            damage: 0.0,
            armor_pen: 0.0,
            pierce: 0.0,
            range: 150.0,
            travelled: 0.0,
            target: None,
            status: None,
            aoe_radius: 0.0,
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusInstance {
    pub id: String,
    pub power: f32,
    pub duration: f32,
    pub time_left: f32,
    pub stacks: u32,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusContainer {
    pub active: Vec<StatusInstance>,
}

impl StatusContainer {
    /// Stack onto an existing instance with the same id, or append a new one.
    ///
    /// Stacking adds power, bumps the stack count and refreshes `time_left`
    /// to the longer of the remaining and the new duration.
    pub fn apply(&mut self, payload: &StatusPayload) {
        if let Some(status) = self.active.iter_mut().find(|status| status.id == payload.id) {
            status.power += payload.power;
            status.time_left = status.time_left.max(payload.duration);
            status.duration = payload.duration;
            status.stacks += 1;
            return;
        }
        self.active.push(StatusInstance {
            id: payload.id.clone(),
            power: payload.power,
            duration: payload.duration,
            time_left: payload.duration,
            stacks: 1,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Passive income, in coins per income interval
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Economy {
    pub income: f32,
}
