//! Entity factories for enemies and towers.

use glam::Vec2;

use crate::components::{
    Armor, Economy, EnemyStats, Health, MagicResist, StatusContainer, Targeting, TowerStats,
    Transform,
};
use crate::definitions::{BalanceDefinition, EnemyDefinition, TowerDefinition};
use crate::path::Path;
use crate::store::{Entity, EntityKind, EntityStore};

/// Multipliers applied to an enemy definition at spawn time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyScaling {
    pub hp: f32,
    pub speed: f32,
    pub reward: f32,
}

impl Default for EnemyScaling {
    fn default() -> Self {
        Self {
            hp: 1.0,
            speed: 1.0,
            reward: 1.0,
        }
    }
}

impl EnemyScaling {
    /// Global balance multipliers combined with the difficulty curve at `wave`
    pub fn for_wave(balance: &BalanceDefinition, wave: u32) -> Self {
        let step = balance.difficulty_at(wave);
        Self {
            hp: balance.enemy_hp_multiplier * step.hp,
            speed: balance.enemy_speed_multiplier * step.speed,
            reward: balance.enemy_reward_multiplier * step.reward,
        }
    }
}

pub fn spawn_enemy(
    store: &mut EntityStore,
    definition: &EnemyDefinition,
    path: Option<&Path>,
    path_index: usize,
    scaling: &EnemyScaling,
    stealth_reveal_time: f32,
) -> Entity {
    let enemy = store.create();
    let hp = definition.hp * scaling.hp;
    let stealth = definition.is_stealthed();

    store.set_transform(
        enemy,
        Transform {
            position: path.map_or(Vec2::ZERO, Path::start),
        },
    );
    store.set_health(enemy, Health { hp, max_hp: hp });
    store.set_armor(
        enemy,
        Armor {
            armor: definition.armor,
        },
    );
    store.set_magic_resist(
        enemy,
        MagicResist {
            resist: definition.magic_resist,
        },
    );
    store.set_enemy_stats(
        enemy,
        EnemyStats {
            speed: definition.speed * scaling.speed,
            path_index,
            reward: (definition.reward as f32 * scaling.reward).round() as i32,
            abilities: definition.abilities.clone(),
            flying: definition.is_flying(),
            stealth,
            stealth_timer: if stealth { stealth_reveal_time } else { 0.0 },
            ..Default::default()
        },
    );
    store.set_status_container(enemy, StatusContainer::default());
    store.set_kind(enemy, EntityKind::Enemy);
    enemy
}

pub fn spawn_tower(store: &mut EntityStore, definition: &TowerDefinition, position: Vec2) -> Entity {
    let tower = store.create();
    store.set_transform(tower, Transform { position });
    store.set_tower_stats(
        tower,
        TowerStats {
            id: definition.id.clone(),
            status_effect: definition.status_effect.clone(),
            damage: definition.damage,
            fire_rate: definition.fire_rate,
            range: definition.range,
            aoe_radius: definition.aoe_radius,
            armor_pen: definition.armor_pen,
            chain: definition.chain,
            pierce: definition.pierce,
            status_potency: definition.status_potency,
            status_duration: definition.status_duration,
            can_hit_flying: definition.can_hit_flying,
            ..Default::default()
        },
    );
    store.set_targeting(tower, Targeting::default());
    if definition.income > 0.0 {
        store.set_economy(
            tower,
            Economy {
                income: definition.income,
            },
        );
    }
    store.set_kind(tower, EntityKind::Tower);
    tower
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::TargetingMode;
    use crate::definitions::DifficultyStep;
    use crate::store::{ECONOMY, TARGETING, TOWER_STATS, TRANSFORM};

    fn wisp() -> EnemyDefinition {
        EnemyDefinition {
            id: "wisp".into(),
            hp: 40.0,
            speed: 80.0,
            armor: 5.0,
            magic_resist: 10.0,
            reward: 7,
            abilities: vec!["stealth".into()],
            tags: vec!["air".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_enemy_starts_at_path_head() {
        let mut store = EntityStore::default();
        let path = Path::new(vec![Vec2::new(20.0, 60.0), Vec2::new(200.0, 60.0)]);
        let enemy = spawn_enemy(&mut store, &wisp(), Some(&path), 1, &EnemyScaling::default(), 2.5);

        assert_eq!(store.get_transform(enemy).unwrap().position, Vec2::new(20.0, 60.0));
        assert_eq!(store.get_health(enemy).unwrap().hp, 40.0);
        assert_eq!(store.get_armor(enemy).unwrap().armor, 5.0);
        assert_eq!(store.get_magic_resist(enemy).unwrap().resist, 10.0);
        assert!(store.get_status_container(enemy).unwrap().is_empty());
        assert_eq!(store.kind(enemy), Some(EntityKind::Enemy));

        let stats = store.get_enemy_stats(enemy).unwrap();
        assert_eq!(stats.path_index, 1);
        assert_eq!(stats.waypoint, 0);
        assert_eq!(stats.reward, 7);
        assert!(stats.flying);
        assert!(stats.stealth);
        assert_eq!(stats.stealth_timer, 2.5);
        assert_eq!(stats.speed_modifier, 1.0);
    }

    #[test]
    fn test_enemy_without_path_spawns_at_origin() {
        let mut store = EntityStore::default();
        let grunt = EnemyDefinition::default();
        let enemy = spawn_enemy(&mut store, &grunt, None, 0, &EnemyScaling::default(), 2.5);

        assert_eq!(store.get_transform(enemy).unwrap().position, Vec2::ZERO);
        let stats = store.get_enemy_stats(enemy).unwrap();
        assert!(!stats.flying);
        assert!(!stats.stealth);
        assert_eq!(stats.stealth_timer, 0.0);
    }

    #[test]
    fn test_scaling_from_balance_and_curve() {
        let balance = BalanceDefinition {
            enemy_hp_multiplier: 2.0,
            enemy_speed_multiplier: 0.5,
            enemy_reward_multiplier: 1.0,
            difficulty_curve: vec![DifficultyStep {
                level: 3,
                hp: 1.5,
                speed: 2.0,
                reward: 2.0,
            }],
            ..Default::default()
        };
        assert_eq!(
            EnemyScaling::for_wave(&balance, 1),
            EnemyScaling {
                hp: 2.0,
                speed: 0.5,
                reward: 1.0
            }
        );
        let scaling = EnemyScaling::for_wave(&balance, 4);
        assert_eq!(scaling.hp, 3.0);

        let mut store = EntityStore::default();
        let enemy = spawn_enemy(&mut store, &wisp(), None, 0, &scaling, 2.5);
        assert_eq!(store.get_health(enemy).unwrap().max_hp, 120.0);
        assert_eq!(store.get_enemy_stats(enemy).unwrap().speed, 80.0);
        assert_eq!(store.get_enemy_stats(enemy).unwrap().reward, 14);
    }

    #[test]
    fn test_tower_copies_definition() {
        let mut store = EntityStore::default();
        let definition = TowerDefinition {
            id: "mint".into(),
            damage: 12.0,
            fire_rate: 0.5,
            range: 90.0,
            income: 3.0,
            can_hit_flying: true,
            ..Default::default()
        };
        let tower = spawn_tower(&mut store, &definition, Vec2::new(60.0, 100.0));

        assert!(crate::has_components!(store, tower, TRANSFORM | TOWER_STATS | TARGETING | ECONOMY));
        let stats = store.get_tower_stats(tower).unwrap();
        assert_eq!(stats.id, "mint");
        assert_eq!(stats.damage, 12.0);
        assert_eq!(stats.level, 1);
        assert_eq!(stats.cooldown, 0.0);
        assert!(stats.can_hit_flying);
        assert_eq!(store.get_economy(tower).unwrap().income, 3.0);
        assert_eq!(store.get_targeting(tower).unwrap().mode, TargetingMode::First);
        assert_eq!(store.kind(tower), Some(EntityKind::Tower));
    }

    #[test]
    fn test_tower_without_income_has_no_economy() {
        let mut store = EntityStore::default();
        let tower = spawn_tower(&mut store, &TowerDefinition::default(), Vec2::ZERO);
        assert!(store.get_economy(tower).is_none());
    }
}
