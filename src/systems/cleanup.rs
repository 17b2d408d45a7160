use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::pool::EntityPool;
use crate::store::{Entity, EntityStore, HEALTH, PROJECTILE};

/// An enemy removed by cleanup, with what the orchestrator needs to credit it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kill {
    pub entity: Entity,
    pub position: Vec2,
    pub reward: i32,
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct CleanupOutcome {
    pub kills: Vec<Kill>,
    pub recycled: u32,
}

/// Remove every entity whose health reached zero.
/// Projectiles go back to the pool, everything else is destroyed.
pub fn update_cleanup(store: &mut EntityStore, pool: &mut EntityPool) -> CleanupOutcome {
    let mut outcome = CleanupOutcome::default();
    let dead: Vec<Entity> = store
        .query_entities(HEALTH)
        .into_iter()
        .filter(|&entity| store.get_health(entity).is_some_and(|health| health.hp <= 0.0))
        .collect();

    for entity in dead {
        if crate::has_components!(store, entity, PROJECTILE) {
            if pool.release(store, entity) {
                outcome.recycled += 1;
            }
            continue;
        }

        if let Some(stats) = store.get_enemy_stats(entity) {
            let position = store
                .get_transform(entity)
                .map_or(Vec2::ZERO, |transform| transform.position);
            tracing::debug!(%entity, reward = stats.reward, "enemy killed");
            outcome.kills.push(Kill {
                entity,
                position,
                reward: stats.reward,
            });
        }
        store.destroy(entity);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{EnemyStats, Health, Projectile, Transform};
    use crate::store::{EntityKind, TRANSFORM};

    #[test]
    fn test_kills_dead_enemies_and_reports_reward() {
        let mut store = EntityStore::default();
        let mut pool = EntityPool::default();
        let dead = store.create();
        store.set_transform(dead, Transform { position: Vec2::new(7.0, 8.0) });
        store.set_health(dead, Health { hp: -3.0, max_hp: 10.0 });
        store.set_enemy_stats(
            dead,
            EnemyStats {
                reward: 12,
                ..Default::default()
            },
        );
        let alive = store.create();
        store.set_health(alive, Health { hp: 0.5, max_hp: 10.0 });
        store.set_enemy_stats(alive, EnemyStats::default());

        let outcome = update_cleanup(&mut store, &mut pool);
        assert_eq!(
            outcome.kills,
            vec![Kill {
                entity: dead,
                position: Vec2::new(7.0, 8.0),
                reward: 12,
            }]
        );
        assert_eq!(outcome.recycled, 0);
        assert!(!store.is_alive(dead));
        assert!(store.is_alive(alive));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_spent_projectiles_return_to_pool() {
        let mut store = EntityStore::default();
        let mut pool = EntityPool::default();
        let shot = store.create();
        store.set_projectile(shot, Projectile::default());
        store.set_health(shot, Health { hp: 0.0, max_hp: 1.0 });
        store.set_kind(shot, EntityKind::Projectile);

        let outcome = update_cleanup(&mut store, &mut pool);
        assert_eq!(outcome.recycled, 1);
        assert!(outcome.kills.is_empty());
        assert_eq!(pool.available, vec![shot]);
        assert!(store.is_alive(shot));
        assert_eq!(store.component_mask(shot), Some(TRANSFORM));
        assert_eq!(store.kind(shot), Some(EntityKind::Pooled));
    }

    #[test]
    fn test_dead_non_enemy_is_destroyed_without_kill() {
        let mut store = EntityStore::default();
        let mut pool = EntityPool::default();
        let crate_box = store.create();
        store.set_health(crate_box, Health::default());

        let outcome = update_cleanup(&mut store, &mut pool);
        assert!(outcome.kills.is_empty());
        assert!(!store.is_alive(crate_box));
    }
}
