//! Per-frame gameplay systems.
//!
//! Each system is a free function over the [`EntityStore`] plus whatever shared
//! resources it reads. None of them fail: entities missing a component are skipped.
//! The order they run in is owned by [`Schedule`](crate::schedule::Schedule).

pub mod cleanup;
pub mod firing;
pub mod movement;
pub mod projectile;
pub mod status;
pub mod targeting;

pub use cleanup::{CleanupOutcome, Kill, update_cleanup};
pub use firing::update_firing;
pub use movement::{MovementOutcome, update_movement};
pub use projectile::{ProjectileOutcome, update_projectiles};
pub use status::update_status;
pub use targeting::update_targeting;

use crate::spatial::SpatialGrid;
use crate::store::{ENEMY_STATS, EntityStore, TRANSFORM};

/// Rebuild the spatial grid from the current enemy positions, in slot order
pub fn index_enemies(store: &EntityStore, grid: &mut SpatialGrid) {
    grid.clear();
    for enemy in store.query_entities(ENEMY_STATS | TRANSFORM) {
        if let Some(transform) = store.get_transform(enemy) {
            grid.insert(enemy, transform.position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{EnemyStats, Transform};
    use glam::Vec2;

    #[test]
    fn test_index_enemies_only_indexes_enemies() {
        let mut store = EntityStore::default();
        let enemy = store.create();
        store.set_enemy_stats(enemy, EnemyStats::default());
        store.set_transform(enemy, Transform { position: Vec2::new(10.0, 10.0) });
        let tower = store.create();
        store.set_transform(tower, Transform { position: Vec2::new(12.0, 10.0) });

        let mut grid = SpatialGrid::new(64.0);
        grid.insert(tower, Vec2::ZERO);
        index_enemies(&store, &mut grid);

        let mut found = Vec::new();
        grid.query(Vec2::new(10.0, 10.0), |entity| found.push(entity));
        assert_eq!(found, vec![enemy]);
        assert_eq!(grid.len(), 1);
    }
}
