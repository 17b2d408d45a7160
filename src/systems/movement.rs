use crate::components::EnemyStats;
use crate::path::{Path, PathContext};
use crate::store::{ENEMY_STATS, Entity, EntityStore, TRANSFORM};

/// Largest `f32` below 1.0
const MAX_PROGRESS: f32 = 1.0 - f32::EPSILON / 2.0;

#[derive(Default, Debug, Clone, PartialEq)]
pub struct MovementOutcome {
    pub lives_lost: u32,
    /// Enemies that reached the end of their path this frame, already destroyed
    pub leaked: Vec<Entity>,
}

/// Walk every enemy along its path by `speed * speed_modifier * dt`.
///
/// Enemies reaching their final waypoint are destroyed after the pass and
/// each costs one life.
pub fn update_movement(store: &mut EntityStore, paths: &PathContext, dt: f32) -> MovementOutcome {
    let mut outcome = MovementOutcome::default();
    if paths.is_empty() {
        return outcome;
    }

    for enemy in store.query_entities(ENEMY_STATS | TRANSFORM) {
        let Some(stats) = store.get_enemy_stats_mut(enemy) else {
            continue;
        };
        let Some(path) = paths.get(stats.path_index) else {
            continue;
        };

        let distance = stats.speed * stats.speed_modifier * dt;
        if advance(stats, path, distance) {
            outcome.leaked.push(enemy);
            continue;
        }

        let position = path.sample(stats.waypoint, stats.progress);
        if let Some(transform) = store.get_transform_mut(enemy) {
            transform.position = position;
        }
    }

    for &enemy in &outcome.leaked {
        tracing::debug!(%enemy, "enemy reached the end of its path");
        store.destroy(enemy);
    }
    outcome.lives_lost = outcome.leaked.len() as u32;
    outcome
}

/// Consume `distance` along `path`, segment by segment.
/// Returns true once the final waypoint is reached.
pub fn advance(stats: &mut EnemyStats, path: &Path, mut distance: f32) -> bool {
    let last = path.last_waypoint();
    while stats.waypoint < last {
        let length = path.segment_length(stats.waypoint);
        if length <= 0.0 {
            stats.waypoint += 1;
            stats.progress = 0.0;
            continue;
        }
        if distance.is_nan() || distance <= 0.0 {
            break;
        }

        let remaining = (1.0 - stats.progress) * length;
        if distance < remaining {
            stats.progress = (stats.progress + distance / length).min(MAX_PROGRESS);
            distance = 0.0;
        } else {
            distance -= remaining;
            stats.waypoint += 1;
            stats.progress = 0.0;
        }
    }
    stats.waypoint >= last
}
