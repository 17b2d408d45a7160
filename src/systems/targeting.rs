use crate::components::Targeting;
use crate::config::TargetingQuery;
use crate::spatial::SpatialGrid;
use crate::store::{Entity, EntityStore, TOWER_STATS, TRANSFORM};

/// Pick a target for every tower from the enemies indexed in `grid`.
///
/// Candidates must carry Transform, EnemyStats and Health, be visible to the tower
/// and lie within its range. The highest score under the tower's mode wins; on a tie
/// the first candidate visited is kept.
pub fn update_targeting(store: &mut EntityStore, grid: &SpatialGrid, query: TargetingQuery) {
    for tower in store.query_entities(TOWER_STATS | TRANSFORM) {
        let target = select_target(store, grid, query, tower);
        match store.get_targeting_mut(tower) {
            Some(targeting) => targeting.current_target = target,
            None => {
                store.set_targeting(
                    tower,
                    Targeting {
                        current_target: target,
                        ..Default::default()
                    },
                );
            }
        }
    }
}

fn select_target(
    store: &EntityStore,
    grid: &SpatialGrid,
    query: TargetingQuery,
    tower: Entity,
) -> Option<Entity> {
    let (Some(transform), Some(stats)) = (store.get_transform(tower), store.get_tower_stats(tower))
    else {
        return None;
    };
    let origin = transform.position;
    let mode = store
        .get_targeting(tower)
        .map(|targeting| targeting.mode)
        .unwrap_or_default();

    let mut best_score = f32::NEG_INFINITY;
    let mut best = None;
    let mut consider = |candidate: Entity| {
        let (Some(transform), Some(enemy), Some(health)) = (
            store.get_transform(candidate),
            store.get_enemy_stats(candidate),
            store.get_health(candidate),
        ) else {
            return;
        };
        if enemy.flying && !stats.can_hit_flying {
            return;
        }
        if enemy.is_hidden() {
            return;
        }
        let distance = origin.distance(transform.position);
        if distance > stats.range {
            return;
        }
        let armor = store.get_armor(candidate).map_or(0.0, |armor| armor.armor);
        let score = mode.score(enemy, distance, health.hp, armor);
        if score > best_score {
            best_score = score;
            best = Some(candidate);
        }
    };

    match query {
        TargetingQuery::SameCell => grid.query(origin, &mut consider),
        TargetingQuery::Radius => grid.query_radius(origin, stats.range, &mut consider),
    }
    best
}
