use crate::components::{Health, Projectile, Transform};
use crate::config::SimConfig;
use crate::pool::EntityPool;
use crate::store::{EntityKind, EntityStore, HEALTH, TOWER_STATS, TRANSFORM};

/// Count down tower cooldowns and launch a projectile from every tower that is ready
/// and has a live target. Pooled projectile handles are reused before new ones are created.
///
/// Returns the number of shots fired.
pub fn update_firing(
    store: &mut EntityStore,
    pool: &mut EntityPool,
    config: &SimConfig,
    dt: f32,
) -> u32 {
    let mut shots = 0;
    for tower in store.query_entities(TOWER_STATS | TRANSFORM) {
        let Some(stats) = store.get_tower_stats_mut(tower) else {
            continue;
        };
        stats.cooldown -= dt;
        if stats.cooldown > 0.0 {
            continue;
        }

        let Some(target) = store
            .get_targeting(tower)
            .and_then(|targeting| targeting.current_target)
        else {
            continue;
        };
        if !crate::has_components!(store, target, TRANSFORM | HEALTH) {
            continue;
        }
        let Some(origin) = store.get_transform(tower).map(|transform| transform.position) else {
            continue;
        };
        let Some(stats) = store.get_tower_stats_mut(tower) else {
            continue;
        };

        let projectile = Projectile {
            speed: config.projectile_speed,
            damage: stats.damage,
            armor_pen: stats.armor_pen,
            pierce: stats.pierce,
            range: stats.range + config.projectile_range_margin,
            travelled: 0.0,
            target: Some(target),
            status: stats.status_payload(),
            aoe_radius: stats.aoe_radius,
        };
        stats.cooldown = config
            .min_cooldown
            .max(1.0 / stats.fire_rate.max(config.min_fire_rate));

        let shot = match pool.acquire(store) {
            Some(reused) => {
                tracing::trace!(projectile = %reused, "reusing pooled projectile");
                reused
            }
            None => store.create(),
        };
        store.set_transform(shot, Transform { position: origin });
        store.set_projectile(shot, projectile);
        store.set_health(shot, Health { hp: 1.0, max_hp: 1.0 });
        store.set_kind(shot, EntityKind::Projectile);

        tracing::trace!(%tower, %target, projectile = %shot, "tower fired");
        shots += 1;
    }
    shots
}
