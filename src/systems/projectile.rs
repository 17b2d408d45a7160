use crate::components::Health;
use crate::config::SimConfig;
use crate::store::{Entity, EntityStore, PROJECTILE, TRANSFORM};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectileOutcome {
    pub hits: u32,
    /// Projectiles marked for recycling this frame, hits included
    pub spent: u32,
}

/// Damage left after armor. Armor net of penetration mitigates it as a percentage.
pub fn mitigated_damage(damage: f32, armor: f32, armor_pen: f32) -> f32 {
    let mitigation = (armor - armor_pen).max(0.0);
    damage * (100.0 - mitigation) / 100.0
}

/// Fly every projectile toward its target and resolve impacts.
///
/// Nothing is destroyed here: a spent projectile has its Health zeroed so that
/// cleanup returns it to the pool. A projectile whose target is gone is spent,
/// never retargeted.
pub fn update_projectiles(store: &mut EntityStore, config: &SimConfig, dt: f32) -> ProjectileOutcome {
    let mut outcome = ProjectileOutcome::default();
    for entity in store.query_entities(PROJECTILE | TRANSFORM) {
        let Some(projectile) = store.get_projectile(entity) else {
            continue;
        };
        let target = projectile.target;
        let target_position = target
            .and_then(|target| store.get_transform(target))
            .map(|transform| transform.position);
        let (Some(target), Some(target_position)) = (target, target_position) else {
            spend(store, entity);
            outcome.spent += 1;
            continue;
        };
        let Some(position) = store.get_transform(entity).map(|transform| transform.position) else {
            continue;
        };

        let distance = position.distance(target_position);
        if distance <= config.hit_threshold {
            if strike(store, entity, target) {
                outcome.hits += 1;
            }
            spend(store, entity);
            outcome.spent += 1;
            continue;
        }

        let Some(projectile) = store.get_projectile_mut(entity) else {
            continue;
        };
        let step = (projectile.speed * dt).min(distance);
        projectile.travelled += step;
        let out_of_range = projectile.travelled > projectile.range;
        if let Some(transform) = store.get_transform_mut(entity) {
            transform.position = position + (target_position - position) / distance * step;
        }
        if out_of_range {
            spend(store, entity);
            outcome.spent += 1;
        }
    }
    outcome
}

/// Apply a projectile's damage and status to its target. Returns false if the target has no Health.
fn strike(store: &mut EntityStore, projectile: Entity, target: Entity) -> bool {
    let Some(shot) = store.get_projectile(projectile).cloned() else {
        return false;
    };
    let armor = store.get_armor(target).map_or(0.0, |armor| armor.armor);
    let Some(health) = store.get_health_mut(target) else {
        return false;
    };
    health.hp -= mitigated_damage(shot.damage, armor, shot.armor_pen);

    if let Some(status) = &shot.status
        && let Some(container) = store.get_status_container_mut(target)
    {
        container.apply(status);
    }
    tracing::trace!(%projectile, %target, damage = shot.damage, "projectile hit");
    true
}

fn spend(store: &mut EntityStore, projectile: Entity) {
    match store.get_health_mut(projectile) {
        Some(health) => health.hp = 0.0,
        None => {
            store.set_health(projectile, Health::default());
        }
    }
}
