use std::collections::HashMap;

use crate::definitions::StatusDefinition;
use crate::store::{ENEMY_STATS, EntityStore, STATUS_CONTAINER};

/// Floor on the speed multiplier a single `slow` instance can apply
const MIN_SLOW_FACTOR: f32 = 0.2;

/// Tick every enemy's status instances and recompute its speed modifier.
///
/// Unknown status ids are inert but still expire. Expired instances are dropped
/// after their final tick has been applied.
pub fn update_status(
    store: &mut EntityStore,
    statuses: &HashMap<String, StatusDefinition>,
    dt: f32,
) {
    for enemy in store.query_entities(ENEMY_STATS) {
        if let Some(stats) = store.get_enemy_stats_mut(enemy) {
            stats.stealth_timer = (stats.stealth_timer - dt).max(0.0);
        }
    }

    for enemy in store.query_entities(ENEMY_STATS | STATUS_CONTAINER) {
        let Some(container) = store.get_status_container_mut(enemy) else {
            continue;
        };

        let mut speed_modifier = 1.0;
        let mut damage = 0.0;
        let mut stunned = false;

        for status in &mut container.active {
            status.time_left -= dt;
            let Some(definition) = statuses.get(&status.id) else {
                continue;
            };
            if definition.multiplier > 0.0 && definition.multiplier < 1.0 {
                speed_modifier *= definition.multiplier;
            }
            if status.id.contains("slow") {
                speed_modifier *= (1.0 - status.power).max(MIN_SLOW_FACTOR);
            }
            if definition.dps > 0.0 {
                let extra_stacks = status.stacks.saturating_sub(1) as f32;
                damage += (definition.dps + definition.stack_dps * extra_stacks) * dt;
            }
            if definition.stun > 0.0 {
                stunned = true;
            }
        }
        container.active.retain(|status| status.time_left > 0.0);

        if stunned {
            speed_modifier = 0.0;
        }
        if let Some(stats) = store.get_enemy_stats_mut(enemy) {
            stats.speed_modifier = speed_modifier;
            if damage > 0.0 {
                stats.dot_timer += dt;
            } else {
                stats.dot_timer = 0.0;
            }
        }
        if damage > 0.0
            && let Some(health) = store.get_health_mut(enemy)
        {
            health.hp -= damage;
        }
    }
}
