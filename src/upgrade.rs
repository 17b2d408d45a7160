use serde::{Deserialize, Serialize};

use crate::components::{Economy, TowerStats};
use crate::definitions::{BranchModifier, TowerDefinition, UpgradeModifier};
use crate::error::{SimError, SimResult};
use crate::store::{Entity, EntityStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Branch {
    A,
    B,
}

/// Additive changes shared by level upgrades and branches
struct StatDelta {
    damage: f32,
    fire_rate: f32,
    range: f32,
    armor_pen: f32,
    aoe_radius: f32,
    status_potency: f32,
    status_duration: f32,
    chain: f32,
    pierce: f32,
    income: f32,
}

impl From<&UpgradeModifier> for StatDelta {
    fn from(upgrade: &UpgradeModifier) -> Self {
        Self {
            damage: upgrade.damage,
            fire_rate: upgrade.fire_rate,
            range: upgrade.range,
            armor_pen: upgrade.armor_pen,
            aoe_radius: upgrade.aoe_radius,
            status_potency: upgrade.status_potency,
            status_duration: upgrade.status_duration,
            chain: upgrade.chain,
            pierce: upgrade.pierce,
            income: upgrade.income,
        }
    }
}

impl From<&BranchModifier> for StatDelta {
    fn from(branch: &BranchModifier) -> Self {
        Self {
            damage: branch.damage,
            fire_rate: branch.fire_rate,
            range: branch.range,
            armor_pen: branch.armor_pen,
            aoe_radius: branch.aoe_radius,
            status_potency: branch.status_potency,
            status_duration: branch.status_duration,
            chain: branch.chain,
            pierce: branch.pierce,
            income: branch.income,
        }
    }
}

impl StatDelta {
    fn apply(&self, stats: &mut TowerStats) {
        stats.damage += self.damage;
        stats.fire_rate += self.fire_rate;
        stats.range += self.range;
        stats.armor_pen += self.armor_pen;
        stats.aoe_radius += self.aoe_radius;
        stats.status_potency += self.status_potency;
        stats.status_duration += self.status_duration;
        stats.chain += self.chain;
        stats.pierce += self.pierce;
    }
}

/// Raise a tower to its next level. Returns the new level.
pub fn upgrade_tower(
    store: &mut EntityStore,
    tower: Entity,
    definition: &TowerDefinition,
) -> SimResult<u32> {
    let stats = store
        .get_tower_stats_mut(tower)
        .ok_or(SimError::NotATower(tower))?;
    let next = stats.level + 1;
    let upgrade = definition
        .upgrade_for_level(next)
        .ok_or(SimError::MaxLevel {
            entity: tower,
            level: stats.level,
        })?;

    let delta = StatDelta::from(upgrade);
    delta.apply(stats);
    stats.level = next;
    add_income(store, tower, delta.income);

    tracing::debug!(%tower, level = next, "tower upgraded");
    Ok(next)
}

/// Specialise a tower. Each tower gets exactly one branch.
pub fn select_branch(
    store: &mut EntityStore,
    tower: Entity,
    definition: &TowerDefinition,
    branch: Branch,
) -> SimResult<()> {
    let stats = store
        .get_tower_stats_mut(tower)
        .ok_or(SimError::NotATower(tower))?;
    if stats.branch_a_selected || stats.branch_b_selected {
        return Err(SimError::BranchAlreadySelected(tower));
    }

    let modifier = match branch {
        Branch::A => {
            stats.branch_a_selected = true;
            &definition.branch_a
        }
        Branch::B => {
            stats.branch_b_selected = true;
            &definition.branch_b
        }
    };
    let delta = StatDelta::from(modifier);
    delta.apply(stats);
    if modifier.can_hit_flying {
        stats.can_hit_flying = true;
    }
    add_income(store, tower, delta.income);

    tracing::debug!(%tower, ?branch, "tower branch selected");
    Ok(())
}

fn add_income(store: &mut EntityStore, tower: Entity, income: f32) {
    if income == 0.0 {
        return;
    }
    match store.get_economy_mut(tower) {
        Some(economy) => economy.income += income,
        None => {
            store.set_economy(tower, Economy { income });
        }
    }
}
