use crate::components::{
    Armor, Economy, EnemyStats, Health, MagicResist, Projectile, StatusContainer, Targeting,
    TowerStats, Transform,
};

pub use crate::components::EntityKind;

crate::entity_store! {
    EntityStore<EntityKind> {
        transform: Transform => TRANSFORM,
        health: Health => HEALTH,
        armor: Armor => ARMOR,
        magic_resist: MagicResist => MAGIC_RESIST,
        enemy_stats: EnemyStats => ENEMY_STATS,
        tower_stats: TowerStats => TOWER_STATS,
        targeting: Targeting => TARGETING,
        projectile: Projectile => PROJECTILE,
        status_container: StatusContainer => STATUS_CONTAINER,
        economy: Economy => ECONOMY,
    }
}

impl EntityStore {
    /// Create a fresh entity with only a default Transform attached
    pub fn create(&mut self) -> Entity {
        let mut entities = self.spawn_entities(TRANSFORM, 1);
        entities.pop().unwrap_or(Entity::INVALID)
    }

    /// Live entities of the given kind, in slot order
    pub fn entities_of_kind(&self, kind: EntityKind) -> Vec<Entity> {
        self.query_entities(0)
            .into_iter()
            .filter(|&entity| self.kind(entity) == Some(kind))
            .collect()
    }

    /// Number of live enemies
    pub fn enemy_count(&self) -> usize {
        self.query_entities(ENEMY_STATS).len()
    }
}
