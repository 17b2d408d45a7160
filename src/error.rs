use crate::store::Entity;

pub type SimResult<T> = Result<T, SimError>;

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("unknown level: {0}")]
    UnknownLevel(String),

    #[error("unknown tower definition: {0}")]
    UnknownTower(String),

    #[error("not enough coins: need {needed}, have {available}")]
    InsufficientCoins { needed: i32, available: i32 },

    #[error("position ({x}, {y}) is not on a buildable cell")]
    NotBuildable { x: f32, y: f32 },

    #[error("cell is already occupied by tower {0}")]
    CellOccupied(Entity),

    #[error("entity {0} is not a tower")]
    NotATower(Entity),

    #[error("tower {entity} has no upgrade beyond level {level}")]
    MaxLevel { entity: Entity, level: u32 },

    #[error("tower {0} already has a branch selected")]
    BranchAlreadySelected(Entity),

    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let error = SimError::InsufficientCoins {
            needed: 120,
            available: 80,
        };
        assert_eq!(error.to_string(), "not enough coins: need 120, have 80");

        let tower = Entity {
            index: 3,
            generation: 1,
        };
        assert_eq!(
            SimError::MaxLevel {
                entity: tower,
                level: 4
            }
            .to_string(),
            "tower 3v1 has no upgrade beyond level 4"
        );
        assert_eq!(
            SimError::UnknownLevel("level_99".into()).to_string(),
            "unknown level: level_99"
        );
    }
}
