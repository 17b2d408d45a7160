use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Which spatial-grid cells a tower searches for targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetingQuery {
    /// Only the cell containing the tower. Enemies across a cell border are missed
    /// even when they are in range.
    #[default]
    SameCell,
    /// Every cell overlapping the square bounding the tower's range.
    Radius,
}

/// Tunables for the simulation core.
///
/// Absent fields deserialize to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Edge length of a spatial grid cell, in world units.
    pub cell_size: f32,
    /// Launch speed of every projectile, in world units per second.
    pub projectile_speed: f32,
    /// Added to tower range to get a projectile's maximum travel distance.
    pub projectile_range_margin: f32,
    /// A projectile within this distance of its target hits.
    pub hit_threshold: f32,
    /// Lower bound on the delay between two shots of one tower.
    pub min_cooldown: f32,
    /// Fire rates below this are treated as this value.
    pub min_fire_rate: f32,
    /// How long a freshly spawned stealthed enemy cannot be targeted.
    pub stealth_reveal_time: f32,
    /// Seconds between passive income payouts.
    pub income_interval: f32,
    /// Countdown before the first wave of a level starts.
    pub first_wave_delay: f32,
    pub targeting_query: TargetingQuery,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            cell_size: 64.0,
            projectile_speed: 420.0,
            projectile_range_margin: 40.0,
            hit_threshold: 5.0,
            min_cooldown: 0.1,
            min_fire_rate: 0.1,
            stealth_reveal_time: 2.5,
            income_interval: 1.0,
            first_wave_delay: 2.0,
            targeting_query: TargetingQuery::SameCell,
        }
    }
}

impl SimConfig {
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_projectile_speed(mut self, speed: f32) -> Self {
        self.projectile_speed = speed;
        self
    }

    pub fn with_hit_threshold(mut self, threshold: f32) -> Self {
        self.hit_threshold = threshold;
        self
    }

    pub fn with_stealth_reveal_time(mut self, seconds: f32) -> Self {
        self.stealth_reveal_time = seconds;
        self
    }

    pub fn with_income_interval(mut self, seconds: f32) -> Self {
        self.income_interval = seconds;
        self
    }

    pub fn with_first_wave_delay(mut self, seconds: f32) -> Self {
        self.first_wave_delay = seconds;
        self
    }

    pub fn with_targeting_query(mut self, query: TargetingQuery) -> Self {
        self.targeting_query = query;
        self
    }

    /// Reject values the systems cannot run with.
    pub fn validate(&self) -> SimResult<()> {
        let positive = [
            ("cell_size", self.cell_size),
            ("projectile_speed", self.projectile_speed),
            ("min_cooldown", self.min_cooldown),
            ("min_fire_rate", self.min_fire_rate),
            ("income_interval", self.income_interval),
        ];
        for (name, value) in positive {
            if value <= 0.0 || !value.is_finite() {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.hit_threshold < 0.0 || self.hit_threshold.is_nan() {
            return Err(SimError::InvalidConfig(format!(
                "hit_threshold must not be negative, got {}",
                self.hit_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = SimConfig::default();
        assert_eq!(config.cell_size, 64.0);
        assert_eq!(config.projectile_speed, 420.0);
        assert_eq!(config.projectile_range_margin, 40.0);
        assert_eq!(config.hit_threshold, 5.0);
        assert_eq!(config.min_cooldown, 0.1);
        assert_eq!(config.stealth_reveal_time, 2.5);
        assert_eq!(config.first_wave_delay, 2.0);
        assert_eq!(config.targeting_query, TargetingQuery::SameCell);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder_chain() {
        let config = SimConfig::default()
            .with_cell_size(128.0)
            .with_projectile_speed(300.0)
            .with_targeting_query(TargetingQuery::Radius);
        assert_eq!(config.cell_size, 128.0);
        assert_eq!(config.projectile_speed, 300.0);
        assert_eq!(config.targeting_query, TargetingQuery::Radius);
    }

    #[test]
    fn test_config_partial_json_uses_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{ "cell_size": 32.0, "targeting_query": "radius" }"#).unwrap();
        assert_eq!(config.cell_size, 32.0);
        assert_eq!(config.targeting_query, TargetingQuery::Radius);
        assert_eq!(config.projectile_speed, 420.0);
        assert_eq!(config.income_interval, 1.0);
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            SimConfig::default().with_cell_size(0.0).validate(),
            Err(SimError::InvalidConfig(_))
        ));
        assert!(matches!(
            SimConfig::default().with_projectile_speed(-1.0).validate(),
            Err(SimError::InvalidConfig(_))
        ));
        assert!(matches!(
            SimConfig::default().with_income_interval(f32::NAN).validate(),
            Err(SimError::InvalidConfig(_))
        ));
        assert!(matches!(
            SimConfig::default().with_hit_threshold(-0.5).validate(),
            Err(SimError::InvalidConfig(_))
        ));
        assert!(SimConfig::default().with_hit_threshold(0.0).validate().is_ok());
    }
}
