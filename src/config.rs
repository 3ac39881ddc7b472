//! Tunables for the generation engine and the HTTP binary, read from the
//! environment with fallbacks to the defaults below.

use serde::{Deserialize, Serialize};

pub const DEFAULT_DAILY_LOAD_CAP: u32 = 6;
pub const DEFAULT_SPREAD_LIMIT: usize = 2;

/// Engine configuration for a generation run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationConfig {
    /// Maximum placed hours per teacher per day
    pub daily_load_cap: u32,
    /// Maximum distinct days a subject may occupy the same slot
    pub spread_limit: usize,
    /// Retry budget per unit is `max(1, pool_len * factor)`
    pub attempts_per_unit_factor: usize,
    /// Allow moving an already-placed lesson of the same course to make room
    pub displacement: bool,
    /// Fixed RNG seed; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            daily_load_cap: DEFAULT_DAILY_LOAD_CAP,
            spread_limit: DEFAULT_SPREAD_LIMIT,
            attempts_per_unit_factor: 1,
            displacement: false,
            seed: None,
        }
    }
}

impl GenerationConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            daily_load_cap: env_parse("TIMETABLE_DAILY_LOAD_CAP")
                .unwrap_or(defaults.daily_load_cap),
            spread_limit: env_parse("TIMETABLE_SPREAD_LIMIT").unwrap_or(defaults.spread_limit),
            attempts_per_unit_factor: env_parse("TIMETABLE_ATTEMPTS_FACTOR")
                .unwrap_or(defaults.attempts_per_unit_factor),
            displacement: env_parse("TIMETABLE_DISPLACEMENT").unwrap_or(defaults.displacement),
            seed: env_parse("TIMETABLE_SEED"),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_displacement(mut self, enabled: bool) -> Self {
        self.displacement = enabled;
        self
    }

    pub fn attempt_budget(&self, pool_len: usize) -> usize {
        pool_len.saturating_mul(self.attempts_per_unit_factor).max(1)
    }
}

/// Settings for the HTTP binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("TIMETABLE_BIND").unwrap_or(defaults.bind_addr),
            log_filter: std::env::var("TIMETABLE_LOG").unwrap_or(defaults.log_filter),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
