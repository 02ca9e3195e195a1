use serde::{Deserialize, Serialize};

use crate::challenge::{ALL_DIFFICULTIES, AdventureLevel};
use crate::engine::mastery::MasteryStore;

pub const SCHEMA_VERSION: u32 = 1;

/// Loaded records carry their schema version so a stale layout is discarded
/// rather than half-parsed.
pub trait Versioned {
    fn schema_version(&self) -> u32;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MasteryData {
    pub schema_version: u32,
    pub store: MasteryStore,
}

impl Default for MasteryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            store: MasteryStore::default(),
        }
    }
}

impl Versioned for MasteryData {
    fn schema_version(&self) -> u32 {
        self.schema_version
    }
}

/// Persisted app settings. `offline_mode` defaults to false and, once flipped
/// true by the fallback path, stays true until the user turns it off.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SettingsData {
    pub schema_version: u32,
    pub offline_mode: bool,
}

impl Default for SettingsData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            offline_mode: false,
        }
    }
}

impl Versioned for SettingsData {
    fn schema_version(&self) -> u32 {
        self.schema_version
    }
}

/// A four-level campaign, one level per difficulty in increasing order. Only
/// the first level starts unlocked.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CampaignData {
    pub schema_version: u32,
    pub theme: String,
    pub levels: Vec<AdventureLevel>,
}

impl CampaignData {
    pub fn new(theme: &str) -> Self {
        let names = [
            format!("Beginner {theme}"),
            format!("{theme} Explorer"),
            format!("Master of {theme}"),
            format!("Legend of {theme}"),
        ];
        let levels = ALL_DIFFICULTIES
            .iter()
            .zip(names)
            .enumerate()
            .map(|(i, (difficulty, name))| AdventureLevel {
                id: format!("l{}", i + 1),
                name,
                difficulty: *difficulty,
                theme: theme.to_string(),
                is_unlocked: i == 0,
                is_completed: false,
            })
            .collect();
        Self {
            schema_version: SCHEMA_VERSION,
            theme: theme.to_string(),
            levels,
        }
    }
}

impl Versioned for CampaignData {
    fn schema_version(&self) -> u32 {
        self.schema_version
    }
}
