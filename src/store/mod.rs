pub mod kv;
pub mod schema;

use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;

use kv::KvStore;
use schema::{CampaignData, MasteryData, SettingsData};

const MASTERY_KEY: &str = "mastery";
const SETTINGS_KEY: &str = "settings";
const CAMPAIGN_KEY: &str = "campaign";

/// Typed view over the key-value store. Loads are lenient: a missing,
/// corrupt, or stale-schema record comes back as the default, matching what a
/// fresh install would see.
pub struct Storage<S: KvStore> {
    kv: S,
}

impl<S: KvStore> Storage<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    fn load_or_default<T: DeserializeOwned + Default + schema::Versioned>(
        &self,
        key: &str,
    ) -> T {
        let Some(raw) = self.kv.get(key) else {
            return T::default();
        };
        match serde_json::from_str::<T>(&raw) {
            Ok(value) if value.schema_version() == schema::SCHEMA_VERSION => value,
            _ => T::default(),
        }
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.kv.set(key, &serde_json::to_string_pretty(value)?)
    }

    pub fn load_mastery(&self) -> MasteryData {
        self.load_or_default(MASTERY_KEY)
    }

    pub fn save_mastery(&self, data: &MasteryData) -> Result<()> {
        self.save(MASTERY_KEY, data)
    }

    pub fn load_settings(&self) -> SettingsData {
        self.load_or_default(SETTINGS_KEY)
    }

    pub fn save_settings(&self, data: &SettingsData) -> Result<()> {
        self.save(SETTINGS_KEY, data)
    }

    /// Campaign record exists only after a first campaign start.
    pub fn load_campaign(&self) -> Option<CampaignData> {
        let raw = self.kv.get(CAMPAIGN_KEY)?;
        serde_json::from_str::<CampaignData>(&raw)
            .ok()
            .filter(|c| c.schema_version == schema::SCHEMA_VERSION)
    }

    pub fn save_campaign(&self, data: &CampaignData) -> Result<()> {
        self.save(CAMPAIGN_KEY, data)
    }

    pub fn clear_campaign(&self) -> Result<()> {
        self.kv.remove(CAMPAIGN_KEY)
    }
}
