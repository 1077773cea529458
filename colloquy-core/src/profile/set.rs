//! Profile Set

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::record::{ApiKey, Profile, ProviderKind};

/// Stored shape of a profile; the name lives in the map key.
#[doc(hidden)]
#[derive(Clone, Serialize, Deserialize)]
pub struct StoredProfile {
    endpoint_url: String,
    api_key: ApiKey,
    model_id: String,
    #[serde(default)]
    system_instruction: String,
    #[serde(default)]
    provider: ProviderKind,
}

/// Profiles keyed by name. At most one profile per name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, StoredProfile>",
    into = "BTreeMap<String, StoredProfile>"
)]
pub struct ProfileSet {
    profiles: HashMap<String, Profile>,
}

impl ProfileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile (last write wins).
    ///
    /// Returns the profile previously stored under the same name.
    pub fn save(&mut self, profile: Profile) -> Option<Profile> {
        self.profiles.insert(profile.name.clone(), profile)
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Profile> {
        self.profiles.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// Profile names, sorted for stable display
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl From<BTreeMap<String, StoredProfile>> for ProfileSet {
    fn from(stored: BTreeMap<String, StoredProfile>) -> Self {
        let profiles = stored
            .into_iter()
            .map(|(name, p)| {
                let profile = Profile {
                    name: name.clone(),
                    endpoint_url: p.endpoint_url,
                    api_key: p.api_key,
                    model_id: p.model_id,
                    system_instruction: p.system_instruction,
                    provider: p.provider,
                };
                (name, profile)
            })
            .collect();
        Self { profiles }
    }
}

impl From<ProfileSet> for BTreeMap<String, StoredProfile> {
    fn from(set: ProfileSet) -> Self {
        set.profiles
            .into_iter()
            .map(|(name, p)| {
                let stored = StoredProfile {
                    endpoint_url: p.endpoint_url,
                    api_key: p.api_key,
                    model_id: p.model_id,
                    system_instruction: p.system_instruction,
                    provider: p.provider,
                };
                (name, stored)
            })
            .collect()
    }
}

impl FromIterator<Profile> for ProfileSet {
    fn from_iter<I: IntoIterator<Item = Profile>>(iter: I) -> Self {
        let mut set = ProfileSet::new();
        for profile in iter {
            set.save(profile);
        }
        set
    }
}
