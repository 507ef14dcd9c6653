pub mod loader;

use std::collections::HashMap;

/// Target soil levels for one crop.
#[derive(Debug, Clone, PartialEq)]
pub struct CropIdealProfile {
    pub crop_name: String,
    pub ideal_n: f64,
    pub ideal_p: f64,
    pub ideal_k: f64,
}

/// Read-only crop → ideal profile lookup, keyed case-insensitively.
///
/// Built once at startup and shared by reference; nothing mutates it afterwards.
#[derive(Debug, Clone, Default)]
pub struct CropTable {
    profiles: HashMap<String, CropIdealProfile>,
}

impl CropTable {
    /// Builds a table from profiles in order. On a case-insensitive name clash the first
    /// profile is kept; the rejected ones are returned alongside the table.
    pub fn from_profiles(
        profiles: impl IntoIterator<Item = CropIdealProfile>,
    ) -> (Self, Vec<CropIdealProfile>) {
        let mut table = Self::default();
        let mut duplicates = Vec::new();
        for profile in profiles {
            if let Some(rejected) = table.insert_first(profile) {
                duplicates.push(rejected);
            }
        }
        (table, duplicates)
    }

    fn insert_first(&mut self, profile: CropIdealProfile) -> Option<CropIdealProfile> {
        let key = normalize(&profile.crop_name);
        if self.profiles.contains_key(&key) {
            return Some(profile);
        }
        self.profiles.insert(key, profile);
        None
    }

    pub fn get(&self, crop: &str) -> Option<&CropIdealProfile> {
        self.profiles.get(&normalize(crop))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Crop names as spelled in the source table, sorted.
    pub fn crop_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .profiles
            .values()
            .map(|p| p.crop_name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

fn normalize(crop: &str) -> String {
    crop.to_lowercase()
}
