//! Core profile data model.
//!
//! This module holds the in-memory view of the profile store:
//! - The `Profile` record as it is persisted
//! - The `ProfileCollection` and its mutations
//!
//! Every mutation keeps the collection's invariants intact: names are unique and
//! at most one profile is active. Nothing here touches the filesystem.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ProfileError, Result};

/// One named endpoint/key pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "base_url", default)]
    pub endpoint: String,
    #[serde(rename = "api_key", default)]
    pub secret: String,
    #[serde(default)]
    pub active: bool,
}

impl Profile {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            secret: secret.into(),
            active: false,
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.active { "Active" } else { "Inactive" }
    }
}

/// All profiles, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCollection {
    #[serde(rename = "configurations", default, deserialize_with = "null_as_empty")]
    profiles: Vec<Profile>,
}

// Older stores can carry `"configurations": null` after the last profile was removed.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Profile>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Profile>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ProfileCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection holding a single profile, marked active
    pub fn with_active(mut profile: Profile) -> Self {
        profile.active = true;
        Self {
            profiles: vec![profile],
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.iter()
    }

    /// Look up a profile by exact name
    pub fn find(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    fn find_mut(&mut self, name: &str) -> Result<&mut Profile> {
        self.profiles
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))
    }

    /// The currently active profile, if any
    pub fn active(&self) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.active)
    }

    /// Profiles ordered by name, for display only
    pub fn sorted_by_name(&self) -> Vec<&Profile> {
        let mut sorted: Vec<&Profile> = self.profiles.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        sorted
    }

    /// Append a new profile.
    ///
    /// The first profile added to an empty collection becomes active; every
    /// later one starts inactive. Returns a reference to the stored profile.
    pub fn add(&mut self, name: &str, endpoint: &str, secret: &str) -> Result<&Profile> {
        if self.find(name).is_some() {
            return Err(ProfileError::DuplicateName(name.to_string()));
        }

        let mut profile = Profile::new(name, endpoint, secret);
        profile.active = self.profiles.is_empty();
        self.profiles.push(profile);

        Ok(&self.profiles[self.profiles.len() - 1])
    }

    /// Overwrite the endpoint and/or secret of an existing profile.
    ///
    /// `None` or an empty string leaves the field unchanged.
    pub fn update(&mut self, name: &str, endpoint: Option<&str>, secret: Option<&str>) -> Result<()> {
        let profile = self.find_mut(name)?;

        if let Some(endpoint) = endpoint.filter(|s| !s.is_empty()) {
            profile.endpoint = endpoint.to_string();
        }
        if let Some(secret) = secret.filter(|s| !s.is_empty()) {
            profile.secret = secret.to_string();
        }

        Ok(())
    }

    /// Remove an inactive profile, keeping the order of the rest
    pub fn delete(&mut self, name: &str) -> Result<Profile> {
        let index = self
            .profiles
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))?;

        if self.profiles[index].active {
            return Err(ProfileError::ActiveProfileDeletion(name.to_string()));
        }

        Ok(self.profiles.remove(index))
    }

    /// Make `name` the only active profile
    pub fn set_active(&mut self, name: &str) -> Result<&Profile> {
        if self.find(name).is_none() {
            return Err(ProfileError::NotFound(name.to_string()));
        }

        for profile in &mut self.profiles {
            profile.active = profile.name == name;
        }

        self.find(name)
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_count(collection: &ProfileCollection) -> usize {
        collection.iter().filter(|p| p.active).count()
    }

    fn sample() -> ProfileCollection {
        let mut c = ProfileCollection::new();
        c.add("work", "https://api.work.test", "work-key-123456").unwrap();
        c.add("home", "https://api.home.test", "home-key-123456").unwrap();
        c.add("lab", "https://lab.test", "lab-key").unwrap();
        c
    }

    #[test]
    fn test_first_add_is_active() {
        let mut c = ProfileCollection::new();
        let added = c.add("first", "https://x.test", "k").unwrap();
        assert!(added.active);
    }

    #[test]
    fn test_later_adds_are_inactive() {
        let c = sample();
        assert!(c.find("work").unwrap().active);
        assert!(!c.find("home").unwrap().active);
        assert!(!c.find("lab").unwrap().active);
        assert_eq!(active_count(&c), 1);
    }

    #[test]
    fn test_add_duplicate() {
        let mut c = sample();
        let err = c.add("work", "https://other.test", "k").unwrap_err();
        assert!(matches!(err, ProfileError::DuplicateName(ref n) if n == "work"));
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut c = sample();
        assert!(c.add("Work", "https://x.test", "k").is_ok());
        assert!(c.find("WORK").is_none());
    }

    #[test]
    fn test_update_fields() {
        let mut c = sample();
        c.update("home", Some("https://new.test"), None).unwrap();
        let home = c.find("home").unwrap();
        assert_eq!(home.endpoint, "https://new.test");
        assert_eq!(home.secret, "home-key-123456");

        c.update("home", Some(""), Some("rotated")).unwrap();
        let home = c.find("home").unwrap();
        assert_eq!(home.endpoint, "https://new.test");
        assert_eq!(home.secret, "rotated");
    }

    #[test]
    fn test_update_noop_and_missing() {
        let mut c = sample();
        let before = c.clone();
        c.update("lab", None, None).unwrap();
        assert_eq!(c, before);

        assert!(matches!(
            c.update("ghost", Some("x"), None),
            Err(ProfileError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_active_is_rejected() {
        let mut c = sample();
        let before = c.clone();
        let err = c.delete("work").unwrap_err();
        assert!(matches!(err, ProfileError::ActiveProfileDeletion(_)));
        assert_eq!(c, before);
    }

    #[test]
    fn test_delete_preserves_order() {
        let mut c = sample();
        let removed = c.delete("home").unwrap();
        assert_eq!(removed.name, "home");
        let names: Vec<_> = c.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["work", "lab"]);

        assert!(matches!(c.delete("home"), Err(ProfileError::NotFound(_))));
    }

    #[test]
    fn test_set_active_switches_and_is_idempotent() {
        let mut c = sample();
        c.set_active("lab").unwrap();
        assert_eq!(c.active().unwrap().name, "lab");
        assert_eq!(active_count(&c), 1);

        let once = c.clone();
        c.set_active("lab").unwrap();
        assert_eq!(c, once);

        assert!(matches!(c.set_active("nope"), Err(ProfileError::NotFound(_))));
        assert_eq!(c, once);
    }

    #[test]
    fn test_sorted_view_does_not_reorder_storage() {
        let c = sample();
        let sorted: Vec<_> = c.sorted_by_name().iter().map(|p| p.name.clone()).collect();
        assert_eq!(sorted, ["home", "lab", "work"]);
        let stored: Vec<_> = c.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(stored, ["work", "home", "lab"]);
    }

    #[test]
    fn test_deserialize_tolerates_missing_and_unknown_fields() {
        let json = r#"{
            "configurations": [
                {"name": "a", "base_url": "https://a.test", "extra": 1},
                {"name": "b", "api_key": "k", "active": true}
            ],
            "version": 2
        }"#;
        let c: ProfileCollection = serde_json::from_str(json).unwrap();
        let a = c.find("a").unwrap();
        assert_eq!(a.secret, "");
        assert!(!a.active);
        assert!(c.find("b").unwrap().active);
    }

    #[test]
    fn test_deserialize_null_configurations() {
        let c: ProfileCollection = serde_json::from_str(r#"{"configurations": null}"#).unwrap();
        assert!(c.is_empty());
        let c: ProfileCollection = serde_json::from_str("{}").unwrap();
        assert!(c.is_empty());
    }
}
