//! Persisted following toggles.

use crate::error::Result;
use crate::filter::SubscriptionSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The user's following toggles, saved as JSON.
#[derive(Debug)]
pub struct FollowingPreferences {
    path: Option<PathBuf>,
    toggles: SubscriptionSet,
}

impl FollowingPreferences {
    /// Load toggles from `path`. A missing file means nothing is followed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let toggles = if path.exists() {
            let bytes = fs::read(&path)?;
            serde_json::from_slice(&bytes)?
        } else {
            SubscriptionSet::new()
        };
        Ok(Self {
            path: Some(path),
            toggles,
        })
    }

    /// Toggles that live only as long as this value.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            toggles: SubscriptionSet::new(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_following(&self, author_key: &str) -> bool {
        self.toggles.is_subscribed(author_key)
    }

    pub fn subscriptions(&self) -> &SubscriptionSet {
        &self.toggles
    }

    /// Set a toggle and persist it. Returns whether the value changed.
    pub fn set(&mut self, author_key: &str, following: bool) -> Result<bool> {
        let previous = self.toggles.set(author_key, following);
        if previous == Some(following) {
            return Ok(false);
        }
        self.save()?;
        debug!(author_key, following, "Following preference changed");
        Ok(true)
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&self.toggles)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ASSER_KEY, JLIN_KEY};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let prefs = FollowingPreferences::open(dir.path().join("following.json")).unwrap();
        assert!(prefs.subscriptions().is_empty());
        assert!(!prefs.is_following(ASSER_KEY));
    }

    #[test]
    fn test_toggles_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs").join("following.json");

        let mut prefs = FollowingPreferences::open(&path).unwrap();
        assert!(prefs.set(ASSER_KEY, true).unwrap());
        assert!(prefs.set(JLIN_KEY, false).unwrap());

        let reopened = FollowingPreferences::open(&path).unwrap();
        assert!(reopened.is_following(ASSER_KEY));
        assert!(!reopened.is_following(JLIN_KEY));
        assert_eq!(reopened.subscriptions().len(), 2);
    }

    #[test]
    fn test_setting_same_value_reports_unchanged() {
        let mut prefs = FollowingPreferences::in_memory();
        assert!(prefs.set(ASSER_KEY, true).unwrap());
        assert!(!prefs.set(ASSER_KEY, true).unwrap());
        assert!(prefs.set(ASSER_KEY, false).unwrap());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("following.json");
        fs::write(&path, b"not json").unwrap();
        assert!(FollowingPreferences::open(&path).is_err());
    }
}
