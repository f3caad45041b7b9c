//! API key and version management
//!
//! The key/version pair is read on every request and can be swapped while
//! requests are in flight. Readers always see a complete pair.

use std::fmt;

use parking_lot::RwLock;

use crate::error::{Result, WorkbrewError};

/// API version sent when none is configured
pub const DEFAULT_API_VERSION: &str = "v0";

/// Credentials attached to every request
#[derive(Clone, PartialEq, Eq)]
pub struct AuthConfig {
    api_key: String,
    api_version: String,
}

impl AuthConfig {
    /// Create credentials; an empty version falls back to [`DEFAULT_API_VERSION`]
    pub fn new(api_key: impl Into<String>, api_version: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(WorkbrewError::configuration("API key cannot be empty"));
        }

        Ok(Self {
            api_key,
            api_version: normalize_version(api_version.into()),
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Lock-guarded holder of the active [`AuthConfig`]
pub struct AuthManager {
    inner: RwLock<AuthConfig>,
}

impl AuthManager {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            inner: RwLock::new(config),
        }
    }

    /// Current API key
    pub fn get_key(&self) -> Result<String> {
        let key = self.inner.read().api_key.clone();
        if key.is_empty() {
            return Err(WorkbrewError::configuration("API key is not set"));
        }
        Ok(key)
    }

    /// Replace the API key; an empty key is rejected and the old key kept
    pub fn update_key(&self, new_key: impl Into<String>) -> Result<()> {
        let new_key = new_key.into();
        if new_key.is_empty() {
            return Err(WorkbrewError::configuration("API key cannot be empty"));
        }

        self.inner.write().api_key = new_key;
        Ok(())
    }

    /// Current API version, never empty
    pub fn get_version(&self) -> String {
        self.inner.read().api_version.clone()
    }

    /// Replace the API version; empty resets to the default
    pub fn update_version(&self, version: impl Into<String>) {
        self.inner.write().api_version = normalize_version(version.into());
    }

    /// Key and version read under one lock
    pub fn snapshot(&self) -> AuthConfig {
        self.inner.read().clone()
    }
}

impl fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthManager")
            .field("config", &*self.inner.read())
            .finish()
    }
}

fn normalize_version(version: String) -> String {
    if version.trim().is_empty() {
        DEFAULT_API_VERSION.to_string()
    } else {
        version
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            AuthConfig::new("", "v1"),
            Err(WorkbrewError::Configuration(_))
        ));
    }

    #[test]
    fn test_default_version() {
        let config = AuthConfig::new("key", "").unwrap();
        assert_eq!(config.api_version(), DEFAULT_API_VERSION);

        let manager = AuthManager::new(config);
        assert_eq!(manager.get_version(), "v0");

        manager.update_version("v1");
        assert_eq!(manager.get_version(), "v1");

        manager.update_version("");
        assert_eq!(manager.get_version(), "v0");
    }

    #[test]
    fn test_update_key() {
        let manager = AuthManager::new(AuthConfig::new("old", "v0").unwrap());
        manager.update_key("new").unwrap();
        assert_eq!(manager.get_key().unwrap(), "new");
    }

    #[test]
    fn test_failed_update_keeps_old_key() {
        let manager = AuthManager::new(AuthConfig::new("old", "v0").unwrap());
        assert!(manager.update_key("").is_err());
        assert_eq!(manager.get_key().unwrap(), "old");
    }

    #[test]
    fn test_debug_redacts_key() {
        let manager = AuthManager::new(AuthConfig::new("secret-key", "v0").unwrap());
        let debug = format!("{manager:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_concurrent_readers_see_whole_keys() {
        let manager = Arc::new(AuthManager::new(AuthConfig::new("a".repeat(64), "v0").unwrap()));

        let writer = {
            let manager = Arc::clone(&manager);
            std::thread::spawn(move || {
                for i in 0..500 {
                    let fill = if i % 2 == 0 { "b" } else { "a" };
                    manager.update_key(fill.repeat(64)).unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let manager = Arc::clone(&manager);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let key = manager.get_key().unwrap();
                        assert_eq!(key.len(), 64);
                        assert!(key == "a".repeat(64) || key == "b".repeat(64));
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
