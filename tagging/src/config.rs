use serde::{Deserialize, Serialize};

/// What `apply` does when the same tag is already bound to the same entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Insert another binding; the entity then carries the tag twice.
    #[default]
    Allow,
    /// Return the earliest existing binding instead of inserting.
    ReuseExisting,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggingConfig {
    pub duplicate_policy: DuplicatePolicy,
    pub max_label_len: usize,
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Allow,
            max_label_len: 255,
        }
    }
}

impl TaggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    pub fn with_max_label_len(mut self, max_label_len: usize) -> Self {
        self.max_label_len = max_label_len;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_label_len == 0 {
            return Err("Max label length must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TaggingConfig::default();
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Allow);
        assert_eq!(config.max_label_len, 255);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = TaggingConfig::new()
            .with_duplicate_policy(DuplicatePolicy::ReuseExisting)
            .with_max_label_len(32);

        assert_eq!(config.duplicate_policy, DuplicatePolicy::ReuseExisting);
        assert_eq!(config.max_label_len, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = TaggingConfig::new().with_max_label_len(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serialization() {
        let config = TaggingConfig::new().with_duplicate_policy(DuplicatePolicy::ReuseExisting);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"reuse_existing\""));

        let deserialized: TaggingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.duplicate_policy, DuplicatePolicy::ReuseExisting);

        let partial: TaggingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(partial.max_label_len, 255);
    }
}
