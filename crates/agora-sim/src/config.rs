//! Simulation settings, loadable from TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors from loading or validating a [`SimConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Parameters of a simulated workload.
///
/// Missing fields in a TOML file fall back to the defaults below.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub users: usize,
    pub communities: usize,
    /// Worker threads sharing the engine. Users are dealt round-robin.
    pub actors: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub max_posts_per_user: u32,
    pub max_upvotes_per_post: u32,
    pub max_comments_per_post: u32,
    pub max_replies_per_comment: u32,
    pub repost_probability: f64,
    pub message_probability: f64,
    pub disconnect_probability: f64,
    /// Exponent applied to the uniform draw that picks how many communities
    /// a user joins. Larger values favor fewer memberships.
    pub membership_skew: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            users: 100,
            communities: 10,
            actors: 4,
            seed: None,
            max_posts_per_user: 3,
            max_upvotes_per_post: 3,
            max_comments_per_post: 2,
            max_replies_per_comment: 2,
            repost_probability: 0.1,
            message_probability: 0.2,
            disconnect_probability: 0.2,
            membership_skew: 1.2,
        }
    }
}

impl SimConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("users", self.users as u64),
            ("communities", self.communities as u64),
            ("actors", self.actors as u64),
            ("max_posts_per_user", u64::from(self.max_posts_per_user)),
            ("max_upvotes_per_post", u64::from(self.max_upvotes_per_post)),
            ("max_comments_per_post", u64::from(self.max_comments_per_post)),
            ("max_replies_per_comment", u64::from(self.max_replies_per_comment)),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be at least 1".into(),
                });
            }
        }

        let probabilities = [
            ("repost_probability", self.repost_probability),
            ("message_probability", self.message_probability),
            ("disconnect_probability", self.disconnect_probability),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is outside [0, 1]"),
                });
            }
        }

        if !self.membership_skew.is_finite() || self.membership_skew <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "membership_skew",
                reason: "must be a positive number".into(),
            });
        }
        Ok(())
    }

    /// Name of the community at `index` (zero-based).
    pub fn community_name(index: usize) -> String {
        format!("SubReddit{}", index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimConfig::default();
        assert_eq!(config.users, 100);
        assert_eq!(config.communities, 10);
        assert!(config.seed.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config = SimConfig::from_toml_str("users = 12\nseed = 99\n").unwrap();
        assert_eq!(config.users, 12);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.communities, 10);
        assert_eq!(config.repost_probability, 0.1);
    }

    #[test]
    fn default_toml_parses_back() {
        let text = SimConfig::default().to_toml().unwrap();
        assert!(text.contains("users = 100"));
        assert!(!text.contains("seed"));
        assert_eq!(SimConfig::from_toml_str(&text).unwrap(), SimConfig::default());
    }

    #[test]
    fn validate_rejects_zero_counts() {
        let config = SimConfig {
            actors: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "actors", .. }));
    }

    #[test]
    fn validate_rejects_bad_probability() {
        let config = SimConfig {
            message_probability: 1.5,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "message_probability",
                ..
            }
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = SimConfig::from_toml_str("users = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = SimConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn community_names_are_one_based() {
        assert_eq!(SimConfig::community_name(0), "SubReddit1");
        assert_eq!(SimConfig::community_name(9), "SubReddit10");
    }
}
