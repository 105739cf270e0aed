//! Typed agent configuration parsed from `key=value` tokens.
//!
//! ```text
//! init load=weights.bin save=weights.bin alpha=0.003125 seed=42
//! ```
//!
//! A bare token without `=` sets the key to itself, so `init` and `init=1` are
//! equivalent. Keys that no agent recognizes are kept in `extra`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::learning::td_learner::DEFAULT_ALPHA;

/// Configuration parse errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A recognized key has a value of the wrong type
    #[error("Invalid value for `{key}`: {value}")]
    InvalidValue { key: String, value: String },

    /// A token with an empty key, e.g. `=5`
    #[error("Empty key in token `{0}`")]
    EmptyKey(String),
}

/// Options shared by the player and the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentConfig {
    /// Display name (`name=`)
    pub name: String,
    /// Agent role (`role=`)
    pub role: String,
    /// Create the default zeroed tables (`init`)
    pub init: bool,
    /// Weight file to read at construction (`load=`)
    pub load: Option<PathBuf>,
    /// Weight file to write when the agent is closed (`save=`)
    pub save: Option<PathBuf>,
    /// TD step size (`alpha=`)
    pub alpha: f32,
    /// RNG seed (`seed=`)
    pub seed: Option<u64>,
    /// Unrecognized keys
    pub extra: BTreeMap<String, String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "unknown".to_string(),
            role: "unknown".to_string(),
            init: false,
            load: None,
            save: None,
            alpha: DEFAULT_ALPHA,
            seed: None,
            extra: BTreeMap::new(),
        }
    }
}

impl AgentConfig {
    /// Parse whitespace-separated `key=value` tokens. Later tokens win.
    ///
    /// # Errors
    ///
    /// - `ConfigError::InvalidValue` when `alpha` is not a finite float or `seed`
    ///   is not an unsigned integer
    /// - `ConfigError::EmptyKey` for tokens such as `=x`
    ///
    /// # Examples
    ///
    /// ```
    /// use tdl2048::config::AgentConfig;
    ///
    /// let config = AgentConfig::parse("name=tdl init alpha=0.01 seed=7 note=hi").unwrap();
    /// assert_eq!(config.name, "tdl");
    /// assert!(config.init);
    /// assert_eq!(config.alpha, 0.01);
    /// assert_eq!(config.seed, Some(7));
    /// assert_eq!(config.extra.get("note").map(String::as_str), Some("hi"));
    /// ```
    pub fn parse(args: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for token in args.split_whitespace() {
            let (key, value) = token.split_once('=').unwrap_or((token, token));
            if key.is_empty() {
                return Err(ConfigError::EmptyKey(token.to_string()));
            }
            config.apply(key, value)?;
        }
        Ok(config)
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "name" => self.name = value.to_string(),
            "role" => self.role = value.to_string(),
            "init" => self.init = true,
            "load" => self.load = Some(PathBuf::from(value)),
            "save" => self.save = Some(PathBuf::from(value)),
            "alpha" => {
                let alpha: f32 = value.parse().map_err(|_| invalid())?;
                if !alpha.is_finite() {
                    return Err(invalid());
                }
                self.alpha = alpha;
            }
            "seed" => self.seed = Some(value.parse().map_err(|_| invalid())?),
            _ => {
                self.extra.insert(key.to_string(), value.to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AgentConfig::parse("").unwrap();
        assert_eq!(config, AgentConfig::default());
        assert_eq!(config.name, "unknown");
        assert_eq!(config.alpha, 0.1 / 32.0);
        assert!(!config.init);
    }

    #[test]
    fn test_bare_and_valued_init() {
        assert!(AgentConfig::parse("init").unwrap().init);
        assert!(AgentConfig::parse("init=8x50625").unwrap().init);
    }

    #[test]
    fn test_paths() {
        let config = AgentConfig::parse("load=in.bin save=out.bin.gz").unwrap();
        assert_eq!(config.load, Some(PathBuf::from("in.bin")));
        assert_eq!(config.save, Some(PathBuf::from("out.bin.gz")));
    }

    #[test]
    fn test_later_token_wins() {
        let config = AgentConfig::parse("name=a name=b alpha=0.5 alpha=0.25").unwrap();
        assert_eq!(config.name, "b");
        assert_eq!(config.alpha, 0.25);
    }

    #[test]
    fn test_invalid_alpha() {
        let err = AgentConfig::parse("alpha=fast").unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "alpha".to_string(),
                value: "fast".to_string()
            }
        );
        assert!(AgentConfig::parse("alpha=inf").is_err());
    }

    #[test]
    fn test_invalid_seed() {
        assert!(AgentConfig::parse("seed=-1").is_err());
        assert!(AgentConfig::parse("seed").is_err());
    }

    #[test]
    fn test_empty_key() {
        assert_eq!(
            AgentConfig::parse("=3"),
            Err(ConfigError::EmptyKey("=3".to_string()))
        );
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let config = AgentConfig::parse("depth=3 verbose").unwrap();
        assert_eq!(config.extra.get("depth").map(String::as_str), Some("3"));
        assert_eq!(config.extra.get("verbose").map(String::as_str), Some("verbose"));
    }
}
