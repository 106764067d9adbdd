use std::env;

use crate::{error::Error, Result};

/// Amount of entries the index grows by once it is full
pub const DEFAULT_GROWTH_CHUNK: usize = 1024;
/// Maximum amount of digits accepted for a line number
pub const DEFAULT_MAX_DIGITS: usize = 10;

pub const GROWTH_CHUNK_VAR: &str = "LINE_INDEX_GROWTH_CHUNK";
pub const MAX_DIGITS_VAR: &str = "LINE_INDEX_MAX_DIGITS";

/// u64::MAX has 20 digits, so 19 is the most that always fits
const MAX_DIGITS_LIMIT: usize = 19;

/// Tunables for building an index and reading line numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub growth_chunk: usize,
    pub max_digits: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            growth_chunk: DEFAULT_GROWTH_CHUNK,
            max_digits: DEFAULT_MAX_DIGITS,
        }
    }
}

impl Config {
    /// Reads the config from the process environment, falling back to the defaults for unset
    /// variables.
    pub fn from_env() -> Result<Config> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config using `lookup` to resolve variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(value) = lookup(GROWTH_CHUNK_VAR) {
            config.growth_chunk = parse_positive(GROWTH_CHUNK_VAR, &value)?;
        }

        if let Some(value) = lookup(MAX_DIGITS_VAR) {
            let digits = parse_positive(MAX_DIGITS_VAR, &value)?;
            if digits > MAX_DIGITS_LIMIT {
                return Err(Error::InvalidConfig {
                    key: MAX_DIGITS_VAR,
                    value,
                    reason: "line numbers above 19 digits overflow",
                });
            }
            config.max_digits = digits;
        }

        Ok(config)
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err(Error::InvalidConfig {
            key,
            value: value.to_owned(),
            reason: "must be greater than zero",
        }),
        Ok(n) => Ok(n),
        Err(_) => Err(Error::InvalidConfig {
            key,
            value: value.to_owned(),
            reason: "not a number",
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::ErrorKind;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.growth_chunk, 1024);
        assert_eq!(config.max_digits, 10);
    }

    #[test]
    fn test_overrides() {
        let config =
            Config::from_lookup(lookup(&[(GROWTH_CHUNK_VAR, "16"), (MAX_DIGITS_VAR, " 4 ")]))
                .unwrap();
        assert_eq!(config.growth_chunk, 16);
        assert_eq!(config.max_digits, 4);
    }

    #[test]
    fn test_rejects_bad_values() {
        for pairs in [
            [(GROWTH_CHUNK_VAR, "0")],
            [(GROWTH_CHUNK_VAR, "lots")],
            [(MAX_DIGITS_VAR, "0")],
            [(MAX_DIGITS_VAR, "20")],
        ] {
            let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
        }
    }
}
