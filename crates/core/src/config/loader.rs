use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

use super::{types::Config, ConfigError};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "PACEBOX_CONFIG";

/// Config file used when `PACEBOX_CONFIG` is unset or empty.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Prefix of environment overrides. `PACEBOX_CONFIG` itself is not a key.
const ENV_PREFIX: &str = "PACEBOX_";

/// Config file path from the value of `PACEBOX_CONFIG`, if any.
pub fn config_path(env_value: Option<String>) -> PathBuf {
    env_value
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load the addon config: TOML file first, then `PACEBOX_` overrides.
///
/// Sections nest with a double underscore, so `PACEBOX_DEBRID__API_KEY` sets
/// the server-wide TorBox key and `PACEBOX_RESOLVER__CACHE_TTL_SECS` the
/// submission cache lifetime.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
}

/// Parse a config from TOML text, without environment overrides.
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
