use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Poll interval is non-zero and shorter than the ready timeout
/// - At least one candidate file is resolved
/// - Cache TTL is non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let resolver = &config.resolver;
    if resolver.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "resolver.poll_interval_ms cannot be 0".to_string(),
        ));
    }
    if resolver.ready_timeout_ms < resolver.poll_interval_ms {
        return Err(ConfigError::ValidationError(format!(
            "resolver.ready_timeout_ms ({}) must be at least poll_interval_ms ({})",
            resolver.ready_timeout_ms, resolver.poll_interval_ms
        )));
    }
    if resolver.max_candidates == 0 {
        return Err(ConfigError::ValidationError(
            "resolver.max_candidates cannot be 0".to_string(),
        ));
    }
    if resolver.cache_ttl_secs == 0 {
        return Err(ConfigError::ValidationError(
            "resolver.cache_ttl_secs cannot be 0".to_string(),
        ));
    }

    if config.debrid.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "debrid.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ResolverConfig, ServerConfig};

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                port: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_timeout_shorter_than_interval_fails() {
        let config = Config {
            resolver: ResolverConfig {
                poll_interval_ms: 5000,
                ready_timeout_ms: 1000,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("ready_timeout_ms"));
    }

    #[test]
    fn test_validate_zero_candidates_fails() {
        let config = Config {
            resolver: ResolverConfig {
                max_candidates: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_ttl_fails() {
        let config = Config {
            resolver: ResolverConfig {
                cache_ttl_secs: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
