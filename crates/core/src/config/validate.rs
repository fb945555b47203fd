use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Auth section exists (enforced by serde)
/// - Server port is not 0
/// - Auth realm is not blank
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.auth.realm.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "auth.realm cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, AuthMethod, DatabaseConfig, ServerConfig};
    use std::net::IpAddr;

    fn valid_config() -> Config {
        Config {
            auth: AuthConfig {
                method: AuthMethod::None,
                realm: "podcatalog".to_string(),
            },
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid_config();
        config.server = ServerConfig {
            host: "0.0.0.0".parse::<IpAddr>().unwrap(),
            port: 0,
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_blank_realm_fails() {
        let mut config = valid_config();
        config.auth.realm = "  ".to_string();
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
