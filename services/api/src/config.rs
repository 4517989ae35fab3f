use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub fishjam_id: String,
    pub fishjam_management_token: String,
    /// Explicit media-room base URLs; overrides the hosted instance
    /// derived from `fishjam_id` (self-hosted deployments, tests).
    pub fishjam_url: Option<String>,
    pub fishjam_socket_url: Option<String>,
    pub vapi_api_key: String,
    pub vapi_assistant_id: String,
    pub vapi_url: Option<String>,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let fishjam_id = std::env::var("FISHJAM_ID")
            .map_err(|_| ConfigError::MissingVar("FISHJAM_ID".to_string()))?;
        let fishjam_management_token = std::env::var("FISHJAM_MANAGEMENT_TOKEN")
            .map_err(|_| ConfigError::MissingVar("FISHJAM_MANAGEMENT_TOKEN".to_string()))?;
        let vapi_api_key = std::env::var("VAPI_API_KEY")
            .map_err(|_| ConfigError::MissingVar("VAPI_API_KEY".to_string()))?;
        let vapi_assistant_id = std::env::var("VAPI_ASSISTANT_ID")
            .map_err(|_| ConfigError::MissingVar("VAPI_ASSISTANT_ID".to_string()))?;

        let fishjam_url = std::env::var("FISHJAM_URL").ok();
        let fishjam_socket_url = std::env::var("FISHJAM_SOCKET_URL").ok();
        let vapi_url = std::env::var("VAPI_URL").ok();

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            fishjam_id,
            fishjam_management_token,
            fishjam_url,
            fishjam_socket_url,
            vapi_api_key,
            vapi_assistant_id,
            vapi_url,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tracing::Level;

    fn clear_env_vars() {
        unsafe {
            env::remove_var("BIND_ADDRESS");
            env::remove_var("FISHJAM_ID");
            env::remove_var("FISHJAM_MANAGEMENT_TOKEN");
            env::remove_var("FISHJAM_URL");
            env::remove_var("FISHJAM_SOCKET_URL");
            env::remove_var("VAPI_API_KEY");
            env::remove_var("VAPI_ASSISTANT_ID");
            env::remove_var("VAPI_URL");
            env::remove_var("RUST_LOG");
        }
    }

    fn set_minimal_env() {
        unsafe {
            env::set_var("FISHJAM_ID", "test-instance");
            env::set_var("FISHJAM_MANAGEMENT_TOKEN", "test-management-token");
            env::set_var("VAPI_API_KEY", "test-vapi-key");
            env::set_var("VAPI_ASSISTANT_ID", "test-assistant");
        }
    }

    #[test]
    fn test_config_error_display() {
        let missing_var = ConfigError::MissingVar("TEST_VAR".to_string());
        assert_eq!(
            format!("{}", missing_var),
            "Missing environment variable: TEST_VAR"
        );

        let invalid_value =
            ConfigError::InvalidValue("TEST_VAR".to_string(), "bad_value".to_string());
        assert_eq!(
            format!("{}", invalid_value),
            "Invalid value for environment variable TEST_VAR: bad_value"
        );
    }

    #[test]
    #[serial]
    fn test_config_from_env_minimal() {
        clear_env_vars();
        set_minimal_env();

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "0.0.0.0:3001");
        assert_eq!(config.fishjam_id, "test-instance");
        assert_eq!(config.fishjam_management_token, "test-management-token");
        assert_eq!(config.fishjam_url, None);
        assert_eq!(config.vapi_api_key, "test-vapi-key");
        assert_eq!(config.vapi_assistant_id, "test-assistant");
        assert_eq!(config.vapi_url, None);
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    #[serial]
    fn test_config_from_env_custom_values() {
        clear_env_vars();
        set_minimal_env();
        unsafe {
            env::set_var("BIND_ADDRESS", "127.0.0.1:8080");
            env::set_var("FISHJAM_URL", "http://localhost:5002");
            env::set_var("FISHJAM_SOCKET_URL", "ws://localhost:5002");
            env::set_var("VAPI_URL", "http://localhost:5003");
            env::set_var("RUST_LOG", "debug");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "127.0.0.1:8080");
        assert_eq!(config.fishjam_url.as_deref(), Some("http://localhost:5002"));
        assert_eq!(
            config.fishjam_socket_url.as_deref(),
            Some("ws://localhost:5002")
        );
        assert_eq!(config.vapi_url.as_deref(), Some("http://localhost:5003"));
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    #[serial]
    fn test_config_invalid_bind_address() {
        clear_env_vars();
        set_minimal_env();
        unsafe {
            env::set_var("BIND_ADDRESS", "not-a-valid-address");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "BIND_ADDRESS"),
            _ => panic!("Expected InvalidValue for BIND_ADDRESS"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_log_level() {
        clear_env_vars();
        set_minimal_env();
        unsafe {
            env::set_var("RUST_LOG", "not-a-level");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "RUST_LOG"),
            _ => panic!("Expected InvalidValue for RUST_LOG"),
        }
    }

    #[test]
    #[serial]
    fn test_config_missing_fishjam_token() {
        clear_env_vars();
        unsafe {
            env::set_var("FISHJAM_ID", "test-instance");
            env::set_var("VAPI_API_KEY", "test-vapi-key");
            env::set_var("VAPI_ASSISTANT_ID", "test-assistant");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(var) => assert_eq!(var, "FISHJAM_MANAGEMENT_TOKEN"),
            _ => panic!("Expected MissingVar for FISHJAM_MANAGEMENT_TOKEN"),
        }
    }

    #[test]
    #[serial]
    fn test_config_missing_vapi_assistant() {
        clear_env_vars();
        unsafe {
            env::set_var("FISHJAM_ID", "test-instance");
            env::set_var("FISHJAM_MANAGEMENT_TOKEN", "test-management-token");
            env::set_var("VAPI_API_KEY", "test-vapi-key");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(var) => assert_eq!(var, "VAPI_ASSISTANT_ID"),
            _ => panic!("Expected MissingVar for VAPI_ASSISTANT_ID"),
        }
    }
}
