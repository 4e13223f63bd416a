use std::fs;
use std::path::Path;

use latency_router_types::{ConfigError, RouterConfig};

use crate::error::RouterResult;

/// Load router configuration from a JSON file.
///
/// `None` yields the defaults. Fields missing from the file keep their
/// defaults. The result is not validated yet: callers apply CLI overrides
/// first and then call [`RouterConfig::validated`].
pub fn load_config(path: Option<&Path>) -> RouterResult<RouterConfig> {
    let Some(path) = path else {
        return Ok(RouterConfig::default());
    };

    if !path.exists() {
        return Err(ConfigError::NotFound { path: path.display().to_string() }.into());
    }

    let content = fs::read_to_string(path).map_err(|e| ConfigError::from_io_error(&e))?;
    let config: RouterConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::from_json_error(&e))?;

    tracing::debug!("Loaded router config from {}", path.display());
    Ok(config)
}

/// Write a config back out as pretty JSON.
pub fn save_config(path: &Path, config: &RouterConfig) -> RouterResult<()> {
    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RouterError;
    use latency_router_types::SummaryFormat;

    #[test]
    fn test_missing_path_gives_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config, RouterConfig::default());
    }

    #[test]
    fn test_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("router.json"))).unwrap_err();
        assert!(matches!(err, RouterError::Config(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, RouterError::Config(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.json");
        let config = RouterConfig {
            endpoints: vec!["http://10.0.0.1:8080".to_string()],
            inter_round_delay_secs: 20,
            summary_format: SummaryFormat::Compact,
            seed: Some(7),
            ..Default::default()
        };

        save_config(&path, &config).unwrap();
        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }
}
