use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use spl_chaincode::CodecConfig;

use crate::error::{GatewayError, GatewayResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    /// State log location. `None` keeps world state in memory only.
    pub state_path: Option<PathBuf>,
    pub sync_every_write: bool,
    /// Send permissive CORS headers so browser front-ends can call the API.
    pub allow_cors: bool,
    pub codec: CodecConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 4200)),
            state_path: None,
            sync_every_write: false,
            allow_cors: false,
            codec: CodecConfig::default(),
        }
    }
}

impl GatewayConfig {
    pub fn from_toml_str(s: &str) -> GatewayResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| GatewayError::Config(e.to_string()))?;
        config
            .codec
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;
        Ok(config)
    }

    pub fn load(path: &Path) -> GatewayResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = GatewayConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:4200".parse::<SocketAddr>().unwrap());
        assert!(c.state_path.is_none());
        assert!(!c.sync_every_write);
        assert!(!c.allow_cors);
        assert_eq!(c.codec, CodecConfig::default());
    }

    #[test]
    fn parses_toml() {
        let c = GatewayConfig::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:8080"
            state_path = "/var/lib/spl/state.wal"
            sync_every_write = true

            [codec]
            update_pair_delimiter = "$"
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 8080);
        assert_eq!(c.state_path, Some(PathBuf::from("/var/lib/spl/state.wal")));
        assert!(c.sync_every_write);
        assert_eq!(c.codec, CodecConfig::legacy());
    }

    #[test]
    fn empty_toml_is_default() {
        let c = GatewayConfig::from_toml_str("").unwrap();
        assert_eq!(c.bind_addr.port(), 4200);
    }

    #[test]
    fn rejects_clashing_delimiters() {
        let err = GatewayConfig::from_toml_str("[codec]\nsubject_delimiter = \",\"\n").unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.toml");
        std::fs::write(&path, "allow_cors = true\n").unwrap();
        assert!(GatewayConfig::load(&path).unwrap().allow_cors);
    }
}
