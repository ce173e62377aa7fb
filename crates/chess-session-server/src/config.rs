//! Configuration loading for the session server.

use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: default_port(),
        }
    }
}

impl Config {
    /// Looks for chess-session.toml in the current directory or parents,
    /// falling back to defaults when no file is found.
    pub async fn load() -> anyhow::Result<Self> {
        let paths = [
            "chess-session.toml",
            "../chess-session.toml",
            "../../chess-session.toml",
        ];

        for path in paths {
            if Path::new(path).exists() {
                let content = tokio::fs::read_to_string(path).await?;
                let config: Config = toml::from_str(&content)?;
                tracing::info!("Loaded config from {}", path);
                return Ok(config);
            }
        }

        tracing::info!("No chess-session.toml found, using defaults");
        Ok(Config::default())
    }
}
