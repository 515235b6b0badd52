use crate::error::{ChessSetError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,
    pub text_model: String,
    pub image_model: String,
    pub timeout_seconds: u64,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ChessSetError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("chess-set-ai").join("config.json"))
    }

    /// APIキーを取得（環境変数を優先）
    pub fn get_api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key.clone().ok_or(ChessSetError::MissingApiKey)
    }

    pub fn has_api_key(&self) -> bool {
        self.get_api_key().is_ok()
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            text_model: "gemini-2.0-flash-exp".into(),
            image_model: "gemini-2.5-flash-image-preview".into(),
            timeout_seconds: 120,
        }
    }
}
