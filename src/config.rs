//! 設定モジュール

use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// 省略されたオプションの既定値
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    pub activity: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub author: Option<String>,
}

/// アプリケーション設定
#[derive(Debug, Clone)]
pub struct Config {
    /// Hamsterデータベースファイルパス
    pub db_path: PathBuf,
    /// オプションの既定値
    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));

        Self {
            db_path: data_dir.join("hamster-applet").join("hamster.db"),
            defaults: Defaults::default(),
        }
    }
}

/// TOML設定ファイル用構造体
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    db: Option<String>,
    #[serde(default)]
    defaults: Defaults,
}

impl Config {
    /// 設定を読み込む
    ///
    /// `path` が指定された場合はそのファイルを必須とし、
    /// 未指定なら既定パスのファイルがあれば読み込む。
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        match path {
            Some(path) => config.merge_file(path)?,
            None => {
                let default_path = Self::default_config_path();
                if default_path.exists() {
                    config.merge_file(&default_path)?;
                }
            }
        }

        config.validate()?;

        Ok(config)
    }

    /// 既定の設定ファイルパス
    pub fn default_config_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".hamster-cli").join("config.toml")
    }

    fn merge_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = fs::read_to_string(path)?;
        let file_config: FileConfig = toml::from_str(&content)?;
        self.merge_file_config(file_config);
        Ok(())
    }

    /// ファイル設定をマージ
    fn merge_file_config(&mut self, file_config: FileConfig) {
        if let Some(db) = file_config.db {
            self.db_path = PathBuf::from(db);
        }
        self.defaults = file_config.defaults;
    }

    /// 設定値をバリデート
    ///
    /// アクティビティは既存データなので、データベースは作成せず存在を要求する。
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.db_path.exists() {
            return Err(ConfigError::DatabaseNotFound(self.db_path.clone()));
        }
        Ok(())
    }
}
