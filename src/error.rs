//! エラー型定義モジュール

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 設定エラー
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IOエラー: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML解析エラー: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("データベースが見つかりません: {}", .0.display())]
    DatabaseNotFound(PathBuf),
}

/// データベースエラー
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLiteエラー: {0}")]
    SqliteError(#[from] rusqlite::Error),
}

/// 見つからなかったレコードの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Activity,
    Category,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Activity => write!(f, "アクティビティ"),
            RecordKind::Category => write!(f, "カテゴリ"),
        }
    }
}

/// エントリ登録エラー
#[derive(Error, Debug)]
pub enum EntryError {
    #[error("無効な入力: {0}")]
    InvalidInput(String),

    #[error("{kind}が見つかりません: {name}")]
    NotFound { kind: RecordKind, name: String },

    #[error("不正なコミットエントリ: {0}")]
    MalformedCommit(String),

    #[error("タグIDがありません: {0}")]
    MissingTagId(String),

    #[error("データベースエラー: {0}")]
    DatabaseError(#[from] DatabaseError),
}

impl EntryError {
    pub fn not_found(kind: RecordKind, name: impl Into<String>) -> Self {
        EntryError::NotFound {
            kind,
            name: name.into(),
        }
    }
}
