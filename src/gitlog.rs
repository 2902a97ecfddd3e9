//! gitログ解析モジュール

use crate::error::EntryError;
use crate::model::RawEntry;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// コミットヘッダ行（`commit <40桁のハッシュ>`）
static COMMIT_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^commit [0-9a-f]{40}\n").unwrap());

static AUTHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Author:[ \t]*(.*)$").unwrap());

/// 空行が続く `Date:` 行（`--pretty=fuller` では `CommitDate:`）と、メッセージの1行目
static DATE_MESSAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Date:[ \t]+(.*)\n\n(.*)").unwrap());

/// `git log` の出力をエントリに変換する
#[derive(Debug, Clone, Default)]
pub struct GitLogParser {
    /// このテキストを含む作者のコミットのみ対象
    pub author: Option<String>,
    /// 各エントリに引き継ぐアクティビティ指定
    pub activity: String,
    /// 各エントリに引き継ぐタグ指定
    pub tags: Option<String>,
}

impl GitLogParser {
    /// ログを解析してエントリを生成
    ///
    /// ログ中の出現順を保持する。開始・終了日時はどちらもコミット日時。
    pub fn parse(&self, log: &str) -> Result<Vec<RawEntry>, EntryError> {
        if log.trim().is_empty() {
            return Err(EntryError::InvalidInput("解析するログがありません".to_string()));
        }

        let mut entries = Vec::new();
        for chunk in COMMIT_HEADER_RE.split(log) {
            if chunk.trim().is_empty() {
                continue;
            }

            if let Some(author) = &self.author {
                if !self.authored_by(chunk, author) {
                    debug!("作者が一致しないためスキップ: {}", first_line(chunk));
                    continue;
                }
            }

            let captures = DATE_MESSAGE_RE
                .captures(chunk)
                .ok_or_else(|| EntryError::MalformedCommit(chunk.trim().to_string()))?;

            let date = captures[1].trim().to_string();
            let message = captures[2].trim().to_string();

            entries.push(RawEntry {
                activity: self.activity.clone(),
                start: date.clone(),
                end: Some(date),
                description: message,
                tags: self.tags.clone(),
            });
        }

        debug!("{}件のコミットを検出", entries.len());
        Ok(entries)
    }

    fn authored_by(&self, chunk: &str, author: &str) -> bool {
        AUTHOR_RE
            .captures_iter(chunk)
            .any(|caps| caps[1].contains(author))
    }
}

fn first_line(chunk: &str) -> &str {
    chunk.lines().next().unwrap_or_default()
}
