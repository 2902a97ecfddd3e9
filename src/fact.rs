//! ファクト生成モジュール

use crate::error::EntryError;
use crate::model::Fact;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::warn;

/// 保存時の日時フォーマット
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// タイムゾーン付きの入力形式（git log の既定形式を含む）
const ZONED_FORMATS: &[&str] = &["%a %b %e %H:%M:%S %Y %z", "%Y-%m-%d %H:%M:%S %z"];

/// ローカル時刻として扱う入力形式
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%a %b %e %H:%M:%S %Y",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

/// 日時文字列をローカル時刻として解釈する
///
/// 解釈できない場合は `None` を返す。
pub fn parse_timestamp(input: &str) -> Option<NaiveDateTime> {
    let normalized = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return None;
    }

    if normalized.eq_ignore_ascii_case("now") {
        return Some(Local::now().naive_local());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(&normalized) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    for format in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Some(dt.with_timezone(&Local).naive_local());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(dt);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }

    // 時刻のみの場合は今日の日付を補う
    for format in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(&normalized, format) {
            return Some(Local::now().date_naive().and_time(time));
        }
    }

    None
}

/// ファクト生成
pub struct FactBuilder;

impl FactBuilder {
    /// 開始・終了日時と説明からファクトを生成
    ///
    /// `activity_id` は呼び出し側で設定する。
    /// 終了日時が解釈できない場合は入力値をそのまま保持する。
    pub fn build(start: &str, end: Option<&str>, description: &str) -> Result<Fact, EntryError> {
        let start_time = parse_timestamp(start)
            .ok_or_else(|| EntryError::InvalidInput(format!("無効な日時: {}", start)))?
            .format(TIMESTAMP_FORMAT)
            .to_string();

        let end_time = match end {
            None => start_time.clone(),
            Some(raw) => match parse_timestamp(raw) {
                Some(dt) => dt.format(TIMESTAMP_FORMAT).to_string(),
                None => {
                    warn!("終了日時を解釈できないため入力値のまま保存します: {}", raw);
                    raw.to_string()
                }
            },
        };

        Ok(Fact {
            id: None,
            start_time,
            end_time,
            description: description.to_string(),
            activity_id: None,
        })
    }
}
