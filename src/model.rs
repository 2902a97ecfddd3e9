//! ドメインモデルモジュール

use std::fmt::{self, Write as _};

/// 登録前のエントリ（コマンド引数またはgitログから生成）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    /// アクティビティ指定（`name` または `name@category`）
    pub activity: String,
    /// 開始日時（未検証）
    pub start: String,
    /// 終了日時（未検証、省略時は開始日時）
    pub end: Option<String>,
    /// 説明
    pub description: String,
    /// カンマ区切りのタグ名
    pub tags: Option<String>,
}

/// ファクト（記録された1件の作業）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    pub id: Option<i64>,
    pub start_time: String,
    pub end_time: String,
    pub description: String,
    pub activity_id: Option<i64>,
}

/// カテゴリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub search_name: Option<String>,
}

/// アクティビティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub id: i64,
    pub name: String,
    pub search_name: Option<String>,
    pub category_id: Option<i64>,
    /// `name@category` で解決された場合のみ設定される
    pub category: Option<Category>,
}

/// タグ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// テストモードで新規作成されたタグは `None`
    pub id: Option<i64>,
    pub name: String,
    pub autocomplete: bool,
}

/// 登録結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub fact: Fact,
    pub activity: Activity,
    pub tags: Vec<Tag>,
}

fn opt<T: fmt::Display>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

fn field(out: &mut String, depth: usize, key: &str, value: impl fmt::Display) -> fmt::Result {
    writeln!(out, "{}{}: {}", "    ".repeat(depth), key, value)
}

fn open(out: &mut String, depth: usize, key: &str) -> fmt::Result {
    writeln!(out, "{}{}: [", "    ".repeat(depth), key)
}

fn close(out: &mut String, depth: usize) -> fmt::Result {
    writeln!(out, "{}]", "    ".repeat(depth))
}

impl StoredEntry {
    fn render(&self) -> Result<String, fmt::Error> {
        let mut out = String::from("\n---Entry---\n");

        open(&mut out, 0, "fact")?;
        field(&mut out, 1, "id", opt(&self.fact.id))?;
        field(&mut out, 1, "start_time", &self.fact.start_time)?;
        field(&mut out, 1, "end_time", &self.fact.end_time)?;
        field(&mut out, 1, "description", &self.fact.description)?;
        field(&mut out, 1, "activity_id", opt(&self.fact.activity_id))?;
        close(&mut out, 0)?;

        open(&mut out, 0, "activity")?;
        field(&mut out, 1, "id", self.activity.id)?;
        field(&mut out, 1, "name", &self.activity.name)?;
        field(&mut out, 1, "search_name", opt(&self.activity.search_name))?;
        field(&mut out, 1, "category_id", opt(&self.activity.category_id))?;
        if let Some(category) = &self.activity.category {
            open(&mut out, 1, "category")?;
            field(&mut out, 2, "id", category.id)?;
            field(&mut out, 2, "name", &category.name)?;
            field(&mut out, 2, "search_name", opt(&category.search_name))?;
            close(&mut out, 1)?;
        }
        close(&mut out, 0)?;

        open(&mut out, 0, "tags")?;
        for (i, tag) in self.tags.iter().enumerate() {
            open(&mut out, 1, &i.to_string())?;
            field(&mut out, 2, "id", opt(&tag.id))?;
            field(&mut out, 2, "name", &tag.name)?;
            field(&mut out, 2, "autocomplete", tag.autocomplete)?;
            close(&mut out, 1)?;
        }
        close(&mut out, 0)?;

        Ok(out)
    }
}

impl fmt::Display for StoredEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> StoredEntry {
        StoredEntry {
            fact: Fact {
                id: None,
                start_time: "2024-01-01 10:00:00".to_string(),
                end_time: "2024-01-01 11:00:00".to_string(),
                description: "バグ修正".to_string(),
                activity_id: Some(3),
            },
            activity: Activity {
                id: 3,
                name: "coding".to_string(),
                search_name: Some("coding".to_string()),
                category_id: Some(1),
                category: Some(Category {
                    id: 1,
                    name: "Work".to_string(),
                    search_name: Some("work".to_string()),
                }),
            },
            tags: vec![Tag {
                id: None,
                name: "git".to_string(),
                autocomplete: true,
            }],
        }
    }

    #[test]
    fn test_render_contains_header_and_sections() {
        let rendered = sample_entry().to_string();
        assert!(rendered.starts_with("\n---Entry---\n"));
        assert!(rendered.contains("fact: [\n"));
        assert!(rendered.contains("    start_time: 2024-01-01 10:00:00\n"));
        assert!(rendered.contains("    activity_id: 3\n"));
        assert!(rendered.contains("    category: [\n        id: 1\n        name: Work\n"));
        assert!(rendered.contains("tags: [\n    0: [\n        id: \n        name: git\n"));
    }

    #[test]
    fn test_render_without_category_or_tags() {
        let mut entry = sample_entry();
        entry.activity.category = None;
        entry.tags.clear();

        let rendered = entry.to_string();
        assert!(!rendered.contains("category: ["));
        assert!(rendered.ends_with("tags: [\n]\n"));
    }
}
