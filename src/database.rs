//! データベースモジュール

use crate::error::DatabaseError;
use crate::model::{Activity, Category, Fact, Tag};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// エントリ登録に必要なストア操作
///
/// 実装は1つの接続上でトランザクションを扱う。
pub trait EntryRepository {
    /// トランザクションを開始
    fn begin(&self) -> Result<(), DatabaseError>;
    /// トランザクションを確定
    fn commit(&self) -> Result<(), DatabaseError>;
    /// トランザクションを取り消す
    fn rollback(&self) -> Result<(), DatabaseError>;

    /// 名前または検索名でカテゴリを取得
    fn find_category(&self, name: &str) -> Result<Option<Category>, DatabaseError>;
    /// 名前または検索名でアクティビティを取得
    ///
    /// `category_id` が `None` の場合はカテゴリ未設定のアクティビティのみ対象。
    fn find_activity(
        &self,
        name: &str,
        category_id: Option<i64>,
    ) -> Result<Option<Activity>, DatabaseError>;
    /// 名前でタグを取得
    fn find_tag(&self, name: &str) -> Result<Option<Tag>, DatabaseError>;

    /// タグを挿入し、採番されたIDを返す
    fn insert_tag(&self, name: &str, autocomplete: bool) -> Result<i64, DatabaseError>;
    /// ファクトを挿入し、採番されたIDを返す
    fn insert_fact(&self, fact: &Fact) -> Result<i64, DatabaseError>;
    /// ファクトとタグを紐付ける
    fn insert_fact_tag(&self, fact_id: i64, tag_id: i64) -> Result<(), DatabaseError>;
}

/// データベース管理
pub struct Database {
    conn: Connection,
}

impl Database {
    /// データベースを開く（必要に応じて作成）
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path)?;

        let db = Database { conn };
        db.initialize_schema()?;

        Ok(db)
    }

    /// スキーマを初期化
    ///
    /// 空のデータベースにのみテーブルを作成する。既存のHamsterデータベースには触れない。
    fn initialize_schema(&self) -> Result<(), DatabaseError> {
        let objects: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get(0))?;
        if objects > 0 {
            return Ok(());
        }

        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(500),
                search_name VARCHAR(500)
            );

            CREATE TABLE IF NOT EXISTS activities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(500),
                search_name VARCHAR(500),
                category_id INTEGER
            );

            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                autocomplete BOOL DEFAULT true
            );

            CREATE TABLE IF NOT EXISTS facts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                activity_id INTEGER,
                start_time TIMESTAMP,
                end_time TIMESTAMP,
                description VARCHAR(500)
            );

            CREATE TABLE IF NOT EXISTS fact_tags (
                fact_id INTEGER,
                tag_id INTEGER
            );
            "#,
        )?;

        Ok(())
    }
}

#[cfg(test)]
impl Database {
    /// カテゴリを挿入（既存データの準備用）
    pub fn insert_category(&self, name: &str, search_name: &str) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO categories (name, search_name) VALUES (?1, ?2)",
            params![name, search_name],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// アクティビティを挿入（既存データの準備用）
    pub fn insert_activity(
        &self,
        name: &str,
        search_name: &str,
        category_id: Option<i64>,
    ) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO activities (name, search_name, category_id) VALUES (?1, ?2, ?3)",
            params![name, search_name, category_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// 登録済みファクトを取得
    pub fn get_facts(&self) -> Result<Vec<Fact>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, start_time, end_time, description, activity_id
            FROM facts
            ORDER BY id ASC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Fact {
                id: Some(row.get(0)?),
                start_time: row.get(1)?,
                end_time: row.get(2)?,
                description: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                activity_id: row.get(4)?,
            })
        })?;

        let mut facts = Vec::new();
        for row in rows {
            facts.push(row?);
        }

        Ok(facts)
    }

    /// ファクトに紐付いたタグIDを取得
    pub fn get_fact_tag_ids(&self, fact_id: i64) -> Result<Vec<i64>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT tag_id FROM fact_tags WHERE fact_id = ?1 ORDER BY rowid ASC")?;
        let rows = stmt.query_map(params![fact_id], |row| row.get(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }

        Ok(ids)
    }
}

impl EntryRepository for Database {
    fn begin(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn find_category(&self, name: &str) -> Result<Option<Category>, DatabaseError> {
        let category = self
            .conn
            .query_row(
                r#"
                SELECT id, name, search_name
                FROM categories
                WHERE name = ?1 OR search_name = ?1
                ORDER BY id ASC
                LIMIT 1
                "#,
                params![name],
                |row| {
                    Ok(Category {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        search_name: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(category)
    }

    fn find_activity(
        &self,
        name: &str,
        category_id: Option<i64>,
    ) -> Result<Option<Activity>, DatabaseError> {
        // NULLとも一致させるため `=` ではなく `IS` で比較する
        let activity = self
            .conn
            .query_row(
                r#"
                SELECT id, name, search_name, category_id
                FROM activities
                WHERE (name = ?1 OR search_name = ?1) AND category_id IS ?2
                ORDER BY id ASC
                LIMIT 1
                "#,
                params![name, category_id],
                |row| {
                    Ok(Activity {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        search_name: row.get(2)?,
                        category_id: row.get(3)?,
                        category: None,
                    })
                },
            )
            .optional()?;

        Ok(activity)
    }

    fn find_tag(&self, name: &str) -> Result<Option<Tag>, DatabaseError> {
        let tag = self
            .conn
            .query_row(
                "SELECT id, name, autocomplete FROM tags WHERE name = ?1 ORDER BY id ASC LIMIT 1",
                params![name],
                |row| {
                    Ok(Tag {
                        id: Some(row.get(0)?),
                        name: row.get(1)?,
                        autocomplete: row.get::<_, Option<bool>>(2)?.unwrap_or(true),
                    })
                },
            )
            .optional()?;

        Ok(tag)
    }

    fn insert_tag(&self, name: &str, autocomplete: bool) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO tags (name, autocomplete) VALUES (?1, ?2)",
            params![name, autocomplete],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn insert_fact(&self, fact: &Fact) -> Result<i64, DatabaseError> {
        self.conn.execute(
            r#"
            INSERT INTO facts (activity_id, start_time, end_time, description)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                fact.activity_id,
                fact.start_time,
                fact.end_time,
                fact.description,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn insert_fact_tag(&self, fact_id: i64, tag_id: i64) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO fact_tags (fact_id, tag_id) VALUES (?1, ?2)",
            params![fact_id, tag_id],
        )?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    pub(crate) fn create_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("hamster.db");
        let db = Database::open(&db_path).unwrap();
        (db, temp_dir)
    }

    fn sample_fact(activity_id: i64) -> Fact {
        Fact {
            id: None,
            start_time: "2024-01-01 10:00:00".to_string(),
            end_time: "2024-01-01 11:00:00".to_string(),
            description: "レビュー".to_string(),
            activity_id: Some(activity_id),
        }
    }

    #[test]
    fn test_database_open_creates_schema() {
        let (db, _temp_dir) = create_test_db();

        for table in ["facts", "activities", "categories", "tags", "fact_tags"] {
            let count: i64 = db
                .conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    params![table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "{} テーブルが存在しない", table);
        }
    }

    #[test]
    fn test_open_existing_database_keeps_data() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("hamster.db");

        {
            let db = Database::open(&db_path).unwrap();
            db.insert_category("Work", "work").unwrap();
        }

        let db = Database::open(&db_path).unwrap();
        assert!(db.find_category("Work").unwrap().is_some());
    }

    #[test]
    fn test_find_category_by_name_or_search_name() {
        let (db, _temp_dir) = create_test_db();
        let id = db.insert_category("Work Stuff", "work").unwrap();

        assert_eq!(db.find_category("Work Stuff").unwrap().unwrap().id, id);
        assert_eq!(db.find_category("work").unwrap().unwrap().id, id);
        assert!(db.find_category("home").unwrap().is_none());
    }

    #[test]
    fn test_find_activity_null_category_uses_is_null() {
        let (db, _temp_dir) = create_test_db();
        let work = db.insert_category("Work", "work").unwrap();
        let scoped = db.insert_activity("coding", "coding", Some(work)).unwrap();
        let unscoped = db.insert_activity("coding", "coding", None).unwrap();

        let found = db.find_activity("coding", None).unwrap().unwrap();
        assert_eq!(found.id, unscoped);
        assert_eq!(found.category_id, None);

        let found = db.find_activity("coding", Some(work)).unwrap().unwrap();
        assert_eq!(found.id, scoped);
    }

    #[test]
    fn test_find_activity_alias_respects_category() {
        let (db, _temp_dir) = create_test_db();
        let work = db.insert_category("Work", "work").unwrap();
        db.insert_activity("Code Review", "review", Some(work)).unwrap();

        // 別カテゴリのアクティビティは検索名で一致しても返さない
        assert!(db.find_activity("review", None).unwrap().is_none());
        assert!(db.find_activity("review", Some(work)).unwrap().is_some());
    }

    #[test]
    fn test_insert_and_find_tag() {
        let (db, _temp_dir) = create_test_db();

        assert!(db.find_tag("git").unwrap().is_none());
        let id = db.insert_tag("git", true).unwrap();
        assert!(id > 0);

        let tag = db.find_tag("git").unwrap().unwrap();
        assert_eq!(tag.id, Some(id));
        assert!(tag.autocomplete);
    }

    #[test]
    fn test_insert_fact_and_tags() {
        let (db, _temp_dir) = create_test_db();
        let activity_id = db.insert_activity("coding", "coding", None).unwrap();
        let tag_id = db.insert_tag("rust", true).unwrap();

        let fact_id = db.insert_fact(&sample_fact(activity_id)).unwrap();
        db.insert_fact_tag(fact_id, tag_id).unwrap();

        let facts = db.get_facts().unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].id, Some(fact_id));
        assert_eq!(facts[0].description, "レビュー");
        assert_eq!(db.get_fact_tag_ids(fact_id).unwrap(), vec![tag_id]);
    }

    #[test]
    fn test_rollback_discards_writes() {
        let (db, _temp_dir) = create_test_db();
        let activity_id = db.insert_activity("coding", "coding", None).unwrap();

        db.begin().unwrap();
        db.insert_fact(&sample_fact(activity_id)).unwrap();
        db.insert_tag("temp", true).unwrap();
        db.rollback().unwrap();

        assert!(db.get_facts().unwrap().is_empty());
        assert!(db.find_tag("temp").unwrap().is_none());
    }

    #[test]
    fn test_commit_persists_writes() {
        let (db, _temp_dir) = create_test_db();
        let activity_id = db.insert_activity("coding", "coding", None).unwrap();

        db.begin().unwrap();
        db.insert_fact(&sample_fact(activity_id)).unwrap();
        db.commit().unwrap();

        assert_eq!(db.get_facts().unwrap().len(), 1);
    }

    #[test]
    fn test_open_leaves_existing_schema_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("hamster.db");
        {
            // 名前の重複を許す既存のtagsテーブル
            let conn = Connection::open(&db_path).unwrap();
            conn.execute_batch(
                r#"
                CREATE TABLE tags (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    autocomplete BOOL DEFAULT true
                );
                INSERT INTO tags (name) VALUES ('dup');
                INSERT INTO tags (name) VALUES ('dup');
                "#,
            )
            .unwrap();
        }

        let db = Database::open(&db_path).unwrap();

        let objects: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get(0))
            .unwrap();
        // tagsテーブルとAUTOINCREMENT用のsqlite_sequenceのみ
        assert_eq!(objects, 2);

        let tag = db.find_tag("dup").unwrap().unwrap();
        assert_eq!(tag.id, Some(1));
    }
}
