//! エントリ登録モジュール

use crate::activity::ActivityResolver;
use crate::database::EntryRepository;
use crate::error::EntryError;
use crate::fact::FactBuilder;
use crate::model::{RawEntry, StoredEntry};
use crate::tags::TagResolver;
use tracing::{debug, info, warn};

/// 1件のエントリをファクト・アクティビティ・タグに解決し、1トランザクションで保存する
pub struct EntryStore<'a, R: EntryRepository> {
    repo: &'a R,
    test_mode: bool,
}

impl<'a, R: EntryRepository> EntryStore<'a, R> {
    /// 新しいEntryStoreを作成
    ///
    /// テストモードでは行を一切書き込まないが、トランザクションの開始と確定は行う。
    pub fn new(repo: &'a R, test_mode: bool) -> Self {
        Self { repo, test_mode }
    }

    /// エントリを保存
    ///
    /// 失敗した場合はロールバックし、元のエラーを返す。
    pub fn store(&self, entry: &RawEntry) -> Result<StoredEntry, EntryError> {
        self.repo.begin()?;

        let result = self.write(entry).and_then(|stored| {
            self.repo.commit()?;
            Ok(stored)
        });

        match result {
            Ok(stored) => {
                info!(
                    "エントリを登録: {} {} ({})",
                    stored.fact.start_time, stored.activity.name, stored.fact.description
                );
                Ok(stored)
            }
            // 確定に失敗した場合もトランザクションが残るため取り消す
            Err(e) => {
                if let Err(rollback_err) = self.repo.rollback() {
                    warn!("ロールバック失敗: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    /// エントリを順に保存
    ///
    /// エントリごとに別トランザクション。最初の失敗で中断し、それ以前の登録は残る。
    pub fn store_all(&self, entries: &[RawEntry]) -> Result<Vec<StoredEntry>, EntryError> {
        let mut stored = Vec::with_capacity(entries.len());
        for entry in entries {
            stored.push(self.store(entry)?);
        }
        Ok(stored)
    }

    fn write(&self, entry: &RawEntry) -> Result<StoredEntry, EntryError> {
        let mut fact =
            FactBuilder::build(&entry.start, entry.end.as_deref(), &entry.description)?;
        let activity = ActivityResolver::new(self.repo).resolve(&entry.activity)?;
        let tags = TagResolver::new(self.repo, self.test_mode).resolve(entry.tags.as_deref())?;

        fact.activity_id = Some(activity.id);

        if self.test_mode {
            debug!("テストモードのため書き込みをスキップ");
            return Ok(StoredEntry {
                fact,
                activity,
                tags,
            });
        }

        let fact_id = self.repo.insert_fact(&fact)?;
        fact.id = Some(fact_id);

        for tag in &tags {
            let tag_id = tag
                .id
                .ok_or_else(|| EntryError::MissingTagId(tag.name.clone()))?;
            self.repo.insert_fact_tag(fact_id, tag_id)?;
        }

        Ok(StoredEntry {
            fact,
            activity,
            tags,
        })
    }
}
