//! タグ解決モジュール

use crate::database::EntryRepository;
use crate::error::EntryError;
use crate::model::Tag;
use tracing::debug;

/// カンマ区切りのタグ指定を既存または新規のタグに解決する
pub struct TagResolver<'a, R: EntryRepository> {
    repo: &'a R,
    test_mode: bool,
}

impl<'a, R: EntryRepository> TagResolver<'a, R> {
    /// 新しいTagResolverを作成
    ///
    /// テストモードではタグを挿入せず、新規タグのIDは `None` のまま返す。
    pub fn new(repo: &'a R, test_mode: bool) -> Self {
        Self { repo, test_mode }
    }

    /// タグ指定を解決
    ///
    /// 入力順を保持し、重複も除去しない。空の指定は空のリストになる。
    pub fn resolve(&self, spec: Option<&str>) -> Result<Vec<Tag>, EntryError> {
        let Some(spec) = spec else {
            return Ok(Vec::new());
        };

        let mut tags = Vec::new();
        for name in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let tag = match self.repo.find_tag(name)? {
                Some(tag) => tag,
                None => self.create(name)?,
            };
            tags.push(tag);
        }

        Ok(tags)
    }

    fn create(&self, name: &str) -> Result<Tag, EntryError> {
        let id = if self.test_mode {
            None
        } else {
            Some(self.repo.insert_tag(name, true)?)
        };
        debug!("タグを作成: {} (id={:?})", name, id);

        Ok(Tag {
            id,
            name: name.to_string(),
            autocomplete: true,
        })
    }
}
