//! アクティビティ解決モジュール

use crate::database::EntryRepository;
use crate::error::{EntryError, RecordKind};
use crate::model::Activity;
use tracing::debug;

/// `name` または `name@category` 形式の指定をアクティビティに解決する
///
/// アクティビティとカテゴリは事前に存在している必要がある（作成はしない）。
pub struct ActivityResolver<'a, R: EntryRepository> {
    repo: &'a R,
}

impl<'a, R: EntryRepository> ActivityResolver<'a, R> {
    /// 新しいActivityResolverを作成
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// アクティビティ指定を解決
    pub fn resolve(&self, spec: &str) -> Result<Activity, EntryError> {
        let (name, category_name) = match spec.split_once('@') {
            Some((name, category)) => (name, Some(category)),
            None => (spec, None),
        };

        let category = match category_name {
            Some(category_name) => Some(
                self.repo
                    .find_category(category_name)?
                    .ok_or_else(|| EntryError::not_found(RecordKind::Category, category_name))?,
            ),
            None => None,
        };

        let mut activity = self
            .repo
            .find_activity(name, category.as_ref().map(|c| c.id))?
            .ok_or_else(|| EntryError::not_found(RecordKind::Activity, name))?;

        debug!(
            "アクティビティを解決: {} -> id={} (category={:?})",
            spec,
            activity.id,
            category.as_ref().map(|c| c.name.as_str())
        );

        activity.category = category;
        Ok(activity)
    }
}
