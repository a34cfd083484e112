//! 記憶體存儲實現
//!
//! 供整合測試與示例使用；行 upsert 以 row_id 去重，
//! 與真實存儲的冪等契約一致

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use boq_calc::KeywordSets;
use boq_core::{
    BoqError, BoqItem, BoqVersion, CatalogVariant, Result, RowId, SelectedLine,
};
use uuid::Uuid;

use crate::store::{CatalogQuery, CatalogService, VersionItemStore};

#[derive(Default)]
struct StoreInner {
    versions: HashMap<Uuid, BoqVersion>,
    items: HashMap<Uuid, Vec<BoqItem>>,
    rows: HashMap<(Uuid, Uuid), Vec<SelectedLine>>,
    catalog: Vec<CatalogVariant>,
}

/// 記憶體存儲
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<StoreInner>,

    /// 注入持久化失敗（驗證自動儲存的失敗路徑）
    fail_saves: AtomicBool,
}

impl InMemoryStore {
    /// 創建空存儲
    pub fn new() -> Self {
        Self::default()
    }

    /// 創建帶型錄的存儲
    pub fn with_catalog(catalog: Vec<CatalogVariant>) -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.lock() {
            inner.catalog = catalog;
        }
        store
    }

    /// 開關：讓後續 upsert 失敗
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// 讀取已保存的行（測試斷言用）
    pub fn saved_rows(&self, project_id: Uuid, version_id: Uuid) -> Vec<SelectedLine> {
        self.inner
            .lock()
            .map(|inner| {
                inner
                    .rows
                    .get(&(project_id, version_id))
                    .cloned()
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, StoreInner>> {
        self.inner
            .lock()
            .map_err(|_| BoqError::PersistenceFailure("存儲鎖中毒".to_string()))
    }
}

#[async_trait]
impl CatalogService for InMemoryStore {
    async fn search(&self, query: &CatalogQuery) -> Result<Vec<CatalogVariant>> {
        let inner = self.lock()?;
        let keyword = query.keyword.to_lowercase();
        let keywords = KeywordSets::standard();
        Ok(inner
            .catalog
            .iter()
            .filter(|variant| {
                let keyword_hit = keyword.is_empty()
                    || variant.product_name.to_lowercase().contains(&keyword)
                    || variant.material_name.to_lowercase().contains(&keyword);

                // 結構過濾：限定工作包類型時以該類型的關鍵字集判定歸屬
                let type_hit = query.package_type.map_or(true, |package_type| {
                    keywords.matches(package_type, &variant.product_name)
                        || keywords.matches(package_type, &variant.material_name)
                });

                keyword_hit && type_hit
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl VersionItemStore for InMemoryStore {
    async fn get_version(&self, version_id: Uuid) -> Result<BoqVersion> {
        let inner = self.lock()?;
        inner
            .versions
            .get(&version_id)
            .cloned()
            .ok_or(BoqError::VersionNotFound(version_id))
    }

    async fn list_versions(&self, project_id: Uuid) -> Result<Vec<BoqVersion>> {
        let inner = self.lock()?;
        let mut versions: Vec<BoqVersion> = inner
            .versions
            .values()
            .filter(|v| v.project_id == project_id)
            .cloned()
            .collect();
        versions.sort_by_key(|v| v.version_number);
        Ok(versions)
    }

    async fn put_version(&self, version: BoqVersion) -> Result<()> {
        let mut inner = self.lock()?;
        inner.versions.insert(version.id, version);
        Ok(())
    }

    async fn list_items(&self, version_id: Uuid) -> Result<Vec<BoqItem>> {
        let inner = self.lock()?;
        Ok(inner.items.get(&version_id).cloned().unwrap_or_default())
    }

    async fn insert_item(&self, item: BoqItem) -> Result<()> {
        let mut inner = self.lock()?;
        inner.items.entry(item.version_id).or_default().push(item);
        Ok(())
    }

    async fn delete_item(&self, version_id: Uuid, item_id: Uuid) -> Result<()> {
        let mut inner = self.lock()?;
        if let Some(items) = inner.items.get_mut(&version_id) {
            items.retain(|item| item.id != item_id);
        }
        Ok(())
    }

    async fn upsert_rows(
        &self,
        project_id: Uuid,
        version_id: Uuid,
        rows: Vec<SelectedLine>,
    ) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(BoqError::PersistenceFailure("注入的存儲故障".to_string()));
        }

        let mut inner = self.lock()?;
        let stored = inner.rows.entry((project_id, version_id)).or_default();
        for row in rows {
            // 以 row_id 去重：重試的自動儲存不產生重複列
            match stored.iter_mut().find(|r| r.row_id == row.row_id) {
                Some(existing) => *existing = row,
                None => stored.push(row),
            }
        }
        Ok(())
    }

    async fn load_rows(&self, project_id: Uuid, version_id: Uuid) -> Result<Vec<SelectedLine>> {
        let inner = self.lock()?;
        Ok(inner
            .rows
            .get(&(project_id, version_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_rows(
        &self,
        project_id: Uuid,
        version_id: Uuid,
        row_ids: Vec<RowId>,
    ) -> Result<()> {
        let mut inner = self.lock()?;
        if let Some(stored) = inner.rows.get_mut(&(project_id, version_id)) {
            stored.retain(|row| !row_ids.contains(&row.row_id));
        }
        Ok(())
    }
}
