//! BOQ 版本生命週期
//!
//! 狀態機：draft → submitted（終態，不可逆）。
//! 可變性守衛只在這一處：所有寫入操作先載入目標版本檢查狀態，
//! 已送出版本硬拒絕且不動任何已存狀態；
//! 計算層（推導/數量/解析/合計）對版本狀態一無所知。

use std::sync::Arc;

use boq_core::{BoqItem, BoqVersion, Result, SelectedLine};
use uuid::Uuid;

use crate::store::VersionItemStore;

/// 版本管理器
pub struct VersionManager<S: VersionItemStore> {
    store: Arc<S>,
}

impl<S: VersionItemStore> VersionManager<S> {
    /// 創建新的版本管理器
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// 存儲引用
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// 創建新版本
    ///
    /// `copy_from` 指定來源版本時逐字複製其全部條目，
    /// 每個複製條目獲得全新身份；否則從空版本開始
    pub async fn create_version(
        &self,
        project_id: Uuid,
        copy_from: Option<Uuid>,
    ) -> Result<BoqVersion> {
        let existing = self.store.list_versions(project_id).await?;
        let next_number = existing
            .iter()
            .map(|v| v.version_number)
            .max()
            .unwrap_or(0)
            + 1;

        let version = BoqVersion::new(project_id, next_number);
        self.store.put_version(version.clone()).await?;

        if let Some(source_id) = copy_from {
            let source_items = self.store.list_items(source_id).await?;
            tracing::info!(
                "版本 {} 自版本 {} 複製 {} 個條目",
                version.version_number,
                source_id,
                source_items.len()
            );
            for item in &source_items {
                self.store.insert_item(item.copy_into(version.id)).await?;
            }

            // 工作集行一併帶入新版本
            let rows = self.store.load_rows(project_id, source_id).await?;
            if !rows.is_empty() {
                self.store.upsert_rows(project_id, version.id, rows).await?;
            }
        }

        Ok(version)
    }

    /// 送出版本（draft → submitted，不可逆）
    pub async fn submit(&self, version_id: Uuid) -> Result<BoqVersion> {
        let mut version = self.store.get_version(version_id).await?;
        version.submit()?;
        self.store.put_version(version.clone()).await?;
        tracing::info!("版本 {} 已送出", version.version_number);
        Ok(version)
    }

    /// 新增條目（受版本狀態守衛）
    pub async fn add_item(&self, item: BoqItem) -> Result<BoqItem> {
        self.guard(item.version_id).await?;
        self.store.insert_item(item.clone()).await?;
        Ok(item)
    }

    /// 刪除條目（受版本狀態守衛）
    pub async fn delete_item(&self, version_id: Uuid, item_id: Uuid) -> Result<()> {
        self.guard(version_id).await?;
        self.store.delete_item(version_id, item_id).await
    }

    /// 保存工作集行（受版本狀態守衛）
    pub async fn save_rows(
        &self,
        project_id: Uuid,
        version_id: Uuid,
        rows: Vec<SelectedLine>,
    ) -> Result<()> {
        self.guard(version_id).await?;
        self.store.upsert_rows(project_id, version_id, rows).await
    }

    /// 刪除工作集行（受版本狀態守衛）
    pub async fn delete_rows(
        &self,
        project_id: Uuid,
        version_id: Uuid,
        row_ids: Vec<boq_core::RowId>,
    ) -> Result<()> {
        self.guard(version_id).await?;
        self.store.delete_rows(project_id, version_id, row_ids).await
    }

    /// 可變性守衛：版本必須為草稿
    async fn guard(&self, version_id: Uuid) -> Result<BoqVersion> {
        let version = self.store.get_version(version_id).await?;
        version.ensure_mutable()?;
        Ok(version)
    }
}
