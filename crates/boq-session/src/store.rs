//! 抽象存儲介面
//!
//! 引擎的邊界是兩個異步服務：型錄服務（只讀）與版本/條目存儲。
//! 存儲以 row_id 為鍵對行做 upsert，重試的自動儲存不會產生重複列。

use async_trait::async_trait;
use boq_core::{BoqItem, BoqVersion, CatalogVariant, Result, RowId, SelectedLine, WorkPackageType};
use uuid::Uuid;

/// 型錄查詢：自由文字關鍵字 + 結構過濾
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    /// 關鍵字（大小寫不敏感子串）
    pub keyword: String,

    /// 限定工作包類型
    pub package_type: Option<WorkPackageType>,
}

impl CatalogQuery {
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            package_type: None,
        }
    }

    /// 建構器模式：限定工作包類型
    pub fn with_package_type(mut self, package_type: WorkPackageType) -> Self {
        self.package_type = Some(package_type);
        self
    }
}

/// 型錄服務（引擎只讀）
///
/// `Err` 代表型錄不可用（傳輸層故障），
/// `Ok(vec![])` 代表查無匹配 — 兩者必須區分
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn search(&self, query: &CatalogQuery) -> Result<Vec<CatalogVariant>>;
}

/// 版本/條目存儲
///
/// 以 (project_id, version_id) 為鍵的 CRUD；
/// 行寫入以 row_id 去重，使自動儲存冪等
#[async_trait]
pub trait VersionItemStore: Send + Sync {
    /// 讀取版本
    async fn get_version(&self, version_id: Uuid) -> Result<BoqVersion>;

    /// 列出專案的全部版本
    async fn list_versions(&self, project_id: Uuid) -> Result<Vec<BoqVersion>>;

    /// 寫入/更新版本
    async fn put_version(&self, version: BoqVersion) -> Result<()>;

    /// 列出版本下的條目
    async fn list_items(&self, version_id: Uuid) -> Result<Vec<BoqItem>>;

    /// 新增條目
    async fn insert_item(&self, item: BoqItem) -> Result<()>;

    /// 刪除條目
    async fn delete_item(&self, version_id: Uuid, item_id: Uuid) -> Result<()>;

    /// 以 row_id 為鍵 upsert 工作集行
    async fn upsert_rows(
        &self,
        project_id: Uuid,
        version_id: Uuid,
        rows: Vec<SelectedLine>,
    ) -> Result<()>;

    /// 讀回工作集行
    async fn load_rows(&self, project_id: Uuid, version_id: Uuid) -> Result<Vec<SelectedLine>>;

    /// 刪除工作集行
    async fn delete_rows(
        &self,
        project_id: Uuid,
        version_id: Uuid,
        row_ids: Vec<RowId>,
    ) -> Result<()>;
}
