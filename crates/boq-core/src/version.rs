//! BOQ 版本與條目模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::line::SelectedLine;
use crate::package::WorkPackageType;
use crate::{BoqError, Result};

/// 版本狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersionStatus {
    /// 草稿（可編輯）
    Draft,
    /// 已送出（終態，拒絕一切寫入）
    Submitted,
}

impl std::fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionStatus::Draft => write!(f, "draft"),
            VersionStatus::Submitted => write!(f, "submitted"),
        }
    }
}

/// BOQ 版本
///
/// 狀態機：draft → submitted，不可逆
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoqVersion {
    /// 版本ID
    pub id: Uuid,

    /// 專案ID
    pub project_id: Uuid,

    /// 版本號
    pub version_number: u32,

    /// 狀態
    pub status: VersionStatus,

    /// 創建時間
    pub created_at: DateTime<Utc>,

    /// 更新時間
    pub updated_at: DateTime<Utc>,
}

impl BoqVersion {
    /// 創建新的草稿版本
    pub fn new(project_id: Uuid, version_number: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_id,
            version_number,
            status: VersionStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    /// 檢查是否為草稿
    pub fn is_draft(&self) -> bool {
        self.status == VersionStatus::Draft
    }

    /// 送出版本（draft → submitted，不可逆）
    pub fn submit(&mut self) -> Result<()> {
        if !self.is_draft() {
            return Err(BoqError::VersionLocked(self.id));
        }
        self.status = VersionStatus::Submitted;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// 守衛：版本必須可寫，否則拒絕
    pub fn ensure_mutable(&self) -> Result<()> {
        if self.is_draft() {
            Ok(())
        } else {
            Err(BoqError::VersionLocked(self.id))
        }
    }
}

/// BOQ 條目：一次「加入」動作提交到版本的一個批次
///
/// 創建後不可部分修改；編輯走覆寫，刪除/重加才替換
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoqItem {
    /// 條目ID
    pub id: Uuid,

    /// 專案ID
    pub project_id: Uuid,

    /// 版本ID
    pub version_id: Uuid,

    /// 工作包類型
    pub work_package: WorkPackageType,

    /// 已解析、含覆寫結果的行資料
    pub table_data: Vec<SelectedLine>,
}

impl BoqItem {
    /// 創建新的 BOQ 條目
    pub fn new(
        project_id: Uuid,
        version_id: Uuid,
        work_package: WorkPackageType,
        table_data: Vec<SelectedLine>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            version_id,
            work_package,
            table_data,
        }
    }

    /// 複製到另一個版本：內容逐字保留，身份全新
    pub fn copy_into(&self, version_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id: self.project_id,
            version_id,
            work_package: self.work_package,
            table_data: self.table_data.clone(),
        }
    }
}
