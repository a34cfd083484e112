//! # BOQ Core
//!
//! 核心資料模型與類型定義

pub mod line;
pub mod material;
pub mod package;
pub mod version;

// Re-export 主要類型
pub use line::{BatchId, GroupKey, Override, OverrideKey, RowId, SelectedLine};
pub use material::{CatalogVariant, MaterialCategory, MaterialRole, RequiredMaterialSpec, Unit};
pub use package::{Dimensions, GlazingType, SubOption, WorkPackageConfiguration, WorkPackageType};
pub use version::{BoqItem, BoqVersion, VersionStatus};

/// BOQ 錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum BoqError {
    #[error("配置不完整: {0}")]
    ConfigurationIncomplete(String),

    #[error("型錄中找不到符合的材料: {0}")]
    NoCatalogMatch(String),

    #[error("版本已送出，拒絕寫入: {0}")]
    VersionLocked(uuid::Uuid),

    #[error("找不到版本: {0}")]
    VersionNotFound(uuid::Uuid),

    #[error("無效的尺寸: {0}")]
    InvalidDimensions(String),

    #[error("找不到覆寫目標: {0}")]
    OverrideTargetNotFound(String),

    #[error("持久化失敗: {0}")]
    PersistenceFailure(String),

    #[error("其他錯誤: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, BoqError>;
