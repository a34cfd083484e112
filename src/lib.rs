//! # BOQ 估算引擎
//!
//! 工程量清單（BOQ）估算與聚合引擎的總出入口：
//! 由一小組使用者選擇與實體尺寸推導材料需求、解析型錄定價、
//! 跨多次加入動作去重聚合、套用手動覆寫、計算多層成本合計，
//! 並以 draft → submitted 生命週期治理版本可變性。

pub use boq_calc::{
    prepare_estimate, BoqExport, CatalogResolver, CostSummary, EstimateNotice, ExportBuilder,
    ExportRow, GroupedLineItem, GroupingCalculator, KeywordSets, NoticeSeverity, OverrideSet,
    PreparedEstimate, QuantityCalculator, ResolvedMaterial, RuleSet, TaxBasis, WorkingSet,
    WorkPackageRules,
};
pub use boq_core::{
    BatchId, BoqError, BoqItem, BoqVersion, CatalogVariant, Dimensions, GlazingType, GroupKey,
    MaterialCategory, MaterialRole, Override, OverrideKey, RequiredMaterialSpec, Result, RowId,
    SelectedLine, SubOption, Unit, VersionStatus, WorkPackageConfiguration, WorkPackageType,
};
pub use boq_session::{
    Autosaver, CatalogQuery, CatalogService, DirtyTracker, EstimateSession, InMemoryStore,
    SaveRequest, VersionItemStore, VersionManager, DEFAULT_QUIET_PERIOD,
};
