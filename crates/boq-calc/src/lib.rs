//! # BOQ Calculation Engine
//!
//! 估算/聚合核心引擎：需求推導 → 數量計算 → 型錄解析 →
//! 行聚合去重 → 群組與覆寫 → 成本合計 → 匯出形狀

pub mod aggregate;
pub mod derive;
pub mod export;
pub mod grouping;
pub mod quantity;
pub mod resolver;
pub mod totals;

// Re-export 主要類型
pub use aggregate::WorkingSet;
pub use derive::{DeriveOutcome, RuleSet, WorkPackageRules};
pub use export::{BoqExport, ExportBuilder, ExportRow};
pub use grouping::{GroupedLineItem, GroupingCalculator, OverrideSet};
pub use quantity::QuantityCalculator;
pub use resolver::{CatalogResolver, KeywordSets, ResolvedMaterial};
pub use totals::{CostSummary, TaxBasis};

use boq_core::{BatchId, CatalogVariant, RowId, SelectedLine, WorkPackageConfiguration};

/// 估算診斷
///
/// 「配置不完整」「型錄無匹配」屬於可本地恢復的狀態：
/// 以空結果 + 診斷呈現給呼叫方，不以異常中斷整個估算
#[derive(Debug, Clone)]
pub struct EstimateNotice {
    /// 範圍（工作包/材料標籤）
    pub scope: String,

    /// 訊息
    pub message: String,

    /// 嚴重度
    pub severity: NoticeSeverity,
}

impl EstimateNotice {
    pub fn new(scope: String, message: String, severity: NoticeSeverity) -> Self {
        Self {
            scope,
            message,
            severity,
        }
    }

    pub fn info(scope: String, message: String) -> Self {
        Self::new(scope, message, NoticeSeverity::Info)
    }

    pub fn warning(scope: String, message: String) -> Self {
        Self::new(scope, message, NoticeSeverity::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    Info,
    Warning,
    Error,
}

/// 一個批次的預備估算：配置 + 已解析材料 + 診斷
#[derive(Debug)]
pub struct PreparedEstimate {
    /// 來源配置（不可變快照）
    pub config: WorkPackageConfiguration,

    /// 已解析材料（推導順序）
    pub lines: Vec<ResolvedMaterial>,

    /// 診斷信息
    pub notices: Vec<EstimateNotice>,
}

impl PreparedEstimate {
    /// 檢查是否為不完整配置（推導為空）
    pub fn is_incomplete(&self) -> bool {
        self.lines.is_empty()
    }

    /// 蓋批次戳記並產出已選行
    ///
    /// 無任何型錄選擇的材料退回參考單價成行（品牌/商店留空）
    pub fn stamp_batch(&self) -> (BatchId, Vec<SelectedLine>) {
        let batch = BatchId::stamp(&self.config);
        let lines = self
            .lines
            .iter()
            .map(|resolved| self.to_line(&batch, resolved))
            .collect();
        (batch, lines)
    }

    fn to_line(&self, batch: &BatchId, resolved: &ResolvedMaterial) -> SelectedLine {
        let spec = &resolved.spec;
        let (material_id, supply_rate, brand, shop_id, shop_name) = match &resolved.selected {
            Some(variant) => (
                variant.material_id.clone(),
                variant.rate,
                variant.brand.clone(),
                Some(variant.shop_id.clone()),
                Some(variant.shop_name.clone()),
            ),
            None => (
                // 無型錄匹配時以標籤為材料鍵，單價退回參考價
                spec.type_label.to_lowercase().replace(' ', "-"),
                spec.reference_rate,
                String::new(),
                None,
                None,
            ),
        };

        SelectedLine {
            row_id: RowId::new(batch.clone(), material_id.clone()),
            material_id,
            product_name: spec.type_label.clone(),
            category: spec.category,
            unit: spec.unit,
            quantity: spec.required_quantity,
            supply_rate,
            install_rate: spec.reference_install_rate,
            brand,
            shop_id,
            shop_name,
            package_type: self.config.package_type,
            sub_option: self.config.sub_option,
            glazing_type: self.config.glazing_type,
            unit_count: self.config.dimensions.count,
        }
    }
}

/// 預備估算：推導 → 數量 → 型錄解析，一條純函數管線
///
/// 型錄由呼叫方先行取回（此處不觸網），型錄不可用
/// 屬於傳輸層錯誤，與「無匹配」嚴格區分；
/// 後備關鍵字集由呼叫方提供，可在 `KeywordSets::standard` 之上調整
pub fn prepare_estimate(
    config: &WorkPackageConfiguration,
    catalog: &[CatalogVariant],
    rules: &RuleSet,
    keywords: &KeywordSets,
) -> PreparedEstimate {
    tracing::info!(
        "預備估算：{}，單元數 {}",
        config.package_type,
        config.dimensions.count
    );

    let outcome = rules.derive(config);
    let mut notices = outcome.notices;

    let lines = CatalogResolver::resolve_all(outcome.specs, config.package_type, catalog, keywords);

    for resolved in &lines {
        if resolved.variants.is_empty() {
            notices.push(EstimateNotice::warning(
                resolved.spec.type_label.clone(),
                "型錄中沒有匹配的定價變體".to_string(),
            ));
        }
    }

    tracing::debug!("預備完成：{} 項材料，{} 則診斷", lines.len(), notices.len());

    PreparedEstimate {
        config: config.clone(),
        lines,
        notices,
    }
}
