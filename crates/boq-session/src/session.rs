//! 估算會話
//!
//! 跨多個精靈步驟共享的選擇狀態（當前配置、工作集、覆寫）
//! 收攏成一個顯式上下文物件，逐呼叫傳遞；
//! 計算層保持純函數，不碰任何模組級可變狀態。

use boq_calc::{
    BoqExport, ExportBuilder, GroupedLineItem, GroupingCalculator, OverrideSet, PreparedEstimate,
    TaxBasis, WorkingSet,
};
use boq_core::{
    BatchId, BoqError, Override, OverrideKey, Result, RowId, SelectedLine,
    WorkPackageConfiguration,
};
use uuid::Uuid;

use crate::autosave::SaveRequest;
use crate::dirty::DirtyTracker;

/// 估算會話
pub struct EstimateSession {
    /// 專案ID
    project_id: Uuid,

    /// 當前編輯的版本ID（同一時間只有一個）
    version_id: Uuid,

    /// 當前配置（精靈進行中的快照）
    current_config: Option<WorkPackageConfiguration>,

    /// 工作集
    working_set: WorkingSet,

    /// 覆寫集合
    overrides: OverrideSet,

    /// 髒標記
    dirty: DirtyTracker,

    /// 課稅基礎（整份文件統一一種）
    tax_basis: TaxBasis,
}

impl EstimateSession {
    /// 開啟會話
    pub fn new(project_id: Uuid, version_id: Uuid) -> Self {
        Self {
            project_id,
            version_id,
            current_config: None,
            working_set: WorkingSet::new(),
            overrides: OverrideSet::new(),
            dirty: DirtyTracker::new(),
            tax_basis: TaxBasis::default(),
        }
    }

    /// 建構器模式：設置課稅基礎
    pub fn with_tax_basis(mut self, basis: TaxBasis) -> Self {
        self.tax_basis = basis;
        self
    }

    pub fn project_id(&self) -> Uuid {
        self.project_id
    }

    pub fn version_id(&self) -> Uuid {
        self.version_id
    }

    /// 切換編輯目標版本（對其他版本無副作用）
    ///
    /// 返回舊版本尚未排程的最後一筆負載（若有髒行），
    /// 呼叫方應在切換後把它交給自動儲存器，避免丟失未落盤的編輯
    pub fn switch_version(&mut self, version_id: Uuid) -> Option<SaveRequest> {
        let pending = self.snapshot();
        self.version_id = version_id;
        self.working_set = WorkingSet::new();
        self.overrides = OverrideSet::new();
        self.dirty.clear();
        pending
    }

    /// 從存儲讀回的行還原工作集
    pub fn restore_rows(&mut self, rows: Vec<SelectedLine>) {
        self.working_set = WorkingSet::from_lines(rows);
        self.dirty.clear();
    }

    /// 設置當前配置
    pub fn set_configuration(&mut self, config: WorkPackageConfiguration) {
        self.current_config = Some(config);
    }

    pub fn current_config(&self) -> Option<&WorkPackageConfiguration> {
        self.current_config.as_ref()
    }

    pub fn working_set(&self) -> &WorkingSet {
        &self.working_set
    }

    /// 把一個預備估算作為新批次加入工作集
    ///
    /// 批次內以行ID去重、合併入既有集以材料ID去重；
    /// 返回實際插入的行ID
    pub fn add_batch(&mut self, prepared: &PreparedEstimate) -> Vec<RowId> {
        let (batch, lines) = prepared.stamp_batch();
        tracing::info!(
            "加入批次 {}：{} 行候選",
            batch,
            lines.len()
        );

        let inserted = self.working_set.insert_batch(lines);
        for row_id in &inserted {
            self.dirty.mark_dirty(row_id.clone());
        }
        inserted
    }

    /// 寫入覆寫
    ///
    /// 覆寫必須有可識別的目標行/群組，否則拒絕
    pub fn set_override(&mut self, key: OverrideKey, value: Override) -> Result<()> {
        match &key {
            OverrideKey::Row(row_id) => {
                let exists = self
                    .working_set
                    .lines()
                    .iter()
                    .any(|l| &l.row_id == row_id);
                if !exists {
                    return Err(BoqError::OverrideTargetNotFound(row_id.to_string()));
                }
                self.dirty.mark_dirty(row_id.clone());
            }
            OverrideKey::Group(group_key) => {
                let exists = self
                    .working_set
                    .lines()
                    .iter()
                    .any(|l| &l.group_key() == group_key);
                if !exists {
                    return Err(BoqError::OverrideTargetNotFound(group_key.to_string()));
                }
            }
        }

        self.overrides.set(key, value);
        Ok(())
    }

    /// 撤銷覆寫：回到即時重算的預設值
    pub fn clear_override(&mut self, key: &OverrideKey) -> bool {
        self.overrides.clear(key)
    }

    /// 依行ID刪除（連同其覆寫）
    pub fn remove_row(&mut self, row_id: &RowId) -> bool {
        let removed = self.working_set.remove_row(row_id);
        if removed {
            self.overrides.purge_row(row_id);
        }
        removed
    }

    /// 依材料ID刪除
    pub fn remove_material(&mut self, material_id: &str) -> usize {
        let row_ids: Vec<RowId> = self
            .working_set
            .lines()
            .iter()
            .filter(|l| l.material_id == material_id)
            .map(|l| l.row_id.clone())
            .collect();
        for row_id in &row_ids {
            self.overrides.purge_row(row_id);
        }
        self.working_set.remove_material(material_id)
    }

    /// 依批次鍵刪除：移除共享該批次的所有行及其覆寫
    pub fn remove_batch(&mut self, batch: &BatchId) -> Vec<RowId> {
        let removed = self.working_set.remove_batch(batch);
        self.overrides.purge_batch(batch);
        removed
    }

    /// 即時群組化（每次重新推導，不快取）
    pub fn grouped(&self) -> Vec<GroupedLineItem> {
        GroupingCalculator::group(self.working_set.lines(), &self.overrides)
    }

    /// 匯出：平坦有序列清單 + 文件層合計
    pub fn export(&self) -> BoqExport {
        ExportBuilder::build(&self.grouped(), self.tax_basis)
    }

    /// 產出自動儲存負載
    ///
    /// 有髒行時帶出完整工作集：保存以整次呼叫為粒度 last-write-wins，
    /// 存儲端以 row_id 冪等 upsert，因此前次保存失敗的行
    /// 自然包含在下一個週期的負載裡，不會從重試中掉隊。
    /// 無髒行時返回 None
    pub fn snapshot(&mut self) -> Option<SaveRequest> {
        if self.dirty.is_empty() {
            return None;
        }
        self.dirty.clear();

        Some(SaveRequest {
            project_id: self.project_id,
            version_id: self.version_id,
            rows: self.working_set.lines().to_vec(),
        })
    }
}
