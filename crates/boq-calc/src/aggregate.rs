//! 行聚合與去重
//!
//! 工作集跨多次「加入估算」動作維護已選行。
//! 去重策略刻意不對稱：
//! - 單次加入（批次內）以行ID去重 — 每扇實體門一列；
//! - 批次合併入既有工作集以材料ID去重 — 已在清單中的材料
//!   收斂到既有條目，不產生重複列。
//! 改動此策略前必須與業務方確認。

use boq_core::{BatchId, RowId, SelectedLine};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 工作集
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkingSet {
    lines: Vec<SelectedLine>,
}

impl WorkingSet {
    /// 創建空工作集
    pub fn new() -> Self {
        Self::default()
    }

    /// 從已保存的行還原
    pub fn from_lines(lines: Vec<SelectedLine>) -> Self {
        Self { lines }
    }

    /// 當前全部行（保持加入順序）
    pub fn lines(&self) -> &[SelectedLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 檢查材料是否已在工作集
    pub fn contains_material(&self, material_id: &str) -> bool {
        self.lines.iter().any(|l| l.material_id == material_id)
    }

    /// 合併一個新批次
    ///
    /// 批次內以行ID去重，合併入工作集以材料ID去重（既有條目優先）。
    /// 返回實際插入的行ID
    pub fn insert_batch(&mut self, batch_lines: Vec<SelectedLine>) -> Vec<RowId> {
        let mut seen_rows: HashSet<RowId> = HashSet::new();
        let mut inserted = Vec::new();

        for line in batch_lines {
            // 批次內重複行
            if !seen_rows.insert(line.row_id.clone()) {
                continue;
            }

            // 已保存工作集中有同一材料 → 收斂到既有條目
            if self.contains_material(&line.material_id) {
                tracing::debug!("材料 {} 已在工作集，跳過重複行", line.material_id);
                continue;
            }

            inserted.push(line.row_id.clone());
            self.lines.push(line);
        }

        inserted
    }

    /// 依行ID刪除
    pub fn remove_row(&mut self, row_id: &RowId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.row_id != row_id);
        self.lines.len() < before
    }

    /// 依材料ID刪除
    pub fn remove_material(&mut self, material_id: &str) -> usize {
        let before = self.lines.len();
        self.lines.retain(|l| l.material_id != material_id);
        before - self.lines.len()
    }

    /// 依批次鍵刪除：移除共享該批次的所有行，返回被移除的行ID
    pub fn remove_batch(&mut self, batch: &BatchId) -> Vec<RowId> {
        let removed: Vec<RowId> = self
            .lines
            .iter()
            .filter(|l| &l.row_id.batch == batch)
            .map(|l| l.row_id.clone())
            .collect();
        self.lines.retain(|l| &l.row_id.batch != batch);
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boq_core::{
        Dimensions, MaterialCategory, Unit, WorkPackageConfiguration, WorkPackageType,
    };
    use rust_decimal::Decimal;

    fn line(batch: &BatchId, material_id: &str) -> SelectedLine {
        SelectedLine {
            row_id: RowId::new(batch.clone(), material_id),
            material_id: material_id.to_string(),
            product_name: material_id.to_string(),
            category: MaterialCategory::Hardware,
            unit: Unit::Nos,
            quantity: Decimal::ONE,
            supply_rate: Decimal::from(100),
            install_rate: Decimal::from(10),
            brand: "Test".to_string(),
            shop_id: None,
            shop_name: None,
            package_type: WorkPackageType::FlushDoor,
            sub_option: None,
            glazing_type: None,
            unit_count: 1,
        }
    }

    fn stamp() -> BatchId {
        let config = WorkPackageConfiguration::new(
            WorkPackageType::FlushDoor,
            Dimensions::new(1, Decimal::from(7), Decimal::from(3)),
        );
        BatchId::stamp(&config)
    }

    #[test]
    fn test_within_batch_dedup_by_row_id() {
        let batch = stamp();
        let mut set = WorkingSet::new();

        let inserted = set.insert_batch(vec![
            line(&batch, "MAT-001"),
            line(&batch, "MAT-001"), // 批次內重複行
            line(&batch, "MAT-002"),
        ]);

        assert_eq!(inserted.len(), 2);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_merge_dedup_by_material() {
        let mut set = WorkingSet::new();
        let first = stamp();
        set.insert_batch(vec![line(&first, "MAT-001"), line(&first, "MAT-002")]);

        // 第二批次重加 MAT-001：收斂到既有條目，工作集不增長
        let second = stamp();
        let inserted = set.insert_batch(vec![line(&second, "MAT-001")]);

        assert!(inserted.is_empty());
        assert_eq!(set.len(), 2);

        // 既有條目保留第一批次的行ID
        assert_eq!(set.lines()[0].row_id.batch, first);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut set = WorkingSet::new();
        let first = stamp();
        set.insert_batch(vec![line(&first, "MAT-001"), line(&first, "MAT-002")]);
        let size = set.len();

        let second = stamp();
        set.insert_batch(vec![line(&second, "MAT-001"), line(&second, "MAT-002")]);
        assert_eq!(set.len(), size);
    }

    #[test]
    fn test_distinct_materials_across_batches_accumulate() {
        let mut set = WorkingSet::new();
        let first = stamp();
        set.insert_batch(vec![line(&first, "MAT-001")]);

        let second = stamp();
        set.insert_batch(vec![line(&second, "MAT-003")]);

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_remove_batch() {
        let mut set = WorkingSet::new();
        let first = stamp();
        let second = stamp();
        set.insert_batch(vec![line(&first, "MAT-001"), line(&first, "MAT-002")]);
        set.insert_batch(vec![line(&second, "MAT-003")]);

        let removed = set.remove_batch(&first);
        assert_eq!(removed.len(), 2);
        assert_eq!(set.len(), 1);
        assert_eq!(set.lines()[0].material_id, "MAT-003");
    }

    #[test]
    fn test_remove_row_and_material() {
        let mut set = WorkingSet::new();
        let batch = stamp();
        set.insert_batch(vec![line(&batch, "MAT-001"), line(&batch, "MAT-002")]);

        assert!(set.remove_row(&RowId::new(batch.clone(), "MAT-001")));
        assert!(!set.remove_row(&RowId::new(batch.clone(), "MAT-001")));
        assert_eq!(set.remove_material("MAT-002"), 1);
        assert!(set.is_empty());
    }
}
