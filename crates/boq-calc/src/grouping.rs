//! 群組與覆寫層
//!
//! 依工作包判別字段把原始行聚合為 BOQ 呈現列，並把使用者手動
//! 修正疊加在計算預設值之上。覆寫優先序：行級 > 群組級 > 計算值。
//! 撤銷覆寫回到即時重算的值，不是過期快照 — 聚合每次呼叫重新推導。

use std::collections::{HashMap, HashSet};

use boq_core::{
    BatchId, GroupKey, Override, OverrideKey, RowId, SelectedLine, Unit,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 覆寫集合
///
/// 覆寫永不落在沒有目標的鍵上 — 由會話層在寫入前驗證目標存在
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverrideSet {
    map: HashMap<OverrideKey, Override>,
}

impl OverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 寫入覆寫；全空的覆寫等同撤銷
    pub fn set(&mut self, key: OverrideKey, value: Override) {
        if value.is_empty() {
            self.map.remove(&key);
        } else {
            self.map.insert(key, value);
        }
    }

    /// 讀取覆寫
    pub fn get(&self, key: &OverrideKey) -> Option<&Override> {
        self.map.get(key)
    }

    /// 撤銷覆寫（回到計算值）
    pub fn clear(&mut self, key: &OverrideKey) -> bool {
        self.map.remove(key).is_some()
    }

    /// 行被刪除時清掉它的覆寫
    pub fn purge_row(&mut self, row_id: &RowId) {
        self.map.remove(&OverrideKey::Row(row_id.clone()));
    }

    /// 批次被刪除時清掉其所有行覆寫
    pub fn purge_batch(&mut self, batch: &BatchId) {
        self.map.retain(|key, _| match key {
            OverrideKey::Row(row_id) => &row_id.batch != batch,
            OverrideKey::Group(_) => true,
        });
    }

    fn row(&self, row_id: &RowId) -> Option<&Override> {
        self.map.get(&OverrideKey::Row(row_id.clone()))
    }

    fn group(&self, key: &GroupKey) -> Option<&Override> {
        self.map.get(&OverrideKey::Group(*key))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// 群組化 BOQ 呈現列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupedLineItem {
    /// 群組鍵
    pub key: GroupKey,

    /// 描述（覆寫或由成員材料名稱推導）
    pub description: String,

    /// 位置（僅覆寫提供）
    pub location: Option<String>,

    /// 單位
    pub unit: Unit,

    /// 實體單元數（群組手動數量覆寫，或依批次推導）
    pub quantity: Decimal,

    /// 單元供應單價（總材料成本 ÷ 數量反推）
    pub supply_rate: Decimal,

    /// 單元安裝單價
    pub install_rate: Decimal,

    /// 供應金額
    pub supply_amount: Decimal,

    /// 安裝金額
    pub install_amount: Decimal,

    /// 成員行ID（保持加入順序）
    pub row_ids: Vec<RowId>,
}

impl GroupedLineItem {
    /// 群組金額
    pub fn amount(&self) -> Decimal {
        self.supply_amount + self.install_amount
    }
}

/// 套用行級覆寫後的有效行值
fn effective(line: &SelectedLine, overrides: &OverrideSet) -> (Decimal, Decimal, Decimal) {
    let row_override = overrides.row(&line.row_id);
    let quantity = row_override
        .and_then(|o| o.quantity)
        .unwrap_or(line.quantity);
    let supply_rate = row_override
        .and_then(|o| o.supply_rate)
        .unwrap_or(line.supply_rate);
    let install_rate = row_override
        .and_then(|o| o.install_rate)
        .unwrap_or(line.install_rate);
    (quantity, supply_rate, install_rate)
}

/// 群組計算器
pub struct GroupingCalculator;

impl GroupingCalculator {
    /// 將工作集聚合為呈現列
    ///
    /// 群組手動數量只改變顯示單價，不改變底層材料總成本；
    /// 群組單價覆寫則直接替換反推出的單價（金額隨之重算）
    pub fn group(lines: &[SelectedLine], overrides: &OverrideSet) -> Vec<GroupedLineItem> {
        let mut order: Vec<GroupKey> = Vec::new();
        let mut buckets: HashMap<GroupKey, Vec<&SelectedLine>> = HashMap::new();

        for line in lines {
            let key = line.group_key();
            if !buckets.contains_key(&key) {
                order.push(key);
            }
            buckets.entry(key).or_default().push(line);
        }

        order
            .into_iter()
            .map(|key| Self::build_group(key, &buckets[&key], overrides))
            .collect()
    }

    fn build_group(
        key: GroupKey,
        members: &[&SelectedLine],
        overrides: &OverrideSet,
    ) -> GroupedLineItem {
        let group_override = overrides.group(&key);

        // 材料成本合計（行級覆寫已生效）
        let mut total_supply = Decimal::ZERO;
        let mut total_install = Decimal::ZERO;
        for line in members {
            let (quantity, supply_rate, install_rate) = effective(line, overrides);
            total_supply += quantity * supply_rate;
            total_install += quantity * install_rate;
        }

        // 預設數量 = 每個獨立批次的實體單元數之和
        let mut seen_batches: HashSet<&BatchId> = HashSet::new();
        let mut derived_units: u32 = 0;
        for line in members {
            if seen_batches.insert(&line.row_id.batch) {
                derived_units += line.unit_count;
            }
        }
        let derived_quantity = Decimal::from(derived_units.max(1));

        let quantity = group_override
            .and_then(|o| o.quantity)
            .filter(|q| *q > Decimal::ZERO)
            .unwrap_or(derived_quantity);

        // 單元單價 = 總成本 ÷ 數量（群組單價覆寫優先）
        let supply_rate = group_override
            .and_then(|o| o.supply_rate)
            .unwrap_or_else(|| total_supply / quantity);
        let install_rate = group_override
            .and_then(|o| o.install_rate)
            .unwrap_or_else(|| total_install / quantity);

        // 單價被覆寫時金額跟著單價走，否則金額維持材料總成本
        let supply_amount = match group_override.and_then(|o| o.supply_rate) {
            Some(rate) => quantity * rate,
            None => total_supply,
        };
        let install_amount = match group_override.and_then(|o| o.install_rate) {
            Some(rate) => quantity * rate,
            None => total_install,
        };

        let description = group_override
            .and_then(|o| o.description.clone())
            .unwrap_or_else(|| Self::derive_description(members));
        let location = group_override.and_then(|o| o.location.clone());
        let unit = group_override.and_then(|o| o.unit).unwrap_or(Unit::Nos);

        GroupedLineItem {
            key,
            description,
            location,
            unit,
            quantity,
            supply_rate,
            install_rate,
            supply_amount,
            install_amount,
            row_ids: members.iter().map(|l| l.row_id.clone()).collect(),
        }
    }

    /// 預設描述：成員材料名稱去重串接
    fn derive_description(members: &[&SelectedLine]) -> String {
        let mut names: Vec<&str> = Vec::new();
        for line in members {
            if !names.contains(&line.product_name.as_str()) {
                names.push(&line.product_name);
            }
        }
        names.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boq_core::{MaterialCategory, WorkPackageType};

    fn line(batch: &BatchId, material_id: &str, quantity: i64, rate: i64) -> SelectedLine {
        SelectedLine {
            row_id: RowId::new(batch.clone(), material_id),
            material_id: material_id.to_string(),
            product_name: material_id.to_string(),
            category: MaterialCategory::DoorPanel,
            unit: Unit::Nos,
            quantity: Decimal::from(quantity),
            supply_rate: Decimal::from(rate),
            install_rate: Decimal::from(50),
            brand: "Test".to_string(),
            shop_id: None,
            shop_name: None,
            package_type: WorkPackageType::FlushDoor,
            sub_option: None,
            glazing_type: None,
            unit_count: 2,
        }
    }

    #[test]
    fn test_group_rate_back_computed() {
        let batch = BatchId::from_raw("b1");
        let lines = vec![
            line(&batch, "MAT-001", 2, 4500), // 供應 9000，安裝 100
            line(&batch, "MAT-002", 6, 120),  // 供應 720，安裝 300
        ];

        let groups = GroupingCalculator::group(&lines, &OverrideSet::new());
        assert_eq!(groups.len(), 1);

        let group = &groups[0];
        // 預設數量 = 批次單元數 2
        assert_eq!(group.quantity, Decimal::from(2));
        assert_eq!(group.supply_amount, Decimal::from(9720));
        assert_eq!(group.install_amount, Decimal::from(400));
        assert_eq!(group.supply_rate, Decimal::from(4860));
        assert_eq!(group.install_rate, Decimal::from(200));
    }

    #[test]
    fn test_group_quantity_edit_keeps_total_cost() {
        let batch = BatchId::from_raw("b1");
        let lines = vec![line(&batch, "MAT-001", 2, 4500)];

        let mut overrides = OverrideSet::new();
        let key = lines[0].group_key();
        overrides.set(
            OverrideKey::Group(key),
            Override::default().with_quantity(Decimal::from(4)),
        );

        let groups = GroupingCalculator::group(&lines, &overrides);
        let group = &groups[0];

        // 數量改為 4：單價減半，總成本不變
        assert_eq!(group.quantity, Decimal::from(4));
        assert_eq!(group.supply_rate, Decimal::from(2250));
        assert_eq!(group.supply_amount, Decimal::from(9000));
    }

    #[test]
    fn test_override_precedence_row_over_group() {
        let batch = BatchId::from_raw("b1");
        let lines = vec![line(&batch, "MAT-001", 2, 4500)];
        let key = lines[0].group_key();

        let mut overrides = OverrideSet::new();
        // 行級數量覆寫：2 → 3
        overrides.set(
            OverrideKey::Row(lines[0].row_id.clone()),
            Override::default().with_quantity(Decimal::from(3)),
        );
        // 群組級供應單價覆寫
        overrides.set(
            OverrideKey::Group(key),
            Override::default().with_supply_rate(Decimal::from(5000)),
        );

        let groups = GroupingCalculator::group(&lines, &overrides);
        let group = &groups[0];

        // 群組單價覆寫生效（金額 = 數量 × 覆寫單價）
        assert_eq!(group.supply_rate, Decimal::from(5000));
        assert_eq!(group.supply_amount, Decimal::from(10000));
        // 行級覆寫生效於安裝成本合計：3 × 50
        assert_eq!(group.install_amount, Decimal::from(150));
    }

    #[test]
    fn test_clearing_override_restores_computed() {
        let batch = BatchId::from_raw("b1");
        let lines = vec![line(&batch, "MAT-001", 2, 4500)];
        let key = OverrideKey::Group(lines[0].group_key());

        let mut overrides = OverrideSet::new();
        overrides.set(key.clone(), Override::default().with_quantity(Decimal::from(10)));
        let with_override = GroupingCalculator::group(&lines, &overrides);
        assert_eq!(with_override[0].quantity, Decimal::from(10));

        // 撤銷後回到即時重算的預設（批次單元數 2），非快照
        overrides.clear(&key);
        let restored = GroupingCalculator::group(&lines, &overrides);
        assert_eq!(restored[0].quantity, Decimal::from(2));
        assert_eq!(restored[0].supply_rate, Decimal::from(4500));
    }

    #[test]
    fn test_groups_keyed_by_discriminators() {
        let b1 = BatchId::from_raw("b1");
        let b2 = BatchId::from_raw("b2");
        let mut wpc_line = line(&b2, "MAT-009", 1, 5200);
        wpc_line.package_type = WorkPackageType::WpcDoor;

        let lines = vec![line(&b1, "MAT-001", 2, 4500), wpc_line];
        let groups = GroupingCalculator::group(&lines, &OverrideSet::new());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key.package_type, WorkPackageType::FlushDoor);
        assert_eq!(groups[1].key.package_type, WorkPackageType::WpcDoor);
    }

    #[test]
    fn test_aggregate_rate_is_weighted_sum_of_members() {
        // 群組金額 = 成員行金額的數量加權和（即時重導）
        let batch = BatchId::from_raw("b1");
        let lines = vec![
            line(&batch, "MAT-001", 2, 4500),
            line(&batch, "MAT-002", 6, 120),
            line(&batch, "MAT-003", 34, 220),
        ];

        let groups = GroupingCalculator::group(&lines, &OverrideSet::new());
        let expected: Decimal = lines.iter().map(|l| l.amount()).sum();
        assert_eq!(groups[0].amount(), expected);
    }
}
