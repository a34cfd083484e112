//! 工作集行模型與覆寫

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::material::{MaterialCategory, Unit};
use crate::package::{GlazingType, SubOption, WorkPackageConfiguration, WorkPackageType};

/// 批次ID
///
/// 每次「加入估算」動作蓋一個新批次戳記：
/// 配置內容雜湊 + 唯一性鹽值，
/// 同一門型加入兩次會得到兩個獨立批次
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(String);

impl BatchId {
    /// 為一份配置蓋批次戳記
    pub fn stamp(config: &WorkPackageConfiguration) -> Self {
        let content = serde_json::to_string(config).unwrap_or_default();
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        let digest = hasher.finish();

        let salt = uuid::Uuid::new_v4().simple().to_string();
        // 鹽值取前 8 碼已足夠區分批次
        BatchId(format!("{:016x}-{}", digest, &salt[..8]))
    }

    /// 從既有字串還原（持久化讀回）
    pub fn from_raw(raw: impl Into<String>) -> Self {
        BatchId(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 行ID：批次 × 材料 的顯式複合鍵
///
/// 取代字串串接的隱式鍵，等值語義明確，
/// 在單一批次內唯一；同一材料可出現在不同批次
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowId {
    /// 批次ID
    pub batch: BatchId,

    /// 材料ID
    pub material: String,
}

impl RowId {
    /// 創建新的行ID
    pub fn new(batch: BatchId, material: impl Into<String>) -> Self {
        Self {
            batch,
            material: material.into(),
        }
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 相容舊格式：批次 + 材料 直接串接
        write!(f, "{}{}", self.batch, self.material)
    }
}

/// 群組鍵：工作包判別字段的複合鍵
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    /// 工作包類型
    pub package_type: WorkPackageType,

    /// 子選項
    pub sub_option: Option<SubOption>,

    /// 玻璃類型
    pub glazing_type: Option<GlazingType>,
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.package_type)?;
        if let Some(sub) = self.sub_option {
            write!(f, " ({})", sub)?;
        }
        Ok(())
    }
}

/// 已選擇的行：一個批次內、一項需求材料的一次變體選擇
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedLine {
    /// 行ID
    pub row_id: RowId,

    /// 材料ID
    pub material_id: String,

    /// 產品名稱
    pub product_name: String,

    /// 材料分類
    pub category: MaterialCategory,

    /// 計價單位
    pub unit: Unit,

    /// 數量
    pub quantity: Decimal,

    /// 供應單價
    pub supply_rate: Decimal,

    /// 安裝單價
    pub install_rate: Decimal,

    /// 選定品牌
    pub brand: String,

    /// 選定商店ID
    pub shop_id: Option<String>,

    /// 選定商店名稱
    pub shop_name: Option<String>,

    /// 工作包類型（群組判別字段）
    pub package_type: WorkPackageType,

    /// 子選項（群組判別字段）
    pub sub_option: Option<SubOption>,

    /// 玻璃類型（群組判別字段）
    pub glazing_type: Option<GlazingType>,

    /// 此批次配置的實體單元數
    pub unit_count: u32,
}

impl SelectedLine {
    /// 所屬群組鍵
    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            package_type: self.package_type,
            sub_option: self.sub_option,
            glazing_type: self.glazing_type,
        }
    }

    /// 供應金額
    pub fn supply_amount(&self) -> Decimal {
        self.quantity * self.supply_rate
    }

    /// 安裝金額
    pub fn install_amount(&self) -> Decimal {
        self.quantity * self.install_rate
    }

    /// 行金額 = 數量 × (供應單價 + 安裝單價)
    pub fn amount(&self) -> Decimal {
        self.quantity * (self.supply_rate + self.install_rate)
    }
}

/// 覆寫：使用者手動修正，疊加在計算值之上
///
/// 缺省字段表示「使用計算預設值」；
/// 覆寫永不破壞底層計算基線，撤銷後回到即時重算的值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Override {
    /// 數量覆寫
    pub quantity: Option<Decimal>,

    /// 供應單價覆寫
    pub supply_rate: Option<Decimal>,

    /// 安裝單價覆寫
    pub install_rate: Option<Decimal>,

    /// 描述覆寫
    pub description: Option<String>,

    /// 位置覆寫
    pub location: Option<String>,

    /// 單位覆寫
    pub unit: Option<Unit>,
}

impl Override {
    /// 建構器模式：設置數量
    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// 建構器模式：設置供應單價
    pub fn with_supply_rate(mut self, rate: Decimal) -> Self {
        self.supply_rate = Some(rate);
        self
    }

    /// 建構器模式：設置安裝單價
    pub fn with_install_rate(mut self, rate: Decimal) -> Self {
        self.install_rate = Some(rate);
        self
    }

    /// 建構器模式：設置描述
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 建構器模式：設置位置
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// 檢查是否沒有任何字段被覆寫
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none()
            && self.supply_rate.is_none()
            && self.install_rate.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.unit.is_none()
    }
}

/// 覆寫目標鍵：行級或群組級
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverrideKey {
    /// 行級覆寫
    Row(RowId),
    /// 群組級覆寫
    Group(GroupKey),
}
