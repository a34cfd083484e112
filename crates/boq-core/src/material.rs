//! 材料模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 材料分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialCategory {
    /// 門框
    Frame,
    /// 門扇
    DoorPanel,
    /// 五金
    Hardware,
    /// 玻璃
    Glass,
    /// 面層（油漆/地坪）
    Finish,
}

/// 材料的語義角色（決定數量公式）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialRole {
    /// 門框（延米公式）
    Frame,
    /// 門扇（每單元一件）
    Panel,
    /// 鉸鏈（依高度分級）
    Hinge,
    /// 五金（每單元一件）
    Hardware,
    /// 玻璃（面積公式）
    Glass,
    /// 面層（面積公式）
    Area,
}

/// 計價單位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// 件
    Nos,
    /// 延英尺
    Rft,
    /// 平方英尺
    Sqft,
    /// 公升
    Ltr,
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Unit::Nos => "Nos",
            Unit::Rft => "Rft",
            Unit::Sqft => "Sqft",
            Unit::Ltr => "Ltr",
        };
        write!(f, "{}", label)
    }
}

/// 需求材料規格（推導結果，純計算產物，不單獨持久化）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredMaterialSpec {
    /// 材料名稱標籤
    pub type_label: String,

    /// 材料分類
    pub category: MaterialCategory,

    /// 語義角色
    pub role: MaterialRole,

    /// 計價單位
    pub unit: Unit,

    /// 需求數量
    pub required_quantity: Decimal,

    /// 參考供應單價
    pub reference_rate: Decimal,

    /// 參考安裝單價
    pub reference_install_rate: Decimal,
}

impl RequiredMaterialSpec {
    /// 創建新的需求材料規格
    pub fn new(
        type_label: impl Into<String>,
        category: MaterialCategory,
        role: MaterialRole,
        unit: Unit,
        reference_rate: Decimal,
    ) -> Self {
        Self {
            type_label: type_label.into(),
            category,
            role,
            unit,
            required_quantity: Decimal::ONE,
            reference_rate,
            reference_install_rate: Decimal::ZERO,
        }
    }

    /// 建構器模式：設置需求數量
    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.required_quantity = quantity;
        self
    }

    /// 建構器模式：設置參考安裝單價
    pub fn with_install_rate(mut self, rate: Decimal) -> Self {
        self.reference_install_rate = rate;
        self
    }
}

/// 型錄變體（品牌 × 商店的一個定價條目）
///
/// 由外部型錄服務擁有，引擎只讀
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogVariant {
    /// 材料ID
    pub material_id: String,

    /// 產品名稱
    pub product_name: String,

    /// 材料名稱
    pub material_name: String,

    /// 品牌
    pub brand: String,

    /// 商店ID
    pub shop_id: String,

    /// 商店名稱
    pub shop_name: String,

    /// 單價
    pub rate: Decimal,

    /// 計價單位
    pub unit: Unit,
}

impl CatalogVariant {
    /// 創建新的型錄變體
    pub fn new(
        material_id: impl Into<String>,
        product_name: impl Into<String>,
        brand: impl Into<String>,
        shop_id: impl Into<String>,
        rate: Decimal,
        unit: Unit,
    ) -> Self {
        let product_name = product_name.into();
        Self {
            material_id: material_id.into(),
            material_name: product_name.clone(),
            product_name,
            brand: brand.into(),
            shop_id: shop_id.into(),
            shop_name: String::new(),
            rate,
            unit,
        }
    }

    /// 建構器模式：設置材料名稱
    pub fn with_material_name(mut self, name: impl Into<String>) -> Self {
        self.material_name = name.into();
        self
    }

    /// 建構器模式：設置商店名稱
    pub fn with_shop_name(mut self, name: impl Into<String>) -> Self {
        self.shop_name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_spec() {
        let spec = RequiredMaterialSpec::new(
            "Flush Door - BWR",
            MaterialCategory::DoorPanel,
            MaterialRole::Panel,
            Unit::Nos,
            Decimal::from(4200),
        )
        .with_quantity(Decimal::from(2))
        .with_install_rate(Decimal::from(350));

        assert_eq!(spec.required_quantity, Decimal::from(2));
        assert_eq!(spec.reference_rate, Decimal::from(4200));
        assert_eq!(spec.reference_install_rate, Decimal::from(350));
    }

    #[test]
    fn test_catalog_variant_builder() {
        let variant = CatalogVariant::new(
            "MAT-001",
            "Flush Door - BWR",
            "Greenply",
            "SHOP-01",
            Decimal::from(4150),
            Unit::Nos,
        )
        .with_shop_name("Sharma Timber Mart");

        assert_eq!(variant.material_name, "Flush Door - BWR");
        assert_eq!(variant.shop_name, "Sharma Timber Mart");
    }
}
