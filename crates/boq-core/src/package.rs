//! 工作包配置模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 工作包類型
///
/// 需求推導的決策表以此為鍵（策略表，而非條件鏈）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkPackageType {
    /// 夾板門（Flush Door）
    FlushDoor,
    /// WPC 門
    WpcDoor,
    /// 玻璃門
    GlassDoor,
    /// 實木門
    WoodenDoor,
    /// 框板門（Stile & Rail）
    StileDoor,
    /// 油漆工程
    Painting,
    /// 地坪工程
    Flooring,
}

impl std::fmt::Display for WorkPackageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            WorkPackageType::FlushDoor => "Flush Door",
            WorkPackageType::WpcDoor => "WPC Door",
            WorkPackageType::GlassDoor => "Glass Door",
            WorkPackageType::WoodenDoor => "Wooden Door",
            WorkPackageType::StileDoor => "Stile Door",
            WorkPackageType::Painting => "Painting",
            WorkPackageType::Flooring => "Flooring",
        };
        write!(f, "{}", label)
    }
}

/// 子選項
///
/// 子選項替換特定條目及其參考單價，不會新增平行分支
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubOption {
    /// 標準
    Standard,
    /// 帶視窗（Vision Panel）
    WithVisionPanel,
    /// 無框
    Frameless,
    /// 貼面板
    Laminated,
    /// 柚木
    Teak,
}

impl std::fmt::Display for SubOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SubOption::Standard => "Standard",
            SubOption::WithVisionPanel => "With Vision Panel",
            SubOption::Frameless => "Frameless",
            SubOption::Laminated => "Laminated",
            SubOption::Teak => "Teak",
        };
        write!(f, "{}", label)
    }
}

/// 玻璃類型（替換玻璃條目的參考單價）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlazingType {
    /// 清玻璃
    Clear,
    /// 磨砂玻璃
    Frosted,
    /// 強化玻璃
    Toughened,
}

/// 實體尺寸
///
/// 高度/寬度單位為英尺，玻璃尺寸僅在視窗/玻璃分支需要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// 數量（實體單元數，如門扇數）
    pub count: u32,

    /// 高度
    pub height: Decimal,

    /// 寬度
    pub width: Decimal,

    /// 玻璃高度
    pub glass_height: Option<Decimal>,

    /// 玻璃寬度
    pub glass_width: Option<Decimal>,
}

impl Dimensions {
    /// 創建新的尺寸
    pub fn new(count: u32, height: Decimal, width: Decimal) -> Self {
        Self {
            count,
            height,
            width,
            glass_height: None,
            glass_width: None,
        }
    }

    /// 建構器模式：設置玻璃尺寸
    pub fn with_glass(mut self, glass_height: Decimal, glass_width: Decimal) -> Self {
        self.glass_height = Some(glass_height);
        self.glass_width = Some(glass_width);
        self
    }

    /// 檢查玻璃尺寸是否齊全
    pub fn has_glass_size(&self) -> bool {
        self.glass_height.is_some() && self.glass_width.is_some()
    }
}

/// 工作包配置
///
/// 使用者完成一個單元的選擇後產生的不可變快照，
/// 由需求推導器一次性消費
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkPackageConfiguration {
    /// 工作包類型
    pub package_type: WorkPackageType,

    /// 子選項
    pub sub_option: Option<SubOption>,

    /// 玻璃類型
    pub glazing_type: Option<GlazingType>,

    /// 是否含門框
    pub has_frame: bool,

    /// 實體尺寸
    pub dimensions: Dimensions,
}

impl WorkPackageConfiguration {
    /// 創建新的工作包配置
    pub fn new(package_type: WorkPackageType, dimensions: Dimensions) -> Self {
        Self {
            package_type,
            sub_option: None,
            glazing_type: None,
            has_frame: true,
            dimensions,
        }
    }

    /// 建構器模式：設置子選項
    pub fn with_sub_option(mut self, sub_option: SubOption) -> Self {
        if sub_option == SubOption::Frameless {
            self.has_frame = false;
        }
        self.sub_option = Some(sub_option);
        self
    }

    /// 建構器模式：設置玻璃類型
    pub fn with_glazing_type(mut self, glazing_type: GlazingType) -> Self {
        self.glazing_type = Some(glazing_type);
        self
    }

    /// 建構器模式：設置是否含門框
    pub fn with_frame(mut self, has_frame: bool) -> Self {
        self.has_frame = has_frame;
        self
    }

    /// 檢查是否為視窗子選項
    pub fn has_vision_panel(&self) -> bool {
        self.sub_option == Some(SubOption::WithVisionPanel)
    }
}
