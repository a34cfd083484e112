//! 需求推導：工作包配置 → 需求材料清單
//!
//! 每種工作包類型一張決策表，以策略表註冊（新增類型只需新增註冊，
//! 不需要擴張條件鏈）。推導是純函數：相同配置必得相同清單。

use std::collections::HashMap;

use boq_core::{
    BoqError, GlazingType, MaterialCategory, MaterialRole, RequiredMaterialSpec, Result, SubOption,
    Unit, WorkPackageConfiguration, WorkPackageType,
};
use rust_decimal::Decimal;

use crate::quantity::QuantityCalculator;
use crate::{EstimateNotice, NoticeSeverity};

/// 工作包推導規則
pub trait WorkPackageRules: Send + Sync {
    /// 此規則負責的工作包類型
    fn package_type(&self) -> WorkPackageType;

    /// 此配置是否走玻璃分支（決定五金組成）
    fn glazing_required(&self, config: &WorkPackageConfiguration) -> bool;

    /// 推導需求材料清單（有序）
    fn derive_requirements(
        &self,
        config: &WorkPackageConfiguration,
    ) -> Result<Vec<RequiredMaterialSpec>>;
}

/// 推導結果
///
/// 空清單代表「配置不完整」，不是「零成本」；
/// 診斷隨結果返回，不以異常中斷整個估算
#[derive(Debug)]
pub struct DeriveOutcome {
    /// 需求材料清單
    pub specs: Vec<RequiredMaterialSpec>,

    /// 診斷信息
    pub notices: Vec<EstimateNotice>,
}

impl DeriveOutcome {
    /// 檢查是否為不完整配置
    pub fn is_incomplete(&self) -> bool {
        self.specs.is_empty()
    }
}

/// 規則註冊表（決策表的策略表形式）
pub struct RuleSet {
    rules: HashMap<WorkPackageType, Box<dyn WorkPackageRules>>,
}

impl RuleSet {
    /// 創建空的註冊表
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// 創建標準註冊表（全部內建工作包類型）
    pub fn standard() -> Self {
        let mut set = Self::empty();
        set.register(Box::new(FlushDoorRules));
        set.register(Box::new(WpcDoorRules));
        set.register(Box::new(GlassDoorRules));
        set.register(Box::new(WoodenDoorRules));
        set.register(Box::new(StileDoorRules));
        set.register(Box::new(PaintingRules));
        set.register(Box::new(FlooringRules));
        set
    }

    /// 註冊一條規則（同類型後註冊者覆蓋）
    pub fn register(&mut self, rule: Box<dyn WorkPackageRules>) {
        self.rules.insert(rule.package_type(), rule);
    }

    /// 此配置是否走玻璃分支
    pub fn glazing_required(&self, config: &WorkPackageConfiguration) -> bool {
        self.rules
            .get(&config.package_type)
            .map(|rule| rule.glazing_required(config))
            .unwrap_or(false)
    }

    /// 推導需求材料清單
    ///
    /// 無對應規則或配置不完整 → 空清單 + 診斷
    pub fn derive(&self, config: &WorkPackageConfiguration) -> DeriveOutcome {
        let rule = match self.rules.get(&config.package_type) {
            Some(rule) => rule,
            None => {
                tracing::debug!("工作包類型 {} 無對應規則", config.package_type);
                return DeriveOutcome {
                    specs: Vec::new(),
                    notices: vec![EstimateNotice::new(
                        config.package_type.to_string(),
                        "此工作包類型尚無推導規則，配置視為不完整".to_string(),
                        NoticeSeverity::Warning,
                    )],
                };
            }
        };

        match rule.derive_requirements(config) {
            Ok(specs) => {
                tracing::debug!(
                    "推導完成：{} 共 {} 項需求材料",
                    config.package_type,
                    specs.len()
                );
                DeriveOutcome {
                    specs,
                    notices: Vec::new(),
                }
            }
            Err(BoqError::InvalidDimensions(message))
            | Err(BoqError::ConfigurationIncomplete(message)) => DeriveOutcome {
                specs: Vec::new(),
                notices: vec![EstimateNotice::new(
                    config.package_type.to_string(),
                    message,
                    NoticeSeverity::Warning,
                )],
            },
            Err(err) => DeriveOutcome {
                specs: Vec::new(),
                notices: vec![EstimateNotice::new(
                    config.package_type.to_string(),
                    err.to_string(),
                    NoticeSeverity::Error,
                )],
            },
        }
    }
}

// ---- 共用條目建構 ----

fn frame_entry(
    label: &str,
    rate: i64,
    config: &WorkPackageConfiguration,
) -> Result<RequiredMaterialSpec> {
    let quantity = QuantityCalculator::calculate(MaterialRole::Frame, &config.dimensions)?;
    Ok(RequiredMaterialSpec::new(
        label,
        MaterialCategory::Frame,
        MaterialRole::Frame,
        Unit::Rft,
        Decimal::from(rate),
    )
    .with_quantity(quantity)
    .with_install_rate(Decimal::from(60)))
}

fn panel_entry(
    label: &str,
    rate: i64,
    install_rate: i64,
    config: &WorkPackageConfiguration,
) -> Result<RequiredMaterialSpec> {
    let quantity = QuantityCalculator::calculate(MaterialRole::Panel, &config.dimensions)?;
    Ok(RequiredMaterialSpec::new(
        label,
        MaterialCategory::DoorPanel,
        MaterialRole::Panel,
        Unit::Nos,
        Decimal::from(rate),
    )
    .with_quantity(quantity)
    .with_install_rate(Decimal::from(install_rate)))
}

fn hinge_entry(config: &WorkPackageConfiguration) -> Result<RequiredMaterialSpec> {
    let quantity = QuantityCalculator::calculate(MaterialRole::Hinge, &config.dimensions)?;
    Ok(RequiredMaterialSpec::new(
        "SS Ball Bearing Hinges",
        MaterialCategory::Hardware,
        MaterialRole::Hinge,
        Unit::Nos,
        Decimal::from(120),
    )
    .with_quantity(quantity)
    .with_install_rate(Decimal::from(20)))
}

fn hardware_entry(
    label: &str,
    rate: i64,
    install_rate: i64,
    config: &WorkPackageConfiguration,
) -> Result<RequiredMaterialSpec> {
    let quantity = QuantityCalculator::calculate(MaterialRole::Hardware, &config.dimensions)?;
    Ok(RequiredMaterialSpec::new(
        label,
        MaterialCategory::Hardware,
        MaterialRole::Hardware,
        Unit::Nos,
        Decimal::from(rate),
    )
    .with_quantity(quantity)
    .with_install_rate(Decimal::from(install_rate)))
}

/// 標準木門五金：鉸鏈 + 插芯鎖 + 把手，門擋無條件附加
fn mortise_hardware(config: &WorkPackageConfiguration) -> Result<Vec<RequiredMaterialSpec>> {
    Ok(vec![
        hinge_entry(config)?,
        hardware_entry("Mortise Lock Body", 850, 80, config)?,
        hardware_entry("Mortise Handle Pair", 450, 50, config)?,
        hardware_entry("Door Stopper", 90, 30, config)?,
    ])
}

/// 玻璃參考單價（玻璃類型替換單價，不替換條目）
fn vision_glass_rate(glazing: Option<GlazingType>) -> i64 {
    match glazing {
        Some(GlazingType::Frosted) => 320,
        Some(GlazingType::Toughened) => 450,
        Some(GlazingType::Clear) | None => 280,
    }
}

fn vision_glass_entry(config: &WorkPackageConfiguration) -> Result<RequiredMaterialSpec> {
    if !config.dimensions.has_glass_size() {
        return Err(BoqError::ConfigurationIncomplete(
            "視窗子選項需要玻璃尺寸".to_string(),
        ));
    }
    let quantity = QuantityCalculator::calculate(MaterialRole::Glass, &config.dimensions)?;
    Ok(RequiredMaterialSpec::new(
        "Vision Panel Glass",
        MaterialCategory::Glass,
        MaterialRole::Glass,
        Unit::Sqft,
        Decimal::from(vision_glass_rate(config.glazing_type)),
    )
    .with_quantity(quantity)
    .with_install_rate(Decimal::from(40)))
}

fn area_entry(
    label: &str,
    category: MaterialCategory,
    rate: i64,
    install_rate: i64,
    config: &WorkPackageConfiguration,
) -> Result<RequiredMaterialSpec> {
    let quantity = QuantityCalculator::calculate(MaterialRole::Area, &config.dimensions)?;
    Ok(RequiredMaterialSpec::new(
        label,
        category,
        MaterialRole::Area,
        Unit::Sqft,
        Decimal::from(rate),
    )
    .with_quantity(quantity)
    .with_install_rate(Decimal::from(install_rate)))
}

// ---- 各工作包決策表 ----

/// 夾板門（Flush Door）
struct FlushDoorRules;

impl WorkPackageRules for FlushDoorRules {
    fn package_type(&self) -> WorkPackageType {
        WorkPackageType::FlushDoor
    }

    fn glazing_required(&self, _config: &WorkPackageConfiguration) -> bool {
        false
    }

    fn derive_requirements(
        &self,
        config: &WorkPackageConfiguration,
    ) -> Result<Vec<RequiredMaterialSpec>> {
        let mut specs = Vec::new();

        if config.has_frame {
            specs.push(frame_entry("Hardwood Door Frame", 220, config)?);
        }

        // 子選項替換門扇條目與參考單價
        match config.sub_option {
            Some(SubOption::WithVisionPanel) => {
                specs.push(panel_entry("Flush Door - BWR (With VP)", 4500, 350, config)?);
                specs.push(vision_glass_entry(config)?);
            }
            Some(SubOption::Laminated) => {
                specs.push(panel_entry("Flush Door - Laminated", 4800, 350, config)?);
            }
            _ => {
                specs.push(panel_entry("Flush Door - BWR", 4200, 350, config)?);
            }
        }

        specs.extend(mortise_hardware(config)?);
        Ok(specs)
    }
}

/// WPC 門
struct WpcDoorRules;

impl WorkPackageRules for WpcDoorRules {
    fn package_type(&self) -> WorkPackageType {
        WorkPackageType::WpcDoor
    }

    fn glazing_required(&self, _config: &WorkPackageConfiguration) -> bool {
        false
    }

    fn derive_requirements(
        &self,
        config: &WorkPackageConfiguration,
    ) -> Result<Vec<RequiredMaterialSpec>> {
        let mut specs = Vec::new();

        if config.has_frame {
            specs.push(frame_entry("WPC Door Frame", 260, config)?);
        }

        match config.sub_option {
            Some(SubOption::WithVisionPanel) => {
                specs.push(panel_entry("WPC Door Panel (With VP)", 5500, 350, config)?);
                specs.push(vision_glass_entry(config)?);
            }
            _ => {
                specs.push(panel_entry("WPC Solid Door Panel", 5200, 350, config)?);
            }
        }

        specs.extend(mortise_hardware(config)?);
        Ok(specs)
    }
}

/// 玻璃門（玻璃分支：鎖/把手用玻璃門專用件，無門擋）
struct GlassDoorRules;

impl WorkPackageRules for GlassDoorRules {
    fn package_type(&self) -> WorkPackageType {
        WorkPackageType::GlassDoor
    }

    fn glazing_required(&self, _config: &WorkPackageConfiguration) -> bool {
        true
    }

    fn derive_requirements(
        &self,
        config: &WorkPackageConfiguration,
    ) -> Result<Vec<RequiredMaterialSpec>> {
        let mut specs = Vec::new();

        if config.has_frame {
            specs.push(frame_entry("Glass Door Frame Profile", 310, config)?);
        }

        specs.push(panel_entry("Toughened Glass Door Leaf", 6800, 600, config)?);
        specs.push(hardware_entry("Glass Door Floor Spring", 2400, 150, config)?);
        specs.push(hardware_entry("Glass Door Patch Lock", 1600, 100, config)?);
        specs.push(hardware_entry("Glass Door H-Handle", 950, 60, config)?);

        Ok(specs)
    }
}

/// 實木門
struct WoodenDoorRules;

impl WorkPackageRules for WoodenDoorRules {
    fn package_type(&self) -> WorkPackageType {
        WorkPackageType::WoodenDoor
    }

    fn glazing_required(&self, _config: &WorkPackageConfiguration) -> bool {
        false
    }

    fn derive_requirements(
        &self,
        config: &WorkPackageConfiguration,
    ) -> Result<Vec<RequiredMaterialSpec>> {
        let mut specs = Vec::new();

        if config.has_frame {
            specs.push(frame_entry("Hardwood Door Frame", 220, config)?);
        }

        match config.sub_option {
            Some(SubOption::Teak) => {
                specs.push(panel_entry("Teak Wood Door Panel", 12500, 500, config)?);
            }
            _ => {
                specs.push(panel_entry("Solid Wooden Door Panel", 8500, 500, config)?);
            }
        }

        specs.extend(mortise_hardware(config)?);
        Ok(specs)
    }
}

/// 框板門（Stile & Rail）
struct StileDoorRules;

impl WorkPackageRules for StileDoorRules {
    fn package_type(&self) -> WorkPackageType {
        WorkPackageType::StileDoor
    }

    fn glazing_required(&self, _config: &WorkPackageConfiguration) -> bool {
        false
    }

    fn derive_requirements(
        &self,
        config: &WorkPackageConfiguration,
    ) -> Result<Vec<RequiredMaterialSpec>> {
        let mut specs = Vec::new();

        if config.has_frame {
            specs.push(frame_entry("Hardwood Door Frame", 220, config)?);
        }

        specs.push(panel_entry("Stile & Rail Door Panel", 7200, 450, config)?);
        specs.extend(mortise_hardware(config)?);
        Ok(specs)
    }
}

/// 油漆工程（面積計價）
struct PaintingRules;

impl WorkPackageRules for PaintingRules {
    fn package_type(&self) -> WorkPackageType {
        WorkPackageType::Painting
    }

    fn glazing_required(&self, _config: &WorkPackageConfiguration) -> bool {
        false
    }

    fn derive_requirements(
        &self,
        config: &WorkPackageConfiguration,
    ) -> Result<Vec<RequiredMaterialSpec>> {
        Ok(vec![
            area_entry("Wall Putty", MaterialCategory::Finish, 12, 8, config)?,
            area_entry("Acrylic Primer", MaterialCategory::Finish, 6, 5, config)?,
            area_entry("Emulsion Paint", MaterialCategory::Finish, 22, 12, config)?,
        ])
    }
}

/// 地坪工程（面積計價）
struct FlooringRules;

impl WorkPackageRules for FlooringRules {
    fn package_type(&self) -> WorkPackageType {
        WorkPackageType::Flooring
    }

    fn glazing_required(&self, _config: &WorkPackageConfiguration) -> bool {
        false
    }

    fn derive_requirements(
        &self,
        config: &WorkPackageConfiguration,
    ) -> Result<Vec<RequiredMaterialSpec>> {
        Ok(vec![
            area_entry("Vitrified Tile 600x600", MaterialCategory::Finish, 85, 35, config)?,
            area_entry("Tile Adhesive", MaterialCategory::Finish, 18, 6, config)?,
            area_entry("Epoxy Grout", MaterialCategory::Finish, 9, 4, config)?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boq_core::Dimensions;

    fn flush_vp_config() -> WorkPackageConfiguration {
        WorkPackageConfiguration::new(
            WorkPackageType::FlushDoor,
            Dimensions::new(2, Decimal::from(7), Decimal::from(3))
                .with_glass(Decimal::from(2), Decimal::from(1)),
        )
        .with_sub_option(SubOption::WithVisionPanel)
    }

    #[test]
    fn test_flush_door_with_vision_panel() {
        let outcome = RuleSet::standard().derive(&flush_vp_config());
        assert!(!outcome.is_incomplete());

        let panels: Vec<_> = outcome
            .specs
            .iter()
            .filter(|s| s.type_label == "Flush Door - BWR (With VP)")
            .collect();
        assert_eq!(panels.len(), 1);
        assert_eq!(panels[0].reference_rate, Decimal::from(4500));

        let glass: Vec<_> = outcome
            .specs
            .iter()
            .filter(|s| s.type_label == "Vision Panel Glass")
            .collect();
        assert_eq!(glass.len(), 1);
        assert_eq!(glass[0].reference_rate, Decimal::from(280));

        // 鉸鏈：高度 7、兩扇 → 6 只
        let hinges = outcome
            .specs
            .iter()
            .find(|s| s.role == MaterialRole::Hinge)
            .unwrap();
        assert_eq!(hinges.required_quantity, Decimal::from(6));

        // 門框：2 × ⌈2×7+3⌉ = 34
        let frame = outcome
            .specs
            .iter()
            .find(|s| s.role == MaterialRole::Frame)
            .unwrap();
        assert_eq!(frame.required_quantity, Decimal::from(34));
    }

    #[test]
    fn test_vision_panel_without_glass_size_is_incomplete() {
        let config = WorkPackageConfiguration::new(
            WorkPackageType::FlushDoor,
            Dimensions::new(1, Decimal::from(7), Decimal::from(3)),
        )
        .with_sub_option(SubOption::WithVisionPanel);

        let outcome = RuleSet::standard().derive(&config);
        assert!(outcome.is_incomplete());
        assert_eq!(outcome.notices.len(), 1);
    }

    #[test]
    fn test_unknown_type_yields_empty() {
        let config = WorkPackageConfiguration::new(
            WorkPackageType::Painting,
            Dimensions::new(1, Decimal::from(10), Decimal::from(12)),
        );

        // 空註冊表：無匹配分支 → 空結果，不是零成本
        let outcome = RuleSet::empty().derive(&config);
        assert!(outcome.is_incomplete());
        assert!(!outcome.notices.is_empty());
    }

    #[test]
    fn test_glazing_branch_swaps_hardware() {
        let config = WorkPackageConfiguration::new(
            WorkPackageType::GlassDoor,
            Dimensions::new(1, Decimal::from(8), Decimal::from(3)),
        );

        let rules = RuleSet::standard();
        assert!(rules.glazing_required(&config));

        let outcome = rules.derive(&config);
        let labels: Vec<&str> = outcome.specs.iter().map(|s| s.type_label.as_str()).collect();

        assert!(labels.contains(&"Glass Door Patch Lock"));
        assert!(labels.contains(&"Glass Door H-Handle"));
        assert!(!labels.contains(&"Door Stopper"));
        assert!(!labels.contains(&"Mortise Lock Body"));
    }

    #[test]
    fn test_stopper_appended_on_every_non_glazing_branch() {
        let rules = RuleSet::standard();
        for package_type in [
            WorkPackageType::FlushDoor,
            WorkPackageType::WpcDoor,
            WorkPackageType::WoodenDoor,
            WorkPackageType::StileDoor,
        ] {
            let config = WorkPackageConfiguration::new(
                package_type,
                Dimensions::new(1, Decimal::from(7), Decimal::from(3)),
            );
            let outcome = rules.derive(&config);
            assert!(
                outcome
                    .specs
                    .iter()
                    .any(|s| s.type_label == "Door Stopper"),
                "{} 缺少門擋",
                package_type
            );
        }
    }

    #[test]
    fn test_every_registered_type_derives_non_empty() {
        let rules = RuleSet::standard();
        for package_type in [
            WorkPackageType::FlushDoor,
            WorkPackageType::WpcDoor,
            WorkPackageType::GlassDoor,
            WorkPackageType::WoodenDoor,
            WorkPackageType::StileDoor,
            WorkPackageType::Painting,
            WorkPackageType::Flooring,
        ] {
            let config = WorkPackageConfiguration::new(
                package_type,
                Dimensions::new(2, Decimal::from(8), Decimal::from(4)),
            );
            let outcome = rules.derive(&config);
            assert!(!outcome.is_incomplete(), "{} 推導為空", package_type);

            // 每項離散材料的數量皆為 ≥1 的整數
            for spec in &outcome.specs {
                assert!(spec.required_quantity >= Decimal::ONE);
                assert_eq!(spec.required_quantity, spec.required_quantity.ceil());
            }
        }
    }

    #[test]
    fn test_frameless_omits_frame() {
        let config = WorkPackageConfiguration::new(
            WorkPackageType::GlassDoor,
            Dimensions::new(1, Decimal::from(8), Decimal::from(4)),
        )
        .with_sub_option(SubOption::Frameless);

        let outcome = RuleSet::standard().derive(&config);
        assert!(outcome
            .specs
            .iter()
            .all(|s| s.category != MaterialCategory::Frame));
    }

    #[test]
    fn test_glazing_type_swaps_glass_rate() {
        let base = flush_vp_config();
        let frosted = base.clone().with_glazing_type(GlazingType::Frosted);
        let toughened = base.clone().with_glazing_type(GlazingType::Toughened);

        let rules = RuleSet::standard();
        let rate_of = |config: &WorkPackageConfiguration| {
            rules
                .derive(config)
                .specs
                .iter()
                .find(|s| s.type_label == "Vision Panel Glass")
                .map(|s| s.reference_rate)
                .unwrap()
        };

        assert_eq!(rate_of(&base), Decimal::from(280));
        assert_eq!(rate_of(&frosted), Decimal::from(320));
        assert_eq!(rate_of(&toughened), Decimal::from(450));
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let config = flush_vp_config();
        let rules = RuleSet::standard();
        let a = rules.derive(&config).specs;
        let b = rules.derive(&config).specs;
        assert_eq!(a, b);
    }
}
