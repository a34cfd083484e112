//! 型錄解析：需求材料 → 定價變體（品牌 × 商店）

use std::collections::HashMap;

use boq_core::{CatalogVariant, MaterialCategory, RequiredMaterialSpec, WorkPackageType};

/// 各工作包的主材分類：鬆散關鍵字後備只對主材生效，
/// 五金/輔料嚴格匹配不到就是無匹配，避免落到門扇變體上
fn primary_category(package_type: WorkPackageType) -> MaterialCategory {
    match package_type {
        WorkPackageType::Painting | WorkPackageType::Flooring => MaterialCategory::Finish,
        _ => MaterialCategory::DoorPanel,
    }
}

/// 各工作包類型的後備關鍵字集
///
/// 嚴格匹配（規格名稱子串）找不到時才動用
#[derive(Debug, Clone)]
pub struct KeywordSets {
    keywords: HashMap<WorkPackageType, Vec<String>>,
}

impl KeywordSets {
    /// 內建後備關鍵字
    pub fn standard() -> Self {
        let mut keywords = HashMap::new();
        let mut put = |package_type: WorkPackageType, words: &[&str]| {
            keywords.insert(
                package_type,
                words.iter().map(|w| w.to_string()).collect(),
            );
        };

        // 各類型只收錄有區分力的詞：共通的 "door" 會讓
        // 任何門類型吞掉其他門類型的變體
        put(WorkPackageType::FlushDoor, &["flush", "bwr"]);
        put(WorkPackageType::WpcDoor, &["wpc"]);
        put(WorkPackageType::GlassDoor, &["glass", "toughened", "patch"]);
        put(WorkPackageType::WoodenDoor, &["wooden", "teak"]);
        put(WorkPackageType::StileDoor, &["stile", "rail"]);
        put(WorkPackageType::Painting, &["paint", "putty", "primer", "emulsion"]);
        put(WorkPackageType::Flooring, &["tile", "adhesive", "grout"]);

        Self { keywords }
    }

    /// 替換某類型的關鍵字集
    pub fn set(&mut self, package_type: WorkPackageType, words: Vec<String>) {
        self.keywords.insert(package_type, words);
    }

    /// 檢查文字是否命中某類型的關鍵字（大小寫不敏感）
    ///
    /// 型錄查詢的結構過濾也以此判定變體歸屬
    pub fn matches(&self, package_type: WorkPackageType, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.get(package_type).iter().any(|word| lower.contains(word))
    }

    fn get(&self, package_type: WorkPackageType) -> &[String] {
        self.keywords
            .get(&package_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Default for KeywordSets {
    fn default() -> Self {
        Self::standard()
    }
}

/// 一項需求材料的解析結果
///
/// `variants` 為空是合法終態（型錄無匹配），
/// 與「型錄服務不可用」（傳輸層 Err）嚴格區分
#[derive(Debug, Clone)]
pub struct ResolvedMaterial {
    /// 需求材料規格
    pub spec: RequiredMaterialSpec,

    /// 可選變體（品牌 × 商店）
    pub variants: Vec<CatalogVariant>,

    /// 當前選擇
    pub selected: Option<CatalogVariant>,
}

impl ResolvedMaterial {
    /// 切換品牌：重新選該品牌內最便宜的變體
    pub fn select_brand(&mut self, brand: &str) -> Option<&CatalogVariant> {
        self.selected = CatalogResolver::cheapest_in_brand(&self.variants, brand);
        self.selected.as_ref()
    }
}

/// 型錄解析器
pub struct CatalogResolver;

impl CatalogResolver {
    /// 查找一項需求材料的全部定價變體
    ///
    /// 第一道：規格名稱對產品/材料名稱的大小寫不敏感子串匹配；
    /// 全空時第二道：該工作包類型的後備關鍵字
    pub fn find_variants(
        spec: &RequiredMaterialSpec,
        package_type: WorkPackageType,
        catalog: &[CatalogVariant],
        keywords: &KeywordSets,
    ) -> Vec<CatalogVariant> {
        let label = spec.type_label.to_lowercase();

        let strict: Vec<CatalogVariant> = catalog
            .iter()
            .filter(|variant| {
                variant.product_name.to_lowercase().contains(&label)
                    || variant.material_name.to_lowercase().contains(&label)
            })
            .cloned()
            .collect();

        if !strict.is_empty() {
            return strict;
        }

        if spec.category != primary_category(package_type) {
            return Vec::new();
        }

        let fallback_words = keywords.get(package_type);
        catalog
            .iter()
            .filter(|variant| {
                let product = variant.product_name.to_lowercase();
                let material = variant.material_name.to_lowercase();
                fallback_words
                    .iter()
                    .any(|word| product.contains(word) || material.contains(word))
            })
            .cloned()
            .collect()
    }

    /// 預設選擇：字母序第一個品牌內最便宜的變體
    pub fn default_selection(variants: &[CatalogVariant]) -> Option<CatalogVariant> {
        let first_brand = variants
            .iter()
            .map(|v| v.brand.as_str())
            .min_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()))?;
        Self::cheapest_in_brand(variants, first_brand)
    }

    /// 品牌內最便宜的變體
    pub fn cheapest_in_brand(variants: &[CatalogVariant], brand: &str) -> Option<CatalogVariant> {
        variants
            .iter()
            .filter(|v| v.brand.eq_ignore_ascii_case(brand))
            .min_by(|a, b| a.rate.cmp(&b.rate))
            .cloned()
    }

    /// 解析一項需求材料並套用預設選擇
    pub fn resolve(
        spec: RequiredMaterialSpec,
        package_type: WorkPackageType,
        catalog: &[CatalogVariant],
        keywords: &KeywordSets,
    ) -> ResolvedMaterial {
        let variants = Self::find_variants(&spec, package_type, catalog, keywords);
        let selected = Self::default_selection(&variants);

        if selected.is_none() {
            tracing::debug!("材料 {} 在型錄中無匹配變體", spec.type_label);
        }

        ResolvedMaterial {
            spec,
            variants,
            selected,
        }
    }

    /// 「全選」：對每項需求材料獨立套用預設選擇規則
    pub fn resolve_all(
        specs: Vec<RequiredMaterialSpec>,
        package_type: WorkPackageType,
        catalog: &[CatalogVariant],
        keywords: &KeywordSets,
    ) -> Vec<ResolvedMaterial> {
        specs
            .into_iter()
            .map(|spec| Self::resolve(spec, package_type, catalog, keywords))
            .collect()
    }
}
