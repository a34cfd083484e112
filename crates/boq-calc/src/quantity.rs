//! 數量計算

use boq_core::{BoqError, Dimensions, MaterialRole, Result};
use rust_decimal::Decimal;

/// 數量計算器
///
/// 所有輸出經過 `max(1, ceil(value))`：
/// 整件材料不可為分數，連續材料（延米/面積）向上取整避免短訂；
/// 會算出零的配置視為資料錯誤，不是靜默丟棄
pub struct QuantityCalculator;

impl QuantityCalculator {
    /// 鉸鏈分級：高度 ≤7 → 3 只；7<高度≤8 → 4 只；>8 → 5 只
    pub fn hinge_tier(height: Decimal) -> u32 {
        if height <= Decimal::from(7) {
            3
        } else if height <= Decimal::from(8) {
            4
        } else {
            5
        }
    }

    /// 門框延米公式（單元）：2×高 + 寬，向上取整
    pub fn frame_running_length(height: Decimal, width: Decimal) -> Decimal {
        (Decimal::TWO * height + width).ceil()
    }

    /// 依語義角色計算具體數量
    pub fn calculate(role: MaterialRole, dims: &Dimensions) -> Result<Decimal> {
        if dims.count == 0 {
            return Err(BoqError::InvalidDimensions(
                "單元數量為 0，無法計算材料需求".to_string(),
            ));
        }

        let count = Decimal::from(dims.count);

        let quantity = match role {
            MaterialRole::Frame => {
                Self::ensure_positive(dims.height, dims.width)?;
                Self::frame_running_length(dims.height, dims.width) * count
            }
            MaterialRole::Panel | MaterialRole::Hardware => count,
            MaterialRole::Hinge => {
                Self::ensure_positive(dims.height, dims.width)?;
                Decimal::from(Self::hinge_tier(dims.height)) * count
            }
            MaterialRole::Glass => {
                let (glass_height, glass_width) = match (dims.glass_height, dims.glass_width) {
                    (Some(h), Some(w)) => (h, w),
                    _ => {
                        return Err(BoqError::InvalidDimensions(
                            "玻璃尺寸缺失，無法計算玻璃面積".to_string(),
                        ))
                    }
                };
                Self::ensure_positive(glass_height, glass_width)?;
                (glass_height * glass_width).ceil() * count
            }
            MaterialRole::Area => {
                Self::ensure_positive(dims.height, dims.width)?;
                (dims.height * dims.width).ceil() * count
            }
        };

        // 零數量行不允許出現
        if quantity < Decimal::ONE {
            return Err(BoqError::InvalidDimensions(format!(
                "計算出的數量為 {}，配置有誤",
                quantity
            )));
        }

        Ok(quantity.ceil().max(Decimal::ONE))
    }

    fn ensure_positive(a: Decimal, b: Decimal) -> Result<()> {
        if a <= Decimal::ZERO || b <= Decimal::ZERO {
            return Err(BoqError::InvalidDimensions(format!(
                "尺寸必須為正數，得到 {} × {}",
                a, b
            )));
        }
        Ok(())
    }
}
