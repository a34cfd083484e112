//! 成本合計引擎
//!
//! 行、群組、整份文件共用同一套公式，不允許三套分歧實現。
//! 稅為兩個 9% 分項（SGST/CGST，合計 18%），各自獨立計算、分開呈現；
//! 尾差調整是帶符號修正值，使總計落在整數上而上方分項保持精確。

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// 課稅基礎
///
/// 來源系統在不同呈現視圖間不一致；本引擎統一由呼叫方選定一種，
/// 文件層預設為供應+安裝合併課稅
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxBasis {
    /// 供應 + 安裝合併課稅
    SupplyAndInstall,
    /// 僅供應課稅，安裝列為獨立的未稅小計
    SupplyOnly,
}

impl Default for TaxBasis {
    fn default() -> Self {
        TaxBasis::SupplyAndInstall
    }
}

/// 單一稅項費率：9%
pub fn tax_component_rate() -> Decimal {
    Decimal::new(9, 2)
}

/// 成本匯總
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    /// 供應小計
    pub supply_subtotal: Decimal,

    /// 安裝小計
    pub install_subtotal: Decimal,

    /// 課稅小計（依課稅基礎）
    pub taxed_subtotal: Decimal,

    /// 未稅安裝小計（僅 SupplyOnly 基礎下非零）
    pub untaxed_install: Decimal,

    /// SGST（9%）
    pub sgst: Decimal,

    /// CGST（9%）
    pub cgst: Decimal,

    /// 尾差調整（帶符號）
    pub round_off: Decimal,

    /// 總計
    pub grand_total: Decimal,
}

impl CostSummary {
    /// 由 (供應金額, 安裝金額) 序列計算匯總
    ///
    /// 同一函數服務單行、單群組與整份文件
    pub fn compute(
        amounts: impl IntoIterator<Item = (Decimal, Decimal)>,
        basis: TaxBasis,
    ) -> Self {
        let mut supply_subtotal = Decimal::ZERO;
        let mut install_subtotal = Decimal::ZERO;
        for (supply, install) in amounts {
            supply_subtotal += supply;
            install_subtotal += install;
        }

        let (taxed_subtotal, untaxed_install) = match basis {
            TaxBasis::SupplyAndInstall => (supply_subtotal + install_subtotal, Decimal::ZERO),
            TaxBasis::SupplyOnly => (supply_subtotal, install_subtotal),
        };

        // 兩個稅項各自獨立計算
        let sgst = taxed_subtotal * tax_component_rate();
        let cgst = taxed_subtotal * tax_component_rate();

        let precise_total = taxed_subtotal + sgst + cgst + untaxed_install;
        let rounded =
            precise_total.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let round_off = rounded - precise_total;

        Self {
            supply_subtotal,
            install_subtotal,
            taxed_subtotal,
            untaxed_install,
            sgst,
            cgst,
            round_off,
            grand_total: precise_total + round_off,
        }
    }

    /// 文件小計（未稅，含安裝）
    pub fn subtotal(&self) -> Decimal {
        self.supply_subtotal + self.install_subtotal
    }
}
