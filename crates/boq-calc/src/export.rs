//! 匯出形狀
//!
//! 任何下游匯出器（PDF/CSV）消費的公開輸出：
//! 平坦有序的列清單 + 文件層合計。渲染本身不在本引擎範圍。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::grouping::GroupedLineItem;
use crate::totals::{CostSummary, TaxBasis};

/// 匯出列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRow {
    /// 序號
    pub sno: u32,

    /// 項目名稱
    pub item: String,

    /// 描述
    pub description: String,

    /// 單位
    pub unit: String,

    /// 數量
    pub qty: Decimal,

    /// 供應單價
    pub supply_rate: Decimal,

    /// 安裝單價
    pub install_rate: Decimal,

    /// 供應金額
    pub supply_amount: Decimal,

    /// 安裝金額
    pub install_amount: Decimal,
}

/// 匯出文件：列 + 文件層合計
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoqExport {
    /// 有序列清單
    pub rows: Vec<ExportRow>,

    /// 文件層合計
    pub totals: CostSummary,
}

/// 匯出建構器
pub struct ExportBuilder;

impl ExportBuilder {
    /// 由呈現群組建構匯出文件
    pub fn build(groups: &[GroupedLineItem], basis: TaxBasis) -> BoqExport {
        let rows: Vec<ExportRow> = groups
            .iter()
            .enumerate()
            .map(|(index, group)| {
                let mut description = group.description.clone();
                if let Some(location) = &group.location {
                    description.push_str(&format!(" @ {}", location));
                }
                ExportRow {
                    sno: index as u32 + 1,
                    item: group.key.to_string(),
                    description,
                    unit: group.unit.to_string(),
                    qty: group.quantity,
                    supply_rate: group.supply_rate,
                    install_rate: group.install_rate,
                    supply_amount: group.supply_amount,
                    install_amount: group.install_amount,
                }
            })
            .collect();

        let totals = CostSummary::compute(
            groups.iter().map(|g| (g.supply_amount, g.install_amount)),
            basis,
        );

        BoqExport { rows, totals }
    }
}
