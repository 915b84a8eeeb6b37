//! 配套單草稿（Накладная на комплектацию）

use chrono::NaiveDate;
use kitting_core::{BlendPolicy, OrderNumber, SpecificationLine};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blending::BlendCalculator;
use crate::KittingWarning;

/// 草稿上的一行物料
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftLine {
    /// 物料ID
    pub component_id: String,

    /// 物料名稱；庫存中沒有此物料時為 `None`（「Нет материала」）
    pub material: Option<String>,

    /// 單位用量
    pub qty_per_unit: u32,

    /// 需求量 = 自製數量 × 單位用量
    pub need: u64,

    /// 開啟/刷新時的可用數量
    pub free: u64,

    /// 可用 - 需求（負數表示短缺，僅作提示）
    pub deficit: i64,
}

impl DraftLine {
    pub fn new(line: &SpecificationLine, material: Option<String>, free: u64) -> Self {
        Self {
            component_id: line.component_id.clone(),
            material,
            qty_per_unit: line.qty_per_unit,
            need: 0,
            free,
            deficit: deficit(free, 0),
        }
    }

    /// 依自製數量重算需求與差額
    pub fn recompute(&mut self, own_quantity: u32) {
        self.need = u64::from(own_quantity) * u64::from(self.qty_per_unit);
        self.deficit = deficit(self.free, self.need);
    }

    pub fn has_material(&self) -> bool {
        self.material.is_some()
    }

    pub fn has_deficit(&self) -> bool {
        self.deficit < 0
    }
}

fn deficit(free: u64, need: u64) -> i64 {
    let free = i64::try_from(free).unwrap_or(i64::MAX);
    let need = i64::try_from(need).unwrap_or(i64::MAX);
    free.saturating_sub(need)
}

/// 已勾選的來源訂單（勾選/刷新時的快照）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedSource {
    pub order_id: Uuid,
    pub order_number: OrderNumber,
    pub created_on: NaiveDate,
    pub remaining: u32,
}

/// 自製數量在某張來源訂單上的分配
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceShare {
    pub order_id: Uuid,
    pub order_number: OrderNumber,
    pub quantity: u32,
    /// 此分配消耗的物料總量
    pub need: u64,
}

/// 配套單草稿
///
/// 草稿只存在於記憶體中，由訂單與庫存帳本在開啟與刷新時重建。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaybillDraft {
    /// 草稿ID
    pub id: Uuid,

    /// 草稿所屬訂單
    pub order_id: Uuid,

    pub order_number: OrderNumber,

    pub assembly_id: String,

    /// 待配套數量（開啟時的 訂購 - 已完成）
    pub required: u32,

    /// 已配套數量（開啟時的已完成）
    pub collected: u32,

    /// 自製數量
    pub own_quantity: u32,

    /// 已勾選的來源訂單
    pub selected: Vec<SelectedSource>,

    /// 自製數量的分配結果
    pub source_shares: Vec<SourceShare>,

    /// 未能分配到任何來源訂單的數量
    pub unallocated: u32,

    /// 物料行
    pub lines: Vec<DraftLine>,

    /// 「Всего」：各來源訂單需求合計
    pub total_need: u64,

    /// 分配方式
    pub blend_policy: BlendPolicy,
}

impl WaybillDraft {
    /// 依目前的自製數量、勾選與快照重算所有衍生欄位
    pub fn recompute(&mut self) {
        for line in &mut self.lines {
            line.recompute(self.own_quantity);
        }

        let per_unit: u64 = self.lines.iter().map(|l| u64::from(l.qty_per_unit)).sum();
        let blend = BlendCalculator::split(self.own_quantity, &self.selected, self.blend_policy);

        self.source_shares = blend
            .allocations
            .into_iter()
            .map(|(source, quantity)| SourceShare {
                order_id: source.order_id,
                order_number: source.order_number.clone(),
                quantity,
                need: u64::from(quantity) * per_unit,
            })
            .collect();
        self.unallocated = blend.unallocated;
        self.total_need = self.source_shares.iter().map(|s| s.need).sum();
    }

    /// 是否已勾選某訂單
    pub fn is_selected(&self, order_id: Uuid) -> bool {
        self.selected.iter().any(|s| s.order_id == order_id)
    }

    /// 來源訂單凍結的規格是否與草稿物料行一致（不計順序）
    pub fn matches_specification(&self, specification: &[SpecificationLine]) -> bool {
        let mut ours: Vec<(&str, u32)> = self
            .lines
            .iter()
            .map(|l| (l.component_id.as_str(), l.qty_per_unit))
            .collect();
        let mut theirs: Vec<(&str, u32)> = specification
            .iter()
            .map(|l| (l.component_id.as_str(), l.qty_per_unit))
            .collect();
        ours.sort_unstable();
        theirs.sort_unstable();
        ours == theirs
    }

    /// 勾選訂單合計可配套數量
    pub fn selectable_capacity(&self) -> u32 {
        self.selected.iter().map(|s| s.remaining).sum()
    }

    /// 所有差額為負的行產生提示
    pub fn deficit_warnings(&self) -> Vec<KittingWarning> {
        self.lines
            .iter()
            .filter(|l| l.has_deficit())
            .map(|l| {
                KittingWarning::warning(
                    l.component_id.clone(),
                    format!("需要 {}, 可用 {}, 差額 {}", l.need, l.free, l.deficit),
                )
            })
            .collect()
    }

    /// 全部提示：缺少物料的行（Нет материала）加上差額為負的行
    pub fn warnings(&self) -> Vec<KittingWarning> {
        let mut warnings: Vec<KittingWarning> = self
            .lines
            .iter()
            .filter(|l| !l.has_material())
            .map(|l| KittingWarning::info(l.component_id.clone(), "無庫存記錄".to_string()))
            .collect();
        warnings.extend(self.deficit_warnings());
        warnings
    }

    /// 需要鎖定的物料（需求量大於 0 的行）
    pub fn reservation_requests(&self) -> Vec<(String, u64)> {
        self.lines
            .iter()
            .filter(|l| l.need > 0)
            .map(|l| (l.component_id.clone(), l.need))
            .collect()
    }
}
