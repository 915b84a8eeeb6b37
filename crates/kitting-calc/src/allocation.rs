//! 配套分配引擎

use std::sync::Arc;

use chrono::Utc;
use kitting_core::{
    AllocatedComponent, AllocationRecord, KittingConfig, KittingError, ProductionOrder, Result,
    ValidationIssue,
};
use kitting_ledger::{OrderLedger, StockLedger};
use uuid::Uuid;

use crate::draft::{DraftLine, SelectedSource, WaybillDraft};
use crate::reporter::{CompletionReporter, OrderProgress};
use crate::WarningSeverity;

/// 提交結果
#[derive(Debug, Clone)]
pub struct CommitReceipt {
    /// 配套單ID
    pub waybill_id: Uuid,

    /// 本次完成的數量
    pub quantity: u32,

    /// 各來源訂單提交後的完成情況
    pub orders: Vec<OrderProgress>,
}

impl CommitReceipt {
    /// 某張訂單提交後的完成情況
    pub fn for_order(&self, order_id: Uuid) -> Option<&OrderProgress> {
        self.orders.iter().find(|p| p.order_id == order_id)
    }
}

/// 配套分配引擎
///
/// 根據訂單帳本與庫存帳本計算草稿的所有衍生欄位，並負責提交。
pub struct AllocationEngine {
    stock: Arc<StockLedger>,
    orders: Arc<OrderLedger>,
    config: KittingConfig,
    reporter: CompletionReporter,
}

impl AllocationEngine {
    pub fn new(stock: Arc<StockLedger>, orders: Arc<OrderLedger>, config: KittingConfig) -> Self {
        let reporter = CompletionReporter::new(config.percent_rounding);
        Self {
            stock,
            orders,
            config,
            reporter,
        }
    }

    pub fn config(&self) -> &KittingConfig {
        &self.config
    }

    pub fn reporter(&self) -> &CompletionReporter {
        &self.reporter
    }

    /// 開啟草稿
    pub fn open_draft(&self, order_id: Uuid) -> Result<WaybillDraft> {
        let order = self.orders.get(order_id)?;
        if !order.is_open() {
            return Err(KittingError::OrderClosed(order.order_number));
        }

        let mut selected = Vec::new();
        if self.config.auto_select_draft_order {
            selected.push(Self::selected_source(&order));
        }

        let draft = self.build(Uuid::new_v4(), &order, selected);
        tracing::info!(
            "開啟配套單 {}：訂單 {} 待配套 {}, 已配套 {}",
            draft.id,
            draft.order_number,
            draft.required,
            draft.collected
        );
        Ok(draft)
    }

    /// 依目前帳本狀態完整重算，捨棄未提交的自製數量
    ///
    /// 勾選的來源訂單保留，但已關閉的會被移除。
    pub fn actualize(&self, draft: &WaybillDraft) -> Result<WaybillDraft> {
        let order = self.orders.get(draft.order_id)?;

        let selected = draft
            .selected
            .iter()
            .filter_map(|s| self.orders.get(s.order_id).ok())
            .filter(ProductionOrder::is_open)
            .map(|o| Self::selected_source(&o))
            .collect();

        let refreshed = self.build(draft.id, &order, selected);
        tracing::debug!("配套單 {} 已刷新", refreshed.id);
        Ok(refreshed)
    }

    /// 設置自製數量，只重算需求與差額，不讀寫庫存
    pub fn set_own_quantity(&self, draft: &mut WaybillDraft, quantity: u32) -> Result<()> {
        if quantity > draft.required {
            return Err(KittingError::QuantityExceedsRequired {
                requested: quantity,
                required: draft.required,
            });
        }

        draft.own_quantity = quantity;
        draft.recompute();

        for warning in draft.warnings() {
            match warning.severity {
                WarningSeverity::Info => {
                    tracing::info!("配套單 {} 物料 {}: {}", draft.id, warning.component_id, warning.message)
                }
                WarningSeverity::Warning => {
                    tracing::warn!("配套單 {} 物料 {}: {}", draft.id, warning.component_id, warning.message)
                }
            }
        }
        Ok(())
    }

    /// 勾選來源訂單（同一組件、仍可配套）
    pub fn select_source_order(&self, draft: &mut WaybillDraft, order_id: Uuid) -> Result<()> {
        if draft.is_selected(order_id) {
            return Ok(());
        }

        let order = self.orders.get(order_id)?;
        if order.assembly_id != draft.assembly_id {
            return Err(KittingError::AssemblyMismatch {
                order_number: order.order_number,
                expected: draft.assembly_id.clone(),
                actual: order.assembly_id,
            });
        }
        if !order.is_open() {
            return Err(KittingError::OrderClosed(order.order_number));
        }
        // 各訂單按自己凍結的規格消耗物料，規格不同的訂單不能合併配套
        if !draft.matches_specification(&order.specification) {
            return Err(KittingError::SpecificationMismatch {
                order_number: order.order_number,
                assembly_id: order.assembly_id,
            });
        }

        draft.selected.push(Self::selected_source(&order));
        draft.recompute();
        Ok(())
    }

    /// 取消勾選
    pub fn deselect_source_order(&self, draft: &mut WaybillDraft, order_id: Uuid) {
        draft.selected.retain(|s| s.order_id != order_id);
        draft.recompute();
    }

    /// 提交前驗證
    ///
    /// 「未選擇訂單」與「自製數量為 0」同時檢查，全部一起回報。
    /// 差額為負不阻擋提交。
    pub fn validate(&self, draft: &WaybillDraft) -> Result<()> {
        let mut issues = Vec::new();
        if draft.selected.is_empty() {
            issues.push(ValidationIssue::NoOrderSelected);
        }
        if draft.own_quantity == 0 {
            issues.push(ValidationIssue::NothingToBuild);
        }
        if !issues.is_empty() {
            return Err(KittingError::Validation { issues });
        }

        if draft.own_quantity > draft.required {
            return Err(KittingError::QuantityExceedsRequired {
                requested: draft.own_quantity,
                required: draft.required,
            });
        }
        Ok(())
    }

    /// 提交配套單
    ///
    /// 1. 驗證草稿
    /// 2. 以最新訂單狀態重新分配自製數量
    /// 3. 重新檢查每個物料的可用數量，回報全部短缺
    /// 4. 依序鎖定物料，失敗即回滾
    /// 5. 增加訂單完成數量，失敗則釋放鎖定
    /// 6. 鎖定轉為已配套
    pub fn commit(&self, draft: &WaybillDraft) -> Result<CommitReceipt> {
        self.validate(draft)?;

        // 以最新狀態重建勾選，草稿開啟後訂單可能已被其他配套單消耗
        let mut current = draft.clone();
        current.selected = draft
            .selected
            .iter()
            .map(|s| {
                let order = self.orders.get(s.order_id)?;
                if !order.is_open() {
                    return Err(KittingError::OrderClosed(order.order_number));
                }
                if !draft.matches_specification(&order.specification) {
                    return Err(KittingError::SpecificationMismatch {
                        order_number: order.order_number,
                        assembly_id: order.assembly_id,
                    });
                }
                Ok(Self::selected_source(&order))
            })
            .collect::<Result<Vec<_>>>()?;
        current.recompute();

        if current.unallocated > 0 {
            return Err(KittingError::QuantityExceedsRequired {
                requested: current.own_quantity,
                required: current.selectable_capacity(),
            });
        }

        let requests = current.reservation_requests();
        let shortages = self.stock.shortages(&requests);
        if !shortages.is_empty() {
            for shortage in &shortages {
                tracing::warn!("配套單 {} 庫存不足: {}", draft.id, shortage);
            }
            return Err(KittingError::InsufficientStock { shortages });
        }

        self.stock.reserve_all(&requests)?;

        let committed_at = Utc::now();
        let shares = current
            .source_shares
            .iter()
            .map(|share| {
                let components = current
                    .lines
                    .iter()
                    .map(|l| {
                        AllocatedComponent::new(
                            l.component_id.clone(),
                            u64::from(share.quantity) * u64::from(l.qty_per_unit),
                        )
                    })
                    .collect();
                let record = AllocationRecord::new(draft.id, share.quantity, committed_at)
                    .with_components(components);
                (share.order_id, record)
            })
            .collect();

        let updated = match self.orders.apply_completions(shares) {
            Ok(updated) => updated,
            Err(err) => {
                tracing::warn!("配套單 {} 訂單更新失敗，釋放鎖定: {}", draft.id, err);
                if let Err(release_err) = self.stock.release_all(&requests) {
                    tracing::error!("配套單 {} 釋放鎖定失敗: {}", draft.id, release_err);
                }
                return Err(err);
            }
        };

        self.settle(draft.id, &requests);

        let receipt = CommitReceipt {
            waybill_id: draft.id,
            quantity: current.own_quantity,
            orders: updated.iter().map(|o| self.reporter.report(o)).collect(),
        };

        tracing::info!(
            "配套單 {} 已提交：數量 {}, 訂單 {} 張",
            receipt.waybill_id,
            receipt.quantity,
            receipt.orders.len()
        );
        Ok(receipt)
    }

    /// 鎖定轉為已配套
    ///
    /// 訂單完成數量此時已寫入，失敗的物料只記錄錯誤，提交仍視為成功。
    fn settle(&self, waybill_id: Uuid, requests: &[(String, u64)]) {
        if let Err(err) = self.stock.commit_all(requests) {
            tracing::error!("配套單 {} 鎖定轉為已配套時出錯: {}", waybill_id, err);
        }
    }

    /// 從訂單與庫存建立草稿
    fn build(&self, id: Uuid, order: &ProductionOrder, selected: Vec<SelectedSource>) -> WaybillDraft {
        let required = order.remaining_qty();

        let lines = order
            .specification
            .iter()
            .map(|line| match self.stock.get(&line.component_id) {
                Ok(item) => {
                    let free = item.free_qty();
                    DraftLine::new(line, Some(item.name), free)
                }
                Err(_) => {
                    tracing::debug!("物料 {} 無庫存記錄（Нет материала）", line.component_id);
                    DraftLine::new(line, None, 0)
                }
            })
            .collect();

        let mut draft = WaybillDraft {
            id,
            order_id: order.id,
            order_number: order.order_number.clone(),
            assembly_id: order.assembly_id.clone(),
            required,
            collected: order.completed_qty,
            own_quantity: self.config.default_own_quantity.resolve(required),
            selected,
            source_shares: Vec::new(),
            unallocated: 0,
            lines,
            total_need: 0,
            blend_policy: self.config.blend_policy,
        };
        draft.recompute();
        draft
    }

    fn selected_source(order: &ProductionOrder) -> SelectedSource {
        SelectedSource {
            order_id: order.id,
            order_number: order.order_number.clone(),
            created_on: order.created_on,
            remaining: order.remaining_qty(),
        }
    }
}
