//! 配套工作台：以草稿ID對外提供配套操作

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use kitting_core::{KittingConfig, KittingError, ProductionOrder, Result};
use kitting_ledger::{OrderLedger, SpecificationResolver, StockLedger};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::allocation::{AllocationEngine, CommitReceipt};
use crate::draft::WaybillDraft;
use crate::reporter::OrderProgress;
use crate::workflow::{Waybill, WaybillState};

/// 配套工作台
///
/// 草稿只保存在記憶體中；同一草稿的操作在鎖內進行，
/// 提交本身在鎖外執行，期間草稿處於 `Validated` 狀態。
pub struct KittingDesk {
    stock: Arc<StockLedger>,
    specifications: Arc<SpecificationResolver>,
    orders: Arc<OrderLedger>,
    engine: AllocationEngine,
    drafts: Mutex<HashMap<Uuid, Waybill>>,
}

impl KittingDesk {
    pub fn new(
        stock: Arc<StockLedger>,
        specifications: Arc<SpecificationResolver>,
        orders: Arc<OrderLedger>,
        config: KittingConfig,
    ) -> Self {
        let engine = AllocationEngine::new(Arc::clone(&stock), Arc::clone(&orders), config);
        Self {
            stock,
            specifications,
            orders,
            engine,
            drafts: Mutex::new(HashMap::new()),
        }
    }

    pub fn stock(&self) -> &StockLedger {
        &self.stock
    }

    pub fn specifications(&self) -> &SpecificationResolver {
        &self.specifications
    }

    pub fn orders(&self) -> &OrderLedger {
        &self.orders
    }

    /// 下單：解析組件規格並凍結到訂單上
    pub fn place_order(
        &self,
        assembly_id: &str,
        ordered_qty: u32,
        created_on: NaiveDate,
    ) -> Result<ProductionOrder> {
        let specification = self.specifications.resolve(assembly_id)?;
        self.orders
            .create_order(assembly_id, ordered_qty, created_on, specification)
    }

    /// 開啟草稿
    pub fn open_draft(&self, order_id: Uuid) -> Result<WaybillDraft> {
        let draft = self.engine.open_draft(order_id)?;
        self.drafts.lock().insert(draft.id, Waybill::new(draft.clone()));
        Ok(draft)
    }

    /// 讀取草稿
    pub fn draft(&self, draft_id: Uuid) -> Result<WaybillDraft> {
        let drafts = self.drafts.lock();
        let waybill = drafts.get(&draft_id).ok_or(KittingError::UnknownDraft(draft_id))?;
        Ok(waybill.draft().clone())
    }

    /// 草稿狀態
    pub fn state(&self, draft_id: Uuid) -> Result<WaybillState> {
        let drafts = self.drafts.lock();
        let waybill = drafts.get(&draft_id).ok_or(KittingError::UnknownDraft(draft_id))?;
        Ok(waybill.state())
    }

    /// 設置自製數量
    pub fn set_own_quantity(&self, draft_id: Uuid, quantity: u32) -> Result<WaybillDraft> {
        self.with_draft(draft_id, |engine, draft| engine.set_own_quantity(draft, quantity))
    }

    /// 勾選來源訂單
    pub fn select_source_order(&self, draft_id: Uuid, order_id: Uuid) -> Result<WaybillDraft> {
        self.with_draft(draft_id, |engine, draft| {
            engine.select_source_order(draft, order_id)
        })
    }

    /// 取消勾選來源訂單
    pub fn deselect_source_order(&self, draft_id: Uuid, order_id: Uuid) -> Result<WaybillDraft> {
        self.with_draft(draft_id, |engine, draft| {
            engine.deselect_source_order(draft, order_id);
            Ok(())
        })
    }

    /// 刷新（Актуализировать）
    pub fn actualize(&self, draft_id: Uuid) -> Result<WaybillDraft> {
        let mut drafts = self.drafts.lock();
        let waybill = drafts
            .get_mut(&draft_id)
            .ok_or(KittingError::UnknownDraft(draft_id))?;
        let refreshed = self.engine.actualize(waybill.draft())?;
        waybill.replace(refreshed.clone())?;
        Ok(refreshed)
    }

    /// 提交（Скомплектовать）
    pub fn commit(&self, draft_id: Uuid) -> Result<CommitReceipt> {
        let draft = {
            let mut drafts = self.drafts.lock();
            let waybill = drafts
                .get_mut(&draft_id)
                .ok_or(KittingError::UnknownDraft(draft_id))?;
            if waybill.state() != WaybillState::Draft {
                return Err(KittingError::InvalidTransition {
                    from: waybill.state().name(),
                    to: WaybillState::Validated.name(),
                });
            }
            self.engine.validate(waybill.draft())?;
            waybill.mark_validated()?;
            waybill.draft().clone()
        };

        let outcome = self.engine.commit(&draft);

        let mut drafts = self.drafts.lock();
        if let Some(waybill) = drafts.get_mut(&draft_id) {
            match &outcome {
                Ok(_) => waybill.mark_committed()?,
                Err(err) => {
                    tracing::debug!("配套單 {} 提交失敗，回到草稿: {}", draft_id, err);
                    waybill.revert()?;
                }
            }
        }
        outcome
    }

    /// 關閉草稿（未提交的內容直接丟棄）
    pub fn close_draft(&self, draft_id: Uuid) -> Result<()> {
        let mut drafts = self.drafts.lock();
        match drafts.get(&draft_id).map(Waybill::state) {
            None => Err(KittingError::UnknownDraft(draft_id)),
            Some(WaybillState::Validated) => Err(KittingError::InvalidTransition {
                from: WaybillState::Validated.name(),
                to: "Closed",
            }),
            Some(_) => {
                drafts.remove(&draft_id);
                Ok(())
            }
        }
    }

    /// 單張訂單的完成情況
    pub fn progress(&self, order_id: Uuid) -> Result<OrderProgress> {
        let order = self.orders.get(order_id)?;
        Ok(self.engine.reporter().report(&order))
    }

    /// 訂單列表的完成情況
    pub fn order_list(&self) -> Vec<OrderProgress> {
        self.engine.reporter().report_all(&self.orders.all_orders())
    }

    fn with_draft<F>(&self, draft_id: Uuid, f: F) -> Result<WaybillDraft>
    where
        F: FnOnce(&AllocationEngine, &mut WaybillDraft) -> Result<()>,
    {
        let mut drafts = self.drafts.lock();
        let waybill = drafts
            .get_mut(&draft_id)
            .ok_or(KittingError::UnknownDraft(draft_id))?;
        let draft = waybill.edit()?;
        f(&self.engine, &mut *draft)?;
        Ok(draft.clone())
    }
}
