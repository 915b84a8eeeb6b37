//! 訂單帳本

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use kitting_core::{
    AllocationRecord, KittingError, OrderNumber, ProductionOrder, Result, SpecificationLine,
};
use parking_lot::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct OrderBook {
    orders: HashMap<Uuid, ProductionOrder>,
    /// 各年份後兩位（`YY`）已使用的最大流水號
    sequences: HashMap<u32, u32>,
}

/// 生產訂單帳本
///
/// 訂單不會被刪除，只會被歸檔。
#[derive(Default)]
pub struct OrderLedger {
    book: RwLock<OrderBook>,
}

impl OrderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建立訂單，自動分配 `YY-NNNN` 編號並凍結規格
    pub fn create_order(
        &self,
        assembly_id: &str,
        ordered_qty: u32,
        created_on: NaiveDate,
        specification: Vec<SpecificationLine>,
    ) -> Result<ProductionOrder> {
        if ordered_qty == 0 {
            return Err(KittingError::InvalidQuantity(
                "訂購數量必須大於 0".to_string(),
            ));
        }

        let mut book = self.book.write();
        let year = year_suffix(created_on);
        let sequence = book.sequences.get(&year).copied().unwrap_or(0) + 1;
        let order_number = OrderNumber::for_date(created_on, sequence)?;
        book.sequences.insert(year, sequence);

        let order = ProductionOrder::new(
            order_number,
            assembly_id.to_string(),
            ordered_qty,
            created_on,
        )
        .with_specification(specification);

        tracing::info!(
            "建立訂單 {}：組件 {} 數量 {}",
            order.order_number,
            order.assembly_id,
            order.ordered_qty
        );
        book.orders.insert(order.id, order.clone());
        Ok(order)
    }

    /// 匯入既有訂單（例如從快照還原）
    pub fn insert(&self, order: ProductionOrder) -> Result<()> {
        if order.ordered_qty == 0 || order.completed_qty > order.ordered_qty {
            return Err(KittingError::InvalidQuantity(format!(
                "訂單 {} 數量不一致：訂購 {}, 完成 {}",
                order.order_number, order.ordered_qty, order.completed_qty
            )));
        }

        let mut book = self.book.write();
        let sequence = book
            .sequences
            .entry(order.order_number.year_suffix())
            .or_insert(0);
        *sequence = (*sequence).max(order.order_number.sequence());
        book.orders.insert(order.id, order);
        Ok(())
    }

    /// 讀取訂單
    pub fn get(&self, order_id: Uuid) -> Result<ProductionOrder> {
        self.book
            .read()
            .orders
            .get(&order_id)
            .cloned()
            .ok_or(KittingError::UnknownOrder(order_id))
    }

    /// 依編號查找訂單
    pub fn find_by_number(&self, order_number: &OrderNumber) -> Option<ProductionOrder> {
        self.book
            .read()
            .orders
            .values()
            .find(|o| &o.order_number == order_number)
            .cloned()
    }

    /// 某組件仍可配套的訂單，依建立日期與編號排序
    pub fn open_orders_for_assembly(&self, assembly_id: &str) -> Vec<ProductionOrder> {
        let mut orders: Vec<ProductionOrder> = self
            .book
            .read()
            .orders
            .values()
            .filter(|o| o.assembly_id == assembly_id && o.is_open())
            .cloned()
            .collect();
        sort_fifo(&mut orders);
        orders
    }

    /// 所有訂單（含已歸檔），依建立日期與編號排序
    pub fn all_orders(&self) -> Vec<ProductionOrder> {
        let mut orders: Vec<ProductionOrder> = self.book.read().orders.values().cloned().collect();
        sort_fifo(&mut orders);
        orders
    }

    /// 投產
    pub fn launch(&self, order_id: Uuid) -> Result<()> {
        self.update(order_id, |order| {
            if order.archived {
                return Err(KittingError::OrderClosed(order.order_number.clone()));
            }
            order.launched = true;
            Ok(())
        })
    }

    /// 歸檔
    pub fn archive(&self, order_id: Uuid) -> Result<()> {
        self.update(order_id, |order| {
            order.archived = true;
            tracing::info!("訂單 {} 已歸檔", order.order_number);
            Ok(())
        })
    }

    /// 在同一把寫鎖下為多張訂單記錄完成數量
    ///
    /// 任一訂單驗證失敗則全部不生效。
    pub fn apply_completions(
        &self,
        shares: Vec<(Uuid, AllocationRecord)>,
    ) -> Result<Vec<ProductionOrder>> {
        let mut book = self.book.write();

        let mut pending: HashMap<Uuid, u32> = HashMap::new();
        for (order_id, record) in &shares {
            let order = book
                .orders
                .get(order_id)
                .ok_or(KittingError::UnknownOrder(*order_id))?;
            let total = pending.entry(*order_id).or_insert(0);
            *total += record.quantity;
            order.check_completion(*total)?;
        }

        let mut updated = Vec::with_capacity(shares.len());
        for (order_id, record) in shares {
            if let Some(order) = book.orders.get_mut(&order_id) {
                order.apply_completion(record)?;
                updated.push(order.clone());
            }
        }
        Ok(updated)
    }

    fn update<F>(&self, order_id: Uuid, f: F) -> Result<()>
    where
        F: FnOnce(&mut ProductionOrder) -> Result<()>,
    {
        let mut book = self.book.write();
        let order = book
            .orders
            .get_mut(&order_id)
            .ok_or(KittingError::UnknownOrder(order_id))?;
        f(order)
    }
}

fn year_suffix(date: NaiveDate) -> u32 {
    date.year().rem_euclid(100).unsigned_abs()
}

fn sort_fifo(orders: &mut [ProductionOrder]) {
    orders.sort_by(|a, b| {
        a.created_on
            .cmp(&b.created_on)
            .then_with(|| a.order_number.cmp(&b.order_number))
    });
}
