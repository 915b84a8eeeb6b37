//! 庫存帳本

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use kitting_core::{KittingError, Result, Shortage, StockItem};
use parking_lot::{Mutex, RwLock};

/// 庫存帳本
///
/// 每個物料各自持有一把鎖，同一物料上的 `reserve` 會被串行化。
/// 單次呼叫只改動一個物料；多物料的鎖定由 [`StockLedger::reserve_all`]
/// 依物料ID順序逐一執行，任一失敗即回滾已鎖定的部分。
#[derive(Default)]
pub struct StockLedger {
    items: RwLock<HashMap<String, Arc<Mutex<StockItem>>>>,
}

impl StockLedger {
    /// 創建空的庫存帳本
    pub fn new() -> Self {
        Self::default()
    }

    /// 登記物料（已存在則覆蓋）
    pub fn register(&self, item: StockItem) -> Result<()> {
        item.validate()?;
        tracing::debug!(
            "登記物料 {}：現有 {}, 已配套 {}",
            item.component_id,
            item.on_hand_qty,
            item.in_kits_qty
        );
        self.items
            .write()
            .insert(item.component_id.clone(), Arc::new(Mutex::new(item)));
        Ok(())
    }

    /// 是否有此物料
    pub fn contains(&self, component_id: &str) -> bool {
        self.items.read().contains_key(component_id)
    }

    /// 讀取物料庫存
    pub fn get(&self, component_id: &str) -> Result<StockItem> {
        Ok(self.entry(component_id)?.lock().clone())
    }

    /// 可用數量（現有 - 已保留）
    pub fn get_free(&self, component_id: &str) -> Result<u64> {
        Ok(self.entry(component_id)?.lock().free_qty())
    }

    /// 鎖定庫存，超過可用數量時回傳 `InsufficientStock`
    pub fn reserve(&self, component_id: &str, quantity: u64) -> Result<()> {
        let entry = self.entry(component_id)?;
        let mut item = entry.lock();
        item.reserve(quantity).map_err(|shortage| {
            tracing::debug!("鎖定失敗: {}", shortage);
            KittingError::InsufficientStock {
                shortages: vec![shortage],
            }
        })
    }

    /// 將鎖定轉為已配套
    pub fn commit(&self, component_id: &str, quantity: u64) -> Result<()> {
        self.entry(component_id)?.lock().commit(quantity)
    }

    /// 撤銷鎖定
    pub fn release(&self, component_id: &str, quantity: u64) -> Result<()> {
        self.entry(component_id)?.lock().release(quantity)
    }

    /// 入庫
    pub fn receive(&self, component_id: &str, quantity: u64) -> Result<()> {
        self.entry(component_id)?.lock().receive(quantity);
        tracing::debug!("物料 {} 入庫 {}", component_id, quantity);
        Ok(())
    }

    /// 已配套物料出庫
    pub fn issue(&self, component_id: &str, quantity: u64) -> Result<()> {
        self.entry(component_id)?.lock().issue(quantity)
    }

    /// 依物料ID順序鎖定多個物料，任一失敗即回滾
    ///
    /// 相同物料的請求會先合併。
    pub fn reserve_all(&self, requests: &[(String, u64)]) -> Result<()> {
        let merged = merge(requests);
        let mut reserved: Vec<(&str, u64)> = Vec::with_capacity(merged.len());

        for (component_id, quantity) in &merged {
            if let Err(err) = self.reserve(component_id, *quantity) {
                tracing::warn!(
                    "物料 {} 鎖定失敗，回滾 {} 筆已鎖定物料",
                    component_id,
                    reserved.len()
                );
                for (done_id, done_qty) in reserved.iter().rev() {
                    // 剛鎖定的數量不可能釋放失敗
                    if let Err(rollback_err) = self.release(done_id, *done_qty) {
                        tracing::error!("回滾物料 {} 失敗: {}", done_id, rollback_err);
                    }
                }
                return Err(err);
            }
            reserved.push((component_id.as_str(), *quantity));
        }

        Ok(())
    }

    /// 將多個物料的鎖定轉為已配套
    ///
    /// 某物料失敗時其餘物料照常處理，回傳第一個錯誤。
    pub fn commit_all(&self, requests: &[(String, u64)]) -> Result<()> {
        let mut first_err = None;
        for (component_id, quantity) in merge(requests) {
            if let Err(err) = self.commit(&component_id, quantity) {
                tracing::error!("物料 {} 鎖定轉為已配套失敗: {}", component_id, err);
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// 撤銷多個物料的鎖定
    pub fn release_all(&self, requests: &[(String, u64)]) -> Result<()> {
        for (component_id, quantity) in merge(requests) {
            self.release(&component_id, quantity)?;
        }
        Ok(())
    }

    /// 檢查多個物料目前是否足夠，回傳所有短缺（未知物料視為可用 0）
    pub fn shortages(&self, requests: &[(String, u64)]) -> Vec<Shortage> {
        merge(requests)
            .into_iter()
            .filter_map(|(component_id, quantity)| {
                let free = self.get_free(&component_id).unwrap_or(0);
                (quantity > free).then(|| Shortage::new(component_id, quantity, free))
            })
            .collect()
    }

    /// 所有物料（依ID排序）
    pub fn snapshot(&self) -> Vec<StockItem> {
        let mut items: Vec<StockItem> = self
            .items
            .read()
            .values()
            .map(|entry| entry.lock().clone())
            .collect();
        items.sort_by(|a, b| a.component_id.cmp(&b.component_id));
        items
    }

    fn entry(&self, component_id: &str) -> Result<Arc<Mutex<StockItem>>> {
        self.items
            .read()
            .get(component_id)
            .cloned()
            .ok_or_else(|| KittingError::UnknownComponent(component_id.to_string()))
    }
}

/// 合併相同物料並依ID排序
fn merge(requests: &[(String, u64)]) -> BTreeMap<String, u64> {
    let mut merged = BTreeMap::new();
    for (component_id, quantity) in requests {
        if *quantity > 0 {
            *merged.entry(component_id.clone()).or_insert(0) += *quantity;
        }
    }
    merged
}
