//! 庫存模型

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{KittingError, Result};

/// 物料（Деталь）庫存狀態
///
/// 已保留數量分為兩部分：
/// - `held_qty`：提交進行中暫時鎖定的數量
/// - `in_kits_qty`：已配入套件（в комплектах）的數量
///
/// 可用數量永遠是 `on_hand_qty - held_qty - in_kits_qty`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    /// 物料ID
    pub component_id: String,

    /// 物料名稱
    pub name: String,

    /// 現有庫存
    pub on_hand_qty: u64,

    /// 提交中暫時鎖定的數量
    #[serde(default)]
    pub held_qty: u64,

    /// 已配入套件的數量
    #[serde(default)]
    pub in_kits_qty: u64,
}

impl StockItem {
    /// 創建新的庫存記錄
    pub fn new(component_id: String, name: String, on_hand_qty: u64) -> Self {
        Self {
            component_id,
            name,
            on_hand_qty,
            held_qty: 0,
            in_kits_qty: 0,
        }
    }

    /// 建構器模式：設置已配入套件數量
    pub fn with_in_kits_qty(mut self, in_kits_qty: u64) -> Self {
        self.in_kits_qty = in_kits_qty;
        self
    }

    /// 已保留數量（鎖定 + 已配套）
    pub fn reserved_qty(&self) -> u64 {
        self.held_qty + self.in_kits_qty
    }

    /// 可用數量
    pub fn free_qty(&self) -> u64 {
        self.on_hand_qty.saturating_sub(self.reserved_qty())
    }

    /// 檢查 `0 <= reserved <= on_hand`
    pub fn validate(&self) -> Result<()> {
        if self.reserved_qty() > self.on_hand_qty {
            return Err(KittingError::InvalidQuantity(format!(
                "物料 {} 保留數量 {} 超過現有庫存 {}",
                self.component_id,
                self.reserved_qty(),
                self.on_hand_qty
            )));
        }
        Ok(())
    }

    /// 鎖定庫存
    pub fn reserve(&mut self, quantity: u64) -> std::result::Result<(), Shortage> {
        let free = self.free_qty();
        if quantity > free {
            return Err(Shortage::new(self.component_id.clone(), quantity, free));
        }
        self.held_qty += quantity;
        Ok(())
    }

    /// 將鎖定數量轉為已配套
    pub fn commit(&mut self, quantity: u64) -> Result<()> {
        self.take_held(quantity)?;
        self.in_kits_qty += quantity;
        Ok(())
    }

    /// 釋放鎖定數量
    pub fn release(&mut self, quantity: u64) -> Result<()> {
        self.take_held(quantity)
    }

    /// 入庫
    pub fn receive(&mut self, quantity: u64) {
        self.on_hand_qty += quantity;
    }

    /// 已配套物料出庫（現有與已配套同時扣減）
    pub fn issue(&mut self, quantity: u64) -> Result<()> {
        if quantity > self.in_kits_qty {
            return Err(KittingError::InvalidQuantity(format!(
                "物料 {} 出庫 {} 超過已配套數量 {}",
                self.component_id, quantity, self.in_kits_qty
            )));
        }
        self.in_kits_qty -= quantity;
        self.on_hand_qty -= quantity;
        Ok(())
    }

    fn take_held(&mut self, quantity: u64) -> Result<()> {
        if quantity > self.held_qty {
            return Err(KittingError::ReleaseExceedsHeld {
                component_id: self.component_id.clone(),
                requested: quantity,
                held: self.held_qty,
            });
        }
        self.held_qty -= quantity;
        Ok(())
    }
}

/// 單一物料的短缺
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortage {
    pub component_id: String,
    pub requested: u64,
    pub available: u64,
}

impl Shortage {
    pub fn new(component_id: String, requested: u64, available: u64) -> Self {
        Self {
            component_id,
            requested,
            available,
        }
    }

    /// 短缺數量
    pub fn missing(&self) -> u64 {
        self.requested.saturating_sub(self.available)
    }
}

impl fmt::Display for Shortage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "物料 {} 需要 {}, 可用 {}",
            self.component_id, self.requested, self.available
        )
    }
}
