//! 帳本快照（持久化狀態）

use kitting_core::{Assembly, KittingError, ProductionOrder, Result, StockItem};
use serde::{Deserialize, Serialize};

use crate::{OrderLedger, SpecificationResolver, StockLedger};

/// 持久化狀態：物料表、規格表、訂單表。草稿不落地。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub stock: Vec<StockItem>,
    pub assemblies: Vec<Assembly>,
    pub orders: Vec<ProductionOrder>,
}

impl LedgerSnapshot {
    /// 擷取目前帳本狀態
    pub fn capture(
        stock: &StockLedger,
        specifications: &SpecificationResolver,
        orders: &OrderLedger,
    ) -> Self {
        Self {
            stock: stock.snapshot(),
            assemblies: specifications.snapshot(),
            orders: orders.all_orders(),
        }
    }

    /// 還原為三個帳本
    ///
    /// 還原時丟棄提交中的暫時鎖定。
    pub fn restore(self) -> Result<(StockLedger, SpecificationResolver, OrderLedger)> {
        let stock = StockLedger::new();
        for mut item in self.stock {
            item.held_qty = 0;
            stock.register(item)?;
        }

        let specifications = SpecificationResolver::new();
        for assembly in self.assemblies {
            specifications.define_assembly(assembly)?;
        }

        let orders = OrderLedger::new();
        for order in self.orders {
            orders.insert(order)?;
        }

        tracing::info!("帳本快照已還原");
        Ok((stock, specifications, orders))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| KittingError::Serialization(e.to_string()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| KittingError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_snapshot_survives_json() {
        let stock = StockLedger::new();
        stock
            .register(StockItem::new("DET-1".to_string(), "Болт".to_string(), 9).with_in_kits_qty(2))
            .unwrap();
        stock.reserve("DET-1", 3).unwrap();

        let specifications = SpecificationResolver::new();
        specifications
            .define_assembly(
                Assembly::new("SB-1".to_string(), "Рама".to_string())
                    .with_line("DET-1".to_string(), 1),
            )
            .unwrap();

        let orders = OrderLedger::new();
        let order = orders
            .create_order(
                "SB-1",
                666,
                NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
                specifications.resolve("SB-1").unwrap(),
            )
            .unwrap();

        let raw = LedgerSnapshot::capture(&stock, &specifications, &orders)
            .to_json()
            .unwrap();
        let (stock, specifications, orders) =
            LedgerSnapshot::from_json(&raw).unwrap().restore().unwrap();

        let item = stock.get("DET-1").unwrap();
        assert_eq!(item.in_kits_qty, 2);
        assert_eq!(item.held_qty, 0);
        assert_eq!(specifications.resolve("SB-1").unwrap().len(), 1);

        let restored = orders.get(order.id).unwrap();
        assert_eq!(restored.order_number, order.order_number);
        assert_eq!(restored.specification.len(), 1);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            LedgerSnapshot::from_json("{"),
            Err(KittingError::Serialization(_))
        ));
    }
}
