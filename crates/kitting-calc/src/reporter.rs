//! 完成率報告

use kitting_core::{OrderNumber, OrderStatus, PercentRounding, ProductionOrder};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 單張訂單的完成情況（列表畫面每次渲染時重算，不持久化）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderProgress {
    pub order_id: Uuid,
    pub order_number: OrderNumber,
    pub assembly_id: String,
    pub ordered: u32,
    pub completed: u32,
    pub percentage: u8,
    pub status: OrderStatus,
}

/// 完成率報告器
#[derive(Debug, Clone, Copy)]
pub struct CompletionReporter {
    rounding: PercentRounding,
}

impl CompletionReporter {
    pub fn new(rounding: PercentRounding) -> Self {
        Self { rounding }
    }

    /// round(completed / ordered × 100)，限制在 [0, 100]
    pub fn percentage(&self, order: &ProductionOrder) -> u8 {
        self.rounding
            .percentage(order.completed_qty, order.ordered_qty)
    }

    pub fn status(&self, order: &ProductionOrder) -> OrderStatus {
        order.status()
    }

    pub fn report(&self, order: &ProductionOrder) -> OrderProgress {
        OrderProgress {
            order_id: order.id,
            order_number: order.order_number.clone(),
            assembly_id: order.assembly_id.clone(),
            ordered: order.ordered_qty,
            completed: order.completed_qty,
            percentage: self.percentage(order),
            status: self.status(order),
        }
    }

    /// 批量報告，保持輸入順序
    pub fn report_all(&self, orders: &[ProductionOrder]) -> Vec<OrderProgress> {
        orders.par_iter().map(|order| self.report(order)).collect()
    }
}

impl Default for CompletionReporter {
    fn default() -> Self {
        Self::new(PercentRounding::HalfUp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn order(ordered: u32, completed: u32) -> ProductionOrder {
        let mut order = ProductionOrder::new(
            OrderNumber::new(2025, 1).unwrap(),
            "SB-1".to_string(),
            ordered,
            NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
        );
        order.completed_qty = completed;
        order
    }

    #[rstest]
    #[case(666, 0, 0, OrderStatus::Ordered)]
    #[case(666, 1, 0, OrderStatus::PartiallyCollected)]
    #[case(2, 1, 50, OrderStatus::PartiallyCollected)]
    #[case(5, 5, 100, OrderStatus::Completed)]
    fn test_report(
        #[case] ordered: u32,
        #[case] completed: u32,
        #[case] percentage: u8,
        #[case] status: OrderStatus,
    ) {
        let progress = CompletionReporter::default().report(&order(ordered, completed));

        assert_eq!(progress.percentage, percentage);
        assert_eq!(progress.status, status);
        assert_eq!(progress.ordered, ordered);
        assert_eq!(progress.completed, completed);
    }

    #[test]
    fn test_launched_order_is_in_production() {
        let mut o = order(3, 0);
        o.launched = true;
        assert_eq!(CompletionReporter::default().status(&o), OrderStatus::InProduction);
    }

    #[test]
    fn test_report_all_keeps_order() {
        let orders: Vec<_> = (1..=50).map(|n| order(50, n)).collect();

        let progress = CompletionReporter::new(PercentRounding::Floor).report_all(&orders);

        assert_eq!(progress.len(), 50);
        assert_eq!(progress[0].percentage, 2);
        assert_eq!(progress[49].percentage, 100);
        assert!(progress.windows(2).all(|w| w[0].completed < w[1].completed));
    }
}
