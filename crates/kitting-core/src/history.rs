//! 配套歷史記錄

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 一次配套單提交在某張訂單上的記錄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRecord {
    /// 配套單ID
    pub waybill_id: Uuid,

    /// 本次計入該訂單的完成數量
    pub quantity: u32,

    /// 提交時間
    pub committed_at: DateTime<Utc>,

    /// 配入套件的物料
    pub components: Vec<AllocatedComponent>,
}

impl AllocationRecord {
    pub fn new(waybill_id: Uuid, quantity: u32, committed_at: DateTime<Utc>) -> Self {
        Self {
            waybill_id,
            quantity,
            committed_at,
            components: Vec::new(),
        }
    }

    /// 建構器模式：設置配入物料
    pub fn with_components(mut self, components: Vec<AllocatedComponent>) -> Self {
        self.components = components;
        self
    }

    /// 配入物料總數
    pub fn total_components(&self) -> u64 {
        self.components.iter().map(|c| c.quantity).sum()
    }
}

/// 配入套件的單一物料
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatedComponent {
    pub component_id: String,
    pub quantity: u64,
}

impl AllocatedComponent {
    pub fn new(component_id: String, quantity: u64) -> Self {
        Self {
            component_id,
            quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_record_totals() {
        let record = AllocationRecord::new(Uuid::new_v4(), 2, Utc::now()).with_components(vec![
            AllocatedComponent::new("DET-1".to_string(), 4),
            AllocatedComponent::new("DET-2".to_string(), 2),
        ]);

        assert_eq!(record.quantity, 2);
        assert_eq!(record.total_components(), 6);
    }
}
