//! # Kitting Core
//!
//! 配套（комплектация）核心資料模型與類型定義

pub mod config;
pub mod history;
pub mod order;
pub mod specification;
pub mod stock;

use std::fmt;

use uuid::Uuid;

// Re-export 主要類型
pub use config::{BlendPolicy, DefaultOwnQuantity, KittingConfig, PercentRounding};
pub use history::{AllocatedComponent, AllocationRecord};
pub use order::{OrderNumber, OrderStatus, ProductionOrder};
pub use specification::{Assembly, SpecificationLine};
pub use stock::{Shortage, StockItem};

/// 配套單提交前的驗證問題
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ValidationIssue {
    /// 未選擇任何來源訂單
    NoOrderSelected,
    /// 自製數量為 0
    NothingToBuild,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::NoOrderSelected => f.write_str("未選擇來源訂單"),
            ValidationIssue::NothingToBuild => f.write_str("自製數量為 0"),
        }
    }
}

/// 配套錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum KittingError {
    #[error("找不到物料: {0}")]
    UnknownComponent(String),

    #[error("找不到組件規格: {0}")]
    UnknownAssembly(String),

    #[error("找不到生產訂單: {0}")]
    UnknownOrder(Uuid),

    #[error("找不到配套單草稿: {0}")]
    UnknownDraft(Uuid),

    #[error("無效的訂單編號: {0}")]
    InvalidOrderNumber(String),

    #[error("無效的數量: {0}")]
    InvalidQuantity(String),

    #[error("庫存不足: {}", join(.shortages))]
    InsufficientStock { shortages: Vec<Shortage> },

    #[error("釋放數量超過保留數量：物料 {component_id}, 釋放 {requested}, 保留 {held}")]
    ReleaseExceedsHeld {
        component_id: String,
        requested: u64,
        held: u64,
    },

    #[error("配套單驗證失敗: {}", join(.issues))]
    Validation { issues: Vec<ValidationIssue> },

    #[error("自製數量 {requested} 超過待配套數量 {required}")]
    QuantityExceedsRequired { requested: u32, required: u32 },

    #[error("訂單 {order_number} 的組件 {actual} 與配套單組件 {expected} 不符")]
    AssemblyMismatch {
        order_number: OrderNumber,
        expected: String,
        actual: String,
    },

    #[error("訂單 {order_number} 凍結的規格與配套單的組件 {assembly_id} 規格不同")]
    SpecificationMismatch {
        order_number: OrderNumber,
        assembly_id: String,
    },

    #[error("訂單已關閉: {0}")]
    OrderClosed(OrderNumber),

    #[error("訂單 {order_number} 完成數量超限：已完成 {completed} + 本次 {adding} > 訂購 {ordered}")]
    OverCompletion {
        order_number: OrderNumber,
        ordered: u32,
        completed: u32,
        adding: u32,
    },

    #[error("無效的狀態轉換: {from} -> {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("配置錯誤: {0}")]
    Config(String),

    #[error("序列化錯誤: {0}")]
    Serialization(String),
}

impl KittingError {
    /// 是否為可由操作員修正後重試的驗證錯誤
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            KittingError::Validation { .. } | KittingError::QuantityExceedsRequired { .. }
        )
    }

    /// 是否為提交時的庫存衝突
    pub fn is_conflict(&self) -> bool {
        matches!(self, KittingError::InsufficientStock { .. })
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, KittingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_every_issue() {
        let err = KittingError::Validation {
            issues: vec![ValidationIssue::NoOrderSelected, ValidationIssue::NothingToBuild],
        };

        let message = err.to_string();
        assert!(message.contains("未選擇來源訂單"));
        assert!(message.contains("自製數量為 0"));
        assert!(err.is_validation());
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_insufficient_stock_names_component() {
        let err = KittingError::InsufficientStock {
            shortages: vec![Shortage::new("DET-001".to_string(), 2, 1)],
        };

        assert!(err.to_string().contains("DET-001"));
        assert!(err.is_conflict());
    }
}
