//! # Kitting
//!
//! 組件配套（комплектация сборок）與庫存分配引擎
//!
//! - [`kitting_core`]：資料模型、配置與錯誤類型
//! - [`kitting_ledger`]：庫存、規格與訂單帳本
//! - [`kitting_calc`]：分配引擎、配套單流程與完成率報告

pub mod logging;

pub use kitting_calc::{
    AllocationEngine, CommitReceipt, CompletionReporter, DraftLine, KittingDesk, KittingWarning,
    OrderProgress, SourceShare, Waybill, WaybillDraft, WaybillState, WarningSeverity,
};
pub use kitting_core::{
    Assembly, BlendPolicy, DefaultOwnQuantity, KittingConfig, KittingError, OrderNumber,
    OrderStatus, PercentRounding, ProductionOrder, Result, Shortage, SpecificationLine,
    StockItem, ValidationIssue,
};
pub use kitting_ledger::{LedgerSnapshot, OrderLedger, SpecificationResolver, StockLedger};
