//! # Kitting Ledger
//!
//! 庫存、規格與訂單帳本

pub mod order;
pub mod snapshot;
pub mod specification;
pub mod stock;

// Re-export 主要類型
pub use order::OrderLedger;
pub use snapshot::LedgerSnapshot;
pub use specification::SpecificationResolver;
pub use stock::StockLedger;
