//! # Kitting Calculation Engine
//!
//! 配套分配、配套單流程與完成率報告

pub mod allocation;
pub mod blending;
pub mod desk;
pub mod draft;
pub mod reporter;
pub mod workflow;

// Re-export 主要類型
pub use allocation::{AllocationEngine, CommitReceipt};
pub use desk::KittingDesk;
pub use draft::{DraftLine, SelectedSource, SourceShare, WaybillDraft};
pub use reporter::{CompletionReporter, OrderProgress};
pub use workflow::{Waybill, WaybillState};

/// 配套提示（不阻擋提交）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KittingWarning {
    pub component_id: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl KittingWarning {
    pub fn new(component_id: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            component_id,
            message,
            severity,
        }
    }

    pub fn info(component_id: String, message: String) -> Self {
        Self::new(component_id, message, WarningSeverity::Info)
    }

    pub fn warning(component_id: String, message: String) -> Self {
        Self::new(component_id, message, WarningSeverity::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Info,
    Warning,
}
