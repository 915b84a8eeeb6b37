//! 配套單狀態機
//!
//! `Draft → Validated → Committed`，`Draft → Draft` 為刷新。
//! 提交失敗時 `Validated → Draft`。`Committed` 為終態。

use kitting_core::{KittingError, Result};

use crate::draft::WaybillDraft;

/// 配套單狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaybillState {
    /// 可編輯
    Draft,
    /// 已按下「Скомплектовать」，等待提交結果
    Validated,
    /// 已提交
    Committed,
}

impl WaybillState {
    pub fn name(self) -> &'static str {
        match self {
            WaybillState::Draft => "Draft",
            WaybillState::Validated => "Validated",
            WaybillState::Committed => "Committed",
        }
    }
}

/// 帶狀態的配套單
#[derive(Debug, Clone)]
pub struct Waybill {
    draft: WaybillDraft,
    state: WaybillState,
}

impl Waybill {
    pub fn new(draft: WaybillDraft) -> Self {
        Self {
            draft,
            state: WaybillState::Draft,
        }
    }

    pub fn state(&self) -> WaybillState {
        self.state
    }

    pub fn draft(&self) -> &WaybillDraft {
        &self.draft
    }

    /// 取得可編輯的草稿，只有 `Draft` 狀態允許
    pub fn edit(&mut self) -> Result<&mut WaybillDraft> {
        self.expect(WaybillState::Draft, WaybillState::Draft)?;
        Ok(&mut self.draft)
    }

    /// 刷新：以重算後的草稿整體替換
    pub fn replace(&mut self, draft: WaybillDraft) -> Result<()> {
        self.expect(WaybillState::Draft, WaybillState::Draft)?;
        self.draft = draft;
        Ok(())
    }

    /// `Draft → Validated`
    pub fn mark_validated(&mut self) -> Result<()> {
        self.expect(WaybillState::Draft, WaybillState::Validated)?;
        self.state = WaybillState::Validated;
        Ok(())
    }

    /// `Validated → Committed`
    pub fn mark_committed(&mut self) -> Result<()> {
        self.expect(WaybillState::Validated, WaybillState::Committed)?;
        self.state = WaybillState::Committed;
        Ok(())
    }

    /// `Validated → Draft`（提交失敗）
    pub fn revert(&mut self) -> Result<()> {
        self.expect(WaybillState::Validated, WaybillState::Draft)?;
        self.state = WaybillState::Draft;
        Ok(())
    }

    fn expect(&self, from: WaybillState, to: WaybillState) -> Result<()> {
        if self.state != from {
            return Err(KittingError::InvalidTransition {
                from: self.state.name(),
                to: to.name(),
            });
        }
        Ok(())
    }
}
