//! 配套引擎配置

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{KittingError, Result};

/// 配套引擎配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KittingConfig {
    /// 完成率取整方式
    pub percent_rounding: PercentRounding,

    /// 多張來源訂單時自製數量的分配方式
    pub blend_policy: BlendPolicy,

    /// 開啟草稿與刷新時的預設自製數量
    pub default_own_quantity: DefaultOwnQuantity,

    /// 開啟草稿時是否自動勾選草稿本身的訂單
    pub auto_select_draft_order: bool,
}

impl Default for KittingConfig {
    fn default() -> Self {
        Self {
            percent_rounding: PercentRounding::HalfUp,
            blend_policy: BlendPolicy::Fifo,
            default_own_quantity: DefaultOwnQuantity::Zero,
            auto_select_draft_order: false,
        }
    }
}

impl KittingConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 讀取配置，缺少的欄位使用預設值
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| KittingError::Config(e.to_string()))
    }

    /// 建構器模式：設置完成率取整方式
    pub fn with_percent_rounding(mut self, rounding: PercentRounding) -> Self {
        self.percent_rounding = rounding;
        self
    }

    /// 建構器模式：設置分配方式
    pub fn with_blend_policy(mut self, policy: BlendPolicy) -> Self {
        self.blend_policy = policy;
        self
    }

    /// 建構器模式：設置預設自製數量
    pub fn with_default_own_quantity(mut self, default: DefaultOwnQuantity) -> Self {
        self.default_own_quantity = default;
        self
    }

    /// 建構器模式：設置是否自動勾選草稿訂單
    pub fn with_auto_select_draft_order(mut self, auto_select: bool) -> Self {
        self.auto_select_draft_order = auto_select;
        self
    }
}

/// 完成率取整方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PercentRounding {
    /// 四捨五入（.5 進位）
    HalfUp,
    /// 無條件捨去
    Floor,
    /// 無條件進位
    Ceil,
}

impl PercentRounding {
    /// 計算完成率，結果限制在 [0, 100]
    pub fn percentage(self, completed: u32, ordered: u32) -> u8 {
        if ordered == 0 {
            return 0;
        }

        let ratio = Decimal::from(completed.min(ordered)) * Decimal::ONE_HUNDRED
            / Decimal::from(ordered);
        let rounded = match self {
            PercentRounding::HalfUp => {
                ratio.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            }
            PercentRounding::Floor => ratio.floor(),
            PercentRounding::Ceil => ratio.ceil(),
        };

        rounded.to_u8().unwrap_or(100).min(100)
    }
}

/// 多張來源訂單時自製數量的分配方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendPolicy {
    /// 先進先出：建立日期最早者優先，同日依訂單編號
    Fifo,
    /// 依勾選順序
    SelectionOrder,
}

/// 預設自製數量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefaultOwnQuantity {
    /// 0
    Zero,
    /// 等於待配套數量
    Required,
}

impl DefaultOwnQuantity {
    pub fn resolve(self, required: u32) -> u32 {
        match self {
            DefaultOwnQuantity::Zero => 0,
            DefaultOwnQuantity::Required => required,
        }
    }
}
