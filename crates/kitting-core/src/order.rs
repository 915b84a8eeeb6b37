//! 生產訂單模型

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AllocationRecord, KittingError, Result, SpecificationLine};

/// 訂單編號，格式 `YY-NNNN`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

impl OrderNumber {
    /// 依年份與流水號產生訂單編號
    pub fn new(year: i32, sequence: u32) -> Result<Self> {
        if sequence == 0 || sequence > 9999 {
            return Err(KittingError::InvalidOrderNumber(format!(
                "流水號超出範圍: {}",
                sequence
            )));
        }
        Ok(Self(format!("{:02}-{:04}", year.rem_euclid(100), sequence)))
    }

    /// 依建立日期產生訂單編號
    pub fn for_date(date: NaiveDate, sequence: u32) -> Result<Self> {
        Self::new(date.year(), sequence)
    }

    /// 解析並驗證 `YY-NNNN`
    pub fn parse(value: &str) -> Result<Self> {
        let bytes = value.as_bytes();
        let valid = bytes.len() == 7
            && bytes[2] == b'-'
            && bytes[..2].iter().all(u8::is_ascii_digit)
            && bytes[3..].iter().all(u8::is_ascii_digit);
        if !valid {
            return Err(KittingError::InvalidOrderNumber(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    /// 兩位年份
    pub fn year_suffix(&self) -> u32 {
        self.0[..2].parse().unwrap_or(0)
    }

    /// 流水號
    pub fn sequence(&self) -> u32 {
        self.0[3..].parse().unwrap_or(0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for OrderNumber {
    type Err = KittingError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = KittingError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<OrderNumber> for String {
    fn from(value: OrderNumber) -> Self {
        value.0
    }
}

/// 訂單狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// 已下單（Заказано）
    Ordered,
    /// 生產中（В производстве）
    InProduction,
    /// 部分配套（Частично собрано）
    PartiallyCollected,
    /// 已完成（Выполнено）
    Completed,
}

/// 生產訂單
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionOrder {
    /// 訂單ID
    pub id: Uuid,

    /// 訂單編號
    pub order_number: OrderNumber,

    /// 目標組件ID
    pub assembly_id: String,

    /// 訂購數量
    pub ordered_qty: u32,

    /// 已完成數量
    pub completed_qty: u32,

    /// 建立日期
    pub created_on: NaiveDate,

    /// 下單時凍結的規格
    pub specification: Vec<SpecificationLine>,

    /// 是否已投產
    pub launched: bool,

    /// 是否已歸檔
    pub archived: bool,

    /// 配套歷史
    pub history: Vec<AllocationRecord>,
}

impl ProductionOrder {
    /// 創建新的生產訂單
    pub fn new(
        order_number: OrderNumber,
        assembly_id: String,
        ordered_qty: u32,
        created_on: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_number,
            assembly_id,
            ordered_qty,
            completed_qty: 0,
            created_on,
            specification: Vec::new(),
            launched: false,
            archived: false,
            history: Vec::new(),
        }
    }

    /// 建構器模式：凍結規格
    pub fn with_specification(mut self, specification: Vec<SpecificationLine>) -> Self {
        self.specification = specification;
        self
    }

    /// 尚待配套數量
    pub fn remaining_qty(&self) -> u32 {
        self.ordered_qty.saturating_sub(self.completed_qty)
    }

    /// 是否仍可接受配套
    pub fn is_open(&self) -> bool {
        !self.archived && self.remaining_qty() > 0
    }

    /// 依完成數量推導狀態
    pub fn status(&self) -> OrderStatus {
        if self.completed_qty >= self.ordered_qty {
            OrderStatus::Completed
        } else if self.completed_qty > 0 {
            OrderStatus::PartiallyCollected
        } else if self.launched || !self.history.is_empty() {
            OrderStatus::InProduction
        } else {
            OrderStatus::Ordered
        }
    }

    /// 檢查是否可再完成 `quantity`
    pub fn check_completion(&self, quantity: u32) -> Result<()> {
        if self.archived {
            return Err(KittingError::OrderClosed(self.order_number.clone()));
        }
        if quantity > self.remaining_qty() {
            return Err(KittingError::OverCompletion {
                order_number: self.order_number.clone(),
                ordered: self.ordered_qty,
                completed: self.completed_qty,
                adding: quantity,
            });
        }
        Ok(())
    }

    /// 記錄一次配套並增加完成數量
    pub fn apply_completion(&mut self, record: AllocationRecord) -> Result<()> {
        self.check_completion(record.quantity)?;
        self.completed_qty += record.quantity;
        self.history.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    fn order(ordered: u32) -> ProductionOrder {
        ProductionOrder::new(
            OrderNumber::new(2025, 1).unwrap(),
            "SB-001".to_string(),
            ordered,
            NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
        )
    }

    #[test]
    fn test_order_number_format() {
        let number = OrderNumber::new(2025, 42).unwrap();
        assert_eq!(number.as_str(), "25-0042");
        assert_eq!(number.year_suffix(), 25);
        assert_eq!(number.sequence(), 42);

        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(OrderNumber::for_date(date, 7).unwrap().as_str(), "24-0007");
    }

    #[rstest]
    #[case("25-0001", true)]
    #[case("99-9999", true)]
    #[case("2025-001", false)]
    #[case("25-001", false)]
    #[case("25_0001", false)]
    #[case("AB-0001", false)]
    #[case("", false)]
    fn test_order_number_parse(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(OrderNumber::parse(raw).is_ok(), ok);
    }

    #[test]
    fn test_order_number_sequence_bounds() {
        assert!(OrderNumber::new(2025, 0).is_err());
        assert!(OrderNumber::new(2025, 10_000).is_err());
    }

    #[test]
    fn test_order_number_serde_validates() {
        let parsed: OrderNumber = serde_json::from_str("\"25-0003\"").unwrap();
        assert_eq!(parsed.sequence(), 3);
        assert!(serde_json::from_str::<OrderNumber>("\"bad\"").is_err());
    }

    #[test]
    fn test_status_derivation() {
        let mut order = order(2);
        assert_eq!(order.status(), OrderStatus::Ordered);

        order.launched = true;
        assert_eq!(order.status(), OrderStatus::InProduction);

        order
            .apply_completion(AllocationRecord::new(Uuid::new_v4(), 1, Utc::now()))
            .unwrap();
        assert_eq!(order.status(), OrderStatus::PartiallyCollected);

        order
            .apply_completion(AllocationRecord::new(Uuid::new_v4(), 1, Utc::now()))
            .unwrap();
        assert_eq!(order.status(), OrderStatus::Completed);
        assert!(!order.is_open());
    }

    #[test]
    fn test_over_completion_rejected() {
        let mut order = order(5);
        order
            .apply_completion(AllocationRecord::new(Uuid::new_v4(), 4, Utc::now()))
            .unwrap();

        let err = order
            .apply_completion(AllocationRecord::new(Uuid::new_v4(), 2, Utc::now()))
            .unwrap_err();
        assert!(matches!(err, KittingError::OverCompletion { completed: 4, adding: 2, .. }));
        assert_eq!(order.completed_qty, 4);
        assert_eq!(order.history.len(), 1);
    }

    #[test]
    fn test_archived_order_rejects_completion() {
        let mut order = order(5);
        order.archived = true;
        assert!(matches!(order.check_completion(1), Err(KittingError::OrderClosed(_))));
    }
}
