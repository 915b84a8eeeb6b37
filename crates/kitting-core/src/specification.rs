//! 組件規格（BOM）模型

use serde::{Deserialize, Serialize};

/// 規格行：一個組件單位消耗多少物料
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificationLine {
    /// 組件ID
    pub assembly_id: String,

    /// 物料ID
    pub component_id: String,

    /// 單位用量
    pub qty_per_unit: u32,
}

impl SpecificationLine {
    pub fn new(assembly_id: String, component_id: String, qty_per_unit: u32) -> Self {
        Self {
            assembly_id,
            component_id,
            qty_per_unit,
        }
    }

    /// 計算指定自製數量下的需求量
    pub fn need_for(&self, build_qty: u32) -> u64 {
        u64::from(build_qty) * u64::from(self.qty_per_unit)
    }
}

/// 組件（СБ / Изделие）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assembly {
    /// 組件ID
    pub id: String,

    /// 組件名稱
    pub name: String,

    /// 規格行
    pub lines: Vec<SpecificationLine>,
}

impl Assembly {
    /// 創建沒有規格行的組件
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            lines: Vec::new(),
        }
    }

    /// 建構器模式：添加規格行
    pub fn with_line(mut self, component_id: String, qty_per_unit: u32) -> Self {
        self.lines
            .push(SpecificationLine::new(self.id.clone(), component_id, qty_per_unit));
        self
    }

    /// 查找物料的規格行
    pub fn line_for(&self, component_id: &str) -> Option<&SpecificationLine> {
        self.lines.iter().find(|l| l.component_id == component_id)
    }
}
