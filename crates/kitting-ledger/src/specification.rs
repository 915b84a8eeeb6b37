//! 規格解析

use std::collections::{HashMap, HashSet};

use kitting_core::{Assembly, KittingError, Result, SpecificationLine};
use parking_lot::RwLock;

/// 規格解析器：組件 → (物料, 單位用量)
#[derive(Default)]
pub struct SpecificationResolver {
    assemblies: RwLock<HashMap<String, Assembly>>,
}

impl SpecificationResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 定義組件規格（已存在則覆蓋；已下單的訂單保留自己凍結的規格）
    pub fn define_assembly(&self, assembly: Assembly) -> Result<()> {
        let mut seen = HashSet::new();
        for line in &assembly.lines {
            Self::check_line(line)?;
            if line.assembly_id != assembly.id {
                return Err(KittingError::Config(format!(
                    "規格行屬於 {}，不屬於 {}",
                    line.assembly_id, assembly.id
                )));
            }
            if !seen.insert(line.component_id.as_str()) {
                return Err(KittingError::Config(format!(
                    "組件 {} 重複定義物料 {}",
                    assembly.id, line.component_id
                )));
            }
        }

        tracing::debug!("定義組件 {}：{} 行規格", assembly.id, assembly.lines.len());
        self.assemblies
            .write()
            .insert(assembly.id.clone(), assembly);
        Ok(())
    }

    /// 為已定義的組件添加規格行
    pub fn add_line(&self, assembly_id: &str, component_id: &str, qty_per_unit: u32) -> Result<()> {
        let line = SpecificationLine::new(
            assembly_id.to_string(),
            component_id.to_string(),
            qty_per_unit,
        );
        Self::check_line(&line)?;

        let mut assemblies = self.assemblies.write();
        let assembly = assemblies
            .get_mut(assembly_id)
            .ok_or_else(|| KittingError::UnknownAssembly(assembly_id.to_string()))?;
        if assembly.line_for(component_id).is_some() {
            return Err(KittingError::Config(format!(
                "組件 {} 重複定義物料 {}",
                assembly_id, component_id
            )));
        }
        assembly.lines.push(line);
        Ok(())
    }

    /// 解析組件規格
    ///
    /// 未定義的組件回傳 `UnknownAssembly`；已定義但沒有規格行的組件回傳空列表。
    pub fn resolve(&self, assembly_id: &str) -> Result<Vec<SpecificationLine>> {
        self.assemblies
            .read()
            .get(assembly_id)
            .map(|a| a.lines.clone())
            .ok_or_else(|| KittingError::UnknownAssembly(assembly_id.to_string()))
    }

    /// 所有組件（依ID排序）
    pub fn snapshot(&self) -> Vec<Assembly> {
        let mut assemblies: Vec<Assembly> = self.assemblies.read().values().cloned().collect();
        assemblies.sort_by(|a, b| a.id.cmp(&b.id));
        assemblies
    }

    fn check_line(line: &SpecificationLine) -> Result<()> {
        if line.qty_per_unit == 0 {
            return Err(KittingError::InvalidQuantity(format!(
                "組件 {} 物料 {} 的單位用量必須大於 0",
                line.assembly_id, line.component_id
            )));
        }
        Ok(())
    }
}
