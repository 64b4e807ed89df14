// ==========================================
// 波次分配系统 - 样式领域模型
// ==========================================
// 职责: 仓库样式 / 库区样式 / 样式目录
// 红线: 样式由聚合器一次性生成,之后只读
// ==========================================
// 仓库样式 key = (数量, 升序仓库索引)
// 库区样式 key = (数量, 升序库区索引)
// ==========================================

use crate::domain::types::{AreaIdx, AreaPatternId, LocationIdx, WarePatternId, WarehouseIdx};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

// ==========================================
// PatternKey - 样式键
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatternKey<L> {
    quantity: u64,
    locations: Vec<L>,
}

pub type WarePatternKey = PatternKey<WarehouseIdx>;
pub type AreaPatternKey = PatternKey<AreaIdx>;

impl<L: Copy + Ord> PatternKey<L> {
    /// 构造样式键（库位自动升序去重）
    pub fn new(quantity: u64, mut locations: Vec<L>) -> Self {
        locations.sort_unstable();
        locations.dedup();
        Self {
            quantity,
            locations,
        }
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn locations(&self) -> &[L] {
        &self.locations
    }

    pub fn contains(&self, location: L) -> bool {
        self.locations.binary_search(&location).is_ok()
    }
}

impl<L: LocationIdx> fmt::Display for PatternKey<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.quantity)?;
        for location in &self.locations {
            write!(f, ", {}", location.raw())?;
        }
        write!(f, ")")
    }
}

// ==========================================
// WarehousePattern - 仓库样式
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehousePattern {
    pub id: WarePatternId,
    pub key: WarePatternKey,
    pub package_count: u64,  // 属于该样式的包裹数（源数据,非决策变量）
    pub goods_quantity: u64, // 数量 × 包裹数
    pub area_patterns: Vec<AreaPatternId>, // 细分库区样式（去重,首次出现顺序）
}

impl WarehousePattern {
    pub fn quantity(&self) -> u64 {
        self.key.quantity()
    }
}

// ==========================================
// AreaPattern - 库区样式
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaPattern {
    pub id: AreaPatternId,
    pub key: AreaPatternKey,
    pub package_count: u64,
    pub goods_quantity: u64,
}

impl AreaPattern {
    pub fn quantity(&self) -> u64 {
        self.key.quantity()
    }
}

/// 目录概况
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub package_count: u64,
    pub warehouse_count: usize,
    pub area_count: usize,
    pub ware_pattern_count: usize,
    pub area_pattern_count: usize,
    pub goods_total: u64,
}

// ==========================================
// PatternCatalog - 样式目录
// ==========================================
// 由 PatternAggregator 构建;两阶段模型只读
#[derive(Debug, Clone, Default)]
pub struct PatternCatalog {
    pub(crate) warehouse_codes: Vec<String>,
    pub(crate) area_codes: Vec<String>,
    pub(crate) ware_patterns: Vec<WarehousePattern>,
    pub(crate) area_patterns: Vec<AreaPattern>,
    pub(crate) ware_lookup: HashMap<WarePatternKey, WarePatternId>,
    pub(crate) area_lookup: HashMap<AreaPatternKey, AreaPatternId>,
    pub(crate) package_count: u64,
}

impl PatternCatalog {
    // ===== 样式访问 =====

    pub fn ware_patterns(&self) -> &[WarehousePattern] {
        &self.ware_patterns
    }

    pub fn area_patterns(&self) -> &[AreaPattern] {
        &self.area_patterns
    }

    pub fn ware_pattern(&self, id: WarePatternId) -> Option<&WarehousePattern> {
        self.ware_patterns.get(id.index())
    }

    pub fn area_pattern(&self, id: AreaPatternId) -> Option<&AreaPattern> {
        self.area_patterns.get(id.index())
    }

    pub fn find_ware_pattern(&self, key: &WarePatternKey) -> Option<&WarehousePattern> {
        self.ware_lookup.get(key).and_then(|id| self.ware_pattern(*id))
    }

    pub fn find_area_pattern(&self, key: &AreaPatternKey) -> Option<&AreaPattern> {
        self.area_lookup.get(key).and_then(|id| self.area_pattern(*id))
    }

    // ===== 库位访问 =====

    pub fn warehouses(&self) -> impl Iterator<Item = WarehouseIdx> + '_ {
        (1..=self.warehouse_codes.len() as u32).map(WarehouseIdx::new)
    }

    pub fn areas(&self) -> impl Iterator<Item = AreaIdx> + '_ {
        (1..=self.area_codes.len() as u32).map(AreaIdx::new)
    }

    pub fn warehouse_code(&self, idx: WarehouseIdx) -> Option<&str> {
        let pos = (idx.get() as usize).checked_sub(1)?;
        self.warehouse_codes.get(pos).map(String::as_str)
    }

    pub fn area_code(&self, idx: AreaIdx) -> Option<&str> {
        let pos = (idx.get() as usize).checked_sub(1)?;
        self.area_codes.get(pos).map(String::as_str)
    }

    /// 仓库样式的可读签名: (数量, 仓库编码列表)
    pub fn ware_signature(&self, pattern: &WarehousePattern) -> (u64, Vec<String>) {
        let codes = pattern
            .key
            .locations()
            .iter()
            .filter_map(|w| self.warehouse_code(*w).map(str::to_string))
            .collect();
        (pattern.quantity(), codes)
    }

    /// 库区样式的可读签名: (数量, 库区编码列表)
    pub fn area_signature(&self, pattern: &AreaPattern) -> (u64, Vec<String>) {
        let codes = pattern
            .key
            .locations()
            .iter()
            .filter_map(|a| self.area_code(*a).map(str::to_string))
            .collect();
        (pattern.quantity(), codes)
    }

    // ===== 汇总 =====

    pub fn package_count(&self) -> u64 {
        self.package_count
    }

    pub fn goods_total(&self) -> u64 {
        self.ware_patterns.iter().map(|p| p.goods_quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.package_count == 0
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            package_count: self.package_count,
            warehouse_count: self.warehouse_codes.len(),
            area_count: self.area_codes.len(),
            ware_pattern_count: self.ware_patterns.len(),
            area_pattern_count: self.area_patterns.len(),
            goods_total: self.goods_total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_key_sorted_and_display() {
        let key = AreaPatternKey::new(3, vec![AreaIdx::new(4), AreaIdx::new(1), AreaIdx::new(4)]);
        assert_eq!(key.locations(), &[AreaIdx::new(1), AreaIdx::new(4)]);
        assert_eq!(key.to_string(), "(3, 1, 4)");
        assert!(key.contains(AreaIdx::new(4)));
        assert!(!key.contains(AreaIdx::new(2)));
    }

    #[test]
    fn test_pattern_key_equality_ignores_input_order() {
        let a = WarePatternKey::new(2, vec![WarehouseIdx::new(2), WarehouseIdx::new(1)]);
        let b = WarePatternKey::new(2, vec![WarehouseIdx::new(1), WarehouseIdx::new(2)]);
        assert_eq!(a, b);
    }
}
