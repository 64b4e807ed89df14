// ==========================================
// 波次分配系统 - 领域类型定义
// ==========================================
// 职责: 波次 / 仓库 / 库区 / 样式的强类型标识
// 红线: 样式标识是目录内的句柄,不是复合元组
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 波次序号 (Batch Index)
// ==========================================
// 取值范围: 1..=max_batches
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BatchIndex(u32);

impl BatchIndex {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// 对外展示的波次标签（导出表 BatchNo 列）
    pub fn label(self) -> String {
        format!("波次{}", self.0)
    }

    /// 遍历 1..=max_batches 的全部波次
    pub fn all(max_batches: u32) -> impl Iterator<Item = BatchIndex> {
        (1..=max_batches).map(BatchIndex)
    }
}

impl fmt::Display for BatchIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==========================================
// 仓库 / 库区索引 (首次出现顺序编号, 从 1 开始)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WarehouseIdx(u32);

impl WarehouseIdx {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for WarehouseIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AreaIdx(u32);

impl AreaIdx {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AreaIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 库位索引的公共视图（样式键展示用）
pub trait LocationIdx: Copy + Ord {
    fn raw(self) -> u32;
}

impl LocationIdx for WarehouseIdx {
    fn raw(self) -> u32 {
        self.0
    }
}

impl LocationIdx for AreaIdx {
    fn raw(self) -> u32 {
        self.0
    }
}

// ==========================================
// 样式句柄 (目录内下标, 从 0 开始)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WarePatternId(usize);

impl WarePatternId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for WarePatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wp{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AreaPatternId(usize);

impl AreaPatternId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for AreaPatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ap{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_label_and_range() {
        let batches: Vec<BatchIndex> = BatchIndex::all(3).collect();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].get(), 1);
        assert_eq!(batches[2].label(), "波次3");
    }

    #[test]
    fn test_batch_range_empty() {
        assert_eq!(BatchIndex::all(0).count(), 0);
    }
}
