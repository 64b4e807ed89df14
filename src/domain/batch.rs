// ==========================================
// 波次分配系统 - 波次结果模型
// ==========================================
// 职责: 阶段一 / 阶段二的求解结果（不可变交接对象）
// 红线: 阶段二只读取 Stage1Result,不共享任何其他可变状态
// ==========================================

use crate::domain::types::{AreaPatternId, BatchIndex, WarePatternId};
use crate::solver::SolveStatus;
use std::collections::BTreeMap;

pub type WareCounts = BTreeMap<WarePatternId, u64>;
pub type AreaCounts = BTreeMap<AreaPatternId, u64>;

// ==========================================
// Stage1Result - 阶段一交接对象
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct Stage1Result {
    used: Vec<bool>, // 下标 = 波次序号 - 1
    assignments: BTreeMap<BatchIndex, WareCounts>,
    status: SolveStatus,
    objective_value: f64,
}

impl Stage1Result {
    pub fn new(
        used: Vec<bool>,
        assignments: BTreeMap<BatchIndex, WareCounts>,
        status: SolveStatus,
        objective_value: f64,
    ) -> Self {
        Self {
            used,
            assignments,
            status,
            objective_value,
        }
    }

    pub fn max_batches(&self) -> u32 {
        self.used.len() as u32
    }

    pub fn is_used(&self, batch: BatchIndex) -> bool {
        (batch.get() as usize)
            .checked_sub(1)
            .and_then(|pos| self.used.get(pos))
            .copied()
            .unwrap_or(false)
    }

    pub fn used_batches(&self) -> impl Iterator<Item = BatchIndex> + '_ {
        BatchIndex::all(self.max_batches()).filter(|b| self.is_used(*b))
    }

    pub fn used_count(&self) -> usize {
        self.used.iter().filter(|u| **u).count()
    }

    /// 波次 b 的仓库样式分配（未分配时为 None）
    pub fn batch_counts(&self, batch: BatchIndex) -> Option<&WareCounts> {
        self.assignments.get(&batch)
    }

    pub fn assignments(&self) -> &BTreeMap<BatchIndex, WareCounts> {
        &self.assignments
    }

    /// 波次 b 的包裹总数
    pub fn batch_package_total(&self, batch: BatchIndex) -> u64 {
        self.batch_counts(batch)
            .map(|counts| counts.values().sum())
            .unwrap_or(0)
    }

    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }
}

// ==========================================
// Stage2Result - 阶段二结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct Stage2Result {
    assignments: BTreeMap<BatchIndex, AreaCounts>,
    status: SolveStatus,
    objective_value: f64,
}

impl Stage2Result {
    pub fn new(
        assignments: BTreeMap<BatchIndex, AreaCounts>,
        status: SolveStatus,
        objective_value: f64,
    ) -> Self {
        Self {
            assignments,
            status,
            objective_value,
        }
    }

    pub fn batch_counts(&self, batch: BatchIndex) -> Option<&AreaCounts> {
        self.assignments.get(&batch)
    }

    pub fn assignments(&self) -> &BTreeMap<BatchIndex, AreaCounts> {
        &self.assignments
    }

    pub fn batch_package_total(&self, batch: BatchIndex) -> u64 {
        self.batch_counts(batch)
            .map(|counts| counts.values().sum())
            .unwrap_or(0)
    }

    /// 全部波次分配的包裹总数
    pub fn assigned_total(&self) -> u64 {
        self.assignments.values().flat_map(|c| c.values()).sum()
    }

    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage1_result_usage_queries() {
        let mut assignments = BTreeMap::new();
        let mut counts = WareCounts::new();
        counts.insert(WarePatternId::new(0), 2);
        counts.insert(WarePatternId::new(1), 3);
        assignments.insert(BatchIndex::new(2), counts);

        let result = Stage1Result::new(
            vec![false, true, false],
            assignments,
            SolveStatus::Optimal,
            1.0,
        );

        assert_eq!(result.max_batches(), 3);
        assert!(!result.is_used(BatchIndex::new(1)));
        assert!(result.is_used(BatchIndex::new(2)));
        assert!(!result.is_used(BatchIndex::new(0)));
        assert!(!result.is_used(BatchIndex::new(9)));
        assert_eq!(result.used_count(), 1);
        assert_eq!(
            result.used_batches().collect::<Vec<_>>(),
            vec![BatchIndex::new(2)]
        );
        assert_eq!(result.batch_package_total(BatchIndex::new(2)), 5);
        assert_eq!(result.batch_package_total(BatchIndex::new(1)), 0);
    }
}
