// ==========================================
// 波次分配系统 - 结果投影器
// ==========================================
// 输入: PatternCatalog + Stage2Result
// 输出: (波次标签, 库区样式键, 包裹数) 行,按波次序号 → 样式句柄排序
// ==========================================

use crate::domain::{PatternCatalog, Stage2Result};
use serde::{Deserialize, Serialize};

/// 报表行（列名即对外契约）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionRow {
    #[serde(rename = "BatchNo")]
    pub batch_no: String,
    #[serde(rename = "AreaPattern")]
    pub area_pattern: String,
    #[serde(rename = "Count")]
    pub count: u64,
}

pub struct ResultProjector;

impl ResultProjector {
    /// 展平 波次 → 库区样式 → 包裹数
    ///
    /// 目录中查不到的样式句柄以句柄本身展示
    pub fn project(catalog: &PatternCatalog, stage2: &Stage2Result) -> Vec<SolutionRow> {
        stage2
            .assignments()
            .iter()
            .flat_map(|(batch, counts)| {
                counts.iter().filter(|(_, count)| **count > 0).map(move |(ap, count)| {
                    let area_pattern = catalog
                        .area_pattern(*ap)
                        .map(|p| p.key.to_string())
                        .unwrap_or_else(|| ap.to_string());
                    SolutionRow {
                        batch_no: batch.label(),
                        area_pattern,
                        count: *count,
                    }
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AreaCounts, BatchIndex, RawPackageRecord};
    use crate::engine::PatternAggregator;
    use crate::solver::SolveStatus;
    use std::collections::BTreeMap;

    #[test]
    fn test_project_orders_by_batch_then_pattern() {
        let records = vec![
            RawPackageRecord::new("P1", 2, "W1-A1", 2),
            RawPackageRecord::new("P2", 3, "W1-A2", 3),
        ];
        let catalog = PatternAggregator::new().aggregate(&records).unwrap();
        let first = catalog.area_patterns()[0].id;
        let second = catalog.area_patterns()[1].id;

        let mut assignments = BTreeMap::new();
        let mut batch2 = AreaCounts::new();
        batch2.insert(second, 1);
        assignments.insert(BatchIndex::new(2), batch2);
        let mut batch1 = AreaCounts::new();
        batch1.insert(first, 1);
        batch1.insert(second, 0);
        assignments.insert(BatchIndex::new(1), batch1);
        let stage2 = Stage2Result::new(assignments, SolveStatus::Optimal, 2.0);

        let rows = ResultProjector::project(&catalog, &stage2);

        assert_eq!(
            rows,
            vec![
                SolutionRow {
                    batch_no: "波次1".to_string(),
                    area_pattern: "(2, 1)".to_string(),
                    count: 1,
                },
                SolutionRow {
                    batch_no: "波次2".to_string(),
                    area_pattern: "(3, 2)".to_string(),
                    count: 1,
                },
            ]
        );
    }
}
