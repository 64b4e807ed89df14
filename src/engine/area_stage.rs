// ==========================================
// 波次分配系统 - 阶段二: 库区粒度建模与求解
// ==========================================
// 输入: Stage1Result（只读交接对象）
// 决策变量:
//   x(b,ap) 非负整数  仅对已使用波次 + 其已分配仓库样式下属的库区样式生成
//   y(b,a)  0/1       全部 波次 × 库区
// 约束:
//   (1) Σ_{ap∋a} x(b,ap) <= M · y(b,a)
//   (2) Σ_{ap∈areas(wp)} x(b,ap) = 阶段一 count(b,wp)
//   (3) Σ_b x(b,ap) = count(ap)
// 目标: min Σ y(b,a)
// ==========================================

use crate::config::BatchOptConfig;
use crate::domain::{
    AreaCounts, AreaIdx, AreaPatternId, BatchIndex, PatternCatalog, Stage1Result, Stage2Result,
};
use crate::engine::big_m::area_touch_bound;
use crate::engine::error::{ConstraintFamily, EngineError, EngineResult, Stage};
use crate::perf::PerfGuard;
use crate::solver::{
    interpret_count, LinearExpr, LinearProgram, MipSolver, SolveStatus, SolverValue, VarId,
};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

pub const SECOND_MODEL_NAME: &str = "BatchOptSecondModel";

// ==========================================
// AreaStageModel - 阶段二模型
// ==========================================
pub struct AreaStageModel<'a> {
    catalog: &'a PatternCatalog,
    config: &'a BatchOptConfig,
    stage1: &'a Stage1Result,
    program: LinearProgram,
    x: BTreeMap<(BatchIndex, AreaPatternId), VarId>,
    y: BTreeMap<(BatchIndex, AreaIdx), VarId>,
}

impl<'a> AreaStageModel<'a> {
    /// 基于阶段一结果构建模型
    ///
    /// # 错误
    /// - PatternLookup: 阶段一引用了目录中不存在的样式
    /// - InfeasibleModel: 阶段一承诺无法由任何库区变量承接
    pub fn build(
        catalog: &'a PatternCatalog,
        config: &'a BatchOptConfig,
        stage1: &'a Stage1Result,
    ) -> EngineResult<Self> {
        let _perf = PerfGuard::new("stage2_build");
        let mut model = Self {
            catalog,
            config,
            stage1,
            program: LinearProgram::new(SECOND_MODEL_NAME),
            x: BTreeMap::new(),
            y: BTreeMap::new(),
        };

        model.add_variables()?;
        model.area_touch_constraints();
        model.consistency_constraints()?;
        model.area_conservation_constraints()?;
        model.add_objective();

        debug!(
            variables = model.program.num_variables(),
            constraints = model.program.num_constraints(),
            "阶段二模型构建完成"
        );
        Ok(model)
    }

    pub fn program(&self) -> &LinearProgram {
        &self.program
    }

    pub fn x_var(&self, batch: BatchIndex, pattern: AreaPatternId) -> Option<VarId> {
        self.x.get(&(batch, pattern)).copied()
    }

    pub fn y_var(&self, batch: BatchIndex, area: AreaIdx) -> Option<VarId> {
        self.y.get(&(batch, area)).copied()
    }

    // ==========================================
    // 变量
    // ==========================================

    fn add_variables(&mut self) -> EngineResult<()> {
        for b in self.stage1.used_batches() {
            let Some(counts) = self.stage1.batch_counts(b) else {
                continue;
            };
            for (wp, count) in counts {
                if *count == 0 {
                    continue;
                }
                let ware_pattern =
                    self.catalog
                        .ware_pattern(*wp)
                        .ok_or_else(|| EngineError::PatternLookup {
                            stage: Stage::Area,
                            pattern: wp.to_string(),
                        })?;
                for ap in &ware_pattern.area_patterns {
                    if self.catalog.area_pattern(*ap).is_none() {
                        return Err(EngineError::PatternLookup {
                            stage: Stage::Area,
                            pattern: ap.to_string(),
                        });
                    }
                    if !self.x.contains_key(&(b, *ap)) {
                        let var = self.program.add_integer(format!("x_b{}_{}", b, ap));
                        self.x.insert((b, *ap), var);
                    }
                }
            }
        }

        for b in BatchIndex::all(self.stage1.max_batches()) {
            for a in self.catalog.areas() {
                let var = self.program.add_binary(format!("y_b{}_a{}", b, a));
                self.y.insert((b, a), var);
            }
        }
        Ok(())
    }

    // ==========================================
    // 约束
    // ==========================================

    /// (1) 波次-库区关联（只为存在 x 的波次生成）
    fn area_touch_constraints(&mut self) {
        let areas: Vec<AreaIdx> = self.catalog.areas().collect();
        for b in self.stage1.used_batches() {
            let batch_total = self.stage1.batch_package_total(b);
            for a in &areas {
                let mut expr: LinearExpr = self
                    .catalog
                    .area_patterns()
                    .iter()
                    .filter(|ap| ap.key.contains(*a))
                    .filter_map(|ap| self.x.get(&(b, ap.id)).copied())
                    .collect();
                if expr.is_empty() {
                    continue;
                }
                let Some(y) = self.y.get(&(b, *a)).copied() else {
                    continue;
                };
                let big_m =
                    area_touch_bound(self.catalog, self.config.big_m_policy, *a, batch_total);
                expr.add_term(y, -(big_m as f64));
                self.program
                    .add_le(format!("batch_{}_touch_a{}", b, a), expr, 0.0);
            }
        }
    }

    /// (2) 阶段一承诺在阶段二精确细分
    fn consistency_constraints(&mut self) -> EngineResult<()> {
        for (b, counts) in self.stage1.assignments() {
            for (wp, count) in counts {
                if *count == 0 {
                    continue;
                }
                let ware_pattern =
                    self.catalog
                        .ware_pattern(*wp)
                        .ok_or_else(|| EngineError::PatternLookup {
                            stage: Stage::Area,
                            pattern: wp.to_string(),
                        })?;
                let expr: LinearExpr = ware_pattern
                    .area_patterns
                    .iter()
                    .filter_map(|ap| self.x.get(&(*b, *ap)).copied())
                    .collect();
                if expr.is_empty() {
                    return Err(EngineError::InfeasibleModel {
                        stage: Stage::Area,
                        family: Some(ConstraintFamily::WarePatternConsistency),
                        detail: format!(
                            "波次 {} 的样式 {} 承诺 {} 个包裹,但该波次未被使用",
                            b, ware_pattern.key, count
                        ),
                    });
                }
                self.program.add_eq(
                    format!("batch_{}_consistency_{}", b, wp),
                    expr,
                    *count as f64,
                );
            }
        }
        Ok(())
    }

    /// (3) 库区样式包裹守恒
    fn area_conservation_constraints(&mut self) -> EngineResult<()> {
        for pattern in self.catalog.area_patterns() {
            let expr: LinearExpr = BatchIndex::all(self.stage1.max_batches())
                .filter_map(|b| self.x.get(&(b, pattern.id)).copied())
                .collect();
            if expr.is_empty() {
                if pattern.package_count == 0 {
                    continue;
                }
                return Err(EngineError::InfeasibleModel {
                    stage: Stage::Area,
                    family: Some(ConstraintFamily::AreaConservation),
                    detail: format!(
                        "库区样式 {} 有 {} 个包裹,但没有任何波次可承接",
                        pattern.key, pattern.package_count
                    ),
                });
            }
            self.program.add_eq(
                format!("area_pattern_{}_conservation", pattern.id),
                expr,
                pattern.package_count as f64,
            );
        }
        Ok(())
    }

    // ==========================================
    // 目标: 最小化波次涉及库区总次数
    // ==========================================
    fn add_objective(&mut self) {
        let objective: LinearExpr = self.y.values().copied().collect();
        self.program.set_objective(objective);
    }

    // ==========================================
    // 求解与结果回收
    // ==========================================

    #[instrument(skip_all, fields(
        solver = solver.name(),
        variables = self.program.num_variables(),
        constraints = self.program.num_constraints()
    ))]
    pub fn solve<S: MipSolver + ?Sized>(&self, solver: &S) -> EngineResult<Stage2Result> {
        let _perf = PerfGuard::new("stage2_solve");
        let outcome = solver
            .solve(&self.program, self.config.solve_time_budget())
            .map_err(|source| EngineError::Solver {
                stage: Stage::Area,
                source,
            })?;

        match outcome.status {
            SolveStatus::Infeasible => {
                return Err(EngineError::InfeasibleModel {
                    stage: Stage::Area,
                    family: None,
                    detail: "阶段一结果无法在库区粒度上一致细分".to_string(),
                });
            }
            SolveStatus::FeasibleTimeout => {
                debug!("阶段二: 时间预算内返回可行解,按成功结果处理");
            }
            SolveStatus::Optimal => {}
        }

        let mut assignments: BTreeMap<BatchIndex, AreaCounts> = BTreeMap::new();
        for ((b, ap), var) in &self.x {
            match interpret_count(outcome.value(*var)) {
                SolverValue::Zero => {}
                SolverValue::Count(count) => {
                    assignments.entry(*b).or_default().insert(*ap, count);
                }
                SolverValue::Fractional(value) => {
                    return Err(EngineError::NonIntegralValue {
                        stage: Stage::Area,
                        variable: self
                            .program
                            .variable(*var)
                            .map(|v| v.name.clone())
                            .unwrap_or_default(),
                        value,
                    });
                }
            }
        }

        let objective_value = outcome.objective_value(&self.program);
        let result = Stage2Result::new(assignments, outcome.status, objective_value);
        info!(
            status = %outcome.status,
            assigned_packages = result.assigned_total(),
            area_touches = objective_value,
            "阶段二求解完成"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CountRange;
    use crate::domain::{RawPackageRecord, WareCounts, WarePatternId};
    use crate::engine::PatternAggregator;

    #[test]
    fn test_unknown_ware_pattern_is_lookup_error() {
        let records = vec![RawPackageRecord::new("P1", 2, "W1-A1", 2)];
        let catalog = PatternAggregator::new().aggregate(&records).unwrap();
        let config = BatchOptConfig {
            batch_count_range: CountRange::new(1, 1),
            package_count_range: CountRange::new(1, 1),
            goods_quantity_range: CountRange::new(1, 2),
            ..BatchOptConfig::default()
        };

        let mut counts = WareCounts::new();
        counts.insert(WarePatternId::new(99), 1);
        let mut assignments = BTreeMap::new();
        assignments.insert(BatchIndex::new(1), counts);
        let stage1 = Stage1Result::new(vec![true], assignments, SolveStatus::Optimal, 1.0);

        let err = AreaStageModel::build(&catalog, &config, &stage1).err().unwrap();
        assert!(matches!(
            err,
            EngineError::PatternLookup { stage: Stage::Area, ref pattern } if pattern == "wp99"
        ));
    }
}
