// ==========================================
// 波次分配系统 - 阶段一: 仓库粒度建模与求解
// ==========================================
// 决策变量:
//   x(b,p) 非负整数  波次 b 分配仓库样式 p 的包裹数
//   y(b,w) 0/1       波次 b 是否涉及仓库 w
//   z(b)   0/1       波次 b 是否被使用
// 约束:
//   (1) Σz(b) ∈ [minBatches, maxBatches]
//   (2) Σ_b x(b,p) = count(p)
//   (3) Σ_p x(b,p) ∈ [packageMin, packageMax] · z(b)
//   (4) Σ_p x(b,p)·qty(p) ∈ [goodsMin, goodsMax] · z(b)
//   (5) Σ_{p∋w} x(b,p) <= M · y(b,w)
// 目标: min Σ y(b,w)
// ==========================================

use crate::config::BatchOptConfig;
use crate::domain::{BatchIndex, PatternCatalog, Stage1Result, WareCounts, WarePatternId, WarehouseIdx};
use crate::engine::big_m::warehouse_touch_bound;
use crate::engine::error::{ConstraintFamily, EngineError, EngineResult, Stage};
use crate::perf::PerfGuard;
use crate::solver::{
    interpret_count, interpret_flag, LinearExpr, LinearProgram, MipSolver, SolveStatus,
    SolverValue, VarId,
};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

pub const FIRST_MODEL_NAME: &str = "BatchOptFirstModel";

// ==========================================
// WareStageModel - 阶段一模型
// ==========================================
pub struct WareStageModel<'a> {
    catalog: &'a PatternCatalog,
    config: &'a BatchOptConfig,
    program: LinearProgram,
    x: BTreeMap<(BatchIndex, WarePatternId), VarId>,
    y: BTreeMap<(BatchIndex, WarehouseIdx), VarId>,
    z: BTreeMap<BatchIndex, VarId>,
}

impl<'a> WareStageModel<'a> {
    /// 构建完整模型（变量 → 约束 → 目标）
    ///
    /// # 错误
    /// 聚合层面即可判定不可行时直接返回 InfeasibleModel,不调用求解器
    pub fn build(catalog: &'a PatternCatalog, config: &'a BatchOptConfig) -> EngineResult<Self> {
        let _perf = PerfGuard::new("stage1_build");
        precheck(catalog, config)?;

        let mut model = Self {
            catalog,
            config,
            program: LinearProgram::new(FIRST_MODEL_NAME),
            x: BTreeMap::new(),
            y: BTreeMap::new(),
            z: BTreeMap::new(),
        };

        model.add_variables();
        model.batch_count_constraint();
        model.pattern_conservation_constraints();
        model.batch_capacity_constraints();
        model.warehouse_touch_constraints();
        model.add_objective();

        debug!(
            variables = model.program.num_variables(),
            constraints = model.program.num_constraints(),
            "阶段一模型构建完成"
        );
        Ok(model)
    }

    pub fn program(&self) -> &LinearProgram {
        &self.program
    }

    pub fn x_var(&self, batch: BatchIndex, pattern: WarePatternId) -> Option<VarId> {
        self.x.get(&(batch, pattern)).copied()
    }

    pub fn y_var(&self, batch: BatchIndex, warehouse: WarehouseIdx) -> Option<VarId> {
        self.y.get(&(batch, warehouse)).copied()
    }

    pub fn z_var(&self, batch: BatchIndex) -> Option<VarId> {
        self.z.get(&batch).copied()
    }

    // ==========================================
    // 变量
    // ==========================================

    fn add_variables(&mut self) {
        for b in BatchIndex::all(self.config.max_batches()) {
            for pattern in self.catalog.ware_patterns() {
                let var = self
                    .program
                    .add_integer(format!("x_b{}_{}", b, pattern.id));
                self.x.insert((b, pattern.id), var);
            }
            for w in self.catalog.warehouses() {
                let var = self.program.add_binary(format!("y_b{}_w{}", b, w));
                self.y.insert((b, w), var);
            }
            let var = self.program.add_binary(format!("z_b{}", b));
            self.z.insert(b, var);
        }
    }

    // ==========================================
    // 约束
    // ==========================================

    /// (1) 使用波次数区间
    fn batch_count_constraint(&mut self) {
        let range = self.config.batch_count_range;
        let expr: LinearExpr = self.z.values().copied().collect();
        if range.is_degenerate() {
            self.program.add_eq("batch_count", expr, range.min as f64);
        } else {
            self.program
                .add_range("batch_count", expr, range.min as f64, range.max as f64);
        }
    }

    /// (2) 仓库样式包裹守恒
    fn pattern_conservation_constraints(&mut self) {
        for pattern in self.catalog.ware_patterns() {
            let expr: LinearExpr = BatchIndex::all(self.config.max_batches())
                .filter_map(|b| self.x.get(&(b, pattern.id)).copied())
                .collect();
            self.program.add_eq(
                format!("pattern_{}_conservation", pattern.id),
                expr,
                pattern.package_count as f64,
            );
        }
    }

    /// (3)(4) 单波次包裹数 / 商品件数区间（随 z(b) 缩放）
    fn batch_capacity_constraints(&mut self) {
        let packages = self.config.package_count_range;
        let goods = self.config.goods_quantity_range;

        for (b, z) in self.z.clone() {
            let mut package_sum = LinearExpr::new();
            let mut goods_sum = LinearExpr::new();
            for pattern in self.catalog.ware_patterns() {
                if let Some(x) = self.x.get(&(b, pattern.id)) {
                    package_sum.add_term(*x, 1.0);
                    goods_sum.add_term(*x, pattern.quantity() as f64);
                }
            }

            self.program.add_ge(
                format!("batch_{}_package_low", b),
                package_sum.clone().with_term(z, -(packages.min as f64)),
                0.0,
            );
            self.program.add_le(
                format!("batch_{}_package_up", b),
                package_sum.with_term(z, -(packages.max as f64)),
                0.0,
            );
            self.program.add_ge(
                format!("batch_{}_goods_low", b),
                goods_sum.clone().with_term(z, -(goods.min as f64)),
                0.0,
            );
            self.program.add_le(
                format!("batch_{}_goods_up", b),
                goods_sum.with_term(z, -(goods.max as f64)),
                0.0,
            );
        }
    }

    /// (5) 波次-仓库关联
    fn warehouse_touch_constraints(&mut self) {
        let warehouses: Vec<WarehouseIdx> = self.catalog.warehouses().collect();
        for w in warehouses {
            let big_m = warehouse_touch_bound(self.catalog, self.config, w) as f64;
            let touching: Vec<WarePatternId> = self
                .catalog
                .ware_patterns()
                .iter()
                .filter(|p| p.key.contains(w))
                .map(|p| p.id)
                .collect();
            if touching.is_empty() {
                continue;
            }

            for b in BatchIndex::all(self.config.max_batches()) {
                let Some(y) = self.y.get(&(b, w)).copied() else {
                    continue;
                };
                let mut expr: LinearExpr = touching
                    .iter()
                    .filter_map(|p| self.x.get(&(b, *p)).copied())
                    .collect();
                expr.add_term(y, -big_m);
                self.program
                    .add_le(format!("batch_{}_touch_w{}", b, w), expr, 0.0);
            }
        }
    }

    // ==========================================
    // 目标: 最小化波次涉及仓库总次数
    // ==========================================
    fn add_objective(&mut self) {
        let objective: LinearExpr = self.y.values().copied().collect();
        self.program.set_objective(objective);
    }

    // ==========================================
    // 求解与结果回收
    // ==========================================

    /// 调用求解器并生成 Stage1Result
    #[instrument(skip_all, fields(
        solver = solver.name(),
        variables = self.program.num_variables(),
        constraints = self.program.num_constraints()
    ))]
    pub fn solve<S: MipSolver + ?Sized>(&self, solver: &S) -> EngineResult<Stage1Result> {
        let _perf = PerfGuard::new("stage1_solve");
        let outcome = solver
            .solve(&self.program, self.config.solve_time_budget())
            .map_err(|source| EngineError::Solver {
                stage: Stage::Warehouse,
                source,
            })?;

        match outcome.status {
            SolveStatus::Infeasible => {
                return Err(EngineError::InfeasibleModel {
                    stage: Stage::Warehouse,
                    family: None,
                    detail: "求解器判定不可行".to_string(),
                });
            }
            SolveStatus::FeasibleTimeout => {
                debug!("阶段一: 时间预算内返回可行解,按成功结果处理");
            }
            SolveStatus::Optimal => {}
        }

        let used: Vec<bool> = BatchIndex::all(self.config.max_batches())
            .map(|b| {
                self.z
                    .get(&b)
                    .map(|z| interpret_flag(outcome.value(*z)))
                    .unwrap_or(false)
            })
            .collect();

        let mut assignments: BTreeMap<BatchIndex, WareCounts> = BTreeMap::new();
        for ((b, p), var) in &self.x {
            match interpret_count(outcome.value(*var)) {
                SolverValue::Zero => {}
                SolverValue::Count(count) => {
                    assignments.entry(*b).or_default().insert(*p, count);
                }
                SolverValue::Fractional(value) => {
                    return Err(EngineError::NonIntegralValue {
                        stage: Stage::Warehouse,
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
        let result = Stage1Result::new(used, assignments, outcome.status, objective_value);
        info!(
            status = %outcome.status,
            batches_used = result.used_count(),
            warehouse_touches = objective_value,
            "阶段一求解完成"
        );
        Ok(result)
    }
}

// ==========================================
// 预检: 聚合层面可判定的不可行
// ==========================================
fn precheck(catalog: &PatternCatalog, config: &BatchOptConfig) -> EngineResult<()> {
    let infeasible = |family: ConstraintFamily, detail: String| EngineError::InfeasibleModel {
        stage: Stage::Warehouse,
        family: Some(family),
        detail,
    };

    let batches = config.batch_count_range;
    let packages = config.package_count_range;
    let goods = config.goods_quantity_range;
    let package_total = catalog.package_count();
    let goods_total = catalog.goods_total();

    let package_floor = batches.min.saturating_mul(packages.min);
    let package_ceiling = batches.max.saturating_mul(packages.max);
    if package_total < package_floor || package_total > package_ceiling {
        return Err(infeasible(
            ConstraintFamily::PackageCount,
            format!(
                "包裹总数 {} 不在 [{}, {}] 内（波次数 {} × 单波次包裹数 {}）",
                package_total, package_floor, package_ceiling, batches, packages
            ),
        ));
    }

    let goods_floor = batches.min.saturating_mul(goods.min);
    let goods_ceiling = batches.max.saturating_mul(goods.max);
    if goods_total < goods_floor || goods_total > goods_ceiling {
        return Err(infeasible(
            ConstraintFamily::GoodsQuantity,
            format!(
                "商品总件数 {} 不在 [{}, {}] 内（波次数 {} × 单波次件数 {}）",
                goods_total, goods_floor, goods_ceiling, batches, goods
            ),
        ));
    }

    if let Some(pattern) = catalog
        .ware_patterns()
        .iter()
        .find(|p| p.quantity() > goods.max)
    {
        return Err(infeasible(
            ConstraintFamily::GoodsQuantity,
            format!(
                "样式 {} 单包裹件数 {} 超过单波次上限 {}",
                pattern.key, pattern.quantity(), goods.max
            ),
        ));
    }

    Ok(())
}
