// ==========================================
// 波次分配系统 - 引擎编排器
// ==========================================
// 用途: 协调 样式聚合 → 阶段一 → 阶段二 的执行顺序
// 红线:
// 1) 两阶段严格串行,阶段二只读取 Stage1Result
// 2) 任一阶段不可行 / 校验失败即中止,不进入下一阶段
// ==========================================

use crate::config::BatchOptConfig;
use crate::domain::{PatternCatalog, RawPackageRecord, Stage1Result, Stage2Result};
use crate::engine::area_stage::AreaStageModel;
use crate::engine::error::{EngineError, EngineResult, Stage};
use crate::engine::pattern_aggregator::PatternAggregator;
use crate::engine::plan_checker::{check_stage1, check_stage2};
use crate::engine::ware_stage::WareStageModel;
use crate::perf::PerfGuard;
use crate::solver::{write_lp_file, LinearProgram, MipSolver};
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument};

// ==========================================
// PipelineOutput - 流水线结果
// ==========================================
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub catalog: PatternCatalog,
    pub stage1: Stage1Result,
    pub stage2: Stage2Result,
}

// ==========================================
// BatchOptPipeline - 引擎编排器
// ==========================================
pub struct BatchOptPipeline<S>
where
    S: MipSolver,
{
    config: BatchOptConfig,
    solver: S,
    aggregator: PatternAggregator,
    lp_dir: Option<PathBuf>,
}

impl<S> BatchOptPipeline<S>
where
    S: MipSolver,
{
    pub fn new(config: BatchOptConfig, solver: S) -> Self {
        Self {
            config,
            solver,
            aggregator: PatternAggregator::new(),
            lp_dir: None,
        }
    }

    /// 每个阶段求解前把模型写成 LP 文件（排查用）
    pub fn with_lp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lp_dir = Some(dir.into());
        self
    }

    pub fn config(&self) -> &BatchOptConfig {
        &self.config
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// 完整流水线: 原始记录 → 两阶段结果
    #[instrument(skip_all, fields(records = records.len(), solver = self.solver.name()))]
    pub fn run(&self, records: &[RawPackageRecord]) -> EngineResult<PipelineOutput> {
        let _perf = PerfGuard::new("pipeline_run");
        let catalog = self.aggregator.aggregate(records)?;
        self.solve_catalog(catalog)
    }

    /// 从已聚合的样式目录开始求解
    pub fn solve_catalog(&self, catalog: PatternCatalog) -> EngineResult<PipelineOutput> {
        let stage1 = self.run_stage1(&catalog)?;
        let stage2 = self.run_stage2(&catalog, &stage1)?;

        info!(
            batches_used = stage1.used_count(),
            warehouse_touches = stage1.objective_value(),
            area_touches = stage2.objective_value(),
            assigned_packages = stage2.assigned_total(),
            "波次分配完成"
        );

        Ok(PipelineOutput {
            catalog,
            stage1,
            stage2,
        })
    }

    /// 阶段一: 建模 → (可选)写出 → 求解 → 复核
    pub fn run_stage1(&self, catalog: &PatternCatalog) -> EngineResult<Stage1Result> {
        let model = WareStageModel::build(catalog, &self.config).map_err(log_failure)?;
        self.dump(Stage::Warehouse, model.program())?;
        let stage1 = model.solve(&self.solver).map_err(log_failure)?;

        let violations = check_stage1(catalog, &self.config, &stage1);
        if !violations.is_empty() {
            return Err(log_failure(EngineError::PlanCheckFailed {
                stage: Stage::Warehouse,
                violations,
            }));
        }
        Ok(stage1)
    }

    /// 阶段二: 仅在阶段一成功后调用
    pub fn run_stage2(
        &self,
        catalog: &PatternCatalog,
        stage1: &Stage1Result,
    ) -> EngineResult<Stage2Result> {
        let model = AreaStageModel::build(catalog, &self.config, stage1).map_err(log_failure)?;
        self.dump(Stage::Area, model.program())?;
        let stage2 = model.solve(&self.solver).map_err(log_failure)?;

        let violations = check_stage2(catalog, &self.config, stage1, &stage2);
        if !violations.is_empty() {
            return Err(log_failure(EngineError::PlanCheckFailed {
                stage: Stage::Area,
                violations,
            }));
        }
        Ok(stage2)
    }

    fn dump(&self, stage: Stage, program: &LinearProgram) -> EngineResult<()> {
        let Some(dir) = &self.lp_dir else {
            return Ok(());
        };
        let path = lp_path(dir, program);
        write_lp_file(program, &path).map_err(|source| EngineError::ModelDump {
            stage,
            path: path.clone(),
            source,
        })?;
        info!(stage = %stage, path = %path.display(), "模型已写出");
        Ok(())
    }
}

fn lp_path(dir: &Path, program: &LinearProgram) -> PathBuf {
    dir.join(format!("{}.lp", program.name()))
}

fn log_failure(err: EngineError) -> EngineError {
    let stage = err
        .stage()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    error!(stage = %stage, error = %err, "波次分配中止");
    err
}
