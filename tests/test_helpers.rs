// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 包裹记录构建、标准场景参数、可录制的求解器桩
// ==========================================
#![allow(dead_code)]

use batch_opt::config::{BatchOptConfig, CountRange};
use batch_opt::domain::{PatternCatalog, RawPackageRecord};
use batch_opt::engine::PatternAggregator;
use batch_opt::solver::{
    LinearProgram, MicroLpSolver, MipSolver, SolveStatus, SolverError, SolverOutcome,
};
use std::sync::Mutex;
use std::time::Duration;

/// 构建一条原始包裹记录
pub fn record(package_no: &str, quantity: i64, location: &str, row: usize) -> RawPackageRecord {
    RawPackageRecord::new(package_no, quantity, location, row)
}

/// 标准场景: 4 个包裹,数量 [2,2,3,3]
pub fn scenario_records() -> Vec<RawPackageRecord> {
    vec![
        record("P1", 2, "W1-A1", 2),
        record("P2", 2, "W1-A1", 3),
        record("P3", 3, "W1-A2", 4),
        record("P4", 3, "W2-A3", 5),
    ]
}

/// 标准场景参数: 波次 [1,2], 包裹 [1,4], 件数 [1,20]
pub fn scenario_config() -> BatchOptConfig {
    config_with(CountRange::new(1, 2), CountRange::new(1, 4), CountRange::new(1, 20))
}

pub fn config_with(
    batches: CountRange,
    packages: CountRange,
    goods: CountRange,
) -> BatchOptConfig {
    BatchOptConfig {
        batch_count_range: batches,
        package_count_range: packages,
        goods_quantity_range: goods,
        solve_time_secs: 60.0,
        ..BatchOptConfig::default()
    }
}

pub fn scenario_catalog() -> PatternCatalog {
    PatternAggregator::new()
        .aggregate(&scenario_records())
        .expect("标准场景聚合失败")
}

// ==========================================
// StubSolver - 求解器桩
// ==========================================

#[derive(Debug, Clone, Copy)]
pub enum StubResponse {
    Infeasible,
    Constant(f64),
    Timeout,
    /// microlp 的真实取值,状态标记为时间预算用尽的可行解
    FeasibleAtTimeout,
}

/// 记录收到的模型,并按预设方式返回
pub struct StubSolver {
    response: StubResponse,
    programs: Mutex<Vec<LinearProgram>>,
}

impl StubSolver {
    pub fn new(response: StubResponse) -> Self {
        Self {
            response,
            programs: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.programs.lock().unwrap().len()
    }

    pub fn program_names(&self) -> Vec<String> {
        self.programs
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }
}

impl MipSolver for StubSolver {
    fn name(&self) -> &str {
        "stub"
    }

    fn solve(
        &self,
        program: &LinearProgram,
        time_budget: Duration,
    ) -> Result<SolverOutcome, SolverError> {
        self.programs.lock().unwrap().push(program.clone());
        match self.response {
            StubResponse::Infeasible => Ok(SolverOutcome::infeasible()),
            StubResponse::Constant(value) => Ok(SolverOutcome {
                status: SolveStatus::FeasibleTimeout,
                values: vec![value; program.num_variables()],
            }),
            StubResponse::Timeout => Err(SolverError::TimeBudgetExhausted {
                budget_secs: time_budget.as_secs_f64(),
            }),
            StubResponse::FeasibleAtTimeout => {
                let outcome = MicroLpSolver::new().solve(program, time_budget)?;
                if outcome.status == SolveStatus::Infeasible {
                    return Ok(outcome);
                }
                Ok(SolverOutcome {
                    status: SolveStatus::FeasibleTimeout,
                    values: outcome.values,
                })
            }
        }
    }
}
