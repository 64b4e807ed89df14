// ==========================================
// 波次分配系统 - 求解器接口层
// ==========================================
// 职责: 符号化模型 + 求解器协作契约 + 取值解释
// 红线: 求解器取值只能经由 interpret_flag / interpret_count 转换
// ==========================================

pub mod lp_writer;
pub mod microlp_solver;
pub mod model;

pub use lp_writer::{write_lp, write_lp_file};
pub use microlp_solver::MicroLpSolver;
pub use model::{
    ConstraintSense, LinearConstraint, LinearExpr, LinearProgram, VarId, VarKind, VariableDef,
};

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// 整数判定容差
pub const INTEGRALITY_TOLERANCE: f64 = 1e-5;

// ==========================================
// 求解状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    Optimal,         // 证明最优
    FeasibleTimeout, // 时间预算用尽,返回可行解（按成功处理）
    Infeasible,      // 不可行
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "OPTIMAL"),
            SolveStatus::FeasibleTimeout => write!(f, "FEASIBLE_TIMEOUT"),
            SolveStatus::Infeasible => write!(f, "INFEASIBLE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutcome {
    pub status: SolveStatus,
    pub values: Vec<f64>, // 下标 = VarId::index()
}

impl SolverOutcome {
    pub fn infeasible() -> Self {
        Self {
            status: SolveStatus::Infeasible,
            values: Vec::new(),
        }
    }

    pub fn value(&self, var: VarId) -> f64 {
        self.values.get(var.index()).copied().unwrap_or(0.0)
    }

    pub fn objective_value(&self, program: &LinearProgram) -> f64 {
        program.objective().evaluate(&self.values)
    }
}

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("求解时间预算 {budget_secs}s 用尽,未获得可行解")]
    TimeBudgetExhausted { budget_secs: f64 },

    #[error("模型无界")]
    Unbounded,

    #[error("求解器返回变量数不符: 期望 {expected}, 实际 {actual}")]
    ValueCountMismatch { expected: usize, actual: usize },

    #[error("求解器内部错误: {0}")]
    Backend(String),
}

// ==========================================
// MipSolver - 求解器协作契约
// ==========================================
// 输入: 符号化模型 + 时间预算
// 输出: 每个变量的取值 + 状态
pub trait MipSolver {
    fn name(&self) -> &str;

    fn solve(
        &self,
        program: &LinearProgram,
        time_budget: Duration,
    ) -> Result<SolverOutcome, SolverError>;
}

impl<S: MipSolver + ?Sized> MipSolver for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(
        &self,
        program: &LinearProgram,
        time_budget: Duration,
    ) -> Result<SolverOutcome, SolverError> {
        (**self).solve(program, time_budget)
    }
}

// ==========================================
// 取值解释
// ==========================================

/// 0/1 变量取值 → 布尔
pub fn interpret_flag(value: f64) -> bool {
    value > INTEGRALITY_TOLERANCE
}

/// 整数变量取值解释结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolverValue {
    Zero,
    Count(u64),
    Fractional(f64),
}

/// 整数变量取值 → 计数
///
/// - `value <= tol` → Zero
/// - 与最近整数差值 `<= tol` → Count
/// - 其他 → Fractional（由调用方报错）
pub fn interpret_count(value: f64) -> SolverValue {
    if !value.is_finite() {
        return SolverValue::Fractional(value);
    }
    if value <= INTEGRALITY_TOLERANCE {
        return SolverValue::Zero;
    }
    let rounded = value.round();
    if (value - rounded).abs() <= INTEGRALITY_TOLERANCE {
        SolverValue::Count(rounded as u64)
    } else {
        SolverValue::Fractional(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpret_flag() {
        assert!(!interpret_flag(0.0));
        assert!(!interpret_flag(1e-6));
        assert!(interpret_flag(0.99999));
        assert!(interpret_flag(1.0));
    }

    #[test]
    fn test_interpret_count() {
        assert_eq!(interpret_count(0.0), SolverValue::Zero);
        assert_eq!(interpret_count(-3e-6), SolverValue::Zero);
        assert_eq!(interpret_count(2.000004), SolverValue::Count(2));
        assert_eq!(interpret_count(2.999999), SolverValue::Count(3));
        assert_eq!(interpret_count(1.5), SolverValue::Fractional(1.5));
        assert!(matches!(
            interpret_count(f64::NAN),
            SolverValue::Fractional(_)
        ));
    }

    #[test]
    fn test_outcome_objective_value() {
        let mut program = LinearProgram::new("demo");
        let x = program.add_integer("x");
        let y = program.add_binary("y");
        program.set_objective(LinearExpr::new().with_term(x, 2.0).with_term(y, 1.0));

        let outcome = SolverOutcome {
            status: SolveStatus::Optimal,
            values: vec![3.0, 1.0],
        };
        assert_eq!(outcome.objective_value(&program), 7.0);
        assert_eq!(outcome.value(y), 1.0);
    }
}
