// ==========================================
// 波次分配系统 - microlp 求解后端
// ==========================================
// 依赖: good_lp (microlp 特性, 纯 Rust 分支定界)
// 时间预算: 交由 microlp 原生时限,在调用线程内同步求解
// 超时有可行解 → FEASIBLE_TIMEOUT; 超时无可行解 → TimeBudgetExhausted
// ==========================================

use crate::solver::model::{ConstraintSense, LinearExpr, LinearProgram, VarKind};
use crate::solver::{MipSolver, SolveStatus, SolverError, SolverOutcome};
use good_lp::{
    constraint, microlp, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolutionStatus, SolverModel, Variable, WithTimeLimit,
};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// 时限截止时刻的安全余量
const DEADLINE_HEADROOM: Duration = Duration::from_secs(86_400);

#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver;

impl MicroLpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl MipSolver for MicroLpSolver {
    fn name(&self) -> &str {
        "microlp"
    }

    fn solve(
        &self,
        program: &LinearProgram,
        time_budget: Duration,
    ) -> Result<SolverOutcome, SolverError> {
        let started = Instant::now();
        let result = solve_within(program, time_budget);

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(outcome) => debug!(
                model = program.name(),
                status = %outcome.status,
                elapsed_ms,
                "microlp 求解返回"
            ),
            Err(SolverError::TimeBudgetExhausted { budget_secs }) => warn!(
                model = program.name(),
                budget_secs,
                elapsed_ms,
                "求解时间预算用尽"
            ),
            Err(_) => {}
        }
        result
    }
}

/// 预算换算为 microlp 时限（秒）
///
/// 截止时刻超出 `Instant` 可表示范围时不设时限
fn backend_time_limit(time_budget: Duration) -> Option<f64> {
    let horizon = time_budget.checked_add(DEADLINE_HEADROOM)?;
    Instant::now().checked_add(horizon)?;
    Some(time_budget.as_secs_f64())
}

fn solve_within(
    program: &LinearProgram,
    time_budget: Duration,
) -> Result<SolverOutcome, SolverError> {
    let time_limit = backend_time_limit(time_budget);
    let mut vars = ProblemVariables::new();
    let handles: Vec<Variable> = program
        .variables()
        .iter()
        .map(|def| {
            let mut definition = variable().name(def.name.clone());
            definition = match def.kind {
                VarKind::Binary => definition.binary(),
                VarKind::Integer => definition.integer().min(def.lower),
                VarKind::Continuous => definition.min(def.lower),
            };
            if let (Some(upper), false) = (def.upper, def.kind == VarKind::Binary) {
                definition = definition.max(upper);
            }
            vars.add(definition)
        })
        .collect();

    let objective = to_expression(program.objective(), &handles);
    let mut model = vars.minimise(objective).using(microlp);
    if let Some(seconds) = time_limit {
        model = model.with_time_limit(seconds);
    }

    for c in program.constraints() {
        let lhs = to_expression(&c.expr, &handles);
        let rhs = c.rhs;
        model = match c.sense {
            ConstraintSense::LessEq => model.with(constraint!(lhs <= rhs)),
            ConstraintSense::GreaterEq => model.with(constraint!(lhs >= rhs)),
            ConstraintSense::Equal => model.with(constraint!(lhs == rhs)),
        };
    }

    match model.solve() {
        Ok(solution) => {
            let status = match solution.status() {
                SolutionStatus::Optimal => SolveStatus::Optimal,
                SolutionStatus::TimeLimit | SolutionStatus::GapLimit => {
                    SolveStatus::FeasibleTimeout
                }
            };
            let values: Vec<f64> = handles.iter().map(|v| solution.value(*v)).collect();
            if values.len() != program.num_variables() {
                return Err(SolverError::ValueCountMismatch {
                    expected: program.num_variables(),
                    actual: values.len(),
                });
            }
            Ok(SolverOutcome { status, values })
        }
        Err(ResolutionError::Infeasible) => Ok(SolverOutcome::infeasible()),
        Err(ResolutionError::Unbounded) => Err(SolverError::Unbounded),
        // 时限内未找到任何可行解
        Err(ResolutionError::Other(_)) if time_limit.is_some() => {
            Err(SolverError::TimeBudgetExhausted {
                budget_secs: time_budget.as_secs_f64(),
            })
        }
        Err(other) => Err(SolverError::Backend(other.to_string())),
    }
}

fn to_expression(expr: &LinearExpr, handles: &[Variable]) -> Expression {
    expr.terms()
        .iter()
        .map(|(var, coef)| handles[var.index()] * *coef)
        .sum::<Expression>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_microlp_solves_small_integer_program() {
        // min y  s.t.  x1 + x2 = 3, x1 <= 2y, x2 <= 2
        let mut program = LinearProgram::new("tiny");
        let x1 = program.add_integer("x1");
        let x2 = program.add_integer("x2");
        let y = program.add_binary("y");
        program.add_eq(
            "total",
            LinearExpr::new().with_term(x1, 1.0).with_term(x2, 1.0),
            3.0,
        );
        program.add_le(
            "link",
            LinearExpr::new().with_term(x1, 1.0).with_term(y, -2.0),
            0.0,
        );
        program.add_le("cap", LinearExpr::new().with_term(x2, 1.0), 2.0);
        program.set_objective(LinearExpr::new().with_term(y, 1.0));

        let outcome = MicroLpSolver::new()
            .solve(&program, Duration::from_secs(30))
            .unwrap();
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert!((outcome.value(y) - 1.0).abs() < 1e-6);
        assert!((outcome.value(x1) + outcome.value(x2) - 3.0).abs() < 1e-6);
        assert!(program.violated_constraints(&outcome.values, 1e-6).is_empty());
    }

    #[test]
    fn test_microlp_reports_infeasible() {
        let mut program = LinearProgram::new("infeasible");
        let x = program.add_integer("x");
        program.add_ge("low", LinearExpr::new().with_term(x, 1.0), 5.0);
        program.add_le("up", LinearExpr::new().with_term(x, 1.0), 3.0);
        program.set_objective(LinearExpr::new().with_term(x, 1.0));

        let outcome = MicroLpSolver::new()
            .solve(&program, Duration::from_secs(30))
            .unwrap();
        assert_eq!(outcome.status, SolveStatus::Infeasible);
    }

    #[test]
    fn test_time_limit_stops_search() {
        // Σ 2·x_i = 41 整数不可行,但线性松弛可行,分支定界需要指数级节点
        let mut program = LinearProgram::new("parity");
        let mut expr = LinearExpr::new();
        for i in 0..40 {
            let x = program.add_binary(format!("x{}", i));
            expr.add_term(x, 2.0);
        }
        program.add_eq("parity", expr, 41.0);

        let started = Instant::now();
        let result = MicroLpSolver::new().solve(&program, Duration::from_millis(200));

        assert!(matches!(
            result,
            Err(SolverError::TimeBudgetExhausted { budget_secs }) if (budget_secs - 0.2).abs() < 1e-9
        ));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_unrepresentable_budget_runs_without_limit() {
        assert_eq!(backend_time_limit(Duration::MAX), None);
        assert_eq!(backend_time_limit(Duration::from_secs(5)), Some(5.0));
    }
}
