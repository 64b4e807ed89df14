// ==========================================
// 波次分配系统 - 符号化线性规划模型
// ==========================================
// 职责: 变量 / 线性约束 / 最小化目标的求解器无关表示
// 红线: 只描述模型,不含任何求解算法
// ==========================================

use std::fmt;

/// 变量句柄（模型内下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Continuous,
    Integer,
    Binary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDef {
    pub name: String,
    pub kind: VarKind,
    pub lower: f64,
    pub upper: Option<f64>,
}

// ==========================================
// LinearExpr - 线性表达式 Σ coef·var
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_term(&mut self, var: VarId, coef: f64) {
        self.terms.push((var, coef));
    }

    pub fn with_term(mut self, var: VarId, coef: f64) -> Self {
        self.add_term(var, coef);
        self
    }

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// 按给定取值计算表达式
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(var, coef)| coef * values.get(var.index()).copied().unwrap_or(0.0))
            .sum()
    }
}

impl FromIterator<VarId> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = VarId>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().map(|var| (var, 1.0)).collect(),
        }
    }
}

impl FromIterator<(VarId, f64)> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = (VarId, f64)>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSense {
    LessEq,
    GreaterEq,
    Equal,
}

impl fmt::Display for ConstraintSense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintSense::LessEq => write!(f, "<="),
            ConstraintSense::GreaterEq => write!(f, ">="),
            ConstraintSense::Equal => write!(f, "="),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub name: String,
    pub expr: LinearExpr,
    pub sense: ConstraintSense,
    pub rhs: f64,
}

impl LinearConstraint {
    pub fn is_satisfied_by(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.sense {
            ConstraintSense::LessEq => lhs <= self.rhs + tolerance,
            ConstraintSense::GreaterEq => lhs >= self.rhs - tolerance,
            ConstraintSense::Equal => (lhs - self.rhs).abs() <= tolerance,
        }
    }
}

// ==========================================
// LinearProgram - 最小化线性(整数)规划
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct LinearProgram {
    name: String,
    variables: Vec<VariableDef>,
    constraints: Vec<LinearConstraint>,
    objective: LinearExpr,
}

impl LinearProgram {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: LinearExpr::new(),
        }
    }

    // ===== 变量 =====

    pub fn add_variable(&mut self, def: VariableDef) -> VarId {
        self.variables.push(def);
        VarId(self.variables.len() - 1)
    }

    /// 非负整数变量
    pub fn add_integer(&mut self, name: impl Into<String>) -> VarId {
        self.add_variable(VariableDef {
            name: name.into(),
            kind: VarKind::Integer,
            lower: 0.0,
            upper: None,
        })
    }

    /// 0/1 变量
    pub fn add_binary(&mut self, name: impl Into<String>) -> VarId {
        self.add_variable(VariableDef {
            name: name.into(),
            kind: VarKind::Binary,
            lower: 0.0,
            upper: Some(1.0),
        })
    }

    // ===== 约束 =====

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        expr: LinearExpr,
        sense: ConstraintSense,
        rhs: f64,
    ) {
        self.constraints.push(LinearConstraint {
            name: name.into(),
            expr,
            sense,
            rhs,
        });
    }

    pub fn add_le(&mut self, name: impl Into<String>, expr: LinearExpr, rhs: f64) {
        self.add_constraint(name, expr, ConstraintSense::LessEq, rhs);
    }

    pub fn add_ge(&mut self, name: impl Into<String>, expr: LinearExpr, rhs: f64) {
        self.add_constraint(name, expr, ConstraintSense::GreaterEq, rhs);
    }

    pub fn add_eq(&mut self, name: impl Into<String>, expr: LinearExpr, rhs: f64) {
        self.add_constraint(name, expr, ConstraintSense::Equal, rhs);
    }

    /// lower <= expr <= upper,拆成 `{name}_low` / `{name}_up` 两条约束
    pub fn add_range(&mut self, name: &str, expr: LinearExpr, lower: f64, upper: f64) {
        self.add_ge(format!("{}_low", name), expr.clone(), lower);
        self.add_le(format!("{}_up", name), expr, upper);
    }

    // ===== 目标 =====

    pub fn set_objective(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    // ===== 只读访问 =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variables(&self) -> &[VariableDef] {
        &self.variables
    }

    pub fn variable(&self, id: VarId) -> Option<&VariableDef> {
        self.variables.get(id.index())
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn constraint(&self, name: &str) -> Option<&LinearConstraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// 返回在给定取值下不满足的约束（调试与测试用）
    pub fn violated_constraints(&self, values: &[f64], tolerance: f64) -> Vec<&LinearConstraint> {
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied_by(values, tolerance))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_range_splits_into_two_constraints() {
        let mut program = LinearProgram::new("demo");
        let x = program.add_integer("x");
        let y = program.add_binary("y");
        program.add_range("band", [x, y].into_iter().collect(), 1.0, 4.0);

        assert_eq!(program.num_variables(), 2);
        assert_eq!(program.num_constraints(), 2);
        let low = program.constraint("band_low").unwrap();
        assert_eq!(low.sense, ConstraintSense::GreaterEq);
        assert_eq!(low.rhs, 1.0);
        let up = program.constraint("band_up").unwrap();
        assert_eq!(up.sense, ConstraintSense::LessEq);
        assert_eq!(up.rhs, 4.0);
    }

    #[test]
    fn test_violated_constraints() {
        let mut program = LinearProgram::new("demo");
        let x = program.add_integer("x");
        let y = program.add_integer("y");
        program.add_eq("sum", LinearExpr::new().with_term(x, 1.0).with_term(y, 1.0), 3.0);
        program.add_le("cap", LinearExpr::new().with_term(x, 2.0), 2.0);

        assert!(program.violated_constraints(&[1.0, 2.0], 1e-9).is_empty());
        let violated = program.violated_constraints(&[2.0, 1.0], 1e-9);
        assert_eq!(violated.len(), 1);
        assert_eq!(violated[0].name, "cap");
    }
}
