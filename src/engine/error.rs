// ==========================================
// 波次分配系统 - 引擎错误类型
// ==========================================
// 分类:
// (a) 输入校验失败      → 聚合阶段拒绝,不保留中间状态
// (b) 样式查找失败      → 建模缺陷,中止流水线
// (c) 模型不可行        → 中止流水线,阶段二不得运行
// (d) 超时但可行        → 不是错误,静默接受
// ==========================================

use crate::domain::RecordValidationError;
use crate::engine::plan_checker::PlanViolation;
use crate::solver::SolverError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// ==========================================
// Stage - 求解阶段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Warehouse, // 阶段一: 仓库粒度
    Area,      // 阶段二: 库区粒度
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Warehouse => write!(f, "阶段一(仓库)"),
            Stage::Area => write!(f, "阶段二(库区)"),
        }
    }
}

// ==========================================
// ConstraintFamily - 约束族
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintFamily {
    BatchCount,              // 使用波次数区间
    PatternConservation,     // 仓库样式包裹守恒
    PackageCount,            // 单波次包裹数区间
    GoodsQuantity,           // 单波次商品件数区间
    WarehouseTouch,          // 波次-仓库关联
    AreaTouch,               // 波次-库区关联
    WarePatternConsistency,  // 阶段一承诺 = 阶段二细分
    AreaConservation,        // 库区样式包裹守恒
}

impl fmt::Display for ConstraintFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintFamily::BatchCount => "波次数量",
            ConstraintFamily::PatternConservation => "仓库样式守恒",
            ConstraintFamily::PackageCount => "单波次包裹数",
            ConstraintFamily::GoodsQuantity => "单波次商品件数",
            ConstraintFamily::WarehouseTouch => "波次仓库关联",
            ConstraintFamily::AreaTouch => "波次库区关联",
            ConstraintFamily::WarePatternConsistency => "跨阶段样式一致",
            ConstraintFamily::AreaConservation => "库区样式守恒",
        };
        write!(f, "{}", name)
    }
}

fn family_label(family: &Option<ConstraintFamily>) -> String {
    family
        .map(|f| f.to_string())
        .unwrap_or_else(|| "未定位".to_string())
}

fn violation_digest(violations: &[PlanViolation]) -> String {
    violations
        .iter()
        .take(3)
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// ==========================================
// EngineError - 引擎错误
// ==========================================
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("输入校验失败: {0}")]
    InputValidation(#[from] RecordValidationError),

    #[error("{stage}: 样式不存在 {pattern}")]
    PatternLookup { stage: Stage, pattern: String },

    #[error("{stage}: 模型不可行 [约束族: {}] {detail}", family_label(.family))]
    InfeasibleModel {
        stage: Stage,
        family: Option<ConstraintFamily>,
        detail: String,
    },

    #[error("{stage}: 求解失败: {source}")]
    Solver {
        stage: Stage,
        #[source]
        source: SolverError,
    },

    #[error("{stage}: 变量 {variable} 取值 {value} 不是整数")]
    NonIntegralValue {
        stage: Stage,
        variable: String,
        value: f64,
    },

    #[error("{stage}: 方案校验失败 ({} 项): {}", .violations.len(), violation_digest(.violations))]
    PlanCheckFailed {
        stage: Stage,
        violations: Vec<PlanViolation>,
    },

    #[error("{stage}: 模型文件写出失败 '{path}': {source}")]
    ModelDump {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    pub fn stage(&self) -> Option<Stage> {
        match self {
            EngineError::InputValidation(_) => None,
            EngineError::PatternLookup { stage, .. }
            | EngineError::PlanCheckFailed { stage, .. }
            | EngineError::InfeasibleModel { stage, .. }
            | EngineError::Solver { stage, .. }
            | EngineError::NonIntegralValue { stage, .. }
            | EngineError::ModelDump { stage, .. } => Some(*stage),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
