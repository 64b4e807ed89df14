// ==========================================
// 波次分配系统 - 核心库
// ==========================================
// 流程: 包裹记录 → 样式聚合 → 阶段一(仓库) → 阶段二(库区) → 结果表
// 技术栈: Rust + good_lp(microlp)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 包裹 / 样式 / 波次结果
pub mod domain;

// 求解层 - 符号化模型与求解器适配
pub mod solver;

// 引擎层 - 建模与编排
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 导出层 - 结果表与运行摘要
pub mod export;

// 配置层 - 求解参数
pub mod config;

// 日志系统
pub mod logging;

// 性能统计
pub mod perf;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    AreaIdx, AreaPatternId, BatchIndex, PatternCatalog, RawPackageRecord, Stage1Result,
    Stage2Result, WarePatternId, WarehouseIdx,
};

// 引擎
pub use engine::{BatchOptPipeline, EngineError, PatternAggregator, PipelineOutput};

// 求解器
pub use solver::{MicroLpSolver, MipSolver, SolveStatus};

// 配置
pub use config::{BatchOptConfig, ConfigManager};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "仓库包裹波次分配系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
