// ==========================================
// 波次分配系统 - 引擎层
// ==========================================
// 流程: 样式聚合 → 阶段一(仓库) → 阶段二(库区)
// ==========================================
// 职责: 建模、求解、结果复核
// 红线: 引擎不读写文件（模型写出除外）, 阶段间只传 Stage1Result
// ==========================================

pub mod area_stage;
pub mod big_m;
pub mod error;
pub mod orchestrator;
pub mod pattern_aggregator;
pub mod plan_checker;
pub mod ware_stage;

// 重导出核心引擎
pub use area_stage::{AreaStageModel, SECOND_MODEL_NAME};
pub use big_m::{area_touch_bound, warehouse_touch_bound};
pub use error::{ConstraintFamily, EngineError, EngineResult, Stage};
pub use orchestrator::{BatchOptPipeline, PipelineOutput};
pub use pattern_aggregator::PatternAggregator;
pub use plan_checker::{check_plan, check_stage1, check_stage2, PlanViolation};
pub use ware_stage::{WareStageModel, FIRST_MODEL_NAME};
