// ==========================================
// 波次分配系统 - 领域模型层
// ==========================================
// 职责: 定义包裹、样式、波次结果与强类型标识
// 红线: 不含求解逻辑,不含文件读写
// ==========================================

pub mod batch;
pub mod package;
pub mod pattern;
pub mod types;

// 重导出核心类型
pub use batch::{AreaCounts, Stage1Result, Stage2Result, WareCounts};
pub use package::{
    parse_location_code, Package, ParsedLocation, RawPackageRecord, RecordValidationError,
    LOCATION_SEPARATOR,
};
pub use pattern::{
    AreaPattern, AreaPatternKey, CatalogSummary, PatternCatalog, PatternKey, WarePatternKey,
    WarehousePattern,
};
pub use types::{AreaIdx, AreaPatternId, BatchIndex, LocationIdx, WarePatternId, WarehouseIdx};
