// ==========================================
// 波次分配系统 - 配置层
// ==========================================
// 职责: 求解参数加载、覆写与校验
// 来源: JSON 配置文件 + 环境变量
// ==========================================

pub mod batch_config;
pub mod config_manager;
pub mod error;

// 重导出核心配置类型
pub use batch_config::{BatchOptConfig, BigMPolicy, CountRange};
pub use config_manager::{config_keys, ConfigManager};
pub use error::ConfigError;
