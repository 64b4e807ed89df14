// ==========================================
// 波次分配系统 - 配置管理器
// ==========================================
// 职责: 配置加载 (JSON 文件) + 环境变量覆写 + 校验
// 优先级: 环境变量 > 配置文件 > 内置默认值
// ==========================================

use crate::config::batch_config::{BatchOptConfig, CountRange};
use crate::config::error::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: BatchOptConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 使用内置默认值
    pub fn with_defaults() -> Self {
        Self {
            config: BatchOptConfig::default(),
            source: None,
        }
    }

    /// 从 JSON 文件加载（缺失字段取默认值）
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        let mut manager = Self::from_json_str(&raw)?;
        manager.source = Some(path.to_path_buf());
        Ok(manager)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: BatchOptConfig = serde_json::from_str(raw)?;
        Ok(Self {
            config,
            source: None,
        })
    }

    /// 完整加载流程: 文件(可选) → 环境变量覆写 → 校验
    pub fn load(path: Option<&Path>) -> Result<BatchOptConfig, ConfigError> {
        let mut manager = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::with_defaults(),
        };
        manager.apply_env_overrides()?;
        manager.validate()?;

        let source_label = manager
            .source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "defaults".to_string());
        tracing::info!(
            source = %source_label,
            batch_count_range = %manager.config.batch_count_range,
            package_count_range = %manager.config.package_count_range,
            goods_quantity_range = %manager.config.goods_quantity_range,
            solve_time_secs = manager.config.solve_time_secs,
            big_m_policy = %manager.config.big_m_policy,
            "配置加载完成"
        );
        Ok(manager.into_config())
    }

    /// 从进程环境变量覆写
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// 从任意来源覆写（测试可注入）
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(config_keys::SOLVE_TIME_SECS) {
            self.config.solve_time_secs = parse_value(config_keys::SOLVE_TIME_SECS, &value)?;
        }

        let CountRange { mut min, mut max } = self.config.batch_count_range;
        if let Some(value) = lookup(config_keys::BATCH_MIN) {
            min = parse_value(config_keys::BATCH_MIN, &value)?;
        }
        if let Some(value) = lookup(config_keys::BATCH_MAX) {
            max = parse_value(config_keys::BATCH_MAX, &value)?;
        }
        self.config.batch_count_range = CountRange::new(min, max);

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.config.validate()
    }

    pub fn config(&self) -> &BatchOptConfig {
        &self.config
    }

    pub fn into_config(self) -> BatchOptConfig {
        self.config
    }

    /// 当前配置快照（JSON,随运行摘要留档）
    pub fn get_config_snapshot(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(&self.config)?)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            message: "无法解析".to_string(),
        })
}

// ==========================================
// 环境变量键
// ==========================================
pub mod config_keys {
    pub const SOLVE_TIME_SECS: &str = "BATCH_OPT_SOLVE_TIME_SECS";
    pub const BATCH_MIN: &str = "BATCH_OPT_BATCH_MIN";
    pub const BATCH_MAX: &str = "BATCH_OPT_BATCH_MAX";
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_json_uses_defaults() {
        let manager =
            ConfigManager::from_json_str(r#"{"batch_count_range": {"min": 1, "max": 2}}"#)
                .unwrap();
        let config = manager.config();
        assert_eq!(config.batch_count_range, CountRange::new(1, 2));
        assert_eq!(config.package_count_range, CountRange::new(500, 550));
        assert_eq!(config.solve_time_secs, 50.0);
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut manager = ConfigManager::with_defaults();
        let env: HashMap<&str, &str> = [
            (config_keys::SOLVE_TIME_SECS, "5"),
            (config_keys::BATCH_MIN, "3"),
            (config_keys::BATCH_MAX, "8"),
        ]
        .into_iter()
        .collect();

        manager
            .apply_overrides_from(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(manager.config().solve_time_secs, 5.0);
        assert_eq!(manager.config().batch_count_range, CountRange::new(3, 8));
    }

    #[test]
    fn test_malformed_override_rejected() {
        let mut manager = ConfigManager::with_defaults();
        let err = manager
            .apply_overrides_from(|key| (key == config_keys::BATCH_MAX).then(|| "many".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_snapshot_round_trips() {
        let manager = ConfigManager::with_defaults();
        let snapshot = manager.get_config_snapshot().unwrap();
        let restored = ConfigManager::from_json_str(&snapshot).unwrap();
        assert_eq!(restored.config(), manager.config());
    }
}
