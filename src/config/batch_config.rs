// ==========================================
// 波次分配系统 - 求解参数
// ==========================================
// 职责: 波次数 / 单波次包裹数 / 单波次商品件数区间 + 求解时间预算
// 红线: 区间非法直接报错,不静默回退默认值
// ==========================================

use crate::config::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ==========================================
// CountRange - 闭区间 [min, max]
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u64,
    pub max: u64,
}

impl CountRange {
    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: u64) -> bool {
        self.min <= value && value <= self.max
    }

    /// min == max（约束退化为等式）
    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    fn validate(&self, key: &str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvalidRange {
                key: key.to_string(),
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

impl fmt::Display for CountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

// ==========================================
// BigMPolicy - 关联约束大 M 取值策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BigMPolicy {
    /// 全局包裹总数（宽松但总是成立）
    Global,
    /// 按库位取最紧上界
    #[default]
    PerLocation,
}

impl fmt::Display for BigMPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BigMPolicy::Global => write!(f, "GLOBAL"),
            BigMPolicy::PerLocation => write!(f, "PER_LOCATION"),
        }
    }
}

// ==========================================
// BatchOptConfig - 求解参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptConfig {
    /// 使用波次数区间
    pub batch_count_range: CountRange,

    /// 单波次包裹数区间
    pub package_count_range: CountRange,

    /// 单波次商品件数区间
    pub goods_quantity_range: CountRange,

    /// 单阶段求解时间预算（秒,两阶段相同）
    pub solve_time_secs: f64,

    /// 大 M 策略
    pub big_m_policy: BigMPolicy,
}

impl Default for BatchOptConfig {
    fn default() -> Self {
        Self {
            batch_count_range: CountRange::new(107, 107),
            package_count_range: CountRange::new(500, 550),
            goods_quantity_range: CountRange::new(1800, 3000),
            solve_time_secs: 50.0,
            big_m_policy: BigMPolicy::PerLocation,
        }
    }
}

impl BatchOptConfig {
    pub fn max_batches(&self) -> u32 {
        self.batch_count_range.max.min(u32::MAX as u64) as u32
    }

    /// 求解时间预算（未经校验的超大值按不限时处理）
    pub fn solve_time_budget(&self) -> Duration {
        Duration::try_from_secs_f64(self.solve_time_secs).unwrap_or(Duration::MAX)
    }

    /// 校验参数合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.batch_count_range.validate("batch_count_range")?;
        self.package_count_range.validate("package_count_range")?;
        self.goods_quantity_range.validate("goods_quantity_range")?;

        if self.batch_count_range.max == 0 {
            return Err(ConfigError::InvalidValue {
                key: "batch_count_range".to_string(),
                value: self.batch_count_range.to_string(),
                message: "最大波次数必须 >= 1".to_string(),
            });
        }
        if self.batch_count_range.max > u32::MAX as u64 {
            return Err(ConfigError::InvalidValue {
                key: "batch_count_range".to_string(),
                value: self.batch_count_range.to_string(),
                message: "最大波次数超出范围".to_string(),
            });
        }
        if !(self.solve_time_secs.is_finite() && self.solve_time_secs > 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "solve_time_secs".to_string(),
                value: self.solve_time_secs.to_string(),
                message: "求解时间必须为正数".to_string(),
            });
        }
        if Duration::try_from_secs_f64(self.solve_time_secs).is_err() {
            return Err(ConfigError::InvalidValue {
                key: "solve_time_secs".to_string(),
                value: self.solve_time_secs.to_string(),
                message: "求解时间超出可表示范围".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BatchOptConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_batches(), 107);
        assert!(config.batch_count_range.is_degenerate());
        assert_eq!(config.big_m_policy, BigMPolicy::PerLocation);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let config = BatchOptConfig {
            package_count_range: CountRange::new(5, 4),
            ..BatchOptConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { ref key, .. } if key == "package_count_range"));
    }

    #[test]
    fn test_zero_max_batches_rejected() {
        let config = BatchOptConfig {
            batch_count_range: CountRange::new(0, 0),
            ..BatchOptConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_solve_time_rejected() {
        let config = BatchOptConfig {
            solve_time_secs: 0.0,
            ..BatchOptConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_solve_time_rejected() {
        let config = BatchOptConfig {
            solve_time_secs: 1e20,
            ..BatchOptConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "solve_time_secs"));
        assert_eq!(config.solve_time_budget(), Duration::MAX);
    }

    #[test]
    fn test_count_range_contains() {
        let range = CountRange::new(1, 4);
        assert!(range.contains(1));
        assert!(range.contains(4));
        assert!(!range.contains(0));
        assert!(!range.contains(5));
    }
}
