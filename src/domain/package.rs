// ==========================================
// 波次分配系统 - 包裹领域模型
// ==========================================
// 职责: 原始包裹记录、库位编码解析、聚合后的包裹
// 红线: 库位编码不合法必须报错,不允许静默丢弃
// ==========================================

use crate::domain::types::{AreaIdx, WarehouseIdx};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// 库位编码分隔符（仓库号为第一个分隔符之前的前缀）
pub const LOCATION_SEPARATOR: char = '-';

// ==========================================
// RawPackageRecord - 原始包裹记录
// ==========================================
// 一个包裹可对应多行（数量累加,库位集合单调增长）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPackageRecord {
    pub package_no: String,
    pub quantity: i64,
    pub location_code: String,

    // 元信息
    pub row_number: usize, // 原始文件行号（用于报错定位）
}

impl RawPackageRecord {
    pub fn new(
        package_no: impl Into<String>,
        quantity: i64,
        location_code: impl Into<String>,
        row_number: usize,
    ) -> Self {
        Self {
            package_no: package_no.into(),
            quantity,
            location_code: location_code.into(),
            row_number,
        }
    }
}

// ==========================================
// 输入校验错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    #[error("库位编码不合法 (行 {row}): '{code}' {reason}")]
    InvalidLocationCode {
        row: usize,
        code: String,
        reason: String,
    },

    #[error("数量必须为正整数 (行 {row}, 包裹 {package_no}): {quantity}")]
    NonPositiveQuantity {
        row: usize,
        package_no: String,
        quantity: i64,
    },

    #[error("包裹号缺失 (行 {row})")]
    MissingPackageNo { row: usize },

    #[error("包裹记录不一致 (行 {row}, 包裹 {package_no}): {reason}")]
    InconsistentPackage {
        row: usize,
        package_no: String,
        reason: String,
    },
}

/// 解析后的库位: 仓库号 + 库区号（库区号即完整编码）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedLocation<'a> {
    pub warehouse: &'a str,
    pub area: &'a str,
}

/// 解析 `<仓库>-<库区>` 形式的库位编码
///
/// # 规则
/// - 仓库号: 第一个 `-` 之前的前缀
/// - 库区号: 完整编码
/// - 无分隔符、仓库段为空、库区段为空 → 报错
pub fn parse_location_code(
    code: &str,
    row: usize,
) -> Result<ParsedLocation<'_>, RecordValidationError> {
    let invalid = |reason: &str| RecordValidationError::InvalidLocationCode {
        row,
        code: code.to_string(),
        reason: reason.to_string(),
    };

    let (warehouse, rest) = code
        .split_once(LOCATION_SEPARATOR)
        .ok_or_else(|| invalid("缺少分隔符 '-'"))?;

    if warehouse.trim().is_empty() {
        return Err(invalid("仓库段为空"));
    }
    if rest.trim().is_empty() {
        return Err(invalid("库区段为空"));
    }

    Ok(ParsedLocation {
        warehouse,
        area: code,
    })
}

// ==========================================
// Package - 聚合后的包裹
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub package_no: String,
    pub quantity: u64,
    pub warehouses: BTreeSet<WarehouseIdx>,
    pub areas: BTreeSet<AreaIdx>,
}

impl Package {
    pub fn new(package_no: impl Into<String>) -> Self {
        Self {
            package_no: package_no.into(),
            quantity: 0,
            warehouses: BTreeSet::new(),
            areas: BTreeSet::new(),
        }
    }

    /// 升序去重后的仓库索引
    pub fn warehouse_signature(&self) -> Vec<WarehouseIdx> {
        self.warehouses.iter().copied().collect()
    }

    /// 升序去重后的库区索引
    pub fn area_signature(&self) -> Vec<AreaIdx> {
        self.areas.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location_code_valid() {
        let parsed = parse_location_code("W1-A1", 2).unwrap();
        assert_eq!(parsed.warehouse, "W1");
        assert_eq!(parsed.area, "W1-A1");
    }

    #[test]
    fn test_parse_location_code_uses_first_separator() {
        let parsed = parse_location_code("W1-A1-03", 2).unwrap();
        assert_eq!(parsed.warehouse, "W1");
        assert_eq!(parsed.area, "W1-A1-03");
    }

    #[test]
    fn test_parse_location_code_rejects_malformed() {
        for code in ["W1A1", "-A1", "W1-", "", "  -A1"] {
            let err = parse_location_code(code, 7).unwrap_err();
            assert!(
                matches!(err, RecordValidationError::InvalidLocationCode { row: 7, .. }),
                "code {:?} should be rejected",
                code
            );
        }
    }

    #[test]
    fn test_package_signature_sorted_unique() {
        let mut package = Package::new("P1");
        package.warehouses.insert(WarehouseIdx::new(3));
        package.warehouses.insert(WarehouseIdx::new(1));
        package.warehouses.insert(WarehouseIdx::new(3));
        assert_eq!(
            package.warehouse_signature(),
            vec![WarehouseIdx::new(1), WarehouseIdx::new(3)]
        );
    }
}
