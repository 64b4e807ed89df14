// ==========================================
// 波次分配系统 - 字段映射器实现
// ==========================================
// 职责: 源字段 → RawPackageRecord + 类型转换
// 标准列: pakage_no / qty / area（支持别名）
// ==========================================

use crate::domain::RawPackageRecord;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;
use std::collections::HashMap;

pub const FIELD_PACKAGE_NO: &str = "pakage_no";
pub const FIELD_QUANTITY: &str = "qty";
pub const FIELD_LOCATION: &str = "area";

pub struct PackageFieldMapper;

impl PackageFieldMapper {
    pub fn map_row(&self, row: &RawRow) -> ImportResult<RawPackageRecord> {
        let row_number = row.row_number;
        let package_no = self.require(&row.fields, FIELD_PACKAGE_NO, row_number)?;
        let quantity = self.parse_quantity(&row.fields, row_number)?;
        let location = self.require(&row.fields, FIELD_LOCATION, row_number)?;

        Ok(RawPackageRecord::new(package_no, quantity, location, row_number))
    }

    /// 提取字符串字段，支持多个可能的列名（别名）
    fn get_string(&self, row: &HashMap<String, String>, key: &str) -> Option<String> {
        let aliases: Vec<&str> = match key {
            FIELD_PACKAGE_NO => vec![FIELD_PACKAGE_NO, "package_no", "包裹号"],
            FIELD_QUANTITY => vec![FIELD_QUANTITY, "quantity", "数量"],
            FIELD_LOCATION => vec![FIELD_LOCATION, "location", "库区"],
            _ => vec![key],
        };

        for alias in aliases {
            if let Some(v) = row.get(alias) {
                let trimmed = v.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
        None
    }

    fn require(
        &self,
        row: &HashMap<String, String>,
        key: &str,
        row_number: usize,
    ) -> ImportResult<String> {
        self.get_string(row, key)
            .ok_or_else(|| ImportError::MissingField {
                row: row_number,
                field: key.to_string(),
            })
    }

    /// 解析数量（接受 "2" 与 "2.0",拒绝带小数部分的值）
    ///
    /// 正负号不在此判断,非正数量由样式聚合统一拒绝
    fn parse_quantity(&self, row: &HashMap<String, String>, row_number: usize) -> ImportResult<i64> {
        let value = self.require(row, FIELD_QUANTITY, row_number)?;
        if let Ok(parsed) = value.parse::<i64>() {
            return Ok(parsed);
        }

        let conversion_error = |message: String| ImportError::TypeConversionError {
            row: row_number,
            field: FIELD_QUANTITY.to_string(),
            message,
        };
        let parsed = value
            .parse::<f64>()
            .map_err(|_| conversion_error(format!("无法解析为整数: {}", value)))?;
        if !parsed.is_finite() || parsed.fract() != 0.0 || parsed.abs() > i64::MAX as f64 {
            return Err(conversion_error(format!("数量必须为整数: {}", value)));
        }
        Ok(parsed as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        RawRow {
            row_number: 7,
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_map_standard_columns() {
        let record = PackageFieldMapper
            .map_row(&row(&[("pakage_no", "P1"), ("qty", "3"), ("area", "W1-A1")]))
            .unwrap();
        assert_eq!(record.package_no, "P1");
        assert_eq!(record.quantity, 3);
        assert_eq!(record.location_code, "W1-A1");
        assert_eq!(record.row_number, 7);
    }

    #[test]
    fn test_map_alias_columns_and_integral_float() {
        let record = PackageFieldMapper
            .map_row(&row(&[("包裹号", "P2"), ("数量", "2.0"), ("库区", "W2-B1")]))
            .unwrap();
        assert_eq!(record.package_no, "P2");
        assert_eq!(record.quantity, 2);
    }

    #[test]
    fn test_fractional_quantity_rejected() {
        let err = PackageFieldMapper
            .map_row(&row(&[("pakage_no", "P1"), ("qty", "2.5"), ("area", "W1-A1")]))
            .unwrap_err();
        assert!(matches!(err, ImportError::TypeConversionError { row: 7, .. }));
    }

    #[test]
    fn test_missing_location_rejected() {
        let err = PackageFieldMapper
            .map_row(&row(&[("pakage_no", "P1"), ("qty", "1"), ("area", " ")]))
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingField { row: 7, ref field } if field == "area"));
    }
}
