// ==========================================
// 波次分配系统 - 样式聚合引擎
// ==========================================
// 输入: 原始包裹记录（包裹号, 数量, 库位编码）
// 输出: PatternCatalog（仓库样式 + 库区样式）
// ==========================================
// 规则:
// 1) 仓库号 = 库位编码第一个 '-' 之前的前缀,库区号 = 完整编码
// 2) 仓库 / 库区按首次出现顺序编号（从 1 开始）
// 3) 同一包裹多行: 数量累加,库位集合取并
// 4) 相同 (数量, 库位集合) 的包裹折叠为同一样式
// ==========================================

use crate::domain::{
    parse_location_code, AreaIdx, AreaPattern, AreaPatternId, AreaPatternKey, Package,
    PatternCatalog, RawPackageRecord, RecordValidationError, WarePatternId, WarePatternKey,
    WarehouseIdx, WarehousePattern,
};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, instrument};

// ==========================================
// PatternAggregator - 样式聚合引擎
// ==========================================
#[derive(Debug, Default)]
pub struct PatternAggregator {
    // 无状态引擎
}

/// 首次出现编号表
#[derive(Default)]
struct CodeInterner {
    codes: Vec<String>,
    index: HashMap<String, u32>,
}

impl CodeInterner {
    fn intern(&mut self, code: &str) -> u32 {
        if let Some(idx) = self.index.get(code) {
            return *idx;
        }
        self.codes.push(code.to_string());
        let idx = self.codes.len() as u32;
        self.index.insert(code.to_string(), idx);
        idx
    }
}

impl PatternAggregator {
    pub fn new() -> Self {
        Self {}
    }

    /// 聚合原始记录为样式目录
    ///
    /// # 错误
    /// 任一记录校验失败即整体拒绝,不返回部分结果
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn aggregate(
        &self,
        records: &[RawPackageRecord],
    ) -> Result<PatternCatalog, RecordValidationError> {
        let mut warehouses = CodeInterner::default();
        let mut areas = CodeInterner::default();
        let packages = self.accumulate_packages(records, &mut warehouses, &mut areas)?;

        let mut catalog = PatternCatalog {
            warehouse_codes: warehouses.codes,
            area_codes: areas.codes,
            ..PatternCatalog::default()
        };

        // BTreeMap 按包裹号遍历,样式句柄与行顺序无关
        for package in packages.values() {
            register_package(&mut catalog, package);
        }

        let summary = catalog.summary();
        info!(
            packages = summary.package_count,
            warehouses = summary.warehouse_count,
            areas = summary.area_count,
            ware_patterns = summary.ware_pattern_count,
            area_patterns = summary.area_pattern_count,
            goods_total = summary.goods_total,
            "样式聚合完成"
        );

        Ok(catalog)
    }

    /// 阶段 1: 逐行校验并按包裹号累加
    fn accumulate_packages(
        &self,
        records: &[RawPackageRecord],
        warehouses: &mut CodeInterner,
        areas: &mut CodeInterner,
    ) -> Result<BTreeMap<String, Package>, RecordValidationError> {
        let mut packages: BTreeMap<String, Package> = BTreeMap::new();
        // 各样式件数之和 <= goods_total
        let mut goods_total: u64 = 0;

        for record in records {
            let package_no = record.package_no.trim();
            if package_no.is_empty() {
                return Err(RecordValidationError::MissingPackageNo {
                    row: record.row_number,
                });
            }
            if record.quantity <= 0 {
                return Err(RecordValidationError::NonPositiveQuantity {
                    row: record.row_number,
                    package_no: package_no.to_string(),
                    quantity: record.quantity,
                });
            }

            let location = parse_location_code(record.location_code.trim(), record.row_number)?;
            let warehouse = WarehouseIdx::new(warehouses.intern(location.warehouse));
            let area = AreaIdx::new(areas.intern(location.area));

            let package = packages
                .entry(package_no.to_string())
                .or_insert_with(|| Package::new(package_no));
            package.quantity = package
                .quantity
                .checked_add(record.quantity as u64)
                .ok_or_else(|| RecordValidationError::InconsistentPackage {
                    row: record.row_number,
                    package_no: package_no.to_string(),
                    reason: "累计数量溢出".to_string(),
                })?;
            goods_total = goods_total
                .checked_add(record.quantity as u64)
                .ok_or_else(|| RecordValidationError::InconsistentPackage {
                    row: record.row_number,
                    package_no: package_no.to_string(),
                    reason: "商品总件数溢出".to_string(),
                })?;
            package.warehouses.insert(warehouse);
            package.areas.insert(area);
        }

        debug!(packages = packages.len(), "包裹累加完成");
        Ok(packages)
    }
}

/// 阶段 2: 包裹 → 仓库样式 / 库区样式
fn register_package(catalog: &mut PatternCatalog, package: &Package) {
    let ware_key = WarePatternKey::new(package.quantity, package.warehouse_signature());
    let area_key = AreaPatternKey::new(package.quantity, package.area_signature());

    let area_id = match catalog.area_lookup.get(&area_key) {
        Some(id) => *id,
        None => {
            let id = AreaPatternId::new(catalog.area_patterns.len());
            catalog.area_patterns.push(AreaPattern {
                id,
                key: area_key.clone(),
                package_count: 0,
                goods_quantity: 0,
            });
            catalog.area_lookup.insert(area_key, id);
            id
        }
    };
    let area_pattern = &mut catalog.area_patterns[area_id.index()];
    area_pattern.package_count += 1;
    area_pattern.goods_quantity += package.quantity;

    let ware_id = match catalog.ware_lookup.get(&ware_key) {
        Some(id) => *id,
        None => {
            let id = WarePatternId::new(catalog.ware_patterns.len());
            catalog.ware_patterns.push(WarehousePattern {
                id,
                key: ware_key.clone(),
                package_count: 0,
                goods_quantity: 0,
                area_patterns: Vec::new(),
            });
            catalog.ware_lookup.insert(ware_key, id);
            id
        }
    };
    let ware_pattern = &mut catalog.ware_patterns[ware_id.index()];
    ware_pattern.package_count += 1;
    ware_pattern.goods_quantity += package.quantity;
    if !ware_pattern.area_patterns.contains(&area_id) {
        ware_pattern.area_patterns.push(area_id);
    }

    catalog.package_count += 1;
}
