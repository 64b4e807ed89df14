// ==========================================
// 波次分配系统 - 方案校验器
// ==========================================
// 职责: 独立于求解器,对阶段结果逐条复核
// 1) 仓库样式守恒  2) 库区样式守恒
// 3) 未使用波次为空  4) 已使用波次包裹数 / 件数在区间内
// 5) 跨阶段一致: 阶段二细分之和 = 阶段一承诺
// ==========================================

use crate::config::BatchOptConfig;
use crate::domain::{BatchIndex, PatternCatalog, Stage1Result, Stage2Result};
use crate::engine::error::ConstraintFamily;
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// PlanViolation - 校验违规项
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct PlanViolation {
    pub family: ConstraintFamily,
    pub batch: Option<BatchIndex>,
    pub message: String,
}

impl PlanViolation {
    fn new(family: ConstraintFamily, batch: Option<BatchIndex>, message: String) -> Self {
        Self {
            family,
            batch,
            message,
        }
    }
}

impl fmt::Display for PlanViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.batch {
            Some(b) => write!(f, "[{}] {}: {}", self.family, b.label(), self.message),
            None => write!(f, "[{}] {}", self.family, self.message),
        }
    }
}

/// 阶段一复核
pub fn check_stage1(
    catalog: &PatternCatalog,
    config: &BatchOptConfig,
    stage1: &Stage1Result,
) -> Vec<PlanViolation> {
    let mut violations = Vec::new();

    let used = stage1.used_count() as u64;
    if !config.batch_count_range.contains(used) {
        violations.push(PlanViolation::new(
            ConstraintFamily::BatchCount,
            None,
            format!("使用波次数 {} 不在 {} 内", used, config.batch_count_range),
        ));
    }

    // 仓库样式守恒
    let mut placed: BTreeMap<_, u64> = BTreeMap::new();
    for counts in stage1.assignments().values() {
        for (wp, count) in counts {
            let total = placed.entry(*wp).or_default();
            *total = total.saturating_add(*count);
        }
    }
    for pattern in catalog.ware_patterns() {
        let total = placed.remove(&pattern.id).unwrap_or(0);
        if total != pattern.package_count {
            violations.push(PlanViolation::new(
                ConstraintFamily::PatternConservation,
                None,
                format!(
                    "仓库样式 {} 分配 {} 个,源数据 {} 个",
                    pattern.key, total, pattern.package_count
                ),
            ));
        }
    }
    for (wp, total) in placed {
        violations.push(PlanViolation::new(
            ConstraintFamily::PatternConservation,
            None,
            format!("未知仓库样式 {} 被分配 {} 个", wp, total),
        ));
    }

    // 单波次区间
    for b in BatchIndex::all(stage1.max_batches()) {
        let mut packages = 0u64;
        let mut goods = 0u64;
        if let Some(counts) = stage1.batch_counts(b) {
            for (wp, count) in counts {
                packages = packages.saturating_add(*count);
                let quantity = catalog.ware_pattern(*wp).map(|p| p.quantity()).unwrap_or(0);
                goods = goods.saturating_add(count.saturating_mul(quantity));
            }
        }
        check_batch_band(config, stage1.is_used(b), b, packages, goods, &mut violations);
    }

    violations
}

/// 阶段二复核（含跨阶段一致性）
pub fn check_stage2(
    catalog: &PatternCatalog,
    config: &BatchOptConfig,
    stage1: &Stage1Result,
    stage2: &Stage2Result,
) -> Vec<PlanViolation> {
    let mut violations = Vec::new();

    // 库区样式守恒
    let mut placed: BTreeMap<_, u64> = BTreeMap::new();
    for counts in stage2.assignments().values() {
        for (ap, count) in counts {
            let total = placed.entry(*ap).or_default();
            *total = total.saturating_add(*count);
        }
    }
    for pattern in catalog.area_patterns() {
        let total = placed.remove(&pattern.id).unwrap_or(0);
        if total != pattern.package_count {
            violations.push(PlanViolation::new(
                ConstraintFamily::AreaConservation,
                None,
                format!(
                    "库区样式 {} 分配 {} 个,源数据 {} 个",
                    pattern.key, total, pattern.package_count
                ),
            ));
        }
    }
    for (ap, total) in placed {
        violations.push(PlanViolation::new(
            ConstraintFamily::AreaConservation,
            None,
            format!("未知库区样式 {} 被分配 {} 个", ap, total),
        ));
    }

    for b in BatchIndex::all(stage1.max_batches()) {
        let empty = BTreeMap::new();
        let area_counts = stage2.batch_counts(b).unwrap_or(&empty);

        // 饱和累加: 溢出值必然落在区间外
        let packages = area_counts
            .values()
            .fold(0u64, |acc, count| acc.saturating_add(*count));
        let goods = area_counts.iter().fold(0u64, |acc, (ap, count)| {
            let quantity = catalog.area_pattern(*ap).map(|p| p.quantity()).unwrap_or(0);
            acc.saturating_add(count.saturating_mul(quantity))
        });
        check_batch_band(config, stage1.is_used(b), b, packages, goods, &mut violations);

        // 跨阶段一致
        let Some(ware_counts) = stage1.batch_counts(b) else {
            continue;
        };
        for (wp, committed) in ware_counts {
            let Some(ware_pattern) = catalog.ware_pattern(*wp) else {
                continue;
            };
            let refined = ware_pattern
                .area_patterns
                .iter()
                .filter_map(|ap| area_counts.get(ap))
                .fold(0u64, |acc, count| acc.saturating_add(*count));
            if refined != *committed {
                violations.push(PlanViolation::new(
                    ConstraintFamily::WarePatternConsistency,
                    Some(b),
                    format!(
                        "仓库样式 {} 阶段一承诺 {} 个,阶段二细分 {} 个",
                        ware_pattern.key, committed, refined
                    ),
                ));
            }
        }
    }

    violations
}

/// 两阶段合并复核
pub fn check_plan(
    catalog: &PatternCatalog,
    config: &BatchOptConfig,
    stage1: &Stage1Result,
    stage2: &Stage2Result,
) -> Vec<PlanViolation> {
    let mut violations = check_stage1(catalog, config, stage1);
    violations.extend(check_stage2(catalog, config, stage1, stage2));
    violations
}

fn check_batch_band(
    config: &BatchOptConfig,
    used: bool,
    batch: BatchIndex,
    packages: u64,
    goods: u64,
    violations: &mut Vec<PlanViolation>,
) {
    if !used {
        if packages > 0 || goods > 0 {
            violations.push(PlanViolation::new(
                ConstraintFamily::PackageCount,
                Some(batch),
                format!("未使用波次分配了 {} 个包裹 / {} 件商品", packages, goods),
            ));
        }
        return;
    }

    if !config.package_count_range.contains(packages) {
        violations.push(PlanViolation::new(
            ConstraintFamily::PackageCount,
            Some(batch),
            format!("包裹数 {} 不在 {} 内", packages, config.package_count_range),
        ));
    }
    if !config.goods_quantity_range.contains(goods) {
        violations.push(PlanViolation::new(
            ConstraintFamily::GoodsQuantity,
            Some(batch),
            format!("商品件数 {} 不在 {} 内", goods, config.goods_quantity_range),
        ));
    }
}
