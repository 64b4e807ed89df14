// ==========================================
// 波次分配系统 - 关联约束大 M 取值
// ==========================================
// GLOBAL:       M = 包裹总数
// PER_LOCATION: M = min(经过该库位的包裹数, 单波次容量上界)
// 两种取值都是 Σx 的合法上界,后者更紧
// ==========================================

use crate::config::{BatchOptConfig, BigMPolicy};
use crate::domain::{AreaIdx, PatternCatalog, WarehouseIdx};

/// 阶段一: 波次-仓库关联约束的 M
pub fn warehouse_touch_bound(
    catalog: &PatternCatalog,
    config: &BatchOptConfig,
    warehouse: WarehouseIdx,
) -> u64 {
    match config.big_m_policy {
        BigMPolicy::Global => catalog.package_count(),
        BigMPolicy::PerLocation => {
            let touching: u64 = catalog
                .ware_patterns()
                .iter()
                .filter(|p| p.key.contains(warehouse))
                .map(|p| p.package_count)
                .sum();
            touching.min(config.package_count_range.max)
        }
    }
}

/// 阶段二: 波次-库区关联约束的 M
///
/// `batch_total` 为该波次在阶段一承诺的包裹总数
pub fn area_touch_bound(
    catalog: &PatternCatalog,
    policy: BigMPolicy,
    area: AreaIdx,
    batch_total: u64,
) -> u64 {
    match policy {
        BigMPolicy::Global => catalog.package_count(),
        BigMPolicy::PerLocation => {
            let touching: u64 = catalog
                .area_patterns()
                .iter()
                .filter(|p| p.key.contains(area))
                .map(|p| p.package_count)
                .sum();
            touching.min(batch_total)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CountRange;
    use crate::domain::RawPackageRecord;
    use crate::engine::PatternAggregator;

    fn catalog() -> PatternCatalog {
        let records = vec![
            RawPackageRecord::new("P1", 2, "W1-A1", 2),
            RawPackageRecord::new("P2", 2, "W1-A1", 3),
            RawPackageRecord::new("P3", 3, "W1-A2", 4),
            RawPackageRecord::new("P4", 3, "W2-A3", 5),
        ];
        PatternAggregator::new().aggregate(&records).unwrap()
    }

    #[test]
    fn test_global_bound_is_package_total() {
        let config = BatchOptConfig {
            big_m_policy: BigMPolicy::Global,
            ..BatchOptConfig::default()
        };
        assert_eq!(warehouse_touch_bound(&catalog(), &config, WarehouseIdx::new(2)), 4);
        assert_eq!(
            area_touch_bound(&catalog(), BigMPolicy::Global, AreaIdx::new(1), 1),
            4
        );
    }

    #[test]
    fn test_per_location_bound_is_tighter() {
        let config = BatchOptConfig {
            package_count_range: CountRange::new(1, 2),
            big_m_policy: BigMPolicy::PerLocation,
            ..BatchOptConfig::default()
        };
        let catalog = catalog();
        // W1 被 3 个包裹经过,但单波次最多 2 个
        assert_eq!(warehouse_touch_bound(&catalog, &config, WarehouseIdx::new(1)), 2);
        assert_eq!(warehouse_touch_bound(&catalog, &config, WarehouseIdx::new(2)), 1);
        // A1 被 2 个包裹经过
        assert_eq!(
            area_touch_bound(&catalog, BigMPolicy::PerLocation, AreaIdx::new(1), 4),
            2
        );
        assert_eq!(
            area_touch_bound(&catalog, BigMPolicy::PerLocation, AreaIdx::new(1), 1),
            1
        );
    }
}
