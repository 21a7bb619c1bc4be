// ==========================================
// 仓库库位分配系统 - 台账统计引擎
// ==========================================
// 职责: 台账 → 总量/占用率/超限库位数/按类型/按分区/按目的地统计
// 口径: 不限托盘的库位上限按 0 计入总容量
// ==========================================

use crate::domain::slot::{Slot, SlotConstraint};
use crate::domain::types::SlotCategory;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 负载等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadLevel {
    Low,      // < 50%
    Moderate, // 50% ~ 80%
    High,     // 80% ~ 95%
    Critical, // >= 95%
}

impl LoadLevel {
    pub fn from_percent(pct: u32) -> Self {
        match pct {
            0..=49 => LoadLevel::Low,
            50..=79 => LoadLevel::Moderate,
            80..=94 => LoadLevel::High,
            _ => LoadLevel::Critical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStats {
    pub name: String,
    pub slot_count: usize,
    pub occupancy: u64,
    pub capacity: u64,
    pub utilization_pct: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationCount {
    pub destination: String,
    pub slot_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub total_slots: usize,
    pub total_capacity: u64,
    pub total_occupancy: u64,
    pub utilization_pct: u32,
    pub load_level: LoadLevel,
    pub over_destination_limit: usize,
    /// 托盘数超过上限的库位数（盘点覆盖可能带入）
    pub over_capacity: usize,
    pub by_category: Vec<GroupStats>,
    pub by_zone: Vec<GroupStats>,
    pub destination_counts: Vec<DestinationCount>,
}

#[derive(Default)]
struct Accumulator {
    slot_count: usize,
    occupancy: u64,
    capacity: u64,
}

impl Accumulator {
    fn add(&mut self, slot: &Slot) {
        self.slot_count += 1;
        self.occupancy += slot.pallet_occupancy as u64;
        self.capacity += slot.pallet_capacity.unwrap_or(0) as u64;
    }

    fn into_stats(self, name: String) -> GroupStats {
        GroupStats {
            name,
            slot_count: self.slot_count,
            occupancy: self.occupancy,
            capacity: self.capacity,
            utilization_pct: percent(self.occupancy, self.capacity),
        }
    }
}

/// 四舍五入百分比, 分母为 0 时为 0
fn percent(occupancy: u64, capacity: u64) -> u32 {
    if capacity == 0 {
        return 0;
    }
    ((occupancy as f64 / capacity as f64) * 100.0).round() as u32
}

pub struct LedgerStatsEngine;

impl LedgerStatsEngine {
    pub fn compute(&self, ledger: &[Slot]) -> LedgerStats {
        let mut total = Accumulator::default();
        let mut over_destination_limit = 0;
        let mut over_capacity = 0;
        let mut categories: BTreeMap<SlotCategory, Accumulator> = BTreeMap::new();
        let mut zones: BTreeMap<char, Accumulator> = BTreeMap::new();
        let mut destinations: BTreeMap<&str, usize> = BTreeMap::new();

        for slot in ledger {
            total.add(slot);
            if slot.is_over_destination_limit() {
                over_destination_limit += 1;
            }
            if slot.is_over_capacity() {
                over_capacity += 1;
            }

            categories.entry(slot.category).or_default().add(slot);

            // 分区 = 库位编码首字母
            if let Some(zone) = slot
                .id
                .chars()
                .next()
                .map(|c| c.to_ascii_uppercase())
                .filter(|c| c.is_ascii_uppercase())
            {
                zones.entry(zone).or_default().add(slot);
            }

            let unique: BTreeSet<&str> = slot
                .destination_tags
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .collect();
            for tag in unique {
                *destinations.entry(tag).or_insert(0) += 1;
            }
        }

        let mut destination_counts: Vec<DestinationCount> = destinations
            .into_iter()
            .map(|(destination, slot_count)| DestinationCount {
                destination: destination.to_string(),
                slot_count,
            })
            .collect();
        // 数量降序; BTreeMap 已按名称升序, 稳定排序保持同数时的名称顺序
        destination_counts.sort_by(|a, b| b.slot_count.cmp(&a.slot_count));

        let utilization_pct = percent(total.occupancy, total.capacity);
        LedgerStats {
            total_slots: total.slot_count,
            total_capacity: total.capacity,
            total_occupancy: total.occupancy,
            utilization_pct,
            load_level: LoadLevel::from_percent(utilization_pct),
            over_destination_limit,
            over_capacity,
            by_category: categories
                .into_iter()
                .map(|(category, acc)| acc.into_stats(category.to_string()))
                .collect(),
            by_zone: zones
                .into_iter()
                .map(|(zone, acc)| acc.into_stats(zone.to_string()))
                .collect(),
            destination_counts,
        }
    }
}
