// ==========================================
// 仓库库位分配系统 - 出库扣减引擎
// ==========================================
// 职责: 按出库行目的地从库位扣减托盘
// 规则: 目的地标签子串匹配; 每轮取当前托盘最多的库位; 扣到满足或无货
// 红线: 托盘数不得为负; 不新增目的地标签; 供货不足不是错误
// ==========================================

use crate::domain::shipment::OutboundLine;
use crate::domain::slot::Slot;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// 单次扣减记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deduction {
    pub slot_id: String,
    pub destination: String,
    pub pallets: u32,
}

/// 未能扣足的出库行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub destination: String,
    pub requested: u32,
    pub remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub total_deducted: u64,
    pub deductions: Vec<Deduction>,
    pub shortfalls: Vec<Shortfall>,
}

pub struct OutboundReconciler;

impl OutboundReconciler {
    pub fn new() -> Self {
        Self
    }

    /// 执行出库扣减（就地修改台账）
    #[instrument(skip(self, lines, ledger), fields(
        lines_count = lines.len(),
        slots_count = ledger.len()
    ))]
    pub fn reconcile(&self, lines: &[OutboundLine], ledger: &mut [Slot]) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for line in lines {
            let destination = line.destination.trim();
            let mut remaining = line.pallets;

            if !destination.is_empty() {
                while remaining > 0 {
                    let Some(index) = Self::largest_matching_slot(destination, ledger) else {
                        break;
                    };
                    let slot = &mut ledger[index];
                    let take = remaining.min(slot.pallet_occupancy);
                    slot.pallet_occupancy -= take;
                    remaining -= take;
                    report.total_deducted += take as u64;

                    tracing::debug!(
                        slot_id = %slot.id,
                        destination,
                        take,
                        remaining,
                        "出库扣减"
                    );
                    report.deductions.push(Deduction {
                        slot_id: slot.id.clone(),
                        destination: destination.to_string(),
                        pallets: take,
                    });
                }
            }

            if remaining > 0 {
                report.shortfalls.push(Shortfall {
                    destination: destination.to_string(),
                    requested: line.pallets,
                    remaining,
                });
            }
        }

        tracing::info!(
            "出库扣减完成: 共{}行, 扣减{}托, 未扣足{}行",
            lines.len(),
            report.total_deducted,
            report.shortfalls.len()
        );
        report
    }

    /// 含该目的地且托盘数 > 0 的库位中托盘最多者（同数取台账靠前者）
    fn largest_matching_slot(destination: &str, ledger: &[Slot]) -> Option<usize> {
        let mut best: Option<(usize, u32)> = None;
        for (index, slot) in ledger.iter().enumerate() {
            if slot.pallet_occupancy == 0 || !slot.has_destination_containing(destination) {
                continue;
            }
            if best.map_or(true, |(_, occupancy)| slot.pallet_occupancy > occupancy) {
                best = Some((index, slot.pallet_occupancy));
            }
        }
        best.map(|(index, _)| index)
    }
}

impl Default for OutboundReconciler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::SlotCategory;

    fn tagged(id: &str, occupancy: u32, tags: &[&str]) -> Slot {
        let mut slot = Slot::new(id, SlotCategory::Mixed);
        slot.pallet_occupancy = occupancy;
        slot.destination_tags = tags.iter().map(|t| t.to_string()).collect();
        slot
    }

    #[test]
    fn test_largest_first_then_next() {
        let mut ledger = vec![
            tagged("H01", 3, &["Walmart-DC1"]),
            tagged("H02", 4, &["Walmart-DC1"]),
        ];
        let report =
            OutboundReconciler::new().reconcile(&[OutboundLine::new("Walmart-DC1", 5)], &mut ledger);

        assert_eq!(report.total_deducted, 5);
        assert_eq!(report.deductions[0].slot_id, "H02");
        assert_eq!(report.deductions[0].pallets, 4);
        assert_eq!(report.deductions[1].slot_id, "H01");
        assert_eq!(report.deductions[1].pallets, 1);
        assert_eq!(ledger[0].pallet_occupancy, 2);
        assert_eq!(ledger[1].pallet_occupancy, 0);
        assert!(report.shortfalls.is_empty());
    }

    #[test]
    fn test_under_supply_is_partial_not_error() {
        let mut ledger = vec![tagged("H01", 2, &["tiktok"])];
        let report =
            OutboundReconciler::new().reconcile(&[OutboundLine::new("tiktok", 10)], &mut ledger);

        assert_eq!(report.total_deducted, 2);
        assert_eq!(ledger[0].pallet_occupancy, 0);
        assert_eq!(
            report.shortfalls,
            vec![Shortfall { destination: "tiktok".into(), requested: 10, remaining: 8 }]
        );
    }

    #[test]
    fn test_substring_match_and_tags_untouched() {
        let mut ledger = vec![tagged("V10", 6, &["Amazon-LAX9 Total", "walmart"])];
        let before_tags = ledger[0].destination_tags.clone();

        let report =
            OutboundReconciler::new().reconcile(&[OutboundLine::new("LAX9", 2)], &mut ledger);
        assert_eq!(report.total_deducted, 2);
        assert_eq!(ledger[0].pallet_occupancy, 4);
        assert_eq!(ledger[0].destination_tags, before_tags);
    }

    #[test]
    fn test_no_match_and_empty_destination() {
        let mut ledger = vec![tagged("H01", 5, &["walmart"])];
        let report = OutboundReconciler::new().reconcile(
            &[OutboundLine::new("wayfair", 1), OutboundLine::new("  ", 1)],
            &mut ledger,
        );
        assert_eq!(report.total_deducted, 0);
        assert_eq!(report.shortfalls.len(), 2);
        assert_eq!(ledger[0].pallet_occupancy, 5);
    }
}
