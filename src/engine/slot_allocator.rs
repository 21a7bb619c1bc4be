// ==========================================
// 仓库库位分配系统 - 库位分配引擎
// ==========================================
// 红线: 托盘上限与目的地上限为硬约束, 评分只在合格库位间比较
// ==========================================
// 职责: 按输入顺序为卸柜行选择库位
// 输入: 卸柜行列表 + 库位台账 (就地修改)
// 输出: 带 assigned_slot 的卸柜行 + 未分配原因
// ==========================================
// 顺序语义: 每行分配成功后立即更新台账 (托盘数/目的地),
// 后续行看到的是更新后的台账。调整输入顺序可能改变结果, 这是预期行为。
// ==========================================

use crate::config::AllocationConfig;
use crate::domain::shipment::ShipmentLine;
use crate::domain::slot::{Slot, SlotConstraint};
use crate::domain::types::DestinationCategory;
use crate::engine::destination_classifier::DestinationClassifier;
use serde::{Deserialize, Serialize};
use tracing::instrument;

// ==========================================
// 结果类型
// ==========================================

/// 未分配行（正常业务结果, 不是错误）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedLine {
    pub source_row_index: usize,
    pub destination: String,
    pub pallets: u32,
    pub destination_category: DestinationCategory,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    /// 与输入等长、同序
    pub lines: Vec<ShipmentLine>,
    pub skipped: Vec<SkippedLine>,
}

impl AllocationResult {
    pub fn assigned_count(&self) -> usize {
        self.lines.iter().filter(|l| l.is_assigned()).count()
    }

    pub fn unassigned_count(&self) -> usize {
        self.lines.len() - self.assigned_count()
    }
}

/// 候选库位被硬过滤的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateRejection {
    CapacityExceeded,
    DestinationLimitReached,
}

// ==========================================
// SlotAllocator - 库位分配引擎
// ==========================================
pub struct SlotAllocator {
    classifier: DestinationClassifier,
    config: AllocationConfig,
}

impl SlotAllocator {
    pub fn new() -> Self {
        Self::with_config(AllocationConfig::default())
    }

    pub fn with_config(config: AllocationConfig) -> Self {
        Self {
            classifier: DestinationClassifier::new(),
            config,
        }
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 为卸柜行分配库位
    ///
    /// 规则：
    /// 1) 目的地分类 → 可放库位类型
    /// 2) 硬过滤: 托盘超上限 / 新目的地且目的地已满
    /// 3) 评分: 同目的地 +consolidate_bonus, 否则空库位 +clean_slot_bonus;
    ///    当前占用率 > 阈值时 -high_utilization_penalty
    /// 4) 最高分胜出, 同分取台账中靠前者
    /// 5) 成功后立即更新台账
    ///
    /// # 参数
    /// - `lines`: 卸柜行（按处理顺序）
    /// - `ledger`: 库位台账（会被修改）
    #[instrument(skip(self, lines, ledger), fields(
        lines_count = lines.len(),
        slots_count = ledger.len()
    ))]
    pub fn assign(&self, lines: &[ShipmentLine], ledger: &mut [Slot]) -> AllocationResult {
        let mut assigned_lines = Vec::with_capacity(lines.len());
        let mut skipped = Vec::new();

        for line in lines {
            let mut line = line.clone();
            line.assigned_slot = None;
            let pallets = line.pallets.max(1);
            let category = self.classifier.classify(&line.destination);

            match self.find_best_slot(&line.destination, pallets, category, ledger) {
                Ok(index) => {
                    let slot = &mut ledger[index];
                    let reason = self.assign_reason(slot, &line.destination);
                    slot.pallet_occupancy = slot.pallet_occupancy.saturating_add(pallets);
                    slot.add_destination(&line.destination);

                    tracing::debug!(
                        row = line.source_row_index,
                        destination = %line.destination,
                        slot_id = %slot.id,
                        pallets,
                        reason,
                        "已分配库位"
                    );
                    line.assigned_slot = Some(slot.id.clone());
                }
                Err(reason) => {
                    tracing::debug!(
                        row = line.source_row_index,
                        destination = %line.destination,
                        %reason,
                        "未找到可用库位"
                    );
                    skipped.push(SkippedLine {
                        source_row_index: line.source_row_index,
                        destination: line.destination.clone(),
                        pallets,
                        destination_category: category,
                        reason,
                    });
                }
            }

            assigned_lines.push(line);
        }

        let result = AllocationResult {
            lines: assigned_lines,
            skipped,
        };
        tracing::info!(
            "库位分配完成: 共{}行, 已分配{}行, 未分配{}行",
            result.lines.len(),
            result.assigned_count(),
            result.unassigned_count()
        );
        result
    }

    /// 硬过滤单个候选库位
    pub fn check_candidate(
        &self,
        slot: &Slot,
        destination: &str,
        pallets: u32,
    ) -> Result<(), CandidateRejection> {
        if !slot.can_add_pallets(pallets) {
            return Err(CandidateRejection::CapacityExceeded);
        }
        if !slot.has_destination(destination) && slot.is_destination_full() {
            return Err(CandidateRejection::DestinationLimitReached);
        }
        Ok(())
    }

    /// 候选库位评分（占用率按当前值计算, 不按放入后计算）
    pub fn score(&self, slot: &Slot, destination: &str) -> i64 {
        let mut score = 0;

        if slot.has_destination(destination) {
            score += self.config.consolidate_bonus;
        } else if slot.destination_tags.is_empty() {
            score += self.config.clean_slot_bonus;
        }

        if let Some(ratio) = slot.utilization_ratio() {
            if ratio > self.config.high_utilization_threshold {
                score -= self.config.high_utilization_penalty;
            }
        }

        score
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 返回最佳库位下标, 或未分配原因
    fn find_best_slot(
        &self,
        destination: &str,
        pallets: u32,
        category: DestinationCategory,
        ledger: &[Slot],
    ) -> Result<usize, String> {
        let mut best: Option<(usize, i64)> = None;
        let mut compatible = 0usize;
        let mut capacity_rejected = 0usize;
        let mut dest_limit_rejected = 0usize;

        for (index, slot) in ledger.iter().enumerate() {
            if !category.accepts(slot.category) {
                continue;
            }
            compatible += 1;

            match self.check_candidate(slot, destination, pallets) {
                Err(CandidateRejection::CapacityExceeded) => {
                    capacity_rejected += 1;
                    continue;
                }
                Err(CandidateRejection::DestinationLimitReached) => {
                    dest_limit_rejected += 1;
                    continue;
                }
                Ok(()) => {}
            }

            let score = self.score(slot, destination);
            // 严格大于: 同分保留先出现的库位
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((index, score));
            }
        }

        match best {
            Some((index, _)) => Ok(index),
            None if compatible == 0 => Err(format!("NO_COMPATIBLE_SLOT: category={}", category)),
            None => Err(format!(
                "NO_ELIGIBLE_SLOT: category={}, compatible={}, capacity_rejected={}, dest_limit_rejected={}",
                category, compatible, capacity_rejected, dest_limit_rejected
            )),
        }
    }

    /// 分配原因（仅用于日志）
    fn assign_reason(&self, slot: &Slot, destination: &str) -> &'static str {
        if slot.has_destination(destination) {
            "CONSOLIDATE_SAME_DEST"
        } else if slot.destination_tags.is_empty() {
            "CLEAN_SLOT"
        } else {
            "SHARED_SLOT"
        }
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for SlotAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::SlotCategory;

    fn slot(id: &str, category: SlotCategory, capacity: Option<u32>, occupancy: u32) -> Slot {
        let mut slot = Slot::new(id, category);
        slot.pallet_capacity = capacity;
        slot.pallet_occupancy = occupancy;
        slot
    }

    #[test]
    fn test_score_components() {
        let allocator = SlotAllocator::new();

        let empty = slot("A01", SlotCategory::Amz2, Some(10), 0);
        assert_eq!(allocator.score(&empty, "Amazon-LAX9 Total"), 500);

        let mut same = slot("A02", SlotCategory::Amz2, Some(10), 2);
        same.add_destination("Amazon-LAX9 Total");
        assert_eq!(allocator.score(&same, "Amazon-LAX9 Total"), 1000);

        let mut other = slot("A03", SlotCategory::Amz2, Some(10), 2);
        other.add_destination("Amazon-ONT8 Total");
        assert_eq!(allocator.score(&other, "Amazon-LAX9 Total"), 0);

        // 占用率 0.9 > 0.8
        let mut busy = slot("A04", SlotCategory::Amz2, Some(10), 9);
        busy.add_destination("Amazon-LAX9 Total");
        assert_eq!(allocator.score(&busy, "Amazon-LAX9 Total"), 800);

        // 恰好 0.8 不扣分
        let edge = slot("A05", SlotCategory::Amz2, Some(10), 8);
        assert_eq!(allocator.score(&edge, "Amazon-LAX9 Total"), 500);
    }

    #[test]
    fn test_check_candidate() {
        let allocator = SlotAllocator::new();

        let full = slot("B01", SlotCategory::Amz2, Some(2), 2);
        assert_eq!(
            allocator.check_candidate(&full, "Amazon-LAX9 Total", 1),
            Err(CandidateRejection::CapacityExceeded)
        );

        let mut two_dests = slot("B02", SlotCategory::Amz2, None, 0);
        two_dests.add_destination("X1");
        two_dests.add_destination("X2");
        assert_eq!(
            allocator.check_candidate(&two_dests, "X3", 1),
            Err(CandidateRejection::DestinationLimitReached)
        );
        assert_eq!(allocator.check_candidate(&two_dests, "X1", 1), Ok(()));
    }

    #[test]
    fn test_tie_breaks_to_first_slot() {
        let allocator = SlotAllocator::new();
        let mut ledger = vec![
            slot("D01", SlotCategory::Buffer, None, 0),
            slot("D02", SlotCategory::Buffer, None, 0),
        ];
        let lines = vec![ShipmentLine::new("Amazon-LAX9 Total", 1, 3)];

        let result = allocator.assign(&lines, &mut ledger);
        assert_eq!(result.lines[0].assigned_slot.as_deref(), Some("D01"));
    }

    #[test]
    fn test_no_compatible_slot_reason() {
        let allocator = SlotAllocator::new();
        let mut ledger = vec![slot("A45", SlotCategory::Sehin, None, 0)];
        let lines = vec![ShipmentLine::new("walmart", 1, 1)];

        let result = allocator.assign(&lines, &mut ledger);
        assert_eq!(result.unassigned_count(), 1);
        assert!(result.skipped[0].reason.starts_with("NO_COMPATIBLE_SLOT"));
        assert_eq!(ledger[0].pallet_occupancy, 0);
    }

    #[test]
    fn test_rejected_match_never_worsens_existing_violation() {
        let allocator = SlotAllocator::new();
        // 导入数据自带超限: 3 个目的地 > 上限 2, 托盘 5 > 上限 4
        let mut over = slot("A10", SlotCategory::Amz2, Some(4), 5);
        over.destination_tags = vec!["X1".into(), "X2".into(), "X3".into()];
        let mut ledger = vec![over.clone()];

        let lines = vec![
            ShipmentLine::new("Amazon-NEW1", 1, 1),
            ShipmentLine::new("X1", 1, 2),
        ];
        let result = allocator.assign(&lines, &mut ledger);

        assert_eq!(result.assigned_count(), 0);
        assert_eq!(ledger[0], over);
        assert!(result.skipped[0].reason.contains("compatible=1"));
    }
}
