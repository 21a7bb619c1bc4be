// ==========================================
// 仓库库位分配系统 - 盘点覆盖
// ==========================================
// 职责: 用盘点数量覆盖库位当前托盘数
// 红线: 只改托盘数, 不动目的地标签; 未知库位只记录不报错
// ==========================================

use crate::domain::shipment::InventoryLine;
use crate::domain::slot::Slot;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::instrument;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InventoryApplyReport {
    pub updated: usize,
    pub unknown_slot_ids: Vec<String>,
}

pub struct InventoryApplier;

impl InventoryApplier {
    #[instrument(skip(self, lines, ledger), fields(lines_count = lines.len()))]
    pub fn apply(&self, lines: &[InventoryLine], ledger: &mut [Slot]) -> InventoryApplyReport {
        let index: HashMap<String, usize> = ledger
            .iter()
            .enumerate()
            .map(|(i, slot)| (slot.id.clone(), i))
            .collect();

        let mut report = InventoryApplyReport::default();
        for line in lines {
            match index.get(&line.slot_id) {
                Some(&i) => {
                    ledger[i].pallet_occupancy = line.pallets;
                    report.updated += 1;
                }
                None => {
                    tracing::warn!(slot_id = %line.slot_id, "盘点单中的库位不存在于台账");
                    report.unknown_slot_ids.push(line.slot_id.clone());
                }
            }
        }

        tracing::info!(
            "盘点覆盖完成: 更新{}个库位, 未知库位{}个",
            report.updated,
            report.unknown_slot_ids.len()
        );
        report
    }
}
