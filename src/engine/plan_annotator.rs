// ==========================================
// 仓库库位分配系统 - 卸柜计划回写
// ==========================================
// 职责: 将分配结果写回原表 (建议库位列)
// 规则: 已有 "建议库位" 列则复用, 否则在表头行末尾追加
// 红线: 不改动原表其他单元格; 未分配行写空值
// ==========================================

use crate::domain::sheet::CellValue;
use crate::domain::shipment::{AnnotatedPlan, ShipmentLine, UnloadPlan};
use crate::importer::header_rules::{SUGGESTED_LOCATION_COLUMN, SUGGESTED_LOCATION_HEADER};

pub struct PlanAnnotator;

impl PlanAnnotator {
    pub fn annotate(&self, plan: &UnloadPlan, lines: &[ShipmentLine]) -> AnnotatedPlan {
        let mut matrix = plan.matrix.clone();
        let header_row_index = plan.header_row_index;

        let headers = matrix.row_texts(header_row_index);
        let location_column = match SUGGESTED_LOCATION_COLUMN.find_column(&headers) {
            Some(col) => col,
            None => {
                let col = matrix.row(header_row_index).map_or(0, |r| r.len());
                matrix.set_cell(
                    header_row_index,
                    col,
                    CellValue::text(SUGGESTED_LOCATION_HEADER),
                );
                col
            }
        };

        for line in lines {
            let value = line
                .assigned_slot
                .as_deref()
                .map(CellValue::text)
                .unwrap_or_default();
            matrix.set_cell(line.source_row_index, location_column, value);
        }

        AnnotatedPlan {
            header_row_index,
            location_column,
            matrix,
        }
    }
}
