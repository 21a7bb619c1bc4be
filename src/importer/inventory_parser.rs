// ==========================================
// 仓库库位分配系统 - 盘点单解析器
// ==========================================
// 职责: SheetMatrix → Vec<InventoryLine>
// 约定: 第 0 行为表头; 库位列 + 数量列 (Pallets > 托盘 > Quantity > 数量)
// 约定: 数量逐行取第一个非空的数量列
// ==========================================

use crate::domain::sheet::SheetMatrix;
use crate::domain::shipment::InventoryLine;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::header_rules::{
    find_columns_by_priority, INVENTORY_LOCATION_COLUMN, INVENTORY_QUANTITY_COLUMNS,
};

pub struct InventorySheetParser;

impl InventorySheetParser {
    pub fn parse(&self, matrix: &SheetMatrix) -> ImportResult<Vec<InventoryLine>> {
        if matrix.is_empty() {
            return Err(ImportError::EmptySheet);
        }

        let headers = matrix.row_texts(0);
        let location_col = INVENTORY_LOCATION_COLUMN
            .find_column(&headers)
            .ok_or(ImportError::NoLocationColumn)?;
        let quantity_cols = find_columns_by_priority(INVENTORY_QUANTITY_COLUMNS, &headers);
        if quantity_cols.is_empty() {
            return Err(ImportError::NoPalletColumn);
        }

        let mut lines = Vec::new();
        for row_index in 1..matrix.len() {
            let slot_id = matrix.cell(row_index, location_col).trimmed_text();
            if slot_id.is_empty() {
                continue;
            }
            // 盘点数量允许为 0（清空库位）
            let Some(quantity) = quantity_cols
                .iter()
                .map(|&col| matrix.cell(row_index, col))
                .find(|cell| !cell.is_blank())
                .and_then(|cell| cell.as_number())
                .filter(|n| *n >= 0.0)
            else {
                tracing::debug!(row_index, slot_id = %slot_id, "盘点数量无效, 跳过");
                continue;
            };
            lines.push(InventoryLine {
                slot_id,
                pallets: quantity.ceil().min(u32::MAX as f64) as u32,
            });
        }

        tracing::info!("盘点单解析完成: 有效行{}", lines.len());
        Ok(lines)
    }
}
