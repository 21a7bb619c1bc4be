// ==========================================
// 仓库库位分配系统 - 卸柜单解析器
// ==========================================
// 职责: SheetMatrix → UnloadPlan
// 流程: 柜号扫描 → 表头行定位 → 目的地列/托盘列定位 → 行提取
// 红线: 表头位置不固定, 一律按规则表启发式定位; 空目的地行静默丢弃
// ==========================================

use crate::config::AllocationConfig;
use crate::domain::sheet::SheetMatrix;
use crate::domain::shipment::{ShipmentLine, UnloadPlan};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::header_rules::{
    CONTAINER_MARKER, UNLOAD_DESTINATION_COLUMN, UNLOAD_HEADER_ROW, UNLOAD_PALLET_COLUMN,
};
use tracing::instrument;

pub struct UnloadSheetParser {
    container_scan_rows: usize,
    header_scan_rows: usize,
}

impl UnloadSheetParser {
    pub fn new() -> Self {
        Self::from_config(&AllocationConfig::default())
    }

    pub fn from_config(config: &AllocationConfig) -> Self {
        Self {
            container_scan_rows: config.container_scan_rows,
            header_scan_rows: config.header_scan_rows,
        }
    }

    #[instrument(skip(self, matrix), fields(rows = matrix.len()))]
    pub fn parse(&self, matrix: &SheetMatrix) -> ImportResult<UnloadPlan> {
        if matrix.is_empty() {
            return Err(ImportError::EmptySheet);
        }

        // 1. 柜号（可选）
        let container_id = self.find_container_id(matrix);

        // 2. 表头行
        let header_row_index = self
            .find_header_row(matrix)
            .ok_or(ImportError::NoHeaderFound {
                scanned_rows: self.header_scan_rows.min(matrix.len()),
            })?;
        let headers = matrix.row_texts(header_row_index);

        // 3. 目的地列（必需）/ 托盘列（可选, 缺省每行 1 托）
        let destination_col = UNLOAD_DESTINATION_COLUMN
            .find_column(&headers)
            .ok_or(ImportError::NoDestinationColumn)?;
        let pallet_col = UNLOAD_PALLET_COLUMN.find_column(&headers);
        if pallet_col.is_none() {
            tracing::debug!("未识别托盘列, 每行按 1 托处理");
        }

        // 4. 行提取
        let mut lines = Vec::new();
        let mut dropped_rows = 0usize;
        for row_index in (header_row_index + 1)..matrix.len() {
            if matrix.is_blank_row(row_index) {
                continue;
            }

            let destination = matrix.cell(row_index, destination_col).trimmed_text();
            if destination.is_empty() {
                // 汇总行/页脚行
                dropped_rows += 1;
                continue;
            }

            let pallets = pallet_col
                .and_then(|col| matrix.cell(row_index, col).as_positive_pallets())
                .unwrap_or(1);

            lines.push(
                ShipmentLine::new(destination, pallets, row_index)
                    .with_container(container_id.clone()),
            );
        }

        tracing::info!(
            header_row = header_row_index,
            destination_col,
            pallet_col = ?pallet_col,
            container_id = ?container_id,
            "卸柜单解析完成: 有效行{}, 丢弃空目的地行{}",
            lines.len(),
            dropped_rows
        );

        Ok(UnloadPlan {
            header_row_index,
            headers,
            lines,
            container_id,
            matrix: matrix.clone(),
        })
    }

    /// 前 N 行内首个可提取的柜号
    fn find_container_id(&self, matrix: &SheetMatrix) -> Option<String> {
        for row_index in 0..self.container_scan_rows.min(matrix.len()) {
            let cells = matrix.row(row_index).unwrap_or_default();
            for (col, cell) in cells.iter().enumerate() {
                let text = cell.trimmed_text();
                if !CONTAINER_MARKER.matches(&text) {
                    continue;
                }
                if let Some(value) = Self::value_after_colon(&text) {
                    return Some(value);
                }
                let next = matrix.cell(row_index, col + 1).trimmed_text();
                if !next.is_empty() {
                    return Some(next);
                }
            }
        }
        None
    }

    /// "柜号：XXXX" / "Container No: XXXX" → "XXXX"（首个冒号之后的全部内容）
    fn value_after_colon(text: &str) -> Option<String> {
        let (_, rest) = text.split_once([':', '：'])?;
        let value = rest.trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    fn find_header_row(&self, matrix: &SheetMatrix) -> Option<usize> {
        (0..self.header_scan_rows.min(matrix.len())).find(|&row_index| {
            matrix
                .row(row_index)
                .unwrap_or_default()
                .iter()
                .any(|cell| UNLOAD_HEADER_ROW.matches(&cell.trimmed_text()))
        })
    }
}

impl Default for UnloadSheetParser {
    fn default() -> Self {
        Self::new()
    }
}
