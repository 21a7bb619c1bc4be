// ==========================================
// 仓库库位分配系统 - 出库单解析器
// ==========================================
// 职责: SheetMatrix → Vec<OutboundLine>
// 约定: 第 0 行为表头; 目的地列与托盘列均为必需
// ==========================================

use crate::domain::sheet::SheetMatrix;
use crate::domain::shipment::OutboundLine;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::header_rules::{OUTBOUND_DESTINATION_COLUMN, OUTBOUND_PALLET_COLUMN};

pub struct OutboundSheetParser;

impl OutboundSheetParser {
    pub fn parse(&self, matrix: &SheetMatrix) -> ImportResult<Vec<OutboundLine>> {
        if matrix.is_empty() {
            return Err(ImportError::EmptySheet);
        }

        let headers = matrix.row_texts(0);
        let destination_col = OUTBOUND_DESTINATION_COLUMN
            .find_column(&headers)
            .ok_or(ImportError::NoDestinationColumn)?;
        let pallet_col = OUTBOUND_PALLET_COLUMN
            .find_column(&headers)
            .ok_or(ImportError::NoPalletColumn)?;

        let mut lines = Vec::new();
        for row_index in 1..matrix.len() {
            if matrix.is_blank_row(row_index) {
                continue;
            }
            let Some(pallets) = matrix.cell(row_index, pallet_col).as_positive_pallets() else {
                continue;
            };
            let destination = matrix.cell(row_index, destination_col).trimmed_text();
            if destination.is_empty() {
                continue;
            }
            lines.push(OutboundLine::new(destination, pallets));
        }

        tracing::info!("出库单解析完成: 有效行{}", lines.len());
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_outbound_rows() {
        let m = SheetMatrix::from_text_rows(vec![
            vec!["单号", "目的地", "托盘数"],
            vec!["O1", "Walmart-DC1", "5"],
            vec!["O2", "LAX9", "0"],
            vec!["O3", "", "2"],
            vec!["", "", ""],
            vec!["O4", "tiktok", "1.5"],
        ]);
        let lines = OutboundSheetParser.parse(&m).unwrap();
        assert_eq!(
            lines,
            vec![OutboundLine::new("Walmart-DC1", 5), OutboundLine::new("tiktok", 2)]
        );
    }

    #[test]
    fn test_pallet_column_required() {
        let m = SheetMatrix::from_text_rows(vec![vec!["Destination", "Remark"], vec!["LAX9", "x"]]);
        assert!(matches!(OutboundSheetParser.parse(&m), Err(ImportError::NoPalletColumn)));
    }

    #[test]
    fn test_destination_column_required() {
        let m = SheetMatrix::from_text_rows(vec![vec!["Pallets"], vec!["3"]]);
        assert!(matches!(OutboundSheetParser.parse(&m), Err(ImportError::NoDestinationColumn)));
    }
}
