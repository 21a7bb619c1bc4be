// ==========================================
// 卸柜单解析集成测试
// ==========================================
// 测试目标: 验证表头启发式定位与行提取
// 覆盖范围: 柜号扫描、表头行定位、缺省托盘数、空目的地行丢弃、CSV 读取
// ==========================================

mod test_helpers;

use test_helpers::write_csv;
use warehouse_slotting::domain::sheet::{CellValue, SheetMatrix};
use warehouse_slotting::importer::{
    ImportError, SheetReader, UniversalSheetReader, UnloadSheetParser,
};

#[test]
fn test_missing_pallet_column_defaults_to_one() {
    let matrix = SheetMatrix::from_text_rows(vec![
        vec!["卸柜计划", "", "", ""],
        vec!["序号", "SO", "件数", "派送地址"],
        vec!["1", "SO001", "20", "Amazon-LAX9 Total"],
        vec!["2", "SO002", "15", ""],
        vec!["3", "SO003", "8", "Walmart-DC1"],
    ]);

    let plan = UnloadSheetParser::new().parse(&matrix).unwrap();

    assert_eq!(plan.header_row_index, 1);
    assert_eq!(plan.headers[3], "派送地址");
    let got: Vec<(String, u32, usize)> = plan
        .lines
        .iter()
        .map(|l| (l.destination.clone(), l.pallets, l.source_row_index))
        .collect();
    assert_eq!(
        got,
        vec![
            ("Amazon-LAX9 Total".to_string(), 1, 2),
            ("Walmart-DC1".to_string(), 1, 4),
        ]
    );
    assert_eq!(plan.matrix, matrix);
}

#[test]
fn test_manifest_with_mixed_cell_types() {
    let mut matrix = SheetMatrix::from_text_rows(vec![
        vec!["Container No:", "MSKU7654321"],
        vec![""],
        vec!["SO", "Destination", "Pallets"],
        vec!["SO001", "ONT8", ""],
        vec!["SO002", "  SBD1  ", ""],
    ]);
    matrix.set_cell(3, 2, CellValue::Number(3.0));
    matrix.set_cell(4, 2, CellValue::Number(2.4));

    let plan = UnloadSheetParser::new().parse(&matrix).unwrap();

    assert_eq!(plan.container_id.as_deref(), Some("MSKU7654321"));
    assert_eq!(plan.lines.len(), 2);
    assert_eq!(plan.lines[0].pallets, 3);
    assert_eq!(plan.lines[1].destination, "SBD1");
    assert_eq!(plan.lines[1].pallets, 3);
    assert!(plan
        .lines
        .iter()
        .all(|l| l.container_id.as_deref() == Some("MSKU7654321")));
}

#[test]
fn test_container_marker_beyond_scan_window_is_ignored() {
    let mut rows: Vec<Vec<&str>> = vec![vec!["SO", "目的地"]];
    for _ in 0..15 {
        rows.push(vec!["x", "LAX9"]);
    }
    rows.push(vec!["柜号：LATE0000001", "LAX9"]);

    let plan = UnloadSheetParser::new()
        .parse(&SheetMatrix::from_text_rows(rows))
        .unwrap();
    assert_eq!(plan.container_id, None);
}

#[test]
fn test_lowercase_so_is_not_a_header() {
    let matrix = SheetMatrix::from_text_rows(vec![vec!["so", "件数"], vec!["1", "2"]]);
    let result = UnloadSheetParser::new().parse(&matrix);
    assert!(matches!(result, Err(ImportError::NoHeaderFound { scanned_rows: 2 })));
}

#[test]
fn test_parse_csv_file_from_disk() {
    let file = write_csv(&[
        &["柜号：TGHU1234567"],
        &["SO", "派送地址", "PB数"],
        &["SO001", "希音-2", "4"],
        &["", "", ""],
        &["合计", "", "4"],
    ]);

    let matrix = UniversalSheetReader.read_matrix(file.path()).unwrap();
    let plan = UnloadSheetParser::new().parse(&matrix).unwrap();

    assert_eq!(plan.container_id.as_deref(), Some("TGHU1234567"));
    assert_eq!(plan.lines.len(), 1);
    assert_eq!(plan.lines[0].destination, "希音-2");
    assert_eq!(plan.lines[0].pallets, 4);
    assert_eq!(plan.lines[0].source_row_index, 2);
}
