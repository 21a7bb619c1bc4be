// ==========================================
// 仓库库位分配系统 - 表格读取器
// ==========================================
// 职责: 文件 → SheetMatrix (首个工作表, 不假设表头位置)
// 支持: Excel (.xlsx/.xlsm/.xls/.ods) / CSV (.csv)
// ==========================================

use crate::domain::sheet::{CellValue, SheetMatrix};
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

// ==========================================
// Trait: SheetReader
// ==========================================
pub trait SheetReader {
    /// 读取首个工作表为矩阵
    fn read_matrix(&self, file_path: &Path) -> ImportResult<SheetMatrix>;
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Reader 实现
// ==========================================
pub struct CsvSheetReader;

impl SheetReader for CsvSheetReader {
    fn read_matrix(&self, file_path: &Path) -> ImportResult<SheetMatrix> {
        ensure_exists(file_path)?;

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false) // 表头位置由解析器启发式定位
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(CellValue::text).collect());
        }

        Ok(SheetMatrix::new(rows))
    }
}

// ==========================================
// Excel Reader 实现
// ==========================================
pub struct ExcelSheetReader;

impl ExcelSheetReader {
    fn convert_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::text(s.as_str()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            other => CellValue::text(other.to_string()),
        }
    }
}

impl SheetReader for ExcelSheetReader {
    fn read_matrix(&self, file_path: &Path) -> ImportResult<SheetMatrix> {
        ensure_exists(file_path)?;

        let mut workbook = open_workbook_auto(file_path)?;

        let sheet_names = workbook.sheet_names();
        let Some(sheet_name) = sheet_names.first().cloned() else {
            return Err(ImportError::ExcelParseError("Excel 文件无工作表".to_string()));
        };

        let range = workbook.worksheet_range(&sheet_name)?;

        // calamine 的 Range 从首个非空单元格开始, 这里补齐前导空行/空列,
        // 使矩阵行列号与原表一致
        let (row_offset, col_offset) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));

        let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); row_offset];
        for data_row in range.rows() {
            let mut cells = vec![CellValue::Empty; col_offset];
            cells.extend(data_row.iter().map(Self::convert_cell));
            rows.push(cells);
        }

        tracing::debug!("已读取工作表 '{}': {} 行", sheet_name, rows.len());
        Ok(SheetMatrix::new(rows))
    }
}

// ==========================================
// 通用读取器（根据扩展名自动选择）
// ==========================================
pub struct UniversalSheetReader;

impl SheetReader for UniversalSheetReader {
    fn read_matrix(&self, file_path: &Path) -> ImportResult<SheetMatrix> {
        let ext = extension_of(file_path);
        match ext.as_str() {
            "csv" => CsvSheetReader.read_matrix(file_path),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => ExcelSheetReader.read_matrix(file_path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_csv_reader_keeps_layout() {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(temp_file, "柜号：MSKU1234567,,").unwrap();
        writeln!(temp_file, ",,").unwrap();
        writeln!(temp_file, "SO,派送地址,托盘").unwrap();
        writeln!(temp_file, "SO001,Amazon-LAX9 Total,2").unwrap();
        writeln!(temp_file, "SO002,walmart").unwrap();

        let matrix = UniversalSheetReader.read_matrix(temp_file.path()).unwrap();

        assert_eq!(matrix.len(), 5);
        assert!(matrix.is_blank_row(1));
        assert_eq!(matrix.cell(2, 1).trimmed_text(), "派送地址");
        assert_eq!(matrix.cell(3, 2).as_positive_pallets(), Some(2));
        assert_eq!(matrix.row(4).unwrap().len(), 2);
    }

    #[test]
    fn test_file_not_found() {
        let result = CsvSheetReader.read_matrix(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_unsupported_format() {
        let result = UniversalSheetReader.read_matrix(Path::new("manifest.pdf"));
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(ext)) if ext == "pdf"));
    }
}
