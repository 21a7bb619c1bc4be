// ==========================================
// 仓库库位分配系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 解析错误必须在台账加载/修改之前抛出
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xlsm/.xls/.ods/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("CSV 写入失败: {0}")]
    CsvWriteError(String),

    // ===== 表格结构错误 =====
    #[error("表格内容为空")]
    EmptySheet,

    #[error("未找到表头（前 {scanned_rows} 行内需要包含 'SO' / '派送地址' / '目的地' 字段）")]
    NoHeaderFound { scanned_rows: usize },

    #[error("未找到 '派送地址 / 目的地 / destination' 列，请检查表头")]
    NoDestinationColumn,

    #[error("未找到 '托盘 / 板数 / pallet' 列，请检查表头")]
    NoPalletColumn,

    #[error("未找到 'Location / 库位' 列，请检查表头")]
    NoLocationColumn,
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
