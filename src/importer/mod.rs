// ==========================================
// 仓库库位分配系统 - 导入层
// ==========================================
// 职责: 文件 → SheetMatrix → 卸柜/出库/盘点行; 计划导出
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod error;
pub mod file_parser;
pub mod header_rules;
pub mod inventory_parser;
pub mod outbound_parser;
pub mod plan_exporter;
pub mod unload_parser;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvSheetReader, ExcelSheetReader, SheetReader, UniversalSheetReader};
pub use inventory_parser::InventorySheetParser;
pub use outbound_parser::OutboundSheetParser;
pub use plan_exporter::PlanExporter;
pub use unload_parser::UnloadSheetParser;
