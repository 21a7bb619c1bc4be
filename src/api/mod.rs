// ==========================================
// 仓库库位分配系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行/宿主程序调用
// ==========================================

pub mod error;
pub mod warehouse_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use warehouse_api::{
    InventoryImportResponse, OutboundImportResponse, UnloadImportResponse, WarehouseApi,
};
