// ==========================================
// 仓库库位分配系统 - 核心库
// ==========================================
// 核心: 目的地分类 + 卸柜单解析 + 库位分配 + 出库扣减
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DestinationCategory, SlotCategory};

// 领域实体
pub use domain::{
    ActionLog, ActionType, CellValue, DestinationContainerIndex, OutboundLine, SheetMatrix,
    ShipmentLine, Slot, SlotField, UnloadPlan,
};

// 引擎
pub use engine::{
    classify, DestinationClassifier, LedgerStatsEngine, OutboundReconciler, PlanAnnotator,
    SlotAllocator,
};

// API
pub use api::{ApiError, WarehouseApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "仓库库位分配系统";
