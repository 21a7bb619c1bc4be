// ==========================================
// 仓库库位分配系统 - 配置层
// ==========================================
// 职责: 分配参数定义 + config_kv 覆写
// ==========================================

pub mod allocation_config;
pub mod config_manager;

// 重导出核心配置类型
pub use allocation_config::AllocationConfig;
pub use config_manager::{config_keys, ConfigManager};
