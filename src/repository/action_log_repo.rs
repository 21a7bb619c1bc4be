// ==========================================
// 仓库库位分配系统 - 操作日志数据仓储
// ==========================================
// 红线: 所有台账写入必须记录
// ==========================================

mod core;
mod queries;


pub use self::core::ActionLogRepository;
