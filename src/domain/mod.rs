// ==========================================
// 仓库库位分配系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、约束接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod container_index;
pub mod sheet;
pub mod shipment;
pub mod slot;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use container_index::{ContainerIndexEntry, DestinationContainerIndex};
pub use sheet::{CellValue, SheetMatrix};
pub use shipment::{AnnotatedPlan, InventoryLine, OutboundLine, ShipmentLine, UnloadPlan};
pub use slot::{Slot, SlotConstraint, SlotField};
pub use types::{DestinationCategory, SlotCategory};
