// ==========================================
// 仓库库位分配系统 - 货物行领域模型
// ==========================================
// 职责: 卸柜行 / 出库行 / 盘点行 / 卸柜计划
// 生命周期: 每次导入创建, 台账落库后丢弃
// ==========================================

use crate::domain::sheet::SheetMatrix;
use serde::{Deserialize, Serialize};

// ==========================================
// ShipmentLine - 卸柜单货物行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentLine {
    pub destination: String,          // 派送地址原文 (已去空白, 非空)
    pub pallets: u32,                 // 托盘数 (>= 1)
    pub source_row_index: usize,      // 原表行号 (回写建议库位用)
    pub container_id: Option<String>, // 柜号 (整表共享)
    pub assigned_slot: Option<String>, // 分配结果 (None = 无可用库位)
}

impl ShipmentLine {
    pub fn new(destination: impl Into<String>, pallets: u32, source_row_index: usize) -> Self {
        Self {
            destination: destination.into(),
            pallets: pallets.max(1),
            source_row_index,
            container_id: None,
            assigned_slot: None,
        }
    }

    pub fn with_container(mut self, container_id: Option<String>) -> Self {
        self.container_id = container_id;
        self
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_slot.is_some()
    }
}

// ==========================================
// OutboundLine - 出库单行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundLine {
    pub destination: String,
    pub pallets: u32,
}

impl OutboundLine {
    pub fn new(destination: impl Into<String>, pallets: u32) -> Self {
        Self {
            destination: destination.into(),
            pallets,
        }
    }
}

// ==========================================
// InventoryLine - 盘点单行 (覆盖库位托盘数)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLine {
    pub slot_id: String,
    pub pallets: u32,
}

// ==========================================
// UnloadPlan - 卸柜单解析结果
// ==========================================
// 保留原表矩阵, 便于回写建议库位而无需重新解析
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnloadPlan {
    pub header_row_index: usize,
    pub headers: Vec<String>,
    pub lines: Vec<ShipmentLine>,
    pub container_id: Option<String>,
    pub matrix: SheetMatrix,
}

impl UnloadPlan {
    /// 总托盘数
    pub fn total_pallets(&self) -> u64 {
        self.lines.iter().map(|l| l.pallets as u64).sum()
    }
}

// ==========================================
// AnnotatedPlan - 带建议库位的卸柜计划
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedPlan {
    pub header_row_index: usize,
    pub location_column: usize, // 建议库位列
    pub matrix: SheetMatrix,
}
